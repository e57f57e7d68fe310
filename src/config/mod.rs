use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub bootstrap_landlord_email: String,
    pub bootstrap_landlord_password: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            db_path: get_env("DB_PATH", "rentwise.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            jwt_secret: get_env("JWT_SECRET", ""),
            jwt_ttl_hours: get_env("JWT_TTL_HOURS", "24").parse().unwrap_or(24),
            bootstrap_landlord_email: get_env("BOOTSTRAP_LANDLORD_EMAIL", "admin@rentwise.local"),
            bootstrap_landlord_password: get_env("BOOTSTRAP_LANDLORD_PASSWORD", ""),
        }
    }

    /// Fixed configuration for tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            db_path: ":memory:".into(),
            db_max_connections: 1,
            listen_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            jwt_ttl_hours: 1,
            bootstrap_landlord_email: "admin@rentwise.local".into(),
            bootstrap_landlord_password: String::new(),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
