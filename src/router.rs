use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Account routes
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/profile", get(handlers::users::get_profile))
        .route("/api/profile/landlord-access", post(handlers::users::request_landlord_access))
        .route("/api/access-requests/:user_id", post(handlers::users::review_landlord_access))
        // Dashboard routes
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/api/dashboard/tenant", get(handlers::dashboard::get_tenant_dashboard))
        .route("/api/dashboard/landlord", get(handlers::dashboard::get_landlord_dashboard))
        // Portfolio routes
        .route("/api/properties", get(handlers::properties::list_properties))
        .route("/api/properties", post(handlers::properties::create_property))
        .route("/api/contracts", get(handlers::contracts::list_contracts))
        .route("/api/contracts", post(handlers::contracts::create_contract))
        .route("/api/due-date", get(handlers::contracts::suggest_due_date))
        // Rent routes
        .route("/api/rents", post(handlers::rents::create_rent))
        .route("/api/rents/:id/status", put(handlers::rents::update_rent_status))
        // Expense routes
        .route("/api/expenses", post(handlers::expenses::create_expense))
        .route("/api/expenses/water", post(handlers::expenses::create_water_expense))
        .route("/api/expenses/electricity", post(handlers::expenses::create_electricity_expense))
        .route("/api/expenses/:id/status", put(handlers::expenses::update_expense_status))
        .route("/api/expenses/:id/value", put(handlers::expenses::adjust_expense_value))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::Store;

    const LANDLORD_EMAIL: &str = "admin@rentwise.local";
    const LANDLORD_PASSWORD: &str = "landlord-pass";

    async fn app() -> Router {
        app_with_store(Store::in_memory().await.unwrap())
    }

    fn app_with_store(store: Store) -> Router {
        build(Arc::new(AppState {
            store,
            config: Config::for_tests(),
        }))
    }

    /// App over a fresh store seeded with one approved landlord
    async fn landlord_app() -> Router {
        let store = Store::in_memory().await.unwrap();
        store
            .seed_bootstrap_landlord(LANDLORD_EMAIL, LANDLORD_PASSWORD)
            .await
            .unwrap();
        app_with_store(store)
    }

    async fn landlord_token(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": LANDLORD_EMAIL, "password": LANDLORD_PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "LANDLORD");
        body["token"].as_str().unwrap().to_string()
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn signup_and_login(app: &Router, email: &str) -> String {
        let (status, _) = send(
            app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"full_name": "Tom Tenant", "email": email, "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "TENANT");
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "rentwise");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/dashboard", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) =
            send(&app, Method::GET, "/api/dashboard", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tenant_flow_over_http() {
        let app = app().await;
        let token = signup_and_login(&app, "tom@example.com").await;

        let (status, body) = send(&app, Method::GET, "/api/dashboard", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_type"], "TENANT");
        assert_eq!(body["data"]["summary"]["pending_count"], 0);
        assert_eq!(body["data"]["user"]["email"], "tom@example.com");
        assert!(body["data"]["user"].get("password_hash").is_none());

        let (status, _) =
            send(&app, Method::GET, "/api/dashboard/landlord", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/rents",
            Some(&token),
            Some(json!({"contract_id": "x", "reference_month": "2024-05", "due_date": "2024-05-10"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/profile/landlord-access",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "PENDING");
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_conflict() {
        let app = app().await;
        signup_and_login(&app, "tom@example.com").await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"full_name": "Tom Again", "email": "tom@example.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "A user with this email already exists");
    }

    #[tokio::test]
    async fn test_due_date_suggestion() {
        let app = app().await;
        let token = signup_and_login(&app, "tom@example.com").await;

        let (status, body) =
            send(&app, Method::GET, "/api/due-date?due_day=5", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["due_date"].is_string());

        let (status, _) =
            send(&app, Method::GET, "/api/due-date?due_day=40", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_json_is_unprocessable_with_error_body() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({"email": "a@b.c"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("full_name"));

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"email\": "))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_landlord_billing_flow_over_http() {
        let app = landlord_app().await;
        let landlord = landlord_token(&app).await;
        signup_and_login(&app, "tom@example.com").await;

        let (status, property) = send(
            &app,
            Method::POST,
            "/api/properties",
            Some(&landlord),
            Some(json!({"name": "Flat 2B", "address": "Rua Augusta 10, Lisboa", "rent_amount": "850.00"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, contract) = send(
            &app,
            Method::POST,
            "/api/contracts",
            Some(&landlord),
            Some(json!({
                "property_id": property["id"],
                "tenant_email": "tom@example.com",
                "start_date": "2024-01-01",
                "rent_amount": "800.00",
                "due_day": 8
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let contract_id = contract["id"].as_str().unwrap().to_string();

        let (status, rent) = send(
            &app,
            Method::POST,
            "/api/rents",
            Some(&landlord),
            Some(json!({"contract_id": contract_id, "reference_month": "2024-05", "due_date": "2024-05-08"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(rent["amount"], "800.00");
        assert_eq!(rent["status"], "PENDING");

        let water = json!({
            "contract_id": contract_id,
            "previous_reading": "1250.500",
            "current_reading": "1275.200",
            "unit_price": "1.25",
            "fixed_fee": "5.00",
            "reference_month": "2024-05",
            "due_date": "2024-06-10"
        });
        let (status, expense) =
            send(&app, Method::POST, "/api/expenses/water", Some(&landlord), Some(water.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(expense["final_value"], "35.88");
        assert_eq!(expense["computed_value"], "35.88");
        assert_eq!(expense["description"], "Water - 2024-05 (24.7m³)");
        let expense_id = expense["id"].as_str().unwrap().to_string();

        let (status, _) =
            send(&app, Method::POST, "/api/expenses/water", Some(&landlord), Some(water)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, paid) = send(
            &app,
            Method::PUT,
            &format!("/api/expenses/{}/status", expense_id),
            Some(&landlord),
            Some(json!({"status": "PAID"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["status"], "PAID");
        assert_eq!(paid["payment_date"], crate::handlers::today().to_string());

        let (status, adjusted) = send(
            &app,
            Method::PUT,
            &format!("/api/expenses/{}/value", expense_id),
            Some(&landlord),
            Some(json!({"value": "30.456"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(adjusted["final_value"], "30.46");
        assert_eq!(adjusted["computed_value"], "35.88");

        let (status, rent) = send(
            &app,
            Method::PUT,
            &format!("/api/rents/{}/status", rent["id"].as_str().unwrap()),
            Some(&landlord),
            Some(json!({"status": "PAID"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rent["payment_date"], crate::handlers::today().to_string());

        let (status, oversized) = send(
            &app,
            Method::POST,
            "/api/expenses/electricity",
            Some(&landlord),
            Some(json!({
                "contract_id": contract_id,
                "previous_reading": "0",
                "current_reading": "79228162514264337593543950335",
                "unit_price": "2",
                "reference_month": "2024-05",
                "due_date": "2024-06-10"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(oversized["error"].is_string());

        let (status, dashboard) =
            send(&app, Method::GET, "/api/dashboard", Some(&landlord), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dashboard["user_type"], "LANDLORD");
        assert_eq!(dashboard["data"]["summary"]["total_received"], "800.00");
        assert_eq!(dashboard["data"]["summary"]["total_expenses_received"], "30.46");
    }
}
