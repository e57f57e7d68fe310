//! Signup, credential checks and the landlord-access workflow.

use super::{ServiceError, Session};
use crate::db::Store;
use crate::models::*;

const MIN_PASSWORD_LEN: usize = 6;

pub async fn signup(store: &Store, req: &SignupRequest) -> Result<User, ServiceError> {
    let full_name = req.full_name.trim();
    let email = req.email.trim().to_lowercase();
    if full_name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ServiceError::invalid("full_name, email and password are required"));
    }
    if !email.contains('@') {
        return Err(ServiceError::invalid("invalid email address"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ServiceError::invalid(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if store.get_user_by_email(&email).await?.is_some() {
        return Err(ServiceError::DuplicateEntry(
            "A user with this email already exists".into(),
        ));
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ServiceError::Internal
    })?;

    let user = store.create_user(full_name, &email, &password_hash).await?;
    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Check email and password, returning the account on success
pub async fn authenticate(store: &Store, req: &LoginRequest) -> Result<User, ServiceError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ServiceError::invalid("email and password are required"));
    }

    let user = store
        .get_user_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or(ServiceError::Unauthenticated)?;

    let valid = bcrypt::verify(&req.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {}", e);
        ServiceError::Internal
    })?;
    if !valid {
        return Err(ServiceError::Unauthenticated);
    }
    Ok(user)
}

pub async fn profile(store: &Store, session: &Session) -> Result<User, ServiceError> {
    store
        .get_user(&session.user_id)
        .await?
        .ok_or(ServiceError::Unauthenticated)
}

/// A tenant asks to become a landlord
pub async fn request_landlord_access(
    store: &Store,
    session: &Session,
) -> Result<User, ServiceError> {
    let user = profile(store, session).await?;
    if user.role != Role::Tenant {
        return Err(ServiceError::Forbidden(
            "only tenants can request landlord access".into(),
        ));
    }
    if user.status == AccessStatus::Pending {
        return Err(ServiceError::DuplicateEntry(
            "a landlord-access request is already pending".into(),
        ));
    }

    let user = store
        .set_user_access(&user.id, Role::Tenant, AccessStatus::Pending)
        .await?;
    tracing::info!(user_id = %user.id, "Landlord access requested");
    Ok(user)
}

/// An approved landlord decides on a pending request
pub async fn review_landlord_access(
    store: &Store,
    session: &Session,
    user_id: &str,
    approve: bool,
) -> Result<User, ServiceError> {
    let reviewer = profile(store, session).await?;
    if reviewer.role != Role::Landlord || reviewer.status != AccessStatus::Approved {
        return Err(ServiceError::Forbidden(
            "only approved landlords can review access requests".into(),
        ));
    }

    let target = store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;
    if target.status != AccessStatus::Pending {
        return Err(ServiceError::invalid("user has no pending access request"));
    }

    let (role, status) = if approve {
        (Role::Landlord, AccessStatus::Approved)
    } else {
        (target.role, AccessStatus::Rejected)
    };
    let user = store.set_user_access(user_id, role, status).await?;
    tracing::info!(
        user_id,
        reviewer = %reviewer.id,
        status = status.as_str(),
        "Landlord access reviewed"
    );
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;

    fn signup_req(email: &str) -> SignupRequest {
        SignupRequest {
            full_name: "Ana Silva".into(),
            email: email.into(),
            password: "secret123".into(),
        }
    }

    #[tokio::test]
    async fn test_signup_defaults_and_login() {
        let store = Store::in_memory().await.unwrap();
        let user = signup(&store, &signup_req("Ana@Example.com")).await.unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role, Role::Tenant);
        assert_eq!(user.status, AccessStatus::Undefined);
        assert_ne!(user.password_hash, "secret123");

        let login = LoginRequest {
            email: "ana@example.com".into(),
            password: "secret123".into(),
        };
        assert_eq!(authenticate(&store, &login).await.unwrap().id, user.id);

        let wrong = LoginRequest {
            email: "ana@example.com".into(),
            password: "nope".into(),
        };
        assert!(matches!(
            authenticate(&store, &wrong).await,
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let store = Store::in_memory().await.unwrap();
        signup(&store, &signup_req("ana@example.com")).await.unwrap();
        assert!(matches!(
            signup(&store, &signup_req("ana@example.com")).await,
            Err(ServiceError::DuplicateEntry(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_validates_input() {
        let store = Store::in_memory().await.unwrap();
        let mut req = signup_req("ana@example.com");
        req.password = "123".into();
        assert!(matches!(signup(&store, &req).await, Err(ServiceError::InvalidValue(_))));
        assert!(matches!(
            signup(&store, &signup_req("not-an-email")).await,
            Err(ServiceError::InvalidValue(_))
        ));
    }

    #[tokio::test]
    async fn test_access_request_and_approval() {
        let store = Store::in_memory().await.unwrap();
        let reviewer = fixtures::landlord(&store, "boss@example.com").await;
        let tenant = fixtures::tenant(&store, "tom@example.com").await;

        let pending = request_landlord_access(&store, &tenant).await.unwrap();
        assert_eq!(pending.status, AccessStatus::Pending);
        assert!(matches!(
            request_landlord_access(&store, &tenant).await,
            Err(ServiceError::DuplicateEntry(_))
        ));

        // A tenant cannot review
        assert!(matches!(
            review_landlord_access(&store, &tenant, &tenant.user_id, true).await,
            Err(ServiceError::Forbidden(_))
        ));

        let approved = review_landlord_access(&store, &reviewer, &tenant.user_id, true)
            .await
            .unwrap();
        assert_eq!(approved.role, Role::Landlord);
        assert_eq!(approved.status, AccessStatus::Approved);

        assert!(matches!(
            review_landlord_access(&store, &reviewer, &tenant.user_id, true).await,
            Err(ServiceError::InvalidValue(_))
        ));
    }

    #[tokio::test]
    async fn test_access_rejection_keeps_tenant_role() {
        let store = Store::in_memory().await.unwrap();
        let reviewer = fixtures::landlord(&store, "boss@example.com").await;
        let tenant = fixtures::tenant(&store, "tom@example.com").await;
        request_landlord_access(&store, &tenant).await.unwrap();

        let rejected = review_landlord_access(&store, &reviewer, &tenant.user_id, false)
            .await
            .unwrap();
        assert_eq!(rejected.role, Role::Tenant);
        assert_eq!(rejected.status, AccessStatus::Rejected);

        // Rejected tenants may ask again
        let again = request_landlord_access(&store, &tenant).await.unwrap();
        assert_eq!(again.status, AccessStatus::Pending);
    }

    #[tokio::test]
    async fn test_bootstrap_landlord_seeded_once() {
        let store = Store::in_memory().await.unwrap();
        store
            .seed_bootstrap_landlord("admin@rentwise.local", "changeme")
            .await
            .unwrap();
        store
            .seed_bootstrap_landlord("second@rentwise.local", "changeme")
            .await
            .unwrap();

        let admin = store.get_user_by_email("admin@rentwise.local").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Landlord);
        assert_eq!(admin.status, AccessStatus::Approved);
        assert!(store.get_user_by_email("second@rentwise.local").await.unwrap().is_none());
    }
}
