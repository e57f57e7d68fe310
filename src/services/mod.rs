pub mod accounts;
pub mod dashboard;
pub mod ledger;
pub mod portfolio;

use thiserror::Error;

use crate::billing::BillingError;
use crate::db::{DuplicateError, NotFoundError};
use crate::models::{Claims, Role};

/// Identity of the caller, passed explicitly into every operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn require_landlord(&self) -> Result<(), ServiceError> {
        match self.role {
            Role::Landlord => Ok(()),
            Role::Tenant => Err(ServiceError::Forbidden(
                "only landlords can perform this action".into(),
            )),
        }
    }

    pub fn require_tenant(&self) -> Result<(), ServiceError> {
        match self.role {
            Role::Tenant => Ok(()),
            Role::Landlord => Err(ServiceError::Forbidden(
                "only tenants can perform this action".into(),
            )),
        }
    }
}

impl From<&Claims> for Session {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.sub.clone(), claims.role)
    }
}

/// Failures of a rental operation
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    DuplicateEntry(String),

    #[error("{0}")]
    InvalidReading(String),

    #[error("{0}")]
    InvalidValue(String),

    #[error("internal error")]
    Internal,
}

impl ServiceError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{} not found", resource))
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(nf) = err.downcast_ref::<NotFoundError>() {
            return Self::NotFound(nf.to_string());
        }
        if let Some(dup) = err.downcast_ref::<DuplicateError>() {
            return Self::DuplicateEntry(dup.to_string());
        }
        tracing::error!("Persistence failure: {:#}", err);
        Self::Internal
    }
}

impl From<BillingError> for ServiceError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvalidReading { .. } => Self::InvalidReading(err.to_string()),
            BillingError::Negative { .. } | BillingError::Overflow => {
                Self::InvalidValue(err.to_string())
            }
        }
    }
}

/// Trimmed, non-empty text or None
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared setup for service tests: an in-memory store with one landlord,
    //! one tenant, a property and an active contract.

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use super::Session;
    use crate::db::Store;
    use crate::models::*;

    pub fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub struct World {
        pub store: Store,
        pub landlord: Session,
        pub tenant: Session,
        pub contract: Contract,
    }

    pub async fn landlord(store: &Store, email: &str) -> Session {
        let user = store.create_user("Lia Landlord", email, "x").await.unwrap();
        store
            .set_user_access(&user.id, Role::Landlord, AccessStatus::Approved)
            .await
            .unwrap();
        Session::new(user.id, Role::Landlord)
    }

    pub async fn tenant(store: &Store, email: &str) -> Session {
        let user = store.create_user("Tom Tenant", email, "x").await.unwrap();
        Session::new(user.id, Role::Tenant)
    }

    pub async fn contract_for(store: &Store, landlord: &Session, tenant_email: &str) -> Contract {
        let property = store
            .create_property(
                &landlord.user_id,
                &CreatePropertyRequest {
                    name: "Flat 2B".into(),
                    address: "Rua Augusta 10, Lisboa".into(),
                    description: None,
                    rent_amount: dec("850.00"),
                },
            )
            .await
            .unwrap();
        let tenant = store.get_user_by_email(tenant_email).await.unwrap().unwrap();
        store
            .create_contract(
                &property,
                &tenant,
                &CreateContractRequest {
                    property_id: property.id.clone(),
                    tenant_email: tenant_email.into(),
                    start_date: date("2024-01-01"),
                    end_date: None,
                    rent_amount: dec("800.00"),
                    due_day: 8,
                },
            )
            .await
            .unwrap()
    }

    pub async fn world() -> World {
        let store = Store::in_memory().await.unwrap();
        let landlord = landlord(&store, "lia@example.com").await;
        let tenant = tenant(&store, "tom@example.com").await;
        let contract = contract_for(&store, &landlord, "tom@example.com").await;
        World {
            store,
            landlord,
            tenant,
            contract,
        }
    }
}
