//! Properties and the contracts that bind them to tenants.

use rust_decimal::Decimal;

use super::{non_blank, ServiceError, Session};
use crate::billing;
use crate::db::Store;
use crate::models::*;

/// Rent rounded to cents, rejected unless it stays above zero
fn positive_amount(amount: Decimal) -> Result<Decimal, ServiceError> {
    let amount = billing::round_currency(amount);
    if amount <= Decimal::ZERO {
        return Err(ServiceError::invalid("rent_amount must be greater than zero"));
    }
    Ok(amount)
}

pub async fn list_properties(store: &Store, session: &Session) -> Result<Vec<Property>, ServiceError> {
    session.require_landlord()?;
    Ok(store.list_properties(&session.user_id).await?)
}

pub async fn create_property(
    store: &Store,
    session: &Session,
    req: &CreatePropertyRequest,
) -> Result<Property, ServiceError> {
    session.require_landlord()?;
    let (name, address) = (req.name.trim(), req.address.trim());
    if name.is_empty() || address.is_empty() {
        return Err(ServiceError::invalid("name and address are required"));
    }

    let req = CreatePropertyRequest {
        name: name.to_string(),
        address: address.to_string(),
        description: non_blank(req.description.as_deref()).map(str::to_string),
        rent_amount: positive_amount(req.rent_amount)?,
    };
    let property = store.create_property(&session.user_id, &req).await?;
    tracing::info!(property_id = %property.id, name = %property.name, "Property created");
    Ok(property)
}

pub async fn list_contracts(
    store: &Store,
    session: &Session,
) -> Result<Vec<ContractDetails>, ServiceError> {
    session.require_landlord()?;
    Ok(store.list_active_contracts(&session.user_id).await?)
}

/// Bind one of the caller's properties to a tenant account
pub async fn create_contract(
    store: &Store,
    session: &Session,
    req: &CreateContractRequest,
) -> Result<Contract, ServiceError> {
    session.require_landlord()?;
    if !(1..=31).contains(&req.due_day) {
        return Err(ServiceError::invalid("due_day must be between 1 and 31"));
    }
    let rent_amount = positive_amount(req.rent_amount)?;
    if let Some(end) = req.end_date {
        if end < req.start_date {
            return Err(ServiceError::invalid("end_date must not precede start_date"));
        }
    }

    let property = store
        .get_owned_property(&req.property_id, &session.user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Property"))?;

    let tenant = store
        .get_user_by_email(&req.tenant_email.trim().to_lowercase())
        .await?
        .filter(|u| u.role == Role::Tenant)
        .ok_or_else(|| ServiceError::not_found("Tenant"))?;

    let req = CreateContractRequest {
        rent_amount,
        ..req.clone()
    };
    let contract = store.create_contract(&property, &tenant, &req).await?;
    tracing::info!(
        contract_id = %contract.id,
        property_id = %property.id,
        tenant_id = %tenant.id,
        "Contract created"
    );
    Ok(contract)
}
