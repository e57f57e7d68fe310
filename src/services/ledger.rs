//! Rent and expense lifecycle: creation under ownership and uniqueness
//! rules, status changes, and manual value adjustments.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{non_blank, ServiceError, Session};
use crate::billing::{self, MeterReading, Utility, UtilityCharge};
use crate::db::Store;
use crate::models::*;

fn require_month(reference_month: &str) -> Result<(), ServiceError> {
    billing::parse_reference_month(reference_month)
        .map(|_| ())
        .ok_or_else(|| ServiceError::invalid("reference_month must be in YYYY-MM format"))
}

/// Active contract owned by the caller, or NotFound
async fn owned_active_contract(
    store: &Store,
    session: &Session,
    contract_id: &str,
) -> Result<Contract, ServiceError> {
    store
        .get_owned_active_contract(contract_id, &session.user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Contract"))
}

fn require_owner(landlord_id: &str, session: &Session, what: &str) -> Result<(), ServiceError> {
    if landlord_id != session.user_id {
        return Err(ServiceError::Forbidden(format!("this {} does not belong to you", what)));
    }
    Ok(())
}

pub async fn create_rent(
    store: &Store,
    session: &Session,
    req: &CreateRentRequest,
) -> Result<Rent, ServiceError> {
    session.require_landlord()?;
    require_month(&req.reference_month)?;
    let contract = owned_active_contract(store, session, &req.contract_id).await?;

    let rent = store
        .create_rent(
            &contract,
            &req.reference_month,
            req.due_date,
            non_blank(req.description.as_deref()),
        )
        .await?;

    tracing::info!(
        rent_id = %rent.id,
        contract_id = %contract.id,
        month = %rent.reference_month,
        "Rent created"
    );
    Ok(rent)
}

pub async fn create_water_expense(
    store: &Store,
    session: &Session,
    req: &CreateMeterExpenseRequest,
) -> Result<Expense, ServiceError> {
    create_meter_expense(store, session, Utility::Water, req).await
}

pub async fn create_electricity_expense(
    store: &Store,
    session: &Session,
    req: &CreateMeterExpenseRequest,
) -> Result<Expense, ServiceError> {
    create_meter_expense(store, session, Utility::Electricity, req).await
}

async fn create_meter_expense(
    store: &Store,
    session: &Session,
    utility: Utility,
    req: &CreateMeterExpenseRequest,
) -> Result<Expense, ServiceError> {
    session.require_landlord()?;
    require_month(&req.reference_month)?;

    // Readings are validated before anything is computed or looked up
    let reading = MeterReading::new(req.previous_reading, req.current_reading)?;
    let charge = UtilityCharge::new(reading, req.unit_price, req.fixed_fee)?;

    let contract = owned_active_contract(store, session, &req.contract_id).await?;

    let value = billing::round_currency(charge.cost()?);
    let description = non_blank(req.description.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| utility.default_description(&req.reference_month, reading.consumption()));

    let new = NewExpense {
        contract_id: contract.id.clone(),
        property_id: contract.property_id.clone(),
        tenant_id: contract.tenant_id.clone(),
        landlord_id: contract.landlord_id.clone(),
        expense_type: utility.expense_type(),
        previous_reading: Some(reading.previous()),
        current_reading: Some(reading.current()),
        unit_price: Some(charge.unit_price),
        fixed_fee: Some(charge.fixed_fee),
        computed_value: Some(value),
        final_value: value,
        reference_month: req.reference_month.clone(),
        due_date: req.due_date,
        description: Some(description),
    };
    let expense = store.create_expense(&new).await?;

    tracing::info!(
        expense_id = %expense.id,
        contract_id = %contract.id,
        kind = expense.expense_type.as_str(),
        consumption = %reading.consumption(),
        value = %value,
        "Utility expense created"
    );
    Ok(expense)
}

/// Expense with a directly entered amount (gas, internet, condo, ...)
pub async fn create_flat_expense(
    store: &Store,
    session: &Session,
    req: &CreateFlatExpenseRequest,
) -> Result<Expense, ServiceError> {
    session.require_landlord()?;
    if req.expense_type.is_metered() {
        return Err(ServiceError::invalid(
            "water and electricity expenses are billed from meter readings",
        ));
    }
    let amount = billing::round_currency(req.amount);
    if amount <= Decimal::ZERO {
        return Err(ServiceError::invalid("amount must be positive"));
    }
    require_month(&req.reference_month)?;
    let contract = owned_active_contract(store, session, &req.contract_id).await?;

    let new = NewExpense {
        contract_id: contract.id.clone(),
        property_id: contract.property_id.clone(),
        tenant_id: contract.tenant_id.clone(),
        landlord_id: contract.landlord_id.clone(),
        expense_type: req.expense_type,
        previous_reading: None,
        current_reading: None,
        unit_price: None,
        fixed_fee: None,
        computed_value: None,
        final_value: amount,
        reference_month: req.reference_month.clone(),
        due_date: req.due_date,
        description: non_blank(req.description.as_deref()).map(str::to_string),
    };
    let expense = store.create_expense(&new).await?;

    tracing::info!(
        expense_id = %expense.id,
        kind = expense.expense_type.as_str(),
        "Expense created"
    );
    Ok(expense)
}

pub async fn update_rent_status(
    store: &Store,
    session: &Session,
    rent_id: &str,
    status: PaymentStatus,
    today: NaiveDate,
) -> Result<Rent, ServiceError> {
    let rent = store
        .get_rent(rent_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Rent"))?;
    require_owner(&rent.landlord_id, session, "rent")?;

    let rent = store
        .update_rent_status(rent_id, status, status.payment_date(today))
        .await?;
    tracing::info!(rent_id, status = status.as_str(), "Rent status updated");
    Ok(rent)
}

pub async fn update_expense_status(
    store: &Store,
    session: &Session,
    expense_id: &str,
    status: PaymentStatus,
    today: NaiveDate,
) -> Result<Expense, ServiceError> {
    let expense = store
        .get_expense(expense_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Expense"))?;
    require_owner(&expense.landlord_id, session, "expense")?;

    let expense = store
        .update_expense_status(expense_id, status, status.payment_date(today))
        .await?;
    tracing::info!(expense_id, status = status.as_str(), "Expense status updated");
    Ok(expense)
}

/// Override an expense's final value, appending an audit note.
/// The computed value stays as it was for later comparison.
///
/// Without a note, the entry records the move from the current final value
/// (which may already be a manual figure) to the new one, so successive
/// adjustments read as a chain.
pub async fn adjust_expense_value(
    store: &Store,
    session: &Session,
    expense_id: &str,
    new_value: Decimal,
    note: Option<&str>,
) -> Result<Expense, ServiceError> {
    let expense = store
        .get_expense(expense_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Expense"))?;
    require_owner(&expense.landlord_id, session, "expense")?;

    let final_value = billing::round_currency(new_value);
    if final_value <= Decimal::ZERO {
        return Err(ServiceError::invalid("value must be positive"));
    }

    let entry = non_blank(note).map(str::to_string).unwrap_or_else(|| {
        format!(
            "Value manually adjusted from €{:.2} to €{:.2}",
            expense.final_value, final_value
        )
    });
    let notes = match expense.notes {
        Some(existing) => format!("{}\n{}", existing, entry),
        None => entry,
    };

    let adjusted = store
        .adjust_expense_value(expense_id, final_value, &notes)
        .await?;
    tracing::info!(
        expense_id,
        from = %expense.final_value,
        to = %final_value,
        "Expense value adjusted"
    );
    Ok(adjusted)
}
