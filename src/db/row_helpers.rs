use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use std::str::FromStr;

use crate::models::*;

/// Filter empty strings to None, for columns that may hold '' instead of NULL
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Read a decimal stored as TEXT
pub fn get_decimal(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).with_context(|| format!("invalid decimal in {}: {:?}", column, raw))
}

/// Read a nullable decimal stored as TEXT
pub fn get_opt_decimal(row: &SqliteRow, column: &str) -> Result<Option<Decimal>> {
    let raw: Option<String> = row.try_get(column)?;
    none_if_empty(raw)
        .map(|s| {
            Decimal::from_str(&s).with_context(|| format!("invalid decimal in {}: {:?}", column, s))
        })
        .transpose()
}

/// Read one of the TEXT-encoded enumerations
pub fn get_enum<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
}

/// Map a SQLite row to a User struct
pub fn map_user_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: get_enum(row, "role")?,
        status: get_enum(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Map a SQLite row to a Property struct
pub fn map_property_row(row: &SqliteRow) -> Result<Property> {
    Ok(Property {
        id: row.try_get("id")?,
        landlord_id: row.try_get("landlord_id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        description: none_if_empty(row.try_get("description")?),
        rent_amount: get_decimal(row, "rent_amount")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Map a SQLite row to a Contract struct
pub fn map_contract_row(row: &SqliteRow) -> Result<Contract> {
    let due_day: i64 = row.try_get("due_day")?;
    Ok(Contract {
        id: row.try_get("id")?,
        property_id: row.try_get("property_id")?,
        tenant_id: row.try_get("tenant_id")?,
        landlord_id: row.try_get("landlord_id")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        rent_amount: get_decimal(row, "rent_amount")?,
        due_day: u32::try_from(due_day).context("due_day out of range")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Map a SQLite row to a Rent struct
pub fn map_rent_row(row: &SqliteRow) -> Result<Rent> {
    Ok(Rent {
        id: row.try_get("id")?,
        contract_id: row.try_get("contract_id")?,
        property_id: row.try_get("property_id")?,
        tenant_id: row.try_get("tenant_id")?,
        landlord_id: row.try_get("landlord_id")?,
        amount: get_decimal(row, "amount")?,
        reference_month: row.try_get("reference_month")?,
        due_date: row.try_get("due_date")?,
        payment_date: row.try_get("payment_date")?,
        status: get_enum(row, "status")?,
        description: none_if_empty(row.try_get("description")?),
        created_at: row.try_get("created_at")?,
    })
}

/// Map a SQLite row to an Expense struct
pub fn map_expense_row(row: &SqliteRow) -> Result<Expense> {
    Ok(Expense {
        id: row.try_get("id")?,
        contract_id: row.try_get("contract_id")?,
        property_id: row.try_get("property_id")?,
        tenant_id: row.try_get("tenant_id")?,
        landlord_id: row.try_get("landlord_id")?,
        expense_type: get_enum(row, "expense_type")?,
        previous_reading: get_opt_decimal(row, "previous_reading")?,
        current_reading: get_opt_decimal(row, "current_reading")?,
        unit_price: get_opt_decimal(row, "unit_price")?,
        fixed_fee: get_opt_decimal(row, "fixed_fee")?,
        computed_value: get_opt_decimal(row, "computed_value")?,
        final_value: get_decimal(row, "final_value")?,
        reference_month: row.try_get("reference_month")?,
        due_date: row.try_get("due_date")?,
        payment_date: row.try_get("payment_date")?,
        status: get_enum(row, "status")?,
        description: none_if_empty(row.try_get("description")?),
        notes: none_if_empty(row.try_get("notes")?),
        created_at: row.try_get("created_at")?,
    })
}

/// Joined display columns shared by contract, rent and expense listings
pub struct JoinedNames {
    pub property_name: String,
    pub property_address: String,
    pub tenant_name: String,
    pub tenant_email: String,
}

pub fn map_joined_names(row: &SqliteRow) -> Result<JoinedNames> {
    Ok(JoinedNames {
        property_name: row.try_get("property_name")?,
        property_address: row.try_get("property_address")?,
        tenant_name: row.try_get("tenant_name")?,
        tenant_email: row.try_get("tenant_email")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_if_empty() {
        assert_eq!(none_if_empty(Some(String::new())), None);
        assert_eq!(none_if_empty(None), None);
        assert_eq!(none_if_empty(Some("x".into())), Some("x".to_string()));
    }
}
