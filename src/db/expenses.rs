use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};

use super::row_helpers::{map_expense_row, map_joined_names};
use super::{unique_or, DuplicateError, NotFoundError, Party};
use crate::models::*;

fn duplicate_message(expense_type: ExpenseType) -> String {
    format!(
        "A {} expense already exists for this month on this contract",
        expense_type.as_str().to_lowercase()
    )
}

pub struct ExpenseRepo;

impl ExpenseRepo {
    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Expense>> {
        let row = sqlx::query("SELECT * FROM expenses WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_expense_row).transpose()
    }

    /// Expenses of one tenant or landlord, newest reference month first
    pub async fn list_details(
        pool: &Pool<Sqlite>,
        party: Party<'_>,
    ) -> Result<Vec<ExpenseDetails>> {
        let sql = format!(
            r#"
            SELECT e.*,
                   p.name AS property_name, p.address AS property_address,
                   u.full_name AS tenant_name, u.email AS tenant_email
            FROM expenses e
            JOIN properties p ON p.id = e.property_id
            JOIN users u ON u.id = e.tenant_id
            WHERE e.{} = ?
            ORDER BY e.reference_month DESC, e.created_at DESC
            "#,
            party.column()
        );
        let rows = sqlx::query(&sql).bind(party.id()).fetch_all(pool).await?;

        rows.iter()
            .map(|row| -> Result<ExpenseDetails> {
                let names = map_joined_names(row)?;
                Ok(ExpenseDetails {
                    expense: map_expense_row(row)?,
                    property_name: names.property_name,
                    property_address: names.property_address,
                    tenant_name: names.tenant_name,
                    tenant_email: names.tenant_email,
                    is_overdue: false,
                })
            })
            .collect()
    }

    /// Insert a PENDING expense.
    ///
    /// Meter-billed types are unique per (contract, type, month); the check
    /// runs in the insert's transaction and the partial unique index backs it.
    pub async fn create(pool: &Pool<Sqlite>, new: &NewExpense) -> Result<Expense> {
        let mut tx = pool.begin().await?;

        if new.expense_type.is_metered() {
            let existing: Option<(String,)> = sqlx::query_as(
                "SELECT id FROM expenses WHERE contract_id = ? AND expense_type = ? AND reference_month = ?",
            )
            .bind(&new.contract_id)
            .bind(new.expense_type.as_str())
            .bind(&new.reference_month)
            .fetch_optional(&mut *tx)
            .await?;
            if existing.is_some() {
                return Err(DuplicateError::new(duplicate_message(new.expense_type)).into());
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO expenses (id, contract_id, property_id, tenant_id, landlord_id, expense_type,
                                  previous_reading, current_reading, unit_price, fixed_fee,
                                  computed_value, final_value, reference_month, due_date,
                                  status, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.contract_id)
        .bind(&new.property_id)
        .bind(&new.tenant_id)
        .bind(&new.landlord_id)
        .bind(new.expense_type.as_str())
        .bind(new.previous_reading.map(|d| d.to_string()))
        .bind(new.current_reading.map(|d| d.to_string()))
        .bind(new.unit_price.map(|d| d.to_string()))
        .bind(new.fixed_fee.map(|d| d.to_string()))
        .bind(new.computed_value.map(|d| d.to_string()))
        .bind(new.final_value.to_string())
        .bind(&new.reference_month)
        .bind(new.due_date)
        .bind(PaymentStatus::Pending.as_str())
        .bind(&new.description)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or(e, &duplicate_message(new.expense_type)))?;

        let row = sqlx::query("SELECT * FROM expenses WHERE id = ?")
            .bind(&id)
            .fetch_one(&mut *tx)
            .await
            .context("Expense not found after creation")?;
        let expense = map_expense_row(&row)?;

        tx.commit().await?;
        Ok(expense)
    }

    pub async fn update_status(
        pool: &Pool<Sqlite>,
        id: &str,
        status: PaymentStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<Expense> {
        let result = sqlx::query("UPDATE expenses SET status = ?, payment_date = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(payment_date)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Expense", id).into());
        }

        Self::get(pool, id)
            .await?
            .context("Expense not found after update")
    }

    /// Overwrite the final value and audit note; the computed value is kept
    pub async fn adjust_value(
        pool: &Pool<Sqlite>,
        id: &str,
        final_value: Decimal,
        notes: &str,
    ) -> Result<Expense> {
        let result = sqlx::query("UPDATE expenses SET final_value = ?, notes = ? WHERE id = ?")
            .bind(final_value.to_string())
            .bind(notes)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Expense", id).into());
        }

        Self::get(pool, id)
            .await?
            .context("Expense not found after update")
    }
}
