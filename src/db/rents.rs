use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Sqlite};

use super::row_helpers::{map_joined_names, map_rent_row};
use super::{unique_or, DuplicateError, NotFoundError, Party};
use crate::models::*;

const RENT_EXISTS: &str = "A rent already exists for this month on this contract";

pub struct RentRepo;

impl RentRepo {
    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Rent>> {
        let row = sqlx::query("SELECT * FROM rents WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_rent_row).transpose()
    }

    /// Rents of one tenant or landlord, newest reference month first
    pub async fn list_details(pool: &Pool<Sqlite>, party: Party<'_>) -> Result<Vec<RentDetails>> {
        let sql = format!(
            r#"
            SELECT r.*,
                   p.name AS property_name, p.address AS property_address,
                   u.full_name AS tenant_name, u.email AS tenant_email
            FROM rents r
            JOIN properties p ON p.id = r.property_id
            JOIN users u ON u.id = r.tenant_id
            WHERE r.{} = ?
            ORDER BY r.reference_month DESC, r.created_at DESC
            "#,
            party.column()
        );
        let rows = sqlx::query(&sql).bind(party.id()).fetch_all(pool).await?;

        rows.iter()
            .map(|row| -> Result<RentDetails> {
                let names = map_joined_names(row)?;
                Ok(RentDetails {
                    rent: map_rent_row(row)?,
                    property_name: names.property_name,
                    property_address: names.property_address,
                    tenant_name: names.tenant_name,
                    tenant_email: names.tenant_email,
                    is_overdue: false,
                })
            })
            .collect()
    }

    /// Insert a PENDING rent priced from the contract, one per reference month
    pub async fn create(
        pool: &Pool<Sqlite>,
        contract: &Contract,
        reference_month: &str,
        due_date: NaiveDate,
        description: Option<&str>,
    ) -> Result<Rent> {
        let mut tx = pool.begin().await?;

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT id FROM rents WHERE contract_id = ? AND reference_month = ?")
                .bind(&contract.id)
                .bind(reference_month)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Err(DuplicateError::new(RENT_EXISTS).into());
        }

        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO rents (id, contract_id, property_id, tenant_id, landlord_id, amount,
                               reference_month, due_date, status, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&contract.id)
        .bind(&contract.property_id)
        .bind(&contract.tenant_id)
        .bind(&contract.landlord_id)
        .bind(contract.rent_amount.to_string())
        .bind(reference_month)
        .bind(due_date)
        .bind(PaymentStatus::Pending.as_str())
        .bind(description)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or(e, RENT_EXISTS))?;

        let row = sqlx::query("SELECT * FROM rents WHERE id = ?")
            .bind(&id)
            .fetch_one(&mut *tx)
            .await
            .context("Rent not found after creation")?;
        let rent = map_rent_row(&row)?;

        tx.commit().await?;
        Ok(rent)
    }

    pub async fn update_status(
        pool: &Pool<Sqlite>,
        id: &str,
        status: PaymentStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<Rent> {
        let result = sqlx::query("UPDATE rents SET status = ?, payment_date = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(payment_date)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError::new("Rent", id).into());
        }

        Self::get(pool, id)
            .await?
            .context("Rent not found after update")
    }
}
