use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use super::row_helpers::{map_contract_row, map_joined_names};
use super::{unique_or, DuplicateError};
use crate::models::*;

const ACTIVE_CONTRACT_EXISTS: &str = "This property already has an active contract";

pub struct ContractRepo;

impl ContractRepo {
    pub async fn get_owned_active(
        pool: &Pool<Sqlite>,
        id: &str,
        landlord_id: &str,
    ) -> Result<Option<Contract>> {
        let row = sqlx::query(
            "SELECT * FROM contracts WHERE id = ? AND landlord_id = ? AND active = 1",
        )
        .bind(id)
        .bind(landlord_id)
        .fetch_optional(pool)
        .await?;
        row.as_ref().map(map_contract_row).transpose()
    }

    /// Active contracts of a landlord with property and tenant display data
    pub async fn list_active_details(
        pool: &Pool<Sqlite>,
        landlord_id: &str,
    ) -> Result<Vec<ContractDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT c.*,
                   p.name AS property_name, p.address AS property_address,
                   u.full_name AS tenant_name, u.email AS tenant_email
            FROM contracts c
            JOIN properties p ON p.id = c.property_id
            JOIN users u ON u.id = c.tenant_id
            WHERE c.landlord_id = ? AND c.active = 1
            ORDER BY c.start_date DESC
            "#,
        )
        .bind(landlord_id)
        .fetch_all(pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<ContractDetails> {
                let names = map_joined_names(row)?;
                Ok(ContractDetails {
                    contract: map_contract_row(row)?,
                    property_name: names.property_name,
                    property_address: names.property_address,
                    tenant_name: names.tenant_name,
                    tenant_email: names.tenant_email,
                })
            })
            .collect()
    }

    /// Insert a contract unless the property already has an active one.
    ///
    /// The check and the insert share a transaction; the partial unique
    /// index on active contracts catches anything that slips past the check.
    pub async fn create(
        pool: &Pool<Sqlite>,
        property: &Property,
        tenant: &User,
        req: &CreateContractRequest,
    ) -> Result<Contract> {
        let mut tx = pool.begin().await?;

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT id FROM contracts WHERE property_id = ? AND active = 1")
                .bind(&property.id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Err(DuplicateError::new(ACTIVE_CONTRACT_EXISTS).into());
        }

        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO contracts (id, property_id, tenant_id, landlord_id, start_date, end_date,
                                   rent_amount, due_day, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&id)
        .bind(&property.id)
        .bind(&tenant.id)
        .bind(&property.landlord_id)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.rent_amount.to_string())
        .bind(i64::from(req.due_day))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_or(e, ACTIVE_CONTRACT_EXISTS))?;

        let row = sqlx::query("SELECT * FROM contracts WHERE id = ?")
            .bind(&id)
            .fetch_one(&mut *tx)
            .await
            .context("Contract not found after creation")?;
        let contract = map_contract_row(&row)?;

        tx.commit().await?;
        Ok(contract)
    }
}
