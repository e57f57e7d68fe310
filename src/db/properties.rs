use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use super::row_helpers::map_property_row;
use crate::models::*;

pub struct PropertyRepo;

impl PropertyRepo {
    pub async fn list_for_landlord(pool: &Pool<Sqlite>, landlord_id: &str) -> Result<Vec<Property>> {
        let rows = sqlx::query("SELECT * FROM properties WHERE landlord_id = ? ORDER BY name")
            .bind(landlord_id)
            .fetch_all(pool)
            .await?;
        rows.iter().map(map_property_row).collect()
    }

    async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<Property>> {
        let row = sqlx::query("SELECT * FROM properties WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_property_row).transpose()
    }

    pub async fn get_owned(
        pool: &Pool<Sqlite>,
        id: &str,
        landlord_id: &str,
    ) -> Result<Option<Property>> {
        let row = sqlx::query("SELECT * FROM properties WHERE id = ? AND landlord_id = ?")
            .bind(id)
            .bind(landlord_id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_property_row).transpose()
    }

    pub async fn create(
        pool: &Pool<Sqlite>,
        landlord_id: &str,
        req: &CreatePropertyRequest,
    ) -> Result<Property> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO properties (id, landlord_id, name, address, description, rent_amount, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&id)
        .bind(landlord_id)
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.description)
        .bind(req.rent_amount.to_string())
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Self::get(pool, &id)
            .await?
            .context("Property not found after creation")
    }
}
