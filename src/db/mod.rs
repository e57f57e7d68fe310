mod contracts;
mod expenses;
mod properties;
mod rents;
pub(crate) mod row_helpers;
mod users;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::models::*;

/// Typed error for "resource not found", downcast by the service layer
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Typed error for a violated uniqueness rule, whether caught by the
/// pre-insert check or by the unique index.
#[derive(Debug)]
pub struct DuplicateError {
    pub message: String,
}

impl DuplicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DuplicateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DuplicateError {}

/// SQLite extended codes for UNIQUE / PRIMARY KEY constraint failures
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation()
                || db
                    .code()
                    .map(|c| matches!(c.as_ref(), "2067" | "1555"))
                    .unwrap_or(false)
        }
        _ => false,
    }
}

/// Convert an insert failure, turning a unique-index hit into [`DuplicateError`]
pub(crate) fn unique_or(err: sqlx::Error, message: &str) -> anyhow::Error {
    if is_unique_violation(&err) {
        DuplicateError::new(message).into()
    } else {
        err.into()
    }
}

/// Which side of a contract a listing is scoped to
#[derive(Debug, Clone, Copy)]
pub enum Party<'a> {
    Tenant(&'a str),
    Landlord(&'a str),
}

impl Party<'_> {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Party::Tenant(_) => "tenant_id",
            Party::Landlord(_) => "landlord_id",
        }
    }

    pub(crate) fn id(&self) -> &str {
        match self {
            Party::Tenant(id) | Party::Landlord(id) => id,
        }
    }
}

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Single-connection in-memory store, schema applied
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Seed one approved landlord when no account exists yet, so that
    /// landlord-access requests have someone to review them.
    pub async fn seed_bootstrap_landlord(&self, email: &str, password: &str) -> Result<()> {
        if users::UserRepo::count(&self.pool).await? > 0 {
            return Ok(());
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash bootstrap password: {}", e))?;

        let user = users::UserRepo::create(
            &self.pool,
            "Administrator",
            email,
            &password_hash,
            Role::Landlord,
            AccessStatus::Approved,
        )
        .await?;
        tracing::info!("Created bootstrap landlord account (email: {})", user.email);
        Ok(())
    }

    // ========== User Operations ==========

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        users::UserRepo::get(&self.pool, id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        users::UserRepo::get_by_email(&self.pool, email).await
    }

    pub async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        users::UserRepo::create(
            &self.pool,
            full_name,
            email,
            password_hash,
            Role::Tenant,
            AccessStatus::Undefined,
        )
        .await
    }

    pub async fn set_user_access(&self, id: &str, role: Role, status: AccessStatus) -> Result<User> {
        users::UserRepo::set_access(&self.pool, id, role, status).await
    }

    // ========== Property Operations ==========

    pub async fn list_properties(&self, landlord_id: &str) -> Result<Vec<Property>> {
        properties::PropertyRepo::list_for_landlord(&self.pool, landlord_id).await
    }

    pub async fn get_owned_property(&self, id: &str, landlord_id: &str) -> Result<Option<Property>> {
        properties::PropertyRepo::get_owned(&self.pool, id, landlord_id).await
    }

    pub async fn create_property(
        &self,
        landlord_id: &str,
        req: &CreatePropertyRequest,
    ) -> Result<Property> {
        properties::PropertyRepo::create(&self.pool, landlord_id, req).await
    }

    // ========== Contract Operations ==========

    pub async fn get_owned_active_contract(
        &self,
        id: &str,
        landlord_id: &str,
    ) -> Result<Option<Contract>> {
        contracts::ContractRepo::get_owned_active(&self.pool, id, landlord_id).await
    }

    pub async fn list_active_contracts(&self, landlord_id: &str) -> Result<Vec<ContractDetails>> {
        contracts::ContractRepo::list_active_details(&self.pool, landlord_id).await
    }

    pub async fn create_contract(
        &self,
        property: &Property,
        tenant: &User,
        req: &CreateContractRequest,
    ) -> Result<Contract> {
        contracts::ContractRepo::create(&self.pool, property, tenant, req).await
    }

    // ========== Rent Operations ==========

    pub async fn get_rent(&self, id: &str) -> Result<Option<Rent>> {
        rents::RentRepo::get(&self.pool, id).await
    }

    pub async fn list_rents(&self, party: Party<'_>) -> Result<Vec<RentDetails>> {
        rents::RentRepo::list_details(&self.pool, party).await
    }

    pub async fn create_rent(
        &self,
        contract: &Contract,
        reference_month: &str,
        due_date: NaiveDate,
        description: Option<&str>,
    ) -> Result<Rent> {
        rents::RentRepo::create(&self.pool, contract, reference_month, due_date, description).await
    }

    pub async fn update_rent_status(
        &self,
        id: &str,
        status: PaymentStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<Rent> {
        rents::RentRepo::update_status(&self.pool, id, status, payment_date).await
    }

    // ========== Expense Operations ==========

    pub async fn get_expense(&self, id: &str) -> Result<Option<Expense>> {
        expenses::ExpenseRepo::get(&self.pool, id).await
    }

    pub async fn list_expenses(&self, party: Party<'_>) -> Result<Vec<ExpenseDetails>> {
        expenses::ExpenseRepo::list_details(&self.pool, party).await
    }

    pub async fn create_expense(&self, new: &NewExpense) -> Result<Expense> {
        expenses::ExpenseRepo::create(&self.pool, new).await
    }

    pub async fn update_expense_status(
        &self,
        id: &str,
        status: PaymentStatus,
        payment_date: Option<NaiveDate>,
    ) -> Result<Expense> {
        expenses::ExpenseRepo::update_status(&self.pool, id, status, payment_date).await
    }

    pub async fn adjust_expense_value(
        &self,
        id: &str,
        final_value: Decimal,
        notes: &str,
    ) -> Result<Expense> {
        expenses::ExpenseRepo::adjust_value(&self.pool, id, final_value, notes).await
    }
}
