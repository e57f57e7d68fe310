use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Contract binds one property to one tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub landlord_id: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub rent_amount: Decimal,
    pub due_day: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Contract joined with its property and tenant for display
#[derive(Debug, Clone, Serialize)]
pub struct ContractDetails {
    #[serde(flatten)]
    pub contract: Contract,
    pub property_name: String,
    pub property_address: String,
    pub tenant_name: String,
    pub tenant_email: String,
}

fn default_due_day() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContractRequest {
    pub property_id: String,
    pub tenant_email: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub rent_amount: Decimal,
    #[serde(default = "default_due_day")]
    pub due_day: u32,
}
