use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Payment state shared by rents and expenses.
///
/// Every transition is allowed; `PAID` carries a payment date, the others
/// never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Overdue => "OVERDUE",
        }
    }

    /// Payment date to store alongside this status
    pub fn payment_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            PaymentStatus::Paid => Some(today),
            PaymentStatus::Pending | PaymentStatus::Overdue => None,
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            "OVERDUE" => Ok(PaymentStatus::Overdue),
            other => anyhow::bail!("unknown payment status: {}", other),
        }
    }
}

/// Monthly rent charge derived from a contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rent {
    pub id: String,
    pub contract_id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub landlord_id: String,
    pub amount: Decimal,
    pub reference_month: String,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Rent joined with property and tenant names, plus the derived overdue flag
#[derive(Debug, Clone, Serialize)]
pub struct RentDetails {
    #[serde(flatten)]
    pub rent: Rent,
    pub property_name: String,
    pub property_address: String,
    pub tenant_name: String,
    pub tenant_email: String,
    pub is_overdue: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRentRequest {
    pub contract_id: String,
    pub reference_month: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PaymentStatus,
}
