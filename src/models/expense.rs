use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::PaymentStatus;

/// Kind of charge an expense represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    Water,
    Electricity,
    Gas,
    Internet,
    Condo,
    Cleaning,
    Maintenance,
    Other,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 8] = [
        ExpenseType::Water,
        ExpenseType::Electricity,
        ExpenseType::Gas,
        ExpenseType::Internet,
        ExpenseType::Condo,
        ExpenseType::Cleaning,
        ExpenseType::Maintenance,
        ExpenseType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Water => "WATER",
            ExpenseType::Electricity => "ELECTRICITY",
            ExpenseType::Gas => "GAS",
            ExpenseType::Internet => "INTERNET",
            ExpenseType::Condo => "CONDO",
            ExpenseType::Cleaning => "CLEANING",
            ExpenseType::Maintenance => "MAINTENANCE",
            ExpenseType::Other => "OTHER",
        }
    }

    /// Value derived from meter readings rather than entered directly
    pub fn is_metered(&self) -> bool {
        matches!(self, ExpenseType::Water | ExpenseType::Electricity)
    }
}

impl FromStr for ExpenseType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown expense type: {}", s))
    }
}

/// Utility or other charge derived from a contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub contract_id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub landlord_id: String,
    pub expense_type: ExpenseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_reading: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_reading: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_fee: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_value: Option<Decimal>,
    pub final_value: Decimal,
    pub reference_month: String,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Expense joined with property and tenant names, plus the derived overdue flag
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseDetails {
    #[serde(flatten)]
    pub expense: Expense,
    pub property_name: String,
    pub property_address: String,
    pub tenant_name: String,
    pub tenant_email: String,
    pub is_overdue: bool,
}

/// Row to insert, fully resolved by the ledger service
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub contract_id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub landlord_id: String,
    pub expense_type: ExpenseType,
    pub previous_reading: Option<Decimal>,
    pub current_reading: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub fixed_fee: Option<Decimal>,
    pub computed_value: Option<Decimal>,
    pub final_value: Decimal,
    pub reference_month: String,
    pub due_date: NaiveDate,
    pub description: Option<String>,
}

/// Water or electricity expense billed from meter readings
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMeterExpenseRequest {
    pub contract_id: String,
    pub previous_reading: Decimal,
    pub current_reading: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub fixed_fee: Option<Decimal>,
    pub reference_month: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

/// Expense entered with a flat amount (gas, internet, condo, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFlatExpenseRequest {
    pub contract_id: String,
    pub expense_type: ExpenseType,
    pub amount: Decimal,
    pub reference_month: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustValueRequest {
    pub value: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}
