use rust_decimal::Decimal;
use serde::Serialize;

use super::{ContractDetails, ExpenseDetails, Property, RentDetails, User};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TenantSummary {
    pub total_pending: Decimal,
    pub pending_count: usize,
    pub total_rents: usize,
    pub total_expenses_pending: Decimal,
    pub expenses_pending_count: usize,
}

/// Everything a tenant sees on their dashboard
#[derive(Debug, Clone, Serialize)]
pub struct TenantDashboard {
    pub user: User,
    pub rents: Vec<RentDetails>,
    pub expenses: Vec<ExpenseDetails>,
    pub summary: TenantSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LandlordSummary {
    pub total_received: Decimal,
    pub total_pending: Decimal,
    pub pending_count: usize,
    pub total_rents: usize,
    pub total_properties: usize,
    pub total_contracts: usize,
    pub total_expenses_pending: Decimal,
    pub expenses_pending_count: usize,
    pub total_expenses_received: Decimal,
}

/// Everything a landlord sees on their dashboard
#[derive(Debug, Clone, Serialize)]
pub struct LandlordDashboard {
    pub user: User,
    pub properties: Vec<Property>,
    pub contracts: Vec<ContractDetails>,
    pub rents: Vec<RentDetails>,
    pub expenses: Vec<ExpenseDetails>,
    pub summary: LandlordSummary,
}

/// Role-dispatched dashboard, tagged with the view it holds
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "user_type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dashboard {
    Tenant(TenantDashboard),
    Landlord(LandlordDashboard),
}
