//! Per-role dashboard view models and their summary statistics.
//!
//! Empty portfolios are a normal state: every view succeeds with empty
//! collections and zeroed summaries.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{ServiceError, Session};
use crate::billing::BillingError;
use crate::db::{Party, Store};
use crate::models::*;

/// Sum of amounts and number of entries with the given status
fn tally<'a, I>(items: I, status: PaymentStatus) -> Result<(Decimal, usize), BillingError>
where
    I: IntoIterator<Item = (PaymentStatus, &'a Decimal)>,
{
    items
        .into_iter()
        .filter(|(s, _)| *s == status)
        .try_fold((Decimal::ZERO, 0), |(sum, n), (_, amount)| {
            sum.checked_add(*amount)
                .map(|sum| (sum, n + 1))
                .ok_or(BillingError::Overflow)
        })
}

/// Still PENDING after its due date
fn is_overdue(status: PaymentStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    status == PaymentStatus::Pending && due_date < today
}

fn flag_overdue(rents: &mut [RentDetails], expenses: &mut [ExpenseDetails], today: NaiveDate) {
    for r in rents.iter_mut() {
        r.is_overdue = is_overdue(r.rent.status, r.rent.due_date, today);
    }
    for e in expenses.iter_mut() {
        e.is_overdue = is_overdue(e.expense.status, e.expense.due_date, today);
    }
}

async fn current_user(store: &Store, session: &Session) -> Result<User, ServiceError> {
    store
        .get_user(&session.user_id)
        .await?
        .ok_or(ServiceError::Unauthenticated)
}

pub async fn tenant_dashboard(
    store: &Store,
    session: &Session,
    today: NaiveDate,
) -> Result<TenantDashboard, ServiceError> {
    session.require_tenant()?;
    let user = current_user(store, session).await?;

    let party = Party::Tenant(&session.user_id);
    let mut rents = store.list_rents(party).await?;
    let mut expenses = store.list_expenses(party).await?;
    flag_overdue(&mut rents, &mut expenses, today);

    let (total_pending, pending_count) = tally(
        rents.iter().map(|r| (r.rent.status, &r.rent.amount)),
        PaymentStatus::Pending,
    )?;
    let (total_expenses_pending, expenses_pending_count) = tally(
        expenses.iter().map(|e| (e.expense.status, &e.expense.final_value)),
        PaymentStatus::Pending,
    )?;

    let summary = TenantSummary {
        total_pending,
        pending_count,
        total_rents: rents.len(),
        total_expenses_pending,
        expenses_pending_count,
    };

    Ok(TenantDashboard {
        user,
        rents,
        expenses,
        summary,
    })
}

pub async fn landlord_dashboard(
    store: &Store,
    session: &Session,
    today: NaiveDate,
) -> Result<LandlordDashboard, ServiceError> {
    session.require_landlord()?;
    let user = current_user(store, session).await?;

    let properties = store.list_properties(&session.user_id).await?;
    let contracts = store.list_active_contracts(&session.user_id).await?;

    let party = Party::Landlord(&session.user_id);
    let mut rents = store.list_rents(party).await?;
    let mut expenses = store.list_expenses(party).await?;
    flag_overdue(&mut rents, &mut expenses, today);

    let rent_amounts = || rents.iter().map(|r| (r.rent.status, &r.rent.amount));
    let (total_pending, pending_count) = tally(rent_amounts(), PaymentStatus::Pending)?;
    let (total_received, _) = tally(rent_amounts(), PaymentStatus::Paid)?;

    let expense_amounts = || expenses.iter().map(|e| (e.expense.status, &e.expense.final_value));
    let (total_expenses_pending, expenses_pending_count) =
        tally(expense_amounts(), PaymentStatus::Pending)?;
    let (total_expenses_received, _) = tally(expense_amounts(), PaymentStatus::Paid)?;

    let summary = LandlordSummary {
        total_received,
        total_pending,
        pending_count,
        total_rents: rents.len(),
        total_properties: properties.len(),
        total_contracts: contracts.len(),
        total_expenses_pending,
        expenses_pending_count,
        total_expenses_received,
    };

    Ok(LandlordDashboard {
        user,
        properties,
        contracts,
        rents,
        expenses,
        summary,
    })
}

/// Dashboard matching the caller's role
pub async fn dashboard_for(
    store: &Store,
    session: &Session,
    today: NaiveDate,
) -> Result<Dashboard, ServiceError> {
    match session.role {
        Role::Tenant => Ok(Dashboard::Tenant(tenant_dashboard(store, session, today).await?)),
        Role::Landlord => Ok(Dashboard::Landlord(
            landlord_dashboard(store, session, today).await?,
        )),
    }
}
