use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::{Invoice, InvoiceStatus};

/// Days past due after which an open balance suspends the student
const SUSPENSION_GRACE_DAYS: i64 = 60;

/// Derived per-student financial position
///
/// The legacy schema persisted this as a cache table that drifted from the
/// invoice rows. Here it is never stored: always recomputed from the
/// invoices, so there is exactly one code path producing these numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentFinancialStatus {
    pub student_id: String,
    /// Class of the most recently issued invoice, if any
    pub class_id: Option<String>,
    pub total_fee: Decimal,
    pub paid_amount: Decimal,
    pub balance: Decimal,
    pub is_suspended: bool,
    /// Earliest due date among invoices with an open balance
    pub next_payment_due: Option<NaiveDate>,
}

impl StudentFinancialStatus {
    /// Recompute the status from a student's invoices.
    ///
    /// Cancelled invoices are ignored. Suspension triggers when any open
    /// balance is more than `SUSPENSION_GRACE_DAYS` past due as of `as_of`.
    pub fn derive(student_id: &str, invoices: &[Invoice], as_of: NaiveDate) -> Self {
        let mut active: Vec<&Invoice> = invoices
            .iter()
            .filter(|inv| inv.student_id == student_id && inv.status != InvoiceStatus::Cancelled)
            .collect();
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let total_fee: Decimal = active.iter().map(|inv| inv.amount).sum();
        let paid_amount: Decimal = active.iter().map(|inv| inv.paid_amount).sum();

        let open: Vec<&&Invoice> = active
            .iter()
            .filter(|inv| inv.balance() > Decimal::ZERO)
            .collect();

        let suspension_cutoff = as_of - Duration::days(SUSPENSION_GRACE_DAYS);
        let is_suspended = open.iter().any(|inv| inv.due_date < suspension_cutoff);
        let next_payment_due = open.iter().map(|inv| inv.due_date).min();

        Self {
            student_id: student_id.to_string(),
            class_id: active.last().map(|inv| inv.class_id.clone()),
            total_fee,
            paid_amount,
            balance: total_fee - paid_amount,
            is_suspended,
            next_payment_due,
        }
    }
}
