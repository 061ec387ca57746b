use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::money::round_display;
use crate::core::Result;
use crate::modules::ledger::models::{Invoice, PaymentRecord, StudentFinancialStatus};
use crate::modules::ledger::LedgerReader;

/// A student's financial statement: derived position plus the raw rows it
/// was derived from, so the portal can show both the headline numbers and
/// the history behind them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentStatement {
    pub status: StudentFinancialStatus,
    pub invoices: Vec<Invoice>,
    pub payments: Vec<PaymentRecord>,
}

/// Builds student statements from ledger facts.
///
/// The legacy portal kept a per-student financial cache table that drifted
/// from the invoice rows; this service recomputes the position on every
/// read instead of trusting any stored copy.
pub struct StatementService {
    ledger: Arc<dyn LedgerReader>,
}

impl StatementService {
    pub fn new(ledger: Arc<dyn LedgerReader>) -> Self {
        Self { ledger }
    }

    /// Assemble the statement for one student as of a date.
    ///
    /// A student with no rows gets a zero-valued statement, not an error.
    pub async fn student_statement(
        &self,
        student_id: &str,
        as_of: NaiveDate,
    ) -> Result<StudentStatement> {
        let (invoices, payments) = tokio::try_join!(
            self.ledger.fetch_student_invoices(student_id),
            self.ledger.fetch_student_payments(student_id),
        )?;

        info!(
            student_id = %student_id,
            invoices = invoices.len(),
            payments = payments.len(),
            "Assembling student statement"
        );

        let mut status = StudentFinancialStatus::derive(student_id, &invoices, as_of);
        status.total_fee = round_display(status.total_fee);
        status.paid_amount = round_display(status.paid_amount);
        status.balance = round_display(status.balance);

        Ok(StudentStatement {
            status,
            invoices,
            payments,
        })
    }
}
