use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::payment::TransactionType;

/// Invoice status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Issued, nothing paid yet
    Pending,
    /// Partially paid
    Partial,
    /// Fully paid
    Paid,
    /// Past due date with an open balance
    Overdue,
    /// Voided; excluded from every reporting cohort
    Cancelled,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Pending => write!(f, "pending"),
            InvoiceStatus::Partial => write!(f, "partial"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
            InvoiceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "partial" => Ok(InvoiceStatus::Partial),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// A billed amount owed by a student
///
/// Invariant: `0 <= paid_amount <= amount`, so `balance()` is never
/// negative. The stored `overdue` status must agree with
/// `is_overdue(today)`; reporting code derives overdueness from the dates
/// rather than trusting the stored value.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    /// Unique invoice ID (UUID)
    pub id: String,

    pub student_id: String,

    pub class_id: String,

    /// Program of the billed class, denormalized at fetch time so one
    /// record set serves both program grouping and per-invoice views
    pub program_code: String,

    pub invoice_type: TransactionType,

    /// Billed amount
    pub amount: Decimal,

    /// Amount settled so far
    pub paid_amount: Decimal,

    pub due_date: NaiveDate,

    pub status: InvoiceStatus,

    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Open balance, never negative
    pub fn balance(&self) -> Decimal {
        self.amount - self.paid_amount
    }

    /// An invoice is overdue iff it is past due with an open balance
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.due_date < as_of && self.balance() > Decimal::ZERO
    }

    /// Fully paid invoices leave the aging and late-payer cohorts entirely
    pub fn is_settled(&self) -> bool {
        self.balance() == Decimal::ZERO
    }
}
