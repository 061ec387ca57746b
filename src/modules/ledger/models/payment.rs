use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Payment status lifecycle
///
/// Completed payments are immutable; cancellation is soft (status change),
/// rows are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
    Refunded,
    Cancelled,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "completed" => Ok(PaymentStatus::Completed),
            "pending" => Ok(PaymentStatus::Pending),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    Ewallet,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Ewallet => write!(f, "ewallet"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "card" => Ok(PaymentMethod::Card),
            "ewallet" => Ok(PaymentMethod::Ewallet),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

/// What a payment (or invoice) is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Registration,
    Tuition,
    Service,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Registration => write!(f, "registration"),
            TransactionType::Tuition => write!(f, "tuition"),
            TransactionType::Service => write!(f, "service"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "registration" => Ok(TransactionType::Registration),
            "tuition" => Ok(TransactionType::Tuition),
            "service" => Ok(TransactionType::Service),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

/// A single payment made by a student
///
/// Read-only fact for reporting purposes: created by the billing workflow,
/// never mutated by the aggregation side.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentRecord {
    /// Unique payment ID (UUID)
    pub id: String,

    /// Paying student
    pub student_id: String,

    /// Amount paid, non-negative
    pub amount: Decimal,

    pub payment_method: PaymentMethod,

    pub status: PaymentStatus,

    pub transaction_type: TransactionType,

    /// When the payment was recorded (UTC)
    pub created_at: DateTime<Utc>,

    /// Program the payment belongs to (grouping dimension)
    pub program_code: String,

    pub class_id: String,

    /// Invoice the payment settles, when it settles one
    pub invoice_id: Option<String>,
}

impl PaymentRecord {
    /// Calendar day the payment landed on, used for range checks and trends
    pub fn paid_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}
