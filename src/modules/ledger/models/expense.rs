use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::payment::PaymentMethod;

/// Expense approval lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Paid,
    Cancelled,
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseStatus::Pending => write!(f, "pending"),
            ExpenseStatus::Approved => write!(f, "approved"),
            ExpenseStatus::Paid => write!(f, "paid"),
            ExpenseStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ExpenseStatus::Pending),
            "approved" => Ok(ExpenseStatus::Approved),
            "paid" => Ok(ExpenseStatus::Paid),
            "cancelled" => Ok(ExpenseStatus::Cancelled),
            _ => Err(format!("Invalid expense status: {}", s)),
        }
    }
}

/// Category classification used for budgeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Operational,
    Fixed,
    Variable,
    Tithe,
    Reserve,
    Other,
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryType::Operational => write!(f, "operational"),
            CategoryType::Fixed => write!(f, "fixed"),
            CategoryType::Variable => write!(f, "variable"),
            CategoryType::Tithe => write!(f, "tithe"),
            CategoryType::Reserve => write!(f, "reserve"),
            CategoryType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "operational" => Ok(CategoryType::Operational),
            "fixed" => Ok(CategoryType::Fixed),
            "variable" => Ok(CategoryType::Variable),
            "tithe" => Ok(CategoryType::Tithe),
            "reserve" => Ok(CategoryType::Reserve),
            "other" => Ok(CategoryType::Other),
            _ => Err(format!("Invalid category type: {}", s)),
        }
    }
}

/// An operational expense
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseRecord {
    pub id: String,
    pub category_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub status: ExpenseStatus,
    pub vendor_name: String,
    pub payment_method: PaymentMethod,
}

impl ExpenseRecord {
    /// Only approved or paid expenses count toward realized spend; pending
    /// ones total separately and cancelled ones not at all.
    pub fn is_realized(&self) -> bool {
        matches!(self.status, ExpenseStatus::Approved | ExpenseStatus::Paid)
    }
}

/// Expense category with an optional per-period budget
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseCategory {
    pub id: String,
    pub name: String,
    pub category_type: CategoryType,
    pub budget_amount: Option<Decimal>,
}
