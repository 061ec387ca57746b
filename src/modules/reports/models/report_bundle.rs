use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::period::DateRange;
use crate::modules::reports::services::aggregation::{
    DailyRevenue, DimensionTotal, LatePayer, PromptPayer,
};

/// Which report bundle a caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Revenue,
    Outstanding,
    Collection,
    ProfitLoss,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Revenue => write!(f, "revenue"),
            ReportKind::Outstanding => write!(f, "outstanding"),
            ReportKind::Collection => write!(f, "collection"),
            ReportKind::ProfitLoss => write!(f, "profit-loss"),
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(ReportKind::Revenue),
            "outstanding" => Ok(ReportKind::Outstanding),
            "collection" => Ok(ReportKind::Collection),
            "profit-loss" | "profit_loss" => Ok(ReportKind::ProfitLoss),
            _ => Err(format!("Unknown report kind: {}", s)),
        }
    }
}

/// One aging bucket rendered as a table row, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingRow {
    pub bucket: String,
    pub invoice_count: i64,
    pub balance: Decimal,
}

/// Collection performance of one program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramCollection {
    pub program_code: String,
    pub invoiced: Decimal,
    pub collected: Decimal,
    pub rate_pct: Decimal,
}

/// Budget versus actual spend for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRow {
    pub category: String,
    pub budget: Decimal,
    pub actual: Decimal,
    pub variance: Decimal,
}

/// Revenue over a period, broken down along each grouping dimension.
/// Every field is computed from the same filtered payment set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub period: DateRange,
    pub total: Decimal,
    pub by_program: Vec<DimensionTotal>,
    pub by_method: Vec<DimensionTotal>,
    pub by_type: Vec<DimensionTotal>,
    pub daily_trend: Vec<DailyRevenue>,
}

/// Unpaid balances: aging distribution plus the worst offenders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingReport {
    pub period: DateRange,
    pub total_outstanding: Decimal,
    pub open_invoice_count: i64,
    pub aging: Vec<AgingRow>,
    pub late_payers: Vec<LatePayer>,
}

/// How much of the billed amount was actually collected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub period: DateRange,
    pub overall_rate_pct: Decimal,
    pub by_program: Vec<ProgramCollection>,
    pub prompt_payers: Vec<PromptPayer>,
}

/// Revenue against spend, with budget variance per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitLossReport {
    pub period: DateRange,
    pub revenue: Decimal,
    pub realized_expenses: Decimal,
    pub pending_expenses: Decimal,
    pub net: Decimal,
    pub margin_pct: Decimal,
    pub revenue_by_type: Vec<DimensionTotal>,
    pub expenses_by_category: Vec<DimensionTotal>,
    pub budget_variance: Vec<VarianceRow>,
}

/// A fully assembled report, ready for JSON serialization or CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum ReportBundle {
    Revenue(RevenueReport),
    Outstanding(OutstandingReport),
    Collection(CollectionReport),
    ProfitLoss(ProfitLossReport),
}

impl ReportBundle {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportBundle::Revenue(_) => ReportKind::Revenue,
            ReportBundle::Outstanding(_) => ReportKind::Outstanding,
            ReportBundle::Collection(_) => ReportKind::Collection,
            ReportBundle::ProfitLoss(_) => ReportKind::ProfitLoss,
        }
    }

    pub fn period(&self) -> DateRange {
        match self {
            ReportBundle::Revenue(r) => r.period,
            ReportBundle::Outstanding(r) => r.period,
            ReportBundle::Collection(r) => r.period,
            ReportBundle::ProfitLoss(r) => r.period,
        }
    }

    /// True when the underlying fetches produced no rows at all
    pub fn is_empty(&self) -> bool {
        match self {
            ReportBundle::Revenue(r) => r.daily_trend.is_empty() && r.by_program.is_empty(),
            ReportBundle::Outstanding(r) => r.open_invoice_count == 0,
            ReportBundle::Collection(r) => r.by_program.is_empty(),
            ReportBundle::ProfitLoss(r) => {
                r.revenue == Decimal::ZERO
                    && r.realized_expenses == Decimal::ZERO
                    && r.expenses_by_category.is_empty()
            }
        }
    }
}
