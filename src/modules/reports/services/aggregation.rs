//! Financial aggregation rules.
//!
//! Every function here is pure and total: in-memory slices in, values out.
//! Empty input, zero denominators and missing optional fields produce zero
//! or empty defaults, never a panic, NaN or infinity. Amounts accumulate at
//! full `Decimal` precision; presentation rounding belongs to the assembler.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money::ratio_pct;
use crate::modules::ledger::models::{
    ExpenseCategory, ExpenseRecord, ExpenseStatus, Invoice, PaymentRecord,
};

/// A grouped revenue or spend total for one dimension value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTotal {
    pub key: String,
    pub total: Decimal,
    /// Number of records that contributed to this total
    pub count: i64,
}

/// Aging classification of an unpaid invoice, ordered for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    Overdue1To30,
    Overdue31To60,
    Overdue61To90,
    OverdueOver90,
    DueIn7Days,
    DueIn30Days,
    DueAfter30Days,
}

impl std::fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AgingBucket::Overdue1To30 => "1-30 days",
            AgingBucket::Overdue31To60 => "31-60 days",
            AgingBucket::Overdue61To90 => "61-90 days",
            AgingBucket::OverdueOver90 => ">90 days",
            AgingBucket::DueIn7Days => "Due in 7 days",
            AgingBucket::DueIn30Days => "Due in 30 days",
            AgingBucket::DueAfter30Days => "Due after 30 days",
        };
        write!(f, "{}", label)
    }
}

/// Count and balance sum of the invoices in one aging bucket
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgingSlice {
    pub count: i64,
    pub balance: Decimal,
}

/// Net result and guarded margin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitLoss {
    pub net: Decimal,
    pub margin_pct: Decimal,
}

/// A student ranked by overdue balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatePayer {
    pub student_id: String,
    /// Total overdue balance across the student's overdue invoices
    pub balance: Decimal,
    /// Days overdue of the oldest overdue invoice
    pub days_overdue: i64,
}

/// A student ranked by how early they settle invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPayer {
    pub student_id: String,
    pub payment_count: i64,
    /// Average (payment date − due date) in days; negative means early
    pub avg_days_late: Decimal,
}

/// Completed revenue of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub day: NaiveDate,
    pub total: Decimal,
}

/// Sum of completed payment amounts
pub fn total_revenue(payments: &[PaymentRecord]) -> Decimal {
    payments
        .iter()
        .filter(|p| p.is_completed())
        .map(|p| p.amount)
        .sum()
}

/// Group completed payments by an arbitrary key and sum per group.
///
/// Ordering is deterministic: descending total, then ascending key, so two
/// runs over the same rows always render identically.
pub fn revenue_by_dimension<F>(payments: &[PaymentRecord], key_fn: F) -> Vec<DimensionTotal>
where
    F: Fn(&PaymentRecord) -> String,
{
    let mut groups: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
    for payment in payments.iter().filter(|p| p.is_completed()) {
        let entry = groups.entry(key_fn(payment)).or_default();
        entry.0 += payment.amount;
        entry.1 += 1;
    }

    let mut totals: Vec<DimensionTotal> = groups
        .into_iter()
        .map(|(key, (total, count))| DimensionTotal { key, total, count })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    totals
}

/// Collected percentage of the billed amount for a cohort of invoices.
///
/// Exactly zero when nothing was billed, never NaN or infinity.
pub fn collection_rate(invoices: &[Invoice]) -> Decimal {
    let billed: Decimal = invoices.iter().map(|inv| inv.amount).sum();
    let collected: Decimal = invoices.iter().map(|inv| inv.paid_amount).sum();
    ratio_pct(collected, billed)
}

/// Assign one invoice to its aging bucket as of a date.
///
/// Returns `None` for settled invoices: fully paid invoices never appear in
/// aging. The overdue buckets are closed-open: boundary days 30/60/90
/// belong to the lower bucket.
pub fn assign_bucket(invoice: &Invoice, as_of: NaiveDate) -> Option<AgingBucket> {
    if invoice.is_settled() {
        return None;
    }

    if invoice.due_date < as_of {
        let days_overdue = (as_of - invoice.due_date).num_days();
        let bucket = if days_overdue <= 30 {
            AgingBucket::Overdue1To30
        } else if days_overdue <= 60 {
            AgingBucket::Overdue31To60
        } else if days_overdue <= 90 {
            AgingBucket::Overdue61To90
        } else {
            AgingBucket::OverdueOver90
        };
        return Some(bucket);
    }

    let days_until_due = (invoice.due_date - as_of).num_days();
    let bucket = if days_until_due <= 7 {
        AgingBucket::DueIn7Days
    } else if days_until_due <= 30 {
        AgingBucket::DueIn30Days
    } else {
        AgingBucket::DueAfter30Days
    };
    Some(bucket)
}

/// Bucket every unpaid invoice; the buckets partition the unpaid cohort
pub fn aging_buckets(
    invoices: &[Invoice],
    as_of: NaiveDate,
) -> BTreeMap<AgingBucket, AgingSlice> {
    let mut buckets: BTreeMap<AgingBucket, AgingSlice> = BTreeMap::new();
    for invoice in invoices {
        if let Some(bucket) = assign_bucket(invoice, as_of) {
            let slice = buckets.entry(bucket).or_default();
            slice.count += 1;
            slice.balance += invoice.balance();
        }
    }
    buckets
}

/// Budget minus actual per category, over the union of both key sets.
///
/// A category with spend but no budget row gets budget 0, so its variance
/// is simply the negated spend, never an absent entry.
pub fn budget_variance(
    actual_by_category: &BTreeMap<String, Decimal>,
    budget_by_category: &BTreeMap<String, Decimal>,
) -> BTreeMap<String, Decimal> {
    let mut variance = BTreeMap::new();
    for key in actual_by_category.keys().chain(budget_by_category.keys()) {
        let actual = actual_by_category
            .get(key)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let budget = budget_by_category
            .get(key)
            .copied()
            .unwrap_or(Decimal::ZERO);
        variance.insert(key.clone(), budget - actual);
    }
    variance
}

/// Net result and margin; margin is zero when there was no revenue
pub fn profit_loss(revenue: Decimal, expenses: Decimal) -> ProfitLoss {
    let net = revenue - expenses;
    ProfitLoss {
        net,
        margin_pct: ratio_pct(net, revenue),
    }
}

/// Students with overdue balances, worst first.
///
/// Overdueness is derived from due date and balance against `as_of` rather
/// than the stored status column, which can lag. Descending total overdue
/// balance, ties by ascending student id.
pub fn late_payer_ranking(invoices: &[Invoice], as_of: NaiveDate) -> Vec<LatePayer> {
    let mut per_student: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
    for invoice in invoices.iter().filter(|inv| inv.is_overdue(as_of)) {
        let days_overdue = (as_of - invoice.due_date).num_days();
        let entry = per_student.entry(invoice.student_id.clone()).or_default();
        entry.0 += invoice.balance();
        entry.1 = entry.1.max(days_overdue);
    }

    let mut ranking: Vec<LatePayer> = per_student
        .into_iter()
        .map(|(student_id, (balance, days_overdue))| LatePayer {
            student_id,
            balance,
            days_overdue,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.balance
            .cmp(&a.balance)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    ranking
}

/// Students who pay ahead of their due dates, earliest first.
///
/// Only completed payments that reference an invoice qualify, and a student
/// needs at least two of them; a single early payment is no pattern. The
/// metric is the average of (payment day − due date) in days, so negative
/// values mean early; ascending sort puts the promptest payers first.
pub fn prompt_payer_ranking(payments: &[PaymentRecord], invoices: &[Invoice]) -> Vec<PromptPayer> {
    const MIN_SAMPLE: i64 = 2;

    let due_dates: HashMap<&str, NaiveDate> = invoices
        .iter()
        .map(|inv| (inv.id.as_str(), inv.due_date))
        .collect();

    let mut per_student: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for payment in payments.iter().filter(|p| p.is_completed()) {
        let Some(invoice_id) = payment.invoice_id.as_deref() else {
            continue;
        };
        let Some(&due_date) = due_dates.get(invoice_id) else {
            continue;
        };
        let days_late = (payment.paid_on() - due_date).num_days();
        let entry = per_student.entry(payment.student_id.clone()).or_default();
        entry.0 += days_late;
        entry.1 += 1;
    }

    let mut ranking: Vec<PromptPayer> = per_student
        .into_iter()
        .filter(|(_, (_, count))| *count >= MIN_SAMPLE)
        .map(|(student_id, (total_days, count))| PromptPayer {
            student_id,
            payment_count: count,
            avg_days_late: Decimal::from(total_days) / Decimal::from(count),
        })
        .collect();
    ranking.sort_by(|a, b| {
        a.avg_days_late
            .cmp(&b.avg_days_late)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    ranking
}

/// Sum of approved and paid expense amounts
pub fn realized_expenses(expenses: &[ExpenseRecord]) -> Decimal {
    expenses
        .iter()
        .filter(|e| e.is_realized())
        .map(|e| e.amount)
        .sum()
}

/// Sum of pending expense amounts, reported separately from realized spend
pub fn pending_expenses(expenses: &[ExpenseRecord]) -> Decimal {
    expenses
        .iter()
        .filter(|e| e.status == ExpenseStatus::Pending)
        .map(|e| e.amount)
        .sum()
}

/// Realized spend grouped by category name (raw id when the category is
/// unknown), same deterministic ordering as revenue dimensions
pub fn expenses_by_category(
    expenses: &[ExpenseRecord],
    categories: &[ExpenseCategory],
) -> Vec<DimensionTotal> {
    let names: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    let mut groups: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
    for expense in expenses.iter().filter(|e| e.is_realized()) {
        let key = names
            .get(expense.category_id.as_str())
            .map(|name| name.to_string())
            .unwrap_or_else(|| expense.category_id.clone());
        let entry = groups.entry(key).or_default();
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut totals: Vec<DimensionTotal> = groups
        .into_iter()
        .map(|(key, (total, count))| DimensionTotal { key, total, count })
        .collect();
    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    totals
}

/// Budgets keyed by category name, categories without a budget row omitted
/// (variance then defaults their budget to zero)
pub fn budget_by_category(categories: &[ExpenseCategory]) -> BTreeMap<String, Decimal> {
    categories
        .iter()
        .filter_map(|c| c.budget_amount.map(|budget| (c.name.clone(), budget)))
        .collect()
}

/// Completed revenue per calendar day, ascending by day
pub fn daily_trend(payments: &[PaymentRecord]) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for payment in payments.iter().filter(|p| p.is_completed()) {
        *days.entry(payment.paid_on()).or_default() += payment.amount;
    }
    days.into_iter()
        .map(|(day, total)| DailyRevenue { day, total })
        .collect()
}
