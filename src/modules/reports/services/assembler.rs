use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::money::round_display;
use crate::core::period::{self, DateRange, PeriodToken};
use crate::core::Result;
use crate::modules::ledger::models::Invoice;
use crate::modules::ledger::{LedgerFilter, LedgerReader};
use crate::modules::reports::models::{
    AgingRow, CollectionReport, OutstandingReport, ProfitLossReport, ProgramCollection,
    ReportBundle, ReportKind, RevenueReport, VarianceRow,
};
use crate::modules::reports::services::aggregation::{
    self, DailyRevenue, DimensionTotal,
};

/// Assembles report bundles from ledger facts.
///
/// The key invariant: every sub-metric inside one bundle is computed from
/// the SAME fetched record set: one fetch per entity kind per bundle, one
/// `(range, filter)` tuple. Presentation rounding to two places happens
/// here, once, never during accumulation. Given identical arguments over an
/// unchanged store, `generate` yields an identical bundle.
pub struct ReportService {
    ledger: Arc<dyn LedgerReader>,
}

impl ReportService {
    pub fn new(ledger: Arc<dyn LedgerReader>) -> Self {
        Self { ledger }
    }

    /// Resolve the period and build the requested bundle.
    ///
    /// `today` anchors relative period tokens and aging; callers pass the
    /// current date so the assembly itself stays deterministic.
    pub async fn generate(
        &self,
        kind: ReportKind,
        token: PeriodToken,
        explicit_from: Option<NaiveDate>,
        explicit_to: Option<NaiveDate>,
        filter: &LedgerFilter,
        today: NaiveDate,
    ) -> Result<ReportBundle> {
        let range = period::resolve(token, explicit_from, explicit_to, today)?;

        info!(
            report = %kind,
            period = %token,
            from = %range.from,
            to = %range.to,
            "Generating report"
        );

        let bundle = match kind {
            ReportKind::Revenue => self.revenue_report(range, filter).await?,
            ReportKind::Outstanding => self.outstanding_report(range, filter, today).await?,
            ReportKind::Collection => self.collection_report(range, filter).await?,
            ReportKind::ProfitLoss => self.profit_loss_report(range, filter).await?,
        };

        if bundle.is_empty() {
            warn!(report = %kind, from = %range.from, to = %range.to, "Report is empty");
        }

        Ok(bundle)
    }

    async fn revenue_report(&self, range: DateRange, filter: &LedgerFilter) -> Result<ReportBundle> {
        let payments = self.ledger.fetch_payments(range, filter).await?;

        let report = RevenueReport {
            period: range,
            total: round_display(aggregation::total_revenue(&payments)),
            by_program: round_dimensions(aggregation::revenue_by_dimension(&payments, |p| {
                p.program_code.clone()
            })),
            by_method: round_dimensions(aggregation::revenue_by_dimension(&payments, |p| {
                p.payment_method.to_string()
            })),
            by_type: round_dimensions(aggregation::revenue_by_dimension(&payments, |p| {
                p.transaction_type.to_string()
            })),
            daily_trend: round_trend(aggregation::daily_trend(&payments)),
        };

        Ok(ReportBundle::Revenue(report))
    }

    async fn outstanding_report(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
        as_of: NaiveDate,
    ) -> Result<ReportBundle> {
        let invoices = self.ledger.fetch_invoices(range, filter).await?;

        let open: Vec<&Invoice> = invoices.iter().filter(|inv| !inv.is_settled()).collect();
        let total_outstanding: Decimal = open.iter().map(|inv| inv.balance()).sum();

        let aging = aggregation::aging_buckets(&invoices, as_of)
            .into_iter()
            .map(|(bucket, slice)| AgingRow {
                bucket: bucket.to_string(),
                invoice_count: slice.count,
                balance: round_display(slice.balance),
            })
            .collect();

        let late_payers = aggregation::late_payer_ranking(&invoices, as_of)
            .into_iter()
            .map(|mut payer| {
                payer.balance = round_display(payer.balance);
                payer
            })
            .collect();

        let report = OutstandingReport {
            period: range,
            total_outstanding: round_display(total_outstanding),
            open_invoice_count: open.len() as i64,
            aging,
            late_payers,
        };

        Ok(ReportBundle::Outstanding(report))
    }

    async fn collection_report(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<ReportBundle> {
        // Prompt-payer rankings join payments to the invoices they settle,
        // so both sets come from the same range+filter tuple.
        let (invoices, payments) = tokio::try_join!(
            self.ledger.fetch_invoices(range, filter),
            self.ledger.fetch_payments(range, filter),
        )?;

        let mut per_program: BTreeMap<String, Vec<&Invoice>> = BTreeMap::new();
        for invoice in &invoices {
            per_program
                .entry(invoice.program_code.clone())
                .or_default()
                .push(invoice);
        }

        let mut by_program: Vec<ProgramCollection> = per_program
            .into_iter()
            .map(|(program_code, group)| {
                let invoiced: Decimal = group.iter().map(|inv| inv.amount).sum();
                let collected: Decimal = group.iter().map(|inv| inv.paid_amount).sum();
                ProgramCollection {
                    program_code,
                    invoiced: round_display(invoiced),
                    collected: round_display(collected),
                    rate_pct: round_display(crate::core::money::ratio_pct(collected, invoiced)),
                }
            })
            .collect();
        by_program.sort_by(|a, b| {
            b.invoiced
                .cmp(&a.invoiced)
                .then_with(|| a.program_code.cmp(&b.program_code))
        });

        let prompt_payers = aggregation::prompt_payer_ranking(&payments, &invoices)
            .into_iter()
            .map(|mut payer| {
                payer.avg_days_late = round_display(payer.avg_days_late);
                payer
            })
            .collect();

        let report = CollectionReport {
            period: range,
            overall_rate_pct: round_display(aggregation::collection_rate(&invoices)),
            by_program,
            prompt_payers,
        };

        Ok(ReportBundle::Collection(report))
    }

    async fn profit_loss_report(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<ReportBundle> {
        let (payments, expenses, categories) = tokio::try_join!(
            self.ledger.fetch_payments(range, filter),
            self.ledger.fetch_expenses(range, filter),
            self.ledger.fetch_categories(),
        )?;

        let revenue = aggregation::total_revenue(&payments);
        let realized = aggregation::realized_expenses(&expenses);
        let pending = aggregation::pending_expenses(&expenses);
        let result = aggregation::profit_loss(revenue, realized);

        let expenses_by_category = aggregation::expenses_by_category(&expenses, &categories);
        let actual_by_category: BTreeMap<String, Decimal> = expenses_by_category
            .iter()
            .map(|row| (row.key.clone(), row.total))
            .collect();
        let budget_by_category = aggregation::budget_by_category(&categories);
        let variance = aggregation::budget_variance(&actual_by_category, &budget_by_category);

        let budget_variance = variance
            .into_iter()
            .map(|(category, variance)| {
                let budget = budget_by_category
                    .get(&category)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let actual = actual_by_category
                    .get(&category)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                VarianceRow {
                    category,
                    budget: round_display(budget),
                    actual: round_display(actual),
                    variance: round_display(variance),
                }
            })
            .collect();

        let report = ProfitLossReport {
            period: range,
            revenue: round_display(revenue),
            realized_expenses: round_display(realized),
            pending_expenses: round_display(pending),
            net: round_display(result.net),
            margin_pct: round_display(result.margin_pct),
            revenue_by_type: round_dimensions(aggregation::revenue_by_dimension(&payments, |p| {
                p.transaction_type.to_string()
            })),
            expenses_by_category: round_dimensions(expenses_by_category),
            budget_variance,
        };

        Ok(ReportBundle::ProfitLoss(report))
    }
}

fn round_dimensions(mut totals: Vec<DimensionTotal>) -> Vec<DimensionTotal> {
    for entry in &mut totals {
        entry.total = round_display(entry.total);
    }
    totals
}

fn round_trend(mut trend: Vec<DailyRevenue>) -> Vec<DailyRevenue> {
    for point in &mut trend {
        point.total = round_display(point.total);
    }
    trend
}
