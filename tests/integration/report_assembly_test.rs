// Report assembly against an in-memory ledger: every sub-metric of a bundle
// comes from one fetched record set, empty periods produce zero-valued
// bundles (never errors), and identical inputs yield identical bundles.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use eduledger::core::{DateRange, PeriodToken, Result};
use eduledger::ledger::models::{
    CategoryType, ExpenseCategory, ExpenseRecord, ExpenseStatus, Invoice, InvoiceStatus,
    PaymentMethod, PaymentRecord, PaymentStatus, TransactionType,
};
use eduledger::ledger::{LedgerFilter, LedgerReader};
use eduledger::reports::models::{ReportBundle, ReportKind};
use eduledger::reports::ReportService;

/// Ledger fixture with the same range/filter semantics as the MySQL
/// repository: completed-only payment default, cancelled rows excluded,
/// empty Vec when nothing matches.
#[derive(Default)]
struct MemoryLedger {
    payments: Vec<PaymentRecord>,
    invoices: Vec<Invoice>,
    expenses: Vec<ExpenseRecord>,
    categories: Vec<ExpenseCategory>,
}

#[async_trait]
impl LedgerReader for MemoryLedger {
    async fn fetch_payments(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<Vec<PaymentRecord>> {
        let status = filter.payment_status.unwrap_or(PaymentStatus::Completed);
        Ok(self
            .payments
            .iter()
            .filter(|p| range.contains(p.paid_on()))
            .filter(|p| p.status == status)
            .filter(|p| filter.payment_method.map_or(true, |m| p.payment_method == m))
            .cloned()
            .collect())
    }

    async fn fetch_invoices(
        &self,
        range: DateRange,
        _filter: &LedgerFilter,
    ) -> Result<Vec<Invoice>> {
        Ok(self
            .invoices
            .iter()
            .filter(|inv| inv.status != InvoiceStatus::Cancelled)
            .filter(|inv| range.contains(inv.created_at.date_naive()))
            .cloned()
            .collect())
    }

    async fn fetch_expenses(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<Vec<ExpenseRecord>> {
        Ok(self
            .expenses
            .iter()
            .filter(|e| e.status != ExpenseStatus::Cancelled)
            .filter(|e| range.contains(e.payment_date))
            .filter(|e| {
                filter
                    .category_id
                    .as_deref()
                    .map_or(true, |id| e.category_id == id)
            })
            .cloned()
            .collect())
    }

    async fn fetch_categories(&self) -> Result<Vec<ExpenseCategory>> {
        Ok(self.categories.clone())
    }

    async fn fetch_student_invoices(&self, student_id: &str) -> Result<Vec<Invoice>> {
        Ok(self
            .invoices
            .iter()
            .filter(|inv| inv.student_id == student_id && inv.status != InvoiceStatus::Cancelled)
            .cloned()
            .collect())
    }

    async fn fetch_student_payments(&self, student_id: &str) -> Result<Vec<PaymentRecord>> {
        Ok(self
            .payments
            .iter()
            .filter(|p| p.student_id == student_id && p.status == PaymentStatus::Completed)
            .cloned()
            .collect())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn payment(
    id: &str,
    student: &str,
    amount: Decimal,
    status: PaymentStatus,
    method: PaymentMethod,
    day: NaiveDate,
    program: &str,
) -> PaymentRecord {
    PaymentRecord {
        id: id.to_string(),
        student_id: student.to_string(),
        amount,
        payment_method: method,
        status,
        transaction_type: TransactionType::Tuition,
        created_at: day.and_hms_opt(9, 0, 0).unwrap().and_utc(),
        program_code: program.to_string(),
        class_id: "cls-1".to_string(),
        invoice_id: None,
    }
}

fn invoice(
    id: &str,
    student: &str,
    amount: Decimal,
    paid: Decimal,
    due: NaiveDate,
    program: &str,
) -> Invoice {
    Invoice {
        id: id.to_string(),
        student_id: student.to_string(),
        class_id: "cls-1".to_string(),
        program_code: program.to_string(),
        invoice_type: TransactionType::Tuition,
        amount,
        paid_amount: paid,
        due_date: due,
        status: InvoiceStatus::Pending,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    }
}

fn expense(id: &str, category: &str, amount: Decimal, status: ExpenseStatus) -> ExpenseRecord {
    ExpenseRecord {
        id: id.to_string(),
        category_id: category.to_string(),
        amount,
        payment_date: date(2024, 6, 10),
        status,
        vendor_name: "Acme Supplies".to_string(),
        payment_method: PaymentMethod::BankTransfer,
    }
}

fn category(id: &str, name: &str, budget: Option<Decimal>) -> ExpenseCategory {
    ExpenseCategory {
        id: id.to_string(),
        name: name.to_string(),
        category_type: CategoryType::Operational,
        budget_amount: budget,
    }
}

fn june_fixture() -> MemoryLedger {
    MemoryLedger {
        payments: vec![
            payment(
                "p1",
                "stu-1",
                dec!(1000),
                PaymentStatus::Completed,
                PaymentMethod::BankTransfer,
                date(2024, 6, 1),
                "ONL-101",
            ),
            payment(
                "p2",
                "stu-2",
                dec!(500),
                PaymentStatus::Pending,
                PaymentMethod::Cash,
                date(2024, 6, 2),
                "ONL-101",
            ),
            payment(
                "p3",
                "stu-3",
                dec!(750),
                PaymentStatus::Completed,
                PaymentMethod::Cash,
                date(2024, 6, 5),
                "ONS-202",
            ),
        ],
        invoices: vec![
            invoice("i1", "stu-1", dec!(1000), dec!(900), date(2024, 6, 20), "ONL-101"),
            invoice("i2", "stu-2", dec!(0), dec!(0), date(2024, 6, 25), "ONL-101"),
            invoice("i3", "stu-3", dec!(2000), dec!(500), date(2024, 5, 10), "ONS-202"),
        ],
        expenses: vec![
            expense("e1", "cat-rent", dec!(600), ExpenseStatus::Paid),
            expense("e2", "cat-rent", dec!(150), ExpenseStatus::Approved),
            expense("e3", "cat-misc", dec!(75), ExpenseStatus::Pending),
            expense("e4", "cat-misc", dec!(999), ExpenseStatus::Cancelled),
        ],
        categories: vec![
            category("cat-rent", "Rent", Some(dec!(1000))),
            category("cat-misc", "Miscellaneous", None),
        ],
    }
}

fn service(ledger: MemoryLedger) -> ReportService {
    ReportService::new(Arc::new(ledger))
}

async fn generate(
    service: &ReportService,
    kind: ReportKind,
    token: PeriodToken,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> ReportBundle {
    service
        .generate(kind, token, from, to, &LedgerFilter::none(), date(2024, 7, 1))
        .await
        .unwrap()
}

#[tokio::test]
async fn revenue_report_excludes_pending_payments() {
    let service = service(june_fixture());
    let bundle = generate(
        &service,
        ReportKind::Revenue,
        PeriodToken::Custom,
        Some(date(2024, 6, 1)),
        Some(date(2024, 6, 30)),
    )
    .await;

    let ReportBundle::Revenue(report) = bundle else {
        panic!("expected revenue bundle");
    };

    assert_eq!(report.total, dec!(1750));

    // additivity: every dimension reconciles with the headline total
    for dims in [&report.by_program, &report.by_method, &report.by_type] {
        let sum: Decimal = dims.iter().map(|d| d.total).sum();
        assert_eq!(sum, report.total);
    }
    let trend_sum: Decimal = report.daily_trend.iter().map(|p| p.total).sum();
    assert_eq!(trend_sum, report.total);
}

#[tokio::test]
async fn generate_is_idempotent_for_identical_inputs() {
    let service = service(june_fixture());

    let mut bundles = Vec::new();
    for _ in 0..2 {
        let bundle = generate(
            &service,
            ReportKind::Collection,
            PeriodToken::Custom,
            Some(date(2024, 6, 1)),
            Some(date(2024, 6, 30)),
        )
        .await;
        bundles.push(serde_json::to_string(&bundle).unwrap());
    }

    assert_eq!(bundles[0], bundles[1]);
}

#[tokio::test]
async fn inverted_custom_range_yields_a_zero_bundle_not_an_error() {
    let service = service(june_fixture());
    let bundle = generate(
        &service,
        ReportKind::Revenue,
        PeriodToken::Custom,
        Some(date(2024, 6, 30)),
        Some(date(2024, 6, 1)),
    )
    .await;

    let ReportBundle::Revenue(report) = bundle else {
        panic!("expected revenue bundle");
    };
    assert_eq!(report.total, Decimal::ZERO);
    assert!(report.by_program.is_empty());
    assert!(report.daily_trend.is_empty());
}

#[tokio::test]
async fn empty_store_produces_zero_valued_profit_loss() {
    let service = service(MemoryLedger::default());
    let bundle = generate(&service, ReportKind::ProfitLoss, PeriodToken::Month, None, None).await;

    let ReportBundle::ProfitLoss(report) = bundle else {
        panic!("expected profit-loss bundle");
    };
    assert_eq!(report.revenue, Decimal::ZERO);
    assert_eq!(report.realized_expenses, Decimal::ZERO);
    assert_eq!(report.net, Decimal::ZERO);
    assert_eq!(report.margin_pct, Decimal::ZERO);
}

#[tokio::test]
async fn outstanding_report_ages_only_open_invoices() {
    let service = service(june_fixture());
    let bundle = generate(
        &service,
        ReportKind::Outstanding,
        PeriodToken::Custom,
        Some(date(2024, 6, 1)),
        Some(date(2024, 6, 30)),
    )
    .await;

    let ReportBundle::Outstanding(report) = bundle else {
        panic!("expected outstanding bundle");
    };

    // i1 has 100 open, i3 has 1500 open, i2 is zero-amount (settled)
    assert_eq!(report.open_invoice_count, 2);
    assert_eq!(report.total_outstanding, dec!(1600));

    let bucketed: Decimal = report.aging.iter().map(|row| row.balance).sum();
    assert_eq!(bucketed, report.total_outstanding);

    // i3 (due 2024-05-10, 52 days before as_of) tops the late payers
    assert_eq!(report.late_payers[0].student_id, "stu-3");
    assert_eq!(report.late_payers[0].balance, dec!(1500));
}

#[tokio::test]
async fn collection_report_rates_per_program() {
    let service = service(june_fixture());
    let bundle = generate(
        &service,
        ReportKind::Collection,
        PeriodToken::Custom,
        Some(date(2024, 6, 1)),
        Some(date(2024, 6, 30)),
    )
    .await;

    let ReportBundle::Collection(report) = bundle else {
        panic!("expected collection bundle");
    };

    // 1400 collected of 3000 billed
    assert_eq!(report.overall_rate_pct, dec!(46.67));

    // sorted by invoiced descending
    assert_eq!(report.by_program[0].program_code, "ONS-202");
    assert_eq!(report.by_program[0].rate_pct, dec!(25.00));
    assert_eq!(report.by_program[1].program_code, "ONL-101");
    assert_eq!(report.by_program[1].rate_pct, dec!(90.00));
}

#[tokio::test]
async fn profit_loss_tracks_budget_variance_and_pending_spend() {
    let service = service(june_fixture());
    let bundle = generate(
        &service,
        ReportKind::ProfitLoss,
        PeriodToken::Custom,
        Some(date(2024, 6, 1)),
        Some(date(2024, 6, 30)),
    )
    .await;

    let ReportBundle::ProfitLoss(report) = bundle else {
        panic!("expected profit-loss bundle");
    };

    assert_eq!(report.revenue, dec!(1750));
    assert_eq!(report.realized_expenses, dec!(750));
    assert_eq!(report.pending_expenses, dec!(75));
    assert_eq!(report.net, dec!(1000));
    assert_eq!(report.margin_pct, dec!(57.14));

    let rent = report
        .budget_variance
        .iter()
        .find(|row| row.category == "Rent")
        .unwrap();
    assert_eq!(rent.budget, dec!(1000));
    assert_eq!(rent.actual, dec!(750));
    assert_eq!(rent.variance, dec!(250));
}

#[tokio::test]
async fn payment_method_filter_applies_to_every_sub_metric() {
    let service = service(june_fixture());
    let filter = LedgerFilter {
        payment_method: Some(PaymentMethod::Cash),
        ..LedgerFilter::none()
    };

    let bundle = service
        .generate(
            ReportKind::Revenue,
            PeriodToken::Custom,
            Some(date(2024, 6, 1)),
            Some(date(2024, 6, 30)),
            &filter,
            date(2024, 7, 1),
        )
        .await
        .unwrap();

    let ReportBundle::Revenue(report) = bundle else {
        panic!("expected revenue bundle");
    };

    // only the completed cash payment remains, everywhere
    assert_eq!(report.total, dec!(750));
    assert_eq!(report.by_method.len(), 1);
    assert_eq!(report.by_method[0].key, "cash");
    assert_eq!(report.by_program.len(), 1);
    assert_eq!(report.by_program[0].key, "ONS-202");
}

#[tokio::test]
async fn custom_period_without_bounds_is_rejected() {
    let service = service(june_fixture());
    let err = service
        .generate(
            ReportKind::Revenue,
            PeriodToken::Custom,
            None,
            None,
            &LedgerFilter::none(),
            date(2024, 7, 1),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("custom period"));
}
