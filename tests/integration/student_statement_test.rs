// Student statement assembly: the financial position is recomputed from
// invoice rows on every read, never served from a cache, and students with
// no history get a zero-valued statement.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use eduledger::core::{DateRange, Result};
use eduledger::ledger::models::{
    ExpenseCategory, ExpenseRecord, Invoice, InvoiceStatus, PaymentMethod, PaymentRecord,
    PaymentStatus, TransactionType,
};
use eduledger::ledger::{LedgerFilter, LedgerReader};
use eduledger::students::StatementService;

struct StudentLedger {
    invoices: Vec<Invoice>,
    payments: Vec<PaymentRecord>,
}

#[async_trait]
impl LedgerReader for StudentLedger {
    async fn fetch_payments(
        &self,
        _range: DateRange,
        _filter: &LedgerFilter,
    ) -> Result<Vec<PaymentRecord>> {
        Ok(vec![])
    }

    async fn fetch_invoices(
        &self,
        _range: DateRange,
        _filter: &LedgerFilter,
    ) -> Result<Vec<Invoice>> {
        Ok(vec![])
    }

    async fn fetch_expenses(
        &self,
        _range: DateRange,
        _filter: &LedgerFilter,
    ) -> Result<Vec<ExpenseRecord>> {
        Ok(vec![])
    }

    async fn fetch_categories(&self) -> Result<Vec<ExpenseCategory>> {
        Ok(vec![])
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

fn invoice(
    id: &str,
    student: &str,
    amount: Decimal,
    paid: Decimal,
    due: NaiveDate,
    created: NaiveDate,
) -> Invoice {
    Invoice {
        id: id.to_string(),
        student_id: student.to_string(),
        class_id: format!("cls-{}", id),
        program_code: "ONL-101".to_string(),
        invoice_type: TransactionType::Tuition,
        amount,
        paid_amount: paid,
        due_date: due,
        status: InvoiceStatus::Pending,
        created_at: created.and_hms_opt(9, 0, 0).unwrap().and_utc(),
    }
}

fn payment(id: &str, student: &str, amount: Decimal) -> PaymentRecord {
    PaymentRecord {
        id: id.to_string(),
        student_id: student.to_string(),
        amount,
        payment_method: PaymentMethod::Card,
        status: PaymentStatus::Completed,
        transaction_type: TransactionType::Tuition,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        program_code: "ONL-101".to_string(),
        class_id: "cls-1".to_string(),
        invoice_id: None,
    }
}

#[tokio::test]
async fn statement_recomputes_position_from_invoices() {
    let ledger = StudentLedger {
        invoices: vec![
            invoice("a", "stu-1", dec!(5000), dec!(5000), date(2024, 3, 1), date(2024, 2, 1)),
            invoice("b", "stu-1", dec!(3000), dec!(1000), date(2024, 7, 15), date(2024, 6, 1)),
            invoice("x", "stu-2", dec!(9999), dec!(0), date(2024, 1, 1), date(2024, 1, 1)),
        ],
        payments: vec![payment("p1", "stu-1", dec!(6000))],
    };
    let service = StatementService::new(Arc::new(ledger));

    let statement = service
        .student_statement("stu-1", date(2024, 7, 1))
        .await
        .unwrap();

    assert_eq!(statement.status.total_fee, dec!(8000));
    assert_eq!(statement.status.paid_amount, dec!(6000));
    assert_eq!(statement.status.balance, dec!(2000));
    assert_eq!(statement.status.next_payment_due, Some(date(2024, 7, 15)));
    assert!(!statement.status.is_suspended);
    // class of the most recent invoice
    assert_eq!(statement.status.class_id.as_deref(), Some("cls-b"));
    // other students' rows never leak in
    assert_eq!(statement.invoices.len(), 2);
    assert_eq!(statement.payments.len(), 1);
}

#[tokio::test]
async fn long_overdue_balance_suspends_the_student() {
    let ledger = StudentLedger {
        invoices: vec![invoice(
            "a",
            "stu-1",
            dec!(1000),
            dec!(0),
            date(2024, 1, 1),
            date(2023, 12, 1),
        )],
        payments: vec![],
    };
    let service = StatementService::new(Arc::new(ledger));

    let statement = service
        .student_statement("stu-1", date(2024, 6, 1))
        .await
        .unwrap();

    assert!(statement.status.is_suspended);
}

#[tokio::test]
async fn unknown_student_gets_a_zero_statement() {
    let ledger = StudentLedger {
        invoices: vec![],
        payments: vec![],
    };
    let service = StatementService::new(Arc::new(ledger));

    let statement = service
        .student_statement("stu-404", date(2024, 6, 1))
        .await
        .unwrap();

    assert_eq!(statement.status.total_fee, Decimal::ZERO);
    assert_eq!(statement.status.balance, Decimal::ZERO);
    assert_eq!(statement.status.next_payment_due, None);
    assert!(!statement.status.is_suspended);
    assert!(statement.invoices.is_empty());
    assert!(statement.payments.is_empty());
}
