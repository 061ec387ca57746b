use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{DateRange, Result};
use crate::modules::ledger::filters::LedgerFilter;
use crate::modules::ledger::models::{
    ExpenseCategory, ExpenseRecord, Invoice, PaymentRecord, PaymentStatus,
};

/// The ledger is the only place external I/O happens; everything above this
/// trait is pure given its inputs. Fetches return an empty Vec, never an
/// error, when no rows match, including inverted custom ranges.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Payments whose calendar day falls in `range`. Defaults to completed
    /// payments only, unless `filter.payment_status` overrides.
    async fn fetch_payments(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<Vec<PaymentRecord>>;

    /// Invoices issued within `range`, cancelled ones excluded.
    async fn fetch_invoices(&self, range: DateRange, filter: &LedgerFilter)
        -> Result<Vec<Invoice>>;

    /// Expenses dated within `range`, cancelled ones excluded.
    async fn fetch_expenses(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<Vec<ExpenseRecord>>;

    /// All expense categories (budget rows are optional per category).
    async fn fetch_categories(&self) -> Result<Vec<ExpenseCategory>>;

    /// Full invoice history for one student, cancelled ones excluded.
    async fn fetch_student_invoices(&self, student_id: &str) -> Result<Vec<Invoice>>;

    /// Completed payment history for one student.
    async fn fetch_student_payments(&self, student_id: &str) -> Result<Vec<PaymentRecord>>;
}

/// MySQL-backed ledger reader
pub struct MySqlLedgerRepository {
    pool: MySqlPool,
}

impl MySqlLedgerRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_program_filter(qb: &mut QueryBuilder<'_, MySql>, filter: &LedgerFilter, column: &str) {
        if let Some(program_type) = filter.program_type {
            qb.push(format!(
                " AND {} IN (SELECT program_code FROM programs WHERE program_type = ",
                column
            ));
            qb.push_bind(program_type);
            qb.push(")");
        }
    }
}

#[async_trait]
impl LedgerReader for MySqlLedgerRepository {
    async fn fetch_payments(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<Vec<PaymentRecord>> {
        let mut qb: QueryBuilder<'_, MySql> = QueryBuilder::new(
            "SELECT id, student_id, amount, payment_method, status, transaction_type, \
             created_at, program_code, class_id, invoice_id \
             FROM payments WHERE DATE(created_at) BETWEEN ",
        );
        qb.push_bind(range.from);
        qb.push(" AND ");
        qb.push_bind(range.to);

        qb.push(" AND status = ");
        qb.push_bind(filter.payment_status.unwrap_or(PaymentStatus::Completed));

        if let Some(method) = filter.payment_method {
            qb.push(" AND payment_method = ");
            qb.push_bind(method);
        }
        Self::push_program_filter(&mut qb, filter, "program_code");

        qb.push(" ORDER BY created_at, id");

        let rows = qb
            .build_query_as::<PaymentRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_invoices(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<Vec<Invoice>> {
        let mut qb: QueryBuilder<'_, MySql> = QueryBuilder::new(
            "SELECT i.id, i.student_id, i.class_id, c.program_code, i.invoice_type, \
             i.amount, i.paid_amount, i.due_date, i.status, i.created_at \
             FROM invoices i \
             JOIN classes c ON c.id = i.class_id \
             WHERE i.status <> 'cancelled' AND DATE(i.created_at) BETWEEN ",
        );
        qb.push_bind(range.from);
        qb.push(" AND ");
        qb.push_bind(range.to);

        Self::push_program_filter(&mut qb, filter, "c.program_code");

        qb.push(" ORDER BY i.created_at, i.id");

        let rows = qb.build_query_as::<Invoice>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn fetch_expenses(
        &self,
        range: DateRange,
        filter: &LedgerFilter,
    ) -> Result<Vec<ExpenseRecord>> {
        let mut qb: QueryBuilder<'_, MySql> = QueryBuilder::new(
            "SELECT id, category_id, amount, payment_date, status, vendor_name, payment_method \
             FROM expenses WHERE status <> 'cancelled' AND payment_date BETWEEN ",
        );
        qb.push_bind(range.from);
        qb.push(" AND ");
        qb.push_bind(range.to);

        if let Some(ref category_id) = filter.category_id {
            qb.push(" AND category_id = ");
            qb.push_bind(category_id.clone());
        }
        if let Some(category_type) = filter.category_type {
            qb.push(" AND category_id IN (SELECT id FROM expense_categories WHERE category_type = ");
            qb.push_bind(category_type);
            qb.push(")");
        }
        if let Some(method) = filter.payment_method {
            qb.push(" AND payment_method = ");
            qb.push_bind(method);
        }

        qb.push(" ORDER BY payment_date, id");

        let rows = qb
            .build_query_as::<ExpenseRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_categories(&self) -> Result<Vec<ExpenseCategory>> {
        let rows = sqlx::query_as::<_, ExpenseCategory>(
            "SELECT id, name, category_type, budget_amount FROM expense_categories ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_student_invoices(&self, student_id: &str) -> Result<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, Invoice>(
            "SELECT i.id, i.student_id, i.class_id, c.program_code, i.invoice_type, \
             i.amount, i.paid_amount, i.due_date, i.status, i.created_at \
             FROM invoices i \
             JOIN classes c ON c.id = i.class_id \
             WHERE i.student_id = ? AND i.status <> 'cancelled' \
             ORDER BY i.created_at, i.id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_student_payments(&self, student_id: &str) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, student_id, amount, payment_method, status, transaction_type, \
             created_at, program_code, class_id, invoice_id \
             FROM payments WHERE student_id = ? AND status = 'completed' \
             ORDER BY created_at, id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
