pub mod expense;
pub mod invoice;
pub mod payment;
pub mod program;
pub mod student_status;

pub use expense::{CategoryType, ExpenseCategory, ExpenseRecord, ExpenseStatus};
pub use invoice::{Invoice, InvoiceStatus};
pub use payment::{PaymentMethod, PaymentRecord, PaymentStatus, TransactionType};
pub use program::{Program, ProgramType};
pub use student_status::StudentFinancialStatus;
