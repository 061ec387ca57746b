pub mod report_bundle;

pub use report_bundle::{
    AgingRow, CollectionReport, OutstandingReport, ProfitLossReport, ProgramCollection,
    ReportBundle, ReportKind, RevenueReport, VarianceRow,
};
