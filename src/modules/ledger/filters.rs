use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::ledger::models::{CategoryType, PaymentMethod, PaymentStatus, ProgramType};

/// Optional, AND-combined, exact-match filters applied at the ledger
/// boundary.
///
/// One filter set is parsed per request and shared by every fetch that
/// feeds a report bundle, so a summary card and its chart can never be
/// computed from differently-filtered rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerFilter {
    pub program_type: Option<ProgramType>,
    pub payment_method: Option<PaymentMethod>,
    /// Overrides the completed-only default for payment fetches
    pub payment_status: Option<PaymentStatus>,
    pub category_id: Option<String>,
    pub category_type: Option<CategoryType>,
}

impl LedgerFilter {
    /// The empty filter set: match everything (subject to fetch defaults)
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse raw query-string values, rejecting anything outside the
    /// allowed enum sets with `InvalidFilter`.
    pub fn parse(
        program_type: Option<&str>,
        payment_method: Option<&str>,
        payment_status: Option<&str>,
        category_id: Option<&str>,
        category_type: Option<&str>,
    ) -> Result<Self> {
        let program_type = program_type
            .map(str::parse::<ProgramType>)
            .transpose()
            .map_err(AppError::invalid_filter)?;
        let payment_method = payment_method
            .map(str::parse::<PaymentMethod>)
            .transpose()
            .map_err(AppError::invalid_filter)?;
        let payment_status = payment_status
            .map(str::parse::<PaymentStatus>)
            .transpose()
            .map_err(AppError::invalid_filter)?;
        let category_type = category_type
            .map(str::parse::<CategoryType>)
            .transpose()
            .map_err(AppError::invalid_filter)?;

        Ok(Self {
            program_type,
            payment_method,
            payment_status,
            category_id: category_id.map(str::to_string),
            category_type,
        })
    }
}
