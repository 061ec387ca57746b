use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::{AppError, PeriodToken, Result};
use crate::middleware::RequireRole;
use crate::modules::export;
use crate::modules::ledger::LedgerFilter;
use crate::modules::reports::models::ReportKind;
use crate::modules::reports::services::ReportService;

/// Query parameters shared by every report endpoint.
///
/// Unknown keys are rejected outright, so a misspelled filter can never
/// silently widen a report.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportQuery {
    /// Period token (today, week, month, rolling_quarter, calendar_quarter,
    /// year, all, custom)
    pub period: String,
    /// Explicit start date for `custom` (format: YYYY-MM-DD)
    #[serde(default)]
    pub from: Option<String>,
    /// Explicit end date for `custom` (format: YYYY-MM-DD)
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub program_type: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category_type: Option<String>,
    /// Response format: json (default) or csv
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /reports/{kind}
///
/// Builds the requested bundle over one period + filter tuple and returns
/// it as JSON, or as a BOM-prefixed CSV download with `format=csv`.
pub async fn get_report(
    service: web::Data<ReportService>,
    path: web::Path<String>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse> {
    let kind = path
        .as_str()
        .parse::<ReportKind>()
        .map_err(AppError::not_found)?;

    handle_get_report(service, kind, query.into_inner()).await
}

async fn handle_get_report(
    service: web::Data<ReportService>,
    kind: ReportKind,
    query: ReportQuery,
) -> Result<HttpResponse> {
    let token: PeriodToken = query.period.parse()?;
    let explicit_from = parse_date(query.from.as_deref(), "from")?;
    let explicit_to = parse_date(query.to.as_deref(), "to")?;

    let filter = LedgerFilter::parse(
        query.program_type.as_deref(),
        query.payment_method.as_deref(),
        query.payment_status.as_deref(),
        query.category_id.as_deref(),
        query.category_type.as_deref(),
    )?;

    let today = chrono::Utc::now().date_naive();
    let bundle = service
        .generate(kind, token, explicit_from, explicit_to, &filter, today)
        .await?;

    match query.format.as_deref().unwrap_or("json") {
        "json" => Ok(HttpResponse::Ok().json(bundle)),
        "csv" => {
            let filename = export::csv_attachment_name(&bundle);
            let body = export::to_csv(&bundle)?;
            Ok(HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", filename),
                ))
                .body(body))
        }
        other => Err(AppError::validation(format!(
            "Unknown export format '{}': use json or csv",
            other
        ))),
    }
}

fn parse_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            AppError::invalid_date_range(format!(
                "Invalid {} date '{}'. Expected YYYY-MM-DD",
                field, value
            ))
        })
    })
    .transpose()
}

/// Configure routes for the reports module; the whole scope is admin-only
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .wrap(RequireRole::admin())
            .route("/{kind}", web::get().to(get_report)),
    );
}
