use crate::core::money::format_display;
use crate::core::{AppError, Result};
use crate::modules::reports::models::ReportBundle;

/// Byte-order mark so spreadsheet tools detect UTF-8
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Serialize a bundle's primary table as CSV.
///
/// Output is BOM-prefixed UTF-8 with a header row matching the table's
/// field names and one data row per leaf record. A bundle carries several
/// differently-shaped sub-tables; the export picks the one its report page
/// is built around (dimension rows for revenue, aging rows for outstanding,
/// program rows for collection, line items for profit & loss).
pub fn to_csv(bundle: &ReportBundle) -> Result<Vec<u8>> {
    let mut out = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut out);
        write_rows(&mut writer, bundle)?;
        writer
            .flush()
            .map_err(|e| AppError::Export(format!("CSV flush failed: {}", e)))?;
    }
    Ok(out)
}

/// Direct structural serialization of the whole bundle
pub fn to_json(bundle: &ReportBundle) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(bundle)?)
}

fn write_rows<W: std::io::Write>(writer: &mut csv::Writer<W>, bundle: &ReportBundle) -> Result<()> {
    let record = |writer: &mut csv::Writer<W>, fields: &[&str]| -> Result<()> {
        writer
            .write_record(fields)
            .map_err(|e| AppError::Export(format!("CSV write failed: {}", e)))
    };

    match bundle {
        ReportBundle::Revenue(report) => {
            record(writer, &["section", "key", "amount"])?;
            record(writer, &["total", "", &format_display(report.total)])?;
            for row in &report.by_program {
                record(writer, &["by_program", &row.key, &format_display(row.total)])?;
            }
            for row in &report.by_method {
                record(writer, &["by_method", &row.key, &format_display(row.total)])?;
            }
            for row in &report.by_type {
                record(writer, &["by_type", &row.key, &format_display(row.total)])?;
            }
            for point in &report.daily_trend {
                record(
                    writer,
                    &[
                        "daily_trend",
                        &point.day.to_string(),
                        &format_display(point.total),
                    ],
                )?;
            }
        }
        ReportBundle::Outstanding(report) => {
            record(writer, &["bucket", "invoice_count", "balance"])?;
            for row in &report.aging {
                record(
                    writer,
                    &[
                        &row.bucket,
                        &row.invoice_count.to_string(),
                        &format_display(row.balance),
                    ],
                )?;
            }
        }
        ReportBundle::Collection(report) => {
            record(
                writer,
                &["program_code", "invoiced", "collected", "rate_pct"],
            )?;
            for row in &report.by_program {
                record(
                    writer,
                    &[
                        &row.program_code,
                        &format_display(row.invoiced),
                        &format_display(row.collected),
                        &format_display(row.rate_pct),
                    ],
                )?;
            }
        }
        ReportBundle::ProfitLoss(report) => {
            record(writer, &["line_item", "amount"])?;
            record(writer, &["revenue", &format_display(report.revenue)])?;
            record(
                writer,
                &["realized_expenses", &format_display(report.realized_expenses)],
            )?;
            record(
                writer,
                &["pending_expenses", &format_display(report.pending_expenses)],
            )?;
            record(writer, &["net", &format_display(report.net)])?;
            record(writer, &["margin_pct", &format_display(report.margin_pct)])?;
        }
    }

    Ok(())
}

/// Content type and filename for an export download
pub fn csv_attachment_name(bundle: &ReportBundle) -> String {
    format!(
        "{}_{}_{}.csv",
        bundle.kind(),
        bundle.period().from,
        bundle.period().to
    )
}
