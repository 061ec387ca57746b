pub mod csv_exporter;

pub use csv_exporter::{csv_attachment_name, to_csv, to_json};
