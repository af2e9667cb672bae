// src/emit/mod.rs
use std::fs;
use std::net::UdpSocket;
use std::path::{Path, PathBuf};

use crate::engine::{FieldRecord, ReportVariant};
use crate::utils::error::EmitError;

/// Builds the metric line for one record:
/// `<code> <name1>=<value1>,<name2>=<value2>,... <timestamp>`.
///
/// Values print in their coerced form, floats unquoted and pass-through
/// strings as-is; field order is the record's order.
pub fn build_line(record: &FieldRecord, timestamp: &str) -> String {
    let fields = record
        .fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(",");
    format!("{} {} {}", record.code(), fields, timestamp)
}

/// Sends one metric line over UDP to the variant's port on `host`.
pub fn send_line(line: &str, host: &str, variant: ReportVariant) -> Result<(), EmitError> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.send_to(line.as_bytes(), (host, variant.udp_port()))?;
    tracing::info!("sent {} bytes to {}:{}", line.len(), host, variant.udp_port());
    Ok(())
}

/// Writes the record as a markdown table, `<CODE>_<date>.md`, into
/// `directory` (the source PDF's directory by convention).
pub fn write_markdown(
    directory: &Path,
    record: &FieldRecord,
    timestamp: &str,
) -> Result<PathBuf, EmitError> {
    let date = timestamp.get(..10).unwrap_or(timestamp);
    let file_path = directory.join(format!("{}_{}.md", record.code(), date));

    fs::write(&file_path, render_markdown(record, date))?;
    tracing::info!("wrote markdown report to {}", file_path.display());
    Ok(file_path)
}

fn render_markdown(record: &FieldRecord, date: &str) -> String {
    let mut table = format!(
        "## {} Measurement Results ({})\n\n",
        record.variant.long_name(),
        date
    );
    table.push_str("| Test | Result | Unit |\n");
    table.push_str("|------|--------|------|\n");
    for (name, value) in &record.fields {
        let (test, unit) = split_unit(name);
        table.push_str(&format!("| {} | {} | {} |\n", test, value, unit));
    }
    table
}

// Canonical names render with underscores as spaces; a parenthesized suffix
// becomes the unit column.
fn split_unit(name: &str) -> (String, String) {
    let pretty = name.replace('_', " ");
    match (pretty.find('('), pretty.find(')')) {
        (Some(open), Some(close)) if open < close => {
            let unit = pretty[open + 1..close].to_string();
            let test = pretty[..open].trim_end().to_string();
            (test, unit)
        }
        _ => (pretty, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FieldValue;

    fn record() -> FieldRecord {
        FieldRecord {
            variant: ReportVariant::SaturatedPaste,
            fields: vec![
                ("pH".to_string(), FieldValue::Number(6.8)),
                ("TEC".to_string(), FieldValue::Number(11.42)),
                ("Sample_Location".to_string(), FieldValue::Text("Greenhouse".to_string())),
            ],
        }
    }

    #[test]
    fn metric_line_has_code_fields_and_timestamp() {
        let line = build_line(&record(), "2022-06-30T00:00:00");
        assert_eq!(line, "SP pH=6.8,TEC=11.42,Sample_Location=Greenhouse 2022-06-30T00:00:00");
    }

    #[test]
    fn unit_splits_out_of_parenthesized_names() {
        assert_eq!(split_unit("CALCIUM (meq/L)"), ("CALCIUM".to_string(), "meq/L".to_string()));
        assert_eq!(split_unit("Sulfur_ppm"), ("Sulfur ppm".to_string(), String::new()));
        assert_eq!(split_unit("pH"), ("pH".to_string(), String::new()));
    }

    #[test]
    fn markdown_table_lists_each_field_under_a_dated_heading() {
        let md = render_markdown(&record(), "2022-06-30");
        assert!(md.starts_with("## Saturated Paste Measurement Results (2022-06-30)\n"));
        assert!(md.contains("| Test | Result | Unit |\n"));
        assert!(md.contains("| pH | 6.8 |  |\n"));
        assert!(md.contains("| Sample Location | Greenhouse |  |\n"));
    }
}
