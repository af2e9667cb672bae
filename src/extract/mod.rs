// src/extract/mod.rs
use std::path::Path;

use chrono::{Local, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use pdfplumber::{Pdf, TableSettings, TextOptions};
use regex::Regex;

use crate::engine::Grid;
use crate::utils::error::ExtractError;

// Report dates print as m/d/Y somewhere in the first page's text.
static REPORT_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").expect("Failed to compile REPORT_DATE_RE")
});

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Everything the engine needs from one document: the first page's raw text
/// (classification and date extraction) and its primary table as a grid of
/// optional trimmed cells.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub text: String,
    pub grid: Grid,
}

/// Opens a report PDF and extracts the first page's text and first detected
/// table. Reports are single-page as far as this tool is concerned;
/// subsequent pages and tables are ignored.
pub fn extract_first_page(pdf_file: &Path) -> Result<ExtractedPage, ExtractError> {
    let pdf = Pdf::open_file(pdf_file, None)?;
    if pdf.page_count() == 0 {
        return Err(ExtractError::NoPages(pdf_file.display().to_string()));
    }
    let page = pdf.page(0)?;

    let text = page.extract_text(&TextOptions::default());
    let tables = page.find_tables(&TableSettings::default());
    let table = tables
        .into_iter()
        .next()
        .ok_or_else(|| ExtractError::NoTable(pdf_file.display().to_string()))?;

    let grid: Grid = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    cell.text
                        .as_deref()
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                })
                .collect()
        })
        .collect();

    tracing::debug!(
        "extracted {} text bytes and a {}-row table from {}",
        text.len(),
        grid.len(),
        pdf_file.display()
    );
    Ok(ExtractedPage { text, grid })
}

/// Resolves the record timestamp from the page text: the first m/d/Y date
/// found, at midnight, as ISO-8601; the current wall clock when the page
/// carries no usable date.
pub fn resolve_timestamp(page_text: &str) -> String {
    if let Some(m) = REPORT_DATE_RE.find(page_text) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%m/%d/%Y") {
            return date.and_time(NaiveTime::MIN).format(TIMESTAMP_FORMAT).to_string();
        }
        tracing::warn!("unparseable report date {:?}, falling back to now", m.as_str());
    }
    Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_comes_from_the_report_date() {
        let text = "Logan Labs, LLC\nSaturated Paste Extract\nDate: 6/30/2022\n";
        assert_eq!(resolve_timestamp(text), "2022-06-30T00:00:00");
    }

    #[test]
    fn timestamp_falls_back_to_now_without_a_date() {
        let stamp = resolve_timestamp("no date anywhere in this text");
        // Shape only; the value is the wall clock.
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], "T");
    }

    #[test]
    fn impossible_calendar_dates_fall_back_to_now() {
        let stamp = resolve_timestamp("printed 13/45/2022 by mistake");
        assert_eq!(stamp.len(), 19);
    }
}
