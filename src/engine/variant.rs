// src/engine/variant.rs
use crate::utils::error::EngineError;

/// The two supported report layouts.
///
/// Each variant owns its short measurement code (the metric-line prefix and
/// UDP routing key), the long name used in markdown headings, and the list of
/// row bands that drive the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    SaturatedPaste,
    Mehlich3,
}

impl ReportVariant {
    pub fn code(&self) -> &'static str {
        match self {
            ReportVariant::SaturatedPaste => "SP",
            ReportVariant::Mehlich3 => "M3",
        }
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            ReportVariant::SaturatedPaste => "Saturated Paste",
            ReportVariant::Mehlich3 => "Mehlich 3",
        }
    }

    /// Port the metric line for this variant is routed to.
    pub fn udp_port(&self) -> u16 {
        match self {
            ReportVariant::SaturatedPaste => 8196,
            ReportVariant::Mehlich3 => 8195,
        }
    }

    pub fn bands(&self) -> &'static [RowBand] {
        match self {
            ReportVariant::SaturatedPaste => &SP_BANDS,
            ReportVariant::Mehlich3 => &M3_BANDS,
        }
    }
}

/// Where a band's unit suffix comes from, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRule {
    /// Labels are used as printed.
    None,
    /// A grid column carries the unit; non-empty unit cells are appended to
    /// the label as `"<label> (<unit>)"`.
    Column(usize),
    /// A fixed unit, appended only on sticky continuation rows. Printed
    /// labels in these bands already embed their own annotation.
    Literal(&'static str),
}

/// A contiguous range of grid rows sharing one column-interpretation rule.
#[derive(Debug, Clone, Copy)]
pub struct RowBand {
    pub start: usize,
    /// `None` runs to the last row of the grid.
    pub end: Option<usize>,
    pub label_col: usize,
    pub value_col: usize,
    pub unit: UnitRule,
    /// An empty label cell reuses the previous non-empty label in this band.
    /// Models the PDF's merged-cell rendering (one printed label spanning a
    /// ppm row and the meq/L row below it).
    pub sticky: bool,
}

// Row ranges and column offsets are fixed properties of the two known
// report layouts.
static SP_BANDS: [RowBand; 4] = [
    // Header readings: sample metadata, pH, salts.
    RowBand { start: 0, end: Some(8), label_col: 0, value_col: 3, unit: UnitRule::None, sticky: false },
    // Anion/cation section: one printed label per nutrient, ppm row plus
    // meq/L row, unit in its own column.
    RowBand { start: 8, end: Some(18), label_col: 1, value_col: 3, unit: UnitRule::Column(2), sticky: true },
    // Base saturation percentages.
    RowBand { start: 18, end: Some(22), label_col: 1, value_col: 3, unit: UnitRule::Literal("%"), sticky: true },
    // Trace elements below the main table.
    RowBand { start: 22, end: None, label_col: 1, value_col: 3, unit: UnitRule::None, sticky: false },
];

static M3_BANDS: [RowBand; 2] = [
    // Header readings, value column 2 in this layout.
    RowBand { start: 0, end: Some(7), label_col: 0, value_col: 2, unit: UnitRule::None, sticky: false },
    // Trace elements.
    RowBand { start: 7, end: None, label_col: 1, value_col: 2, unit: UnitRule::None, sticky: false },
];

/// Decides which report layout a document is from its first-page text.
///
/// Saturated Paste reports always name themselves; anything else with
/// extractable text is a Mehlich-3 report.
pub fn classify(first_page_text: &str) -> Result<ReportVariant, EngineError> {
    if first_page_text.trim().is_empty() {
        return Err(EngineError::UnsupportedReport(
            "no extractable text on first page".to_string(),
        ));
    }
    if first_page_text.contains("Saturated") {
        Ok(ReportVariant::SaturatedPaste)
    } else {
        Ok(ReportVariant::Mehlich3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_saturated_paste() {
        let variant = classify("Logan Labs, LLC  Saturated Paste Extract  6/30/2022").unwrap();
        assert_eq!(variant, ReportVariant::SaturatedPaste);
        assert_eq!(variant.code(), "SP");
    }

    #[test]
    fn classify_mehlich3() {
        let variant = classify("Mehlich III Soil Test Report").unwrap();
        assert_eq!(variant, ReportVariant::Mehlich3);
        assert_eq!(variant.code(), "M3");
    }

    #[test]
    fn classify_empty_text_is_unsupported() {
        let err = classify("   \n  ").unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedReport(_)));
    }

    #[test]
    fn bands_are_ordered_and_contiguous_where_bounded() {
        for variant in [ReportVariant::SaturatedPaste, ReportVariant::Mehlich3] {
            let bands = variant.bands();
            for pair in bands.windows(2) {
                let end = pair[0].end.expect("only the last band may be open-ended");
                assert_eq!(end, pair[1].start);
            }
            assert!(bands.last().unwrap().end.is_none());
        }
    }
}
