// src/engine/mod.rs
pub mod normalize;
pub mod segment;
pub mod variant;

// Re-export the engine surface for convenience
pub use normalize::{coerce, normalize, FieldRecord, FieldValue, MappingConfig};
pub use segment::{segment, Grid};
pub use variant::{classify, ReportVariant};

use crate::utils::error::EngineError;

/// The per-document core: classify the report from its first-page text,
/// segment the extracted grid with that variant's band rules, then map and
/// coerce into the final record. Pure apart from coercion warnings.
pub fn build_record(
    page_text: &str,
    grid: &Grid,
    mapping: &MappingConfig,
) -> Result<FieldRecord, EngineError> {
    let variant = classify(page_text)?;
    tracing::debug!("classified report as {}", variant.code());
    let pairs = segment(grid, variant, mapping)?;
    Ok(normalize(&pairs, mapping, variant))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[Option<&str>]) -> Vec<Option<String>> {
        cells.iter().map(|c| c.map(str::to_string)).collect()
    }

    fn m3_grid() -> Grid {
        vec![
            row(&[Some("Total Exchange Capacity (M. E.)"), None, Some("11.42")]),
            row(&[Some("pH of Soil Sample"), None, Some("6.4")]),
            row(&[Some("Organic Matter, Percent"), None, Some("45.7")]),
            row(&[Some("SULFUR (ppm)"), None, Some("12")]),
            row(&[None, None, None]),
            row(&[None, None, None]),
            row(&[None, None, None]),
            row(&[None, Some("Boron (p.p.m.)"), Some("1.11")]),
        ]
    }

    #[test]
    fn mehlich3_header_row_maps_to_canonical_number() {
        let mapping = MappingConfig::default();
        let record = build_record("Mehlich III Soil Test Report", &m3_grid(), &mapping).unwrap();
        assert_eq!(record.code(), "M3");
        assert!(record
            .fields
            .contains(&("Sulfur_ppm".to_string(), FieldValue::Number(12.0))));
    }

    #[test]
    fn saturated_paste_record_maps_ph_and_drops_excluded_labels() {
        let mapping = MappingConfig::default();
        let mut grid: Grid = vec![row(&[None, None, None, None]); 24];
        grid[0] = row(&[Some("pH of Soil Sample"), None, None, Some("6.8")]);
        grid[1] = row(&[Some("Sample ID"), None, None, Some("42")]);
        let record =
            build_record("Saturated Paste Extract Report", &grid, &mapping).unwrap();
        assert_eq!(record.code(), "SP");
        assert_eq!(record.fields, vec![("pH".to_string(), FieldValue::Number(6.8))]);
    }

    #[test]
    fn one_malformed_document_does_not_sink_the_batch() {
        let mapping = MappingConfig::default();
        let broken: Grid = vec![row(&[Some("pH of Soil Sample"), None, Some("6.4")])];
        let batch = [m3_grid(), broken, m3_grid()];

        let mut records = Vec::new();
        for grid in &batch {
            match build_record("Mehlich III Soil Test Report", grid, &mapping) {
                Ok(record) => records.push(record),
                Err(e) => assert!(matches!(e, EngineError::MalformedTable(_))),
            }
        }
        assert_eq!(records.len(), 2);
    }
}
