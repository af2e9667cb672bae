// src/engine/normalize.rs
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::engine::variant::ReportVariant;
use crate::utils::error::AppError;

// Raw labels exactly as the extractor produces them, embedded newlines and
// all. Lookup is exact-match; anything unmapped passes through unchanged as
// its own canonical name.
static NAME_MAPPING: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Sample Location", "Sample_Location"),
        ("Total Exchange Capacity (M. E.)", "TEC"),
        ("pH of Soil Sample", "pH"),
        ("Organic Matter, Percent", "Organic_%"),
        ("SULFUR (ppm)", "Sulfur_ppm"),
        ("SULFUR: p.p.m.", "Sulfur_ppm"),
        ("Bicarbonate (HCO3) ppm", "Bicarbonate_ppm"),
        ("Mehlich III Phosphorous: as (P O )\n2 5\nlbs / acre", "Phosphorous_lbs"),
        ("Desired Value\nCALCIUM:\nValue Found\nlbs / acre\nDeficit", "Calcium_lbs"),
        ("Desired Value\nMAGNESIUM:\nValue Found\nlbs / acre\nDeficit", "Magnesium_lbs"),
        ("Desired Value\nPOTASSIUM:\nlbs / acre Value Found\nDeficit", "Potassium_lbs"),
        ("SODIUM: lbs / acre", "Sodium_lbs"),
        ("Calcium (60 to 70%)", "Calcium_%"),
        ("Calcium", "Calcium_%"),
        ("Magnesium (10 to 20%)", "Magnesium_%"),
        ("Magnesium", "Magnesium_%"),
        ("Potassium (2 to 5%)", "Potassium_%"),
        ("Potassium", "Potassium_%"),
        ("Sodium (.5 to 3%)", "Sodium_%"),
        ("Sodium", "Sodium_%"),
        ("Soluble Salts ppm", "Soluble_Salts_ppm"),
        ("Chloride (Cl) ppm", "Chloride_ppm"),
        ("Bicarbonate HCO3) ppm", "Bicarbonate_ppm"),
        ("Other Bases (Variable)", "Other_bases"),
        ("Exchangable Hydrogen (10 to 15%)", "Exchangable_Hydrogen"),
        ("Boron (p.p.m.)", "Boron_ppm"),
        ("Iron (p.p.m.)", "Iron_ppm"),
        ("Manganese (p.p.m.)", "Manganese_ppm"),
        ("Copper (p.p.m.)", "Copper_ppm"),
        ("Zinc (p.p.m.)", "Zinc_ppm"),
        ("Aluminum (p.p.m.)", "Aluminum_ppm"),
        ("Ammonium (p.p.m.)", "Ammonium_ppm"),
        ("Nitrate (p.p.m.)", "Nitrate_ppm"),
        ("Media Density g/cm3", "Media_Density"),
        ("PHOSPHORUS (ppm)", "Phosphorous_ppm"),
        ("CALCIUM (ppm)", "Calcium_ppm"),
        ("CALCIUM (meq/l)", "Calcium_meq/L"),
        ("MAGNESIUM (ppm)", "Magnesium_ppm"),
        ("MAGNESIUM (meq/l)", "Magnesium_meq/L"),
        ("POTASSIUM: (ppm)", "Potassium_ppm"),
        ("POTASSIUM: (meq/l)", "Potassium_meq/L"),
        ("SODIUM (ppm)", "Sodium_ppm"),
        ("SODIUM (meq/l)", "Sodium_meq/L"),
    ])
});

// Administrative readings that never belong in a record.
static READINGS_TO_EXCLUDE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from(["Sample ID", "Lab Number", "Sample Depth in inches", "Water Used"])
});

/// Shape of the optional mapping-override file: `{"mapping": {raw: canonical}}`.
#[derive(Debug, Deserialize)]
struct MappingOverride {
    mapping: HashMap<String, String>,
}

/// Process-wide, read-only label configuration: the built-in mapping table
/// plus any user-supplied overrides. Loaded once at startup and passed by
/// reference into the segmenter and normalizer.
#[derive(Debug, Default)]
pub struct MappingConfig {
    overrides: HashMap<String, String>,
}

impl MappingConfig {
    /// Loads the configuration, overlaying entries from `path` when given.
    /// A missing or invalid override file is a startup failure, not a
    /// per-document one.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read mapping override {}: {}", path.display(), e))
        })?;
        let parsed: MappingOverride = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("invalid mapping override {}: {}", path.display(), e))
        })?;
        tracing::info!(
            "loaded {} mapping override entries from {}",
            parsed.mapping.len(),
            path.display()
        );
        Ok(Self { overrides: parsed.mapping })
    }

    /// Canonical field name for a raw label. Unmapped labels pass through.
    pub fn canonical<'a>(&'a self, raw_label: &'a str) -> &'a str {
        if let Some(name) = self.overrides.get(raw_label) {
            return name;
        }
        NAME_MAPPING.get(raw_label).copied().unwrap_or(raw_label)
    }

    pub fn is_excluded(&self, raw_label: &str) -> bool {
        READINGS_TO_EXCLUDE.contains(raw_label)
    }
}

/// A coerced cell value. `Text` is the observable form of a value the
/// coercer could not parse as numeric: it is retained verbatim, never
/// silently defaulted to zero.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Coerces raw cell text into a typed value.
///
/// Rules, in order: thousands-separator commas are stripped; a leading ">"
/// or "<" is dropped and the remainder parsed as a float (the boundary
/// magnitude is kept, the inequality itself is discarded); text that is
/// digits with at most one decimal point parses as a float; everything else
/// passes through unchanged (sample-location labels and the like).
pub fn coerce(raw: &str) -> FieldValue {
    let cleaned = raw.replace(',', "");
    if cleaned.starts_with('>') || cleaned.starts_with('<') {
        if let Ok(n) = cleaned[1..].trim().parse::<f64>() {
            return FieldValue::Number(n);
        }
    }
    if is_plain_number(&cleaned) {
        if let Ok(n) = cleaned.parse::<f64>() {
            return FieldValue::Number(n);
        }
    }
    FieldValue::Text(raw.to_string())
}

// Digits plus at most one decimal point. Signs, exponents, and anything
// alphabetic fall through to Text.
fn is_plain_number(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().filter(|c| *c == '.').count() <= 1
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// The final ordered record for one document.
///
/// Names parallel values and keep segmentation order; duplicate canonical
/// names across bands are retained here (a consumer keying by name sees
/// last-write-wins).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    pub variant: ReportVariant,
    pub fields: Vec<(String, FieldValue)>,
}

impl FieldRecord {
    pub fn code(&self) -> &'static str {
        self.variant.code()
    }
}

/// Maps and coerces segmented pairs into the final record.
///
/// One output entry per input pair, in input order; all filtering already
/// happened in the segmenter.
pub fn normalize(
    pairs: &[(String, String)],
    mapping: &MappingConfig,
    variant: ReportVariant,
) -> FieldRecord {
    let mut fields = Vec::with_capacity(pairs.len());
    for (raw_label, raw_value) in pairs {
        let name = mapping.canonical(raw_label).to_string();
        let value = coerce(raw_value);
        if let FieldValue::Text(text) = &value {
            tracing::warn!("non-numeric reading kept as text: {}={:?}", name, text);
        }
        fields.push((name, value));
    }
    FieldRecord { variant, fields }
}
