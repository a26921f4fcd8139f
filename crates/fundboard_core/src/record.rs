use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field names the extraction pipeline is known to emit. Nothing guarantees
/// any of them is present on a given record.
pub mod field {
    pub const FUND_URL: &str = "fund_url";
    pub const FUND_NAME: &str = "fund_name";
    pub const APPLICANT_TYPES: &str = "applicant_types";
    pub const GEOGRAPHIC_SCOPE: &str = "geographic_scope";
    pub const BENEFICIARY_FOCUS: &str = "beneficiary_focus";
    pub const FUNDING_RANGE: &str = "funding_range";
    pub const RESTRICTIONS: &str = "restrictions";
    pub const APPLICATION_STATUS: &str = "application_status";
    pub const DEADLINE: &str = "deadline";
    pub const NOTES: &str = "notes";
    pub const ELIGIBILITY: &str = "eligibility";
    pub const EVIDENCE: &str = "evidence";
    pub const PAGES_SCRAPED: &str = "pages_scraped";
    pub const VISITED_URLS_COUNT: &str = "visited_urls_count";
    pub const EXTRACTION_TIMESTAMP: &str = "extraction_timestamp";
    pub const ERROR: &str = "error";
    pub const SOURCE_FOLDER: &str = "source_folder";
}

/// Eligibility vocabulary, best first. Sorting and the allow-set filter both
/// key off the position in this list.
pub const ELIGIBILITY_ORDER: [&str; 5] = [
    "Highly Eligible",
    "Eligible",
    "Possibly Eligible",
    "Low Match",
    "Not Eligible",
];

/// Rank of an eligibility label for sorting. Unknown or missing labels rank
/// after every known one.
pub fn eligibility_rank(label: Option<&str>) -> usize {
    label
        .and_then(|l| ELIGIBILITY_ORDER.iter().position(|known| *known == l))
        .unwrap_or(ELIGIBILITY_ORDER.len())
}

/// One value in a record. The pipeline emits strings, numbers, string lists,
/// or JSON null; null and absent are treated the same by every accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
    Null,
}

impl FieldValue {
    /// Stringified form used by search and filtering: lists joined with
    /// `", "`, whole numbers without a trailing `.0`, null as `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(format_number(*n)),
            FieldValue::List(items) => Some(items.join(", ")),
            FieldValue::Null => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// One funding-opportunity record: an open-ended field map. No schema is
/// enforced; accessors spell out their absent-value behavior instead of
/// leaning on truthiness.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl ResultRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) -> &mut Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Stringified field value; `None` for absent or null fields.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    /// Numeric field value; `None` for absent, null, or non-numeric fields.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.values()
    }
}

/// Best-effort natural key for a record: the first non-empty of `fund_url`,
/// `fund_name`, `source_folder`, `extraction_timestamp`, else the record's
/// position in the full set. Two records sharing all four fields collide;
/// that is an accepted limitation of field-derived identity, not something
/// this type papers over.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    const IDENTITY_FIELDS: [&'static str; 4] = [
        field::FUND_URL,
        field::FUND_NAME,
        field::SOURCE_FOLDER,
        field::EXTRACTION_TIMESTAMP,
    ];

    pub fn derive(record: &ResultRecord, position: usize) -> Self {
        for name in Self::IDENTITY_FIELDS {
            if let Some(text) = record.text(name) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return RowKey(trimmed.to_string());
                }
            }
        }
        RowKey(format!("#{position}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
