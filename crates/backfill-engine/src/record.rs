//! Row view used by the resolver: the entity name plus the target fields that
//! already hold a value.

use std::collections::BTreeMap;

use crate::table::Table;

/// Column that receives a row's last failure message
pub const ENRICH_ERROR_COLUMN: &str = "enrich_error";

/// Longest failure message stored in [`ENRICH_ERROR_COLUMN`], in characters
pub const MAX_ERROR_CHARS: usize = 200;

/// Columns the enrichment fills, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetField {
    Qid,
    Country,
    Industry,
    HqLocation,
    Inception,
    Website,
}

impl TargetField {
    pub const ALL: [TargetField; 6] = [
        Self::Qid,
        Self::Country,
        Self::Industry,
        Self::HqLocation,
        Self::Inception,
        Self::Website,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Self::Qid => "qid",
            Self::Country => "country",
            Self::Industry => "industry",
            Self::HqLocation => "hq_location",
            Self::Inception => "inception",
            Self::Website => "website",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }
}

impl std::fmt::Display for TargetField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Null, empty and whitespace-only cells are all "missing"
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Values to write back into one row. Only previously-missing fields appear.
pub type FieldChanges = BTreeMap<TargetField, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRecord {
    /// Trimmed entity name; empty when the cell was blank
    pub name: String,
    present: BTreeMap<TargetField, String>,
}

impl EntityRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            present: BTreeMap::new(),
        }
    }

    /// Builder: record an existing value. Blank values are ignored.
    pub fn with(mut self, field: TargetField, value: &str) -> Self {
        if !is_blank(Some(value)) {
            self.present.insert(field, value.to_string());
        }
        self
    }

    /// Snapshot of `row`, reading target fields by their column names.
    pub fn from_table(table: &Table, row: usize, name_col: usize) -> Self {
        TargetField::ALL.into_iter().fold(
            Self::new(table.get(row, name_col).unwrap_or("")),
            |record, field| match table.value(row, field.column()) {
                Some(value) => record.with(field, value),
                None => record,
            },
        )
    }

    pub fn get(&self, field: TargetField) -> Option<&str> {
        self.present.get(&field).map(String::as_str)
    }

    pub fn is_missing(&self, field: TargetField) -> bool {
        !self.present.contains_key(&field)
    }
}

/// Cut `message` to at most `max` characters on a char boundary.
pub fn truncate_chars(message: &str, max: usize) -> &str {
    match message.char_indices().nth(max) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}
