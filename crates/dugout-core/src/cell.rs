// Row cells as read from CSV files or the store.
//
// A column that is missing from a row is simply absent from the map; a column
// that is present but explicitly null is `Field::Null`. The text sentinel only
// exists at the file boundary.

use std::collections::BTreeMap;
use std::fmt;

/// Token written in place of SQL NULL in exported CSV files.
pub const NULL_SENTINEL: &str = "__SQL_NULL__";

/// One untyped row: column name to cell.
pub type Row = BTreeMap<String, Field>;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Explicit null. Never overwrites a stored value during a merge.
    Null,
    Value(String),
}

impl Field {
    /// Parse a raw CSV cell, recognising the null sentinel.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == NULL_SENTINEL {
            Field::Null
        } else {
            Field::Value(raw.to_string())
        }
    }

    pub fn value(text: impl Into<String>) -> Self {
        Field::Value(text.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// The text of a non-null cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Null => None,
            Field::Value(s) => Some(s.as_str()),
        }
    }

    /// The trimmed text of a non-null, non-empty cell.
    pub fn non_empty(&self) -> Option<&str> {
        self.as_text().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Text form used when writing the cell back to a CSV file.
    pub fn to_csv(&self) -> &str {
        match self {
            Field::Null => NULL_SENTINEL,
            Field::Value(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_csv())
    }
}

impl From<&str> for Field {
    fn from(raw: &str) -> Self {
        Field::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_parses_to_null() {
        assert_eq!(Field::parse("__SQL_NULL__"), Field::Null);
        assert_eq!(Field::parse(" __SQL_NULL__ "), Field::Null);
        assert_eq!(Field::parse("Hawks"), Field::value("Hawks"));
    }

    #[test]
    fn empty_cell_is_a_value_not_null() {
        let f = Field::parse("");
        assert!(!f.is_null());
        assert_eq!(f.as_text(), Some(""));
        assert_eq!(f.non_empty(), None);
    }

    #[test]
    fn null_writes_back_as_sentinel() {
        assert_eq!(Field::Null.to_csv(), NULL_SENTINEL);
        assert_eq!(Field::value("3").to_string(), "3");
    }
}
