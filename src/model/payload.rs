use serde::{Deserialize, Serialize};
use std::fmt;

/// A table cell as stored by the data file: text, a number, or nothing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Numeric value of an amount cell. Text is read after dropping
    /// grouping separators and currency symbols; anything unreadable is 0.
    pub fn amount(&self) -> f64 {
        match self {
            Cell::Number(n) if n.is_finite() => *n,
            Cell::Number(_) | Cell::Empty => 0.0,
            Cell::Text(s) => parse_amount(s),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// One table of statement line items. Both fields may be absent in the
/// data file and default to empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementPayload {
    #[serde(default)]
    pub header_titles: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl StatementPayload {
    /// Columns to draw: the widest of the header and the first row, at least one.
    pub fn column_count(&self) -> usize {
        let first_row = self.rows.first().map_or(0, Vec::len);
        self.header_titles.len().max(first_row).max(1)
    }
}

/// Total of the last (amount) column.
pub fn sum_amount(payload: Option<&StatementPayload>) -> f64 {
    payload
        .map(|p| {
            p.rows
                .iter()
                .filter_map(|row| row.last())
                .map(Cell::amount)
                .sum()
        })
        .unwrap_or(0.0)
}

fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .map(arabic_digit_to_ascii)
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

fn arabic_digit_to_ascii(c: char) -> char {
    match c {
        '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
        '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
        '\u{066B}' => '.',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_deserialize_from_mixed_json() {
        let payload: StatementPayload = serde_json::from_str(
            r#"{"headerTitles":["البيان","المبلغ"],"rows":[["نقل",1500],["تخليص",null],["رسوم","250.5"]]}"#,
        )
        .unwrap();
        assert_eq!(payload.header_titles.len(), 2);
        assert_eq!(payload.rows[0][1], Cell::Number(1500.0));
        assert_eq!(payload.rows[1][1], Cell::Empty);
        assert_eq!(payload.rows[2][1], Cell::Text("250.5".to_string()));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let payload: StatementPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.header_titles.is_empty());
        assert!(payload.rows.is_empty());
        assert_eq!(payload.column_count(), 1);
    }

    #[test]
    fn column_count_takes_the_wider_source() {
        let payload = StatementPayload {
            header_titles: vec!["a".into(), "b".into()],
            rows: vec![vec!["1".into(), "2".into(), "3".into()]],
        };
        assert_eq!(payload.column_count(), 3);
    }

    #[test]
    fn numbers_display_without_trailing_zeros() {
        assert_eq!(Cell::Number(1500.0).to_string(), "1500");
        assert_eq!(Cell::Number(12.5).to_string(), "12.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn sums_last_column() {
        let payload = StatementPayload {
            header_titles: vec!["البيان".into(), "المبلغ".into()],
            rows: vec![
                vec!["a".into(), Cell::Number(100.0)],
                vec!["b".into(), "1,250$".into()],
                vec!["c".into(), "٣٠٠".into()],
                vec!["d".into(), "غير معروف".into()],
                vec![],
            ],
        };
        assert_eq!(sum_amount(Some(&payload)), 1650.0);
        assert_eq!(sum_amount(None), 0.0);
    }

    #[test]
    fn negative_amounts_are_kept() {
        assert_eq!(Cell::from("-75").amount(), -75.0);
    }
}
