use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(value) => write!(f, "{value}"),
            Self::UInt(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

// Keyed by column name, so duplicate names keep the last value.
pub type Row = HashMap<String, CellValue>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub query: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub elapsed_micros: i64,
}

impl ResultSet {
    #[must_use]
    pub fn from_positional(
        query: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        elapsed_micros: i64,
    ) -> Self {
        let rows = rows
            .into_iter()
            .map(|values| {
                columns
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect::<HashMap<_, _>>()
            })
            .collect();

        Self {
            query: query.into(),
            columns,
            rows,
            elapsed_micros,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        let name = self.columns.get(column)?;
        self.rows.get(row)?.get(name)
    }

    #[must_use]
    pub fn cell_text(&self, row: usize, column: usize) -> String {
        self.cell(row, column)
            .map_or_else(|| CellValue::Null.to_string(), ToString::to_string)
    }

    #[must_use]
    pub fn flattened_text(&self) -> Vec<String> {
        (0..self.row_count())
            .flat_map(|row| (0..self.column_count()).map(move |column| (row, column)))
            .map(|(row, column)| self.cell_text(row, column))
            .collect()
    }
}
