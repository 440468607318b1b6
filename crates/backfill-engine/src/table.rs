//! In-memory table of nullable string cells with CSV I/O.
//!
//! Column order and unknown columns survive a load/save round trip; an empty
//! CSV field loads as null.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug)]
pub enum TableError {
    Csv(csv::Error),
    Io(std::io::Error),
    /// A data row with more cells than the header has columns
    RowTooWide {
        line: u64,
        cells: usize,
        columns: usize,
    },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(e) => write!(f, "CSV: {e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::RowTooWide {
                line,
                cells,
                columns,
            } => write!(f, "line {line}: expected {columns} fields, saw {cells}"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<std::io::Error> for TableError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read_csv(path: &Path) -> Result<Self, TableError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
        let mut table = Self::new(headers);
        for record in csv.records() {
            let record = record?;
            if record.len() > table.headers.len() {
                return Err(TableError::RowTooWide {
                    line: record.position().map_or(0, |p| p.line()),
                    cells: record.len(),
                    columns: table.headers.len(),
                });
            }
            table.push_row(record.iter().map(|cell| {
                if cell.is_empty() {
                    None
                } else {
                    Some(cell.to_string())
                }
            }));
        }
        Ok(table)
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), TableError> {
        let file = File::create(path)?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.headers)?;
        for row in &self.rows {
            csv.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Append a row no wider than the header, padding it with nulls.
    fn push_row(&mut self, cells: impl IntoIterator<Item = Option<String>>) {
        let mut row: Vec<Option<String>> = cells.into_iter().collect();
        debug_assert!(row.len() <= self.headers.len());
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of `name`, appending it as an all-null column when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.headers.len() - 1
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Cell by column name; `None` for a null cell or unknown column
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        self.get(row, self.column_index(column)?)
    }

    /// Overwrite one cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: Option<String>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }
}
