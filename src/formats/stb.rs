use super::reader::TextEncoding;
use crate::error::DecodeError;
use std::str::FromStr;

/// Grid of text cells exported from a spreadsheet as tab-delimited lines.
///
/// Cells are kept as text. Typed accessors parse on demand: a blank cell yields the
/// type's default, a non-blank cell that does not parse is an error at the call site.
#[derive(Debug, Clone, Default)]
pub struct StructuredTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    column_count: usize,
}

pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<StructuredTable, DecodeError> {
    let text = encoding.decode(bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let mut lines: Vec<&str> = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)).collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let mut lines = lines.into_iter();
    let Some(header) = lines.next() else {
        return Err(DecodeError::Malformed("table has no header line".to_string()));
    };
    let columns: Vec<String> = header.split('\t').map(|cell| cell.trim().to_string()).collect();
    let rows: Vec<Vec<String>> =
        lines.map(|line| line.split('\t').map(|cell| cell.to_string()).collect()).collect();
    let column_count = rows.iter().map(Vec::len).chain(std::iter::once(columns.len())).max().unwrap_or(0);
    Ok(StructuredTable { columns, rows, column_count })
}

impl StructuredTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.eq_ignore_ascii_case(name))
    }

    pub fn cell(&self, row: usize, column: usize) -> Result<&str, DecodeError> {
        let out_of_range = || DecodeError::CellOutOfRange {
            row,
            column,
            rows: self.rows.len(),
            columns: self.column_count,
        };
        if column >= self.column_count {
            return Err(out_of_range());
        }
        let cells = self.rows.get(row).ok_or_else(out_of_range)?;
        Ok(cells.get(column).map(String::as_str).unwrap_or(""))
    }

    pub fn cell_by_name(&self, row: usize, column: &str) -> Result<&str, DecodeError> {
        let index = self
            .column_index(column)
            .ok_or_else(|| DecodeError::Malformed(format!("table has no column named '{column}'")))?;
        self.cell(row, index)
    }

    pub fn parse<T>(&self, row: usize, column: usize, expected: &'static str) -> Result<T, DecodeError>
    where
        T: FromStr + Default,
    {
        let text = self.cell(row, column)?.trim();
        if text.is_empty() {
            return Ok(T::default());
        }
        text.parse::<T>().map_err(|_| DecodeError::CellParse { row, column, text: text.to_string(), expected })
    }

    pub fn int(&self, row: usize, column: usize) -> Result<i32, DecodeError> {
        self.parse(row, column, "integer")
    }

    pub fn byte(&self, row: usize, column: usize) -> Result<u8, DecodeError> {
        self.parse(row, column, "byte")
    }

    pub fn float(&self, row: usize, column: usize) -> Result<f32, DecodeError> {
        self.parse(row, column, "float")
    }

    pub fn string(&self, row: usize, column: usize) -> Result<String, DecodeError> {
        Ok(self.cell(row, column)?.to_string())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
