//! A1-notation ranges and per-row write addresses.

use super::error::{SheetsError, SheetsResult};

/// The fetch range, e.g. `Articles!A2:F`.
///
/// The parts needed to address individual rows (sheet name, first column,
/// first data row) plus the bounds that are read back on fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: Option<String>,
    /// Zero-based index of the title column.
    pub start_column: u32,
    /// One-based row number of the first fetched row.
    pub start_row: u32,
    /// Zero-based index of the last fetched column.
    pub end_column: u32,
    /// One-based last fetched row; `None` reads to the end of the sheet.
    pub end_row: Option<u32>,
}

impl SheetRange {
    pub fn parse(value: &str) -> SheetsResult<Self> {
        let invalid = |reason: &'static str| SheetsError::InvalidRange {
            value: value.to_string(),
            reason,
        };

        let (sheet, cells) = match value.rsplit_once('!') {
            Some((sheet, cells)) => {
                let sheet = sheet.trim();
                let sheet = sheet
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .map(|s| s.replace("''", "'"))
                    .unwrap_or_else(|| sheet.to_string());
                if sheet.is_empty() {
                    return Err(invalid("empty sheet name"));
                }
                (Some(sheet), cells)
            }
            None => (None, value),
        };

        let (start, end) = cells
            .split_once(':')
            .ok_or_else(|| invalid("expected START:END"))?;

        let (start_column, start_row) =
            split_cell(start.trim()).ok_or_else(|| invalid("malformed start cell"))?;
        let (end_column, end_row) =
            split_cell(end.trim()).ok_or_else(|| invalid("malformed end cell"))?;

        if end_column < start_column {
            return Err(invalid("end column precedes start column"));
        }

        let start_row = start_row.unwrap_or(1);
        if end_row.is_some_and(|end| end < start_row) {
            return Err(invalid("end row precedes start row"));
        }

        Ok(Self {
            sheet,
            start_column,
            start_row,
            end_column,
            end_row,
        })
    }

    /// One-based sheet row for the row at `index` in the fetched range.
    pub fn row_number(&self, index: usize) -> u32 {
        self.start_row + index as u32
    }

    /// Address covering status through score for the row at `index`, e.g. `Articles!B2:F2`.
    pub fn update_address(&self, index: usize) -> String {
        let row = self.row_number(index);
        let first = column_letters(self.start_column + 1);
        let last = column_letters(self.start_column + 5);
        match &self.sheet {
            Some(sheet) => format!("{}!{first}{row}:{last}{row}", quote_sheet(sheet)),
            None => format!("{first}{row}:{last}{row}"),
        }
    }
}

impl std::fmt::Display for SheetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "{}!", quote_sheet(sheet))?;
        }
        write!(
            f,
            "{}{}:{}",
            column_letters(self.start_column),
            self.start_row,
            column_letters(self.end_column)
        )?;
        match self.end_row {
            Some(row) => write!(f, "{row}"),
            None => Ok(()),
        }
    }
}

/// Splits `"AB12"` into `(27, Some(12))`; the row part is optional.
fn split_cell(cell: &str) -> Option<(u32, Option<u32>)> {
    let letters_end = cell
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(letters_end);
    if letters.is_empty() {
        return None;
    }

    let column = letters
        .chars()
        .try_fold(0u32, |acc, c| {
            let v = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            acc.checked_mul(26)?.checked_add(v)
        })?
        - 1;

    let row = if digits.is_empty() {
        None
    } else {
        match digits.parse::<u32>() {
            Ok(0) | Err(_) => return None,
            Ok(r) => Some(r),
        }
    };

    Some((column, row))
}

/// Zero-based column index to letters: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn column_letters(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn quote_sheet(sheet: &str) -> String {
    if sheet.chars().all(|c| c.is_alphanumeric() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}
