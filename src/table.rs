use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::Result;

/// Delimiters considered while sniffing, in order of preference
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// A delimited input file parsed into rows of text cells
///
/// Column names are normalized on load: surrounding whitespace is trimmed,
/// letters are lower-cased and internal spaces become underscores. Cell
/// contents are left untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Reads a delimited file from disk
    ///
    /// The first line must be a header row. When `delimiter` is `None` the
    /// delimiter is sniffed from the header line; pass `Some(b',')` to force
    /// comma separation.
    pub fn from_path(path: impl AsRef<Path>, delimiter: Option<u8>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
        Self::from_reader(content.as_bytes(), delimiter)
    }

    /// Parses delimited content from a reader with a fixed delimiter
    pub fn from_reader(reader: impl Read, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let columns = reader
            .headers()?
            .iter()
            .map(normalize_column_name)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        info!("loaded {} rows x {} columns", rows.len(), columns.len());

        Ok(Self { columns, rows })
    }

    /// The normalized column names, in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The data rows, in file order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The position of a column by its normalized name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// The number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Picks the candidate delimiter occurring most often in the header line
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");

    let mut best = (DELIMITER_CANDIDATES[0], 0);
    for delimiter in DELIMITER_CANDIDATES {
        let count = header.matches(delimiter as char).count();
        if count > best.1 {
            best = (delimiter, count);
        }
    }

    best.0
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::Error;

    #[test]
    fn normalizes_column_names() {
        let table = RawTable::from_reader(
            "Invoice, Customer ID ,Unit Price\n1,2,3\n".as_bytes(),
            b',',
        )
        .unwrap();

        assert_eq!(table.columns(), ["invoice", "customer_id", "unit_price"]);
        assert_eq!(table.column_index("customer_id"), Some(1));
        assert_eq!(table.column_index("Customer ID"), None);
    }

    #[test]
    fn keeps_rows_in_file_order() {
        let table = RawTable::from_reader("a,b\n1,2\n3,4\n".as_bytes(), b',').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], ["1", "2"]);
        assert_eq!(table.rows()[1], ["3", "4"]);
    }

    #[test]
    fn sniffs_semicolon_delimited_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "price;quantity;invoicedate\n1;2;2024-01-01\n").unwrap();

        let table = RawTable::from_path(file.path(), None).unwrap();

        assert_eq!(table.columns(), ["price", "quantity", "invoicedate"]);
        assert_eq!(table.rows()[0], ["1", "2", "2024-01-01"]);
    }

    #[test]
    fn fixed_delimiter_overrides_sniffing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a;b\n1;2\n").unwrap();

        let table = RawTable::from_path(file.path(), Some(b',')).unwrap();

        assert_eq!(table.columns(), ["a;b"]);
    }

    #[test]
    fn sniffing_defaults_to_comma() {
        assert_eq!(sniff_delimiter("justoneheader\n1\n"), b',');
        assert_eq!(sniff_delimiter("a\tb\tc\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c\n"), b'|');
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let result = RawTable::from_path("no/such/file.csv", None);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let result = RawTable::from_reader("a,b\n1,2,3\n".as_bytes(), b',');
        assert!(matches!(result, Err(Error::Csv(_))));
    }
}
