//! CSV parsing for contact imports.
//!
//! Turns decoded text into numbered rows: validates the header once, then
//! yields each record trimmed and checked for the required fields. Nothing
//! here touches the database, which keeps the row rules unit-testable.

use std::collections::{BTreeSet, HashMap};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};

use super::ImportError;
use crate::store::parse_tag_names;
use crate::store::validation::ContactDraft;

/// Columns every import file must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "email", "phone"];

/// The header is line 1, so the first record is line 2.
pub const FIRST_DATA_LINE: usize = 2;

pub const DEFAULT_DELIMITER: u8 = b',';

/// Resolve the caller's delimiter choice; blank means `,`.
pub fn parse_delimiter(value: Option<&str>) -> Result<u8, ImportError> {
    let value = match value {
        None | Some("") => return Ok(DEFAULT_DELIMITER),
        Some(value) => value,
    };

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() && !matches!(ch, '"' | '\n' | '\r') => Ok(ch as u8),
        _ => Err(ImportError::InvalidDelimiter(value.to_string())),
    }
}

/// Positions of the recognised columns in the header.
#[derive(Debug, Clone)]
struct ColumnMap {
    name: usize,
    email: usize,
    phone: usize,
    address: Option<usize>,
    photo_url: Option<usize>,
    tags: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.trim(), idx))
            .collect();

        let missing: BTreeSet<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !positions.contains_key(column))
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }

        Ok(Self {
            name: positions["name"],
            email: positions["email"],
            phone: positions["phone"],
            address: positions.get("address").copied(),
            photo_url: positions.get("photo_url").copied(),
            tags: positions.get("tags").copied(),
        })
    }
}

fn field(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|idx| record.get(idx))
        .unwrap_or("")
        .trim()
        .to_string()
}

/// One data row with every recognised field trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub photo_url: String,
    pub tags: String,
}

impl ContactRow {
    fn from_record(record: &StringRecord, columns: &ColumnMap) -> Self {
        Self {
            name: field(record, Some(columns.name)),
            email: field(record, Some(columns.email)),
            phone: field(record, Some(columns.phone)),
            address: field(record, columns.address),
            photo_url: field(record, columns.photo_url),
            tags: field(record, columns.tags),
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.phone.is_empty()
    }

    pub fn draft(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            photo_url: self.photo_url.clone(),
        }
    }

    pub fn tag_names(&self) -> Vec<String> {
        parse_tag_names(&self.tags)
    }
}

/// Outcome of reading one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    Ready(ContactRow),
    /// `name`, `email` or `phone` is blank.
    MissingRequired,
    /// The CSV parser rejected the record.
    Malformed(String),
}

/// Iterator over `(line, row)` pairs of an import file.
pub struct ContactCsvReader<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    columns: ColumnMap,
    next_line: usize,
}

impl<'a> ContactCsvReader<'a> {
    /// Read and validate the header row.
    ///
    /// Fails with [`ImportError::MissingColumns`] (sorted names) before any
    /// data row is looked at.
    pub fn new(text: &'a str, delimiter: u8) -> Result<Self, ImportError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let columns = ColumnMap::from_headers(&headers)?;

        Ok(Self {
            records: reader.into_records(),
            columns,
            next_line: FIRST_DATA_LINE,
        })
    }
}

impl Iterator for ContactCsvReader<'_> {
    type Item = (usize, ParsedRow);

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let line = self.next_line;
        self.next_line += 1;

        let parsed = match record {
            Ok(record) => {
                let row = ContactRow::from_record(&record, &self.columns);
                if row.has_required_fields() {
                    ParsedRow::Ready(row)
                } else {
                    ParsedRow::MissingRequired
                }
            }
            Err(err) => ParsedRow::Malformed(err.to_string()),
        };

        Some((line, parsed))
    }
}
