//! CSV inventory feed
//!
//! Header-mapped columns: `item_number`, `manufacturer`, `description`,
//! `price`, `quantity`. Only `item_number` and `price` are required; column
//! order and extra columns do not matter.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{DeserializeRecordsIntoIter, ReaderBuilder, Trim};
use fflbro_core::{DistributorFeed, FeedRecord};
use fflbro_domain::{FflBroError, ProductFields, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CsvRow {
    item_number: String,
    #[serde(default)]
    manufacturer: String,
    #[serde(default)]
    description: String,
    price: String,
    #[serde(default)]
    quantity: Option<u32>,
}

/// Streaming CSV feed
pub struct CsvFeed<R: Read> {
    rows: DeserializeRecordsIntoIter<R, CsvRow>,
    expected_total: Option<u64>,
}

impl CsvFeed<File> {
    /// Open `path`, counting its records up front so progress has a total.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let total = count_records(open(path)?)?;
        let mut feed = Self::from_reader(open(path)?);
        feed.expected_total = Some(total);
        tracing::debug!(path = %path.display(), total, "opened csv feed");
        Ok(feed)
    }
}

impl<R: Read> CsvFeed<R> {
    /// Stream records from `reader` without a known total.
    pub fn from_reader(reader: R) -> Self {
        let rows = builder().from_reader(reader).into_deserialize();
        Self { rows, expected_total: None }
    }

    pub fn with_expected_total(mut self, total: u64) -> Self {
        self.expected_total = Some(total);
        self
    }
}

impl<R: Read> DistributorFeed for CsvFeed<R> {
    fn expected_total(&self) -> Option<u64> {
        self.expected_total
    }

    fn next_record(&mut self) -> Option<Result<FeedRecord>> {
        let row = self.rows.next()?;
        Some(row.map_err(csv_error).and_then(into_record))
    }
}

fn builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).trim(Trim::All);
    builder
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        FflBroError::InvalidInput(format!("cannot open feed {}: {e}", path.display()))
    })
}

fn count_records(file: File) -> Result<u64> {
    let mut reader = builder().from_reader(file);
    let mut total = 0;
    for record in reader.records() {
        record.map_err(csv_error)?;
        total += 1;
    }
    Ok(total)
}

fn into_record(row: CsvRow) -> Result<FeedRecord> {
    let raw_price = row.price.trim_start_matches('$').replace(',', "");
    let price = Decimal::from_str(&raw_price).map_err(|e| {
        FflBroError::InvalidPrice(format!("{}: unparsable price '{}': {e}", row.item_number, row.price))
    })?;
    Ok(FeedRecord::new(
        row.item_number,
        ProductFields::new(row.manufacturer, row.description, price, row.quantity.unwrap_or(0)),
    ))
}

fn csv_error(err: csv::Error) -> FflBroError {
    match err.position() {
        Some(position) => FflBroError::InvalidInput(format!("csv line {}: {err}", position.line())),
        None => FflBroError::InvalidInput(format!("csv: {err}")),
    }
}
