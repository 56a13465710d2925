//! Loading the historical automobile sales dataset from CSV.
//!
//! The dataset is read once at startup into a [Dataset], an immutable handle
//! that is cheap to clone and is shared by every request handler.

use std::{fs::File, io::Read, ops::RangeInclusive, path::Path, sync::Arc};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use time::Month;

/// The years covered by the dataset, and the only years a user may select.
pub const SUPPORTED_YEARS: RangeInclusive<u16> = 1980..=2023;

/// The CSV columns every sales file must provide.
const REQUIRED_COLUMNS: [&str; 7] = [
    "Year",
    "Month",
    "Vehicle_Type",
    "Automobile_Sales",
    "Advertising_Expenditure",
    "unemployment_rate",
    "Recession",
];

/// One row of the sales dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    /// The calendar year, always within [SUPPORTED_YEARS].
    pub year: u16,
    /// The calendar month.
    pub month: Month,
    /// The category of vehicle, never empty.
    pub vehicle_type: String,
    /// The number of vehicles sold.
    pub automobile_sales: f64,
    /// The amount spent on advertising.
    pub advertising_expenditure: f64,
    /// The unemployment rate as a percentage.
    pub unemployment_rate: f64,
    /// Whether the month fell within an economic recession.
    pub recession: bool,
}

/// The reasons the sales dataset could not be loaded.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum LoadError {
    /// The file is missing or could not be read.
    #[error("could not read \"{path}\": {reason}")]
    Unreadable {
        /// The path that was opened.
        path: String,
        /// The underlying I/O error.
        reason: String,
    },

    /// The header row does not contain one of the required columns.
    #[error("the CSV header is missing the column \"{0}\"")]
    MissingColumn(&'static str),

    /// A row could not be decoded, e.g. a sales figure is not a number.
    #[error("line {line}: {reason}")]
    Malformed {
        /// The 1-based line number of the row.
        line: u64,
        /// What went wrong while decoding the row.
        reason: String,
    },

    /// The year of a row is outside [SUPPORTED_YEARS].
    #[error("line {line}: the year {year} is outside the supported range 1980-2023")]
    YearOutOfRange {
        /// The 1-based line number of the row.
        line: u64,
        /// The offending year.
        year: u16,
    },

    /// The month is not a recognised month name or abbreviation.
    #[error("line {line}: \"{month}\" is not a month")]
    UnknownMonth {
        /// The 1-based line number of the row.
        line: u64,
        /// The offending text.
        month: String,
    },

    /// The recession flag is not 0 or 1.
    #[error("line {line}: the recession flag must be 0 or 1, got \"{value}\"")]
    InvalidRecessionFlag {
        /// The 1-based line number of the row.
        line: u64,
        /// The offending text.
        value: String,
    },

    /// The vehicle type is empty.
    #[error("line {line}: the vehicle type is empty")]
    MissingVehicleType {
        /// The 1-based line number of the row.
        line: u64,
    },

    /// A numeric column holds NaN or infinity.
    #[error("line {line}: the value in column \"{column}\" is not a finite number")]
    NonFiniteValue {
        /// The 1-based line number of the row.
        line: u64,
        /// The name of the offending column.
        column: &'static str,
    },
}

/// An immutable, shared handle to the loaded sales records.
///
/// Cloning a [Dataset] only clones a reference count.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Arc<[SalesRecord]>,
}

impl Dataset {
    /// Create a dataset from records that have already been validated.
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// The records in file order.
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read the sales dataset at `path`.
///
/// # Errors
/// Returns a [LoadError] if the file cannot be opened or any row is invalid.
/// See [parse_dataset] for the row rules.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|error| LoadError::Unreadable {
        path: path.display().to_string(),
        reason: error.to_string(),
    })?;

    let dataset = parse_dataset(file)?;
    tracing::info!(
        "Loaded {} sales records from {}",
        dataset.len(),
        path.display()
    );

    Ok(dataset)
}

/// Parse comma separated sales data with a header row.
///
/// Columns are matched by header name and extra columns are ignored. The whole
/// dataset is rejected on the first invalid row so that rendering never has to
/// deal with malformed data.
///
/// # Errors
/// Returns a [LoadError] describing the first problem found.
pub fn parse_dataset(reader: impl Read) -> Result<Dataset, LoadError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|error| LoadError::Malformed {
            line: 1,
            reason: error.to_string(),
        })?
        .clone();

    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        return Err(LoadError::MissingColumn(column));
    }

    let mut records = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|error| LoadError::Malformed {
            line: error.position().map_or(0, |position| position.line()),
            reason: error.to_string(),
        })?;

        records.push(parse_record(&record, &headers)?);
    }

    Ok(Dataset::new(records))
}

#[derive(Debug, Deserialize)]
struct SalesCsvRow {
    #[serde(rename = "Year")]
    year: u16,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Vehicle_Type")]
    vehicle_type: String,
    #[serde(rename = "Automobile_Sales")]
    automobile_sales: f64,
    #[serde(rename = "Advertising_Expenditure")]
    advertising_expenditure: f64,
    #[serde(rename = "unemployment_rate")]
    unemployment_rate: f64,
    #[serde(rename = "Recession")]
    recession: String,
}

fn parse_record(record: &StringRecord, headers: &StringRecord) -> Result<SalesRecord, LoadError> {
    let line = record.position().map_or(0, |position| position.line());

    let row: SalesCsvRow =
        record
            .deserialize(Some(headers))
            .map_err(|error| LoadError::Malformed {
                line,
                reason: error.to_string(),
            })?;

    if !SUPPORTED_YEARS.contains(&row.year) {
        return Err(LoadError::YearOutOfRange {
            line,
            year: row.year,
        });
    }

    let month = parse_month(&row.month).ok_or_else(|| LoadError::UnknownMonth {
        line,
        month: row.month.clone(),
    })?;

    if row.vehicle_type.is_empty() {
        return Err(LoadError::MissingVehicleType { line });
    }

    for (column, value) in [
        ("Automobile_Sales", row.automobile_sales),
        ("Advertising_Expenditure", row.advertising_expenditure),
        ("unemployment_rate", row.unemployment_rate),
    ] {
        if !value.is_finite() {
            return Err(LoadError::NonFiniteValue { line, column });
        }
    }

    let recession = parse_recession_flag(&row.recession).ok_or_else(|| {
        LoadError::InvalidRecessionFlag {
            line,
            value: row.recession.clone(),
        }
    })?;

    Ok(SalesRecord {
        year: row.year,
        month,
        vehicle_type: row.vehicle_type,
        automobile_sales: row.automobile_sales,
        advertising_expenditure: row.advertising_expenditure,
        unemployment_rate: row.unemployment_rate,
        recession,
    })
}

const MONTH_NAMES: [(Month, &str); 12] = [
    (Month::January, "january"),
    (Month::February, "february"),
    (Month::March, "march"),
    (Month::April, "april"),
    (Month::May, "may"),
    (Month::June, "june"),
    (Month::July, "july"),
    (Month::August, "august"),
    (Month::September, "september"),
    (Month::October, "october"),
    (Month::November, "november"),
    (Month::December, "december"),
];

/// Parse a full month name or a three letter abbreviation, ignoring case.
fn parse_month(text: &str) -> Option<Month> {
    let text = text.to_ascii_lowercase();

    MONTH_NAMES
        .iter()
        .find(|(_, name)| *name == text || (text.len() == 3 && name.starts_with(&text)))
        .map(|(month, _)| *month)
}

fn parse_recession_flag(text: &str) -> Option<bool> {
    match text {
        "1" | "1.0" => Some(true),
        "0" | "0.0" => Some(false),
        _ => None,
    }
}
