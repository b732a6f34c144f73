//! Typed records for the two CSV sources and the load boundary.
//!
//! Loading never reports malformed rows as errors: a row with a blank key or a
//! missing/non-finite required number is dropped and counted. Only failing to
//! open the source at all is an error (`ChartError::LoadFailure`).

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::types::Key;
use crate::error::{ChartError, ChartResult};

/// One `(country, year)` observation of internet use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternetUseRecord {
    pub code: Key,
    pub year: i32,
    /// Share of the population online, percent.
    pub value: f64,
}

/// Per-country indicators from the gapminder extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryIndicators {
    pub name: String,
    /// Upper-cased first three characters of `name`; not unique across countries.
    pub code: Key,
    pub internet_rate: f64,
    pub urban_rate: f64,
    pub income_per_person: Option<f64>,
}

impl CountryIndicators {
    /// Unique natural key of the row.
    #[must_use]
    pub fn name_key(&self) -> Key {
        Key::new(self.name.clone())
    }
}

#[derive(Debug, Deserialize)]
struct InternetUseRow {
    #[serde(rename = "LOCATION", default)]
    location: String,
    #[serde(rename = "TIME", default)]
    time: String,
    #[serde(rename = "Value", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct GapminderRow {
    #[serde(default)]
    country: String,
    #[serde(default)]
    internetuserate: String,
    #[serde(default)]
    urbanrate: String,
    #[serde(default)]
    incomeperperson: String,
}

/// Parses a trimmed cell as a finite number; blanks count as missing.
#[must_use]
pub fn parse_finite(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_year(cell: &str) -> Option<i32> {
    let value = parse_finite(cell)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

/// Upper-cased first three characters of a country name.
#[must_use]
pub fn derive_code(name: &str) -> Key {
    Key::new(name.trim().chars().take(3).collect::<String>().to_uppercase())
}

fn internet_use_from_row(row: InternetUseRow) -> Result<InternetUseRecord, &'static str> {
    let code = row.location.trim();
    if code.is_empty() {
        return Err("blank LOCATION");
    }
    let year = parse_year(&row.time).ok_or("TIME is not a whole number")?;
    let value = parse_finite(&row.value).ok_or("Value is not finite")?;
    Ok(InternetUseRecord {
        code: Key::from(code),
        year,
        value,
    })
}

fn indicators_from_row(row: GapminderRow) -> Result<CountryIndicators, &'static str> {
    let name = row.country.trim();
    let code = derive_code(name);
    if code.is_empty() {
        return Err("blank country");
    }
    let internet_rate =
        parse_finite(&row.internetuserate).ok_or("internetuserate is not finite")?;
    let urban_rate = parse_finite(&row.urbanrate).ok_or("urbanrate is not finite")?;
    Ok(CountryIndicators {
        name: name.to_owned(),
        code,
        internet_rate,
        urban_rate,
        income_per_person: parse_finite(&row.incomeperperson),
    })
}

fn csv_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

fn collect_rows<R, Row, Record>(
    mut reader: csv::Reader<R>,
    source: &str,
    convert: fn(Row) -> Result<Record, &'static str>,
) -> Vec<Record>
where
    R: Read,
    Row: DeserializeOwned,
{
    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (index, row) in reader.deserialize::<Row>().enumerate() {
        let converted = row.map_err(|_| "unreadable row").and_then(convert);
        match converted {
            Ok(record) => records.push(record),
            Err(reason) => {
                dropped += 1;
                trace!(source, row = index + 1, reason, "dropping malformed row");
            }
        }
    }
    debug!(source, kept = records.len(), dropped, "parsed csv rows");
    records
}

/// Parses File A (`LOCATION,TIME,Value`) from any reader.
pub fn parse_internet_use<R: Read>(reader: R) -> Vec<InternetUseRecord> {
    collect_rows(
        csv_builder().from_reader(reader),
        "internet-use",
        internet_use_from_row,
    )
}

/// Parses File B (`country,internetuserate,urbanrate,incomeperperson,..`).
pub fn parse_gapminder<R: Read>(reader: R) -> Vec<CountryIndicators> {
    collect_rows(
        csv_builder().from_reader(reader),
        "gapminder",
        indicators_from_row,
    )
}

fn open(path: &Path) -> ChartResult<csv::Reader<std::fs::File>> {
    csv_builder()
        .from_path(path)
        .map_err(|source| ChartError::LoadFailure {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads File A from disk.
pub fn load_internet_use(path: impl AsRef<Path>) -> ChartResult<Vec<InternetUseRecord>> {
    let reader = open(path.as_ref())?;
    Ok(collect_rows(reader, "internet-use", internet_use_from_row))
}

/// Loads File B from disk.
pub fn load_gapminder(path: impl AsRef<Path>) -> ChartResult<Vec<CountryIndicators>> {
    let reader = open(path.as_ref())?;
    Ok(collect_rows(reader, "gapminder", indicators_from_row))
}
