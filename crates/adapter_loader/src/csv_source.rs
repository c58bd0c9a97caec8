//! CSV reading and schema validation for the market dataset.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info};

use forecast_core::types::{MarketDataset, MarketRecord, Region};

use crate::error::LoadError;

/// Required input columns, in documentation order. Extra columns in the
/// file are ignored; column order is irrelevant.
const REQUIRED_COLUMNS: [&str; 7] = [
    "timestamp",
    "region",
    "price",
    "demand",
    "temperature",
    "solar_irradiance",
    "wind_speed",
];

/// Loads and validates the historical market table.
///
/// The returned dataset is sorted by `(region, timestamp)` with unique
/// keys. Duplicate keys are a hard error: the loader never resolves
/// them by keeping the most recent occurrence, because a duplicated key
/// in an hourly export signals an upstream join fault that must be
/// fixed at the source.
///
/// Timestamps are accepted as RFC 3339 or as `YYYY-MM-DD HH:MM:SS`
/// (interpreted as UTC). Empty cells in the three weather columns parse
/// to `None`; empty cells anywhere else are schema errors.
///
/// # Errors
///
/// See [`LoadError`] for the failure taxonomy. The loader has no side
/// effects beyond the read.
pub fn load_market_csv(path: &Path) -> Result<MarketDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let dataset = parse_dataset(csv::Reader::from_reader(file))?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        regions = dataset.regions().len(),
        "loaded market dataset"
    );
    Ok(dataset)
}

/// Column indices resolved from the header row.
struct ColumnMap {
    timestamp: usize,
    region: usize,
    price: usize,
    demand: usize,
    temperature: usize,
    solar_irradiance: usize,
    wind_speed: usize,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        // One lookup per column, reporting the first missing one in
        // documentation order.
        let mut indices = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LoadError::schema(name, "required column is missing"))?;
        }
        let [timestamp, region, price, demand, temperature, solar_irradiance, wind_speed] =
            indices;
        Ok(Self {
            timestamp,
            region,
            price,
            demand,
            temperature,
            solar_irradiance,
            wind_speed,
        })
    }
}

fn parse_dataset<R: Read>(mut reader: csv::Reader<R>) -> Result<MarketDataset, LoadError> {
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::resolve(&headers)?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        // Header is line 1, first data row is line 2.
        let line = idx + 2;
        records.push(parse_record(&row, &columns, line)?);
    }

    if records.is_empty() {
        return Err(LoadError::EmptyDataset);
    }

    records.sort_by(|a, b| {
        (a.region.as_str(), a.timestamp).cmp(&(b.region.as_str(), b.timestamp))
    });
    for pair in records.windows(2) {
        if pair[0].region == pair[1].region && pair[0].timestamp == pair[1].timestamp {
            return Err(LoadError::DuplicateKey {
                region: pair[0].region.clone(),
                timestamp: pair[0].timestamp,
            });
        }
    }

    debug!(rows = records.len(), "dataset parsed and key-checked");
    Ok(MarketDataset::from_sorted_records(records))
}

fn parse_record(
    row: &csv::StringRecord,
    columns: &ColumnMap,
    line: usize,
) -> Result<MarketRecord, LoadError> {
    let cell = |idx: usize, column: &str| -> Result<&str, LoadError> {
        row.get(idx)
            .ok_or_else(|| LoadError::schema(column, format!("row {line} is truncated")))
    };

    let timestamp = parse_timestamp(cell(columns.timestamp, "timestamp")?, line)?;
    let region = Region::new(cell(columns.region, "region")?)
        .map_err(|e| LoadError::schema("region", format!("row {line}: {e}")))?;
    let price = parse_f64(cell(columns.price, "price")?, "price", line)?;
    let demand = parse_f64(cell(columns.demand, "demand")?, "demand", line)?;
    if demand < 0.0 {
        return Err(LoadError::schema(
            "demand",
            format!("row {line}: demand must be non-negative, got {demand}"),
        ));
    }

    Ok(MarketRecord {
        timestamp,
        region,
        price,
        demand,
        temperature: parse_optional_f64(cell(columns.temperature, "temperature")?, "temperature", line)?,
        solar_irradiance: parse_optional_f64(
            cell(columns.solar_irradiance, "solar_irradiance")?,
            "solar_irradiance",
            line,
        )?,
        wind_speed: parse_optional_f64(cell(columns.wind_speed, "wind_speed")?, "wind_speed", line)?,
    })
}

fn parse_timestamp(raw: &str, line: usize) -> Result<DateTime<Utc>, LoadError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(LoadError::schema(
        "timestamp",
        format!("row {line}: cannot parse {raw:?} as a UTC timestamp"),
    ))
}

fn parse_f64(raw: &str, column: &str, line: usize) -> Result<f64, LoadError> {
    let raw = raw.trim();
    let value: f64 = raw
        .parse()
        .map_err(|_| LoadError::schema(column, format!("row {line}: cannot parse {raw:?} as a number")))?;
    if !value.is_finite() {
        return Err(LoadError::schema(
            column,
            format!("row {line}: value {raw:?} is not finite"),
        ));
    }
    Ok(value)
}

fn parse_optional_f64(raw: &str, column: &str, line: usize) -> Result<Option<f64>, LoadError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    parse_f64(raw, column, line).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "timestamp,region,price,demand,temperature,solar_irradiance,wind_speed";

    fn parse(csv_text: &str) -> Result<MarketDataset, LoadError> {
        parse_dataset(csv::Reader::from_reader(csv_text.as_bytes()))
    }

    #[test]
    fn test_parses_typed_records() {
        let text = format!(
            "{HEADER}\n\
             2024-01-01T00:00:00Z,NORTH,50.5,7000,21.5,0,3.2\n\
             2024-01-01 01:00:00,NORTH,48.0,6900,,,\n"
        );
        let ds = parse(&text).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.region.as_str(), "NORTH");
        assert_eq!(first.price, 50.5);
        assert_eq!(first.temperature, Some(21.5));
        assert_eq!(ds.records()[1].temperature, None);
    }

    #[test]
    fn test_sorts_by_region_then_timestamp() {
        let text = format!(
            "{HEADER}\n\
             2024-01-01T01:00:00Z,SOUTH,40,5000,,,\n\
             2024-01-01T00:00:00Z,SOUTH,41,5100,,,\n\
             2024-01-01T00:00:00Z,NORTH,50,7000,,,\n"
        );
        let ds = parse(&text).unwrap();
        let keys: Vec<_> = ds
            .records()
            .iter()
            .map(|r| (r.region.as_str().to_string(), r.timestamp))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(ds.records()[0].region.as_str(), "NORTH");
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let text = "timestamp,region,price,temperature,solar_irradiance,wind_speed\n\
                    2024-01-01T00:00:00Z,NORTH,50,21,0,3\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, LoadError::Schema { ref column, .. } if column == "demand"));
    }

    #[test]
    fn test_mistyped_cell_is_schema_error() {
        let text = format!("{HEADER}\n2024-01-01T00:00:00Z,NORTH,not-a-price,7000,,,\n");
        let err = parse(&text).unwrap_err();
        match err {
            LoadError::Schema { column, detail } => {
                assert_eq!(column, "price");
                assert!(detail.contains("row 2"), "detail was: {detail}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_timestamp_is_schema_error() {
        let text = format!("{HEADER}\nyesterday,NORTH,50,7000,,,\n");
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, LoadError::Schema { ref column, .. } if column == "timestamp"));
    }

    #[test]
    fn test_negative_demand_rejected() {
        let text = format!("{HEADER}\n2024-01-01T00:00:00Z,NORTH,50,-1,,,\n");
        let err = parse(&text).unwrap_err();
        assert!(matches!(err, LoadError::Schema { ref column, .. } if column == "demand"));
    }

    #[test]
    fn test_negative_price_accepted() {
        // Oversupply events settle below zero; the loader must not
        // reject them.
        let text = format!("{HEADER}\n2024-01-01T00:00:00Z,NORTH,-12.5,7000,,,\n");
        let ds = parse(&text).unwrap();
        assert_eq!(ds.records()[0].price, -12.5);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = parse(&format!("{HEADER}\n")).unwrap_err();
        assert!(matches!(err, LoadError::EmptyDataset));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let text = format!(
            "{HEADER}\n\
             2024-01-01T00:00:00Z,NORTH,50,7000,,,\n\
             2024-01-01T00:00:00Z,NORTH,55,7100,,,\n"
        );
        let err = parse(&text).unwrap_err();
        match err {
            LoadError::DuplicateKey { region, .. } => assert_eq!(region.as_str(), "NORTH"),
            other => panic!("expected duplicate key error, got {other:?}"),
        }
    }

    #[test]
    fn test_same_timestamp_different_regions_is_fine() {
        let text = format!(
            "{HEADER}\n\
             2024-01-01T00:00:00Z,NORTH,50,7000,,,\n\
             2024-01-01T00:00:00Z,SOUTH,40,5000,,,\n"
        );
        assert!(parse(&text).is_ok());
    }

    #[test]
    fn test_extra_columns_ignored() {
        let text = "spike_flag,timestamp,region,price,demand,temperature,solar_irradiance,wind_speed\n\
                    1,2024-01-01T00:00:00Z,NORTH,50,7000,,,\n";
        let ds = parse(text).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "2024-01-01T00:00:00Z,NORTH,50,7000,21,0,3").unwrap();
        file.flush().unwrap();

        let ds = load_market_csv(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_market_csv(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
