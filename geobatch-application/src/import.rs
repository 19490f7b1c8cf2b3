use std::io;

use super::{error::AppError, Result, *};

/// The header and the rows of a CSV input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<(RowKey, Fields)>,
}

/// Reads all rows of a CSV file with a header line.
///
/// Rows are identified by the value of `key_column` or,
/// if not specified, by their 1-based row number.
pub fn read_table<R: io::Read>(reader: R, key_column: Option<&str>) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let key_idx = key_column
        .map(|column| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| AppError::MissingColumn(column.to_owned()))
        })
        .transpose()?;
    let mut rows = vec![];
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row_number = i + 1;
        let key = key_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(RowKey::from)
            .unwrap_or_else(|| RowKey::from_row_number(row_number));
        let fields = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .collect::<Fields>();
        rows.push((key, fields));
    }
    log::debug!("Read {} rows with columns {:?}", rows.len(), headers);
    Ok(Table { headers, rows })
}

pub fn address_records(table: Table) -> Vec<usecases::RawRecord> {
    table
        .rows
        .into_iter()
        .map(|(key, fields)| usecases::RawRecord { key, fields })
        .collect()
}

/// Extracts the positions of all rows.
///
/// Unparsable numbers are rejected, numbers that are out of
/// range are left to the reverse geocoding use case.
pub fn positions(
    table: Table,
    lat_column: &str,
    lng_column: &str,
) -> Result<Vec<usecases::RawPosition>> {
    for column in [lat_column, lng_column] {
        if !table.headers.iter().any(|h| h == column) {
            return Err(AppError::MissingColumn(column.to_owned()));
        }
    }
    table
        .rows
        .into_iter()
        .map(|(key, fields)| {
            let latitude = parse_coordinate(&key, &fields, lat_column)?;
            let longitude = parse_coordinate(&key, &fields, lng_column)?;
            Ok(usecases::RawPosition {
                key,
                fields,
                latitude,
                longitude,
            })
        })
        .collect()
}

fn parse_coordinate(key: &RowKey, fields: &Fields, column: &str) -> Result<f64> {
    let value = fields.get(column).unwrap_or_default().trim();
    value
        .parse::<f64>()
        .map_err(|_| AppError::InvalidCoordinate {
            key: key.to_string(),
            column: column.to_owned(),
            value: value.to_owned(),
        })
}
