use std::io;

use super::{export, import, Result, *};

/// Column names of the position in a CSV input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionColumns {
    pub latitude: String,
    pub longitude: String,
}

impl Default for PositionColumns {
    fn default() -> Self {
        Self {
            latitude: export::LATITUDE_COLUMN.to_owned(),
            longitude: export::LONGITUDE_COLUMN.to_owned(),
        }
    }
}

/// Looks up the address of all positions in a CSV file and
/// writes them with an additional address column.
pub fn reverse_geocode_csv<R, W, G>(
    input: R,
    output: W,
    resolver: &RateLimitedResolver<G>,
    columns: &PositionColumns,
    key_column: Option<&str>,
    options: &BatchOptions,
) -> Result<BatchReport>
where
    R: io::Read,
    W: io::Write,
    G: ReverseGeoCodingGateway,
{
    let table = import::read_table(input, key_column)?;
    let headers = table.headers.clone();
    let positions = import::positions(table, &columns.latitude, &columns.longitude)?;
    log::info!("Reverse geocoding {} positions", positions.len());
    let usecases::ReverseBatchOutput { records, report } =
        usecases::reverse_geocode_batch(positions, resolver, options)?;
    export::write_reverse_records_csv(output, &headers, &records)?;
    Ok(report)
}
