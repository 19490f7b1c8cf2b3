use std::io;

use serde_json::{json, Map, Value};

use super::{Result, *};

pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";
pub const ALTITUDE_COLUMN: &str = "altitude";
pub const GEOMETRY_COLUMN: &str = "geometry";
pub const CRS_COLUMN: &str = "crs";
pub const ADDRESS_COLUMN: &str = "address";
pub const NORMALIZED_ADDRESS_PROPERTY: &str = "normalized_address";

const GEO_COLUMNS: [&str; 5] = [
    LATITUDE_COLUMN,
    LONGITUDE_COLUMN,
    ALTITUDE_COLUMN,
    GEOMETRY_COLUMN,
    CRS_COLUMN,
];

/// Input columns that are carried over into the output.
///
/// Columns that collide with a derived column are replaced.
fn carried_columns<'a>(headers: &'a [String], derived: &[&str]) -> Vec<&'a str> {
    headers
        .iter()
        .map(String::as_str)
        .filter(|column| {
            let collides = derived.contains(column);
            if collides {
                log::warn!("Input column '{column}' is replaced by the derived column of the same name");
            }
            !collides
        })
        .collect()
}

fn carried_values(fields: &Fields, columns: &[&str]) -> Vec<String> {
    columns
        .iter()
        .map(|column| fields.get(column).unwrap_or_default().to_owned())
        .collect()
}

/// Writes the geocoded records as CSV: the input columns
/// followed by the coordinates and a WKT geometry.
pub fn write_geo_records_csv<W: io::Write>(
    writer: W,
    headers: &[String],
    records: &[GeoRecord],
) -> Result<()> {
    let columns = carried_columns(headers, &GEO_COLUMNS);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns.iter().copied().chain(GEO_COLUMNS))?;
    for r in records {
        let mut row = carried_values(&r.fields, &columns);
        row.push(r.latitude.to_string());
        row.push(r.longitude.to_string());
        row.push(r.altitude.map(|a| a.to_string()).unwrap_or_default());
        row.push(r.geometry.to_wkt());
        row.push(r.geometry.crs.to_string());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the reverse geocoded records as CSV with
/// an additional address column.
pub fn write_reverse_records_csv<W: io::Write>(
    writer: W,
    headers: &[String],
    records: &[ReverseRecord],
) -> Result<()> {
    let columns = carried_columns(headers, &[ADDRESS_COLUMN]);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(columns.iter().copied().chain([ADDRESS_COLUMN]))?;
    for r in records {
        let mut row = carried_values(&r.fields, &columns);
        row.push(r.address.clone().unwrap_or_default());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn feature(record: &GeoRecord) -> Value {
    let geometry = &record.geometry;
    let mut coordinates = vec![geometry.x, geometry.y];
    coordinates.extend(geometry.z);
    let mut properties: Map<String, Value> = record
        .fields
        .iter()
        .map(|(column, value)| (column.to_owned(), Value::from(value)))
        .collect();
    properties.insert(
        NORMALIZED_ADDRESS_PROPERTY.to_owned(),
        Value::from(record.normalized_address.as_str()),
    );
    json!({
        "type": "Feature",
        "id": record.key.as_str(),
        "geometry": {
            "type": "Point",
            "coordinates": coordinates,
        },
        "properties": properties,
    })
}

/// A GeoJSON feature collection with a named CRS member.
pub fn geo_records_to_geojson(records: &[GeoRecord], crs: Crs) -> Value {
    let features: Vec<_> = records.iter().map(feature).collect();
    json!({
        "type": "FeatureCollection",
        "crs": {
            "type": "name",
            "properties": { "name": crs.to_urn() },
        },
        "features": features,
    })
}

pub fn write_geo_records_geojson<W: io::Write>(
    mut writer: W,
    records: &[GeoRecord],
    crs: Crs,
) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &geo_records_to_geojson(records, crs))?;
    writer.flush()?;
    Ok(())
}
