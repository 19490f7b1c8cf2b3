use std::{fmt, io, str::FromStr};

use super::{export, import, Result, *};

/// The file format of geocoded records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    GeoJson,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "geojson" | "json" => Ok(Self::GeoJson),
            _ => Err(format!("Unsupported output format '{s}'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::GeoJson => "geojson",
        })
    }
}

/// Geocodes all address rows of a CSV file.
///
/// Only resolved rows are written to `output`, everything
/// else is summarized in the returned report.
pub fn geocode_csv<R, W, G>(
    input: R,
    output: W,
    normalizer: &AddressNormalizer,
    resolver: &RateLimitedResolver<G>,
    key_column: Option<&str>,
    format: OutputFormat,
    options: &BatchOptions,
) -> Result<BatchReport>
where
    R: io::Read,
    W: io::Write,
    G: GeoCodingGateway,
{
    let table = import::read_table(input, key_column)?;
    let headers = table.headers.clone();
    log::info!("Geocoding {} rows", table.rows.len());
    let usecases::BatchOutput { records, report } = usecases::geocode_batch(
        import::address_records(table),
        normalizer,
        resolver,
        options,
    )?;
    match format {
        OutputFormat::Csv => export::write_geo_records_csv(output, &headers, &records)?,
        OutputFormat::GeoJson => export::write_geo_records_geojson(output, &records, options.crs)?,
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use geobatch_core::normalize::FieldSpec;

    use super::*;
    use crate::{error::AppError, tests::*};

    const INPUT: &str = "\
id,street,city
1,Main St 1,Springfield
2,Nowhere 0,Springfield
3,,Springfield
4,Elm St 2,Shelbyville
";

    fn normalizer() -> AddressNormalizer {
        AddressNormalizer::new(vec![
            FieldSpec::required("street"),
            FieldSpec::required("city"),
        ])
    }

    fn gateway() -> StaticGateway {
        StaticGateway::default()
            .with_place("Main St 1, Springfield", 40.0, -75.0)
            .with_place("Elm St 2, Shelbyville", 41.5, -74.25)
    }

    #[test]
    fn geocode_csv_rows() {
        let mut out = vec![];
        let report = geocode_csv(
            INPUT.as_bytes(),
            &mut out,
            &normalizer(),
            &resolver(gateway()),
            Some("id"),
            OutputFormat::Csv,
            &BatchOptions::default(),
        )
        .unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.resolved, 2);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].key.as_str(), "3");
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out.lines().collect::<Vec<_>>(),
            vec![
                "id,street,city,latitude,longitude,altitude,geometry,crs",
                "1,Main St 1,Springfield,40,-75,,POINT(-75 40),EPSG:4326",
                "4,Elm St 2,Shelbyville,41.5,-74.25,,POINT(-74.25 41.5),EPSG:4326",
            ]
        );
    }

    #[test]
    fn geocode_csv_rows_as_geojson() {
        let mut out = vec![];
        let options = BatchOptions {
            crs: Crs::epsg(4258),
            ..Default::default()
        };
        geocode_csv(
            INPUT.as_bytes(),
            &mut out,
            &normalizer(),
            &resolver(gateway()),
            None,
            OutputFormat::GeoJson,
            &options,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::4258"
        );
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[1]["id"], "4");
        assert_eq!(
            features[1]["geometry"]["coordinates"],
            serde_json::json!([-74.25, 41.5])
        );
    }

    #[test]
    fn abort_on_first_failure() {
        let options = BatchOptions {
            fail_fast: true,
            ..Default::default()
        };
        let err = geocode_csv(
            INPUT.as_bytes(),
            Vec::<u8>::new(),
            &normalizer(),
            &resolver(gateway().unreachable()),
            None,
            OutputFormat::Csv,
            &options,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Business(usecases::Error::Provider { .. })
        ));
    }

    /// Raises the cancel flag while answering the first request.
    struct Interrupting {
        gateway: StaticGateway,
        cancel: Arc<AtomicBool>,
    }

    impl GeoCodingGateway for Interrupting {
        fn forward(
            &self,
            address: &str,
        ) -> std::result::Result<Option<ForwardMatch>, ProviderError> {
            self.cancel.store(true, Ordering::Relaxed);
            self.gateway.forward(address)
        }
    }

    #[test]
    fn write_processed_rows_when_cancelled() {
        let cancel = Arc::new(AtomicBool::new(false));
        let gateway = Interrupting {
            gateway: gateway(),
            cancel: Arc::clone(&cancel),
        };
        let options = BatchOptions {
            cancel: Some(cancel),
            ..Default::default()
        };
        let mut out = vec![];
        let report = geocode_csv(
            INPUT.as_bytes(),
            &mut out,
            &normalizer(),
            &resolver_with(gateway),
            Some("id"),
            OutputFormat::Csv,
            &options,
        )
        .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.total, 1);
        assert_eq!(report.resolved, 1);
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out.lines().collect::<Vec<_>>(),
            vec![
                "id,street,city,latitude,longitude,altitude,geometry,crs",
                "1,Main St 1,Springfield,40,-75,,POINT(-75 40),EPSG:4326",
            ]
        );
    }

    #[test]
    fn parse_output_format() {
        assert_eq!("GeoJSON".parse::<OutputFormat>(), Ok(OutputFormat::GeoJson));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
