use super::{prelude::*, BatchOptions, BatchReport, RecordFailure};

/// An input row that carries a position.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPosition {
    pub key: RowKey,
    pub fields: Fields,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseBatchOutput {
    pub records: Vec<ReverseRecord>,
    pub report: BatchReport,
}

/// Resolves the addresses of all positions.
///
/// Positions without a match are kept with an empty address,
/// positions that are invalid or whose lookup failed are
/// dropped and reported.
pub fn reverse_geocode_batch<I, G>(
    positions: I,
    resolver: &RateLimitedResolver<G>,
    options: &BatchOptions,
) -> Result<ReverseBatchOutput>
where
    I: IntoIterator<Item = RawPosition>,
    G: ReverseGeoCodingGateway,
{
    let mut report = BatchReport::default();
    let mut records = vec![];
    for RawPosition {
        key,
        fields,
        latitude,
        longitude,
    } in positions
    {
        if options.is_cancelled() {
            report.cancelled = true;
            break;
        }
        report.total += 1;
        let query = format!("{latitude},{longitude}");
        let result = GeoPoint::try_new(latitude, longitude, None)
            .map_err(|source| Error::InvalidPosition {
                latitude,
                longitude,
                source,
            })
            .and_then(|pos| {
                let outcome = options
                    .retry
                    .run(resolver.limiter(), &query, || resolver.reverse_resolve(&pos));
                outcome.into_result().map_err(|source| Error::Provider {
                    query: query.clone(),
                    source,
                })
            });
        match result {
            Ok(address) => {
                if address.is_some() {
                    report.resolved += 1;
                } else {
                    report.not_found += 1;
                }
                records.push(ReverseRecord {
                    key,
                    fields,
                    latitude,
                    longitude,
                    address,
                });
            }
            Err(err) => {
                if options.fail_fast {
                    return Err(err);
                }
                report.failures.push(RecordFailure {
                    key,
                    query: Some(query),
                    error: err,
                });
            }
        }
    }
    report.log_summary("Reverse geocoding");
    Ok(ReverseBatchOutput { records, report })
}
