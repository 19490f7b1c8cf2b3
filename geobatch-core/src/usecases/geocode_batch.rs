use super::{prelude::*, BatchOptions, BatchReport, RecordFailure};
use crate::normalize::AddressNormalizer;

/// An input row before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub key: RowKey,
    pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub records: Vec<GeoRecord>,
    pub report: BatchReport,
}

/// Resolves the locations of all rows.
///
/// The rows are processed strictly in order and the output
/// preserves that order. Rows without a match or with a failed
/// lookup are dropped and accounted for in the report.
pub fn geocode_batch<I, G>(
    rows: I,
    normalizer: &AddressNormalizer,
    resolver: &RateLimitedResolver<G>,
    options: &BatchOptions,
) -> Result<BatchOutput>
where
    I: IntoIterator<Item = RawRecord>,
    G: GeoCodingGateway,
{
    warn_if_not_geographic(options.crs);
    let mut report = BatchReport::default();
    let mut resolved = vec![];
    for RawRecord { key, fields } in rows {
        if options.is_cancelled() {
            report.cancelled = true;
            break;
        }
        report.total += 1;
        let record = match normalizer.normalize(&fields) {
            Ok(address) => AddressRecord::new(key, fields, address),
            Err(err) => {
                let err = Error::from(err);
                if options.fail_fast {
                    return Err(err);
                }
                report.failures.push(RecordFailure {
                    key,
                    query: None,
                    error: err,
                });
                continue;
            }
        };
        match resolve_record(record, resolver, &options.retry) {
            Ok(record) => {
                if record.is_resolved() {
                    report.resolved += 1;
                } else {
                    report.not_found += 1;
                }
                resolved.push(record);
            }
            Err((record, err)) => {
                if options.fail_fast {
                    return Err(err);
                }
                let (key, _, address) = record.into_parts();
                report.failures.push(RecordFailure {
                    key,
                    query: Some(address),
                    error: err,
                });
            }
        }
    }
    let (records, dropped) = attach_geometry(resolved, options.crs);
    debug_assert_eq!(dropped, report.not_found);
    report.log_summary("Geocoding");
    Ok(BatchOutput { records, report })
}

/// Resolves the normalized address of a single record.
///
/// A failed lookup hands the record back together with
/// the error.
pub fn resolve_record<G>(
    record: AddressRecord,
    resolver: &RateLimitedResolver<G>,
    retry: &RetryPolicy,
) -> std::result::Result<ResolvedRecord, (AddressRecord, Error)>
where
    G: GeoCodingGateway,
{
    let address = record.normalized_address();
    let outcome = retry.run(resolver.limiter(), address, || resolver.resolve(address));
    let resolution = match outcome {
        ResolutionOutcome::Found(pos) => Some(pos),
        ResolutionOutcome::NotFound => None,
        ResolutionOutcome::Failed(source) => {
            let err = Error::Provider {
                query: address.to_owned(),
                source,
            };
            return Err((record, err));
        }
    };
    Ok(ResolvedRecord { record, resolution })
}

/// Drops all unresolved records and attaches a point geometry
/// to the remaining ones.
///
/// Returns the geo records in the original order together with
/// the number of dropped records.
pub fn attach_geometry<I>(resolved: I, crs: Crs) -> (Vec<GeoRecord>, usize)
where
    I: IntoIterator<Item = ResolvedRecord>,
{
    let mut dropped = 0;
    let records = resolved
        .into_iter()
        .filter_map(|r| {
            let geo = GeoRecord::try_from_resolved(r, crs);
            if geo.is_none() {
                dropped += 1;
            }
            geo
        })
        .collect();
    (records, dropped)
}

fn warn_if_not_geographic(crs: Crs) {
    if !crs.is_geographic() {
        log::warn!(
            "Tagging geographic coordinates (degrees) with {} without reprojecting them",
            crs
        );
    }
}
