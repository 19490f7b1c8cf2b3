use std::fmt;

use crate::{address::AddressRecord, crs::Crs, geo::*};

/// Stable identity of an input row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(String);

impl RowKey {
    /// Key derived from the 1-based position of a data row.
    pub fn from_row_number(row: usize) -> Self {
        Self(row.to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for RowKey {
    fn from(from: String) -> Self {
        Self(from)
    }
}

impl From<&str> for RowKey {
    fn from(from: &str) -> Self {
        from.to_owned().into()
    }
}

impl AsRef<str> for RowKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The named values of a single input row in their original column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(column, value);
        self
    }

    /// Sets the value of a column, replacing a previous value
    /// of the same column in place.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C, V> FromIterator<(C, V)> for Fields
where
    C: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (column, value) in iter {
            fields.push(column, value);
        }
        fields
    }
}

/// An address record together with the outcome of its
/// resolution. Unresolved records never reach any
/// geometry-bearing output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub record: AddressRecord,
    pub resolution: Option<GeoPoint>,
}

impl ResolvedRecord {
    pub const fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }
}

/// A resolved record flattened into top-level coordinate
/// fields plus a point geometry.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub key                : RowKey,
    pub fields             : Fields,
    pub normalized_address : String,
    pub latitude           : f64,
    pub longitude          : f64,
    pub altitude           : Option<f64>,
    pub geometry           : PointGeometry,
}

impl GeoRecord {
    /// Returns `None` if the record could not be resolved.
    pub fn try_from_resolved(resolved: ResolvedRecord, crs: Crs) -> Option<Self> {
        let ResolvedRecord { record, resolution } = resolved;
        let pos = resolution?;
        let (key, fields, normalized_address) = record.into_parts();
        Some(Self {
            key,
            fields,
            normalized_address,
            latitude: pos.latitude(),
            longitude: pos.longitude(),
            altitude: pos.altitude(),
            geometry: PointGeometry::from_point(&pos, crs),
        })
    }
}

/// The outcome of resolving a position back into an address.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseRecord {
    pub key       : RowKey,
    pub fields    : Fields,
    pub latitude  : f64,
    pub longitude : f64,
    pub address   : Option<String>,
}
