use thiserror::Error;

use crate::record::{Fields, RowKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required address field '{column}'")]
pub struct MissingFieldError {
    pub column: String,
}

/// An input row together with the address string that
/// has been derived from its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    key: RowKey,
    fields: Fields,
    normalized_address: String,
}

impl AddressRecord {
    pub const fn new(key: RowKey, fields: Fields, normalized_address: String) -> Self {
        Self {
            key,
            fields,
            normalized_address,
        }
    }

    pub const fn key(&self) -> &RowKey {
        &self.key
    }

    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn normalized_address(&self) -> &str {
        &self.normalized_address
    }

    pub fn into_parts(self) -> (RowKey, Fields, String) {
        let Self {
            key,
            fields,
            normalized_address,
        } = self;
        (key, fields, normalized_address)
    }
}
