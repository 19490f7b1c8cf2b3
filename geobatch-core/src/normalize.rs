use itertools::Itertools;

use crate::entities::*;

pub const DEFAULT_SEPARATOR: &str = ", ";

/// A column that contributes to the address string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: String,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            required: true,
        }
    }

    pub fn optional(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            required: false,
        }
    }
}

/// Joins the configured fields of a row into a single
/// free-text address that can be sent to a provider.
#[derive(Debug, Clone)]
pub struct AddressNormalizer {
    fields: Vec<FieldSpec>,
    separator: String,
    suffix: Option<String>,
}

impl AddressNormalizer {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            separator: DEFAULT_SEPARATOR.to_owned(),
            suffix: None,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// A trailing component (e.g. the country) that is appended
    /// unless the row already contains it.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        let suffix = suffix.trim();
        self.suffix = (!suffix.is_empty()).then(|| suffix.to_owned());
        self
    }

    pub fn normalize(&self, fields: &Fields) -> Result<String, MissingFieldError> {
        let mut parts = Vec::with_capacity(self.fields.len() + 1);
        for spec in &self.fields {
            let value = fields
                .get(&spec.column)
                .map(str::trim)
                .filter(|v| !v.is_empty());
            match value {
                Some(value) => parts.push(value),
                None if spec.required => {
                    return Err(MissingFieldError {
                        column: spec.column.clone(),
                    });
                }
                None => {}
            }
        }
        if parts.is_empty() {
            // Nothing to resolve at all
            return Err(MissingFieldError {
                column: self.fields.iter().map(|f| f.column.as_str()).join("|"),
            });
        }
        if let Some(suffix) = self.suffix.as_deref() {
            let suffix_lc = suffix.to_lowercase();
            let omitted = !parts
                .iter()
                .flat_map(|part| self.components(part))
                .any(|component| component.to_lowercase() == suffix_lc);
            if omitted {
                parts.push(suffix);
            }
        }
        Ok(parts.join(self.separator.as_str()))
    }

    /// Splits a single column value into its address components,
    /// e.g. `"1 Main St, Springfield, USA"`.
    fn components<'a>(&'a self, value: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let separator = self.separator.trim();
        value
            .split(move |c: char| c == ',' || separator.contains(c))
            .map(str::trim)
    }

    pub fn record(&self, key: RowKey, fields: Fields) -> Result<AddressRecord, MissingFieldError> {
        let normalized_address = self.normalize(&fields)?;
        Ok(AddressRecord::new(key, fields, normalized_address))
    }
}
