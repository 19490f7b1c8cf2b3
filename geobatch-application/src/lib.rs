mod geocode_csv;
mod reverse_geocode_csv;

pub mod error;
pub mod export;
pub mod import;

pub mod prelude {
    pub use super::{geocode_csv::*, reverse_geocode_csv::*};
}

pub type Result<T> = std::result::Result<T, error::AppError>;

pub(crate) use geobatch_core::{
    entities::*,
    gateways::geocode::*,
    normalize::AddressNormalizer,
    resolver::RateLimitedResolver,
    usecases::{self, BatchOptions, BatchReport},
};
