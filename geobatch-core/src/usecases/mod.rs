mod error;
mod geocode_batch;
mod report;
mod reverse_geocode_batch;

pub use self::{error::Error, geocode_batch::*, report::*, reverse_geocode_batch::*};

mod prelude {
    pub use super::error::Error;
    pub type Result<T> = std::result::Result<T, Error>;
    pub use crate::{
        entities::*,
        gateways::geocode::*,
        resolver::{RateLimitedResolver, ResolutionOutcome},
        retry::RetryPolicy,
    };
}

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use self::prelude::*;

/// Options shared by all batch use cases.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// The coordinate reference system that output
    /// geometries are tagged with.
    pub crs: Crs,
    /// Abort on the first record that could not be processed
    /// instead of reporting it and continuing.
    pub fail_fast: bool,
    pub retry: RetryPolicy,
    /// Checked between records: once set the batch stops and
    /// returns what has been processed so far.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl BatchOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
