pub mod gateways;
pub mod normalize;
pub mod rate_limit;
pub mod resolver;
pub mod retry;
pub mod usecases;

pub mod entities {
    pub use geobatch_entities::{address::*, crs::*, geo::*, record::*};
}

#[cfg(test)]
pub(crate) mod tests;
