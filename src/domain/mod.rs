//! Domain name normalization and validation

pub mod normalize;

pub use normalize::{normalize, normalize_all, tld_of};
