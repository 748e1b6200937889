pub mod analysis;
pub mod binning;
pub mod bootstrap;
pub mod error;
pub mod errorbars;
pub mod summary;
pub mod ttest;
pub mod types;

pub use error::FairbandError;
pub use types::*;

/// Standard result type for all fairband operations
pub type FairbandResult<T> = Result<T, FairbandError>;
