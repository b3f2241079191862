//! Shared Strategy Framework
//!
//! Lifecycle trait, collaborator seams (market data in, signals out) and metrics
//! shared by StrengthScan strategy services.

pub mod metrics;
pub mod testing;
pub mod traits;

pub use metrics::*;
pub use testing::*;
pub use traits::*;
