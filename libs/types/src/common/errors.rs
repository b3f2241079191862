//! Error types for the relative strength engine
//!
//! `EngineError` is the taxonomy every pipeline stage reports through. Callers
//! decide severity from the variant and the affected asset: an insufficient or
//! corrupt non-benchmark asset is skipped for the cycle, while the same failure on
//! the benchmark aborts the whole cycle.

use thiserror::Error;

use super::identifiers::AssetId;

/// Errors that can occur while parsing identifiers and vocabulary values
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Asset symbol was empty after trimming
    #[error("Asset symbol cannot be empty")]
    EmptySymbol,

    /// Asset symbol contained characters outside `[A-Z0-9]`
    #[error("Asset symbol '{symbol}' must be alphanumeric")]
    InvalidSymbol { symbol: String },

    /// Timeframe label is not one of the supported horizons
    #[error("Unknown timeframe '{label}' (expected one of 5m, 15m, 1h, 4h, 1d, 1w)")]
    UnknownTimeframe { label: String },
}

/// Errors produced by the engine pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A series, or every timeframe of an asset, lacks enough bars
    #[error("Insufficient data for {asset}: {detail}")]
    InsufficientData { asset: AssetId, detail: String },

    /// Invalid configuration; only raised at startup
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Non-finite value or corrupt bar for one asset
    #[error("Computation error for {asset}: {message}")]
    Computation { asset: AssetId, message: String },

    /// The whole cycle produced no output
    #[error("Cycle aborted: {reason}")]
    CycleAborted { reason: String },
}

impl EngineError {
    /// Build an `InsufficientData` error with a bar-count detail
    pub fn insufficient(
        asset: &AssetId,
        scope: impl std::fmt::Display,
        required: usize,
        available: usize,
    ) -> Self {
        Self::InsufficientData {
            asset: asset.clone(),
            detail: format!("{scope}: required {required} bars, available {available}"),
        }
    }

    pub fn computation(asset: &AssetId, message: impl Into<String>) -> Self {
        Self::Computation {
            asset: asset.clone(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Asset the error is attributed to, if any
    pub fn asset(&self) -> Option<&AssetId> {
        match self {
            Self::InsufficientData { asset, .. } | Self::Computation { asset, .. } => Some(asset),
            Self::Configuration { .. } | Self::CycleAborted { .. } => None,
        }
    }

    /// Short machine-readable label, used in logs and snapshot exclusion lists
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::Configuration { .. } => "configuration",
            Self::Computation { .. } => "computation",
            Self::CycleAborted { .. } => "cycle_aborted",
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_message() {
        let eth = AssetId::new("ETH").unwrap();
        let err = EngineError::insufficient(&eth, "1h series", 24, 3);
        assert_eq!(
            err.to_string(),
            "Insufficient data for ETH: 1h series: required 24 bars, available 3"
        );
        assert_eq!(err.asset(), Some(&eth));
        assert_eq!(err.kind(), "insufficient_data");
    }

    #[test]
    fn test_validation_maps_to_configuration() {
        let err: EngineError = ValidationError::UnknownTimeframe {
            label: "2h".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Configuration { .. }));
        assert!(err.asset().is_none());
    }
}
