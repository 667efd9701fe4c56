//! Entry point invoked once per request error

use crate::converter::{convert_mapped, convert_unmapped, ErrorContext};
use crate::entry::empty_data;
use crate::error::ConverterResult;
use crate::normalized::NormalizedError;
use crate::options::{parse_config, RawOptions, RuntimeConfig, ShapelessPolicy};
use crate::original::{ErrorEnvelope, OriginalError};
use crate::resolver::resolve_with_key;

/// What the converter does with an incoming error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    PassThrough,
    Process,
}

/// Outcome of formatting one error
#[derive(Debug, Clone, PartialEq)]
pub enum Formatted {
    /// The envelope exactly as it was received
    PassThrough(ErrorEnvelope),
    Converted(NormalizedError),
}

impl Formatted {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Formatted::PassThrough(_))
    }

    pub fn converted(&self) -> Option<&NormalizedError> {
        match self {
            Formatted::Converted(normalized) => Some(normalized),
            Formatted::PassThrough(_) => None,
        }
    }
}

/// Converts resolver errors into normalized client errors
///
/// Built once per server. Holds only immutable configuration, so one
/// instance can be shared across concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct ErrorConverter {
    config: RuntimeConfig,
}

impl ErrorConverter {
    /// Parse options and build a converter; invalid mapping entries abort construction
    pub fn new(options: &RawOptions, debug: bool) -> ConverterResult<Self> {
        let config = parse_config(options)?.with_debug(debug);
        Ok(Self { config })
    }

    pub fn from_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Fallback error with empty data, built without calling any hook
    pub fn fallback_error(&self) -> NormalizedError {
        let fallback = &self.config.fallback;
        NormalizedError::new(fallback.message(), fallback.effective_code(), empty_data())
    }

    /// Decide whether an error is passed through or processed
    pub fn classify(&self, error: &OriginalError) -> DispatchState {
        if self.config.debug || error.is_normalized() {
            return DispatchState::PassThrough;
        }

        if error.is_shapeless() && self.config.shapeless_policy == ShapelessPolicy::PassThrough {
            return DispatchState::PassThrough;
        }

        DispatchState::Process
    }

    /// Format one request error
    pub fn format_error(&self, envelope: ErrorEnvelope) -> ConverterResult<Formatted> {
        if self.classify(&envelope.original) == DispatchState::PassThrough {
            tracing::debug!(debug = self.config.debug, "passing error through unchanged");
            return Ok(Formatted::PassThrough(envelope));
        }

        let ErrorEnvelope {
            original,
            path,
            locations,
        } = envelope;
        let context = ErrorContext { path, locations };

        let normalized = match resolve_with_key(&original, &self.config.mapping_table) {
            Some((matched_by, entry)) => {
                tracing::debug!(?matched_by, code = entry.effective_code(), "converting mapped error");
                convert_mapped(&self.config, &original, entry, context)?
            }
            None => {
                tracing::debug!("converting unmapped error with fallback");
                convert_unmapped(&self.config, &original, &self.config.fallback, context)?
            }
        };

        Ok(Formatted::Converted(normalized))
    }
}
