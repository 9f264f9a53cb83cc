use crate::Price;

use thiserror::Error;

/// Errors reported by the histogram builder and the value area resolver.
///
/// Every failure is a deterministic function of the input shape. No partial
/// result accompanies an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// A parameter or input value is outside its valid domain.
    #[error("invalid parameter: {name} - {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Every period shares the same low/high, so the histogram has zero width.
    #[error("degenerate price range: every period trades at {price}")]
    DegenerateRange { price: Price },

    /// Total volume across all bins is zero.
    #[error("empty volume profile: total volume is zero")]
    EmptyVolumeProfile,
}

impl ProfileError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
