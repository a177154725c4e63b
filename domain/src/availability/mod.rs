//! Model availability
//!
//! The availability gate is consulted before every run. Each rejection
//! reason has its own stable, user-visible message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the model service cannot be used right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The host cannot run the model
    DeviceNotEligible,
    /// The model feature is switched off
    FeatureDisabled,
    /// The model is still downloading or otherwise not ready
    ModelNotReady,
    /// Unavailable for a reason the service did not report
    Unknown,
}

impl UnavailableReason {
    pub fn all() -> [UnavailableReason; 4] {
        [
            UnavailableReason::DeviceNotEligible,
            UnavailableReason::FeatureDisabled,
            UnavailableReason::ModelNotReady,
            UnavailableReason::Unknown,
        ]
    }

    /// User-visible message for this reason
    pub fn message(&self) -> &'static str {
        match self {
            UnavailableReason::DeviceNotEligible => {
                "This device is not eligible for the on-device model."
            }
            UnavailableReason::FeatureDisabled => {
                "The on-device model is turned off. Enable it in the settings and try again."
            }
            UnavailableReason::ModelNotReady => {
                "The model is still downloading or not ready yet. Please try again later."
            }
            UnavailableReason::Unknown => {
                "The on-device model is unavailable for an unknown reason."
            }
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Result of an availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Unavailable(UnavailableReason),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    /// `Ok(())` when available, otherwise the rejection reason
    pub fn into_result(self) -> Result<(), UnavailableReason> {
        match self {
            Availability::Available => Ok(()),
            Availability::Unavailable(reason) => Err(reason),
        }
    }
}
