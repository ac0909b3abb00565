use crate::config::DecoderConfig;
use crate::errors::DecodeError;

pub const TABULAR_CAPABILITY: &str = "tabular output";
pub const TABULAR_GUIDANCE: &str = "It is provided by the `tabular` feature of malloy-core. \
     Enable it with: cargo build --features tabular";

/// Optional decoding capabilities, detected once and handed to the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub tabular: bool,
    pub timestamps: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self { tabular: cfg!(feature = "tabular"), timestamps: true }
    }

    pub fn none() -> Self {
        Self { tabular: false, timestamps: false }
    }

    /// Detected capabilities, narrowed by operator configuration.
    pub fn from_config(config: &DecoderConfig) -> Self {
        let detected = Self::detect();
        Self {
            tabular: detected.tabular && config.tabular,
            timestamps: detected.timestamps && config.parse_timestamps,
        }
    }

    pub fn require_tabular(&self) -> Result<(), DecodeError> {
        if self.tabular {
            return Ok(());
        }

        Err(DecodeError::MissingCapability {
            capability: TABULAR_CAPABILITY,
            guidance: TABULAR_GUIDANCE,
        })
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}
