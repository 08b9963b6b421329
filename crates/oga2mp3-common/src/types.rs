//! Core types shared between the conversion service and the HTTP layer.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single conversion request.
///
/// A request advances strictly in declaration order. A failure in any state
/// ends the request, but cleanup still runs for whatever artifacts exist, so
/// every request eventually reaches [`ConversionStage::Cleaned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStage {
    /// Nothing has been looked at yet.
    Idle,
    /// Method and body passed validation.
    Validated,
    /// The request body has been written to the input artifact.
    InputStaged,
    /// The transcoder process is running.
    Transcoding,
    /// The output artifact exists and has been opened.
    OutputReady,
    /// The output artifact is being sent to the client.
    Streaming,
    /// Both artifacts have been removed.
    Cleaned,
}

impl ConversionStage {
    /// Stable lowercase name, as used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validated => "validated",
            Self::InputStaged => "input_staged",
            Self::Transcoding => "transcoding",
            Self::OutputReady => "output_ready",
            Self::Streaming => "streaming",
            Self::Cleaned => "cleaned",
        }
    }
}

impl std::fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
