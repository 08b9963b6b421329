//! OGA to MP3 conversion: artifact lifecycle and response streaming.

mod service;
mod stream;

pub use service::{ConversionService, ConvertedAudio};
pub use stream::ArtifactStream;
