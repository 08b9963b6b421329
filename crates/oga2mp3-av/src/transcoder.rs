//! The [`Transcoder`] trait and its ffmpeg implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::actions::{transcode_to_mp3, Mp3Options};
use crate::tools::{get_tool_path, FFMPEG};
use crate::Result;

/// An external converter that turns an input artifact into an MP3 output.
///
/// The server only sees this interface: input path in, output path out,
/// success or a diagnostic error. Implementations must be safe to share
/// across request tasks (`Send + Sync`).
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Human-readable name identifying this transcoder implementation.
    fn name(&self) -> &'static str;

    /// Convert the file at `input`, writing the result to `output`.
    async fn transcode(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Transcoder backed by the ffmpeg command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    options: Mp3Options,
}

impl FfmpegTranscoder {
    /// Use the ffmpeg at `program` with the given encoder settings.
    pub fn new(program: PathBuf, options: Mp3Options) -> Self {
        Self { program, options }
    }

    /// Locate ffmpeg (configured path first, then `PATH`).
    pub fn discover(config_path: Option<&Path>, options: Mp3Options) -> Result<Self> {
        let program = get_tool_path(FFMPEG, config_path)?;
        Ok(Self::new(program, options))
    }

    /// Path of the ffmpeg executable this transcoder runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Encoder settings.
    pub fn options(&self) -> &Mp3Options {
        &self.options
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &'static str {
        FFMPEG
    }

    async fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        transcode_to_mp3(&self.program, input, output, &self.options).await
    }
}
