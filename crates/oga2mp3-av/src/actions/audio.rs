//! Transcode an Ogg audio file to MP3 via ffmpeg.

use std::path::Path;
use std::time::Duration;

use crate::command::{ToolCommand, DEFAULT_TIMEOUT};
use crate::Result;

/// MP3 encoder used for every conversion.
pub const MP3_ENCODER: &str = "libmp3lame";

/// Default LAME VBR quality (`-q:a`); 0 is best, 9 is smallest.
pub const DEFAULT_QUALITY: u8 = 2;

/// Encoder settings for [`transcode_to_mp3`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mp3Options {
    /// VBR quality passed as `-q:a`.
    pub quality: u8,
    /// Kill ffmpeg if it runs longer than this.
    pub timeout: Duration,
}

impl Default for Mp3Options {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Build the ffmpeg argument list for one conversion.
///
/// `-y` keeps ffmpeg from prompting if the output path already exists.
pub fn mp3_args(input: &Path, output: &Path, options: &Mp3Options) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-acodec".to_string(),
        MP3_ENCODER.to_string(),
        "-q:a".to_string(),
        options.quality.to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Transcode `input` to an MP3 at `output` using the ffmpeg at `ffmpeg`.
///
/// On failure the returned error carries ffmpeg's stderr, which is the only
/// diagnostic the transcoder offers.
pub async fn transcode_to_mp3(
    ffmpeg: &Path,
    input: &Path,
    output: &Path,
    options: &Mp3Options,
) -> Result<()> {
    tracing::info!(
        "transcode {:?} -> {:?} ({MP3_ENCODER}, q:a {})",
        input,
        output,
        options.quality
    );

    ToolCommand::new(ffmpeg.to_path_buf())
        .args(mp3_args(input, output, options))
        .timeout(options.timeout)
        .execute()
        .await?;

    Ok(())
}
