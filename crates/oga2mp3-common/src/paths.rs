//! Path utilities for artifact naming and audio file detection.
//!
//! Every request owns exactly two artifacts in the scratch directory: an
//! `input_<id>.oga` holding the uploaded body and an `output_<id>.mp3` written
//! by the transcoder. The helpers here are the single source of those names.

use std::path::Path;

use crate::ConversionId;

/// Extension of the staged input artifact.
pub const INPUT_EXTENSION: &str = "oga";

/// Extension of the transcoder output artifact.
pub const OUTPUT_EXTENSION: &str = "mp3";

/// MIME type of the converted audio.
pub const OUTPUT_MIME_TYPE: &str = "audio/mpeg";

/// Extensions of the Ogg audio family accepted by the `convert` command
/// without a warning.
const OGG_AUDIO_EXTENSIONS: &[&str] = &["oga", "ogg", "opus", "spx"];

/// File name of the input artifact for a request.
///
/// # Examples
///
/// ```
/// use oga2mp3_common::{ConversionId, paths::input_file_name};
///
/// let name = input_file_name(ConversionId::new());
/// assert!(name.starts_with("input_"));
/// assert!(name.ends_with(".oga"));
/// ```
pub fn input_file_name(id: ConversionId) -> String {
    format!("input_{}.{INPUT_EXTENSION}", id.simple())
}

/// File name of the output artifact for a request.
pub fn output_file_name(id: ConversionId) -> String {
    format!("output_{}.{OUTPUT_EXTENSION}", id.simple())
}

/// Download file name suggested to the client, derived from a unix timestamp.
///
/// # Examples
///
/// ```
/// use oga2mp3_common::paths::download_file_name;
///
/// assert_eq!(download_file_name(1700000000), "converted_1700000000.mp3");
/// ```
pub fn download_file_name(unix_ts: i64) -> String {
    format!("converted_{unix_ts}.{OUTPUT_EXTENSION}")
}

/// Check if a path has an Ogg audio extension.
pub fn is_ogg_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| OGG_AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check whether a file name belongs to the artifacts of some request.
///
/// Other files sharing the scratch directory do not match.
pub fn is_artifact_name(name: &str) -> bool {
    (name.starts_with("input_") && name.ends_with(&format!(".{INPUT_EXTENSION}")))
        || (name.starts_with("output_") && name.ends_with(&format!(".{OUTPUT_EXTENSION}")))
}
