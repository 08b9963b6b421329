//! # oga2mp3-av
//!
//! External transcoder invocation and per-request artifact management.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`tools`]) -- locate ffmpeg and report its version.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support; children are killed if the caller gives up.
//! - **Workspace management** ([`Workspace`]) -- the two temporary artifacts
//!   of one conversion, removed on drop.
//! - **Transcoding** ([`Transcoder`], [`FfmpegTranscoder`]) -- OGA to MP3 via
//!   `libmp3lame`.

pub mod actions;
pub mod command;
mod error;
pub mod tools;
pub mod transcoder;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use actions::{transcode_to_mp3, Mp3Options};
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use tools::{check_ffmpeg, check_tool, get_tool_path, require_tool, ToolInfo};
pub use transcoder::{FfmpegTranscoder, Transcoder};
pub use workspace::Workspace;
