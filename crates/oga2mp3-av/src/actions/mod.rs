//! Media processing actions.

mod audio;

pub use audio::{mp3_args, transcode_to_mp3, Mp3Options, DEFAULT_QUALITY, MP3_ENCODER};
