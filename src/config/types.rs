use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use oga2mp3_av::Mp3Options;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest request body accepted by `/convert`, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Scratch directory for input/output artifacts
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Maximum number of transcoder processes running at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Seconds before a running transcoder is killed
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// LAME VBR quality (0 = best, 9 = smallest)
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("./temp")
}

fn default_max_concurrent() -> usize {
    num_cpus::get()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_quality() -> u8 {
    oga2mp3_av::actions::DEFAULT_QUALITY
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_timeout_secs(),
            quality: default_quality(),
        }
    }
}

impl ConversionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Encoder settings derived from this config
    pub fn mp3_options(&self) -> Mp3Options {
        Mp3Options {
            quality: self.quality,
            timeout: self.timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit ffmpeg location; PATH is searched when unset
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}
