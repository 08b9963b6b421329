//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds an [`AppContext`] around a scratch
//! directory and a [`FakeTranscoder`], so HTTP tests exercise the full
//! artifact lifecycle without needing ffmpeg. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use oga2mp3::config::Config;
use oga2mp3::server::{create_router, AppContext};
use oga2mp3_av::Transcoder;
use oga2mp3_common::paths::is_artifact_name;
use tempfile::TempDir;

/// Diagnostic the fake prints for non-Ogg input, mimicking ffmpeg.
pub const FAKE_DIAGNOSTIC: &str = "Invalid data found when processing input";

/// Stand-in transcoder: "converts" Ogg input by copying it, so a response
/// body must equal its own request body byte for byte.
pub struct FakeTranscoder {
    delay: Duration,
    running: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Highest number of overlapping transcodes observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn transcode(&self, input: &Path, output: &Path) -> oga2mp3_av::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = copy_if_ogg(input, output).await;

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

async fn copy_if_ogg(input: &Path, output: &Path) -> oga2mp3_av::Result<()> {
    let data = tokio::fs::read(input).await?;
    if !data.starts_with(b"OggS") {
        return Err(oga2mp3_av::Error::tool_failed(
            "ffmpeg",
            format!(
                "exited with exit status: 1\n{}: {FAKE_DIAGNOSTIC}",
                input.display()
            ),
        ));
    }
    tokio::fs::write(output, &data).await?;
    Ok(())
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// private scratch directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub transcoder: Arc<dyn Transcoder>,
    _dir: TempDir,
    scratch: PathBuf,
}

impl TestHarness {
    /// Harness with default configuration and an instant fake transcoder.
    pub fn new() -> Self {
        Self::with_transcoder(Config::default(), Arc::new(FakeTranscoder::new()))
    }

    /// Harness with a custom config and transcoder. The scratch directory is
    /// always replaced by a private temp dir.
    pub fn with_transcoder(mut config: Config, transcoder: Arc<dyn Transcoder>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let scratch = dir.path().join("temp");
        config.conversion.temp_dir = scratch.clone();

        let ctx = AppContext::new(config, transcoder.clone());
        Self {
            ctx,
            transcoder,
            _dir: dir,
            scratch,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub fn scratch(&self) -> &Path {
        &self.scratch
    }

    /// Names of the conversion artifacts currently in the scratch directory.
    pub fn scratch_files(&self) -> Vec<String> {
        match std::fs::read_dir(&self.scratch) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|name| is_artifact_name(name))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Start an Axum server on a random port and return the bound address.
    pub async fn serve(&self) -> SocketAddr {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }

    /// Start an Axum server with default config on a random port.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let addr = harness.serve().await;
        (harness, addr)
    }
}

/// A fake OGA payload: Ogg capture pattern followed by `len - 4` bytes.
pub fn ogg_payload(len: usize, seed: u8) -> Vec<u8> {
    let mut data = b"OggS".to_vec();
    data.extend(
        (0..len.saturating_sub(4)).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)),
    );
    data
}
