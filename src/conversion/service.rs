//! Conversion service: the request-scoped artifact lifecycle.
//!
//! [`ConversionService::convert`] takes an uploaded body through validation,
//! staging, transcoding and output inspection. The artifacts live in a
//! [`Workspace`] that travels with the result, so cleanup happens exactly
//! when the caller is done with the output (or immediately on failure).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use oga2mp3_av::{Transcoder, Workspace};
use oga2mp3_common::{ConversionId, ConversionStage, Error, Result};
use tokio::fs::File;
use tokio::sync::Semaphore;

use super::stream::ArtifactStream;
use crate::config::ConversionConfig;

/// A finished conversion whose output is ready to be read.
///
/// Dropping this value (or the [`ArtifactStream`] built from it) removes
/// both artifacts.
#[derive(Debug)]
pub struct ConvertedAudio {
    workspace: Workspace,
    file: File,
    size: u64,
    started: Instant,
}

impl ConvertedAudio {
    /// The conversion's identifier.
    pub fn id(&self) -> ConversionId {
        self.workspace.id()
    }

    /// Size of the MP3 output in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Path of the output artifact (valid until this value is dropped).
    pub fn output_path(&self) -> &Path {
        self.workspace.output()
    }

    /// Turn the output into a body stream that owns the artifacts.
    pub fn into_stream(self) -> ArtifactStream {
        ArtifactStream::new(self.file, self.workspace, self.size, self.started)
    }

    /// Copy the output to `dest`, returning the number of bytes written.
    pub async fn save_to(mut self, dest: &Path) -> Result<u64> {
        let mut out = File::create(dest).await?;
        let written = tokio::io::copy(&mut self.file, &mut out).await?;
        out.sync_all().await?;
        Ok(written)
    }
}

/// Runs conversions against a [`Transcoder`], bounding how many run at once.
pub struct ConversionService {
    transcoder: Arc<dyn Transcoder>,
    temp_dir: PathBuf,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl ConversionService {
    /// Build a service from the conversion settings.
    pub fn new(transcoder: Arc<dyn Transcoder>, config: &ConversionConfig) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        Self {
            transcoder,
            temp_dir: config.temp_dir.clone(),
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// Scratch directory holding in-flight artifacts.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Name of the underlying transcoder.
    pub fn transcoder_name(&self) -> &'static str {
        self.transcoder.name()
    }

    /// Upper bound on simultaneous transcoder processes.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of transcoder slots currently free.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Convert an uploaded OGA body to MP3.
    ///
    /// # Errors
    ///
    /// - [`Error::BadRequest`] if `body` is empty; nothing touches the disk.
    /// - [`Error::Conversion`] tagged with the stage that failed, for any
    ///   staging, transcoding or output failure. Transcoder failures carry its
    ///   stderr. All artifacts created so far are removed before returning.
    pub async fn convert(&self, body: &[u8]) -> Result<ConvertedAudio> {
        if body.is_empty() {
            return Err(Error::bad_request("request body is empty"));
        }

        let started = Instant::now();
        let id = ConversionId::new();
        let mut stage = ConversionStage::Validated;
        tracing::info!(%id, bytes = body.len(), "Received audio for conversion");

        let workspace = Workspace::create(&self.temp_dir, id)
            .await
            .map_err(|e| Error::from(e).at_stage(stage))?;

        workspace
            .stage_input(body)
            .await
            .map_err(|e| Error::from(e).at_stage(stage))?;
        stage = advance(id, ConversionStage::InputStaged);

        {
            let _permit = self.permits.acquire().await.map_err(|e| {
                Error::internal(format!("transcoder pool closed: {e}")).at_stage(stage)
            })?;
            stage = advance(id, ConversionStage::Transcoding);

            self.transcoder
                .transcode(workspace.input(), workspace.output())
                .await
                .map_err(|e| Error::from(e).at_stage(stage))?;
        }

        workspace
            .ensure_output()
            .map_err(|e| Error::from(e).at_stage(stage))?;

        let file = File::open(workspace.output()).await.map_err(|e| {
            Error::internal(format!("failed to open converted file: {e}")).at_stage(stage)
        })?;

        let size = file
            .metadata()
            .await
            .map_err(|e| {
                Error::internal(format!("failed to read converted file metadata: {e}"))
                    .at_stage(stage)
            })?
            .len();
        advance(id, ConversionStage::OutputReady);

        tracing::info!(
            %id,
            size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Conversion finished"
        );

        Ok(ConvertedAudio {
            workspace,
            file,
            size,
            started,
        })
    }

    /// Convert a local file, writing the MP3 to `dest`.
    ///
    /// Uses the same artifact lifecycle as HTTP requests; the scratch copies
    /// are removed once `dest` has been written.
    pub async fn convert_file(&self, input: &Path, dest: &Path) -> Result<u64> {
        let body = tokio::fs::read(input).await?;
        let converted = self.convert(&body).await?;
        converted.save_to(dest).await
    }
}

fn advance(id: ConversionId, next: ConversionStage) -> ConversionStage {
    tracing::trace!(%id, stage = %next, "conversion stage");
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Copies Ogg input straight to the output; rejects anything else.
    struct CopyTranscoder;

    #[async_trait]
    impl Transcoder for CopyTranscoder {
        fn name(&self) -> &'static str {
            "copy"
        }

        async fn transcode(&self, input: &Path, output: &Path) -> oga2mp3_av::Result<()> {
            let data = tokio::fs::read(input).await?;
            if !data.starts_with(b"OggS") {
                return Err(oga2mp3_av::Error::tool_failed(
                    "copy",
                    "Invalid data found when processing input",
                ));
            }
            tokio::fs::write(output, data).await?;
            Ok(())
        }
    }

    /// Writes a partial output and then fails.
    struct PartialOutputTranscoder;

    #[async_trait]
    impl Transcoder for PartialOutputTranscoder {
        fn name(&self) -> &'static str {
            "partial"
        }

        async fn transcode(&self, _input: &Path, output: &Path) -> oga2mp3_av::Result<()> {
            tokio::fs::write(output, b"ID3 partial").await?;
            Err(oga2mp3_av::Error::tool_failed("partial", "encoder crashed"))
        }
    }

    /// Succeeds without producing an output file.
    struct SilentTranscoder;

    #[async_trait]
    impl Transcoder for SilentTranscoder {
        fn name(&self) -> &'static str {
            "silent"
        }

        async fn transcode(&self, _input: &Path, _output: &Path) -> oga2mp3_av::Result<()> {
            Ok(())
        }
    }

    /// Writes a partial output, then runs a child that outlives its timeout.
    struct HangingTranscoder {
        timeout: Duration,
    }

    #[async_trait]
    impl Transcoder for HangingTranscoder {
        fn name(&self) -> &'static str {
            "hanging"
        }

        async fn transcode(&self, _input: &Path, output: &Path) -> oga2mp3_av::Result<()> {
            tokio::fs::write(output, b"ID3 partial").await?;
            oga2mp3_av::ToolCommand::new(PathBuf::from("sleep"))
                .arg("30")
                .timeout(self.timeout)
                .execute()
                .await?;
            Ok(())
        }
    }

    /// Records how many transcodes overlap.
    struct CountingTranscoder {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Transcoder for CountingTranscoder {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn transcode(&self, input: &Path, output: &Path) -> oga2mp3_av::Result<()> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            tokio::fs::copy(input, output).await?;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn service(
        transcoder: Arc<dyn Transcoder>,
        dir: &Path,
        max_concurrent: usize,
    ) -> ConversionService {
        let config = ConversionConfig {
            temp_dir: dir.to_path_buf(),
            max_concurrent,
            ..ConversionConfig::default()
        };
        ConversionService::new(transcoder, &config)
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn empty_body_is_rejected_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("temp");
        let svc = service(Arc::new(CopyTranscoder), &scratch, 1);

        let err = svc.convert(b"").await.unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn successful_conversion_exposes_output_then_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(CopyTranscoder), dir.path(), 1);

        let converted = svc.convert(b"OggS hello").await.unwrap();
        assert_eq!(converted.size(), 10);
        assert!(converted.output_path().exists());
        assert_eq!(file_count(dir.path()), 2);

        drop(converted);
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn transcoder_failure_reports_diagnostics_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(CopyTranscoder), dir.path(), 1);

        let err = svc.convert(b"0123456789").await.unwrap_err();
        assert_eq!(err.stage(), Some(ConversionStage::Transcoding));
        assert_eq!(err.http_status(), 500);
        assert!(err.to_string().contains("Invalid data found"));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn partial_output_is_removed_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(PartialOutputTranscoder), dir.path(), 1);

        let err = svc.convert(b"OggS").await.unwrap_err();
        assert!(err.to_string().contains("encoder crashed"));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn timed_out_transcode_fails_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversionConfig {
            temp_dir: dir.path().to_path_buf(),
            timeout_secs: 1,
            ..ConversionConfig::default()
        };
        let hanging = HangingTranscoder {
            timeout: config.mp3_options().timeout,
        };
        let svc = ConversionService::new(Arc::new(hanging), &config);

        let started = Instant::now();
        let err = svc.convert(b"OggS").await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(err.stage(), Some(ConversionStage::Transcoding));
        assert_eq!(err.http_status(), 500);
        assert!(err.to_string().contains("timed out"), "{err}");
        assert_eq!(file_count(dir.path()), 0);
        assert_eq!(svc.available_permits(), svc.max_concurrent());
    }

    #[tokio::test]
    async fn missing_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(SilentTranscoder), dir.path(), 1);

        let err = svc.convert(b"OggS").await.unwrap_err();
        assert_eq!(err.stage(), Some(ConversionStage::Transcoding));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn unusable_scratch_dir_fails_at_staging() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let svc = service(Arc::new(CopyTranscoder), &blocker.join("temp"), 1);

        let err = svc.convert(b"OggS").await.unwrap_err();
        assert_eq!(err.stage(), Some(ConversionStage::Validated));
        assert_eq!(err.http_status(), 500);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let counting = Arc::new(CountingTranscoder {
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let svc = Arc::new(service(counting.clone(), dir.path(), 2));

        let tasks: Vec<_> = (0..6)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    let body = format!("OggS {i}");
                    svc.convert(body.as_bytes()).await.map(|c| c.size())
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        assert!(counting.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(svc.available_permits(), 2);
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn convert_file_writes_destination() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("temp");
        let svc = service(Arc::new(CopyTranscoder), &scratch, 1);

        let input = dir.path().join("voice.oga");
        let dest = dir.path().join("voice.mp3");
        std::fs::write(&input, b"OggS voice").unwrap();

        let written = svc.convert_file(&input, &dest).await.unwrap();
        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&dest).unwrap(), b"OggS voice");
        assert_eq!(file_count(&scratch), 0);
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(CopyTranscoder), dir.path(), 0);
        assert_eq!(svc.max_concurrent(), 1);
        assert_eq!(svc.transcoder_name(), "copy");
    }
}
