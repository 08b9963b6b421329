//! Per-request artifact management.
//!
//! A [`Workspace`] reserves the input and output artifact paths for one
//! conversion inside a shared scratch directory. Both paths are held as
//! [`TempPath`]s, so the files are removed when the workspace is dropped,
//! whichever way the request ends.

use std::path::Path;

use oga2mp3_common::paths::{input_file_name, output_file_name};
use oga2mp3_common::ConversionId;
use tempfile::TempPath;

use crate::{Error, Result};

/// The pair of temporary artifacts owned by a single conversion.
///
/// # Example
///
/// ```no_run
/// use oga2mp3_av::Workspace;
/// use oga2mp3_common::ConversionId;
///
/// # async fn example() -> oga2mp3_av::Result<()> {
/// let workspace = Workspace::create("./temp", ConversionId::new()).await?;
/// workspace.stage_input(b"OggS...").await?;
/// // ... run the transcoder, writing to workspace.output() ...
/// drop(workspace); // both files are gone
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Workspace {
    id: ConversionId,
    input_path: TempPath,
    output_path: TempPath,
}

impl Workspace {
    /// Reserve artifact paths for `id` inside `dir`.
    ///
    /// The scratch directory is created if absent; failure to create it is an
    /// error rather than something to discover at write time.
    pub async fn create(dir: impl AsRef<Path>, id: ConversionId) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            Error::Workspace(format!(
                "failed to create scratch directory {}: {e}",
                dir.display()
            ))
        })?;

        Ok(Self {
            id,
            input_path: TempPath::from_path(dir.join(input_file_name(id))),
            output_path: TempPath::from_path(dir.join(output_file_name(id))),
        })
    }

    /// The conversion this workspace belongs to.
    pub fn id(&self) -> ConversionId {
        self.id
    }

    /// Path of the staged input artifact.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Path the transcoder writes its output to.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Write the uploaded bytes to the input artifact.
    pub async fn stage_input(&self, data: &[u8]) -> Result<()> {
        tokio::fs::write(self.input(), data).await?;
        tracing::debug!(id = %self.id, bytes = data.len(), "staged input artifact");
        Ok(())
    }

    /// Check that the transcoder actually produced an output file.
    pub fn ensure_output(&self) -> Result<()> {
        if self.output_path.exists() {
            Ok(())
        } else {
            Err(Error::file_not_found(self.output()))
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // The TempPath fields remove the files after this runs.
        tracing::debug!(id = %self.id, "releasing conversion artifacts");
    }
}
