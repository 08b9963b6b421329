//! Response body stream that owns a conversion's artifacts.
//!
//! The HTTP response outlives the handler that built it, so the output file
//! cannot be removed when the handler returns. [`ArtifactStream`] carries the
//! [`Workspace`] along with the open file; the artifacts are removed when
//! hyper drops the body, after the last chunk or on client disconnect.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use futures::Stream;
use oga2mp3_av::Workspace;
use oga2mp3_common::ConversionStage;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Streams the output artifact and removes both artifacts when dropped.
pub struct ArtifactStream {
    // Declared first so the file is closed before the workspace removes it.
    inner: ReaderStream<File>,
    workspace: Workspace,
    expected: u64,
    sent: u64,
    started: Instant,
    failed: bool,
}

impl ArtifactStream {
    pub(crate) fn new(file: File, workspace: Workspace, expected: u64, started: Instant) -> Self {
        tracing::trace!(id = %workspace.id(), stage = %ConversionStage::Streaming, "conversion stage");
        Self {
            inner: ReaderStream::new(file),
            workspace,
            expected,
            sent: 0,
            started,
            failed: false,
        }
    }

    /// Bytes handed to the client so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Stream for ArtifactStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                // Headers are already on the wire; all we can do is log.
                tracing::warn!(id = %this.workspace.id(), "Error sending converted file: {e}");
                this.failed = true;
                Poll::Ready(Some(Err(e)))
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl Drop for ArtifactStream {
    fn drop(&mut self) {
        let id = self.workspace.id();
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        if self.sent == self.expected && !self.failed {
            tracing::info!(%id, bytes = self.sent, elapsed_ms, "Conversion delivered");
        } else {
            tracing::warn!(
                %id,
                sent = self.sent,
                expected = self.expected,
                "Conversion response ended early"
            );
        }
        tracing::trace!(%id, stage = %ConversionStage::Cleaned, "conversion stage");
    }
}
