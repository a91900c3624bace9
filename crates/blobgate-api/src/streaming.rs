//! Chunked streaming of blob content into response bodies.
//!
//! An open blob reader is owned by a [`BlobStreamGuard`]. The guard is moved
//! into the body stream and dropped exactly once: after the last chunk, after a
//! read error, or when the client goes away and the body is dropped. Dropping
//! the guard closes the reader.
//!
//! Chunks are only read when the body is polled, so at most one chunk per
//! download is buffered regardless of blob size.

use blobgate_core::BlobId;
use blobgate_storage::BlobReader;
use bytes::Bytes;
use futures::Stream;
use std::io;
use tokio::io::AsyncReadExt;

pub struct BlobStreamGuard {
    reader: BlobReader,
    blob_id: BlobId,
    declared_size: u64,
    sent: u64,
    completed: bool,
}

impl BlobStreamGuard {
    pub fn new(reader: BlobReader, blob_id: BlobId, declared_size: u64) -> Self {
        Self {
            reader,
            blob_id,
            declared_size,
            sent: 0,
            completed: false,
        }
    }

    /// Read the next chunk of at most `chunk_size` bytes.
    ///
    /// Every chunk but the last is exactly `chunk_size` long. A source that ends
    /// before, or runs past, the declared size is an error, since the
    /// `Content-Length` already promised the client something else.
    async fn next_chunk(&mut self, chunk_size: usize) -> io::Result<Option<Bytes>> {
        let mut buf = vec![0u8; chunk_size];
        let mut filled = 0;
        while filled < chunk_size {
            let n = self.reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            if self.sent < self.declared_size {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "blob ended after {} of {} bytes",
                        self.sent, self.declared_size
                    ),
                ));
            }
            self.completed = true;
            return Ok(None);
        }

        self.sent += filled as u64;
        if self.sent > self.declared_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("blob is larger than its declared {} bytes", self.declared_size),
            ));
        }

        buf.truncate(filled);
        Ok(Some(Bytes::from(buf)))
    }
}

impl Drop for BlobStreamGuard {
    fn drop(&mut self) {
        if self.completed {
            tracing::debug!(
                blob_id = %self.blob_id,
                bytes_sent = self.sent,
                "Blob stream completed"
            );
        } else {
            tracing::info!(
                blob_id = %self.blob_id,
                bytes_sent = self.sent,
                declared_size = self.declared_size,
                "Blob stream released before completion"
            );
        }
    }
}

/// Turn a guarded reader into a stream of chunks suitable for `Body::from_stream`.
pub fn chunked_body_stream(
    guard: BlobStreamGuard,
    chunk_size: usize,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    futures::stream::try_unfold(guard, move |mut guard| async move {
        match guard.next_chunk(chunk_size).await {
            Ok(Some(chunk)) => Ok(Some((chunk, guard))),
            Ok(None) => Ok(None),
            Err(e) => {
                tracing::error!(
                    blob_id = %guard.blob_id,
                    bytes_sent = guard.sent,
                    error = %e,
                    "Blob stream failed mid-transfer"
                );
                Err(e)
            }
        }
    })
}
