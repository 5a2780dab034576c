//! Cursor materialization.
//!
//! Result rows are delivered in fixed-size chunks. When the connection
//! supports multiple concurrently active result sets, chunks stream
//! straight off the open cursor and the cursor is released on completion or
//! early termination. When it does not, every chunk is drained into memory
//! first and the cursor released immediately, trading memory for the
//! ability to open a second cursor (a nested query) while the first is
//! conceptually still in use.

use oxide_tsql_core::Capabilities;
use tracing::debug;

use crate::error::Result;

/// Default number of rows pulled per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// A source of result rows, released by dropping it.
pub trait RowSource {
    /// The row type produced.
    type Row;

    /// Fetches up to `max` more rows; an empty batch means the source is
    /// exhausted.
    fn fetch(&mut self, max: usize) -> impl std::future::Future<Output = Result<Vec<Self::Row>>> + Send;
}

enum Inner<S: RowSource> {
    /// Live cursor, pulled on demand.
    Streaming(S),
    /// Pre-drained chunks replayed from memory; the cursor is already gone.
    Buffered(std::vec::IntoIter<Vec<S::Row>>),
    Done,
}

/// Chunked row delivery over a [`RowSource`], buffering or streaming
/// depending on the connection's cursor concurrency.
pub struct RowChunks<S: RowSource> {
    inner: Inner<S>,
    chunk_size: usize,
}

impl<S: RowSource> RowChunks<S> {
    /// Opens chunked delivery over `source`.
    pub async fn open(mut source: S, chunk_size: usize, caps: &Capabilities) -> Result<Self> {
        if caps.supports_mars {
            debug!(chunk_size, "streaming rows from the live cursor");
            return Ok(Self {
                inner: Inner::Streaming(source),
                chunk_size,
            });
        }

        // Without concurrent result sets the cursor must be released before
        // the consumer can run another query; drain everything up front.
        debug!(chunk_size, "draining all chunks before cursor release");
        let mut chunks = Vec::new();
        loop {
            let rows = source.fetch(chunk_size).await?;
            if rows.is_empty() {
                break;
            }
            chunks.push(rows);
        }
        drop(source);
        Ok(Self {
            inner: Inner::Buffered(chunks.into_iter()),
            chunk_size,
        })
    }

    /// Returns the next chunk, or `None` once exhausted.
    ///
    /// A streaming source is dropped (releasing the cursor) as soon as it
    /// reports exhaustion; abandoning the adapter early releases it too.
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<S::Row>>> {
        match &mut self.inner {
            Inner::Streaming(source) => {
                let rows = source.fetch(self.chunk_size).await?;
                if rows.is_empty() {
                    self.inner = Inner::Done;
                    Ok(None)
                } else {
                    Ok(Some(rows))
                }
            }
            Inner::Buffered(chunks) => Ok(chunks.next()),
            Inner::Done => Ok(None),
        }
    }
}
