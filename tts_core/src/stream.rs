//! Chunk sources.
//!
//! A chunk source is any iterator of `Result<bytes, error>`: lazy, finite
//! and consumed once. [`ChunkedReader`] adapts a blocking reader (an HTTP
//! response body, a file) into one.

use std::io::{self, Read};

pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Yields the contents of a reader as chunks of at most `chunk_size` bytes.
///
/// Chunk sizes follow whatever the reader returns per call; nothing is
/// aligned to sample frames. The iterator ends at EOF or after the first
/// error and never yields an empty chunk.
#[derive(Debug)]
pub struct ChunkedReader<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ChunkedReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for ChunkedReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Some(Ok(buf));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for ChunkedReader<R> {}
