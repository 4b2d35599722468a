//! Request body streams.
//!
//! A body is any [`Read`] source. Sources that know how many bytes they still
//! hold expose it through [`BodyReader::remaining_len`], which is what lets the
//! request carry an exact `Content-Length`. Everything else is sent chunked.

use bytes::Buf;
use std::collections::VecDeque;
use std::io::{self, Cursor, Read};

/// A readable request body with an optional remaining-length capability.
pub trait BodyReader: Read + Send {
    /// Number of bytes left to read, when known up front.
    fn remaining_len(&self) -> Option<u64> {
        None
    }
}

/// Boxed body as stored on a [`Request`](super::Request).
pub type BoxBody = Box<dyn BodyReader>;

impl<T> BodyReader for Cursor<T>
where
    T: AsRef<[u8]> + Send,
{
    fn remaining_len(&self) -> Option<u64> {
        let total = self.get_ref().as_ref().len() as u64;
        Some(total.saturating_sub(self.position()))
    }
}

impl BodyReader for &[u8] {
    fn remaining_len(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

impl BodyReader for VecDeque<u8> {
    fn remaining_len(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

impl<B> BodyReader for bytes::buf::Reader<B>
where
    B: Buf + Send,
{
    fn remaining_len(&self) -> Option<u64> {
        Some(self.get_ref().remaining() as u64)
    }
}

impl BodyReader for io::Empty {
    fn remaining_len(&self) -> Option<u64> {
        Some(0)
    }
}

impl<R: BodyReader> BodyReader for io::Take<R> {
    fn remaining_len(&self) -> Option<u64> {
        self.get_ref()
            .remaining_len()
            .map(|inner| inner.min(self.limit()))
    }
}

impl BodyReader for std::fs::File {}

impl<R: BodyReader + ?Sized> BodyReader for Box<R> {
    fn remaining_len(&self) -> Option<u64> {
        (**self).remaining_len()
    }
}

/// Wraps an arbitrary reader whose length is unknown (pipes, sockets, child
/// process output). Such bodies are always sent with chunked framing.
#[derive(Debug)]
pub struct Opaque<R>(R);

impl<R> Opaque<R> {
    pub fn new(inner: R) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: Read> Read for Opaque<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read + Send> BodyReader for Opaque<R> {}
