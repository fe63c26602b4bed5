//! Byte-stream adapters: the write and read halves of the wire.
//!
//! [`WriteBuffer`] is a growable output buffer with two-phase length
//! patching: [`push`](WriteBuffer::push) reserves a four-byte
//! little-endian size slot and returns an opaque [`SizeMarker`];
//! [`pop`](WriteBuffer::pop) later patches the slot with the byte
//! distance from the start of the slot to the current end of the buffer
//! (the slot's own width included). This is the framing that lets a
//! reader skip an aggregate wholesale.
//!
//! [`ReadCursor`] is the bounded mirror image: a cursor over an
//! immutable byte slice whose [`enter`](ReadCursor::enter) reads a
//! stored size slot and yields the absolute offset where the framed
//! region ends, and whose [`leave`](ReadCursor::leave) repositions the
//! cursor there, discarding whatever the reader did not understand.
//!
//! Reads short of the requested length report
//! [`Error::DataUnderrun`](crate::Error::DataUnderrun); the adapter
//! itself knows nothing of shapes or modes.

use crate::error::{Error, Result};

/// Growable output buffer with reserved-slot patching.
#[derive(Debug, Default, Clone)]
pub struct WriteBuffer {
    buf: Vec<u8>,
}

/// Opaque handle to a reserved size slot, redeemable once via
/// [`WriteBuffer::pop`].
#[derive(Debug)]
#[must_use = "a reserved size slot must be patched with pop()"]
pub struct SizeMarker {
    at: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    #[inline]
    pub fn write_bytes(&mut self, src: &[u8]) {
        self.buf.extend_from_slice(src);
    }

    /// Reserves a four-byte little-endian size slot at the current end
    /// of the buffer.
    pub fn push(&mut self) -> SizeMarker {
        let at = self.buf.len();
        self.buf.extend_from_slice(&[0u8; 4]);
        SizeMarker { at }
    }

    /// Patches the slot reserved by `push` with the number of bytes
    /// emitted since the marker, counting the slot itself.
    pub fn pop(&mut self, marker: SizeMarker) {
        let span = (self.buf.len() - marker.at) as u32;
        self.buf[marker.at..marker.at + 4].copy_from_slice(&span.to_le_bytes());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl From<WriteBuffer> for Vec<u8> {
    fn from(b: WriteBuffer) -> Self {
        b.buf
    }
}

/// Bounded cursor over an immutable byte slice.
#[derive(Debug)]
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn remainder(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn underrun(&self, requested: usize) -> Error {
        Error::DataUnderrun {
            offset: self.pos,
            requested,
            limit: self.buf.len(),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        match self.buf.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(self.underrun(1)),
        }
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        self.buf.get(self.pos).copied().ok_or_else(|| self.underrun(1))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remainder() < n {
            return Err(self.underrun(n));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads a four-byte size slot and returns the absolute offset at
    /// which the framed region ends.
    pub fn enter(&mut self) -> Result<usize> {
        let at = self.pos;
        let span = u32::from_le_bytes(self.read_array::<4>()?);
        Ok(at + span as usize)
    }

    /// Repositions the cursor at `end`, skipping any unread bytes of the
    /// framed region. An end offset equal to the buffer length is legal
    /// (the framed region may close the stream).
    pub fn leave(&mut self, end: usize) -> Result<()> {
        if end > self.buf.len() {
            return Err(Error::DataUnderrun {
                offset: self.pos,
                requested: end - self.pos,
                limit: self.buf.len(),
            });
        }
        self.pos = end;
        Ok(())
    }
}
