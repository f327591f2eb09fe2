use std::convert::TryFrom;

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    error::{Error, Result},
    Tag,
};

/// A position tracked, bounds checked, big-endian reader over a buffer.
///
/// Every read either advances the position by exactly the bytes it consumed,
/// or fails and leaves the position where it was.
///
/// Two reads are best-effort rather than strict: [`Cursor::read_available`]
/// and [`Cursor::skip`] hand back as much as the buffer has left and report
/// how much that was. Their strict counterparts, [`Cursor::read_bytes`] and
/// [`Cursor::skip_exact`], fail with [`ErrorKind::Truncated`][crate::error::ErrorKind::Truncated]
/// on a short buffer. The decoder only ever uses the strict ones.
#[derive(Debug, Clone)]
pub struct Cursor<B = Vec<u8>> {
    data: B,
    pos: usize,
}

impl<B: AsRef<[u8]>> Cursor<B> {
    pub fn new(data: B) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.as_ref().len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn into_inner(self) -> B {
        self.data
    }

    fn consume(&mut self, n: usize) -> Result<&[u8]> {
        let available = self.remaining();
        if n > available {
            return Err(Error::truncated(n, available));
        }

        let start = self.pos;
        self.pos += n;
        Ok(&self.data.as_ref()[start..self.pos])
    }

    /// Run a read made of several smaller reads, rewinding if any of them
    /// fail.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let start = self.pos;
        let res = f(self);
        if res.is_err() {
            self.pos = start;
        }
        res
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.consume(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let mut bs = self.consume(std::mem::size_of::<u16>())?;
        Ok(bs.read_u16::<BigEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let mut bs = self.consume(std::mem::size_of::<i16>())?;
        Ok(bs.read_i16::<BigEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let mut bs = self.consume(std::mem::size_of::<i32>())?;
        Ok(bs.read_i32::<BigEndian>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let mut bs = self.consume(std::mem::size_of::<i64>())?;
        Ok(bs.read_i64::<BigEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let mut bs = self.consume(std::mem::size_of::<f32>())?;
        Ok(bs.read_f32::<BigEndian>()?)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let mut bs = self.consume(std::mem::size_of::<f64>())?;
        Ok(bs.read_f64::<BigEndian>()?)
    }

    /// Read a single tag byte. Bytes outside of the known tags are an error,
    /// and are not consumed.
    pub fn read_tag(&mut self) -> Result<Tag> {
        self.atomically(|c| {
            let tag = c.read_u8()?;
            Tag::try_from(tag).map_err(|_| Error::unknown_tag(tag))
        })
    }

    /// Read a string prefixed by its unsigned 16 bit length. NBT strings are
    /// Java's modified UTF-8, which is decoded here.
    pub fn read_str(&mut self) -> Result<String> {
        self.atomically(|c| {
            let len = c.read_u16()? as usize;
            if len == 0 {
                return Ok(String::new());
            }

            let bs = c.consume(len)?;
            let s = cesu8::from_java_cesu8(bs).map_err(|_| Error::nonunicode(bs))?;
            Ok(s.into_owned())
        })
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8]> {
        self.consume(n)
    }

    /// Read up to `n` bytes. Returns fewer if the buffer runs out first; the
    /// length of the returned slice is the amount consumed.
    pub fn read_available(&mut self, n: usize) -> &[u8] {
        let n = n.min(self.remaining());
        let start = self.pos;
        self.pos += n;
        &self.data.as_ref()[start..self.pos]
    }

    /// Advance by up to `n` bytes, returning how many were actually skipped.
    pub fn skip(&mut self, n: usize) -> usize {
        let n = n.min(self.remaining());
        self.pos += n;
        n
    }

    /// Advance by exactly `n` bytes, or not at all.
    pub fn skip_exact(&mut self, n: usize) -> Result<()> {
        let available = self.remaining();
        if n > available {
            return Err(Error::truncated(n, available));
        }

        let skipped = self.skip(n);
        debug_assert_eq!(skipped, n);
        Ok(())
    }
}
