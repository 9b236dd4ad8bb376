//! Position tracking over the bytes being identified.

use std::convert::TryFrom;

/// A read position inside an immutable buffer.
///
/// Positions are `base + offset`. Seeks may leave the cursor anywhere, even
/// before the start or past the end; reads there just come back short.
/// Arithmetic saturates, and a position that does not fit in an `i64` is
/// past the end.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    base: i64,
    offset: i64,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, base: 0, offset: 0 }
    }

    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    pub fn base(&self) -> i64 {
        self.base
    }

    /// Current offset relative to `base`.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Absolute position in the buffer, if it can be represented.
    pub fn position(&self) -> Option<i64> {
        self.base.checked_add(self.offset)
    }

    fn index(&self) -> Option<usize> {
        let pos = self.position()?;
        if pos < 0 || pos >= self.buf.len() as i64 {
            return None;
        }
        Some(pos as usize)
    }

    pub fn is_eof(&self) -> bool {
        self.index().is_none()
    }

    /// Everything from the current position to the end of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        match self.index() {
            Some(pos) => &self.buf[pos..],
            None => &[]
        }
    }

    /// Up to `n` bytes at the current position, without moving.
    pub fn peek(&self, n: usize) -> &'a [u8] {
        let rest = self.rest();
        &rest[..n.min(rest.len())]
    }

    /// Up to `n` bytes; the cursor always advances by `n`.
    pub fn read(&mut self, n: usize) -> &'a [u8] {
        let ret = self.peek(n);
        self.seek_relative(i64::try_from(n).unwrap_or(i64::MAX));
        ret
    }

    /// Exactly `n` bytes, or `None` if the buffer runs out first.
    pub fn read_exact(&mut self, n: usize) -> Option<&'a [u8]> {
        let ret = self.read(n);
        if ret.len() == n {
            Some(ret)
        } else {
            None
        }
    }

    /// Make the current position the new origin for offsets.
    pub fn mark_base(&mut self) {
        self.base = self.base.saturating_add(self.offset);
        self.offset = 0;
    }

    /// Seek relative to `base`. Negative offsets count back from the end of
    /// the buffer.
    pub fn seek_absolute(&mut self, offset: i64) {
        if offset < 0 {
            self.offset = (self.buf.len() as i64)
                .saturating_add(offset)
                .saturating_sub(self.base);
        } else {
            self.offset = offset;
        }
    }

    pub fn seek_relative(&mut self, offset: i64) {
        self.offset = self.offset.saturating_add(offset);
    }

    /// Run `f`, then put `offset` and `base` back to what they were.
    pub fn restore<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut Cursor<'a>) -> T,
    {
        let (offset, base) = (self.offset, self.base);
        let ret = f(self);
        self.offset = offset;
        self.base = base;
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn reads_past_end_come_back_short() {
        let mut c = Cursor::new(b"abc");
        c.seek_absolute(2);
        assert_eq!(c.read(4), b"c");
        assert_eq!(c.offset(), 6);
        assert!(c.is_eof());
        assert_eq!(c.read_exact(1), None);
    }

    #[test]
    fn negative_seek_counts_from_end() {
        let mut c = Cursor::new(b"0123456789");
        c.seek_absolute(-3);
        assert_eq!(c.peek(3), b"789");

        c.seek_absolute(4);
        c.mark_base();
        c.seek_absolute(-1);
        assert_eq!(c.position(), Some(9));
        assert_eq!(c.peek(1), b"9");
    }

    #[test]
    fn mark_base_rebases_offsets() {
        let mut c = Cursor::new(b"0123456789");
        c.seek_absolute(4);
        c.mark_base();
        assert_eq!(c.offset(), 0);
        c.seek_absolute(2);
        assert_eq!(c.peek(1), b"6");
    }

    #[test]
    fn restore_puts_everything_back() {
        let mut c = Cursor::new(b"0123456789");
        c.seek_absolute(3);
        let inner = c.restore(|c| {
            c.mark_base();
            c.seek_absolute(5);
            c.position()
        });
        assert_eq!(inner, Some(8));
        assert_eq!(c.base(), 0);
        assert_eq!(c.offset(), 3);
    }

    #[test]
    fn far_positions_are_past_the_end() {
        let mut c = Cursor::new(b"0123456789");
        c.seek_absolute(i64::MAX);
        c.mark_base();
        assert_eq!(c.base(), i64::MAX);
        c.seek_absolute(4);
        assert_eq!(c.position(), None);
        assert!(c.is_eof());
        assert_eq!(c.read(2), b"");
        assert_eq!(c.read_exact(1), None);

        c.seek_relative(i64::MAX);
        c.mark_base();
        assert!(c.is_eof());
        c.seek_absolute(-2);
        assert_eq!(c.peek(2), b"89");
    }

    #[test]
    fn huge_reads_do_not_wrap() {
        let mut c = Cursor::new(b"abc");
        assert_eq!(c.read(usize::MAX), b"abc");
        assert!(c.is_eof());
        c.seek_relative(i64::MAX);
        assert!(c.is_eof());
        c.seek_absolute(i64::MIN);
        assert!(c.is_eof());
    }
}
