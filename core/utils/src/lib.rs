use std::io::{self, Read, Write};

/// Extension trait for the binary read primitives shared by the codecs.
///
/// Fixed-width integers and floats go through `byteorder` directly; this
/// trait carries the domain-specific pieces: strict booleans, four-byte
/// tags, and bounded blob reads.
pub trait BinReadExt: Read {
    /// Read a single byte that must be 0 or 1.
    fn read_bool(&mut self) -> io::Result<bool> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        match buf[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("byte {other:#04X} is not a boolean"),
            )),
        }
    }

    /// Read exactly four raw bytes as a chunk tag.
    fn read_tag(&mut self) -> io::Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        self.read_exact(&mut tag)?;
        Ok(tag)
    }

    /// Read a chunk tag, returning `None` when the stream ends exactly at
    /// the tag boundary. A tag truncated mid-way is still an error.
    fn read_tag_opt(&mut self) -> io::Result<Option<[u8; 4]>> {
        let mut tag = [0u8; 4];
        let mut filled = 0;
        while filled < 4 {
            let n = self.read(&mut tag[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "truncated chunk tag",
                ));
            }
            filled += n;
        }
        Ok(Some(tag))
    }

    /// Bounded slurp of `len` bytes.
    fn read_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Extension trait mirroring [`BinReadExt`] for writers.
pub trait BinWriteExt: Write {
    fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_all(&[value as u8])
    }

    fn write_tag(&mut self, tag: &[u8; 4]) -> io::Result<()> {
        self.write_all(tag)
    }
}

impl<R: Read + ?Sized> BinReadExt for R {}
impl<W: Write + ?Sized> BinWriteExt for W {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_bool_accepts_only_zero_and_one() {
        assert!(!Cursor::new([0u8]).read_bool().unwrap());
        assert!(Cursor::new([1u8]).read_bool().unwrap());
        assert!(Cursor::new([2u8]).read_bool().is_err());
    }

    #[test]
    fn read_tag_opt_signals_clean_eof() {
        let mut empty = Cursor::new(Vec::new());
        assert_eq!(empty.read_tag_opt().unwrap(), None);

        let mut short = Cursor::new(b"AB".to_vec());
        assert!(short.read_tag_opt().is_err());

        let mut full = Cursor::new(b"HIRC".to_vec());
        assert_eq!(full.read_tag_opt().unwrap(), Some(*b"HIRC"));
    }

    #[test]
    fn bool_round_trip() {
        let mut buf = Vec::new();
        buf.write_bool(true).unwrap();
        buf.write_bool(false).unwrap();
        assert_eq!(buf, [1, 0]);
    }
}
