//! Netpbm (PGM/PPM) format support.
//!
//! Reads P2/P5 grayscale and P3/P6 RGB images with maxval up to 255,
//! and writes the binary variants (P5/P6).

use std::fs;
use std::io::Write;
use std::path::Path;

use lumo_core::Image;
use tracing::debug;

use crate::{IoError, IoResult};

/// Reads a PGM or PPM file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let image = decode(&bytes)?;
    debug!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        channels = image.channels,
        "loaded PNM image"
    );
    Ok(image)
}

/// Writes a binary PGM (1 channel) or PPM (3 channels) file.
pub fn write<P: AsRef<Path>>(path: P, image: &Image) -> IoResult<()> {
    let magic = match image.channels {
        1 => "P5",
        3 => "P6",
        c => return Err(IoError::UnsupportedFormat(format!("{c}-channel PNM"))),
    };

    let mut out = Vec::with_capacity(image.size_bytes() + 32);
    write!(out, "{magic}\n{} {}\n255\n", image.width, image.height)?;
    out.extend_from_slice(image.data());
    fs::write(path.as_ref(), out)?;

    debug!(path = %path.as_ref().display(), magic, "wrote PNM image");
    Ok(())
}

/// Decodes PNM bytes into an [`Image`].
pub fn decode(bytes: &[u8]) -> IoResult<Image> {
    let mut scan = Scanner::new(bytes);

    let magic = scan.token()?;
    let (channels, ascii) = match magic {
        "P2" => (1u8, true),
        "P3" => (3u8, true),
        "P5" => (1u8, false),
        "P6" => (3u8, false),
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "not a PGM/PPM file (magic {other:?})"
            )));
        }
    };

    let width = scan.number()?;
    let height = scan.number()?;
    let maxval = scan.number()?;
    if maxval == 0 || maxval > 255 {
        return Err(IoError::UnsupportedBitDepth(format!("maxval {maxval}")));
    }

    let expected = width as usize * height as usize * channels as usize;
    let data = if ascii {
        let mut data = Vec::with_capacity(expected);
        for _ in 0..expected {
            let v = scan.number()?;
            if v > maxval {
                return Err(IoError::InvalidFile(format!(
                    "sample {v} exceeds maxval {maxval}"
                )));
            }
            data.push(v as u8);
        }
        data
    } else {
        let payload = scan.binary_payload()?;
        if payload.len() < expected {
            return Err(IoError::InvalidFile(format!(
                "truncated pixel data: expected {expected} bytes, got {}",
                payload.len()
            )));
        }
        payload[..expected].to_vec()
    };

    Image::from_raw(data, width, height, channels).map_err(IoError::from)
}

/// Header token scanner with `#` comment handling.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'#' => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn token(&mut self) -> IoResult<&'a str> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while self.pos < self.bytes.len() && !self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(IoError::InvalidFile("unexpected end of header".into()));
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| IoError::InvalidFile("non-ASCII header token".into()))
    }

    fn number(&mut self) -> IoResult<u32> {
        let tok = self.token()?;
        tok.parse()
            .map_err(|_| IoError::InvalidFile(format!("expected number, got {tok:?}")))
    }

    /// Binary pixel data starts after the single whitespace byte that
    /// terminates the maxval token.
    fn binary_payload(&mut self) -> IoResult<&'a [u8]> {
        if self.pos >= self.bytes.len() {
            return Err(IoError::InvalidFile("missing pixel data".into()));
        }
        Ok(&self.bytes[self.pos + 1..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn decode_binary_pgm() {
        let mut bytes = b"P5\n# test comment\n2 2\n255\n".to_vec();
        bytes.extend_from_slice(&[0, 64, 128, 255]);
        let img = decode(&bytes).unwrap();
        assert_eq!((img.width, img.height, img.channels), (2, 2, 1));
        assert_eq!(img.data(), &[0, 64, 128, 255]);
    }

    #[test]
    fn decode_ascii_pgm_with_comments() {
        let bytes = b"P2\n# a comment\n3 1\n# another\n255\n0 128 255\n";
        let img = decode(bytes).unwrap();
        assert_eq!(img.data(), &[0, 128, 255]);
    }

    #[test]
    fn decode_binary_ppm() {
        let mut bytes = b"P6 2 1 255\n".to_vec();
        bytes.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
        let img = decode(&bytes).unwrap();
        assert_eq!(img.channels, 3);
        assert_eq!(img.pixel(1, 0).unwrap(), &[0, 0, 255]);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = decode(b"P7\n1 1\n255\n\x00").unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_wide_maxval() {
        let err = decode(b"P5\n1 1\n65535\n\x00\x00").unwrap_err();
        assert!(matches!(err, IoError::UnsupportedBitDepth(_)));
    }

    #[test]
    fn rejects_truncated_data() {
        let bytes = b"P5\n4 4\n255\n\x00\x01";
        let err = decode(bytes).unwrap_err();
        assert!(matches!(err, IoError::InvalidFile(_)));
    }

    #[test]
    fn rejects_ascii_sample_over_maxval() {
        let err = decode(b"P2\n1 1\n15\n99\n").unwrap_err();
        assert!(matches!(err, IoError::InvalidFile(_)));
    }

    #[test]
    fn write_read_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.ppm");

        let img = Image::from_raw(vec![10, 20, 30, 40, 50, 60], 2, 1, 3).unwrap();
        write(&path, &img).unwrap();

        let back = read(&path).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let err = read("/nonexistent/nope.pgm").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
