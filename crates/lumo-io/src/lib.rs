//! Image I/O for the lumo tools - PGM and PPM (netpbm) support.
//!
//! The histogram pipeline works on 8-bit grayscale and RGB images, so
//! only the netpbm family is supported: P2/P5 (PGM) and P3/P6 (PPM),
//! maxval up to 255. Format detection goes by magic bytes, never by
//! file extension.

pub mod error;
pub mod pnm;

pub use error::{IoError, IoResult};
pub use pnm::{read, write};
