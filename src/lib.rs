//! `magic_tree` identifies files by walking trees of file(1) style magic rules.
//!
//! # About
//! A magic database is a list of text rules. Each rule reads something at an
//! offset (a number, a string, a regex window...) and tests it. Rules nest: a
//! child is only tried once its parent has matched, so a database reads as a
//! forest of decision trees. `magic_tree` compiles those rules into a
//! `petgraph` graph and walks it against a byte buffer, reporting every chain
//! of rules that matched along with the MIME types and messages they carry.
//!
//! # Features
//! - Numeric, string, regex, search and offset tests, with masks, modulo and
//!   the usual comparison operators.
//! - Exact, end-relative and indirect offsets.
//! - Named rules (`name`/`use`) and full re-entry through `indirect`.
//! - A bundled database for common formats, or load your own `Magdir`.
//!
//! # Feature flags
//! `cli`:        Enable building of `tmagic` binary
//!
//! # Example
//! ```rust
//! // Load a GIF file
//! let input: &[u8] = include_bytes!("../tests/image/gif");
//!
//! // Find the MIME type of the GIF
//! let result = magic_tree::from_u8(input);
//! assert_eq!(result, Some("image/gif".to_string()));
//!
//! // Check if the MIME and the file are a match
//! let result = magic_tree::match_u8("image/gif", input);
//! assert_eq!(result, true);
//! ```
//!
//! Your own rules work the same way:
//!
//! ```rust
//! use magic_tree::RuleSet;
//!
//! let rules = RuleSet::from_lines(vec![
//!     "0 string GIF8 GIF image data",
//!     "!:mime image/gif",
//! ]).unwrap();
//! let best = rules.best(b"GIF89a").unwrap().unwrap();
//! assert_eq!(best.mime_type(), Some("image/gif"));
//! assert_eq!(best.full_message(), "GIF image data");
//! ```

#[macro_use] extern crate lazy_static;

use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;

mod cursor;
mod error;
mod parse;
pub mod magic;

pub use crate::cursor::Cursor;
pub use crate::error::{MagicError, Result, RuleError};
pub use crate::magic::{MagicRule, MatchResult};
pub use crate::magic::ruleset::{RuleSet, RuleSetBuilder};
pub use crate::magic::sys::Magdir;

/// How much of a file `from_filepath` and `match_filepath` look at.
pub const SCAN_LEN: usize = 16 * 1024;

/// Read at most `len` bytes from the start of a file.
pub fn read_bytes(filepath: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let f = File::open(filepath)?;
    let r = BufReader::new(f);
    let mut b = Vec::<u8>::with_capacity(len.min(SCAN_LEN));
    r.take(len as u64).read_to_end(&mut b)?;
    Ok(b)
}

/// Checks if the given bytestream matches the given MIME type.
///
/// True if any chain of bundled rules matching the bytes carries that MIME
/// type, not only the best one.
///
/// # Examples
/// ```rust
/// // Load a GIF file
/// let input: &[u8] = include_bytes!("../tests/image/gif");
///
/// // Check if the MIME and the file are a match
/// let result = magic_tree::match_u8("image/gif", input);
/// assert_eq!(result, true);
/// ```
pub fn match_u8(mimetype: &str, bytes: &[u8]) -> bool {
    magic::builtin::check::match_u8(mimetype, bytes)
}

/// Gets the type of a file from a byte stream.
///
/// Returns the MIME type of the deepest matching rule chain in the bundled
/// database, or `None` if no rule knows the data.
///
/// # Examples
/// ```rust
/// // Load a GIF file
/// let input: &[u8] = include_bytes!("../tests/image/gif");
///
/// // Find the MIME type of the GIF
/// let result = magic_tree::from_u8(input);
/// assert_eq!(result, Some("image/gif".to_string()));
/// ```
pub fn from_u8(bytes: &[u8]) -> Option<String> {
    magic::builtin::check::from_u8(bytes)
}

/// Check if the given filepath matches the given MIME type.
///
/// Only the first `SCAN_LEN` bytes are read. A file that cannot be read
/// matches nothing.
///
/// # Examples
/// ```rust
/// use std::path::Path;
///
/// // Get path to a GIF file
/// let path: &Path = Path::new("tests/image/gif");
///
/// // Check if the MIME and the file are a match
/// let result = magic_tree::match_filepath("image/gif", path);
/// assert_eq!(result, true);
/// ```
pub fn match_filepath(mimetype: &str, filepath: &Path) -> bool {
    magic::builtin::check::match_filepath(mimetype, filepath)
}

/// Gets the type of a file from a filepath.
///
/// Does not look at file name or extension, just the contents.
///
/// # Examples
/// ```rust
/// use std::path::Path;
///
/// // Get path to a GIF file
/// let path: &Path = Path::new("tests/image/gif");
///
/// // Find the MIME type of the GIF
/// let result = magic_tree::from_filepath(path);
/// assert_eq!(result, Some("image/gif".to_string()));
/// ```
pub fn from_filepath(filepath: &Path) -> Option<String> {
    magic::builtin::check::from_filepath(filepath)
}

/// Every MIME type the bundled database can report, sorted.
pub fn get_supported() -> Vec<String> {
    magic::builtin::init::get_supported()
}
