use std::path::Path;

use log::warn;
use crate::{read_bytes, SCAN_LEN};

/// Best MIME type for the bytes, if any bundled rule knows them.
pub fn from_u8(file: &[u8]) -> Option<String> {
	match super::ALLRULES.best(file) {
		Ok(best) => best.and_then(|r| r.mime_type()).map(String::from),
		Err(e) => {
			warn!("bundled magic: {}", e);
			None
		}
	}
}

/// Whether any rule chain that matches the bytes ends in `mimetype`.
pub fn match_u8(mimetype: &str, file: &[u8]) -> bool {
	match super::ALLRULES.mime_types(file) {
		Ok(mimes) => mimes.contains(&mimetype),
		Err(e) => {
			warn!("bundled magic: {}", e);
			false
		}
	}
}

pub fn from_filepath(filepath: &Path) -> Option<String> {
	let b = match read_bytes(filepath, SCAN_LEN) {
		Ok(x) => x,
		Err(_) => return None
	};

	from_u8(b.as_slice())
}

pub fn match_filepath(mimetype: &str, filepath: &Path) -> bool {
	let b = match read_bytes(filepath, SCAN_LEN) {
		Ok(x) => x,
		Err(_) => return false
	};

	match_u8(mimetype, b.as_slice())
}
