//! Read magic file(s) on user's computer
//!
//! A `Magdir` is a directory of magic files, like file(1)'s `Magdir`. Each
//! file is compiled as its own source, in file name order.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::{MagicError, Result};
use super::ruleset::{split_lines, RuleSet, RuleSetBuilder};

pub struct Magdir {
	root: PathBuf,
}

impl Magdir {
	pub fn new<P: AsRef<Path>>(root: P) -> Magdir {
		Magdir { root: root.as_ref().to_path_buf() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Regular files directly inside the directory, sorted by name.
	pub fn files(&self) -> Result<Vec<PathBuf>> {
		let mut out = Vec::<PathBuf>::new();
		for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1).sort_by_file_name() {
			let entry = entry.map_err(|e| MagicError::Io(e.into()))?;
			if entry.file_type().is_file() {
				out.push(entry.into_path());
			}
		}
		Ok(out)
	}

	/// Compile a single file. Any error in it is returned.
	pub fn open(&self, name: &str) -> Result<RuleSet> {
		let path = self.root.join(name);
		if !path.is_file() {
			return Err(MagicError::NoSuchSource(name.to_string()));
		}

		let mut builder = RuleSetBuilder::new();
		add_file(&mut builder, &path)?;
		Ok(builder.build())
	}

	/// Compile every file. Files that fail to compile are logged and left out.
	pub fn rules(&self) -> Result<RuleSet> {
		let mut builder = RuleSetBuilder::new();
		for path in self.files()? {
			match add_file(&mut builder, &path) {
				Ok(()) => debug!("loaded {}", path.display()),
				Err(e) => warn!("skipping {}: {}", path.display(), e)
			}
		}
		Ok(builder.build())
	}
}

fn add_file(builder: &mut RuleSetBuilder, path: &Path) -> Result<()> {
	let b = std::fs::read(path)?;
	let origin = path.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string());
	builder.add_source(&origin, split_lines(&b))?;
	Ok(())
}
