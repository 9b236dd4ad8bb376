//! Where a rule reads its bytes from.

use crate::cursor::Cursor;
use crate::error::RuleError;
use crate::parse;

/// Integer type read by an indirect offset, from the letter after `.`/`,`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndirectType {
	/// `b` `c` `B` `C`
	Byte,
	/// `h` `s`
	LeShort,
	/// `H` `S`
	BeShort,
	/// `l`. Reads two bytes, not four.
	LeLong,
	/// `L`. Reads two bytes, not four.
	BeLong,
	/// `I`, the ID3 synchsafe integer
	Synchsafe,
}

impl IndirectType {
	pub fn from_code(code: char) -> Option<IndirectType> {
		match code {
			'b' | 'c' | 'B' | 'C' => Some(IndirectType::Byte),
			'h' | 's' => Some(IndirectType::LeShort),
			'H' | 'S' => Some(IndirectType::BeShort),
			'l' => Some(IndirectType::LeLong),
			'L' => Some(IndirectType::BeLong),
			'I' => Some(IndirectType::Synchsafe),
			_ => None
		}
	}

	fn read(self, cursor: &mut Cursor, signed: bool) -> Option<i64> {
		match self {
			IndirectType::Byte => {
				let b = cursor.read_exact(1)?;
				if signed {
					Some(i64::from(b[0] as i8))
				} else {
					Some(i64::from(b[0]))
				}
			},
			IndirectType::LeShort | IndirectType::LeLong => {
				let b = cursor.read_exact(2)?;
				Some(i64::from(i16::from_le_bytes([b[0], b[1]])))
			},
			IndirectType::BeShort | IndirectType::BeLong => {
				let b = cursor.read_exact(2)?;
				Some(i64::from(i16::from_be_bytes([b[0], b[1]])))
			},
			IndirectType::Synchsafe => {
				let b = cursor.read_exact(4)?;
				Some(b.iter().fold(0, |acc, &x| acc << 7 | i64::from(x & 0x7f)))
			}
		}
	}
}

/// `(base.type+adjust)`: read an integer at `base`, add `adjust`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indirect {
	pub base: i64,
	/// Written with `,` instead of `.`; only changes how a single byte is read.
	pub signed: bool,
	pub kind: IndirectType,
	pub adjust: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offset {
	Exact(i64),
	Indirect(Indirect),
	/// `&N` offsets from the end of the parent match. Never resolved.
	Relative(String),
}

impl Offset {
	pub fn parse(text: &str) -> Result<Offset, RuleError> {
		parse::magic::offset(text)
	}

	pub fn is_relative(&self) -> bool {
		match self {
			Offset::Relative(_) => true,
			_ => false
		}
	}

	/// Work out the position to seek to. Indirect offsets move the cursor
	/// while reading their pointer, but never touch its base.
	pub fn position(&self, cursor: &mut Cursor) -> Option<i64> {
		match self {
			Offset::Exact(n) => Some(*n),
			Offset::Indirect(ind) => {
				cursor.seek_absolute(ind.base);
				if cursor.is_eof() {
					return None;
				}
				ind.kind.read(cursor, ind.signed)?.checked_add(ind.adjust)
			},
			Offset::Relative(_) => None
		}
	}

	/// Seek the cursor to this offset. `false` if it could not be resolved.
	pub fn seek(&self, cursor: &mut Cursor) -> bool {
		match self.position(cursor) {
			Some(pos) => {
				cursor.seek_absolute(pos);
				true
			},
			None => false
		}
	}
}
