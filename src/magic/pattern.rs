//! Typed tests against the bytes under a cursor.
//!
//! Everything that can be worked out from the rule text (operators, masks,
//! escaped strings, regex windows) is compiled once here. Matching only
//! decodes bytes and compares.

use std::convert::TryFrom;

use memchr::memmem;
use regex::bytes::{Regex, RegexBuilder};

use crate::cursor::Cursor;
use crate::error::RuleError;
use crate::parse::magic;

/// Bytes scanned by a `regex` rule without a byte count.
pub const REGEX_WINDOW: usize = 8196;

/// Types we know about but do not evaluate. They never match.
const UNSUPPORTED: &[&str] = &[
	"pstring", "guid", "der", "lestring16", "bestring16",
	"date", "ldate", "qdate", "qldate", "qwdate",
	"ledate", "bedate", "leldate", "beldate", "leqdate", "beqdate",
	"leqldate", "beqldate", "leqwdate", "beqwdate",
	"lemsdosdate", "bemsdosdate", "lemsdostime", "bemsdostime",
	"float", "befloat", "lefloat", "double", "bedouble", "ledouble",
	"beid3", "leid3"
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
	Little,
	Big,
}

/// Width, signedness and byte order of a numeric type.
///
/// Types without an `le`/`be` prefix are read little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericType {
	pub width: usize,
	pub signed: bool,
	pub endian: Endian,
}

impl NumericType {
	pub fn from_name(name: &str) -> Option<NumericType> {
		let (signed, name) = match name.strip_prefix('u') {
			Some(rest) => (false, rest),
			None => (true, name)
		};
		let (endian, explicit, name) = if let Some(rest) = name.strip_prefix("le") {
			(Endian::Little, true, rest)
		} else if let Some(rest) = name.strip_prefix("be") {
			(Endian::Big, true, rest)
		} else {
			(Endian::Little, false, name)
		};
		let width = match name {
			"byte" if !explicit => 1,
			"short" => 2,
			"long" => 4,
			"quad" => 8,
			_ => return None
		};
		Some(NumericType { width, signed, endian })
	}

	pub fn bits(&self) -> u32 {
		self.width as u32 * 8
	}

	fn decode(&self, bytes: &[u8]) -> i128 {
		let raw = match self.endian {
			Endian::Big => bytes.iter().fold(0u64, |acc, &b| acc << 8 | u64::from(b)),
			Endian::Little => bytes.iter().rev().fold(0u64, |acc, &b| acc << 8 | u64::from(b))
		};
		if self.signed {
			let shift = 64 - self.bits();
			i128::from(((raw << shift) as i64) >> shift)
		} else {
			i128::from(raw)
		}
	}
}

/// `&mask` or `%modulo` applied to a decoded value before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOp {
	Mask(i128),
	Modulo(i128),
}

impl TypeOp {
	fn apply(self, value: i128) -> i128 {
		match self {
			TypeOp::Mask(m) => value & m,
			// Floored: the result takes the sign of the divisor.
			TypeOp::Modulo(m) => {
				let r = value % m;
				if r != 0 && (r < 0) != (m < 0) { r + m } else { r }
			}
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
	Eq,
	Lt,
	Gt,
	Ne,
	/// `&`: every bit of the operand is set
	AllSet,
	/// `^`: no bit of the operand is set
	AllClear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
	/// `x`
	Any,
	Test(CmpOp, i128),
}

impl Comparison {
	/// Compile a numeric test value for a type of `bits` width.
	pub fn compile(value: &str, bits: u32, signed: bool, masked: bool) -> Result<Comparison, RuleError> {
		if value == "x" {
			return Ok(Comparison::Any);
		}

		let (op, lit) = magic::comparison(value)?;
		let op = match op {
			None | Some('=') => CmpOp::Eq,
			Some('<') => CmpOp::Lt,
			Some('>') => CmpOp::Gt,
			Some('!') => CmpOp::Ne,
			Some('&') => CmpOp::AllSet,
			Some('^') => CmpOp::AllClear,
			Some(_) => return Err(RuleError::BadComparison(value.to_string()))
		};

		let width_mask = (1i128 << bits) - 1;
		let mut operand = lit.value;
		// 0x80 on a signed byte means -128
		if lit.hex && signed && operand & (1i128 << (bits - 1)) != 0 {
			operand = !(width_mask ^ operand);
		}
		if masked {
			operand &= width_mask;
		}

		Ok(Comparison::Test(op, operand))
	}

	pub fn test(&self, value: i128) -> bool {
		match *self {
			Comparison::Any => true,
			Comparison::Test(op, c) => match op {
				CmpOp::Eq => value == c,
				CmpOp::Lt => value < c,
				CmpOp::Gt => value > c,
				CmpOp::Ne => value != c,
				CmpOp::AllSet => value & c == c,
				CmpOp::AllClear => value & c == 0
			}
		}
	}
}

/// How far ahead a `regex` rule looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
	Bytes(usize),
	/// A line count such as `regex/1l`. Scans `REGEX_WINDOW` bytes.
	Lines,
	Default,
	/// A flag we cannot size. The rule never matches.
	Unrecognized,
}

impl Window {
	fn from_flags(flags: &[String]) -> Window {
		match flags.first() {
			None => Window::Default,
			Some(f) if f.ends_with('l') => Window::Lines,
			Some(f) if !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()) => {
				f.parse().map(Window::Bytes).unwrap_or(Window::Unrecognized)
			},
			Some(_) => Window::Unrecognized
		}
	}

	pub fn size(self) -> Option<usize> {
		match self {
			Window::Bytes(n) => Some(n),
			Window::Lines | Window::Default => Some(REGEX_WINDOW),
			Window::Unrecognized => None
		}
	}
}

#[derive(Debug, Clone)]
pub enum PatternKind {
	Numeric(NumericType, Comparison),
	/// Tests the cursor's offset itself.
	Offset(Comparison),
	String {
		negate: bool,
		bytes: Vec<u8>,
	},
	Regex(Window, Regex),
	Search {
		range: usize,
		/// Length of the operand as written, escapes and all. The scan
		/// window is sized from this, not from `needle`.
		span: usize,
		needle: Vec<u8>,
	},
	Name(String),
	Use(String),
	Indirect,
	/// `default` and `clear`
	Fallback,
	Unsupported(String),
}

/// The type, operators, flags and test value of a rule.
#[derive(Debug, Clone)]
pub struct Pattern {
	pub type_name: String,
	pub type_ops: Vec<TypeOp>,
	/// Everything after `/` in the type field. String flags such as `c`
	/// (case) and `W` (blanks) are kept but not enforced.
	pub flags: Vec<String>,
	/// The test value, decoded lossily. The compiled `kind` keeps raw bytes.
	pub value: String,
	pub kind: PatternKind,
}

/// Turn raw bytes back into regex source. Non-ASCII bytes become `\xNN`,
/// which a bytes regex without Unicode matches literally.
fn regex_source(bytes: &[u8]) -> String {
	let mut out = String::with_capacity(bytes.len());
	for &b in bytes {
		if b.is_ascii() && b != 0 {
			out.push(b as char);
		} else {
			out.push_str(&format!("\\x{:02x}", b));
		}
	}
	out
}

impl Pattern {
	/// Compile a type field (`lelong&0xff`, `string/c`, ...) and its test value.
	///
	/// `raw` is the test field exactly as it appeared in the definition line.
	pub fn compile(type_field: &str, raw: &[u8]) -> Result<Pattern, RuleError> {
		let lossy = String::from_utf8_lossy(raw);
		let value: &str = &lossy;
		let expr = magic::type_expr(type_field)?;

		let mut type_ops = Vec::with_capacity(expr.ops.len());
		for &(op, lit) in expr.ops.iter() {
			type_ops.push(match op {
				'&' => TypeOp::Mask(lit.value),
				_ if lit.value == 0 => return Err(RuleError::ZeroModulo(type_field.to_string())),
				_ => TypeOp::Modulo(lit.value)
			});
		}
		let flags: Vec<String> = expr.flags.iter().map(|f| f.to_string()).collect();
		let masked = !type_ops.is_empty();

		let kind = match expr.name {
			"string" | "ustring" => {
				let (negate, text) = match raw.split_first() {
					Some((b'!', rest)) => (true, rest),
					Some((b'=', rest)) => (false, rest),
					_ => (false, raw)
				};
				PatternKind::String { negate, bytes: magic::unescape(text) }
			},
			"regex" => {
				let source = regex_source(&magic::unescape(raw));
				let regex = RegexBuilder::new(&source)
					.unicode(false)
					.multi_line(true)
					.build()
					.map_err(|source| RuleError::BadRegex { pattern: value.to_string(), source })?;
				PatternKind::Regex(Window::from_flags(&flags), regex)
			},
			"search" => {
				let range = flags.iter()
					.filter_map(|f| magic::number(f))
					.next()
					.unwrap_or(1);
				PatternKind::Search {
					range: usize::try_from(range).unwrap_or(usize::MAX),
					span: raw.len(),
					needle: magic::unescape(raw)
				}
			},
			"offset" => PatternKind::Offset(Comparison::compile(value, 64, true, masked)?),
			"name" => PatternKind::Name(value.to_string()),
			"use" => PatternKind::Use(value.to_string()),
			"indirect" => PatternKind::Indirect,
			"default" | "clear" => PatternKind::Fallback,
			name if UNSUPPORTED.contains(&name) => PatternKind::Unsupported(name.to_string()),
			name => match NumericType::from_name(name) {
				Some(ty) => PatternKind::Numeric(ty, Comparison::compile(value, ty.bits(), ty.signed, masked)?),
				None => return Err(RuleError::UnknownType(name.to_string()))
			}
		};

		Ok(Pattern {
			type_name: expr.name.to_string(),
			type_ops,
			flags,
			value: value.to_string(),
			kind
		})
	}

	fn apply_ops(&self, value: i128) -> i128 {
		self.type_ops.iter().fold(value, |acc, op| op.apply(acc))
	}

	/// Run the test with the cursor at the rule's offset.
	///
	/// `name`, `use` and `indirect` are handled by the tree walker and never
	/// match here.
	pub fn matches(&self, cursor: &mut Cursor) -> bool {
		if self.value == "x" {
			return true;
		}
		if cursor.is_eof() {
			return false;
		}

		match self.kind {
			PatternKind::Numeric(ty, cmp) => match cursor.read_exact(ty.width) {
				Some(bytes) => cmp.test(self.apply_ops(ty.decode(bytes))),
				None => false
			},
			PatternKind::Offset(cmp) => cmp.test(self.apply_ops(i128::from(cursor.offset()))),
			PatternKind::String { negate, ref bytes } => {
				(cursor.read(bytes.len()) == bytes.as_slice()) != negate
			},
			// TODO: move the cursor past the match so children can continue from it
			PatternKind::Regex(window, ref regex) => match window.size() {
				Some(n) => regex.is_match(cursor.peek(n)),
				None => false
			},
			PatternKind::Search { range, span, ref needle } => {
				let window = cursor.peek(span.saturating_add(range).saturating_sub(1));
				memmem::find(window, needle).is_some()
			},
			PatternKind::Fallback => true,
			PatternKind::Name(_)
			| PatternKind::Use(_)
			| PatternKind::Indirect
			| PatternKind::Unsupported(_) => false
		}
	}
}
