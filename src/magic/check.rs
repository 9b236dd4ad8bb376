use log::trace;
use petgraph::prelude::*;

use crate::cursor::Cursor;
use crate::error::{MagicError, Result};
use super::pattern::PatternKind;
use super::ruleset::RuleSet;
use super::MatchResult;

/// How many `use`/`indirect` hops a single match may take.
pub const MAX_RECURSION: usize = 50;

fn check_depth(depth: usize) -> Result<()> {
	if depth >= MAX_RECURSION {
		return Err(MagicError::RecursionLimit(MAX_RECURSION));
	}
	Ok(())
}

/// Test every top-level rule, each with a fresh cursor over `file`.
pub fn from_u8<'r>(
	ruleset: &'r RuleSet,
	file: &[u8],
	result: &MatchResult<'r>,
	depth: usize
) -> Result<Vec<MatchResult<'r>>> {
	let mut out = Vec::<MatchResult>::new();

	for &root in ruleset.roots() {
		let mut cursor = Cursor::new(file);
		out.extend(from_u8_walker(ruleset, root, &mut cursor, result, depth)?);
	}

	Ok(out)
}

/// Test one rule and, if it matches, everything under it.
///
/// Returns one result per leaf that was reached. A rule whose children all
/// fail is itself a leaf.
pub fn from_u8_walker<'r>(
	ruleset: &'r RuleSet,
	node: NodeIndex,
	cursor: &mut Cursor,
	result: &MatchResult<'r>,
	depth: usize
) -> Result<Vec<MatchResult<'r>>> {
	let rule = ruleset.rule(node);

	if rule.offset.is_relative() || !rule.offset.seek(cursor) {
		return Ok(Vec::new());
	}

	match rule.pattern.kind {
		PatternKind::Use(ref name) => return use_named(ruleset, name, cursor, result, depth),
		PatternKind::Indirect => {
			check_depth(depth)?;
			return from_u8(ruleset, cursor.rest(), result, depth + 1);
		},
		_ => {}
	}

	if !rule.pattern.matches(cursor) {
		return Ok(Vec::new());
	}
	trace!("matched {} {} at {:?}", rule.pattern.type_name, rule.pattern.value, cursor.position());

	descend(ruleset, node, cursor, result, depth)
}

/// Push `node` onto the stack and try its children. With no child
/// matching, `node` is the leaf.
fn descend<'r>(
	ruleset: &'r RuleSet,
	node: NodeIndex,
	cursor: &mut Cursor,
	result: &MatchResult<'r>,
	depth: usize
) -> Result<Vec<MatchResult<'r>>> {
	let result = result.add(ruleset.rule(node));
	let deeper = visit_children(ruleset, node, cursor, &result, depth)?;
	if deeper.is_empty() {
		Ok(vec![result])
	} else {
		Ok(deeper)
	}
}

/// Every child starts from the same cursor its parent left behind.
fn visit_children<'r>(
	ruleset: &'r RuleSet,
	node: NodeIndex,
	cursor: &mut Cursor,
	result: &MatchResult<'r>,
	depth: usize
) -> Result<Vec<MatchResult<'r>>> {
	let mut out = Vec::<MatchResult>::new();

	for child in ruleset.children(node) {
		let found = cursor.restore(|c| from_u8_walker(ruleset, child, c, result, depth))?;
		out.extend(found);
	}

	Ok(out)
}

/// Enter a `name` rule as if its test had passed at the current position.
///
/// A bare `name` line only groups its children, so it stays off the stack
/// and contributes nothing when no child matches. One that carries a
/// message or `!:` extras is pushed like any matched rule.
fn use_named<'r>(
	ruleset: &'r RuleSet,
	name: &str,
	cursor: &mut Cursor,
	result: &MatchResult<'r>,
	depth: usize
) -> Result<Vec<MatchResult<'r>>> {
	// Byte-swapped use; not supported
	if name.starts_with("\\^") || name.starts_with('^') {
		return Ok(Vec::new());
	}

	let target = ruleset.lookup(name)
		.ok_or_else(|| MagicError::UnknownName(name.to_string()))?;
	check_depth(depth)?;

	cursor.restore(|c| {
		c.mark_base();
		let named = ruleset.rule(target);
		if !named.offset.seek(c) {
			return Ok(Vec::new());
		}
		if named.message().is_none() && named.extras.is_empty() {
			return visit_children(ruleset, target, c, result, depth + 1);
		}
		descend(ruleset, target, c, result, depth + 1)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn mimes(rules: &str, buf: &[u8]) -> Vec<String> {
		let set = RuleSet::from_lines(rules.lines()).unwrap();
		set.matches(buf).unwrap()
			.iter()
			.filter_map(|r| r.mime_type().map(String::from))
			.collect()
	}

	#[test]
	fn leaf_when_children_fail() {
		let rules = "0 string AB letters\n!:mime text/x-ab\n>2 string Z zed\n!:mime text/x-abz\n";
		assert_eq!(mimes(rules, b"ABZ"), vec!["text/x-abz"]);
		assert_eq!(mimes(rules, b"ABC"), vec!["text/x-ab"]);
		assert!(mimes(rules, b"XY").is_empty());
	}

	#[test]
	fn every_matching_child_is_reported() {
		let rules = "0 byte x\n>0 string A a\n!:mime a/a\n>1 string B b\n!:mime b/b\n";
		assert_eq!(mimes(rules, b"AB"), vec!["a/a", "b/b"]);
	}

	#[test]
	fn use_rebases_offsets() {
		let rules = "0 name pair\n>0 string OK ok\n!:mime x/ok\n\n0 string HEAD\n>4 use pair\n";
		assert_eq!(mimes(rules, b"HEADOK"), vec!["x/ok"]);
		assert!(mimes(rules, b"HEAD..OK").is_empty());
	}

	#[test]
	fn labelled_name_lands_on_the_stack() {
		let rules = concat!(
			"0 name chunk chunk\n!:mime x/chunk\n>0 string OK ok\n!:mime x/ok\n",
			"0 string HEAD head\n>4 use chunk\n",
		);
		let set = RuleSet::from_lines(rules.lines()).unwrap();

		let found = set.matches(b"HEADOK").unwrap();
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].stack().len(), 3);
		assert_eq!(found[0].full_message(), "head chunk ok");
		assert_eq!(found[0].mime_type(), Some("x/ok"));

		let found = set.matches(b"HEAD??").unwrap();
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].full_message(), "head chunk");
		assert_eq!(found[0].mime_type(), Some("x/chunk"));
	}

	#[test]
	fn far_use_offset_is_past_the_end() {
		let rules = "0 name far\n>0 string A a\n>-1 ubyte x last\n0x7fffffffffffffff use far\n";
		let set = RuleSet::from_lines(rules.lines()).unwrap();
		let found = set.matches(b"AB").unwrap();
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].full_message(), "last");
	}

	#[test]
	fn swapped_use_never_matches() {
		let rules = "0 name pair\n>0 byte x\n!:mime x/any\n0 byte x\n>0 use \\^pair\n";
		assert!(mimes(rules, b"a").is_empty());
	}

	#[test]
	fn unknown_name_is_an_error() {
		let set = RuleSet::from_lines(vec!["0 use missing"]).unwrap();
		match set.matches(b"data") {
			Err(MagicError::UnknownName(name)) => assert_eq!(name, "missing"),
			other => panic!("unexpected {:?}", other)
		}
	}

	#[test]
	fn self_use_hits_the_limit() {
		let set = RuleSet::from_lines(vec!["0 name loop", ">0 use loop", "0 use loop"]).unwrap();
		match set.matches(b"data") {
			Err(MagicError::RecursionLimit(n)) => assert_eq!(n, MAX_RECURSION),
			other => panic!("unexpected {:?}", other)
		}
	}

	#[test]
	fn indirect_reruns_everything() {
		let rules = "0 string ZZ inner\n!:mime x/inner\n0 string OUT outer\n>3 indirect x\n";
		assert_eq!(mimes(rules, b"OUTZZ"), vec!["x/inner"]);
	}
}
