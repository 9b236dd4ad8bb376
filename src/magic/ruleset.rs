use std::path::Path;

use fnv::FnvHashMap;
use log::{debug, trace};
use petgraph::prelude::*;

use crate::error::{MagicError, Result, RuleError};
use crate::parse::magic;
use super::offset::Offset;
use super::pattern::{Pattern, PatternKind};
use super::{check, MagicRule, MatchResult};

/// A parsed rule and how many `>` it was nested under.
type Entry = (usize, MagicRule);

/// Split raw file contents into lines. Lines stay bytes; test values in
/// magic files are not always valid UTF-8.
pub fn split_lines(b: &[u8]) -> impl Iterator<Item = &[u8]> {
	b.split(|&c| c == b'\n')
}

fn trim_eol(mut line: &[u8]) -> &[u8] {
	while let Some((&last, rest)) = line.split_last() {
		if last != b'\n' && last != b'\r' {
			break;
		}
		line = rest;
	}
	line
}

fn text(field: &[u8], err: fn(String) -> RuleError) -> std::result::Result<&str, RuleError> {
	std::str::from_utf8(field).map_err(|_| err(String::from_utf8_lossy(field).into_owned()))
}

// Offset, type, test, message
fn parse_rule(line: &[u8]) -> std::result::Result<Entry, RuleError> {
	let fields = magic::fields(line);
	let (depth, offset) = magic::nesting(text(fields[0], RuleError::BadOffset)?);
	let type_field = text(fields.get(1).ok_or(RuleError::MissingType)?, RuleError::UnknownType)?;
	let value = fields.get(2).copied().unwrap_or(&b""[..]);
	let message = fields.get(3)
		.filter(|m| !m.is_empty())
		.map(|m| String::from_utf8_lossy(m).into_owned());

	let rule = MagicRule {
		offset: Offset::parse(offset)?,
		pattern: Pattern::compile(type_field, value)?,
		message,
		extras: FnvHashMap::default()
	};
	Ok((depth, rule))
}

/// Parse every line of one source. If any line fails, none of it is kept.
fn parse_entries<I, S>(origin: &str, lines: I) -> Result<Vec<Entry>>
where
	I: IntoIterator<Item = S>,
	S: AsRef<[u8]>
{
	let mut entries = Vec::<Entry>::new();

	for (idx, line) in lines.into_iter().enumerate() {
		let line = trim_eol(line.as_ref());
		let fail = |source| MagicError::Rule {
			origin: origin.to_string(),
			line: idx + 1,
			source
		};

		if line.first() == Some(&b'#') || line.iter().all(u8::is_ascii_whitespace) {
			continue;
		}

		if line.first() == Some(&b'!') {
			let line = String::from_utf8_lossy(line);
			let (key, value) = magic::continuation(&line).map_err(fail)?;
			let (_, rule) = entries.last_mut().ok_or_else(|| fail(RuleError::OrphanContinuation))?;
			rule.extras.insert(key.to_string(), value.to_string());
			continue;
		}

		entries.push(parse_rule(line).map_err(fail)?);
	}

	Ok(entries)
}

/// Hang each entry off the closest open rule with a smaller depth.
fn gen_graph(graph: &mut DiGraph<MagicRule, u32>, roots: &mut Vec<NodeIndex>, entries: Vec<Entry>) {
	let mut rulestack = Vec::<NodeIndex>::new();

	for (depth, rule) in entries {
		let node = graph.add_node(rule);
		rulestack.truncate(depth);
		match rulestack.last() {
			Some(&parent) => { graph.add_edge(parent, node, 1); },
			None => roots.push(node)
		}
		rulestack.push(node);
	}
}

/// Collects sources into one `RuleSet`.
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
	graph: DiGraph<MagicRule, u32>,
	roots: Vec<NodeIndex>,
}

impl RuleSetBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Compile one named source. On error nothing from it is added and the
	/// builder stays usable.
	pub fn add_source<I, S>(&mut self, origin: &str, lines: I) -> Result<&mut Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<[u8]>
	{
		let entries = parse_entries(origin, lines)?;
		debug!("{}: compiled {} rules", origin, entries.len());
		gen_graph(&mut self.graph, &mut self.roots, entries);
		Ok(self)
	}

	pub fn build(self) -> RuleSet {
		let mut names = FnvHashMap::<String, NodeIndex>::default();
		for &root in self.roots.iter() {
			if let PatternKind::Name(ref name) = self.graph[root].pattern.kind {
				trace!("named rule {}", name);
				names.insert(name.clone(), root);
			}
		}

		RuleSet {
			graph: self.graph,
			roots: self.roots,
			names
		}
	}
}

/// A compiled magic database.
///
/// Rules are nodes of a `DiGraph`; edges point from parent to child. The
/// name table for `use` is filled in once by the builder, so a `RuleSet` can
/// be shared across threads as is.
#[derive(Debug, Default)]
pub struct RuleSet {
	graph: DiGraph<MagicRule, u32>,
	roots: Vec<NodeIndex>,
	names: FnvHashMap<String, NodeIndex>,
}

impl RuleSet {
	pub fn from_lines<I, S>(lines: I) -> Result<RuleSet>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<[u8]>
	{
		let mut builder = RuleSetBuilder::new();
		builder.add_source("<lines>", lines)?;
		Ok(builder.build())
	}

	pub fn from_u8(b: &[u8]) -> Result<RuleSet> {
		let mut builder = RuleSetBuilder::new();
		builder.add_source("<bytes>", split_lines(b))?;
		Ok(builder.build())
	}

	/// Loads the given magic file
	pub fn from_filepath(filepath: &Path) -> Result<RuleSet> {
		let b = std::fs::read(filepath)?;
		let mut builder = RuleSetBuilder::new();
		builder.add_source(&filepath.to_string_lossy(), split_lines(&b))?;
		Ok(builder.build())
	}

	/// Top-level rules, in definition order.
	pub fn roots(&self) -> &[NodeIndex] {
		&self.roots
	}

	pub fn len(&self) -> usize {
		self.graph.node_count()
	}

	pub fn is_empty(&self) -> bool {
		self.graph.node_count() == 0
	}

	pub fn rule(&self, node: NodeIndex) -> &MagicRule {
		&self.graph[node]
	}

	/// Children of a rule, in definition order.
	pub fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
		let mut children: Vec<NodeIndex> = self.graph
			.neighbors_directed(node, Outgoing)
			.collect();
		children.sort_unstable();
		children
	}

	pub fn lookup(&self, name: &str) -> Option<NodeIndex> {
		self.names.get(name).copied()
	}

	/// Every rule chain that matches `file`.
	///
	/// Nothing matching is an empty list, not an error. Errors mean the
	/// database itself is broken (a `use` of an unknown name, or endless
	/// `use`/`indirect` nesting).
	pub fn matches<'r>(&'r self, file: &[u8]) -> Result<Vec<MatchResult<'r>>> {
		check::from_u8(self, file, &MatchResult::new(), 0)
	}

	/// The result with a MIME type and the deepest rule chain. Ties go to
	/// the rule defined first.
	pub fn best<'r>(&'r self, file: &[u8]) -> Result<Option<MatchResult<'r>>> {
		let mut best: Option<MatchResult<'r>> = None;
		for result in self.matches(file)? {
			if result.mime_type().is_none() {
				continue;
			}
			let deeper = best.as_ref()
				.map_or(true, |b| result.stack().len() > b.stack().len());
			if deeper {
				best = Some(result);
			}
		}
		Ok(best)
	}

	/// Distinct MIME types of all results, in result order.
	pub fn mime_types<'r>(&'r self, file: &[u8]) -> Result<Vec<&'r str>> {
		let mut out = Vec::<&str>::new();
		for result in self.matches(file)? {
			if let Some(mime) = result.mime_type() {
				if !out.contains(&mime) {
					out.push(mime);
				}
			}
		}
		Ok(out)
	}

	/// Every MIME type any rule in the set can produce.
	pub fn supported(&self) -> Vec<&str> {
		let mut out: Vec<&str> = self.graph
			.raw_nodes()
			.iter()
			.filter_map(|node| node.weight.mime_type())
			.collect();
		out.sort_unstable();
		out.dedup();
		out
	}
}
