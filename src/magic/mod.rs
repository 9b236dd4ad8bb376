// Common types for file(1) style magic rules

pub mod offset;
pub mod pattern;
pub mod ruleset;
pub mod check;
pub mod builtin;
pub mod sys;

use fnv::FnvHashMap;
use mime::Mime;

use self::offset::Offset;
use self::pattern::Pattern;

/// One line of a magic file, plus any `!:key value` lines after it.
///
/// Children live in the owning `RuleSet`'s graph.
#[derive(Debug, Clone)]
pub struct MagicRule {
    pub offset: Offset,
    pub pattern: Pattern,
    pub message: Option<String>,
    pub extras: FnvHashMap<String, String>,
}

impl MagicRule {
    pub fn mime_type(&self) -> Option<&str> {
        self.extras.get("mime").map(String::as_str).filter(|m| !m.is_empty())
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// The rules matched along one path from a top-level rule downwards.
///
/// Results are never changed in place; `add` returns a longer copy, so
/// sibling branches cannot see each other's matches.
#[derive(Debug, Clone, Default)]
pub struct MatchResult<'r> {
    stack: Vec<&'r MagicRule>,
}

impl<'r> MatchResult<'r> {
    pub fn new() -> Self {
        MatchResult { stack: Vec::new() }
    }

    pub fn add(&self, rule: &'r MagicRule) -> MatchResult<'r> {
        let mut stack = Vec::with_capacity(self.stack.len() + 1);
        stack.extend_from_slice(&self.stack);
        stack.push(rule);
        MatchResult { stack }
    }

    pub fn stack(&self) -> &[&'r MagicRule] {
        &self.stack
    }

    pub fn last_rule(&self) -> Option<&'r MagicRule> {
        self.stack.last().copied()
    }

    /// The most specific `mime` along the path: later rules win.
    pub fn mime_type(&self) -> Option<&'r str> {
        self.stack.iter().rev().find_map(|&rule| rule.mime_type())
    }

    pub fn mime(&self) -> Option<Mime> {
        self.mime_type()?.parse().ok()
    }

    /// Every message along the path, joined by single spaces.
    pub fn full_message(&self) -> String {
        self.stack
            .iter()
            .filter_map(|&rule| rule.message())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
