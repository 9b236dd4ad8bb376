//! Text-level parsers for magic definition lines

pub mod magic;
