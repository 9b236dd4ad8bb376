use std::convert::TryFrom;

use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while1};
use nom::character::complete::{char, digit1, hex_digit1, one_of, satisfy, space0};
use nom::combinator::{all_consuming, map, map_res, opt, rest};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::{Finish, IResult};

use crate::error::RuleError;
use crate::magic::offset::{Indirect, IndirectType, Offset};

/// An integer as written in a rule, remembering whether it was hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    pub value: i128,
    pub hex: bool,
}

/// Pieces of a type field such as `ulelong&0xff/b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr<'a> {
    pub name: &'a str,
    pub ops: Vec<(char, Literal)>,
    pub flags: Vec<&'a str>,
}

fn hex_literal(input: &str) -> IResult<&str, Literal> {
    map_res(
        preceded(tag_no_case("0x"), hex_digit1),
        |digits: &str| i128::from_str_radix(digits, 16).map(|value| Literal { value, hex: true })
    )(input)
}

// A leading zero means octal, like C.
fn digits_literal(input: &str) -> IResult<&str, Literal> {
    map_res(digit1, |digits: &str| {
        let radix = if digits.len() > 1 && digits.starts_with('0') { 8 } else { 10 };
        i128::from_str_radix(digits, radix).map(|value| Literal { value, hex: false })
    })(input)
}

fn unsigned(input: &str) -> IResult<&str, Literal> {
    alt((hex_literal, digits_literal))(input)
}

fn signed(input: &str) -> IResult<&str, Literal> {
    alt((
        hex_literal,
        map(preceded(char('-'), digits_literal), |lit| Literal { value: -lit.value, hex: false }),
        digits_literal
    ))(input)
}

/// A bare unsigned number, e.g. the range flag of `search/256`.
pub fn number(text: &str) -> Option<i128> {
    let parsed: IResult<&str, Literal> = all_consuming(unsigned)(text);
    parsed.finish().ok().map(|(_, lit)| lit.value)
}

/// Split a rule line into at most 4 fields: offset, type, test, message.
///
/// Lines are raw bytes; test values may hold anything but whitespace.
/// Whitespace right after `\`, `<` or `>` does not separate fields, so
/// `string \ foo` and `byte > 3` keep their test values whole.
pub fn fields(line: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::with_capacity(4);
    let mut start = 0;
    let mut i = 0;

    while i < line.len() && out.len() < 3 {
        let held = i > start && match line[i - 1] {
            b'\\' | b'<' | b'>' => true,
            _ => false
        };
        if line[i].is_ascii_whitespace() && !held {
            out.push(&line[start..i]);
            i += 1;
            while i < line.len() && line[i].is_ascii_whitespace() {
                i += 1;
            }
            start = i;
            continue;
        }
        i += 1;
    }

    out.push(&line[start..]);
    out
}

/// Count and strip the leading `>` nesting markers of an offset field.
pub fn nesting(field: &str) -> (usize, &str) {
    let depth = field.bytes().take_while(|&b| b == b'>').count();
    (depth, &field[depth..])
}

fn indirect(input: &str) -> IResult<&str, (Literal, char, char, Option<(char, Literal)>)> {
    delimited(
        char('('),
        tuple((
            unsigned,
            one_of(".,"),
            satisfy(|c| c.is_ascii_alphabetic()),
            opt(pair(one_of("+-"), unsigned))
        )),
        char(')')
    )(input)
}

/// Parse an offset field with its nesting markers already removed.
pub fn offset(text: &str) -> Result<Offset, RuleError> {
    let bad = || RuleError::BadOffset(text.to_string());

    if text.starts_with('&') {
        return Ok(Offset::Relative(text.to_string()));
    }

    if text.starts_with('(') {
        let (_, (base, sep, code, adjust)) = all_consuming(indirect)(text)
            .finish()
            .map_err(|_| bad())?;
        let kind = IndirectType::from_code(code)
            .ok_or(RuleError::UnsupportedIndirectType(code))?;
        let adjust = match adjust {
            Some(('-', lit)) => -lit.value,
            Some((_, lit)) => lit.value,
            None => 0
        };
        return Ok(Offset::Indirect(Indirect {
            base: i64::try_from(base.value).map_err(|_| bad())?,
            signed: sep == ',',
            kind,
            adjust: i64::try_from(adjust).map_err(|_| bad())?
        }));
    }

    let (_, lit) = all_consuming(signed)(text).finish().map_err(|_| bad())?;
    i64::try_from(lit.value).map(Offset::Exact).map_err(|_| bad())
}

/// Parse a numeric test value into its operator and operand.
///
/// Operators: `=` `<` `>` `!` `&` `^`, optionally followed by a space.
/// A trailing `l`/`L` on the literal is accepted and ignored.
pub fn comparison(text: &str) -> Result<(Option<char>, Literal), RuleError> {
    let parsed: IResult<&str, _> = all_consuming(tuple((
        opt(one_of("=<>!&^")),
        space0,
        signed,
        opt(one_of("lL"))
    )))(text);

    parsed
        .finish()
        .map(|(_, (op, _, lit, _))| (op, lit))
        .map_err(|_| RuleError::BadComparison(text.to_string()))
}

fn type_ops(input: &str) -> IResult<&str, (&str, Vec<(char, Literal)>)> {
    pair(
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        many0(pair(one_of("&%"), terminated(signed, opt(one_of("lL")))))
    )(input)
}

/// Parse a type field: name, `&`/`%` operators, then `/` separated flags.
pub fn type_expr(text: &str) -> Result<TypeExpr<'_>, RuleError> {
    let mut parts = text.split('/');
    let head = parts.next().unwrap_or("");
    let (_, (name, ops)) = all_consuming(type_ops)(head)
        .finish()
        .map_err(|_| RuleError::BadTypeOperator(text.to_string()))?;

    Ok(TypeExpr { name, ops, flags: parts.collect() })
}

/// Parse a `!:key value` line.
pub fn continuation(line: &str) -> Result<(&str, &str), RuleError> {
    let parsed: IResult<&str, _> = all_consuming(tuple((
        tag("!:"),
        take_while1(|c: char| c.is_ascii_lowercase()),
        take_while1(|c: char| c.is_whitespace()),
        rest
    )))(line);

    parsed
        .finish()
        .map(|(_, (_, key, _, value))| (key, value))
        .map_err(|_| RuleError::BadContinuation(line.to_string()))
}

/// Resolve backslash escapes in a test value into raw bytes.
///
/// `\NNN` is octal (1 to 3 digits), `\xNN` hex, `\n \t \f \r` the usual
/// control characters. Any other escaped character stands for itself.
pub fn unescape(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let octal = bytes[i + 1..]
            .iter()
            .take(3)
            .take_while(|d| (b'0'..=b'7').contains(*d))
            .count();
        if octal > 0 {
            let value = bytes[i + 1..i + 1 + octal]
                .iter()
                .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
            out.push(value as u8);
            i += 1 + octal;
            continue;
        }

        if bytes[i + 1] == b'x' {
            if let Some(hex) = bytes.get(i + 2..i + 4) {
                if hex.iter().all(u8::is_ascii_hexdigit) {
                    let digits = std::str::from_utf8(hex).unwrap_or("0");
                    out.push(u8::from_str_radix(digits, 16).unwrap_or(0));
                    i += 4;
                    continue;
                }
            }
        }

        out.push(match bytes[i + 1] {
            b'n' => b'\n',
            b't' => b'\t',
            b'f' => 0x0c,
            b'r' => b'\r',
            other => other
        });
        i += 2;
    }

    out
}

#[cfg(test)]
fn split(line: &[u8]) -> Vec<String> {
    fields(line).iter().map(|f| String::from_utf8_lossy(f).into_owned()).collect()
}

#[test]
fn fields_test() {
    assert_eq!(split(b"0\tstring\tGIF8\tGIF image data"), vec!["0", "string", "GIF8", "GIF image data"]);
    assert_eq!(split(b">>4  ubyte   x"), vec![">>4", "ubyte", "x"]);
    assert_eq!(split(b"0 string Hello\\ World greeting"), vec!["0", "string", "Hello\\ World", "greeting"]);
    assert_eq!(split(b">2 byte > 3 big"), vec![">2", "byte", "> 3", "big"]);
    assert_eq!(split(b"0 string x  a  b"), vec!["0", "string", "x", "a  b"]);
    assert_eq!(fields(b"0 string \xff\xfeA raw")[2], &b"\xff\xfeA"[..]);
}

#[test]
fn nesting_test() {
    assert_eq!(nesting(">>(4.l)"), (2, "(4.l)"));
    assert_eq!(nesting("0"), (0, "0"));
}

#[test]
fn literal_test() {
    assert_eq!(number("256"), Some(256));
    assert_eq!(number("0x100"), Some(256));
    assert_eq!(number("010"), Some(8));
    assert_eq!(number("08"), None);
    assert_eq!(number("-1"), None);
}

#[test]
fn offset_test() {
    assert_eq!(offset("16").unwrap(), Offset::Exact(16));
    assert_eq!(offset("0x10").unwrap(), Offset::Exact(16));
    assert_eq!(offset("-4").unwrap(), Offset::Exact(-4));
    assert_eq!(offset("&2").unwrap(), Offset::Relative("&2".to_string()));
    assert_eq!(
        offset("(4.l+8)").unwrap(),
        Offset::Indirect(Indirect { base: 4, signed: false, kind: IndirectType::LeLong, adjust: 8 })
    );
    assert_eq!(
        offset("(0x3c,S-0x10)").unwrap(),
        Offset::Indirect(Indirect { base: 60, signed: true, kind: IndirectType::BeShort, adjust: -16 })
    );
    match offset("(4.q)") {
        Err(RuleError::UnsupportedIndirectType('q')) => {},
        other => panic!("{:?}", other)
    }
    assert!(offset("(4.l*2)").is_err());
    assert!(offset("-0x4").is_err());
    assert!(offset("").is_err());
}

#[test]
fn comparison_test() {
    assert_eq!(comparison("0x1f8b").unwrap(), (None, Literal { value: 0x1f8b, hex: true }));
    assert_eq!(comparison("> 3").unwrap(), (Some('>'), Literal { value: 3, hex: false }));
    assert_eq!(comparison("!-1").unwrap(), (Some('!'), Literal { value: -1, hex: false }));
    assert_eq!(comparison("&0x80L").unwrap(), (Some('&'), Literal { value: 0x80, hex: true }));
    assert!(comparison("~5").is_err());
    assert!(comparison("abc").is_err());
}

#[test]
fn type_expr_test() {
    let expr = type_expr("ulelong&0xff%3/b/c").unwrap();
    assert_eq!(expr.name, "ulelong");
    assert_eq!(expr.ops, vec![
        ('&', Literal { value: 0xff, hex: true }),
        ('%', Literal { value: 3, hex: false })
    ]);
    assert_eq!(expr.flags, vec!["b", "c"]);

    assert_eq!(type_expr("regex/1l").unwrap().flags, vec!["1l"]);
    assert!(type_expr("lelong+1").is_err());
}

#[test]
fn continuation_test() {
    assert_eq!(continuation("!:mime\timage/gif").unwrap(), ("mime", "image/gif"));
    assert_eq!(continuation("!:strength + 10").unwrap(), ("strength", "+ 10"));
    assert!(continuation("!:mime").is_err());
    assert!(continuation("!mime image/gif").is_err());
}

#[test]
fn unescape_test() {
    assert_eq!(unescape(b"GIF8"), b"GIF8".to_vec());
    assert_eq!(unescape(b"\\177ELF"), b"\x7fELF".to_vec());
    assert_eq!(unescape(b"\\x89PNG\\r\\n"), b"\x89PNG\r\n".to_vec());
    assert_eq!(unescape(b"\\3757z"), b"\xfd7z".to_vec());
    assert_eq!(unescape(b"a\\ b\\\\"), b"a b\\".to_vec());
    assert_eq!(unescape(b"\\x4g"), b"x4g".to_vec());
    assert_eq!(unescape(b"trailing\\"), b"trailing\\".to_vec());
    assert_eq!(unescape(b"\xff\\x41"), b"\xffA".to_vec());
}
