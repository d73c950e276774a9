//! Line-level tokenizing of GRDECL data sections.
//!
//! A section is the data block following a keyword: one or more whitespace separated lines
//! of values, where `N*V` is shorthand for `N` copies of `V`, ending at a `/` token.

use crate::parse::SizeMismatch;
use crate::prelude::*;

use std::str::FromStr;

/// marks the end of a data section
pub const TERMINATOR: &str = "/";

/// lines starting with this are comments
pub const COMMENT: &str = "--";

/// Expand a line of tokens, replacing every `N*V` token with `N` copies of `V`.
///
/// Values are not interpreted; converting them is left to whoever consumes the section.
///
/// ```
/// let values = grdecl::parse::expand_scalars("3*2 2*4 5").unwrap();
/// assert_eq!(values, ["2", "2", "2", "4", "4", "5"]);
/// ```
pub fn expand_scalars(line: &str) -> Result<Vec<&str>, ParseError> {
    let mut values = Vec::new();

    for scalar in line.split_whitespace() {
        let (count, value) = split_scalar(scalar)?;
        values.extend(std::iter::repeat(value).take(count));
    }

    Ok(values)
}

/// Split one token into its repeat count and value, `V` being shorthand for `1*V`
fn split_scalar(scalar: &str) -> Result<(usize, &str), ParseError> {
    match scalar.split_once('*') {
        None => Ok((1, scalar)),
        Some((count, value)) => {
            let count = parse_repeat_count(count).ok_or_else(|| ParseError::InvalidRepeatCount {
                token: scalar.to_string(),
            })?;

            Ok((count, value))
        }
    }
}

fn parse_repeat_count(count: &str) -> Option<usize> {
    count.parse::<usize>().ok().filter(|count| *count > 0)
}

/// `true` for lines that carry no data
pub(crate) fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with(COMMENT)
}

/// A cursor over the lines of a deck.
///
/// The keyword scanner and the section reader pull from the same source, so a section
/// always starts right after the line holding its keyword.
pub struct LineSource<R> {
    lines: std::io::Lines<R>,
    pending: Option<String>,
    line_number: usize,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: None,
            line_number: 0,
        }
    }

    /// Next line without its line ending, or `None` once the input is exhausted
    pub fn next_line(&mut self) -> Result<Option<String>, ParseError> {
        if let Some(line) = self.pending.take() {
            self.line_number += 1;
            return Ok(Some(line));
        }

        let line = self.lines.next().transpose()?;
        if line.is_some() {
            self.line_number += 1;
        }

        Ok(line)
    }

    /// Hand a line back so the next call to [`next_line`](Self::next_line) returns it again
    pub fn push_back(&mut self, line: String) {
        debug_assert!(self.pending.is_none(), "only one line can be pushed back");
        self.line_number = self.line_number.saturating_sub(1);
        self.pending = Some(line);
    }

    /// 1-based number of the line most recently returned
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Walk the tokens of one section, calling `visit` with every value and its repeat count.
///
/// Blank and comment lines are skipped. The section ends with the line whose final token is
/// `/`; the terminator itself is not visited. Repeats are handed over unexpanded.
fn for_each_token<R, F>(
    source: &mut LineSource<R>,
    keyword: &str,
    mut visit: F,
) -> Result<(), ParseError>
where
    R: BufRead,
    F: FnMut(&str, usize) -> Result<(), ParseError>,
{
    loop {
        let line = source
            .next_line()?
            .ok_or_else(|| ParseError::UnexpectedEndOfInput {
                keyword: keyword.to_string(),
            })?;

        if is_blank_or_comment(&line) {
            continue;
        }

        let mut tokens: Vec<&str> = line.split_whitespace().collect();

        let terminated = tokens.last() == Some(&TERMINATOR);
        if terminated {
            tokens.pop();
        }

        for token in tokens {
            let (count, value) = split_scalar(token)?;
            visit(value, count)?;
        }

        if terminated {
            return Ok(());
        }
    }
}

/// Read the section for `keyword` as raw, expanded tokens
pub fn read_section<R: BufRead>(
    source: &mut LineSource<R>,
    keyword: &str,
) -> Result<Vec<String>, ParseError> {
    let mut section = Vec::new();

    for_each_token(source, keyword, |token, count| {
        section.extend(std::iter::repeat(token.to_string()).take(count));
        Ok(())
    })?;

    Ok(section)
}

/// most values reserved up front, larger sections grow as they are read
const MAX_RESERVED: usize = 1 << 20;

/// Read the section for `keyword`, converting every token to `T` as it is decoded.
///
/// The section must hold exactly `expected` values, `formula` names that length in error
/// messages. A section that runs past `expected` is read to its terminator without storing
/// the surplus and reported as [`ParseError::SectionSizeMismatch`] with the full count.
/// Shorter sections are returned as they are, checking those is up to the caller.
pub fn read_values<R, T>(
    source: &mut LineSource<R>,
    keyword: &str,
    expected: usize,
    formula: &'static str,
) -> Result<Vec<T>, ParseError>
where
    R: BufRead,
    T: FromStr + Clone,
{
    let mut values = Vec::with_capacity(expected.min(MAX_RESERVED));
    let mut total: usize = 0;

    for_each_token(source, keyword, |token, count| {
        let value: T = token.parse().map_err(|_| ParseError::InvalidValue {
            keyword: keyword.to_string(),
            token: token.to_string(),
        })?;

        total = total.saturating_add(count);

        let room = expected.saturating_sub(values.len());
        values.extend(std::iter::repeat(value).take(count.min(room)));
        Ok(())
    })?;

    if total > expected {
        let mismatch = SizeMismatch::new(keyword.to_string(), formula, expected, total);
        return Err(ParseError::SectionSizeMismatch(mismatch));
    }

    Ok(values)
}
