//! Pagination Restructurer.
//!
//! Moves a trailing row-limit clause into the `SELECT` head:
//!
//! ```text
//! SELECT a FROM t LIMIT 10            ->  SELECT TOP 10 a FROM t
//! SELECT a, b FROM t LIMIT 5 OFFSET 1 ->  SELECT TOP 5 START AT 2 * FROM t
//! ```
//!
//! The `START AT` form replaces the projection with `*` unless
//! [`TranslateOptions::collapse_offset_projection`] is off. That is a
//! known, accepted divergence from the source query.

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, multispace1},
    combinator::{map, map_res, opt, recognize},
    multi::many0,
    sequence::{preceded, terminated, tuple},
    IResult,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::guard::{COMMENT_OPEN, PLACEHOLDER_CLOSE};
use crate::matching::{compile, find_top_level, keyword, split_statements, top_level_mask};
use crate::translator::TranslateOptions;

static SELECT: Lazy<Regex> = Lazy::new(|| keyword("SELECT"));
static FROM: Lazy<Regex> = Lazy::new(|| keyword("FROM"));
static SET_QUANTIFIER: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^\s+(?:DISTINCT|ALL)\b"));
static DISTINCT_ON: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^\s+DISTINCT\s+ON\b"));

/// Row limit and zero-based offset of a pagination clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// The `TOP ...` prefix, or `None` when there is nothing to limit.
    pub fn top_clause(&self) -> Option<String> {
        let limit = self.limit?;
        match self.offset {
            // START AT is one-based.
            Some(offset) => Some(format!("TOP {} START AT {}", limit, offset.checked_add(1)?)),
            None => Some(format!("TOP {}", limit)),
        }
    }
}

/// Rewrite every statement of `text` that ends in a pagination clause.
///
/// `trigger` finds candidate clause starts (`LIMIT`, `OFFSET`, `FETCH`).
pub fn rewrite(text: &str, trigger: &Regex, options: &TranslateOptions) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut hits = 0;

    for statement in split_statements(text) {
        match rewrite_statement(statement.body, trigger, options) {
            Some(rewritten) => {
                hits += 1;
                out.push_str(&rewritten);
            }
            None => out.push_str(statement.body),
        }
        out.push_str(statement.terminator);
    }

    (out, hits)
}

/// Rewrite one statement, or `None` if it has no usable pagination clause.
pub fn rewrite_statement(body: &str, trigger: &Regex, options: &TranslateOptions) -> Option<String> {
    let mask = top_level_mask(body);

    let (clause_start, pagination, trailing) = trigger
        .find_iter(body)
        .filter(|m| mask.get(m.start()).copied().unwrap_or(false))
        .find_map(|m| {
            let (after_clause, pagination) = clause(&body[m.start()..]).ok()?;
            let (rest, _) = trivia(after_clause).ok()?;
            rest.is_empty().then_some((m.start(), pagination, after_clause))
        })?;

    let top = pagination.top_clause()?;
    let head = &body[..clause_start];
    let select = find_top_level(&SELECT, head, &mask)?;

    // No TOP form exists for DISTINCT ON.
    if DISTINCT_ON.is_match(&head[select.end()..]) {
        return None;
    }

    let mut insert_at = select.end();
    if let Some(quantifier) = SET_QUANTIFIER.find(&head[insert_at..]) {
        insert_at += quantifier.end();
    }

    let projection_and_rest = head[insert_at..].trim_end();
    let mut out = String::with_capacity(body.len() + top.len() + 2);
    out.push_str(&head[..insert_at]);
    out.push(' ');
    out.push_str(&top);

    let from = if pagination.offset.is_some() && options.collapse_offset_projection {
        find_top_level(&FROM, &head[insert_at..], &mask[insert_at..])
    } else {
        None
    };

    let collapsed = from.is_some();
    match from {
        Some(from) => {
            out.push_str(" * ");
            out.push_str(&projection_and_rest[from.start()..]);
        }
        None => out.push_str(projection_and_rest),
    }
    out.push_str(trailing);

    trace!(%top, collapsed, "pagination clause moved");
    Some(out)
}

/// Any of the supported clause shapes.
pub fn clause(input: &str) -> IResult<&str, Pagination> {
    alt((fetch_first, limit_then_offset, offset_then_limit))(input)
}

/// `LIMIT n [OFFSET m [ROWS]]`
fn limit_then_offset(input: &str) -> IResult<&str, Pagination> {
    map(
        tuple((
            tag_no_case("LIMIT"),
            multispace1,
            count,
            opt(preceded(multispace1, offset)),
        )),
        |(_, _, limit, offset)| Pagination {
            limit: Some(limit),
            offset,
        },
    )(input)
}

/// `OFFSET m [ROWS] LIMIT n`
fn offset_then_limit(input: &str) -> IResult<&str, Pagination> {
    map(
        tuple((offset, multispace1, tag_no_case("LIMIT"), multispace1, count)),
        |(offset, _, _, _, limit)| Pagination {
            limit: Some(limit),
            offset: Some(offset),
        },
    )(input)
}

/// `[OFFSET m ROWS] FETCH FIRST|NEXT [n] ROW|ROWS ONLY`
fn fetch_first(input: &str) -> IResult<&str, Pagination> {
    map(
        tuple((
            opt(terminated(offset, multispace1)),
            tag_no_case("FETCH"),
            multispace1,
            alt((tag_no_case("FIRST"), tag_no_case("NEXT"))),
            multispace1,
            opt(terminated(count, multispace1)),
            rows,
            multispace1,
            tag_no_case("ONLY"),
        )),
        |(offset, _, _, _, _, limit, _, _, _)| Pagination {
            limit: Some(limit.unwrap_or(1)),
            offset,
        },
    )(input)
}

/// `OFFSET m [ROW|ROWS]`
fn offset(input: &str) -> IResult<&str, u64> {
    preceded(
        tuple((tag_no_case("OFFSET"), multispace1)),
        terminated(count, opt(preceded(multispace1, rows))),
    )(input)
}

fn rows(input: &str) -> IResult<&str, &str> {
    alt((tag_no_case("ROWS"), tag_no_case("ROW")))(input)
}

fn count(input: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>)(input)
}

/// Whitespace and comment placeholders.
fn trivia(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((
        multispace1,
        recognize(tuple((char(COMMENT_OPEN), digit1, char(PLACEHOLDER_CLOSE)))),
    ))))(input)
}
