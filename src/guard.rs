//! Literal Guard.
//!
//! Swaps every single-quoted string literal and every comment for an opaque
//! placeholder before the rewrite passes run, and puts the originals back
//! afterwards. Placeholders are built from private-use characters:
//!
//! ```text
//! 'O''Brien'   ->  \u{E000}0\u{E001}
//! -- note      ->  \u{E002}1\u{E001}
//! ```
//!
//! Those characters are neither word characters nor operators, so no rule
//! pattern can match inside a placeholder.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until},
    character::complete::{char, one_of},
    combinator::{map, opt, recognize, rest},
    multi::many0,
    sequence::{pair, tuple},
    IResult,
};
use tracing::debug;

use crate::error::{TranslateError, TranslateResult};

/// Opens a literal placeholder.
pub const LITERAL_OPEN: char = '\u{E000}';
/// Closes any placeholder.
pub const PLACEHOLDER_CLOSE: char = '\u{E001}';
/// Opens a comment placeholder.
pub const COMMENT_OPEN: char = '\u{E002}';

/// Regex fragment matching a literal placeholder.
pub const LITERAL_PLACEHOLDER: &str = "\u{E000}[0-9]+\u{E001}";
/// Regex fragment matching a comment placeholder.
pub const COMMENT_PLACEHOLDER: &str = "\u{E002}[0-9]+\u{E001}";

const SENTINELS: &str = "\u{E000}\u{E001}\u{E002}";
const PLAIN_STOP: &str = "'\"-/\u{E000}\u{E001}\u{E002}";

/// What a guarded run held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Literal,
    Comment,
}

/// A protected run of source text and the placeholder standing in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralToken {
    pub kind: TokenKind,
    pub placeholder: String,
    pub original: String,
}

/// Output of [`protect`]: the rewritable text plus its token arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guarded {
    pub text: String,
    pub tokens: Vec<LiteralToken>,
}

impl Guarded {
    /// Number of guarded string literals.
    pub fn literal_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Literal)
            .count()
    }

    /// Put the originals back into `text`.
    pub fn restore(&self, text: &str) -> String {
        restore(text, &self.tokens)
    }

    /// Register `original` as a new token and return its placeholder,
    /// leaving `text` alone.
    pub fn stash(&mut self, kind: TokenKind, original: &str) -> String {
        let open = match kind {
            TokenKind::Literal => LITERAL_OPEN,
            TokenKind::Comment => COMMENT_OPEN,
        };
        let placeholder = format!("{}{}{}", open, self.tokens.len(), PLACEHOLDER_CLOSE);
        self.tokens.push(LiteralToken {
            kind,
            placeholder: placeholder.clone(),
            original: original.to_string(),
        });
        placeholder
    }

    fn push(&mut self, kind: TokenKind, original: &str) {
        let placeholder = self.stash(kind, original);
        self.text.push_str(&placeholder);
    }
}

#[derive(Debug, PartialEq)]
enum Piece<'a> {
    Literal(&'a str),
    Comment(&'a str),
    Sentinel(&'a str),
    Text(&'a str),
}

/// Replace literals and comments in `source` with placeholders.
///
/// Fails with [`TranslateError::MalformedLiteral`] when a single-quoted
/// literal is never closed.
pub fn protect(source: &str) -> TranslateResult<Guarded> {
    let mut guarded = Guarded {
        text: String::with_capacity(source.len()),
        tokens: Vec::new(),
    };
    let mut input = source;

    while !input.is_empty() {
        match piece(input) {
            Ok((remaining, piece)) => {
                match piece {
                    Piece::Literal(s) | Piece::Sentinel(s) => guarded.push(TokenKind::Literal, s),
                    Piece::Comment(s) => guarded.push(TokenKind::Comment, s),
                    Piece::Text(s) => guarded.text.push_str(s),
                }
                input = remaining;
            }
            Err(_) => {
                // Only an opening quote without a partner gets here.
                let position = source.len() - input.len();
                return Err(TranslateError::malformed_literal(source, position));
            }
        }
    }

    debug!(
        literals = guarded.literal_count(),
        comments = guarded.tokens.len() - guarded.literal_count(),
        "guarded source text"
    );
    Ok(guarded)
}

/// Substitute every placeholder in `text` with its original run.
///
/// Single left-to-right pass; restored text is never re-scanned.
pub fn restore(text: &str, tokens: &[LiteralToken]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut remaining = text;

    while let Some(start) = remaining.find([LITERAL_OPEN, COMMENT_OPEN]) {
        out.push_str(&remaining[..start]);
        let after_open = &remaining[start..];
        let open_len = after_open.chars().next().map_or(0, char::len_utf8);

        let resolved = after_open[open_len..]
            .find(PLACEHOLDER_CLOSE)
            .and_then(|end| {
                let index: usize = after_open[open_len..open_len + end].parse().ok()?;
                let token = tokens.get(index)?;
                Some((token, open_len + end + PLACEHOLDER_CLOSE.len_utf8()))
            });

        match resolved {
            Some((token, consumed)) => {
                out.push_str(&token.original);
                remaining = &after_open[consumed..];
            }
            None => {
                out.push_str(&after_open[..open_len]);
                remaining = &after_open[open_len..];
            }
        }
    }

    out.push_str(remaining);
    out
}

fn piece(input: &str) -> IResult<&str, Piece<'_>> {
    alt((
        map(string_literal, Piece::Literal),
        map(line_comment, Piece::Comment),
        map(block_comment, Piece::Comment),
        map(quoted_identifier, Piece::Text),
        map(recognize(one_of(SENTINELS)), Piece::Sentinel),
        map(is_not(PLAIN_STOP), Piece::Text),
        // A lone '-', '/' or an unbalanced '"' is ordinary text.
        map(recognize(one_of("-/\"")), Piece::Text),
    ))(input)
}

/// `'...'` with `''` as an escaped quote.
fn string_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        char('\''),
        many0(alt((tag("''"), is_not("'")))),
        char('\''),
    )))(input)
}

/// `"..."` with `""` as an escaped quote.
fn quoted_identifier(input: &str) -> IResult<&str, &str> {
    let inner = "\"\u{E000}\u{E001}\u{E002}";
    recognize(tuple((
        char('"'),
        many0(alt((tag("\"\""), is_not(inner)))),
        char('"'),
    )))(input)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("--"), opt(is_not("\n"))))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((tag("/*"), take_until("*/"), tag("*/")))),
        // Unterminated: runs to the end of input.
        recognize(pair(tag("/*"), rest)),
    ))(input)
}
