//! Case-insensitive matching helpers shared by the rewrite passes.
//!
//! All helpers work on guarded text: literals and comments are already
//! placeholders, so the only nesting left to track is parentheses and
//! bracketed identifiers.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::guard::COMMENT_PLACEHOLDER;

/// A bracketed identifier, `]]` being an escaped `]`.
pub const BRACKET_IDENT: &str = r"\[(?:[^\]]|\]\])*\]";

/// Name of the capture group that marks a shielded match.
const SHIELD: &str = "shield";

static TYPE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r#"(?i)(?:::\s*|\bTYPE\s+|(?:[(,]\s*|\b(?:COLUMN|ADD)\s+)(?:\w+|{BRACKET_IDENT})\s+)$"#
    ))
});

static CAST_PREFIX: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\bAS\s+$"));

static CLOSE_PAREN: Lazy<Regex> = Lazy::new(|| compile(r"^\s*\)"));

static LEADING_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"^(?:\s|\(|{COMMENT_PLACEHOLDER})*([A-Za-z_]\w*)"))
});

static TRAILING_TRIVIA: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?:\s|{COMMENT_PLACEHOLDER})*$")));

/// Compile a built-in pattern.
///
/// Every pattern passed here is a constant of this crate.
pub fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

/// Case-insensitive `\bWORD\b` matcher.
pub fn keyword(word: &str) -> Regex {
    compile(&format!(r"(?i)\b{word}\b"))
}

/// Compile `pattern` case-insensitively, followed by a shield alternative
/// that swallows bracketed identifiers whole.
///
/// The rule alternative comes first, so a pattern that itself starts with a
/// bracketed identifier still wins at that position.
pub fn shielded(pattern: &str) -> Regex {
    compile(&format!(r"(?i)(?:{pattern})|(?P<{SHIELD}>{BRACKET_IDENT})"))
}

/// Replace every non-shielded match of `re` in `text` with `rewrite(caps)`.
///
/// `rewrite` may return `None` to keep a match as it is. Returns the new
/// text and the number of substitutions made.
pub fn replace_unshielded<F>(re: &Regex, text: &str, mut rewrite: F) -> (String, usize)
where
    F: FnMut(&Captures<'_>, usize) -> Option<String>,
{
    let mut hits = 0;
    let out = re.replace_all(text, |caps: &Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        if caps.name(SHIELD).is_some() {
            return whole.to_string();
        }
        let start = caps.get(0).map_or(0, |m| m.start());
        match rewrite(caps, start) {
            Some(replacement) => {
                hits += 1;
                replacement
            }
            None => whole.to_string(),
        }
    });
    (out.into_owned(), hits)
}

/// For each byte of `text`: is it at parenthesis depth zero and outside any
/// bracketed identifier?
pub fn top_level_mask(text: &str) -> Vec<bool> {
    let bytes = text.as_bytes();
    let mut mask = vec![false; bytes.len()];
    let mut depth: i32 = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                i = bracket_end(bytes, i);
                continue;
            }
            b'(' => {
                mask[i] = depth <= 0;
                depth += 1;
            }
            b')' => {
                depth -= 1;
                mask[i] = depth <= 0;
            }
            _ => mask[i] = depth <= 0,
        }
        i += 1;
    }
    mask
}

/// Index just past the `]` closing the bracket opened at `open`.
fn bracket_end(bytes: &[u8], open: usize) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == b']' {
            if bytes.get(i + 1) == Some(&b']') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// First match of `re` starting at top level.
pub fn find_top_level<'t>(re: &Regex, text: &'t str, mask: &[bool]) -> Option<regex::Match<'t>> {
    re.find_iter(text)
        .find(|m| mask.get(m.start()).copied().unwrap_or(false))
}

/// One statement of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<'t> {
    pub body: &'t str,
    /// `";"`, or empty for the last statement.
    pub terminator: &'t str,
}

/// Split `text` at top-level semicolons.
///
/// Concatenating every `body` and `terminator` yields `text` again.
pub fn split_statements(text: &str) -> Vec<Statement<'_>> {
    let mask = top_level_mask(text);
    let mut statements = Vec::new();
    let mut start = 0;

    for (i, b) in text.bytes().enumerate() {
        if b == b';' && mask[i] {
            statements.push(Statement {
                body: &text[start..i],
                terminator: &text[i..i + 1],
            });
            start = i + 1;
        }
    }
    statements.push(Statement {
        body: &text[start..],
        terminator: "",
    });
    statements
}

/// Upper-cased first keyword of a statement, skipping whitespace, opening
/// parentheses and comments.
pub fn leading_keyword(statement: &str) -> Option<String> {
    LEADING_KEYWORD
        .captures(statement)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Split `text` into its content and the trailing whitespace/comments.
pub fn split_trailing_trivia(text: &str) -> (&str, &str) {
    match TRAILING_TRIVIA.find(text) {
        Some(m) => (&text[..m.start()], &text[m.start()..]),
        None => (text, ""),
    }
}

/// Does the match at `start..end` sit where a data type is expected?
///
/// Accepted positions: after `::`, after `TYPE`, after a column or parameter
/// name that follows `(`, `,`, `ADD` or `COLUMN`, and after `AS` when the
/// type closes a parenthesis (`CAST(x AS TEXT)`).
pub fn in_type_position(text: &str, start: usize, end: usize) -> bool {
    let prefix = &text[..start];
    if TYPE_PREFIX.is_match(prefix) {
        return true;
    }
    CAST_PREFIX.is_match(prefix) && CLOSE_PAREN.is_match(&text[end..])
}

/// Characters that bind an operand to a neighbouring expression.
const OPERATOR_CHARS: &[char] = &[
    '+', '-', '*', '/', '%', '|', '&', '^', '<', '>', '=', '!', '~', ':', '@', '#', '$', '?',
];

/// Is the match at `start..end` part of a larger expression?
///
/// True when an operator sits right before `start`, or an operator or an
/// opening parenthesis right after `end`, ignoring whitespace.
pub fn in_compound_expression(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].trim_end().chars().next_back();
    let after = text[end..].trim_start().chars().next();
    before.is_some_and(|c| OPERATOR_CHARS.contains(&c))
        || after.is_some_and(|c| c == '(' || OPERATOR_CHARS.contains(&c))
}

/// Collapse runs of whitespace to single spaces.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_respects_word_boundaries() {
        let re = keyword("TEXT");
        assert!(re.is_match("content text"));
        assert!(re.is_match("content TeXt,"));
        assert!(!re.is_match("textual_field"));
        assert!(!re.is_match("my_text"));
    }

    #[test]
    fn test_shield_keeps_bracketed_identifiers() {
        let re = shielded(r"\bTRUE\b");
        let (out, hits) = replace_unshielded(&re, "[true] = TRUE", |_, _| Some("1".into()));
        assert_eq!(out, "[true] = 1");
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_shield_handles_escaped_bracket() {
        let re = shielded(r"\bTRUE\b");
        let (out, _) = replace_unshielded(&re, "[a]] true] true", |_, _| Some("1".into()));
        assert_eq!(out, "[a]] true] 1");
    }

    #[test]
    fn test_top_level_mask() {
        let text = "a (b) [c(] d";
        let mask = top_level_mask(text);
        assert!(mask[0]);
        assert!(!mask[3]);
        // Inside the bracket: not top level, and its '(' does not nest.
        assert!(!mask[7]);
        assert!(mask[text.len() - 1]);
    }

    #[test]
    fn test_split_statements() {
        let stmts = split_statements("SELECT 1; SELECT (2;3); SELECT 4");
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0].body, "SELECT 1");
        assert_eq!(stmts[1].body, " SELECT (2;3)");
        assert_eq!(stmts[2].terminator, "");
        let joined: String = stmts.iter().map(|s| format!("{}{}", s.body, s.terminator)).collect();
        assert_eq!(joined, "SELECT 1; SELECT (2;3); SELECT 4");
    }

    #[test]
    fn test_leading_keyword() {
        assert_eq!(leading_keyword("\n  insert into t").as_deref(), Some("INSERT"));
        assert_eq!(leading_keyword("(SELECT 1)").as_deref(), Some("SELECT"));
        assert_eq!(leading_keyword("\u{E002}0\u{E001}\nupdate t").as_deref(), Some("UPDATE"));
        assert_eq!(leading_keyword("   "), None);
    }

    #[test]
    fn test_split_trailing_trivia() {
        let (body, trivia) = split_trailing_trivia("SELECT 1 \u{E002}0\u{E001}\n");
        assert_eq!(body, "SELECT 1");
        assert_eq!(trivia, " \u{E002}0\u{E001}\n");
    }

    #[test]
    fn test_type_positions() {
        let check = |text: &str, word: &str| {
            let start = text.rfind(word).unwrap();
            in_type_position(text, start, start + word.len())
        };
        assert!(check("CREATE TABLE t (body TEXT)", "TEXT"));
        assert!(check("CREATE TABLE t (id INT, [body] TEXT)", "TEXT"));
        assert!(check("ALTER TABLE t ADD COLUMN note TEXT", "TEXT"));
        assert!(check("ALTER TABLE t ALTER COLUMN note TYPE TEXT", "TEXT"));
        assert!(check("SELECT x::text", "text"));
        assert!(check("SELECT CAST(x AS TEXT)", "TEXT"));
        assert!(!check("SELECT text FROM notes", "text"));
        assert!(!check("SELECT a, text FROM notes", "text"));
        assert!(!check("SELECT x AS text FROM t", "text"));
        assert!(!check("INSERT INTO t (a, timestamp) VALUES (1, 2)", "timestamp"));
        assert!(!check("SELECT address text FROM t", "text"));
        assert!(!check("SELECT columns text FROM t", "text"));
        assert!(check("ALTER TABLE t ADD note TEXT", "TEXT"));
    }

    #[test]
    fn test_in_compound_expression() {
        let check = |text: &str, part: &str| {
            let start = text.find(part).unwrap();
            in_compound_expression(text, start, start + part.len())
        };
        assert!(!check("WHERE name ILIKE x AND y", "name ILIKE x"));
        assert!(!check("(name ILIKE x)", "name ILIKE x"));
        assert!(check("WHERE a + name ILIKE x", "name ILIKE x"));
        assert!(check("WHERE name ILIKE x + y", "name ILIKE x"));
        assert!(check("WHERE name ILIKE x || y", "name ILIKE x"));
        assert!(check("WHERE name ILIKE lower (y)", "name ILIKE lower"));
        assert!(check("WHERE x::name ILIKE y", "name ILIKE y"));
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace(" a,\n   b  "), "a, b");
    }
}
