//! RETURNING clause handling.
//!
//! Sybase has no `RETURNING`. The clause is cut from the statement and
//! echoed in a line comment after the statement terminator.

use regex::Regex;
use tracing::trace;

use crate::guard::{Guarded, TokenKind, COMMENT_OPEN};
use crate::matching::{
    find_top_level, leading_keyword, split_statements, split_trailing_trivia, squash_whitespace,
    top_level_mask,
};

const ADVICE: &str =
    "RETURNING not supported in Sybase, use @@identity or SELECT after INSERT/UPDATE/DELETE";

/// Statements that may carry a `RETURNING` clause.
const DML: [&str; 4] = ["INSERT", "UPDATE", "DELETE", "WITH"];

/// Rewrite every DML statement of `text` that ends in `RETURNING ...`.
///
/// `trigger` matches the `RETURNING` keyword. Each advisory comment is
/// registered in `arena` and emitted as a placeholder.
pub fn rewrite(text: &str, trigger: &Regex, arena: &mut Guarded) -> (String, usize) {
    let statements = split_statements(text);
    let mut out = String::with_capacity(text.len());
    let mut hits = 0;

    for (i, statement) in statements.iter().enumerate() {
        let Some((body, advisory, trivia)) = split_returning(statement.body, trigger, arena) else {
            out.push_str(statement.body);
            out.push_str(statement.terminator);
            continue;
        };

        // Comments after the clause stay ahead of the terminator; after the
        // advisory they would be swallowed by it.
        let (kept, tail) = if trivia.contains(COMMENT_OPEN) {
            let kept = trivia.trim_end();
            (kept, &trivia[kept.len()..])
        } else {
            ("", trivia)
        };

        hits += 1;
        out.push_str(body);
        out.push_str(kept);
        out.push_str(statement.terminator);
        out.push(' ');
        out.push_str(&advisory);
        out.push_str(tail);

        // The comment runs to end of line; keep the next statement off it.
        let next_on_same_line = statements
            .get(i + 1)
            .is_some_and(|next| !next.body.is_empty() && !next.body.starts_with('\n'));
        if next_on_same_line && !tail.contains('\n') {
            out.push('\n');
        }
    }

    (out, hits)
}

/// Split a statement into (body without clause, advisory placeholder, trailing trivia).
///
/// The advisory is built from the restored clause with all whitespace,
/// including newlines inside literals and comments, squashed to single
/// spaces, so it always fits on one line.
fn split_returning<'t>(
    body: &'t str,
    trigger: &Regex,
    arena: &mut Guarded,
) -> Option<(&'t str, String, &'t str)> {
    let keyword = leading_keyword(body)?;
    if !DML.contains(&keyword.as_str()) {
        return None;
    }

    let mask = top_level_mask(body);
    let found = find_top_level(trigger, body, &mask)?;
    let (clause, trivia) = split_trailing_trivia(&body[found.start()..]);

    let clause = squash_whitespace(&arena.restore(clause));
    let advisory = format!("-- {} ({})", clause, ADVICE);
    trace!(%advisory, "returning clause moved to comment");
    let placeholder = arena.stash(TokenKind::Comment, &advisory);
    Some((body[..found.start()].trim_end(), placeholder, trivia))
}
