//! Pass Runner.
//!
//! Applies the catalog to guarded text one category at a time, in
//! [`Category::ORDER`]. Every rule of a category runs before the next
//! category starts.

use tracing::{debug, trace};

use crate::guard::Guarded;
use crate::matching::{in_compound_expression, in_type_position, replace_unshielded};
use crate::pagination;
use crate::returning;
use crate::rules::{Category, Rewrite, Rule, RuleCatalog};
use crate::translator::TranslateOptions;

/// Run every category of `catalog` over the guarded text.
///
/// Rules that emit text of their own (the RETURNING advisory) register it in
/// the token arena so it is restored verbatim.
pub fn apply(guarded: &mut Guarded, catalog: &RuleCatalog, options: &TranslateOptions) {
    let mut current = std::mem::take(&mut guarded.text);

    for category in Category::ORDER {
        let mut hits = 0;
        for rule in catalog.category(category) {
            let (next, n) = apply_rule(rule, &current, options, guarded);
            if n > 0 {
                trace!(rule = rule.name, hits = n, "rule fired");
            }
            hits += n;
            current = next;
        }
        debug!(%category, hits, "pass complete");
    }

    guarded.text = current;
}

/// Apply a single rule, returning the new text and its substitution count.
pub fn apply_rule(
    rule: &Rule,
    text: &str,
    options: &TranslateOptions,
    arena: &mut Guarded,
) -> (String, usize) {
    match &rule.rewrite {
        Rewrite::Fixed(to) => replace_unshielded(&rule.matcher, text, |_, _| Some(to.to_string())),
        Rewrite::TypeName(to) => replace_unshielded(&rule.matcher, text, |caps, start| {
            let end = start + caps.get(0).map_or(0, |m| m.len());
            in_type_position(text, start, end).then(|| to.to_string())
        }),
        Rewrite::QuotedIdentifier => replace_unshielded(&rule.matcher, text, |caps, _| {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            Some(format!("[{}]", inner.replace("\"\"", "\"").replace(']', "]]")))
        }),
        Rewrite::CaseInsensitiveLike => replace_unshielded(&rule.matcher, text, |caps, start| {
            let end = start + caps.get(0).map_or(0, |m| m.len());
            if in_compound_expression(text, start, end) {
                return None;
            }
            let lhs = caps.name("lhs")?.as_str();
            let rhs = caps.name("rhs")?.as_str();
            let not = if caps.name("not").is_some() { "NOT " } else { "" };
            Some(format!("UPPER({lhs}) {not}LIKE UPPER({rhs})"))
        }),
        Rewrite::Pagination => pagination::rewrite(text, &rule.matcher, options),
        Rewrite::Returning => returning::rewrite(text, &rule.matcher, arena),
    }
}
