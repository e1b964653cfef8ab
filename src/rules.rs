//! Rule Catalog.
//!
//! An ordered, immutable list of rewrite rules. Each [`Rule`] pairs a
//! matcher with a [`Rewrite`] variant; the pass runner dispatches on the
//! variant. The catalog is sorted by [`Category`] once, at construction.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::guard::LITERAL_PLACEHOLDER;
use crate::matching::{compile, keyword, shielded, BRACKET_IDENT};

/// Rule categories, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// `"ident"` -> `[ident]`
    IdentifierQuoting,
    /// `SERIAL`, `BOOLEAN`, `TEXT`, `BYTEA`, `TIMESTAMP` ...
    DataType,
    /// `TRUE`/`FALSE` -> `1`/`0`
    BooleanLiteral,
    /// `||` -> `+`
    Concatenation,
    /// `NOW()`, `LENGTH(` ...
    Function,
    /// `ILIKE` -> `UPPER(a) LIKE UPPER(b)`
    CaseInsensitiveLike,
    /// `LIMIT`/`OFFSET` -> `TOP`/`START AT`
    Pagination,
    /// `RETURNING` -> advisory comment
    Returning,
}

impl Category {
    /// Every category, in the order the passes run.
    pub const ORDER: [Category; 8] = [
        Category::IdentifierQuoting,
        Category::DataType,
        Category::BooleanLiteral,
        Category::Concatenation,
        Category::Function,
        Category::CaseInsensitiveLike,
        Category::Pagination,
        Category::Returning,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::IdentifierQuoting => "identifier-quoting",
            Category::DataType => "data-type",
            Category::BooleanLiteral => "boolean-literal",
            Category::Concatenation => "concatenation",
            Category::Function => "function",
            Category::CaseInsensitiveLike => "ilike",
            Category::Pagination => "pagination",
            Category::Returning => "returning",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a rule turns a match into its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Replace the match with a fixed string.
    Fixed(&'static str),
    /// Replace the match with a fixed type name, only in a type position.
    TypeName(&'static str),
    /// `"a""b"` -> `[a"b]`
    QuotedIdentifier,
    /// `a [NOT] ILIKE b` -> `UPPER(a) [NOT] LIKE UPPER(b)`
    CaseInsensitiveLike,
    /// Structural rewrite of the trailing pagination clause.
    Pagination,
    /// Structural rewrite of the trailing `RETURNING` clause.
    Returning,
}

/// A single rewrite rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub category: Category,
    pub name: &'static str,
    pub matcher: Regex,
    pub rewrite: Rewrite,
}

impl Rule {
    fn new(category: Category, name: &'static str, matcher: Regex, rewrite: Rewrite) -> Self {
        Self {
            category,
            name,
            matcher,
            rewrite,
        }
    }

    fn fixed(category: Category, name: &'static str, pattern: &str, to: &'static str) -> Self {
        Self::new(category, name, shielded(pattern), Rewrite::Fixed(to))
    }

    fn type_name(name: &'static str, pattern: &str, to: &'static str) -> Self {
        Self::new(Category::DataType, name, shielded(pattern), Rewrite::TypeName(to))
    }
}

static GLOBAL: Lazy<RuleCatalog> = Lazy::new(RuleCatalog::new);

/// The ordered rule list.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleCatalog {
    /// Build the full PostgreSQL -> Sybase catalog.
    pub fn new() -> Self {
        use Category::*;

        let mut rules = vec![
            Rule::new(
                IdentifierQuoting,
                "double-quoted identifier",
                compile(r#""((?:[^"]|"")*)""#),
                Rewrite::QuotedIdentifier,
            ),
            // Data types. Precision and zone qualifiers are swallowed.
            Rule::type_name(
                "timestamp",
                r"\bTIMESTAMP\b(?:\s*\(\s*\d+\s*\))?(?:\s+WITH(?:OUT)?\s+TIME\s+ZONE\b)?",
                "DATETIME",
            ),
            Rule::type_name("timestamptz", r"\bTIMESTAMPTZ\b(?:\s*\(\s*\d+\s*\))?", "DATETIME"),
            Rule::type_name("bigserial", r"\b(?:BIGSERIAL|SERIAL8)\b", "NUMERIC(19,0) IDENTITY"),
            Rule::type_name("smallserial", r"\b(?:SMALLSERIAL|SERIAL2)\b", "NUMERIC(5,0) IDENTITY"),
            Rule::type_name("serial", r"\b(?:SERIAL|SERIAL4)\b", "NUMERIC(10,0) IDENTITY"),
            Rule::type_name("boolean", r"\b(?:BOOLEAN|BOOL)\b", "BIT"),
            Rule::type_name("bytea", r"\bBYTEA\b", "IMAGE"),
            Rule::type_name("text", r"\bTEXT\b", "VARCHAR(MAX)"),
            Rule::fixed(BooleanLiteral, "true", r"\bTRUE\b", "1"),
            Rule::fixed(BooleanLiteral, "false", r"\bFALSE\b", "0"),
            Rule::fixed(Concatenation, "concat", r"\|\|", "+"),
            Rule::fixed(Function, "now", r"\bNOW\s*\(\s*\)", "GETDATE()"),
            Rule::fixed(
                Function,
                "current_timestamp",
                r"\bCURRENT_TIMESTAMP\b(?:\s*\(\s*\d*\s*\))?",
                "GETDATE()",
            ),
            Rule::fixed(
                Function,
                "localtimestamp",
                r"\bLOCALTIMESTAMP\b(?:\s*\(\s*\d*\s*\))?",
                "GETDATE()",
            ),
            Rule::fixed(Function, "current_date", r"\bCURRENT_DATE\b", "CONVERT(DATE, GETDATE())"),
            Rule::fixed(
                Function,
                "current_time",
                r"\bCURRENT_TIME\b(?:\s*\(\s*\d*\s*\))?",
                "CONVERT(TIME, GETDATE())",
            ),
            Rule::fixed(Function, "length", r"\bLENGTH\s*\(", "LEN("),
            Rule::fixed(Function, "substr", r"\bSUBSTR\s*\(", "SUBSTRING("),
            Rule::fixed(Function, "random", r"\bRANDOM\s*\(\s*\)", "RAND()"),
            Rule::fixed(Function, "ceil", r"\bCEIL\s*\(", "CEILING("),
            Rule::new(
                CaseInsensitiveLike,
                "ilike",
                shielded(&ilike_pattern()),
                Rewrite::CaseInsensitiveLike,
            ),
            Rule::new(
                Pagination,
                "limit/offset",
                keyword("(?:LIMIT|OFFSET|FETCH)"),
                Rewrite::Pagination,
            ),
            Rule::new(Returning, "returning", keyword("RETURNING"), Rewrite::Returning),
        ];

        rules.sort_by_key(|rule| rule.category);
        Self { rules }
    }

    /// The process-wide catalog, built on first use.
    pub fn global() -> &'static RuleCatalog {
        &GLOBAL
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules of one category, in catalog order.
    pub fn category(&self, category: Category) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |rule| rule.category == category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// `lhs [NOT] ILIKE rhs` where both sides are simple operands.
fn ilike_pattern() -> String {
    let part = format!(r"(?:{BRACKET_IDENT}|\w+)");
    let operand = format!(r"{part}(?:\.{part})*");
    let rhs = format!(r"{LITERAL_PLACEHOLDER}|\$\d+|\?|@\w+|{operand}");
    format!(r"(?P<lhs>{operand})\s+(?P<not>NOT\s+)?ILIKE\s+(?P<rhs>{rhs})")
}
