//! # pg2sybase
//!
//! Translates PostgreSQL statements into Sybase ASE/IQ SQL, purely on text.
//!
//! ## Quick Example
//!
//! ```
//! let sql = pg2sybase::translate(
//!     "SELECT first_name || ' ' || last_name FROM users WHERE active = TRUE LIMIT 10",
//! )?;
//! assert_eq!(sql, "SELECT TOP 10 first_name + ' ' + last_name FROM users WHERE active = 1");
//! # Ok::<(), pg2sybase::TranslateError>(())
//! ```
//!
//! ## Rewrites
//!
//! | PostgreSQL               | Sybase                              |
//! |--------------------------|-------------------------------------|
//! | `"ident"`                | `[ident]`                           |
//! | `SERIAL`                 | `NUMERIC(10,0) IDENTITY`            |
//! | `BOOLEAN` / `BYTEA`      | `BIT` / `IMAGE`                     |
//! | `TEXT`                   | `VARCHAR(MAX)`                      |
//! | `TIMESTAMP [WITH ...]`   | `DATETIME`                          |
//! | `TRUE` / `FALSE`         | `1` / `0`                           |
//! | `a \|\| b`               | `a + b`                             |
//! | `NOW()`                  | `GETDATE()`                         |
//! | `a ILIKE b`              | `UPPER(a) LIKE UPPER(b)`            |
//! | `LIMIT n OFFSET m`       | `TOP n START AT m+1` (projection `*`) |
//! | `RETURNING cols`         | trailing advisory comment           |
//!
//! String literals and comments are never altered.

pub mod config;
pub mod error;
pub mod guard;
pub mod matching;
pub mod pagination;
pub mod returning;
pub mod rules;
pub mod runner;
pub mod translator;

pub use error::{TranslateError, TranslateResult};
pub use rules::RuleCatalog;
pub use translator::{TranslateOptions, Translator};

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::rules::{Category, RuleCatalog};
    pub use crate::translator::{TranslateOptions, Translator};
    pub use crate::{translate, translate_with};
}

/// Translate with the global catalog and default options.
///
/// # Example
///
/// ```
/// let sql = pg2sybase::translate("CREATE TABLE t (id SERIAL)").unwrap();
/// assert_eq!(sql, "CREATE TABLE t (id NUMERIC(10,0) IDENTITY)");
/// ```
pub fn translate(sql: &str) -> TranslateResult<String> {
    Translator::default().translate(sql)
}

/// Translate with the global catalog and the given options.
pub fn translate_with(sql: &str, options: TranslateOptions) -> TranslateResult<String> {
    Translator::new(RuleCatalog::global(), options).translate(sql)
}
