//! Translator: guard, run the passes, restore.

use tracing::debug;

use crate::error::TranslateResult;
use crate::guard;
use crate::rules::RuleCatalog;
use crate::runner;

/// Knobs that change rewrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Replace the projection with `*` when emitting `TOP n START AT m`.
    pub collapse_offset_projection: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            collapse_offset_projection: true,
        }
    }
}

/// PostgreSQL -> Sybase translator bound to a rule catalog.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'c> {
    catalog: &'c RuleCatalog,
    options: TranslateOptions,
}

impl Default for Translator<'static> {
    fn default() -> Self {
        Self::new(RuleCatalog::global(), TranslateOptions::default())
    }
}

impl<'c> Translator<'c> {
    pub fn new(catalog: &'c RuleCatalog, options: TranslateOptions) -> Self {
        Self { catalog, options }
    }

    pub fn options(&self) -> TranslateOptions {
        self.options
    }

    /// Translate one PostgreSQL statement (or a `;`-separated script).
    ///
    /// Unknown syntax passes through untouched. The only failure is an
    /// unterminated string literal, in which case nothing is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use pg2sybase::Translator;
    ///
    /// let sql = Translator::default()
    ///     .translate("SELECT * FROM users WHERE active = TRUE LIMIT 10")
    ///     .unwrap();
    /// assert_eq!(sql, "SELECT TOP 10 * FROM users WHERE active = 1");
    /// ```
    pub fn translate(&self, source: &str) -> TranslateResult<String> {
        if source.trim().is_empty() {
            return Ok(source.to_string());
        }

        let mut guarded = guard::protect(source)?;
        runner::apply(&mut guarded, self.catalog, &self.options);
        let translated = guarded.restore(&guarded.text);

        debug!(
            input_len = source.len(),
            output_len = translated.len(),
            "translated statement"
        );
        Ok(translated)
    }
}
