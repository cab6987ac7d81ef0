//! Facet types for the tapcat configuration schema.
//!
//! The configuration lives in `.config/tapcat.styx`:
//!
//! ```text
//! resolve {
//!     strict_column_order false
//!     report_missing_column_order true
//! }
//! ```

use facet::Facet;

/// Top-level tapcat configuration.
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Catalog resolution settings.
    #[facet(default)]
    pub resolve: ResolveConfig,
}

/// Catalog resolution settings.
#[derive(Debug, Clone, Default, Facet)]
pub struct ResolveConfig {
    /// Fail when a resolved stream has no recorded column order, instead of
    /// falling back to the discovered column order.
    #[facet(default)]
    pub strict_column_order: Option<bool>,

    /// Report a diagnostic when falling back to the discovered column order.
    #[facet(default)]
    pub report_missing_column_order: Option<bool>,
}

impl ResolveConfig {
    /// Defaults to `false`.
    pub fn strict_column_order(&self) -> bool {
        self.strict_column_order.unwrap_or(false)
    }

    /// Defaults to `true`.
    pub fn report_missing_column_order(&self) -> bool {
        self.report_missing_column_order.unwrap_or(true)
    }
}
