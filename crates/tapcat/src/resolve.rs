//! Catalog resolution: merge the user catalog with freshly discovered schema.
//!
//! Streams are walked in catalog order. Unselected streams are dropped first.
//! When the state carries a resume marker, the walk starts out skipping and
//! becomes active at the first stream whose id equals the marker; that stream
//! and everything after it is resolved. A marker that never matches leaves the
//! result empty, which is expected when the stream has since been removed from
//! the catalog.
//!
//! For each active stream:
//! - the stream is looked up in discovery by `tap_stream_id`
//! - the selected columns are filtered against discovery (see
//!   [`desired_columns`])
//! - the survivors are put in the stream's canonical order
//! - a new schema is built from the discovered column definitions, keeping
//!   the user's inline `selected` flag so the result resolves the same way

use std::path::Path;

use indexmap::IndexSet;
use tapcat_catalog::{Catalog, CatalogEntry, Schema, State};
use tapcat_config::{Config, ResolveConfig};

use crate::admissibility::desired_columns;
use crate::config;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Tee, TracingSink};
use crate::selection::{selected_columns, table_is_selected};
use crate::{Error, Result};

/// Runtime form of [`ResolveConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Fail instead of falling back to discovery order when a stream has no
    /// recorded column order.
    pub strict_column_order: bool,
    /// Emit [`Diagnostic::ColumnOrderMissing`] when falling back.
    pub report_missing_column_order: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            strict_column_order: false,
            report_missing_column_order: true,
        }
    }
}

impl From<&ResolveConfig> for ResolveOptions {
    fn from(config: &ResolveConfig) -> Self {
        Self {
            strict_column_order: config.strict_column_order(),
            report_missing_column_order: config.report_missing_column_order(),
        }
    }
}

impl From<&Config> for ResolveOptions {
    fn from(config: &Config) -> Self {
        Self::from(&config.resolve)
    }
}

/// A resolved catalog together with what happened along the way.
#[derive(Debug, Clone, Default)]
pub struct ResolveReport {
    /// The catalog to extract.
    pub catalog: Catalog,
    /// Every diagnostic that was emitted.
    pub diagnostics: Vec<Diagnostic>,
    /// Selected streams passed over before the resume marker was reached.
    pub skipped_before_marker: Vec<String>,
}

/// Where the walk over selected streams stands with respect to the resume marker.
#[derive(Debug, Clone, Copy)]
enum Scan<'a> {
    Skipping { marker: &'a str },
    Active,
}

/// Resolves user catalogs against discovered schema.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    /// Create a resolver with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with the given options.
    pub fn with_options(options: ResolveOptions) -> Self {
        Self { options }
    }

    /// Create a resolver from the closest `.config/tapcat.styx` at or above
    /// `start`. Without a config file the defaults apply.
    pub fn from_config_dir(start: &Path) -> Result<Self> {
        let options = match config::discover(start)? {
            Some((config, _)) => ResolveOptions::from(&config),
            None => ResolveOptions::default(),
        };
        Ok(Self::with_options(options))
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve `catalog` against `discovered`, sending diagnostics to `sink`.
    ///
    /// Inputs are not modified. On error no catalog is returned at all.
    pub fn resolve(
        &self,
        discovered: &Catalog,
        catalog: &Catalog,
        state: &State,
        sink: &mut impl DiagnosticSink,
    ) -> Result<Catalog> {
        let mut skipped = Vec::new();
        self.run(discovered, catalog, state, sink, &mut skipped)
    }

    /// Resolve, logging diagnostics through `tracing` and collecting them in
    /// the returned report.
    pub fn resolve_with_report(
        &self,
        discovered: &Catalog,
        catalog: &Catalog,
        state: &State,
    ) -> Result<ResolveReport> {
        let mut diagnostics = Vec::new();
        let mut skipped_before_marker = Vec::new();
        let resolved = {
            let mut sink = Tee(TracingSink, &mut diagnostics);
            self.run(
                discovered,
                catalog,
                state,
                &mut sink,
                &mut skipped_before_marker,
            )?
        };
        Ok(ResolveReport {
            catalog: resolved,
            diagnostics,
            skipped_before_marker,
        })
    }

    fn run(
        &self,
        discovered: &Catalog,
        catalog: &Catalog,
        state: &State,
        sink: &mut impl DiagnosticSink,
        skipped: &mut Vec<String>,
    ) -> Result<Catalog> {
        let span = tracing::debug_span!(
            "resolve",
            streams = catalog.len(),
            discovered = discovered.len(),
            currently_syncing = state.currently_syncing(),
        );
        let _guard = span.enter();

        let mut scan = match state.currently_syncing() {
            Some(marker) => Scan::Skipping { marker },
            None => Scan::Active,
        };

        let mut result =
            Catalog::new(Vec::new()).with_column_order(catalog.column_order_map.clone());

        for entry in catalog.streams.iter().filter(|entry| table_is_selected(entry)) {
            if let Scan::Skipping { marker } = scan {
                if entry.tap_stream_id != marker {
                    tracing::trace!(
                        stream = %entry.tap_stream_id,
                        "skipping stream before resume marker"
                    );
                    skipped.push(entry.tap_stream_id.clone());
                    continue;
                }
                tracing::debug!(stream = %entry.tap_stream_id, "reached resume marker");
                scan = Scan::Active;
            }

            if let Some(resolved) = self.resolve_entry(entry, discovered, catalog, sink)? {
                result.streams.push(resolved);
            }
        }

        if let Scan::Skipping { marker } = scan {
            tracing::debug!(marker, "resume marker matched no selected stream");
        }

        Ok(result)
    }

    fn resolve_entry(
        &self,
        entry: &CatalogEntry,
        discovered: &Catalog,
        catalog: &Catalog,
        sink: &mut impl DiagnosticSink,
    ) -> Result<Option<CatalogEntry>> {
        let Some(discovered_entry) = discovered.get_stream(&entry.tap_stream_id) else {
            sink.emit(Diagnostic::TableMissing {
                stream: entry.tap_stream_id.clone(),
                database: entry.database.clone(),
                table: entry.table.clone(),
            });
            return Ok(None);
        };
        let discovered_schema = &discovered_entry.schema;

        let selected = selected_columns(entry);
        let admissible = desired_columns(&entry.tap_stream_id, &selected, discovered_schema)?;
        admissible.report(entry, sink);

        let ordered = self.order_columns(
            entry,
            catalog,
            discovered_schema,
            &admissible.columns,
            sink,
        )?;

        // Shape comes from discovery; the inline selection flag stays the user's.
        let schema = Schema::from_columns(ordered.into_iter().filter_map(|name| {
            let mut column = discovered_schema.column(name)?.clone();
            column.selected = entry.schema.column(name).and_then(|user| user.selected);
            Some((name, column))
        }));

        tracing::debug!(
            stream = %entry.tap_stream_id,
            selected = selected.len(),
            columns = schema.properties.len(),
            "resolved stream"
        );

        Ok(Some(CatalogEntry {
            tap_stream_id: entry.tap_stream_id.clone(),
            stream: entry.stream.clone(),
            table: entry.table.clone(),
            database: entry.database.clone(),
            selected: entry.selected,
            schema,
            metadata: entry.metadata.clone(),
        }))
    }

    /// Put `admissible` in the stream's canonical order.
    ///
    /// Columns missing from the order map are dropped. Duplicate names in the
    /// order map keep their first position.
    fn order_columns<'a>(
        &self,
        entry: &CatalogEntry,
        catalog: &'a Catalog,
        discovered: &'a Schema,
        admissible: &IndexSet<String>,
        sink: &mut impl DiagnosticSink,
    ) -> Result<IndexSet<&'a str>> {
        if let Some(order) = catalog.column_order_map.get(&entry.stream) {
            return Ok(order
                .iter()
                .map(String::as_str)
                .filter(|name| admissible.contains(*name))
                .collect());
        }

        if self.options.strict_column_order {
            return Err(Error::MissingColumnOrder {
                stream: entry.stream.clone(),
            });
        }
        if self.options.report_missing_column_order {
            sink.emit(Diagnostic::ColumnOrderMissing {
                stream: entry.tap_stream_id.clone(),
                table: entry.table.clone(),
            });
        }
        Ok(discovered
            .column_names()
            .filter(|name| admissible.contains(*name))
            .collect())
    }
}

/// Resolve `catalog` against `discovered` with default options.
///
/// See [`Resolver::resolve`].
pub fn resolve(
    discovered: &Catalog,
    catalog: &Catalog,
    state: &State,
    sink: &mut impl DiagnosticSink,
) -> Result<Catalog> {
    Resolver::new().resolve(discovered, catalog, state, sink)
}
