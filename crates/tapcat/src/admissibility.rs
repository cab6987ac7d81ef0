//! Intersect a selection with what discovery says can be extracted.

use indexmap::IndexSet;
use tapcat_catalog::{CatalogEntry, Inclusion, Schema};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::{Error, Result};

/// The outcome of filtering a selection against a discovered schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Admissible {
    /// Columns to extract: selected and available, plus every automatic column
    pub columns: IndexSet<String>,
    /// Selected columns that discovery marks unsupported
    pub selected_but_unsupported: IndexSet<String>,
    /// Selected columns that discovery does not know
    pub selected_but_nonexistent: IndexSet<String>,
}

impl Admissible {
    /// Report the two mismatch sets for `entry`, if they are non-empty.
    pub fn report(&self, entry: &CatalogEntry, sink: &mut impl DiagnosticSink) {
        if !self.selected_but_unsupported.is_empty() {
            sink.emit(Diagnostic::SelectedButUnsupported {
                stream: entry.tap_stream_id.clone(),
                table: entry.table.clone(),
                columns: self.selected_but_unsupported.iter().cloned().collect(),
            });
        }
        if !self.selected_but_nonexistent.is_empty() {
            sink.emit(Diagnostic::SelectedButNonexistent {
                stream: entry.tap_stream_id.clone(),
                table: entry.table.clone(),
                columns: self.selected_but_nonexistent.iter().cloned().collect(),
            });
        }
    }
}

/// Decide which columns of a discovered table to extract.
///
/// Every discovered column must carry one of the three known inclusion tags;
/// anything else fails with [`Error::Inclusion`] naming `stream`.
///
/// The result keeps selection order for selected columns, followed by
/// automatic columns that were not selected, in discovery order. The caller
/// applies the canonical order afterwards.
pub fn desired_columns(
    stream: &str,
    selected: &IndexSet<String>,
    discovered: &Schema,
) -> Result<Admissible> {
    let mut available = IndexSet::new();
    let mut automatic = IndexSet::new();
    let mut unsupported = IndexSet::new();

    for (name, column) in &discovered.properties {
        let inclusion = column.inclusion().map_err(|source| Error::Inclusion {
            stream: stream.to_string(),
            column: name.clone(),
            source,
        })?;
        match inclusion {
            Inclusion::Available => available.insert(name.as_str()),
            Inclusion::Automatic => automatic.insert(name.as_str()),
            Inclusion::Unsupported => unsupported.insert(name.as_str()),
        };
    }

    let mut admissible = Admissible::default();
    for name in selected {
        let name_str = name.as_str();
        if available.contains(name_str) || automatic.contains(name_str) {
            admissible.columns.insert(name.clone());
        } else if unsupported.contains(name_str) {
            admissible.selected_but_unsupported.insert(name.clone());
        } else {
            admissible.selected_but_nonexistent.insert(name.clone());
        }
    }
    for name in automatic {
        admissible.columns.insert(name.to_string());
    }

    Ok(admissible)
}
