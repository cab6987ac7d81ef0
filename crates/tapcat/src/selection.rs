//! Which tables and columns the user wants to sync.

use indexmap::IndexSet;
use tapcat_catalog::{Catalog, CatalogEntry};

/// Whether the table takes part in the run at all.
///
/// Either the legacy catalog-level flag or the table metadata may select it.
pub fn table_is_selected(entry: &CatalogEntry) -> bool {
    entry.selected == Some(true) || entry.metadata.table.selected == Some(true)
}

/// The columns of `entry` the user intends to sync, in the entry's schema order.
///
/// For each column of the entry's own schema, the first rule that matches wins:
/// 1. metadata `selected` is true
/// 2. metadata `selected-by-default` is true and `selected` was never set
/// 3. the legacy inline `selected` on the column schema is true
///
/// An explicit `selected = false` in metadata only blocks rule 2; the inline
/// flag can still select the column.
pub fn selected_columns(entry: &CatalogEntry) -> IndexSet<String> {
    entry
        .schema
        .properties
        .iter()
        .filter(|(name, column)| {
            let metadata = entry.metadata.column(name);
            let selected = metadata.and_then(|m| m.selected);
            let by_default = metadata.and_then(|m| m.selected_by_default);

            selected == Some(true)
                || (by_default == Some(true) && selected.is_none())
                || column.selected == Some(true)
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Extension trait for [`Catalog`] to add selection queries.
pub trait CatalogSelection {
    /// Streams selected for the run, in catalog order.
    fn selected_streams(&self) -> impl Iterator<Item = &CatalogEntry>;
}

impl CatalogSelection for Catalog {
    fn selected_streams(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.streams.iter().filter(|entry| table_is_selected(entry))
    }
}
