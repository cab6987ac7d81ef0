//! Resolve a user catalog against freshly discovered schema.
//!
//! Before an extraction run starts, the catalog the user edited has to be
//! reconciled with what the source database looks like right now. This crate
//! decides, for every stream:
//! - whether it takes part in the run (selection, resume marker)
//! - which of its columns are extracted (selection, inclusion class)
//! - in which order those columns appear
//!
//! # Example
//!
//! ```
//! use tapcat::{Catalog, CatalogEntry, ColumnSchema, Inclusion, Schema, State, TracingSink};
//!
//! let discovered = Catalog::new(vec![CatalogEntry::new("public-orders", "orders", "orders")
//!     .with_schema(Schema::from_columns([
//!         ("id", ColumnSchema::new(Inclusion::Automatic)),
//!         ("total", ColumnSchema::new(Inclusion::Available)),
//!     ]))]);
//!
//! let mut entry = CatalogEntry::new("public-orders", "orders", "orders")
//!     .with_schema(discovered.streams[0].schema.clone());
//! entry.metadata.table.selected = Some(true);
//! let catalog = Catalog::new(vec![entry]);
//!
//! let resolved = tapcat::resolve(&discovered, &catalog, &State::default(), &mut TracingSink)?;
//! assert_eq!(resolved.streams[0].schema.column_names().collect::<Vec<_>>(), ["id"]);
//! # Ok::<(), tapcat::Error>(())
//! ```
//!
//! Diagnostics about selections that cannot be honored go to a
//! [`DiagnosticSink`]. They never fail the resolution; only a discovered
//! column with an unknown inclusion tag does.

mod admissibility;
pub mod config;
mod diagnostics;
mod error;
mod resolve;
mod selection;

pub use admissibility::{Admissible, desired_columns};
pub use diagnostics::{Diagnostic, DiagnosticSink, Tee, TracingSink};
pub use error::Error;
pub use resolve::{ResolveOptions, ResolveReport, Resolver, resolve};
pub use selection::{CatalogSelection, selected_columns, table_is_selected};

pub use tapcat_catalog::{
    Catalog, CatalogEntry, ColumnMetadata, ColumnOrderMap, ColumnSchema, Inclusion,
    InclusionError, Metadata, Schema, State, TableMetadata,
};

/// Result type for tapcat operations.
pub type Result<T> = std::result::Result<T, Error>;
