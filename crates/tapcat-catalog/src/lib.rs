//! Catalog types for tapcat.
//!
//! This crate contains the in-memory shapes that the resolver works on: the
//! user catalog, the discovered schema, per-stream metadata and the resume
//! state. Loading these from disk is left to the caller.
//!
//! Two schemas are usually in play for the same table:
//! - the one in the user catalog, which may be stale but carries selection
//! - the one produced by discovery, which is authoritative for shape and
//!   [`Inclusion`]

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How a column takes part in extraction, as reported by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inclusion {
    /// Always extracted, whatever the selection says.
    Automatic,
    /// Extracted only when selected.
    Available,
    /// Never extracted.
    Unsupported,
}

impl Inclusion {
    /// The tag as it appears in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Inclusion::Automatic => "automatic",
            Inclusion::Available => "available",
            Inclusion::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Inclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Inclusion {
    type Err = InclusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(Inclusion::Automatic),
            "available" => Ok(Inclusion::Available),
            "unsupported" => Ok(Inclusion::Unsupported),
            other => Err(InclusionError::Unknown(other.to_string())),
        }
    }
}

/// A column carried an inclusion tag we do not understand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InclusionError {
    #[error("unknown inclusion {0:?}")]
    Unknown(String),

    #[error("missing inclusion")]
    Missing,
}

/// A column definition within a [`Schema`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnSchema {
    /// JSON types the column's values may take (e.g. `["null", "integer"]`)
    pub json_type: Vec<String>,
    /// JSON schema format (e.g. `date-time`)
    pub format: Option<String>,
    /// Maximum length for character columns
    pub max_length: Option<u32>,
    /// Free-form description
    pub description: Option<String>,
    /// Raw inclusion tag, validated by [`ColumnSchema::inclusion`]
    pub inclusion: Option<String>,
    /// Legacy inline selection flag.
    ///
    /// Older catalogs mark columns as selected here rather than in
    /// [`ColumnMetadata::selected`]. Both are honored.
    pub selected: Option<bool>,
}

impl ColumnSchema {
    /// Create a column with the given inclusion and no type information.
    pub fn new(inclusion: Inclusion) -> Self {
        Self {
            inclusion: Some(inclusion.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Create a column whose inclusion tag is taken verbatim.
    pub fn with_raw_inclusion(inclusion: impl Into<String>) -> Self {
        Self {
            inclusion: Some(inclusion.into()),
            ..Self::default()
        }
    }

    /// Add a JSON type.
    pub fn with_type(mut self, json_type: impl Into<String>) -> Self {
        self.json_type.push(json_type.into());
        self
    }

    /// Set the JSON schema format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the legacy inline selection flag.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    /// Parse the inclusion tag.
    pub fn inclusion(&self) -> Result<Inclusion, InclusionError> {
        self.inclusion
            .as_deref()
            .ok_or(InclusionError::Missing)?
            .parse()
    }
}

/// The shape of one table: an object whose properties are its columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    /// Columns, indexed by name
    pub properties: IndexMap<String, ColumnSchema>,
}

impl Schema {
    /// JSON type of every table schema.
    pub const JSON_TYPE: &'static str = "object";

    /// Create a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from `(name, column)` pairs, keeping their order.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, ColumnSchema)>,
    ) -> Self {
        Self {
            properties: columns
                .into_iter()
                .map(|(name, column)| (name.into(), column))
                .collect(),
        }
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.properties.get(name)
    }

    /// Column names, in property order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

/// Table-level metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableMetadata {
    /// Whether the user selected this table
    pub selected: Option<bool>,
    /// Replication method chosen for the table (`FULL_TABLE`, `INCREMENTAL`)
    pub replication_method: Option<String>,
    /// Column used as the incremental bookmark
    pub replication_key: Option<String>,
    /// Columns forming the table's key
    pub key_properties: Vec<String>,
    /// Whether the source object is a view
    pub is_view: Option<bool>,
    /// Source database name
    pub database_name: Option<String>,
    /// Source schema name
    pub schema_name: Option<String>,
    /// Row count estimate from discovery
    pub row_count: Option<u64>,
}

/// Column-level metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnMetadata {
    /// Explicit user selection
    pub selected: Option<bool>,
    /// Selection that applies when the user made no explicit choice
    pub selected_by_default: Option<bool>,
    /// Inclusion as recorded in metadata (informational; the schema's tag is used)
    pub inclusion: Option<String>,
    /// Source SQL datatype
    pub sql_datatype: Option<String>,
}

/// Metadata attached to a catalog entry.
///
/// Table-level and column-level flags are kept apart: nothing set on a column
/// ever changes the table's flags, and the other way around.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    /// Table-level flags
    pub table: TableMetadata,
    /// Column-level flags, indexed by column name
    pub columns: IndexMap<String, ColumnMetadata>,
}

impl Metadata {
    /// Get the metadata for a column.
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.get(name)
    }

    /// Get the metadata for a column, creating an empty entry if needed.
    pub fn column_mut(&mut self, name: &str) -> &mut ColumnMetadata {
        self.columns.entry(name.to_string()).or_default()
    }
}

/// One table's extraction definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogEntry {
    /// Globally unique stream identifier; entries are matched on this
    pub tap_stream_id: String,
    /// Logical stream name, used to look up column order
    pub stream: String,
    /// Physical table name
    pub table: String,
    /// Source database, if known
    pub database: Option<String>,
    /// Legacy catalog-level selection flag
    pub selected: Option<bool>,
    /// Table shape
    pub schema: Schema,
    /// Selection and replication metadata
    pub metadata: Metadata,
}

impl CatalogEntry {
    /// Create an entry with an empty schema and no metadata.
    pub fn new(
        tap_stream_id: impl Into<String>,
        stream: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            tap_stream_id: tap_stream_id.into(),
            stream: stream.into(),
            table: table.into(),
            ..Self::default()
        }
    }

    /// Set the schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the source database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// Canonical column order per stream name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnOrderMap {
    orders: IndexMap<String, Vec<String>>,
}

impl ColumnOrderMap {
    /// Create an empty order map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the order map from each entry's schema property order.
    ///
    /// Later entries with the same stream name replace earlier ones.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        catalog
            .streams
            .iter()
            .map(|entry| {
                (
                    entry.stream.clone(),
                    entry.schema.column_names().map(str::to_string).collect(),
                )
            })
            .collect()
    }

    /// Record the order for a stream, replacing any previous one.
    pub fn insert<S: Into<String>>(
        &mut self,
        stream: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) {
        self.orders.insert(
            stream.into(),
            columns.into_iter().map(Into::into).collect(),
        );
    }

    /// Get the order for a stream.
    pub fn get(&self, stream: &str) -> Option<&[String]> {
        self.orders.get(stream).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for ColumnOrderMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            orders: iter.into_iter().collect(),
        }
    }
}

/// A set of streams plus the column order to preserve for each.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    /// Streams, in run order
    pub streams: Vec<CatalogEntry>,
    /// Canonical column order per stream name
    pub column_order_map: ColumnOrderMap,
}

impl Catalog {
    /// Create a catalog with no recorded column order.
    pub fn new(streams: Vec<CatalogEntry>) -> Self {
        Self {
            streams,
            column_order_map: ColumnOrderMap::default(),
        }
    }

    /// Set the column order map.
    pub fn with_column_order(mut self, column_order_map: ColumnOrderMap) -> Self {
        self.column_order_map = column_order_map;
        self
    }

    /// Find a stream by its identifier.
    pub fn get_stream(&self, tap_stream_id: &str) -> Option<&CatalogEntry> {
        self.streams
            .iter()
            .find(|entry| entry.tap_stream_id == tap_stream_id)
    }

    /// Stream identifiers, in run order.
    pub fn stream_ids(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(|entry| entry.tap_stream_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

/// Resume state left behind by a previous run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    /// The stream that was being synced when the previous run stopped
    pub currently_syncing: Option<String>,
}

impl State {
    /// State for a run resuming at the given stream.
    pub fn resuming_at(tap_stream_id: impl Into<String>) -> Self {
        Self {
            currently_syncing: Some(tap_stream_id.into()),
        }
    }

    /// The resume marker, if any. An empty marker counts as none.
    pub fn currently_syncing(&self) -> Option<&str> {
        self.currently_syncing
            .as_deref()
            .filter(|marker| !marker.is_empty())
    }
}
