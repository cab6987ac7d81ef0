use tapcat::{
    Catalog, CatalogEntry, ColumnOrderMap, ColumnSchema, Diagnostic, Error, Inclusion,
    InclusionError, Metadata, Schema, State, resolve,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tapcat=debug".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

/// A user catalog entry with the table selected and the given columns selected.
fn selected_entry(id: &str, columns: &[&str], selected: &[&str]) -> CatalogEntry {
    let mut metadata = Metadata::default();
    metadata.table.selected = Some(true);
    for name in selected {
        metadata.column_mut(name).selected = Some(true);
    }
    CatalogEntry::new(id, id, id)
        .with_database("dev")
        .with_schema(Schema::from_columns(
            columns
                .iter()
                .map(|name| (*name, ColumnSchema::new(Inclusion::Available))),
        ))
        .with_metadata(metadata)
}

fn discovered_entry(id: &str, columns: &[(&str, Inclusion)]) -> CatalogEntry {
    CatalogEntry::new(id, id, id).with_schema(Schema::from_columns(
        columns
            .iter()
            .map(|(name, inclusion)| (*name, ColumnSchema::new(*inclusion))),
    ))
}

fn order_map(orders: &[(&str, &[&str])]) -> ColumnOrderMap {
    let mut map = ColumnOrderMap::new();
    for (stream, columns) in orders {
        map.insert(*stream, columns.iter().copied());
    }
    map
}

fn names(entry: &CatalogEntry) -> Vec<&str> {
    entry.schema.column_names().collect()
}

fn ids(catalog: &Catalog) -> Vec<&str> {
    catalog.stream_ids().collect()
}

fn orders_discovery() -> Catalog {
    Catalog::new(vec![discovered_entry(
        "public-orders",
        &[
            ("id", Inclusion::Automatic),
            ("total", Inclusion::Available),
            ("internal_note", Inclusion::Unsupported),
        ],
    )])
}

fn orders_catalog(order: &[&str]) -> Catalog {
    Catalog::new(vec![selected_entry(
        "public-orders",
        &["total", "internal_note", "ghost_col"],
        &["total", "internal_note", "ghost_col"],
    )])
    .with_column_order(order_map(&[("public-orders", order)]))
}

#[test]
fn test_orders_example() {
    init_tracing();
    let catalog = orders_catalog(&["ghost_col", "total", "id", "internal_note"]);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&orders_discovery(), &catalog, &State::default(), &mut diagnostics).unwrap();

    assert_eq!(ids(&resolved), ["public-orders"]);
    assert_eq!(names(&resolved.streams[0]), ["total", "id"]);
    assert_eq!(
        diagnostics,
        vec![
            Diagnostic::SelectedButUnsupported {
                stream: "public-orders".to_string(),
                table: "public-orders".to_string(),
                columns: vec!["internal_note".to_string()],
            },
            Diagnostic::SelectedButNonexistent {
                stream: "public-orders".to_string(),
                table: "public-orders".to_string(),
                columns: vec!["ghost_col".to_string()],
            },
        ]
    );
}

#[test]
fn test_reordering_the_order_map_reorders_output() {
    let catalog = orders_catalog(&["id", "internal_note", "total", "ghost_col"]);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&orders_discovery(), &catalog, &State::default(), &mut diagnostics).unwrap();
    assert_eq!(names(&resolved.streams[0]), ["id", "total"]);
}

#[test]
fn test_admissible_column_missing_from_order_map_is_dropped() {
    let catalog = orders_catalog(&["total"]);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&orders_discovery(), &catalog, &State::default(), &mut diagnostics).unwrap();
    assert_eq!(names(&resolved.streams[0]), ["total"]);
}

#[test]
fn test_automatic_columns_without_any_selection_metadata() {
    let mut entry = CatalogEntry::new("public-orders", "public-orders", "orders")
        .with_schema(Schema::from_columns([
            ("total", ColumnSchema::new(Inclusion::Available)),
        ]));
    entry.selected = Some(true);
    let catalog = Catalog::new(vec![entry])
        .with_column_order(order_map(&[("public-orders", &["id", "total", "internal_note"])]));

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&orders_discovery(), &catalog, &State::default(), &mut diagnostics).unwrap();
    assert_eq!(names(&resolved.streams[0]), ["id"]);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_unselected_tables_are_dropped() {
    let mut unselected = selected_entry("public-orders", &["total"], &["total"]);
    unselected.metadata.table.selected = Some(false);
    let catalog = Catalog::new(vec![unselected])
        .with_column_order(order_map(&[("public-orders", &["id", "total"])]));

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&orders_discovery(), &catalog, &State::default(), &mut diagnostics).unwrap();
    assert!(resolved.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_missing_table_is_skipped() {
    let catalog = Catalog::new(vec![
        selected_entry("public-gone", &["a"], &["a"]),
        selected_entry("public-orders", &["total"], &["total"]),
    ])
    .with_column_order(order_map(&[
        ("public-gone", &["a"]),
        ("public-orders", &["id", "total"]),
    ]));

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&orders_discovery(), &catalog, &State::default(), &mut diagnostics).unwrap();
    assert_eq!(ids(&resolved), ["public-orders"]);
    assert_eq!(
        diagnostics,
        vec![Diagnostic::TableMissing {
            stream: "public-gone".to_string(),
            database: Some("dev".to_string()),
            table: "public-gone".to_string(),
        }]
    );
}

fn two_streams() -> (Catalog, Catalog) {
    let discovered = Catalog::new(vec![
        discovered_entry("a", &[("id", Inclusion::Automatic)]),
        discovered_entry("b", &[("id", Inclusion::Automatic)]),
    ]);
    let catalog = Catalog::new(vec![
        selected_entry("a", &["id"], &[]),
        selected_entry("b", &["id"], &[]),
    ])
    .with_column_order(order_map(&[("a", &["id"]), ("b", &["id"])]));
    (discovered, catalog)
}

#[test]
fn test_resume_at_second_stream() {
    let (discovered, catalog) = two_streams();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&discovered, &catalog, &State::resuming_at("b"), &mut diagnostics).unwrap();
    assert_eq!(ids(&resolved), ["b"]);
}

#[test]
fn test_resume_at_first_stream_keeps_everything() {
    let (discovered, catalog) = two_streams();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&discovered, &catalog, &State::resuming_at("a"), &mut diagnostics).unwrap();
    assert_eq!(ids(&resolved), ["a", "b"]);
}

#[test]
fn test_resume_marker_matching_nothing_yields_empty_catalog() {
    let (discovered, catalog) = two_streams();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&discovered, &catalog, &State::resuming_at("c"), &mut diagnostics).unwrap();
    assert!(resolved.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_resume_marker_on_unselected_stream_is_never_reached() {
    let (discovered, mut catalog) = two_streams();
    catalog.streams[1].metadata.table.selected = None;
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let resolved = resolve(&discovered, &catalog, &State::resuming_at("b"), &mut diagnostics).unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn test_resume_marker_on_stream_missing_from_discovery() {
    let (mut discovered, mut catalog) = two_streams();
    catalog.streams.push(selected_entry("c", &["id"], &[]));
    catalog.column_order_map.insert("c", ["id"]);
    discovered.streams.push(discovered_entry("c", &[("id", Inclusion::Automatic)]));
    // "b" was dropped at the source since the last run
    discovered.streams.remove(1);

    let report = tapcat::Resolver::new()
        .resolve_with_report(&discovered, &catalog, &State::resuming_at("b"))
        .unwrap();
    assert_eq!(ids(&report.catalog), ["c"]);
    assert_eq!(report.skipped_before_marker, ["a"]);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].code(), "table-missing");
}

#[test]
fn test_unknown_inclusion_fails_whole_resolution() {
    init_tracing();
    let discovered = Catalog::new(vec![
        discovered_entry("a", &[("id", Inclusion::Automatic)]),
        CatalogEntry::new("b", "b", "b").with_schema(Schema::from_columns([
            ("id", ColumnSchema::new(Inclusion::Automatic)),
            ("legacy", ColumnSchema::with_raw_inclusion("deprecated")),
        ])),
    ]);
    let (_, catalog) = two_streams();

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let err = resolve(&discovered, &catalog, &State::default(), &mut diagnostics).unwrap_err();
    match err {
        Error::Inclusion {
            stream,
            column,
            source,
        } => {
            assert_eq!(stream, "b");
            assert_eq!(column, "legacy");
            assert_eq!(source, InclusionError::Unknown("deprecated".to_string()));
        }
        other => panic!("Expected inclusion error, got {:?}", other),
    }
}

#[test]
fn test_resolving_twice_is_stable() {
    let catalog = orders_catalog(&["ghost_col", "total", "id", "internal_note"]);
    let discovered = orders_discovery();

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let once = resolve(&discovered, &catalog, &State::default(), &mut diagnostics).unwrap();
    let twice = resolve(&discovered, &once, &State::default(), &mut diagnostics).unwrap();

    assert_eq!(ids(&once), ids(&twice));
    assert_eq!(names(&once.streams[0]), names(&twice.streams[0]));
    assert_eq!(once, twice);
}

#[test]
fn test_inline_selection_survives_second_resolution() {
    let mut entry = CatalogEntry::new("public-orders", "public-orders", "orders")
        .with_schema(Schema::from_columns([(
            "total",
            ColumnSchema::new(Inclusion::Available).with_selected(true),
        )]));
    entry.metadata.table.selected = Some(true);
    let catalog = Catalog::new(vec![entry])
        .with_column_order(order_map(&[("public-orders", &["total", "id"])]));
    let discovered = orders_discovery();

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let once = resolve(&discovered, &catalog, &State::default(), &mut diagnostics).unwrap();
    assert_eq!(names(&once.streams[0]), ["total", "id"]);
    assert_eq!(once.streams[0].schema.column("total").unwrap().selected, Some(true));
    assert_eq!(once.streams[0].schema.column("id").unwrap().selected, None);

    let twice = resolve(&discovered, &once, &State::default(), &mut diagnostics).unwrap();
    assert_eq!(names(&twice.streams[0]), ["total", "id"]);
    assert_eq!(once, twice);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_inputs_are_not_modified() {
    let catalog = orders_catalog(&["ghost_col", "total", "id", "internal_note"]);
    let discovered = orders_discovery();
    let catalog_before = catalog.clone();
    let discovered_before = discovered.clone();

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    resolve(&discovered, &catalog, &State::resuming_at("public-orders"), &mut diagnostics).unwrap();

    assert_eq!(catalog, catalog_before);
    assert_eq!(discovered, discovered_before);
}
