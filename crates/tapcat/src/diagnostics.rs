//! Advisory diagnostics produced while resolving a catalog.
//!
//! Diagnostics never stop a resolution. They are handed to a
//! [`DiagnosticSink`] supplied by the caller: collect them in a `Vec`, log
//! them through [`TracingSink`], or both with [`Tee`].

use std::fmt;

/// Something the user should know about, but that does not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Columns were selected but discovery marks them unsupported.
    SelectedButUnsupported {
        stream: String,
        table: String,
        columns: Vec<String>,
    },
    /// Columns were selected but discovery does not know them.
    SelectedButNonexistent {
        stream: String,
        table: String,
        columns: Vec<String>,
    },
    /// A selected table is absent from discovery.
    TableMissing {
        stream: String,
        database: Option<String>,
        table: String,
    },
    /// No column order was recorded for the stream; discovery order was used.
    ColumnOrderMissing { stream: String, table: String },
}

impl Diagnostic {
    /// Stable code identifying the kind of diagnostic.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::SelectedButUnsupported { .. } => "selected-but-unsupported",
            Diagnostic::SelectedButNonexistent { .. } => "selected-but-nonexistent",
            Diagnostic::TableMissing { .. } => "table-missing",
            Diagnostic::ColumnOrderMissing { .. } => "column-order-missing",
        }
    }

    /// The stream this diagnostic is about.
    pub fn stream(&self) -> &str {
        match self {
            Diagnostic::SelectedButUnsupported { stream, .. }
            | Diagnostic::SelectedButNonexistent { stream, .. }
            | Diagnostic::TableMissing { stream, .. }
            | Diagnostic::ColumnOrderMissing { stream, .. } => stream,
        }
    }

    /// The columns this diagnostic names, if any.
    pub fn columns(&self) -> &[String] {
        match self {
            Diagnostic::SelectedButUnsupported { columns, .. }
            | Diagnostic::SelectedButNonexistent { columns, .. } => columns,
            Diagnostic::TableMissing { .. } | Diagnostic::ColumnOrderMissing { .. } => &[],
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SelectedButUnsupported { table, columns, .. } => write!(
                f,
                "table {}: columns [{}] were selected but are not supported, skipping them",
                table,
                columns.join(", ")
            ),
            Diagnostic::SelectedButNonexistent { table, columns, .. } => write!(
                f,
                "table {}: columns [{}] were selected but do not exist",
                table,
                columns.join(", ")
            ),
            Diagnostic::TableMissing {
                database, table, ..
            } => write!(
                f,
                "database {} table {} selected but does not exist",
                database.as_deref().unwrap_or("<unknown>"),
                table
            ),
            Diagnostic::ColumnOrderMissing { table, .. } => write!(
                f,
                "table {}: no column order recorded, using discovered order",
                table
            ),
        }
    }
}

/// Receives diagnostics as they are produced.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}

/// Logs every diagnostic as a `WARN` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            code = diagnostic.code(),
            stream = diagnostic.stream(),
            columns = ?diagnostic.columns(),
            "{}",
            diagnostic
        );
    }
}

/// Sends every diagnostic to two sinks.
#[derive(Debug, Clone, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for Tee<A, B> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.0.emit(diagnostic.clone());
        self.1.emit(diagnostic);
    }
}
