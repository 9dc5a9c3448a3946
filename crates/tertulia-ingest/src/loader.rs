//! Bulk loading of normalized CSV tables into the graph.
//!
//! One independent write per row, sequential, no retry. A failing row does
//! not stop the file and earlier rows stay committed; the [`LoadReport`]
//! says what happened to each row.

use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::Serialize;
use tertulia_core::properties::parse_integer;
use tertulia_core::{Label, Properties, PropertyValue, RelationKind};
use tertulia_graph::LibraryGraph;

use crate::error::{IngestError, Result};
use crate::table::CsvTable;

// ── File Dispatch ────────────────────────────────────────────────

/// What a recognized upload contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Entity(Label),
    Relation(RelationKind),
}

impl FileKind {
    /// Match a normalized (basename, lower-case) filename exactly.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let kind = match filename {
            "autor.csv" => Self::Entity(Label::Autor),
            "libro.csv" => Self::Entity(Label::Libro),
            "persona.csv" => Self::Entity(Label::Persona),
            "club.csv" => Self::Entity(Label::Club),
            "autor-libro.csv" => Self::Relation(RelationKind::Autoria),
            "persona-libro.csv" => Self::Relation(RelationKind::Lectura),
            "persona-club.csv" => Self::Relation(RelationKind::Membresia),
            "club-libro.csv" => Self::Relation(RelationKind::Recomendacion),
            other => return Err(IngestError::UnrecognizedFile(other.to_string())),
        };
        Ok(kind)
    }

    fn describe(&self) -> String {
        match self {
            Self::Entity(label) => label.to_string(),
            Self::Relation(kind) => kind.rel_type().to_string(),
        }
    }
}

/// Reduce an uploaded filename to its lower-cased basename and require `.csv`.
pub fn normalize_filename(raw: &str) -> Result<String> {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if base.is_empty() {
        return Err(IngestError::EmptyFilename);
    }
    match base.rsplit_once('.') {
        Some((stem, "csv")) if !stem.is_empty() => Ok(base),
        _ => Err(IngestError::NotCsv(base)),
    }
}

// ── Column Maps ──────────────────────────────────────────────────

/// CSV columns (lower-cased headers, aliases in order) for one entity file.
struct EntityColumns {
    key: &'static [&'static str],
    fields: &'static [(&'static str, &'static [&'static str])],
}

fn entity_columns(label: Label) -> EntityColumns {
    match label {
        Label::Autor => EntityColumns {
            key: &["idautor"],
            fields: &[
                ("nombreCompleto", &["nombre", "nombrecompleto"]),
                ("nacionalidad", &["nacionalidad"]),
            ],
        },
        Label::Persona => EntityColumns {
            key: &["id", "idpersona"],
            fields: &[
                ("nombreCompleto", &["nombre", "nombrecompleto"]),
                ("tipoLector", &["tipolector"]),
            ],
        },
        Label::Libro => EntityColumns {
            key: &["idlibro"],
            fields: &[
                ("titulo", &["titulo"]),
                ("generoLiterario", &["genero", "generoliterario"]),
                ("añoPublicacion", &["anno", "añopublicacion"]),
            ],
        },
        Label::Club => EntityColumns {
            key: &["idclub"],
            fields: &[
                ("nombre", &["nombre"]),
                ("ubicacion", &["ubicacion"]),
                ("tematica", &["tematica"]),
            ],
        },
    }
}

/// Source and target key columns for one relationship file.
fn relation_columns(kind: RelationKind) -> (&'static [&'static str], &'static [&'static str]) {
    match kind {
        RelationKind::Autoria => (&["idautor"], &["idlibro"]),
        RelationKind::Lectura => (&["id", "idpersona"], &["idlibro"]),
        RelationKind::Membresia => (&["idpersona", "id"], &["idclub"]),
        RelationKind::Recomendacion => (&["idclub"], &["idlibro"]),
    }
}

// ── Report ───────────────────────────────────────────────────────

/// What happened to one data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Loaded,
    Skipped { reason: String },
    /// A relationship row whose endpoints were not both found.
    Unmatched,
    /// The write failed; the message is the raw database error.
    Failed { error: String },
}

/// A non-loaded row, by 1-based line number in the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub line: usize,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub file: String,
    pub target: String,
    pub delimiter: String,
    pub rows: usize,
    pub loaded: usize,
    pub skipped: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub issues: Vec<RowIssue>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl LoadReport {
    fn new(file: &str, kind: FileKind, table: &CsvTable) -> Self {
        let now = Utc::now();
        Self {
            file: file.to_string(),
            target: kind.describe(),
            delimiter: (table.detection.delimiter as char).to_string(),
            rows: 0,
            loaded: 0,
            skipped: 0,
            unmatched: 0,
            failed: 0,
            issues: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    fn record(&mut self, line: usize, outcome: RowOutcome) {
        self.rows += 1;
        match &outcome {
            RowOutcome::Loaded => {
                self.loaded += 1;
                return;
            }
            RowOutcome::Skipped { .. } => self.skipped += 1,
            RowOutcome::Unmatched => self.unmatched += 1,
            RowOutcome::Failed { .. } => self.failed += 1,
        }
        self.issues.push(RowIssue { line, outcome });
    }
}

// ── Loader ───────────────────────────────────────────────────────

/// Dispatches uploads to the entity and relationship loaders.
#[derive(Clone)]
pub struct BulkLoader {
    graph: LibraryGraph,
}

impl BulkLoader {
    pub fn new(graph: LibraryGraph) -> Self {
        Self { graph }
    }

    /// Load one uploaded file.
    ///
    /// The filename is checked before the content is parsed, so an
    /// unrecognized name is reported as such even for malformed content.
    pub async fn load(&self, filename: &str, bytes: &[u8]) -> Result<LoadReport> {
        let file = normalize_filename(filename)?;
        let kind = FileKind::from_filename(&file)?;
        let table = CsvTable::parse(bytes)?;

        tracing::info!(
            file = %file,
            kind = %kind.describe(),
            rows = table.rows.len(),
            columns = table.headers.len(),
            "Loading CSV"
        );

        let mut report = LoadReport::new(&file, kind, &table);
        match kind {
            FileKind::Entity(label) => self.load_entities(label, &table, &mut report).await?,
            FileKind::Relation(rel) => self.load_relations(rel, &table, &mut report).await?,
        }
        report.finished_at = Utc::now();

        tracing::info!(
            file = %file,
            loaded = report.loaded,
            skipped = report.skipped,
            unmatched = report.unmatched,
            failed = report.failed,
            "CSV load finished"
        );
        Ok(report)
    }

    async fn load_entities(
        &self,
        label: Label,
        table: &CsvTable,
        report: &mut LoadReport,
    ) -> Result<()> {
        let columns = entity_columns(label);
        let key_col = required_column(table, columns.key)?;
        let fields: Vec<(&'static str, usize)> = columns
            .fields
            .iter()
            .filter_map(|(property, aliases)| table.column(aliases).map(|col| (*property, col)))
            .collect();

        let key_name = &table.headers[key_col];

        for (index, row) in table.rows.iter().enumerate() {
            let outcome = match entity_row(label, table, row, key_col, key_name, &fields) {
                Ok((csv_id, props)) => match self.graph.upsert_by_csv_id(csv_id, &props).await {
                    Ok(()) => RowOutcome::Loaded,
                    Err(e) => failed(table.line(index), e),
                },
                Err(reason) => RowOutcome::Skipped { reason },
            };
            report.record(table.line(index), outcome);
        }
        Ok(())
    }

    async fn load_relations(
        &self,
        kind: RelationKind,
        table: &CsvTable,
        report: &mut LoadReport,
    ) -> Result<()> {
        let (source_names, target_names) = relation_columns(kind);
        let source_col = required_column(table, source_names)?;
        let target_col = required_column(table, target_names)?;

        for (index, row) in table.rows.iter().enumerate() {
            let ids = surrogate_id(table, row, source_col, &table.headers[source_col]).and_then(
                |source| {
                    surrogate_id(table, row, target_col, &table.headers[target_col])
                        .map(|target| (source, target))
                },
            );
            let outcome = match ids {
                Ok((source, target)) => {
                    match self.graph.link_by_csv_id(kind, source, target).await {
                        Ok(true) => RowOutcome::Loaded,
                        Ok(false) => RowOutcome::Unmatched,
                        Err(e) => failed(table.line(index), e),
                    }
                }
                Err(reason) => RowOutcome::Skipped { reason },
            };
            report.record(table.line(index), outcome);
        }
        Ok(())
    }
}

fn required_column(table: &CsvTable, names: &[&str]) -> Result<usize> {
    table
        .column(names)
        .ok_or_else(|| IngestError::MissingColumn(names.join(" | ")))
}

fn surrogate_id(
    table: &CsvTable,
    row: &StringRecord,
    column: usize,
    name: &str,
) -> std::result::Result<i64, String> {
    let raw = table
        .cell(row, column)
        .ok_or_else(|| format!("missing {name}"))?;
    parse_integer(raw).ok_or_else(|| format!("{name} is not an integer: '{raw}'"))
}

fn entity_row(
    label: Label,
    table: &CsvTable,
    row: &StringRecord,
    key_col: usize,
    key_name: &str,
    fields: &[(&'static str, usize)],
) -> std::result::Result<(i64, Properties), String> {
    let csv_id = surrogate_id(table, row, key_col, key_name)?;

    let mut props = Properties::new(label);
    for (property, col) in fields {
        let Some(cell) = table.cell(row, *col) else {
            continue;
        };
        let Some(def) = label.property(property) else {
            continue;
        };
        let value = PropertyValue::from_cell(label, def, cell).map_err(|e| e.to_string())?;
        props.insert(property, value).map_err(|e| e.to_string())?;
    }
    Ok((csv_id, props))
}

fn failed(line: usize, error: tertulia_graph::GraphError) -> RowOutcome {
    tracing::warn!(line, error = %error, "CSV row write failed");
    RowOutcome::Failed {
        error: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tertulia_graph::recording::RecordingStore;
    use tertulia_graph::Param;

    use super::*;

    fn loader() -> (Arc<RecordingStore>, BulkLoader) {
        let store = Arc::new(RecordingStore::new());
        let loader = BulkLoader::new(LibraryGraph::new(store.clone()));
        (store, loader)
    }

    #[test]
    fn test_file_kinds() {
        assert_eq!(
            FileKind::from_filename("autor-libro.csv").unwrap(),
            FileKind::Relation(RelationKind::Autoria)
        );
        assert_eq!(
            FileKind::from_filename("club.csv").unwrap(),
            FileKind::Entity(Label::Club)
        );
        assert!(matches!(
            FileKind::from_filename("persona-club2.csv"),
            Err(IngestError::UnrecognizedFile(_))
        ));
    }

    #[test]
    fn test_normalize_filename() {
        assert_eq!(normalize_filename("Libro.CSV").unwrap(), "libro.csv");
        assert_eq!(
            normalize_filename("../../etc/Persona-Libro.csv").unwrap(),
            "persona-libro.csv"
        );
        assert_eq!(normalize_filename("C:\\data\\Club.csv").unwrap(), "club.csv");
        assert!(matches!(normalize_filename(""), Err(IngestError::EmptyFilename)));
        assert!(matches!(normalize_filename("libro.xlsx"), Err(IngestError::NotCsv(_))));
        assert!(matches!(normalize_filename(".csv"), Err(IngestError::NotCsv(_))));
    }

    #[tokio::test]
    async fn test_libro_partial_rows() {
        let (store, loader) = loader();
        let csv = "IdLibro;Titulo;Genero;Anno\n1;Rayuela;Novela;1963\n;Sin id;Cuento;2001\n2;Ficciones;Cuento;1944\n";

        let report = loader.load("libro.csv", csv.as_bytes()).await.unwrap();

        assert_eq!(report.rows, 3);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            report.issues,
            vec![RowIssue {
                line: 3,
                outcome: RowOutcome::Skipped {
                    reason: "missing idlibro".into()
                },
            }]
        );

        let statements = store.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].get_param("csv_id"), Some(&Param::Integer(1)));
        assert_eq!(statements[1].get_param("csv_id"), Some(&Param::Integer(2)));
        assert!(statements[0].cypher.contains("n.`añoPublicacion` = $v0"));
        assert_eq!(statements[0].get_param("v0"), Some(&Param::Integer(1963)));
        assert!(statements[0].cypher.contains("n.`generoLiterario`"));
    }

    #[tokio::test]
    async fn test_failed_row_keeps_earlier_writes() {
        let (store, loader) = loader();
        store.push_write(vec![]);
        store.push_write_error("connection reset");
        let csv = "idautor,nombre,nacionalidad\n1,Borges,AR\n2,Cortázar,AR\n3,Rulfo,MX\n";

        let report = loader.load("autor.csv", csv.as_bytes()).await.unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.issues[0].line, 3);
        assert!(matches!(
            &report.issues[0].outcome,
            RowOutcome::Failed { error } if error.contains("connection reset")
        ));
        assert_eq!(store.statements().len(), 3);
    }

    #[tokio::test]
    async fn test_entity_maps_columns_to_schema() {
        let (store, loader) = loader();
        let csv = "id;Nombre;TipoLector\n7;Ana;voraz\n";

        loader.load("persona.csv", csv.as_bytes()).await.unwrap();

        let stmt = &store.statements()[0];
        assert!(stmt
            .cypher
            .starts_with("MERGE (n:Persona {`nombreCompleto`: $identifier}) SET n.csvId = $csv_id"));
        assert!(stmt.cypher.contains("n.`tipoLector` = $v0"));
        assert_eq!(stmt.get_param("identifier"), Some(&Param::Text("Ana".into())));
        assert_eq!(stmt.get_param("v0"), Some(&Param::Text("voraz".into())));
    }

    #[tokio::test]
    async fn test_rows_reach_nodes_created_over_http() {
        let (store, loader) = loader();
        let csv = "idautor;nombre;nacionalidad
1;Borges;AR
2;;MX
";

        let report = loader.load("autor.csv", csv.as_bytes()).await.unwrap();
        assert_eq!(report.loaded, 2);

        let statements = store.statements();
        // Same node a POST /autores with nombreCompleto "Borges" created.
        assert!(statements[0]
            .cypher
            .starts_with("MERGE (n:Autor {`nombreCompleto`: $identifier})"));
        assert_eq!(
            statements[0].get_param("identifier"),
            Some(&Param::Text("Borges".into()))
        );
        assert!(!statements[0].cypher.contains("n.`nombreCompleto` ="));
        // Without a name the surrogate key is all there is.
        assert!(statements[1]
            .cypher
            .starts_with("MERGE (n:Autor {csvId: $csv_id})"));
        assert_eq!(statements[1].get_param("csv_id"), Some(&Param::Integer(2)));
    }

    #[tokio::test]
    async fn test_bad_integer_property_skips_row() {
        let (store, loader) = loader();
        let csv = "idlibro,titulo,anno\n1,Rayuela,mil\n";

        let report = loader.load("libro.csv", csv.as_bytes()).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert!(store.statements().is_empty());
    }

    #[tokio::test]
    async fn test_relation_rows() {
        let (store, loader) = loader();
        store.push_write(vec![json!({"linked": 1})]);
        store.push_write(vec![json!({"linked": 0})]);
        let csv = "idPersona;idClub\n1;10\n2;99\nx;10\n";

        let report = loader.load("persona-club.csv", csv.as_bytes()).await.unwrap();

        assert_eq!(report.target, "PERTENECE_A");
        assert_eq!(report.loaded, 1);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.skipped, 1);
        let statements = store.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].get_param("target_id"), Some(&Param::Integer(99)));
    }

    #[tokio::test]
    async fn test_missing_key_column_rejects_file() {
        let (store, loader) = loader();
        let err = loader
            .load("club-libro.csv", b"club;libro\n1;2\n")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn(_)));
        assert!(store.statements().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_name_checked_before_content() {
        let (store, loader) = loader();
        let err = loader.load("otros.csv", b"onlycolumn\nval").await.unwrap_err();
        assert!(matches!(err, IngestError::UnrecognizedFile(_)));

        let err = loader.load("club.csv", b"onlycolumn\nval").await.unwrap_err();
        assert!(matches!(err, IngestError::SingleColumn));
        assert!(store.statements().is_empty());
    }
}
