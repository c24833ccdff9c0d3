//! Input table loading.
//!
//! Tables are headerless CSV. Each row is `taxon, vernacular[, leaf_type]`;
//! fields are trimmed, extra columns are ignored and blank rows are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, instrument};

use plantpresets_shared::{PresetsError, Result};
use plantpresets_taxon::Taxon;

/// One raw row of an input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonRow {
    /// 1-based line number in the source file.
    pub line: u64,
    pub taxon: String,
    pub vernacular: String,
    pub leaf_type: Option<String>,
}

/// Read all rows of a table file.
pub fn read_rows(path: &Path) -> Result<Vec<TaxonRow>> {
    let file = File::open(path).map_err(|e| PresetsError::io(path, e))?;
    read_rows_from(file, path)
}

/// Read rows from any reader; `path` is used for error messages only.
pub fn read_rows_from<R: Read>(reader: R, path: &Path) -> Result<Vec<TaxonRow>> {
    records(reader, path).collect()
}

/// Load a table and parse every row.
///
/// Rows are parsed as they are read, so the first bad row aborts the load
/// whether its taxon is malformed or a column is missing.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_taxa(path: &Path) -> Result<Vec<Taxon>> {
    let file = File::open(path).map_err(|e| PresetsError::io(path, e))?;
    let taxa = load_taxa_from(file, path)?;
    debug!(taxa = taxa.len(), "table parsed");
    Ok(taxa)
}

/// Parse rows from any reader into taxa, stopping at the first bad row.
pub fn load_taxa_from<R: Read>(reader: R, path: &Path) -> Result<Vec<Taxon>> {
    records(reader, path)
        .map(|row| row.and_then(parse_row))
        .collect()
}

/// Parse one raw row into a taxon.
pub fn parse_row(row: TaxonRow) -> Result<Taxon> {
    Taxon::parse(&row.taxon, row.vernacular, row.leaf_type).map_err(PresetsError::from)
}

/// Non-blank rows of a headerless table, in file order.
fn records<'p, R: Read + 'p>(
    reader: R,
    path: &'p Path,
) -> impl Iterator<Item = Result<TaxonRow>> + 'p {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .into_records()
        .enumerate()
        .filter_map(move |(idx, result)| {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
                    return Some(Err(PresetsError::table(path, line, e.to_string())));
                }
            };
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 1);

            if record.iter().all(str::is_empty) {
                return None;
            }

            let taxon = record.get(0).unwrap_or_default();
            let vernacular = record.get(1).unwrap_or_default();
            if vernacular.is_empty() {
                return Some(Err(PresetsError::table(
                    path,
                    line,
                    format!("missing vernacular name for {taxon:?}"),
                )));
            }

            Some(Ok(TaxonRow {
                line,
                taxon: taxon.to_string(),
                vernacular: vernacular.to_string(),
                leaf_type: record
                    .get(2)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            }))
        })
}
