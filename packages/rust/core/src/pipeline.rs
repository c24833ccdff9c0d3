//! End-to-end `generate` pipeline: tables → taxa → preset tree → XML → archive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument, warn};

use plantpresets_presets::{EmitterOptions, Group, PresetDocument, chunk_id, emit_table, to_xml};
use plantpresets_shared::{AppConfig, PresetsError, Result, resolve_path};
use plantpresets_taxon::{Taxon, group_taxa};

use crate::package;
use crate::table;

/// One input table, resolved to a path.
#[derive(Debug, Clone)]
pub struct TableInput {
    /// Name of the top-level group.
    pub group: String,
    pub path: PathBuf,
}

/// Packaging settings; `None` in [`GenerateConfig`] skips packaging.
#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Archiver executable.
    pub command: String,
    /// Archive file to produce.
    pub archive_path: PathBuf,
}

/// Configuration for the `generate` pipeline.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Tables in emission order.
    pub tables: Vec<TableInput>,
    /// Directory the preset file is written to.
    pub dist_dir: PathBuf,
    /// Preset file name inside `dist_dir`.
    pub file_name: String,
    /// Locale code for `baselanguage`.
    pub base_language: String,
    pub emitter: EmitterOptions,
    /// Value of the root `version` attribute.
    pub version: Option<String>,
    pub archive: Option<ArchiveSettings>,
}

impl GenerateConfig {
    /// Resolve an app config against the directory its paths are relative to.
    ///
    /// An empty version string is treated as absent.
    pub fn from_app_config(config: &AppConfig, project_dir: &Path, version: Option<String>) -> Self {
        let dist_dir = resolve_path(project_dir, &config.output.dist_dir);
        let archive = config.archive.enabled.then(|| ArchiveSettings {
            command: config.archive.command.clone(),
            archive_path: archive_path_for(&dist_dir, &config.output.archive_name),
        });

        Self {
            tables: config
                .tables
                .iter()
                .map(|t| TableInput {
                    group: t.group.clone(),
                    path: resolve_path(project_dir, &t.path),
                })
                .collect(),
            dist_dir,
            file_name: config.output.file_name.clone(),
            base_language: config.presets.base_language.clone(),
            emitter: EmitterOptions::from(&config.presets),
            version: version.filter(|v| !v.trim().is_empty()),
            archive,
        }
    }

    /// Path of the preset file.
    pub fn output_path(&self) -> PathBuf {
        self.dist_dir.join(&self.file_name)
    }
}

/// `<archive_name>.zip` beside the output directory.
fn archive_path_for(dist_dir: &Path, archive_name: &str) -> PathBuf {
    let parent = dist_dir.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{archive_name}.zip"))
}

/// A parsed table ready for emission.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub group: String,
    pub taxa: Vec<Taxon>,
}

/// Result of the `generate` pipeline.
#[derive(Debug)]
pub struct GenerateResult {
    /// Path of the written preset file.
    pub output_path: PathBuf,
    /// Path of the archive, when packaging ran.
    pub archive_path: Option<PathBuf>,
    /// Number of tables processed.
    pub table_count: usize,
    /// Number of taxon rows parsed.
    pub taxon_count: usize,
    /// Number of items emitted.
    pub item_count: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after a table has been loaded and parsed.
    fn table_loaded(&self, group: &str, taxa: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn table_loaded(&self, _group: &str, _taxa: usize) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Run the full `generate` pipeline.
///
/// 1. Load and parse every table (the first bad row aborts)
/// 2. Group and emit presets per table
/// 3. Serialize and write the preset file
/// 4. Package the output directory
#[instrument(skip_all, fields(tables = config.tables.len(), dist = %config.dist_dir.display()))]
pub fn generate(config: &GenerateConfig, progress: &dyn ProgressReporter) -> Result<GenerateResult> {
    let start = Instant::now();

    if config.tables.is_empty() {
        return Err(PresetsError::validation("no input tables configured"));
    }

    info!(version = ?config.version, "starting generate pipeline");

    // --- Phase 1: Load tables ---
    progress.phase("Loading tables");
    let mut tables = Vec::with_capacity(config.tables.len());
    for input in &config.tables {
        let taxa = table::load_taxa(&input.path)?;
        progress.table_loaded(&input.group, taxa.len());
        tables.push(LoadedTable {
            group: input.group.clone(),
            taxa,
        });
    }
    let taxon_count: usize = tables.iter().map(|t| t.taxa.len()).sum();

    // --- Phase 2: Emit ---
    progress.phase("Emitting presets");
    let document = build_document(
        tables,
        &config.base_language,
        config.version.clone(),
        &config.emitter,
    )?;
    let item_count = document.items().len();

    // --- Phase 3: Write ---
    progress.phase("Writing presets");
    let xml = to_xml(&document)?;
    std::fs::create_dir_all(&config.dist_dir)
        .map_err(|e| PresetsError::io(&config.dist_dir, e))?;
    let output_path = config.output_path();
    std::fs::write(&output_path, xml).map_err(|e| PresetsError::io(&output_path, e))?;
    info!(path = %output_path.display(), item_count, "preset file written");

    // --- Phase 4: Package ---
    let archive_path = match &config.archive {
        Some(archive) => {
            progress.phase("Packaging");
            Some(package::archive_dir(
                &config.dist_dir,
                &archive.archive_path,
                &archive.command,
            )?)
        }
        None => None,
    };

    let result = GenerateResult {
        output_path,
        archive_path,
        table_count: config.tables.len(),
        taxon_count,
        item_count,
        elapsed: start.elapsed(),
    };

    info!(
        taxa = result.taxon_count,
        items = result.item_count,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Build the preset document: one top-level group per table, in order.
///
/// Chunk ids are document-wide, so a genus row may appear only once across
/// all tables; a repeat is rejected naming both table groups.
pub fn build_document(
    tables: Vec<LoadedTable>,
    base_language: &str,
    version: Option<String>,
    opts: &EmitterOptions,
) -> Result<PresetDocument> {
    let mut chunk_owners: HashMap<String, String> = HashMap::new();
    let mut doc = PresetDocument::new(base_language, version);

    for table in tables {
        let groups = group_taxa(table.taxa);

        for genus in &groups.genus_entries {
            if let Some(first) = chunk_owners.insert(genus.genus.clone(), table.group.clone()) {
                return Err(PresetsError::validation(format!(
                    "genus {} is listed more than once (in '{first}' and '{}'); \
                     chunk {} must be unique",
                    genus.genus,
                    table.group,
                    chunk_id(&genus.genus)
                )));
            }
        }

        for genus in groups.orphan_genera() {
            warn!(
                group = %table.group,
                genus,
                "species rows without a genus row are not emitted"
            );
        }

        doc = doc.with_group(Group::new(table.group).with_children(emit_table(&groups, opts)));
    }

    Ok(doc)
}
