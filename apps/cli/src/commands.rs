//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use plantpresets_core::pipeline::{GenerateConfig, GenerateResult, ProgressReporter, generate};
use plantpresets_shared::{
    AppConfig, ItemStyle, VERSION_ENV, init_config, init_config_at, load_config,
    load_config_from,
};
use plantpresets_taxon::{Taxon, parse_taxon};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// plantpresets: JOSM tagging presets from plant taxon tables.
#[derive(Parser)]
#[command(
    name = "plantpresets",
    version,
    about = "Generate JOSM tagging presets from CSV lists of plant taxa.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./plantpresets.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build presets.xml from the configured tables and package it.
    Generate {
        /// Output directory (overrides output.dist_dir).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Value of the document's version attribute.
        #[arg(long, env = VERSION_ENV)]
        preset_version: Option<String>,

        /// Known-species field policy: fixed or editable.
        #[arg(long)]
        style: Option<ItemStyle>,

        /// Write the preset file without packaging it.
        #[arg(long)]
        no_archive: bool,
    },

    /// Parse scientific names and print their fields.
    Parse {
        /// Taxon strings, e.g. "Acer palmatum 'Bloodgood'".
        #[arg(required = true)]
        taxa: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default config to --config, or plantpresets.toml in the current directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "plantpresets=info",
        1 => "plantpresets=debug",
        _ => "plantpresets=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Generate {
            out,
            preset_version,
            style,
            no_archive,
        } => cmd_generate(config_path, out.as_deref(), preset_version, style, no_archive),
        Command::Parse { taxa } => cmd_parse(&taxa),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load the config and the directory its relative paths resolve against.
fn resolve_config(config_path: Option<&Path>) -> Result<(AppConfig, PathBuf)> {
    match config_path {
        Some(path) => {
            let config = load_config_from(path)?;
            let path = std::path::absolute(path)
                .wrap_err_with(|| format!("cannot resolve '{}'", path.display()))?;
            let project_dir = path
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| eyre!("config path '{}' has no parent directory", path.display()))?;
            Ok((config, project_dir))
        }
        None => {
            let cwd = std::env::current_dir().wrap_err("cannot determine working directory")?;
            Ok((load_config(&cwd)?, cwd))
        }
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(
    config_path: Option<&Path>,
    out: Option<&Path>,
    preset_version: Option<String>,
    style: Option<ItemStyle>,
    no_archive: bool,
) -> Result<()> {
    let (mut app, project_dir) = resolve_config(config_path)?;

    // CLI flags override the config file
    if let Some(out) = out {
        let out = std::path::absolute(out)
            .wrap_err_with(|| format!("cannot resolve '{}'", out.display()))?;
        app.output.dist_dir = out.to_string_lossy().into_owned();
    }
    if let Some(style) = style {
        app.presets.style = style;
    }
    if no_archive {
        app.archive.enabled = false;
    }
    app.validate()?;

    let config = GenerateConfig::from_app_config(&app, &project_dir, preset_version);

    info!(
        tables = config.tables.len(),
        style = %config.emitter.style,
        version = config.version.as_deref().unwrap_or("-"),
        "generating presets"
    );

    let reporter = CliProgress::new()?;
    let result = generate(&config, &reporter)?;

    // Print summary
    println!();
    println!("  Presets generated successfully!");
    println!("  Tables:  {}", result.table_count);
    println!("  Taxa:    {}", result.taxon_count);
    println!("  Items:   {}", result.item_count);
    println!("  Output:  {}", result.output_path.display());
    if let Some(archive) = &result.archive_path {
        println!("  Archive: {}", archive.display());
    }
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_parse(taxa: &[String]) -> Result<()> {
    for raw in taxa {
        let taxon = Taxon::new(parse_taxon(raw)?, String::new(), None);
        println!("{raw}");
        println!("  genus:        {}", taxon.genus);
        println!("  species:      {}", taxon.species.as_deref().unwrap_or("-"));
        println!("  cultivar:     {}", taxon.cultivar.as_deref().unwrap_or("-"));
        println!("  full taxon:   {}", taxon.full_taxon());
        println!(
            "  full species: {}",
            taxon.full_species().as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => init_config_at(path)?,
        None => {
            let cwd = std::env::current_dir().wrap_err("cannot determine working directory")?;
            init_config(&cwd)?
        }
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let (config, project_dir) = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("# resolved against {}", project_dir.display());
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn table_loaded(&self, group: &str, taxa: usize) {
        self.spinner
            .set_message(format!("Loaded {group} ({taxa} taxa)"));
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "plantpresets",
            "generate",
            "--style",
            "editable",
            "--no-archive",
            "--preset-version",
            "v1.0.0",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                style,
                no_archive,
                preset_version,
                ..
            } => {
                assert_eq!(style, Some(ItemStyle::Editable));
                assert!(no_archive);
                assert_eq!(preset_version.as_deref(), Some("v1.0.0"));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn parse_requires_a_taxon() {
        assert!(Cli::try_parse_from(["plantpresets", "parse"]).is_err());
    }

    #[test]
    fn config_init_writes_to_config_flag() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("custom.toml");
        let cli = Cli::try_parse_from([
            "plantpresets",
            "config",
            "init",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(path.as_path()));

        run(cli).unwrap();
        assert!(path.is_file());
        let (config, project_dir) = resolve_config(Some(&path)).unwrap();
        assert_eq!(config.output.dist_dir, "dist");
        assert_eq!(project_dir, tmp.path());
    }

    #[test]
    fn unknown_style_rejected() {
        assert!(Cli::try_parse_from(["plantpresets", "generate", "--style", "frozen"]).is_err());
    }
}
