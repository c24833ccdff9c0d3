//! plantpresets CLI: JOSM tagging presets from plant taxon tables.
//!
//! Converts CSV lists of genera, species and cultivars into a
//! `presets.xml` preset file and packages it for release.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
