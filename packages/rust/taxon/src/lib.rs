//! Botanical name parsing, the taxon record, and genus/species grouping.

pub mod grouping;
pub mod model;
pub mod parser;

pub use grouping::{GenusGroups, group_taxa};
pub use model::{Taxon, quote_cultivar};
pub use parser::{ParseErrorKind, ParsedTaxon, TaxonParseError, parse_taxon};
