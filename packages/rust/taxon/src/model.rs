//! The taxon record and its derived display strings.

use crate::parser::{ParsedTaxon, TaxonParseError, parse_taxon};

/// One parsed input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxon {
    pub genus: String,
    /// Species epithet with any hybrid marker and rank qualifiers.
    pub species: Option<String>,
    /// Cultivar name without quotes.
    pub cultivar: Option<String>,
    /// Display name in the base language.
    pub vernacular: String,
    /// Leaf classification, e.g. `evergreen` or `deciduous`.
    pub leaf_type: Option<String>,
}

impl Taxon {
    pub fn new(name: ParsedTaxon, vernacular: impl Into<String>, leaf_type: Option<String>) -> Self {
        Self {
            genus: name.genus,
            species: name.species,
            cultivar: name.cultivar,
            vernacular: vernacular.into(),
            leaf_type,
        }
    }

    /// Parse a scientific name and attach the row's other columns.
    pub fn parse(
        raw: &str,
        vernacular: impl Into<String>,
        leaf_type: Option<String>,
    ) -> Result<Self, TaxonParseError> {
        Ok(Self::new(parse_taxon(raw)?, vernacular, leaf_type))
    }

    /// True for rows naming only a genus.
    pub fn is_genus_level(&self) -> bool {
        self.species.is_none() && self.cultivar.is_none()
    }

    /// `Genus species ‘Cultivar’`, skipping absent parts.
    pub fn full_taxon(&self) -> String {
        let cultivar = self.cultivar.as_deref().map(quote_cultivar);
        [Some(self.genus.as_str()), self.species.as_deref(), cultivar.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `Genus species`, or `None` without a species.
    pub fn full_species(&self) -> Option<String> {
        self.species
            .as_deref()
            .map(|species| format!("{} {species}", self.genus))
    }
}

/// Wrap a cultivar name in curly single quotes.
pub fn quote_cultivar(name: &str) -> String {
    format!("‘{name}’")
}
