//! Genus/species grouping.
//!
//! Splits a table's taxa into genus-level rows and species-level rows keyed
//! by genus. Emission walks the genus rows, so first-seen order of the
//! species map does not matter; order inside each genus does.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::model::Taxon;

/// Taxa of one table, partitioned by rank.
#[derive(Debug, Clone, Default)]
pub struct GenusGroups {
    /// Genus-level rows in input order.
    pub genus_entries: Vec<Taxon>,
    /// Species and cultivar rows by genus, each list in input order.
    pub species_by_genus: HashMap<String, Vec<Taxon>>,
}

impl GenusGroups {
    /// Species-level rows of a genus, in input order.
    pub fn species_of(&self, genus: &str) -> &[Taxon] {
        self.species_by_genus
            .get(genus)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate genus rows together with their species rows.
    pub fn iter(&self) -> impl Iterator<Item = (&Taxon, &[Taxon])> {
        self.genus_entries
            .iter()
            .map(|genus| (genus, self.species_of(&genus.genus)))
    }

    /// Genera with species rows but no genus row, sorted by name.
    pub fn orphan_genera(&self) -> Vec<&str> {
        let mut orphans: Vec<&str> = self
            .species_by_genus
            .keys()
            .filter(|genus| !self.genus_entries.iter().any(|g| &g.genus == *genus))
            .map(String::as_str)
            .collect();
        orphans.sort_unstable();
        orphans
    }
}

/// Partition parsed taxa into genus rows and per-genus species rows.
#[instrument(skip_all, fields(taxa = taxa.len()))]
pub fn group_taxa(taxa: Vec<Taxon>) -> GenusGroups {
    let mut groups = GenusGroups::default();

    for taxon in taxa {
        if taxon.is_genus_level() {
            groups.genus_entries.push(taxon);
        } else {
            groups
                .species_by_genus
                .entry(taxon.genus.clone())
                .or_default()
                .push(taxon);
        }
    }

    debug!(
        genera = groups.genus_entries.len(),
        species_groups = groups.species_by_genus.len(),
        "taxa grouped"
    );

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(raw: &str, vernacular: &str) -> Taxon {
        Taxon::parse(raw, vernacular, None).unwrap()
    }

    #[test]
    fn partitions_genus_and_species_rows() {
        let groups = group_taxa(vec![
            row("Acer", "v1"),
            row("Acer palmatum", "v2"),
            row("Acer palmatum 'X'", "v3"),
        ]);

        assert_eq!(groups.genus_entries.len(), 1);
        assert_eq!(groups.genus_entries[0].vernacular, "v1");

        let acer: Vec<_> = groups.species_of("Acer").iter().map(|t| t.vernacular.as_str()).collect();
        assert_eq!(acer, ["v2", "v3"]);
    }

    #[test]
    fn preserves_order_within_interleaved_genera() {
        let groups = group_taxa(vec![
            row("Prunus serrulata", "p1"),
            row("Acer", "a"),
            row("Acer rubrum", "a1"),
            row("Prunus", "p"),
            row("Acer palmatum", "a2"),
            row("Prunus 'Kanzan'", "p2"),
        ]);

        let genera: Vec<_> = groups.genus_entries.iter().map(|g| g.genus.as_str()).collect();
        assert_eq!(genera, ["Acer", "Prunus"]);

        let walked: Vec<(&str, Vec<&str>)> = groups
            .iter()
            .map(|(genus, species)| {
                (
                    genus.vernacular.as_str(),
                    species.iter().map(|s| s.vernacular.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(walked, [("a", vec!["a1", "a2"]), ("p", vec!["p1", "p2"])]);
    }

    #[test]
    fn genus_without_species_has_empty_slice() {
        let groups = group_taxa(vec![row("Zelkova", "z")]);
        assert!(groups.species_of("Zelkova").is_empty());
        assert!(groups.orphan_genera().is_empty());
    }

    #[test]
    fn orphans_reported() {
        let groups = group_taxa(vec![row("Acer", "a"), row("Quercus robur", "q"), row("Ilex crenata", "i")]);
        assert_eq!(groups.orphan_genera(), ["Ilex", "Quercus"]);
    }
}
