//! Turns grouped taxa into preset nodes.
//!
//! Per genus the emitter produces a chunk carrying the genus tags and a
//! group holding a wildcard item ("any species of this genus") followed by
//! one item per known species or cultivar. Every item references the chunk.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use plantpresets_shared::{ItemStyle, PresetsConfig};
use plantpresets_taxon::{GenusGroups, Taxon, quote_cultivar};

use crate::nodes::{Chunk, Field, Group, Item, PresetNode};

const GENUS_KEY: &str = "genus";
const SPECIES_KEY: &str = "species";
const TAXON_KEY: &str = "taxon";
const CULTIVAR_KEY: &str = "taxon:cultivar";
const LEAF_TYPE_KEY: &str = "leaf_type";

/// Trailing `(…)` or `（…）` annotation on a vernacular name.
static TRAILING_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[(（][^()（）]*[)）]\s*$").expect("trailing parenthetical regex")
});

/// Emitter settings, usually derived from the `[presets]` config section.
#[derive(Debug, Clone)]
pub struct EmitterOptions {
    /// Locale suffix for localized keys and labels.
    pub language: String,
    pub style: ItemStyle,
    pub wildcard_prefix: String,
    pub cultivar_marker: String,
}

impl From<&PresetsConfig> for EmitterOptions {
    fn from(config: &PresetsConfig) -> Self {
        Self {
            language: config.base_language.clone(),
            style: config.style,
            wildcard_prefix: config.wildcard_prefix.clone(),
            cultivar_marker: config.cultivar_marker.clone(),
        }
    }
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self::from(&PresetsConfig::default())
    }
}

impl EmitterOptions {
    fn localized_key(&self, key: &str) -> String {
        format!("{key}:{}", self.language)
    }

    fn localized_label(&self, label: &str) -> String {
        format!("{label} ({})", self.language)
    }
}

/// Chunk id shared by every item of a genus.
pub fn chunk_id(genus: &str) -> String {
    format!("genus-{genus}")
}

/// Emit the chunks and genus groups for one table, in genus-row order.
///
/// Species rows whose genus has no genus row are not emitted.
#[instrument(skip_all, fields(genera = groups.genus_entries.len(), style = %opts.style))]
pub fn emit_table(groups: &GenusGroups, opts: &EmitterOptions) -> Vec<PresetNode> {
    let mut nodes: Vec<PresetNode> = Vec::with_capacity(groups.genus_entries.len() * 2);

    for (genus, species) in groups.iter() {
        debug!(genus = %genus.genus, species = species.len(), "emitting genus");
        nodes.push(genus_chunk(genus, opts).into());
        nodes.push(genus_group(genus, species, opts).into());
    }

    nodes
}

/// `<chunk id="genus-X">` with the genus and its localized name as fixed tags.
pub fn genus_chunk(genus: &Taxon, opts: &EmitterOptions) -> Chunk {
    Chunk {
        id: chunk_id(&genus.genus),
        fields: vec![
            Field::fixed(GENUS_KEY, &genus.genus),
            Field::fixed(opts.localized_key(GENUS_KEY), &genus.vernacular),
        ],
    }
}

/// The display group of a genus: wildcard item first, then known species.
pub fn genus_group(genus: &Taxon, species: &[Taxon], opts: &EmitterOptions) -> Group {
    Group::new(&genus.vernacular)
        .with_child(wildcard_item(genus, opts))
        .with_children(species.iter().map(|s| species_item(s, opts).into()))
}

/// "Any species of this genus": editable taxon fields seeded with the genus.
pub fn wildcard_item(genus: &Taxon, opts: &EmitterOptions) -> Item {
    Item::new(format!("{}{}", opts.wildcard_prefix, genus.vernacular))
        .with_reference(chunk_id(&genus.genus))
        .with_field(Field::text_with_default(
            TAXON_KEY,
            "Taxon",
            Some(genus.genus.clone()),
        ))
        .with_field(Field::text_with_default(
            opts.localized_key(TAXON_KEY),
            opts.localized_label("Taxon"),
            Some(genus.vernacular.clone()),
        ))
        .with_fields(blank_cultivar_fields(opts))
        .with_fields(leaf_type_field(genus))
}

/// A known species or cultivar, in the configured style.
pub fn species_item(taxon: &Taxon, opts: &EmitterOptions) -> Item {
    match opts.style {
        ItemStyle::Fixed => fixed_species_item(taxon, opts),
        ItemStyle::Editable => editable_species_item(taxon, opts),
    }
}

fn fixed_species_item(taxon: &Taxon, opts: &EmitterOptions) -> Item {
    let name = match taxon.cultivar {
        Some(_) => quote_cultivar(&taxon.vernacular),
        None => taxon.vernacular.clone(),
    };

    let mut item = Item::new(name).with_reference(chunk_id(&taxon.genus));

    if let Some(full_species) = taxon.full_species() {
        item = item.with_field(Field::fixed(SPECIES_KEY, full_species));
    }

    item = item
        .with_field(Field::fixed(TAXON_KEY, taxon.full_taxon()))
        .with_field(Field::fixed(
            opts.localized_key(TAXON_KEY),
            localized_name(&taxon.vernacular),
        ));

    item = match &taxon.cultivar {
        Some(cultivar) => item
            .with_field(Field::fixed(CULTIVAR_KEY, strip_quotes(cultivar)))
            .with_field(Field::fixed(
                opts.localized_key(CULTIVAR_KEY),
                &taxon.vernacular,
            )),
        None => item.with_fields(blank_cultivar_fields(opts)),
    };

    item.with_fields(leaf_type_field(taxon))
}

fn editable_species_item(taxon: &Taxon, opts: &EmitterOptions) -> Item {
    let name = match taxon.cultivar {
        Some(_) => format!("{} ({})", taxon.vernacular, opts.cultivar_marker),
        None => taxon.vernacular.clone(),
    };

    Item::new(name)
        .with_reference(chunk_id(&taxon.genus))
        .with_field(Field::text_with_default(
            TAXON_KEY,
            "Taxon",
            Some(taxon.full_taxon()),
        ))
        .with_field(Field::text_with_default(
            opts.localized_key(TAXON_KEY),
            opts.localized_label("Taxon"),
            Some(taxon.vernacular.clone()),
        ))
        .with_field(Field::text_with_default(
            CULTIVAR_KEY,
            "Cultivar",
            taxon.cultivar.as_deref().map(strip_quotes),
        ))
        .with_field(Field::text_with_default(
            opts.localized_key(CULTIVAR_KEY),
            opts.localized_label("Cultivar"),
            taxon.cultivar.as_ref().map(|_| taxon.vernacular.clone()),
        ))
        .with_fields(leaf_type_field(taxon))
}

fn blank_cultivar_fields(opts: &EmitterOptions) -> [Field; 2] {
    [
        Field::text(CULTIVAR_KEY, "Cultivar"),
        Field::text(
            opts.localized_key(CULTIVAR_KEY),
            opts.localized_label("Cultivar"),
        ),
    ]
}

/// Fixed `leaf_type` tag. Omitted when the row has none, since an empty
/// fixed value would make the editor delete the tag.
fn leaf_type_field(taxon: &Taxon) -> Option<Field> {
    taxon
        .leaf_type
        .as_ref()
        .map(|leaf_type| Field::fixed(LEAF_TYPE_KEY, leaf_type))
}

/// Vernacular name without a trailing parenthetical, e.g. `イロハモミジ（栽培品種）` → `イロハモミジ`.
/// A name that is nothing but a parenthetical is returned unchanged.
pub fn localized_name(vernacular: &str) -> String {
    let stripped = TRAILING_PAREN_RE.replace(vernacular, "");
    if stripped.is_empty() {
        vernacular.to_string()
    } else {
        stripped.into_owned()
    }
}

/// Cultivar name without surrounding straight or curly single quotes.
pub fn strip_quotes(cultivar: &str) -> String {
    cultivar
        .trim_matches(|c| matches!(c, '\'' | '‘' | '’'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plantpresets_taxon::group_taxa;

    fn taxon(raw: &str, vernacular: &str, leaf_type: Option<&str>) -> Taxon {
        Taxon::parse(raw, vernacular, leaf_type.map(String::from)).unwrap()
    }

    fn editable() -> EmitterOptions {
        EmitterOptions {
            style: ItemStyle::Editable,
            ..EmitterOptions::default()
        }
    }

    fn as_group(node: &PresetNode) -> &Group {
        match node {
            PresetNode::Group(g) => g,
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn one_chunk_and_group_per_genus() {
        let groups = group_taxa(vec![
            taxon("Acer", "カエデ属", Some("deciduous")),
            taxon("Acer palmatum", "イロハモミジ", Some("deciduous")),
            taxon("Acer palmatum 'Bloodgood'", "ノムラモミジ", Some("deciduous")),
            taxon("Ilex", "モチノキ属", Some("evergreen")),
        ]);
        let nodes = emit_table(&groups, &EmitterOptions::default());
        assert_eq!(nodes.len(), 4);

        match &nodes[0] {
            PresetNode::Chunk(chunk) => {
                assert_eq!(chunk.id, "genus-Acer");
                assert_eq!(chunk.fields[0], Field::fixed("genus", "Acer"));
                assert_eq!(chunk.fields[1], Field::fixed("genus:ja", "カエデ属"));
            }
            other => panic!("expected chunk, got {other:?}"),
        }

        let acer = as_group(&nodes[1]);
        assert_eq!(acer.name, "カエデ属");
        let items: Vec<_> = acer.items().collect();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.references == ["genus-Acer"]));
        assert_eq!(items[0].name, "*カエデ属");
        assert_eq!(items[1].name, "イロハモミジ");
        assert_eq!(items[2].name, "‘ノムラモミジ’");

        let ilex = as_group(&nodes[3]);
        assert_eq!(ilex.items().count(), 1);
    }

    #[test]
    fn wildcard_item_fields() {
        let genus = taxon("Acer", "Maple", Some("deciduous"));
        let item = wildcard_item(&genus, &EmitterOptions::default());

        assert_eq!(
            item.fields,
            vec![
                Field::text_with_default("taxon", "Taxon", Some("Acer".into())),
                Field::text_with_default("taxon:ja", "Taxon (ja)", Some("Maple".into())),
                Field::text("taxon:cultivar", "Cultivar"),
                Field::text("taxon:cultivar:ja", "Cultivar (ja)"),
                Field::fixed("leaf_type", "deciduous"),
            ]
        );
    }

    #[test]
    fn wildcard_without_leaf_type_has_no_leaf_type_key() {
        let genus = taxon("Zelkova", "ケヤキ属", None);
        let item = wildcard_item(&genus, &EmitterOptions::default());
        assert!(item.field("leaf_type").is_none());
        assert!(!item.fields.iter().any(|f| f.value() == Some("")));
    }

    #[test]
    fn fixed_species_without_cultivar() {
        let t = taxon("Acer palmatum", "Japanese Maple (tree)", None);
        let item = species_item(&t, &EmitterOptions::default());

        assert_eq!(item.name, "Japanese Maple (tree)");
        assert_eq!(item.field("species").and_then(Field::value), Some("Acer palmatum"));
        assert_eq!(item.field("taxon").and_then(Field::value), Some("Acer palmatum"));
        assert_eq!(item.field("taxon:ja").and_then(Field::value), Some("Japanese Maple"));
        let cultivar = item.field("taxon:cultivar").unwrap();
        assert!(!cultivar.is_fixed());
        assert_eq!(cultivar.value(), None);
        assert!(item.field("leaf_type").is_none());
    }

    #[test]
    fn fixed_species_with_cultivar() {
        let t = taxon("Acer palmatum 'Bloodgood'", "ノムラモミジ", Some("deciduous"));
        let item = species_item(&t, &EmitterOptions::default());

        assert_eq!(item.name, "‘ノムラモミジ’");
        assert_eq!(item.field("taxon").and_then(Field::value), Some("Acer palmatum ‘Bloodgood’"));
        assert_eq!(item.field("taxon:cultivar"), Some(&Field::fixed("taxon:cultivar", "Bloodgood")));
        assert_eq!(
            item.field("taxon:cultivar:ja"),
            Some(&Field::fixed("taxon:cultivar:ja", "ノムラモミジ"))
        );
        assert_eq!(item.fields.last(), Some(&Field::fixed("leaf_type", "deciduous")));
    }

    #[test]
    fn cultivar_without_species_has_no_species_key() {
        let t = taxon("Prunus 'Kanzan'", "カンザン", None);
        let item = species_item(&t, &EmitterOptions::default());
        assert!(item.field("species").is_none());
        assert_eq!(item.field("taxon").and_then(Field::value), Some("Prunus ‘Kanzan’"));
    }

    #[test]
    fn editable_style_uses_text_defaults() {
        let opts = editable();
        let t = taxon("Acer palmatum 'Bloodgood'", "ノムラモミジ", None);
        let item = species_item(&t, &opts);

        assert_eq!(item.name, "ノムラモミジ (栽培品種)");
        assert!(item.fields.iter().all(|f| !f.is_fixed()));
        assert_eq!(item.field("taxon").and_then(Field::value), Some("Acer palmatum ‘Bloodgood’"));
        assert_eq!(item.field("taxon:cultivar").and_then(Field::value), Some("Bloodgood"));
        assert_eq!(item.field("taxon:cultivar:ja").and_then(Field::value), Some("ノムラモミジ"));

        let plain = species_item(&taxon("Acer palmatum", "イロハモミジ", None), &opts);
        assert_eq!(plain.name, "イロハモミジ");
        assert_eq!(plain.field("taxon:cultivar").and_then(Field::value), None);
        assert_eq!(plain.field("taxon:cultivar:ja").and_then(Field::value), None);
    }

    #[test]
    fn orphan_species_are_skipped() {
        let groups = group_taxa(vec![taxon("Quercus robur", "Oak", None)]);
        assert!(emit_table(&groups, &EmitterOptions::default()).is_empty());
    }

    #[test]
    fn localized_name_strips_trailing_parenthetical() {
        assert_eq!(localized_name("イロハモミジ（栽培品種）"), "イロハモミジ");
        assert_eq!(localized_name("Japanese Maple (cultivar)"), "Japanese Maple");
        assert_eq!(localized_name("Maple (red) tree"), "Maple (red) tree");
        assert_eq!(localized_name("(unnamed)"), "(unnamed)");
        assert_eq!(localized_name("Maple"), "Maple");
    }

    #[test]
    fn strip_quotes_handles_both_styles() {
        assert_eq!(strip_quotes("'Bloodgood'"), "Bloodgood");
        assert_eq!(strip_quotes("‘Bloodgood’"), "Bloodgood");
        assert_eq!(strip_quotes("Bloodgood"), "Bloodgood");
    }

    #[test]
    fn language_drives_localized_keys() {
        let opts = EmitterOptions {
            language: "de".into(),
            ..EmitterOptions::default()
        };
        let chunk = genus_chunk(&taxon("Acer", "Ahorn", None), &opts);
        assert_eq!(chunk.fields[1].key(), "genus:de");
        let item = wildcard_item(&taxon("Acer", "Ahorn", None), &opts);
        assert!(item.field("taxon:cultivar:de").is_some());
    }
}
