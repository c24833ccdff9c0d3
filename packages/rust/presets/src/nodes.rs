//! Preset document tree.
//!
//! Nodes are plain values: builders construct a child completely and attach
//! it to its parent, the document is never mutated from the inside out.

/// Root `<presets>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetDocument {
    /// `baselanguage` attribute.
    pub base_language: String,
    /// `version` attribute, omitted when `None`.
    pub version: Option<String>,
    /// One top-level group per input table.
    pub groups: Vec<Group>,
}

impl PresetDocument {
    pub fn new(base_language: impl Into<String>, version: Option<String>) -> Self {
        Self {
            base_language: base_language.into(),
            version,
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// All items in document order, at any depth.
    pub fn items(&self) -> Vec<&Item> {
        let mut out = Vec::new();
        for group in &self.groups {
            group.collect_items(&mut out);
        }
        out
    }
}

/// A child of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetNode {
    Group(Group),
    Chunk(Chunk),
    Item(Item),
}

/// `<group name="…">`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub children: Vec<PresetNode>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: impl Into<PresetNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = PresetNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Direct child group with the given name.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.children.iter().find_map(|child| match child {
            PresetNode::Group(g) if g.name == name => Some(g),
            _ => None,
        })
    }

    /// Direct child chunk with the given id.
    pub fn chunk(&self, id: &str) -> Option<&Chunk> {
        self.children.iter().find_map(|child| match child {
            PresetNode::Chunk(c) if c.id == id => Some(c),
            _ => None,
        })
    }

    /// Direct child items.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.children.iter().filter_map(|child| match child {
            PresetNode::Item(item) => Some(item),
            _ => None,
        })
    }

    fn collect_items<'a>(&'a self, out: &mut Vec<&'a Item>) {
        for child in &self.children {
            match child {
                PresetNode::Group(g) => g.collect_items(out),
                PresetNode::Item(item) => out.push(item),
                PresetNode::Chunk(_) => {}
            }
        }
    }
}

/// `<chunk id="…">`, a field bundle referenced by items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: String,
    pub fields: Vec<Field>,
}

/// Feature geometries an item applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Node,
    Way,
    ClosedWay,
    Multipolygon,
}

impl Geometry {
    pub const ALL: [Geometry; 4] = [
        Geometry::Node,
        Geometry::Way,
        Geometry::ClosedWay,
        Geometry::Multipolygon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::ClosedWay => "closedway",
            Self::Multipolygon => "multipolygon",
        }
    }
}

/// `<item name="…" type="…">`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub geometries: Vec<Geometry>,
    /// Label placed features by their field values instead of the item name.
    pub preset_name_label: bool,
    /// Chunk ids referenced before the item's own fields.
    pub references: Vec<String>,
    pub fields: Vec<Field>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometries: Geometry::ALL.to_vec(),
            preset_name_label: true,
            references: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_reference(mut self, chunk_id: impl Into<String>) -> Self {
        self.references.push(chunk_id.into());
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// `type` attribute value.
    pub fn type_attr(&self) -> String {
        self.geometries
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Field for a tag key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key() == key)
    }
}

/// A tag definition on a chunk or item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// `<key key="…" value="…"/>`: a fixed tag.
    Key { key: String, value: String },
    /// `<text key="…" text="…" default="…"/>`: an editable tag.
    Text {
        key: String,
        label: String,
        default: Option<String>,
    },
}

impl Field {
    pub fn fixed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Key {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Text {
            key: key.into(),
            label: label.into(),
            default: None,
        }
    }

    /// Editable tag with a default; a `None` default leaves the field blank.
    pub fn text_with_default(
        key: impl Into<String>,
        label: impl Into<String>,
        default: Option<String>,
    ) -> Self {
        Self::Text {
            key: key.into(),
            label: label.into(),
            default,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Key { key, .. } | Self::Text { key, .. } => key,
        }
    }

    /// The fixed value or the default, whichever the field carries.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Key { value, .. } => Some(value.as_str()),
            Self::Text { default, .. } => default.as_deref(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Key { .. })
    }
}

impl From<Group> for PresetNode {
    fn from(g: Group) -> Self {
        Self::Group(g)
    }
}

impl From<Chunk> for PresetNode {
    fn from(c: Chunk) -> Self {
        Self::Chunk(c)
    }
}

impl From<Item> for PresetNode {
    fn from(i: Item) -> Self {
        Self::Item(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_defaults_cover_all_geometries() {
        let item = Item::new("*Maple");
        assert_eq!(item.type_attr(), "node,way,closedway,multipolygon");
        assert!(item.preset_name_label);
    }

    #[test]
    fn nested_items_in_document_order() {
        let doc = PresetDocument::new("ja", None).with_group(
            Group::new("Trees")
                .with_child(Chunk {
                    id: "genus-Acer".into(),
                    fields: vec![],
                })
                .with_child(Group::new("Maple").with_child(Item::new("*Maple")).with_child(Item::new("Japanese Maple")))
                .with_child(Item::new("Loose")),
        );
        let names: Vec<_> = doc.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["*Maple", "Japanese Maple", "Loose"]);
        assert!(doc.groups[0].chunk("genus-Acer").is_some());
        assert!(doc.groups[0].group("Maple").is_some());
    }

    #[test]
    fn field_accessors() {
        let fixed = Field::fixed("genus", "Acer");
        assert_eq!(fixed.value(), Some("Acer"));
        assert!(fixed.is_fixed());

        let blank = Field::text("taxon:cultivar", "Cultivar");
        assert_eq!(blank.key(), "taxon:cultivar");
        assert_eq!(blank.value(), None);
    }
}
