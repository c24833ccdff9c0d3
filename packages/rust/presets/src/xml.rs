//! JOSM tagging-preset XML serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use tracing::{debug, instrument};

use plantpresets_shared::{PRESET_NAMESPACE, PresetsError, Result};

use crate::nodes::{Chunk, Field, Group, Item, PresetDocument, PresetNode};

/// Indentation of nested elements, in spaces.
const INDENT: usize = 1;

type XmlWriter = Writer<Vec<u8>>;

/// Serialize a document to an XML string with a UTF-8 declaration and a trailing newline.
///
/// Output is deterministic: identical documents produce identical bytes.
#[instrument(skip_all, fields(groups = doc.groups.len()))]
pub fn to_xml(doc: &PresetDocument) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("presets");
    root.push_attribute(("xmlns", PRESET_NAMESPACE));
    root.push_attribute(("baselanguage", doc.base_language.as_str()));
    if let Some(version) = &doc.version {
        root.push_attribute(("version", version.as_str()));
    }
    emit(&mut writer, Event::Start(root))?;

    for group in &doc.groups {
        write_group(&mut writer, group)?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("presets")))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| PresetsError::Serialize(format!("non-UTF-8 output: {e}")))?;
    xml.push('\n');

    debug!(bytes = xml.len(), "preset document serialized");
    Ok(xml)
}

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| PresetsError::Serialize(e.to_string()))
}

/// Write `start`, then the children, then the closing tag; self-close when there are none.
fn write_element(
    writer: &mut XmlWriter,
    start: BytesStart<'_>,
    has_children: bool,
    children: impl FnOnce(&mut XmlWriter) -> Result<()>,
) -> Result<()> {
    if !has_children {
        return emit(writer, Event::Empty(start));
    }
    let end = start.to_end().into_owned();
    emit(writer, Event::Start(start))?;
    children(writer)?;
    emit(writer, Event::End(end))
}

fn write_group(writer: &mut XmlWriter, group: &Group) -> Result<()> {
    let mut start = BytesStart::new("group");
    start.push_attribute(("name", group.name.as_str()));

    write_element(writer, start, !group.children.is_empty(), |w| {
        for child in &group.children {
            match child {
                PresetNode::Group(g) => write_group(w, g)?,
                PresetNode::Chunk(c) => write_chunk(w, c)?,
                PresetNode::Item(i) => write_item(w, i)?,
            }
        }
        Ok(())
    })
}

fn write_chunk(writer: &mut XmlWriter, chunk: &Chunk) -> Result<()> {
    let mut start = BytesStart::new("chunk");
    start.push_attribute(("id", chunk.id.as_str()));

    write_element(writer, start, !chunk.fields.is_empty(), |w| {
        chunk.fields.iter().try_for_each(|f| write_field(w, f))
    })
}

fn write_item(writer: &mut XmlWriter, item: &Item) -> Result<()> {
    let type_attr = item.type_attr();
    let mut start = BytesStart::new("item");
    start.push_attribute(("name", item.name.as_str()));
    start.push_attribute(("type", type_attr.as_str()));
    if item.preset_name_label {
        start.push_attribute(("preset_name_label", "true"));
    }

    let has_children = !item.references.is_empty() || !item.fields.is_empty();
    write_element(writer, start, has_children, |w| {
        for chunk_id in &item.references {
            let mut reference = BytesStart::new("reference");
            reference.push_attribute(("ref", chunk_id.as_str()));
            emit(w, Event::Empty(reference))?;
        }
        item.fields.iter().try_for_each(|f| write_field(w, f))
    })
}

fn write_field(writer: &mut XmlWriter, field: &Field) -> Result<()> {
    let element = match field {
        Field::Key { key, value } => {
            let mut e = BytesStart::new("key");
            e.push_attribute(("key", key.as_str()));
            e.push_attribute(("value", value.as_str()));
            e
        }
        Field::Text {
            key,
            label,
            default,
        } => {
            let mut e = BytesStart::new("text");
            e.push_attribute(("key", key.as_str()));
            e.push_attribute(("text", label.as_str()));
            if let Some(default) = default {
                e.push_attribute(("default", default.as_str()));
            }
            e
        }
    };
    emit(writer, Event::Empty(element))
}
