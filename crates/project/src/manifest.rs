//! KDL manifests describing a stored record.

use crate::{SvgRecord, MANIFEST_VERSION};
use chrono::{DateTime, SecondsFormat, Utc};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use node::{Color, DocumentId};

/// Metadata half of a record; the markup lives in `content`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Manifest {
    pub id: DocumentId,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub background: Color,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub content: String,
}

impl Manifest {
    pub fn for_record(record: &SvgRecord, content: String) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            width: record.width,
            height: record.height,
            background: record.background_color,
            created_at: record.created_at,
            modified_at: record.modified_at,
            content,
        }
    }

    pub fn into_record(self, svg_content: String) -> SvgRecord {
        SvgRecord {
            id: self.id,
            name: self.name,
            svg_content,
            width: self.width,
            height: self.height,
            background_color: self.background,
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }

    pub fn to_kdl(&self) -> String {
        let mut doc = KdlDocument::new();

        let mut document_node = KdlNode::new("document");
        document_node.push(KdlEntry::new_prop("version", MANIFEST_VERSION.to_string()));

        let children = document_node.children_mut().get_or_insert_with(KdlDocument::new);
        children.nodes_mut().push(value_node("id", self.id.to_uuid_string()));
        children.nodes_mut().push(value_node("name", self.name.clone()));

        let mut size = KdlNode::new("size");
        size.push(KdlEntry::new_prop("width", self.width));
        size.push(KdlEntry::new_prop("height", self.height));
        children.nodes_mut().push(size);

        children.nodes_mut().push(value_node("background", self.background.to_hex()));
        children.nodes_mut().push(value_node("created", timestamp(&self.created_at)));
        children.nodes_mut().push(value_node("modified", timestamp(&self.modified_at)));
        children.nodes_mut().push(value_node("content", self.content.clone()));

        doc.nodes_mut().push(document_node);
        doc.to_string()
    }

    pub fn from_kdl(input: &str) -> Result<Self, String> {
        let doc: KdlDocument = input.parse().map_err(|e| format!("{}", e))?;
        let document_node = doc.get("document").ok_or("missing 'document' node")?;
        if let Some(version) = document_node.get("version").and_then(KdlValue::as_string) {
            if version != MANIFEST_VERSION {
                return Err(format!("unsupported manifest version {}", version));
            }
        }
        let children = document_node.children().ok_or("'document' node has no children")?;

        let size = children.get("size").ok_or("missing 'size'")?;

        Ok(Self {
            id: DocumentId::parse(string(children, "id")?).ok_or("invalid 'id'")?,
            name: string(children, "name")?.to_string(),
            width: dimension(size, "width")?,
            height: dimension(size, "height")?,
            background: Color::parse(string(children, "background")?).map_err(|e| e.to_string())?,
            created_at: parse_timestamp(string(children, "created")?)?,
            modified_at: parse_timestamp(string(children, "modified")?)?,
            content: string(children, "content")?.to_string(),
        })
    }
}

fn value_node(name: &str, value: String) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(value));
    node
}

/// First argument of the child node `name`, as a string.
fn string<'a>(children: &'a KdlDocument, name: &str) -> Result<&'a str, String> {
    children
        .get(name)
        .and_then(|n| n.entries().first())
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| format!("missing '{}'", name))
}

fn dimension(size: &KdlNode, name: &str) -> Result<f64, String> {
    size.get(name)
        .and_then(number)
        .ok_or_else(|| format!("missing size {}", name))
}

/// KDL keeps `800.0` and `800` apart; accept either.
fn number(value: &KdlValue) -> Option<f64> {
    value.as_float().or_else(|| value.as_integer().map(|i| i as f64))
}

fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp {:?}: {}", value, e))
}
