//! Declarative whitelist filtering of nested records.
//!
//! A [`SchemaNode`] mirrors part of a record's shape. Leaves say whether a
//! subtree is kept verbatim or discarded; inner nodes name the mapping keys to
//! descend into. Keys the schema does not name are dropped, and schema keys
//! missing from the record are skipped without error.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One node of a field whitelist.
///
/// Deserializes from `true`, `false`, or a table/object of nested nodes, so
/// the same shape works in TOML config and JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSchemaNode", into = "RawSchemaNode")]
pub enum SchemaNode {
    /// Keep the subtree as-is.
    Keep,
    /// Discard the subtree.
    Drop,
    /// Keep only the named keys of a mapping, filtered recursively.
    Fields(IndexMap<String, SchemaNode>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSchemaNode {
    Flag(bool),
    Fields(IndexMap<String, RawSchemaNode>),
}

impl From<RawSchemaNode> for SchemaNode {
    fn from(raw: RawSchemaNode) -> Self {
        match raw {
            RawSchemaNode::Flag(true) => SchemaNode::Keep,
            RawSchemaNode::Flag(false) => SchemaNode::Drop,
            RawSchemaNode::Fields(fields) => SchemaNode::Fields(
                fields
                    .into_iter()
                    .map(|(key, node)| (key, node.into()))
                    .collect(),
            ),
        }
    }
}

impl From<SchemaNode> for RawSchemaNode {
    fn from(node: SchemaNode) -> Self {
        match node {
            SchemaNode::Keep => RawSchemaNode::Flag(true),
            SchemaNode::Drop => RawSchemaNode::Flag(false),
            SchemaNode::Fields(fields) => RawSchemaNode::Fields(
                fields
                    .into_iter()
                    .map(|(key, node)| (key, node.into()))
                    .collect(),
            ),
        }
    }
}

impl SchemaNode {
    /// Build a `Fields` node from `(key, node)` pairs, keeping their order.
    pub fn fields<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaNode)>,
    {
        SchemaNode::Fields(
            entries
                .into_iter()
                .map(|(key, node)| (key.into(), node))
                .collect(),
        )
    }

    pub fn flag(keep: bool) -> Self {
        if keep { SchemaNode::Keep } else { SchemaNode::Drop }
    }
}

/// Filter `data` against `schema`.
///
/// Returns `None` when the subtree is discarded: the schema is [`SchemaNode::Drop`]
/// or the shapes do not line up (e.g. `Fields` against a scalar). A sequence is
/// never discarded as a whole by a non-`Drop` schema; its elements are filtered
/// one by one and the (possibly empty) remainder is returned.
pub fn filter(data: Value, schema: &SchemaNode) -> Option<Value> {
    match (schema, data) {
        (SchemaNode::Keep, data) => Some(data),
        (SchemaNode::Drop, _) => None,
        (schema, Value::Array(items)) => Some(Value::Array(
            items
                .into_iter()
                .filter_map(|item| filter(item, schema))
                .collect(),
        )),
        (SchemaNode::Fields(fields), Value::Object(mut map)) => {
            let mut kept = Map::new();
            for (key, sub_schema) in fields {
                let Some(value) = map.remove(key) else {
                    continue;
                };
                if let Some(filtered) = filter(value, sub_schema) {
                    kept.insert(key.clone(), filtered);
                }
            }
            Some(Value::Object(kept))
        }
        (SchemaNode::Fields(_), _) => None,
    }
}

/// Field set used when no `[fields]` table is configured.
pub fn default_schema() -> SchemaNode {
    use SchemaNode::{Drop, Keep};

    SchemaNode::fields([
        ("solar", Drop),
        ("lunar", Keep),
        (
            "ganZhi",
            SchemaNode::fields([
                ("year", Keep),
                ("month", Keep),
                ("day", Keep),
                ("time", Drop),
                ("timeZhi", Drop),
            ]),
        ),
        ("zodiac", Drop),
        ("yiJi", Drop),
        ("info", Keep),
        ("hours", Drop),
        ("positions", Drop),
        (
            "bottom",
            SchemaNode::fields([
                ("jiShen", Keep),
                ("taiShen", Drop),
                ("xiu", Keep),
                ("xiuLuck", Keep),
                ("zhiXing", Keep),
                ("liuYao", Keep),
                ("yueXiang", Drop),
                ("xiongSha", Keep),
            ]),
        ),
    ])
}
