//! The lowered document model and the records emitted by normalization.
//!
//! Field order on the serialized records is significant: it is the order
//! the keys appear in the rendered JSON.

use crate::ast::Specifier;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Real(f64),
    Bool(bool),
    /// Path with the `<` `>` delimiters stripped. Rendered as `{"ref": path}`.
    Reference(String),
    Array(Vec<Value>),
}

impl Value {
    /// Short name of the value kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "integer",
            Value::Real(_) => "real",
            Value::Bool(_) => "boolean",
            Value::Reference(_) => "reference",
            Value::Array(_) => "array",
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Reference(path) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("ref", path)?;
                map.end()
            }
            Value::Array(items) => items.serialize(serializer),
        }
    }
}

/// Attribute name to value, in first-assignment order. `None` is a
/// declared attribute that was never given a value.
pub type Attributes = IndexMap<String, Option<Value>>;

// ──────────────────────────────────────────────
// Block records
// ──────────────────────────────────────────────

impl Serialize for Specifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The type carried by a nested child reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildType {
    Named(String),
    /// The nested block was declared without a type token. Normalization
    /// removes the marker instead of renaming it.
    Null,
    Absent,
}

/// A nested block that inherits from another prim.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildLink {
    /// The inherited path, delimiters stripped.
    pub reference: String,
    pub type_: ChildType,
}

impl Serialize for ChildLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.reference)
    }
}

/// One lowered prim block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockRecord {
    pub def: Specifier,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inherits: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, ChildLink>,
    /// Source line of the block's specifier keyword.
    #[serde(skip)]
    pub line: u32,
}

impl BlockRecord {
    pub fn new(def: Specifier, name: impl Into<String>) -> Self {
        BlockRecord {
            def,
            type_: None,
            name: name.into(),
            inherits: Vec::new(),
            attributes: Attributes::new(),
            children: IndexMap::new(),
            line: 0,
        }
    }

    /// True if lowering left nothing worth emitting.
    pub fn is_structurally_empty(&self) -> bool {
        self.attributes.is_empty() && self.inherits.is_empty() && self.children.is_empty()
    }
}

// ──────────────────────────────────────────────
// Override records
// ──────────────────────────────────────────────

/// One namespace worth of a node's attributes, emitted as an `over`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRecord {
    pub name: String,
    pub namespace: String,
    pub attributes: IndexMap<String, Value>,
}

impl Serialize for OverrideRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut group = IndexMap::with_capacity(1);
        group.insert(&self.namespace, &self.attributes);
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("def", &Specifier::Over)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("attributes", &group)?;
        map.end()
    }
}

/// An element of the output document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Block(BlockRecord),
    Override(OverrideRecord),
}

impl Record {
    pub fn name(&self) -> &str {
        match self {
            Record::Block(b) => &b.name,
            Record::Override(o) => &o.name,
        }
    }
}
