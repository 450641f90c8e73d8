//! Pass 1: Tree lowering -- turn each top-level prim block of the parse tree
//! into a `BlockRecord` with decoded values and merged attributes.

use crate::ast::{Block, Layer, MetaEntry, RawValue, Statement};
use crate::document::{Attributes, BlockRecord, ChildLink, ChildType, Value};
use crate::error::ConvertError;
use indexmap::IndexMap;
use log::{debug, warn};

/// Lower every top-level block. Blocks left without attributes, inherits
/// or children are dropped.
pub fn lower(layer: &Layer, filename: &str) -> Result<Vec<BlockRecord>, ConvertError> {
    let mut records = Vec::new();
    for stmt in &layer.statements {
        match stmt {
            Statement::Block(block) => {
                let record = lower_block(block, filename)?;
                if record.is_structurally_empty() {
                    debug!("dropping empty {} \"{}\"", record.def.as_str(), record.name);
                    continue;
                }
                records.push(record);
            }
            Statement::Assignment(a) => {
                return Err(ConvertError::structural(
                    filename,
                    a.prov.line,
                    format!("attribute '{}' is declared outside of any prim block", a.name),
                )
                .with_key(&a.name));
            }
        }
    }
    debug!(
        "lowered {} top-level statements into {} records",
        layer.statements.len(),
        records.len()
    );
    Ok(records)
}

fn lower_block(block: &Block, filename: &str) -> Result<BlockRecord, ConvertError> {
    let line = block.prov.line;
    if block.name.is_empty() {
        return Err(ConvertError::structural(
            filename,
            line,
            "prim block has an empty name",
        ));
    }
    let err = |message: String| {
        ConvertError::structural(filename, line, message).with_prim(&block.name)
    };

    let inherits = extract_inherits(&block.metadata).map_err(|m| err(m).with_key("inherits"))?;

    // Attributes of inherits-less nested blocks are merged first so that the
    // block's own assignments win on collision, whatever the lexical order.
    let mut nested_attrs = Attributes::new();
    let mut direct_attrs = Attributes::new();
    let mut children = IndexMap::new();

    for stmt in &block.body {
        match stmt {
            Statement::Assignment(a) => {
                let value = a
                    .value
                    .as_ref()
                    .map(lower_attribute_value)
                    .transpose()
                    .map_err(|m| {
                        ConvertError::structural(filename, a.prov.line, m)
                            .with_prim(&block.name)
                            .with_key(&a.name)
                    })?;
                direct_attrs.insert(a.name.clone(), value);
            }
            Statement::Block(nested) => {
                let child = lower_block(nested, filename)?;
                match child.inherits.as_slice() {
                    [] => {
                        if !child.children.is_empty() {
                            warn!(
                                "{}:{}: dropping {} inheriting children of nested prim \"{}\"",
                                filename,
                                nested.prov.line,
                                child.children.len(),
                                child.name
                            );
                        }
                        nested_attrs.extend(child.attributes);
                    }
                    [reference] => {
                        let type_ = match child.type_ {
                            Some(t) => ChildType::Named(t),
                            None => ChildType::Null,
                        };
                        children.insert(
                            child.name,
                            ChildLink {
                                reference: reference.clone(),
                                type_,
                            },
                        );
                    }
                    many => {
                        return Err(ConvertError::structural(
                            filename,
                            nested.prov.line,
                            format!(
                                "nested prim inherits from {} paths; a child link holds exactly one",
                                many.len()
                            ),
                        )
                        .with_prim(&child.name)
                        .with_key("inherits"));
                    }
                }
            }
        }
    }

    let mut attributes = nested_attrs;
    attributes.extend(direct_attrs);

    Ok(BlockRecord {
        def: block.specifier,
        type_: block.type_name.clone(),
        name: block.name.clone(),
        inherits,
        attributes,
        children,
        line,
    })
}

/// Find the `inherits` metadata entry (the last one wins) and normalize it
/// to a list of stripped paths.
fn extract_inherits(metadata: &[MetaEntry]) -> Result<Vec<String>, String> {
    let entry = metadata.iter().rev().find_map(|m| match m {
        MetaEntry::Field { key, value, .. } if key == "inherits" => Some(value),
        _ => None,
    });
    match entry {
        None => Ok(Vec::new()),
        Some(RawValue::Reference(r)) => Ok(vec![strip_reference(r)?]),
        Some(RawValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                RawValue::Reference(r) => strip_reference(r),
                other => Err(format!(
                    "inherits list entries must be path references, got {}",
                    raw_kind(other)
                )),
            })
            .collect(),
        Some(other) => Err(format!(
            "inherits must be a path reference or a list of them, got {}",
            raw_kind(other)
        )),
    }
}

fn raw_kind(value: &RawValue) -> &'static str {
    match value {
        RawValue::Str(_) => "a string",
        RawValue::Number(_) => "a number",
        RawValue::Reference(_) => "a reference",
        RawValue::Bool(_) => "a boolean",
        RawValue::Array(_) => "an array",
    }
}

/// Remove the `<` `>` delimiters from a path reference.
pub fn strip_reference(raw: &str) -> Result<String, String> {
    raw.strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| format!("malformed path reference '{}'", raw))
}

/// Decode an assigned value. A lone reference is promoted to a one-element
/// list: relationship targets are always lists.
fn lower_attribute_value(raw: &RawValue) -> Result<Value, String> {
    match raw {
        RawValue::Reference(_) => Ok(Value::Array(vec![lower_value(raw)?])),
        _ => lower_value(raw),
    }
}

pub fn lower_value(raw: &RawValue) -> Result<Value, String> {
    match raw {
        RawValue::Str(s) => Ok(Value::String(s.clone())),
        RawValue::Number(n) => decode_number(n),
        RawValue::Bool(b) => Ok(Value::Bool(*b)),
        RawValue::Reference(r) => Ok(Value::Reference(strip_reference(r)?)),
        RawValue::Array(items) => Ok(Value::Array(
            items.iter().map(lower_value).collect::<Result<_, _>>()?,
        )),
    }
}

/// Integer vs real is decided by the literal's shape alone.
pub fn decode_number(text: &str) -> Result<Value, String> {
    if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Real(f)),
            Ok(_) => Err(format!("numeric literal '{}' is out of range", text)),
            Err(_) => Err(format!("invalid numeric literal '{}'", text)),
        }
    } else {
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format!("integer literal '{}' is out of range", text))
    }
}
