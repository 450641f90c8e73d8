//! Pass 2: Namespace normalization -- rename types through the binding
//! table, classify attributes into namespaces, drop ignored attributes and
//! split what is left into one `over` record per namespace.

use crate::ast::Specifier;
use crate::bindings::BindingTable;
use crate::document::{Attributes, BlockRecord, ChildType, OverrideRecord, Record, Value};
use crate::error::ConvertError;
use indexmap::IndexMap;
use log::{debug, trace};

/// Normalize a lowered document.
///
/// The result holds the surviving block records (without attributes, and
/// without `over` blocks) followed by the override records in emission
/// order. Override records already present in the input are carried over
/// unchanged, so running this twice is a no-op.
pub fn normalize(
    records: Vec<Record>,
    table: &BindingTable,
    filename: &str,
) -> Result<Vec<Record>, ConvertError> {
    let mut blocks = Vec::new();
    let mut overrides = Vec::new();

    for record in records {
        match record {
            Record::Override(o) => overrides.push(Record::Override(o)),
            Record::Block(block) => {
                let (block, split) = normalize_block(block, table, filename)?;
                overrides.extend(split.into_iter().map(Record::Override));
                if block.def == Specifier::Over {
                    debug!("dropping over placeholder \"{}\"", block.name);
                    continue;
                }
                blocks.push(Record::Block(block));
            }
        }
    }

    debug!(
        "normalized into {} blocks and {} overrides",
        blocks.len(),
        overrides.len()
    );
    blocks.extend(overrides);
    Ok(blocks)
}

fn normalize_block(
    mut block: BlockRecord,
    table: &BindingTable,
    filename: &str,
) -> Result<(BlockRecord, Vec<OverrideRecord>), ConvertError> {
    let attrs = std::mem::take(&mut block.attributes);

    if let Some(t) = &block.type_ {
        if let Some(bound) = table.lookup(t, &attrs) {
            block.type_ = Some(bound.to_owned());
        }
    }

    for child in block.children.values_mut() {
        child.type_ = match std::mem::replace(&mut child.type_, ChildType::Absent) {
            ChildType::Named(t) => match table.lookup(&t, &attrs) {
                Some(bound) => ChildType::Named(bound.to_owned()),
                None => ChildType::Named(t),
            },
            ChildType::Null | ChildType::Absent => ChildType::Absent,
        };
    }

    let groups = classify(&block, &attrs, table, filename)?;
    let split = groups
        .into_iter()
        .map(|(namespace, attributes)| OverrideRecord {
            name: block.name.clone(),
            namespace,
            attributes,
        })
        .collect();
    Ok((block, split))
}

/// Group a node's attributes by namespace, in first-occurrence order.
fn classify(
    block: &BlockRecord,
    attrs: &Attributes,
    table: &BindingTable,
    filename: &str,
) -> Result<IndexMap<String, IndexMap<String, Value>>, ConvertError> {
    let mut groups: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();

    for (key, value) in attrs {
        let err = |message: String| {
            ConvertError::normalization(filename, block.line, message)
                .with_prim(&block.name)
                .with_key(key)
        };
        let value = value
            .as_ref()
            .ok_or_else(|| err(format!("attribute '{}' is declared without a value", key)))?;
        check_value(value).map_err(err)?;

        let (namespace, short) = table.classify(key, attrs);
        if table.is_ignored(short, value, attrs) {
            trace!("{}: ignoring '{}'", block.name, key);
            continue;
        }
        trace!(
            "{}: '{}' -> {} / {} ({})",
            block.name,
            key,
            namespace,
            short,
            value.kind()
        );
        groups
            .entry(namespace.to_owned())
            .or_default()
            .insert(short.to_owned(), value.clone());
    }
    Ok(groups)
}

/// Every value kind is representable in the output except non-finite reals.
fn check_value(value: &Value) -> Result<(), String> {
    match value {
        Value::Real(f) if !f.is_finite() => Err(format!("real value {} cannot be rendered", f)),
        Value::Array(items) => items.iter().try_for_each(check_value),
        Value::String(_) | Value::Int(_) | Value::Real(_) | Value::Bool(_) | Value::Reference(_) => {
            Ok(())
        }
    }
}
