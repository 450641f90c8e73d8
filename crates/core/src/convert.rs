//! Conversion pipeline: USDA text -> parse tree -> lowered blocks ->
//! normalized records -> JSON text.
//!
//! This is a thin orchestrator that calls each stage in order. Any failure
//! aborts the whole conversion.

use crate::ast::Layer;
use crate::bindings::BindingTable;
use crate::document::{BlockRecord, Record};
use crate::error::ConvertError;
use crate::lexer;
use crate::parser;
use crate::pass1_lower;
use crate::pass2_normalize;
use crate::pass3_render;
use log::debug;

/// Strip unsupported constructs, tokenize and parse.
pub fn parse_source(src: &str, filename: &str) -> Result<Layer, ConvertError> {
    let cleaned = lexer::strip_unsupported(src);
    let tokens = lexer::lex(&cleaned, filename)?;
    debug!("{}: {} tokens", filename, tokens.len());
    let layer = parser::parse(&tokens, filename)?;
    debug!(
        "{}: {} top-level statements",
        filename,
        layer.statements.len()
    );
    Ok(layer)
}

/// Parse and lower, stopping before normalization.
pub fn lower_source(src: &str, filename: &str) -> Result<Vec<BlockRecord>, ConvertError> {
    let layer = parse_source(src, filename)?;
    pass1_lower::lower(&layer, filename)
}

/// Run the full pipeline and return the normalized records.
pub fn convert(
    src: &str,
    filename: &str,
    table: &BindingTable,
) -> Result<Vec<Record>, ConvertError> {
    let blocks = lower_source(src, filename)?;
    let records = blocks.into_iter().map(Record::Block).collect();
    pass2_normalize::normalize(records, table, filename)
}

/// Run the full pipeline and render the result as compacted JSON text.
pub fn convert_to_string(
    src: &str,
    filename: &str,
    table: &BindingTable,
) -> Result<String, ConvertError> {
    let records = convert(src, filename, table)?;
    pass3_render::render(&records).map_err(|e| {
        ConvertError::normalization(filename, 0, format!("cannot render records: {}", e))
    })
}
