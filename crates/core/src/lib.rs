#![allow(clippy::result_large_err)]
//! usda-core: USDA scene description to namespaced JSON records.
//!
//! Provides the conversion pipeline from `.usda` text to a flat list of
//! block and override records.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`convert()`] -- run the full pipeline
//! - [`BindingTable`] -- namespace bindings and ignore rules used by normalization
//! - [`ConvertError`] -- conversion error type
//! - Document types: [`Record`], [`BlockRecord`], [`OverrideRecord`], [`Value`]
//!
//! Individual stage entry functions are also re-exported for selective
//! pipeline execution.

pub mod ast;
pub mod bindings;
pub mod convert;
pub mod document;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pass1_lower;
pub mod pass2_normalize;
pub mod pass3_render;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Layer, Provenance, Specifier};
pub use bindings::{Binding, BindingConfig, BindingTable, IgnoreRule};
pub use document::{Attributes, BlockRecord, ChildLink, ChildType, OverrideRecord, Record, Value};
pub use error::{ConvertError, Stage};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use convert::{convert, convert_to_string, lower_source, parse_source};
pub use pass1_lower::lower;
pub use pass2_normalize::normalize;
pub use pass3_render::render;
