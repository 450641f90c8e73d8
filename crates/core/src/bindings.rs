//! Namespace binding table: canonical namespaces for prim type names and
//! attribute keys, plus the ignore rules that drop derivable attributes.
//!
//! The table is built once and only read afterwards.

use crate::document::{Attributes, Value};
use indexmap::IndexMap;
use serde::Deserialize;

/// Separator between a namespace and the short attribute key.
pub const NAMESPACE_SEPARATOR: char = ':';
/// Namespace for keys that are neither bound nor namespaced.
pub const FALLBACK_NAMESPACE: &str = "UNKNOWN_COMPONENT";

const MESH: &str = "UsdGeom:Mesh";
const BASIS_CURVES: &str = "UsdGeom:BasisCurves";
const SHADER: &str = "UsdShade:Shader";
const MATERIAL: &str = "UsdShade:Material";

/// Chooses a namespace from the node's full attribute mapping.
pub type Resolver = fn(&Attributes) -> &'static str;
/// Decides whether an attribute is redundant, given its value and the
/// node's full attribute mapping.
pub type IgnorePredicate = fn(&Value, &Attributes) -> bool;

#[derive(Debug, Clone)]
pub enum Binding {
    Fixed(String),
    Resolved(Resolver),
}

impl Binding {
    pub fn resolve<'a>(&'a self, attrs: &Attributes) -> &'a str {
        match self {
            Binding::Fixed(ns) => ns,
            Binding::Resolved(resolver) => resolver(attrs),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IgnoreRule {
    Always,
    When(IgnorePredicate),
}

/// User-supplied extensions to the built-in table, typically read from TOML:
///
/// ```toml
/// fallback_namespace = "Unclassified"
/// drop = ["purpose"]
///
/// [bindings]
/// Cube = "UsdGeom:Cube"
/// "primvars:displayColor" = "UsdGeom:Gprim"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    #[serde(default)]
    pub fallback_namespace: Option<String>,
    #[serde(default)]
    pub bindings: IndexMap<String, String>,
    #[serde(default)]
    pub drop: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BindingTable {
    bindings: IndexMap<String, Binding>,
    ignored: IndexMap<String, IgnoreRule>,
    fallback: String,
}

impl BindingTable {
    /// A table with no bindings and no ignore rules.
    pub fn empty() -> Self {
        BindingTable {
            bindings: IndexMap::new(),
            ignored: IndexMap::new(),
            fallback: FALLBACK_NAMESPACE.to_owned(),
        }
    }

    pub fn bind(&mut self, key: impl Into<String>, binding: Binding) -> &mut Self {
        self.bindings.insert(key.into(), binding);
        self
    }

    pub fn ignore(&mut self, key: impl Into<String>, rule: IgnoreRule) -> &mut Self {
        self.ignored.insert(key.into(), rule);
        self
    }

    /// Apply a config on top of this table. Config bindings replace
    /// existing entries with the same key.
    pub fn with_config(mut self, config: BindingConfig) -> Self {
        for (key, ns) in config.bindings {
            self.bind(key, Binding::Fixed(ns));
        }
        for key in config.drop {
            self.ignore(key, IgnoreRule::Always);
        }
        if let Some(fallback) = config.fallback_namespace {
            self.fallback = fallback;
        }
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Exact-key lookup, resolved against the node's attributes.
    pub fn lookup<'a>(&'a self, key: &str, attrs: &Attributes) -> Option<&'a str> {
        self.bindings.get(key).map(|b| b.resolve(attrs))
    }

    /// Namespace and short key for an attribute: exact binding first, then
    /// a split on the last separator, then the fallback namespace.
    pub fn classify<'a>(&'a self, key: &'a str, attrs: &Attributes) -> (&'a str, &'a str) {
        if let Some(ns) = self.lookup(key, attrs) {
            return (ns, key);
        }
        match key.rsplit_once(NAMESPACE_SEPARATOR) {
            Some((ns, short)) => (ns, short),
            None => (&self.fallback, key),
        }
    }

    /// Whether the attribute with this short key should be dropped.
    pub fn is_ignored(&self, short_key: &str, value: &Value, attrs: &Attributes) -> bool {
        match self.ignored.get(short_key) {
            Some(IgnoreRule::Always) => true,
            Some(IgnoreRule::When(predicate)) => predicate(value, attrs),
            None => false,
        }
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        let mut t = BindingTable::empty();

        // Attribute keys
        t.bind("faceVertexIndices", Binding::Fixed(MESH.into()))
            .bind("faceVertexCounts", Binding::Fixed(MESH.into()))
            .bind("points", Binding::Resolved(points_namespace))
            .bind("curveVertexCounts", Binding::Fixed(BASIS_CURVES.into()))
            .bind(
                "visibility",
                Binding::Fixed("UsdGeom:VisibilityAPI:visibility".into()),
            )
            .bind("info:id", Binding::Fixed(SHADER.into()))
            .bind("inputs:diffuseColor", Binding::Fixed(SHADER.into()))
            .bind("inputs:opacity", Binding::Fixed(SHADER.into()))
            .bind("outputs:surface", Binding::Fixed(SHADER.into()))
            .bind("outputs:surface.connect", Binding::Fixed(MATERIAL.into()))
            .bind(
                "material:binding",
                Binding::Fixed("UsdShade:MaterialBindingAPI".into()),
            );

        // Prim type names
        t.bind("Mesh", Binding::Fixed(MESH.into()))
            .bind("BasisCurves", Binding::Fixed(BASIS_CURVES.into()))
            .bind("Shader", Binding::Fixed(SHADER.into()))
            .bind("Material", Binding::Fixed(MATERIAL.into()))
            .bind("Xform", Binding::Fixed("UsdGeom:Xform".into()));

        t.ignore("faceVertexCounts", IgnoreRule::When(all_triangles))
            .ignore("curveVertexCounts", IgnoreRule::When(single_segment))
            .ignore("xformOpOrder", IgnoreRule::Always)
            .ignore("type", IgnoreRule::Always)
            .ignore("widths", IgnoreRule::Always);
        t
    }
}

/// `points` belong to a mesh when face indices sit next to them, otherwise
/// to a curve.
fn points_namespace(attrs: &Attributes) -> &'static str {
    if attrs.contains_key("faceVertexIndices") {
        MESH
    } else {
        BASIS_CURVES
    }
}

fn is_count(value: &Value, n: i64) -> bool {
    match value {
        Value::Int(i) => *i == n,
        Value::Real(f) => *f == n as f64,
        Value::String(_) | Value::Bool(_) | Value::Reference(_) | Value::Array(_) => false,
    }
}

/// Every face is a triangle, so the counts carry no information.
fn all_triangles(value: &Value, _attrs: &Attributes) -> bool {
    match value {
        Value::Array(counts) => counts.iter().all(|c| is_count(c, 3)),
        _ => false,
    }
}

/// A single two-point segment is implied by the points themselves.
fn single_segment(value: &Value, _attrs: &Attributes) -> bool {
    match value {
        Value::Array(counts) => matches!(counts.as_slice(), [c] if is_count(c, 2)),
        _ => false,
    }
}
