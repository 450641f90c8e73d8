//! Parse tree for USDA composition text.
//!
//! Produced by the parser and consumed by lowering. Nothing here is
//! resolved or normalized; literals keep their source shape.

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

/// Source position of the first token of a node (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub line: u32,
    pub column: u32,
}

// ──────────────────────────────────────────────
// Layer and statements
// ──────────────────────────────────────────────

/// The root of a parsed file: optional layer metadata followed by statements.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub metadata: Vec<MetaEntry>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Assignment(Assignment),
    Block(Block),
}

/// Leading qualifiers of a property declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub prepend: bool,
    pub custom: bool,
    pub uniform: bool,
}

/// `[prepend] [custom] [uniform] type[[]] name [= value]`
#[derive(Debug, Clone)]
pub struct Assignment {
    pub qualifiers: Qualifiers,
    pub type_name: String,
    pub is_array: bool,
    pub name: String,
    pub value: Option<RawValue>,
    pub prov: Provenance,
}

/// Prim specifier keyword opening a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specifier {
    Def,
    Class,
    Over,
}

impl Specifier {
    pub fn from_keyword(word: &str) -> Option<Specifier> {
        match word {
            "def" => Some(Specifier::Def),
            "class" => Some(Specifier::Class),
            "over" => Some(Specifier::Over),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Specifier::Def => "def",
            Specifier::Class => "class",
            Specifier::Over => "over",
        }
    }
}

/// `def|class|over [Type] "name" [( metadata )] { statements }`
#[derive(Debug, Clone)]
pub struct Block {
    pub specifier: Specifier,
    pub type_name: Option<String>,
    pub name: String,
    pub metadata: Vec<MetaEntry>,
    pub body: Vec<Statement>,
    pub prov: Provenance,
}

// ──────────────────────────────────────────────
// Metadata
// ──────────────────────────────────────────────

/// One entry of a parenthesized metadata list.
#[derive(Debug, Clone)]
pub enum MetaEntry {
    /// A bare string, conventionally the layer or prim documentation.
    Doc(String),
    /// `[prepend] key = value`
    Field {
        prepend: bool,
        key: String,
        value: RawValue,
        prov: Provenance,
    },
}

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

/// A literal as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Str(String),
    /// Numeric text; integer vs real is decided by lowering.
    Number(String),
    /// Reference text including `<` `>` delimiters.
    Reference(String),
    Bool(bool),
    /// Both `[...]` and `(...)` forms.
    Array(Vec<RawValue>),
}
