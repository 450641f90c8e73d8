use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Tokenizing or parsing: the text does not match the grammar.
    Syntax,
    /// Lowering: a well-formed block violates a structural precondition.
    Structure,
    /// Namespace normalization: an attribute cannot be classified.
    Normalization,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Syntax => "syntax",
            Stage::Structure => "structure",
            Stage::Normalization => "normalization",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A conversion error. Every failure is fatal; no partial output is produced.
///
/// `line` and `column` are 1-based; 0 means the position is unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvertError {
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ConvertError {
    pub fn new(
        stage: Stage,
        file: &str,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        ConvertError {
            stage,
            prim: None,
            key: None,
            file: file.to_owned(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn syntax(file: &str, line: u32, column: u32, message: impl Into<String>) -> Self {
        ConvertError::new(Stage::Syntax, file, line, column, message)
    }

    pub fn structural(file: &str, line: u32, message: impl Into<String>) -> Self {
        ConvertError::new(Stage::Structure, file, line, 0, message)
    }

    pub fn normalization(file: &str, line: u32, message: impl Into<String>) -> Self {
        ConvertError::new(Stage::Normalization, file, line, 0, message)
    }

    pub fn with_prim(mut self, prim: &str) -> Self {
        self.prim = Some(prim.to_owned());
        self
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_owned());
        self
    }

    /// Serialize with every field present (null for missing ones), for
    /// machine-readable error reporting.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "column":  self.column,
            "file":    self.file,
            "key":     self.key,
            "line":    self.line,
            "message": self.message,
            "prim":    self.prim,
            "stage":   self.stage.as_str(),
        })
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if self.line > 0 {
            write!(f, ":{}", self.line)?;
            if self.column > 0 {
                write!(f, ":{}", self.column)?;
            }
        }
        write!(f, ": {} error: {}", self.stage, self.message)?;
        if let Some(prim) = &self.prim {
            write!(f, " [prim '{}']", prim)?;
        }
        if let Some(key) = &self.key {
            write!(f, " [key '{}']", key)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConvertError {}
