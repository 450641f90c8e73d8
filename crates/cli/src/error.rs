use std::path::PathBuf;
use usda_core::ConvertError;

/// Everything that can make a `usda2json` run fail.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("error reading '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error writing '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid bindings file '{}': {source}", .path.display())]
    Bindings {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Syntax, structure or normalization failure in the input.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("cannot render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("internal error: embedded record schema is invalid: {0}")]
    Schema(String),

    #[error("output does not conform to the record schema:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

impl CliError {
    /// Machine-readable form for `--error-format json`.
    pub(crate) fn to_json_value(&self) -> serde_json::Value {
        match self {
            CliError::Convert(e) => e.to_json_value(),
            CliError::Invalid(errors) => serde_json::json!({
                "stage": "validation",
                "message": "output does not conform to the record schema",
                "errors": errors,
            }),
            other => serde_json::json!({
                "stage": "cli",
                "message": other.to_string(),
            }),
        }
    }
}
