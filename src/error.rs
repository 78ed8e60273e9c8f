use thiserror::Error;

/// Failures raised while talking to the graphics backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GfxError {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: &'static str, log: String },

    #[error("program failed to link: {0}")]
    Link(String),

    #[error("could not create {0}")]
    Create(&'static str),

    #[error("texture upload failed: {0}")]
    TextureUpload(String),

    #[error("noise volume edge must be between 1 and {max}, got {size}")]
    InvalidNoiseSize { size: u32, max: u32 },
}

/// Rejected edits coming from the control panel.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    #[error("unknown control `{0}`")]
    UnknownField(String),

    #[error("control `{field}` expects {expected} numbers, found {found} in {text:?}")]
    Arity {
        field: &'static str,
        expected: usize,
        found: usize,
        text: String,
    },

    #[error("control `{field}` is not a number: {text:?}")]
    NotANumber { field: &'static str, text: String },

    #[error("invalid hex color {0:?}")]
    Color(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid demo configuration: {0}")]
    Json(#[from] serde_json::Error),
}
