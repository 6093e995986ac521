// Error handling for urimatch

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Raised while turning template text into tokens and patterns.
///
/// These only ever happen at configuration time: templates are compiled once
/// when the route table is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateSyntaxError {
    #[error("URI template cannot be empty")]
    EmptyTemplate,

    #[error("unterminated expression starting at position {position}")]
    UnterminatedExpression { position: usize },

    #[error("unexpected closing brace at position {position}")]
    UnexpectedClosingBrace { position: usize },

    #[error("empty variable name in expression '{expression}'")]
    EmptyVariableName { expression: String },

    #[error("invalid character '{found}' in variable name of expression '{expression}'")]
    InvalidVariableName { expression: String, found: char },

    #[error("unknown modifier '{modifier}' in expression '{expression}'")]
    UnknownModifier { expression: String, modifier: String },

    #[error("unsupported expression '{expression}'")]
    UnsupportedExpression { expression: String },

    #[error("wildcard '*' is only allowed at the end of the template (found at position {position})")]
    MisplacedWildcard { position: usize },

    #[error("invalid pattern regex: {0}")]
    InvalidRegex(String),

    #[error("pattern has {groups} capture groups for {tokens} tokens")]
    GroupMismatch { tokens: usize, groups: usize },
}

impl From<regex::Error> for TemplateSyntaxError {
    fn from(err: regex::Error) -> Self {
        TemplateSyntaxError::InvalidRegex(err.to_string())
    }
}

/// Raised while loading a route table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    Template {
        pattern: String,
        #[source]
        source: TemplateSyntaxError,
    },

    #[error("Invalid variable binding: {0}")]
    Variable(String),

    #[error("Duplicate service: {0}")]
    DuplicateService(String),
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Implement IntoResponse so Axum can convert errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({
            "error": status.canonical_reason().unwrap_or("error"),
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Internal(err.to_string())
    }
}
