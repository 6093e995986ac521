// URI templates and their expansion

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::parser::{digest, DefaultTokenFactory, TokenFactory};
use super::token::{Token, Variable};
use crate::error::TemplateSyntaxError;

/// Source of variable values for expansion.
pub trait Parameters {
    fn value(&self, name: &str) -> Option<String>;
}

impl Parameters for HashMap<String, String> {
    fn value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Parameters for BTreeMap<String, String> {
    fn value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Parameters for HashMap<String, Value> {
    fn value(&self, name: &str) -> Option<String> {
        self.get(name).and_then(value_to_string)
    }
}

impl Parameters for serde_json::Map<String, Value> {
    fn value(&self, name: &str) -> Option<String> {
        self.get(name).and_then(value_to_string)
    }
}

impl Parameters for [(&str, &str)] {
    fn value(&self, name: &str) -> Option<String> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

// Strings unquoted, lists joined as path segments, null as absent
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_string)
                .collect::<Vec<_>>()
                .join("/"),
        ),
        other => Some(other.to_string()),
    }
}

/// A URI template: literal text and variable expressions, e.g. `/doc/{id}/{name}`.
///
/// Two templates are equal when their source strings are equal, even if a
/// differently written template would produce the same tokens.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: String,
    tokens: Vec<Token>,
}

impl UriTemplate {
    /// Parses a template using the default expression syntax.
    pub fn parse(template: &str) -> Result<Self, TemplateSyntaxError> {
        Self::parse_with(template, &DefaultTokenFactory)
    }

    /// Parses a template using the given token factory.
    pub fn parse_with(template: &str, factory: &dyn TokenFactory) -> Result<Self, TemplateSyntaxError> {
        let tokens = digest(template, factory)?;
        Ok(Self {
            template: template.to_string(),
            tokens,
        })
    }

    /// Expands the template: missing variables fall back to their default, then to "".
    pub fn expand<P: Parameters + ?Sized>(&self, parameters: &P) -> String {
        self.tokens
            .iter()
            .map(|token| token.expand(parameters))
            .collect()
    }

    /// Parses and expands in one go.
    pub fn expand_template<P: Parameters + ?Sized>(
        template: &str,
        parameters: &P,
    ) -> Result<String, TemplateSyntaxError> {
        Ok(Self::parse(template)?.expand(parameters))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn variables(&self) -> Vec<&Variable> {
        self.tokens.iter().filter_map(Token::as_variable).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl PartialEq for UriTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for UriTemplate {}

impl Hash for UriTemplate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.template.hash(state);
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
