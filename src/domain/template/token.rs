// Tokens of a compiled URI template

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::uri_template::Parameters;

/// Name bound to the synthetic wildcard produced by a trailing `*`.
pub const WILDCARD_NAME: &str = "wildcard";

/// A template variable.
///
/// Identity is the pair (name, declared type): the default value only
/// matters for expansion, so two variables differing only by their default
/// are the same key in a resolution map.
#[derive(Debug, Clone, Eq)]
pub struct Variable {
    name: String,
    var_type: Option<String>,
    default: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            var_type: None,
            default: None,
        }
    }

    pub fn with_type(mut self, var_type: impl Into<String>) -> Self {
        self.var_type = Some(var_type.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn var_type(&self) -> Option<&str> {
        self.var_type.as_deref()
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Value used during expansion: the parameter, else the default, else "".
    fn lookup<P: Parameters + ?Sized>(&self, parameters: &P) -> String {
        parameters
            .value(&self.name)
            .or_else(|| self.default.clone())
            .unwrap_or_default()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.var_type == other.var_type
    }
}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.var_type.hash(state);
    }
}

/// How a variable's value is written to and read from the URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Emitted and captured verbatim.
    Plain,
    /// Percent-encoded on expansion, percent-decoded on capture.
    Encoded,
}

/// What a wildcard binds its captured remainder to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardForm {
    /// The whole remainder as a single string.
    Remainder,
    /// The remainder split on `/` into a list of segments (`{/name*}`).
    Segments,
}

/// Raw captured value of a variable, before type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Single(String),
    /// Multi-value capture. No resolver path exists for lists yet.
    Segments(Vec<String>),
}

/// One lexical unit of a URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Variable {
        variable: Variable,
        modifier: Modifier,
    },
    Wildcard {
        variable: Variable,
        form: WildcardForm,
    },
}

impl Token {
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(text.into())
    }

    pub fn variable(variable: Variable) -> Self {
        Token::Variable {
            variable,
            modifier: Modifier::Plain,
        }
    }

    pub fn wildcard(variable: Variable) -> Self {
        Token::Wildcard {
            variable,
            form: WildcardForm::Remainder,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Token::Literal(_))
    }

    /// The variable carried by this token, if any.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Token::Literal(_) => None,
            Token::Variable { variable, .. } | Token::Wildcard { variable, .. } => Some(variable),
        }
    }

    /// Expansion of this token given the parameters; never fails.
    pub fn expand<P: Parameters + ?Sized>(&self, parameters: &P) -> String {
        match self {
            Token::Literal(text) => text.clone(),
            Token::Variable { variable, modifier } => {
                let value = variable.lookup(parameters);
                match modifier {
                    Modifier::Plain => value,
                    Modifier::Encoded => urlencoding::encode(&value).into_owned(),
                }
            }
            Token::Wildcard { variable, form } => {
                let value = variable.lookup(parameters);
                match form {
                    WildcardForm::Remainder => value,
                    WildcardForm::Segments if value.is_empty() => value,
                    WildcardForm::Segments => format!("/{}", value.trim_start_matches('/')),
                }
            }
        }
    }

    /// Regex fragment matching this token: always exactly one capture group.
    pub fn match_fragment(&self) -> String {
        match self {
            Token::Literal(text) => format!("({})", regex::escape(text)),
            Token::Variable { .. } => "([^/]+?)".to_string(),
            Token::Wildcard {
                form: WildcardForm::Remainder,
                ..
            } => "((?s:.*))".to_string(),
            Token::Wildcard {
                form: WildcardForm::Segments,
                ..
            } => "((?:/(?s:.*))?)".to_string(),
        }
    }

    /// Records the raw value(s) bound by the text this token captured.
    ///
    /// Paths are matched percent-encoded, so every capture is decoded here,
    /// exactly once. Segments are split before decoding so an encoded `%2F`
    /// stays inside its segment.
    pub fn capture_resolve(&self, captured: &str, values: &mut HashMap<Variable, RawValue>) {
        match self {
            Token::Literal(_) => {}
            Token::Variable { variable, .. }
            | Token::Wildcard {
                variable,
                form: WildcardForm::Remainder,
            } => {
                values.insert(variable.clone(), RawValue::Single(decode(captured)));
            }
            Token::Wildcard {
                variable,
                form: WildcardForm::Segments,
            } => {
                let segments = captured
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(decode)
                    .collect();
                values.insert(variable.clone(), RawValue::Segments(segments));
            }
        }
    }
}

// invalid UTF-8 after decoding keeps the text as captured
fn decode(captured: &str) -> String {
    urlencoding::decode(captured)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| captured.to_string())
}

// Renders the token back to template syntax
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (variable, prefix, suffix) = match self {
            Token::Literal(text) => return f.write_str(text),
            Token::Wildcard {
                variable,
                form: WildcardForm::Remainder,
            } if variable.name() == WILDCARD_NAME && variable.var_type().is_none() => {
                return f.write_str("*");
            }
            Token::Variable { variable, modifier } => (
                variable,
                "",
                if *modifier == Modifier::Encoded { "|encode" } else { "" },
            ),
            Token::Wildcard { variable, form } => (
                variable,
                if *form == WildcardForm::Segments { "/" } else { "" },
                "",
            ),
        };

        f.write_str("{")?;
        f.write_str(prefix)?;
        if let Some(var_type) = variable.var_type() {
            write!(f, "{}:", var_type)?;
        }
        f.write_str(variable.name())?;
        if matches!(self, Token::Wildcard { .. }) {
            f.write_str("*")?;
        }
        if let Some(default) = variable.default() {
            write!(f, "={}", default)?;
        }
        f.write_str(suffix)?;
        f.write_str("}")
    }
}
