// Variable resolvers and the binder that maps variables to them

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Converts a raw captured string into a typed value.
///
/// `None` means the text cannot be interpreted for the variable's type; it is
/// an expected outcome, not an error.
pub trait VariableResolver: Send + Sync {
    fn resolve(&self, raw: &str) -> Option<Value>;
}

impl<F> VariableResolver for F
where
    F: Fn(&str) -> Option<Value> + Send + Sync,
{
    fn resolve(&self, raw: &str) -> Option<Value> {
        self(raw)
    }
}

/// Returns the raw string unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl VariableResolver for PassthroughResolver {
    fn resolve(&self, raw: &str) -> Option<Value> {
        Some(Value::String(raw.to_string()))
    }
}

/// Signed 64-bit integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerResolver;

impl VariableResolver for IntegerResolver {
    fn resolve(&self, raw: &str) -> Option<Value> {
        raw.parse::<i64>().ok().map(Value::from)
    }
}

/// `true`/`false`, `yes`/`no`, `1`/`0`, case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanResolver;

impl VariableResolver for BooleanResolver {
    fn resolve(&self, raw: &str) -> Option<Value> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "0" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

/// Accepts only values from a fixed list.
#[derive(Debug, Clone)]
pub struct OptionsResolver {
    values: Vec<String>,
}

impl OptionsResolver {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl VariableResolver for OptionsResolver {
    fn resolve(&self, raw: &str) -> Option<Value> {
        self.values
            .iter()
            .any(|value| value == raw)
            .then(|| Value::String(raw.to_string()))
    }
}

/// Accepts values matching a regular expression in full.
#[derive(Debug, Clone)]
pub struct RegexResolver {
    regex: Regex,
}

impl RegexResolver {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { regex })
    }
}

impl VariableResolver for RegexResolver {
    fn resolve(&self, raw: &str) -> Option<Value> {
        self.regex
            .is_match(raw)
            .then(|| Value::String(raw.to_string()))
    }
}

/// Registry of variable resolvers.
///
/// Lookup order: exact (name, type) binding, then name binding, then type
/// binding, then the default resolver (passthrough unless replaced). Meant
/// to be filled at startup and only read afterwards.
pub struct VariableBinder {
    exact: HashMap<(String, Option<String>), Box<dyn VariableResolver>>,
    by_name: HashMap<String, Box<dyn VariableResolver>>,
    by_type: HashMap<String, Box<dyn VariableResolver>>,
    default: Box<dyn VariableResolver>,
}

impl VariableBinder {
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            by_name: HashMap::new(),
            by_type: HashMap::new(),
            default: Box::new(PassthroughResolver),
        }
    }

    /// A binder with the `int`/`integer` and `bool`/`boolean` types bound.
    pub fn with_builtin_types() -> Self {
        let mut binder = Self::new();
        binder.bind_type("int", Box::new(IntegerResolver));
        binder.bind_type("integer", Box::new(IntegerResolver));
        binder.bind_type("bool", Box::new(BooleanResolver));
        binder.bind_type("boolean", Box::new(BooleanResolver));
        binder
    }

    /// Binds a resolver to a variable name and declared type (`None` for untyped).
    pub fn bind(&mut self, name: &str, var_type: Option<&str>, resolver: Box<dyn VariableResolver>) {
        self.exact
            .insert((name.to_string(), var_type.map(str::to_string)), resolver);
    }

    /// Binds a resolver to every variable with this name, whatever its type.
    pub fn bind_name(&mut self, name: &str, resolver: Box<dyn VariableResolver>) {
        self.by_name.insert(name.to_string(), resolver);
    }

    /// Binds a resolver to every variable declared with this type.
    pub fn bind_type(&mut self, var_type: &str, resolver: Box<dyn VariableResolver>) {
        self.by_type.insert(var_type.to_string(), resolver);
    }

    pub fn set_default(&mut self, resolver: Box<dyn VariableResolver>) {
        self.default = resolver;
    }

    /// Never fails: falls back to the default resolver.
    pub fn get_resolver(&self, name: &str, var_type: Option<&str>) -> &dyn VariableResolver {
        self.exact
            .get(&(name.to_string(), var_type.map(str::to_string)))
            .or_else(|| self.by_name.get(name))
            .or_else(|| var_type.and_then(|t| self.by_type.get(t)))
            .unwrap_or(&self.default)
            .as_ref()
    }

    pub fn is_bound(&self, name: &str, var_type: Option<&str>) -> bool {
        self.exact
            .contains_key(&(name.to_string(), var_type.map(str::to_string)))
            || self.by_name.contains_key(name)
            || var_type.is_some_and(|t| self.by_type.contains_key(t))
    }
}

impl Default for VariableBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VariableBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.by_name.keys().collect();
        let mut types: Vec<&String> = self.by_type.keys().collect();
        names.sort();
        types.sort();
        f.debug_struct("VariableBinder")
            .field("exact", &self.exact.keys().collect::<Vec<_>>())
            .field("names", &names)
            .field("types", &types)
            .finish_non_exhaustive()
    }
}
