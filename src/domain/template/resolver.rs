// URI resolution: picking a pattern for a path and binding its variables

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use super::binder::VariableBinder;
use super::pattern::UriPattern;
use super::token::{RawValue, Variable};

/// Rule used to pick one pattern when several match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRule {
    /// The first matching pattern in list order.
    #[default]
    First,
    /// The matching pattern with the highest score; ties keep list order.
    Best,
}

/// Outcome of a resolution.
///
/// Ordered by severity so that combining statuses keeps the most severe one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Every variable was converted.
    Resolved,
    /// At least one variable could not be converted for its type.
    Unresolved,
    /// The path does not fit the pattern, or a value has an unsupported shape.
    Error,
}

impl Status {
    pub fn combine(self, other: Status) -> Status {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Resolved => "RESOLVED",
            Status::Unresolved => "UNRESOLVED",
            Status::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving one path against one pattern.
#[derive(Debug, Clone)]
pub struct UriResolveResult<'p> {
    pattern: &'p UriPattern,
    values: HashMap<String, Value>,
    status: Status,
}

impl<'p> UriResolveResult<'p> {
    fn new(pattern: &'p UriPattern) -> Self {
        Self {
            pattern,
            values: HashMap::new(),
            status: Status::Resolved,
        }
    }

    pub fn pattern(&self) -> &'p UriPattern {
        self.pattern
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_resolved(&self) -> bool {
        self.status == Status::Resolved
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> HashMap<String, Value> {
        self.values
    }
}

/// Resolves one path (typically the path of the current request).
///
/// ```
/// use urimatch::domain::template::{UriPattern, UriResolver, VariableBinder, Status};
///
/// let patterns = vec![UriPattern::compile("/doc/{int:id}").unwrap()];
/// let resolver = UriResolver::new("/doc/42");
/// let pattern = resolver.find_first(&patterns).unwrap();
/// let result = resolver.resolve(pattern, &VariableBinder::with_builtin_types());
/// assert_eq!(result.status(), Status::Resolved);
/// assert_eq!(result.get("id"), Some(&serde_json::json!(42)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UriResolver<'u> {
    uri: &'u str,
}

impl<'u> UriResolver<'u> {
    pub fn new(uri: &'u str) -> Self {
        Self { uri }
    }

    pub fn uri(&self) -> &'u str {
        self.uri
    }

    /// The matching pattern selected by `rule`.
    pub fn find<'p, P: AsRef<UriPattern>>(&self, patterns: &'p [P], rule: MatchRule) -> Option<&'p P> {
        match rule {
            MatchRule::First => self.find_first(patterns),
            MatchRule::Best => self.find_best(patterns),
        }
    }

    /// The first pattern in the list that matches.
    pub fn find_first<'p, P: AsRef<UriPattern>>(&self, patterns: &'p [P]) -> Option<&'p P> {
        patterns.iter().find(|p| self.is_match(*p))
    }

    /// The matching pattern with the highest score; the first one wins a tie.
    pub fn find_best<'p, P: AsRef<UriPattern>>(&self, patterns: &'p [P]) -> Option<&'p P> {
        let mut best: Option<&'p P> = None;
        for candidate in patterns.iter().filter(|p| self.is_match(*p)) {
            match best {
                Some(current) if candidate.as_ref().score() <= current.as_ref().score() => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// Every matching pattern, in list order.
    pub fn find_all<'p, P: AsRef<UriPattern>>(&self, patterns: &'p [P]) -> Vec<&'p P> {
        patterns.iter().filter(|p| self.is_match(*p)).collect()
    }

    /// Resolves with an empty binder: every variable is a plain string.
    pub fn resolve_default<'p>(&self, pattern: &'p UriPattern) -> UriResolveResult<'p> {
        self.resolve(pattern, &VariableBinder::new())
    }

    /// Matches the path against `pattern` and converts each captured variable.
    ///
    /// The status is the most severe outcome over all variables: a value that
    /// cannot be converted makes it `Unresolved` (the variable is left out,
    /// the others are still bound), a multi-value capture makes it `Error`.
    pub fn resolve<'p>(&self, pattern: &'p UriPattern, binder: &VariableBinder) -> UriResolveResult<'p> {
        let mut result = UriResolveResult::new(pattern);

        // no match, or a regex that disagrees with the token list
        let captures = match pattern.regex().captures(self.uri) {
            Some(captures) if captures.len() - 1 == pattern.tokens().len() => captures,
            _ => {
                debug!(uri = self.uri, pattern = pattern.as_str(), "URI does not fit pattern");
                result.status = Status::Error;
                return result;
            }
        };

        let mut raw_values: HashMap<Variable, RawValue> = HashMap::new();
        for (i, token) in pattern.tokens().iter().enumerate() {
            let captured = captures.get(i + 1).map_or("", |m| m.as_str());
            token.capture_resolve(captured, &mut raw_values);
        }

        Self::lookup(&mut result, raw_values, binder);
        debug!(
            uri = self.uri,
            pattern = pattern.as_str(),
            status = %result.status,
            "Resolved URI"
        );
        result
    }

    fn is_match<P: AsRef<UriPattern>>(&self, pattern: &P) -> bool {
        pattern.as_ref().matches(self.uri)
    }

    fn lookup(result: &mut UriResolveResult<'_>, raw_values: HashMap<Variable, RawValue>, binder: &VariableBinder) {
        let mut status = Status::Resolved;
        for (variable, raw) in raw_values {
            match raw {
                RawValue::Single(value) => {
                    let resolver = binder.get_resolver(variable.name(), variable.var_type());
                    match resolver.resolve(&value) {
                        Some(resolved) => {
                            result.values.insert(variable.name().to_string(), resolved);
                        }
                        None => {
                            debug!(variable = variable.name(), value = %value, "Variable unresolved");
                            status = status.combine(Status::Unresolved);
                        }
                    }
                }
                // TODO: resolve lists element-wise once resolvers can declare list support
                RawValue::Segments(_) => {
                    status = status.combine(Status::Error);
                }
            }
        }
        result.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::binder::IntegerResolver;
    use serde_json::json;

    fn patterns(templates: &[&str]) -> Vec<UriPattern> {
        templates
            .iter()
            .map(|t| UriPattern::compile(t).unwrap())
            .collect()
    }

    #[test]
    fn test_find_first_uses_list_order() {
        let patterns = patterns(&["/a/{x}", "/a/fixed"]);
        let resolver = UriResolver::new("/a/fixed");
        assert_eq!(resolver.find_first(&patterns).unwrap().as_str(), "/a/{x}");
        assert_eq!(
            resolver.find(&patterns, MatchRule::First).unwrap().as_str(),
            "/a/{x}"
        );
    }

    #[test]
    fn test_find_best_uses_score() {
        let patterns = patterns(&["/a/{x}", "/a/fixed"]);
        let resolver = UriResolver::new("/a/fixed");
        assert_eq!(resolver.find_best(&patterns).unwrap().as_str(), "/a/fixed");
        assert_eq!(
            resolver.find(&patterns, MatchRule::Best).unwrap().as_str(),
            "/a/fixed"
        );
    }

    #[test]
    fn test_find_best_tie_keeps_first() {
        let patterns = patterns(&["/a/{x}", "/a/{y}"]);
        let resolver = UriResolver::new("/a/1");
        assert_eq!(resolver.find_best(&patterns).unwrap().as_str(), "/a/{x}");
    }

    #[test]
    fn test_find_none() {
        let patterns = patterns(&["/a/{x}"]);
        let resolver = UriResolver::new("/b/1");
        assert!(resolver.find_first(&patterns).is_none());
        assert!(resolver.find_best(&patterns).is_none());
        assert!(resolver.find_all(&patterns).is_empty());

        let empty: Vec<UriPattern> = Vec::new();
        assert!(resolver.find_first(&empty).is_none());
        assert!(resolver.find_all(&empty).is_empty());
    }

    #[test]
    fn test_find_all_in_order() {
        let patterns = patterns(&["/a/*", "/b/{x}", "/a/{x}", "/a/1"]);
        let resolver = UriResolver::new("/a/1");
        let found: Vec<&str> = resolver
            .find_all(&patterns)
            .iter()
            .map(|p| p.as_str())
            .collect();
        assert_eq!(found, vec!["/a/*", "/a/{x}", "/a/1"]);
    }

    #[test]
    fn test_resolve_typed_and_default_variables() {
        let pattern = UriPattern::compile("/doc/{id}/{name}").unwrap();
        let mut binder = VariableBinder::new();
        binder.bind_name("id", Box::new(IntegerResolver));

        let result = UriResolver::new("/doc/42/readme").resolve(&pattern, &binder);
        assert_eq!(result.status(), Status::Resolved);
        assert_eq!(result.get("id"), Some(&json!(42)));
        assert_eq!(result.get("name"), Some(&json!("readme")));
        assert_eq!(result.pattern(), &pattern);
    }

    #[test]
    fn test_resolve_unresolved_keeps_other_variables() {
        let pattern = UriPattern::compile("/doc/{id}/{name}").unwrap();
        let mut binder = VariableBinder::new();
        binder.bind_name("id", Box::new(IntegerResolver));

        let result = UriResolver::new("/doc/abc/readme").resolve(&pattern, &binder);
        assert_eq!(result.status(), Status::Unresolved);
        assert_eq!(result.get("id"), None);
        assert_eq!(result.get("name"), Some(&json!("readme")));
    }

    #[test]
    fn test_resolve_no_match_is_error() {
        let pattern = UriPattern::compile("/doc/{id}").unwrap();
        let result = UriResolver::new("/other/1").resolve_default(&pattern);
        assert_eq!(result.status(), Status::Error);
        assert!(result.values().is_empty());
    }

    #[test]
    fn test_resolve_segments_is_error() {
        let pattern = UriPattern::compile("/files{/path*}").unwrap();
        let result = UriResolver::new("/files/a/b").resolve_default(&pattern);
        assert_eq!(result.status(), Status::Error);
    }

    #[test]
    fn test_error_wins_over_unresolved() {
        let pattern = UriPattern::compile("/n/{int:n}{/rest*}").unwrap();
        let binder = VariableBinder::with_builtin_types();
        let result = UriResolver::new("/n/x/a/b").resolve(&pattern, &binder);
        assert_eq!(result.status(), Status::Error);
    }

    #[test]
    fn test_resolve_wildcard_remainder() {
        let pattern = UriPattern::compile("/static/*").unwrap();
        let result = UriResolver::new("/static/css/site.css").resolve_default(&pattern);
        assert!(result.is_resolved());
        assert_eq!(result.get("wildcard"), Some(&json!("css/site.css")));
    }

    #[test]
    fn test_status_combine() {
        assert_eq!(Status::Resolved.combine(Status::Unresolved), Status::Unresolved);
        assert_eq!(Status::Error.combine(Status::Unresolved), Status::Error);
        assert_eq!(Status::Unresolved.combine(Status::Resolved), Status::Unresolved);
        assert_eq!(Status::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_match_rule_serde() {
        let rule: MatchRule = serde_json::from_str("\"best\"").unwrap();
        assert_eq!(rule, MatchRule::Best);
        assert_eq!(MatchRule::default(), MatchRule::First);
    }
}
