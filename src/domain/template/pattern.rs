// Compiled URI patterns

use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::parser::{DefaultTokenFactory, TokenFactory};
use super::token::Token;
use super::uri_template::UriTemplate;
use crate::error::TemplateSyntaxError;

const LITERAL_WEIGHT: i64 = 16;
const VARIABLE_PENALTY: i64 = 1;
const WILDCARD_PENALTY: i64 = 4;

/// A URI template compiled for matching.
///
/// The regex holds exactly one capture group per token (literals included),
/// in token order, and is anchored at both ends. Patterns are immutable and
/// meant to be compiled once and shared.
#[derive(Debug, Clone)]
pub struct UriPattern {
    template: UriTemplate,
    regex: Regex,
    score: i64,
}

impl UriPattern {
    pub fn compile(template: &str) -> Result<Self, TemplateSyntaxError> {
        Self::compile_with(template, &DefaultTokenFactory)
    }

    pub fn compile_with(template: &str, factory: &dyn TokenFactory) -> Result<Self, TemplateSyntaxError> {
        Self::from_template(UriTemplate::parse_with(template, factory)?)
    }

    pub fn from_template(template: UriTemplate) -> Result<Self, TemplateSyntaxError> {
        let mut source = String::from("^");
        for token in template.tokens() {
            source.push_str(&token.match_fragment());
        }
        source.push('$');

        let regex = Regex::new(&source)?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != template.tokens().len() {
            return Err(TemplateSyntaxError::GroupMismatch {
                tokens: template.tokens().len(),
                groups,
            });
        }

        let score = score_tokens(template.tokens());
        Ok(Self {
            template,
            regex,
            score,
        })
    }

    /// Whether the whole path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Text captured for each token, in token order; `None` when the path does not match.
    pub fn capture_groups<'p, 's>(&'p self, path: &'s str) -> Option<Vec<(&'p Token, &'s str)>> {
        let captures = self.regex.captures(path)?;
        let groups: Vec<&str> = (1..captures.len())
            .map(|i| captures.get(i).map_or("", |m| m.as_str()))
            .collect();
        if groups.len() != self.tokens().len() {
            return None;
        }
        Some(self.tokens().iter().zip(groups).collect())
    }

    /// Specificity used to pick between patterns matching the same path.
    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    pub fn tokens(&self) -> &[Token] {
        self.template.tokens()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn as_str(&self) -> &str {
        self.template.as_str()
    }
}

impl AsRef<UriPattern> for UriPattern {
    fn as_ref(&self) -> &UriPattern {
        self
    }
}

impl PartialEq for UriPattern {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for UriPattern {}

impl Hash for UriPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.template.hash(state);
    }
}

impl fmt::Display for UriPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.template, f)
    }
}

// Literal characters raise the score, captures lower it (wildcards more than variables)
fn score_tokens(tokens: &[Token]) -> i64 {
    tokens
        .iter()
        .map(|token| match token {
            Token::Literal(text) => text.chars().count() as i64 * LITERAL_WEIGHT,
            Token::Variable { .. } => -VARIABLE_PENALTY,
            Token::Wildcard { .. } => -WILDCARD_PENALTY,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_matches_only_itself() {
        let pattern = UriPattern::compile("/about/us.html").unwrap();
        assert!(pattern.matches("/about/us.html"));
        assert!(!pattern.matches("/about/usXhtml"));
        assert!(!pattern.matches("/about/us.html/"));
        assert!(!pattern.matches("/prefix/about/us.html"));
    }

    #[test]
    fn test_variable_matches_single_segment() {
        let pattern = UriPattern::compile("/a/{x}").unwrap();
        assert!(pattern.matches("/a/5"));
        assert!(!pattern.matches("/a/5/6"));
        assert!(!pattern.matches("/a/"));
    }

    #[test]
    fn test_wildcard_matches_remainder() {
        let pattern = UriPattern::compile("/a/{x*}").unwrap();
        assert!(pattern.matches("/a/5"));
        assert!(pattern.matches("/a/5/6"));

        let trailing = UriPattern::compile("/static/*").unwrap();
        assert!(trailing.matches("/static/"));
        assert!(trailing.matches("/static/css/site.css"));
        assert!(!trailing.matches("/other/css"));
    }

    #[test]
    fn test_segments_wildcard_requires_separator() {
        let pattern = UriPattern::compile("/docs{/path*}").unwrap();
        assert!(pattern.matches("/docs"));
        assert!(pattern.matches("/docs/a/b"));
        assert!(!pattern.matches("/docsa"));
    }

    #[test]
    fn test_group_per_token() {
        let pattern = UriPattern::compile("/doc/{id}/{name}").unwrap();
        assert_eq!(pattern.regex().captures_len() - 1, pattern.tokens().len());
    }

    #[test]
    fn test_capture_groups() {
        let pattern = UriPattern::compile("/doc/{id}/{rest*}").unwrap();
        let groups = pattern.capture_groups("/doc/42/a/b").unwrap();
        let captured: Vec<&str> = groups.iter().map(|(_, text)| *text).collect();
        assert_eq!(captured, vec!["/doc/", "42", "/", "a/b"]);
        assert!(pattern.capture_groups("/other").is_none());
    }

    #[test]
    fn test_score_prefers_literals() {
        let variable = UriPattern::compile("/a/{x}").unwrap();
        let fixed = UriPattern::compile("/a/fixed").unwrap();
        let wildcard = UriPattern::compile("/a/{x*}").unwrap();
        assert!(fixed.score() > variable.score());
        assert!(variable.score() > wildcard.score());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let a = UriPattern::compile("/doc/{id}/*").unwrap();
        let b = UriPattern::compile("/doc/{id}/*").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.score(), b.score());
        for path in ["/doc/1/x", "/doc/1/", "/doc/1", "/doc"] {
            assert_eq!(a.matches(path), b.matches(path));
        }
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = UriPattern::compile("/a.b/(c)/{x}").unwrap();
        assert!(pattern.matches("/a.b/(c)/1"));
        assert!(!pattern.matches("/aXb/(c)/1"));
    }

    #[test]
    fn test_compile_propagates_syntax_errors() {
        assert!(UriPattern::compile("").is_err());
        assert!(UriPattern::compile("/a/{").is_err());
    }
}
