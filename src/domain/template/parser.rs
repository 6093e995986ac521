// Template tokenizer and expression parsing

use regex::Regex;
use std::sync::LazyLock;

use super::token::{Modifier, Token, Variable, WildcardForm, WILDCARD_NAME};
use crate::error::TemplateSyntaxError;

/// Identifies expansion expressions within a template.
static EXPANSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// Turns one expansion expression into a token.
///
/// The tokenizer hands over every `{...}` match verbatim (braces included),
/// plus the bare string `*` for a trailing wildcard. Implement this to
/// support additional expression forms without touching patterns or the
/// resolver.
pub trait TokenFactory: Send + Sync {
    fn new_token(&self, expression: &str) -> Result<Token, TemplateSyntaxError>;
}

/// Recognises `{name}`, `{type:name}`, `{name=default}`, `{name|encode}`,
/// `{name*}`, `{/name*}` and the trailing `*`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTokenFactory;

impl TokenFactory for DefaultTokenFactory {
    fn new_token(&self, expression: &str) -> Result<Token, TemplateSyntaxError> {
        if expression == "*" {
            return Ok(Token::wildcard(Variable::new(WILDCARD_NAME)));
        }
        ExpressionParser::parse(expression)
    }
}

/// Splits a template into tokens.
pub fn digest(template: &str, factory: &dyn TokenFactory) -> Result<Vec<Token>, TemplateSyntaxError> {
    if template.is_empty() {
        return Err(TemplateSyntaxError::EmptyTemplate);
    }

    let mut tokens = Vec::new();
    let mut start = 0;

    for m in EXPANSION_PATTERN.find_iter(template) {
        // any text since the last expansion
        if m.start() > start {
            let text = &template[start..m.start()];
            check_literal(text, start, template.len())?;
            tokens.push(Token::literal(text));
        }
        tokens.push(factory.new_token(m.as_str())?);
        start = m.end();
    }

    // any text left over, including if there were no expansions
    if start < template.len() {
        let text = &template[start..];
        check_literal(text, start, template.len())?;
        match text.strip_suffix('*') {
            Some(head) => {
                if !head.is_empty() {
                    tokens.push(Token::literal(head));
                }
                tokens.push(factory.new_token("*")?);
            }
            None => tokens.push(Token::literal(text)),
        }
    }

    Ok(tokens)
}

/// Literal text may not contain braces, and `*` only as the template's last character.
fn check_literal(text: &str, offset: usize, template_len: usize) -> Result<(), TemplateSyntaxError> {
    for (i, ch) in text.char_indices() {
        let position = offset + i;
        match ch {
            '{' => return Err(TemplateSyntaxError::UnterminatedExpression { position }),
            '}' => return Err(TemplateSyntaxError::UnexpectedClosingBrace { position }),
            '*' if position + 1 != template_len => {
                return Err(TemplateSyntaxError::MisplacedWildcard { position })
            }
            _ => {}
        }
    }
    Ok(())
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.'
}

// Grammar: '{' ['/'] [type ':'] name ['*'] ['=' default] ['|' modifier] '}'
struct ExpressionParser<'a> {
    expression: &'a str,
    input: &'a str,
    pos: usize,
}

impl<'a> ExpressionParser<'a> {
    fn parse(expression: &'a str) -> Result<Token, TemplateSyntaxError> {
        let input = expression
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| TemplateSyntaxError::UnsupportedExpression {
                expression: expression.to_string(),
            })?;

        let mut parser = Self {
            expression,
            input,
            pos: 0,
        };
        parser.parse_token()
    }

    fn parse_token(&mut self) -> Result<Token, TemplateSyntaxError> {
        self.skip_whitespace();
        let segments = self.consume_if('/');

        let first = self.parse_name()?;
        self.skip_whitespace();
        let (var_type, name) = if self.consume_if(':') {
            self.skip_whitespace();
            (Some(first), self.parse_name()?)
        } else {
            (None, first)
        };
        self.skip_whitespace();

        let explode = self.consume_if('*');
        self.skip_whitespace();

        let default = if self.consume_if('=') {
            Some(self.parse_default_value())
        } else {
            None
        };

        let modifier = if self.consume_if('|') {
            self.skip_whitespace();
            self.parse_modifier()?
        } else {
            Modifier::Plain
        };
        self.skip_whitespace();

        if let Some(found) = self.peek_char() {
            return Err(TemplateSyntaxError::InvalidVariableName {
                expression: self.expression.to_string(),
                found,
            });
        }

        let mut variable = Variable::new(name);
        if let Some(var_type) = var_type {
            variable = variable.with_type(var_type);
        }
        if let Some(default) = default {
            variable = variable.with_default(default);
        }

        match (segments, explode, modifier) {
            (false, false, modifier) => Ok(Token::Variable { variable, modifier }),
            (segments, true, Modifier::Plain) => Ok(Token::Wildcard {
                variable,
                form: if segments {
                    WildcardForm::Segments
                } else {
                    WildcardForm::Remainder
                },
            }),
            _ => Err(TemplateSyntaxError::UnsupportedExpression {
                expression: self.expression.to_string(),
            }),
        }
    }

    fn parse_name(&mut self) -> Result<String, TemplateSyntaxError> {
        let name = self.parse_identifier();
        if !name.is_empty() {
            return Ok(name);
        }

        match self.peek_char() {
            None | Some(':' | '*' | '=' | '|') => Err(TemplateSyntaxError::EmptyVariableName {
                expression: self.expression.to_string(),
            }),
            Some(ch) if ch.is_whitespace() => Err(TemplateSyntaxError::EmptyVariableName {
                expression: self.expression.to_string(),
            }),
            Some(found) => Err(TemplateSyntaxError::InvalidVariableName {
                expression: self.expression.to_string(),
                found,
            }),
        }
    }

    fn parse_modifier(&mut self) -> Result<Modifier, TemplateSyntaxError> {
        match self.parse_identifier().as_str() {
            "encode" => Ok(Modifier::Encoded),
            other => Err(TemplateSyntaxError::UnknownModifier {
                expression: self.expression.to_string(),
                modifier: other.to_string(),
            }),
        }
    }

    fn parse_default_value(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch == '|' {
                break;
            }
            self.pos += ch.len_utf8();
        }
        self.input[start..self.pos].trim().to_string()
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if !is_name_char(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn consume_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }
}
