// URI template engine
//
// Template text is split into tokens (parser), compiled into anchored
// patterns (pattern), matched against request paths and bound to typed
// values through a resolver registry (resolver, binder).

mod binder;
mod parser;
mod pattern;
mod resolver;
mod token;
mod uri_template;

pub use binder::{
    BooleanResolver, IntegerResolver, OptionsResolver, PassthroughResolver, RegexResolver,
    VariableBinder, VariableResolver,
};
pub use parser::{digest, DefaultTokenFactory, TokenFactory};
pub use pattern::UriPattern;
pub use resolver::{MatchRule, Status, UriResolveResult, UriResolver};
pub use token::{Modifier, RawValue, Token, Variable, WildcardForm, WILDCARD_NAME};
pub use uri_template::{Parameters, UriTemplate};
