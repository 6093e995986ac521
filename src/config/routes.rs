use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::info;

use super::yml_settings::{BuiltinResolver, RouteSettings, RoutesSettings, VariableSettings};
use crate::{
    domain::{
        template::{
            BooleanResolver, IntegerResolver, OptionsResolver, PassthroughResolver, RegexResolver,
            UriPattern, VariableBinder, VariableResolver,
        },
        Route, RouteTable,
    },
    error::ConfigError,
};

pub const DEFAULT_ROUTES_FILE: &str = "routes.yml";

/// Load and compile a route table from a YAML file.
pub fn load_route_table(path: &Path) -> Result<RouteTable, ConfigError> {
    let yml = fs::read_to_string(path)?;
    let table = parse_route_table(&yml)?;
    info!(
        path = %path.display(),
        routes = table.routes().len(),
        match_rule = ?table.match_rule(),
        "Loaded route table"
    );
    Ok(table)
}

/// Compile a route table from YAML text.
pub fn parse_route_table(yml: &str) -> Result<RouteTable, ConfigError> {
    let settings: RoutesSettings = serde_yaml::from_str(yml)?;
    build_route_table(settings)
}

pub fn build_route_table(settings: RoutesSettings) -> Result<RouteTable, ConfigError> {
    let mut services = HashSet::new();
    let mut routes = Vec::with_capacity(settings.routes.len());
    for route in settings.routes {
        if !services.insert(route.service.clone()) {
            return Err(ConfigError::DuplicateService(route.service));
        }
        routes.push(compile_route(route)?);
    }

    let mut binder = VariableBinder::with_builtin_types();
    for variable in settings.variables {
        bind_variable(&mut binder, variable)?;
    }

    Ok(RouteTable::new(routes, binder, settings.match_rule))
}

fn compile_route(settings: RouteSettings) -> Result<Route, ConfigError> {
    let pattern = UriPattern::compile(&settings.pattern).map_err(|source| ConfigError::Template {
        pattern: settings.pattern.clone(),
        source,
    })?;
    Ok(Route::new(&settings.service, &settings.description, pattern))
}

fn bind_variable(binder: &mut VariableBinder, settings: VariableSettings) -> Result<(), ConfigError> {
    let target = match (&settings.name, &settings.var_type) {
        (Some(name), Some(t)) => format!("{}:{}", t, name),
        (Some(name), None) => name.clone(),
        (None, Some(t)) => format!("{}:*", t),
        (None, None) => {
            return Err(ConfigError::Variable(
                "a variable binding needs a name or a type".to_string(),
            ))
        }
    };

    let resolver: Box<dyn VariableResolver> =
        match (settings.resolver, settings.options, settings.regex) {
            (Some(builtin), None, None) => match builtin {
                BuiltinResolver::Integer => Box::new(IntegerResolver),
                BuiltinResolver::Boolean => Box::new(BooleanResolver),
                BuiltinResolver::String => Box::new(PassthroughResolver),
            },
            (None, Some(options), None) => Box::new(OptionsResolver::new(options)),
            (None, None, Some(regex)) => Box::new(
                RegexResolver::new(&regex)
                    .map_err(|e| ConfigError::Variable(format!("{}: invalid regex: {}", target, e)))?,
            ),
            _ => {
                return Err(ConfigError::Variable(format!(
                    "{}: exactly one of resolver, options or regex is required",
                    target
                )))
            }
        };

    match (settings.name.as_deref(), settings.var_type.as_deref()) {
        (Some(name), Some(t)) => binder.bind(name, Some(t), resolver),
        (Some(name), None) => binder.bind_name(name, resolver),
        (None, Some(t)) => binder.bind_type(t, resolver),
        (None, None) => unreachable!("checked above"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::Status;
    use serde_json::json;

    const ROUTES: &str = r#"
match_rule: best
routes:
  - pattern: /doc/{int:id}/{name}
    service: document
    description: Show a document
  - pattern: /doc/latest/{name}
    service: latest
  - pattern: /{lang}/home
    service: home
variables:
  - name: lang
    options: [en, fr]
"#;

    #[test]
    fn test_parse_route_table() {
        let table = parse_route_table(ROUTES).unwrap();
        assert_eq!(table.routes().len(), 3);
        assert_eq!(table.route("document").unwrap().description(), "Show a document");

        let dispatch = table.dispatch("/doc/7/readme").unwrap();
        assert_eq!(dispatch.route().service(), "document");
        assert_eq!(dispatch.result().get("id"), Some(&json!(7)));
    }

    #[test]
    fn test_options_binding() {
        let table = parse_route_table(ROUTES).unwrap();
        assert!(table.dispatch("/fr/home").unwrap().result().is_resolved());
        assert_eq!(
            table.dispatch("/de/home").unwrap().result().status(),
            Status::Unresolved
        );
    }

    #[test]
    fn test_valid_default_file() {
        // ensure that the shipped route table compiles
        let table = load_route_table(Path::new(DEFAULT_ROUTES_FILE)).unwrap();
        assert!(!table.routes().is_empty());
    }

    #[test]
    fn test_duplicate_service_rejected() {
        let yml = r#"
routes:
  - pattern: /a
    service: a
  - pattern: /b
    service: a
"#;
        let err = parse_route_table(yml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateService(ref s) if s == "a"));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let yml = r#"
routes:
  - pattern: /a/{
    service: a
"#;
        let err = parse_route_table(yml).unwrap_err();
        assert!(matches!(err, ConfigError::Template { ref pattern, .. } if pattern == "/a/{"));
    }

    #[test]
    fn test_variable_without_target_rejected() {
        let yml = r#"
routes: []
variables:
  - resolver: integer
"#;
        assert!(matches!(
            parse_route_table(yml),
            Err(ConfigError::Variable(_))
        ));
    }

    #[test]
    fn test_variable_with_two_resolvers_rejected() {
        let yml = r#"
routes: []
variables:
  - name: x
    resolver: integer
    regex: "[0-9]+"
"#;
        let err = parse_route_table(yml).unwrap_err();
        assert!(err.to_string().contains("exactly one of"));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let yml = r#"
routes: []
variables:
  - name: x
    regex: "("
"#;
        let err = parse_route_table(yml).unwrap_err();
        assert!(err.to_string().contains("invalid regex"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_route_table(Path::new("does-not-exist.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
