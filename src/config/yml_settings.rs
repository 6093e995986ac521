use serde::{Deserialize, Serialize};

use crate::domain::template::MatchRule;

/// Root of a route table file.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RoutesSettings {
    #[serde(default)]
    pub match_rule: MatchRule,
    pub routes: Vec<RouteSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableSettings>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RouteSettings {
    pub pattern: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Binds a resolver to variables by name, by declared type, or both.
#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct VariableSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<BuiltinResolver>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinResolver {
    Integer,
    Boolean,
    String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde() {
        let settings = RoutesSettings {
            match_rule: MatchRule::Best,
            routes: vec![RouteSettings {
                pattern: "/doc/{int:id}".to_string(),
                service: "document".to_string(),
                description: "Show a document".to_string(),
            }],
            variables: vec![VariableSettings {
                var_type: Some("int".to_string()),
                resolver: Some(BuiltinResolver::Integer),
                ..Default::default()
            }],
        };

        let yml = serde_yaml::to_string(&settings).unwrap();
        let deserde: RoutesSettings = serde_yaml::from_str(&yml).unwrap();
        assert_eq!(settings, deserde);
    }

    #[test]
    fn test_defaults() {
        let yml = r#"
routes:
  - pattern: /a/{x}
    service: a
"#;
        let settings: RoutesSettings = serde_yaml::from_str(yml).unwrap();
        assert_eq!(settings.match_rule, MatchRule::First);
        assert!(settings.variables.is_empty());
        assert_eq!(settings.routes[0].description, "");
    }

    #[test]
    fn test_variable_entries() {
        let yml = r#"
match_rule: best
routes: []
variables:
  - type: int
    resolver: integer
  - name: lang
    options: [en, fr]
  - name: slug
    regex: "[a-z0-9-]+"
"#;
        let settings: RoutesSettings = serde_yaml::from_str(yml).unwrap();
        assert_eq!(settings.match_rule, MatchRule::Best);
        assert_eq!(settings.variables.len(), 3);
        assert_eq!(settings.variables[0].resolver, Some(BuiltinResolver::Integer));
        assert_eq!(
            settings.variables[1].options,
            Some(vec!["en".to_string(), "fr".to_string()])
        );
        assert_eq!(settings.variables[2].regex.as_deref(), Some("[a-z0-9-]+"));
    }

    #[test]
    fn test_skip_none_fields_in_yaml() {
        let settings = VariableSettings {
            name: Some("lang".to_string()),
            options: Some(vec!["en".to_string()]),
            ..Default::default()
        };

        let yml = serde_yaml::to_string(&settings).unwrap();
        assert!(yml.contains("name:"));
        assert!(yml.contains("options:"));
        assert!(!yml.contains("type:"));
        assert!(!yml.contains("resolver:"));
        assert!(!yml.contains("regex:"));
    }

    #[test]
    fn test_unknown_match_rule_rejected() {
        let yml = "match_rule: random\nroutes: []\n";
        assert!(serde_yaml::from_str::<RoutesSettings>(yml).is_err());
    }
}
