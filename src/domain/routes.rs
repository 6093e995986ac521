// Route table: named patterns plus the binder used to resolve them

use tracing::debug;

use super::template::{MatchRule, UriPattern, UriResolveResult, UriResolver, VariableBinder};

/// A configured route: a service name bound to a pattern.
#[derive(Debug, Clone)]
pub struct Route {
    service: String,
    description: String,
    pattern: UriPattern,
}

impl Route {
    pub fn new(service: &str, description: &str, pattern: UriPattern) -> Self {
        Self {
            service: service.to_string(),
            description: description.to_string(),
            pattern,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pattern(&self) -> &UriPattern {
        &self.pattern
    }
}

impl AsRef<UriPattern> for Route {
    fn as_ref(&self) -> &UriPattern {
        &self.pattern
    }
}

/// A route together with the result of resolving the request path against it.
#[derive(Debug)]
pub struct Dispatch<'t> {
    route: &'t Route,
    result: UriResolveResult<'t>,
}

impl<'t> Dispatch<'t> {
    pub fn route(&self) -> &'t Route {
        self.route
    }

    pub fn result(&self) -> &UriResolveResult<'t> {
        &self.result
    }

    pub fn into_result(self) -> UriResolveResult<'t> {
        self.result
    }
}

/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    binder: VariableBinder,
    match_rule: MatchRule,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>, binder: VariableBinder, match_rule: MatchRule) -> Self {
        Self {
            routes,
            binder,
            match_rule,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn binder(&self) -> &VariableBinder {
        &self.binder
    }

    pub fn match_rule(&self) -> MatchRule {
        self.match_rule
    }

    pub fn route(&self, service: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.service == service)
    }

    /// Picks the route for `path`.
    ///
    /// Matching routes are tried in match-rule order (list order, or score
    /// descending for `Best`) and the first one that resolves wins. When none
    /// resolves, the preferred candidate's result is returned so the caller
    /// sees why; `None` means no route matched at all.
    pub fn dispatch(&self, path: &str) -> Option<Dispatch<'_>> {
        let resolver = UriResolver::new(path);
        let mut candidates = resolver.find_all(&self.routes);
        if self.match_rule == MatchRule::Best {
            // stable: equal scores keep list order
            candidates.sort_by(|a, b| b.pattern.score().cmp(&a.pattern.score()));
        }

        let mut fallback = None;
        for route in candidates {
            let result = resolver.resolve(&route.pattern, &self.binder);
            if result.is_resolved() {
                debug!(path, service = %route.service, "Dispatched");
                return Some(Dispatch { route, result });
            }
            debug!(path, service = %route.service, status = %result.status(), "Route skipped");
            if fallback.is_none() {
                fallback = Some(Dispatch { route, result });
            }
        }
        fallback
    }
}
