// Dispatch handlers: route listing, template expansion and the path fallback

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

use crate::{
    domain::{template::Status, Route},
    error::AppError,
    AppState,
};

#[derive(Serialize)]
pub struct RouteSummary<'a> {
    service: &'a str,
    pattern: &'a str,
    description: &'a str,
    score: i64,
}

impl<'a> From<&'a Route> for RouteSummary<'a> {
    fn from(route: &'a Route) -> Self {
        Self {
            service: route.service(),
            pattern: route.pattern().as_str(),
            description: route.description(),
            score: route.pattern().score(),
        }
    }
}

#[derive(Serialize)]
pub struct DispatchResponse<'a> {
    service: &'a str,
    pattern: &'a str,
    status: Status,
    variables: HashMap<String, Value>,
}

#[derive(Serialize)]
pub struct ExpandResponse<'a> {
    service: &'a str,
    uri: String,
}

// GET /_routes
pub async fn list_routes(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let routes: Vec<RouteSummary> = state.routes.routes().iter().map(RouteSummary::from).collect();
    Ok(Json(to_json(&routes)?))
}

// GET /_expand/{service}?name=value
pub async fn expand_route(
    Path(service): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let route = state
        .routes
        .route(&service)
        .ok_or_else(|| AppError::NotFound(format!("Unknown service: '{}'", service)))?;

    let uri = route.pattern().template().expand(&params);
    debug!(service = %service, uri = %uri, "Expanded route");

    Ok(Json(to_json(&ExpandResponse {
        service: route.service(),
        uri,
    })?))
}

// Any other path: resolve it against the route table
pub async fn dispatch(uri: Uri, State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    // matched still encoded; captures are decoded one by one
    let path = uri.path();

    let dispatch = state
        .routes
        .dispatch(path)
        .ok_or_else(|| AppError::NotFound(format!("No route matches '{}'", path)))?;

    let route = dispatch.route();
    let result = dispatch.into_result();
    let status = result.status();
    if status == Status::Error {
        warn!(path = %path, service = %route.service(), "Route resolution failed");
    }
    if status != Status::Resolved {
        return Err(AppError::NotFound(format!(
            "Route '{}' matched '{}' but is {}",
            route.service(),
            path,
            status
        )));
    }

    let body = DispatchResponse {
        service: route.service(),
        pattern: route.pattern().as_str(),
        status,
        variables: result.into_values(),
    };
    Ok(Json(to_json(&body)?))
}

// Bodies borrow from the shared route table, so they are rendered before returning
fn to_json<T: Serialize>(body: &T) -> Result<Value, AppError> {
    serde_json::to_value(body).map_err(|e| AppError::Internal(e.to_string()))
}
