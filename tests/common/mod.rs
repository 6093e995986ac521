// Common test utilities shared across test files

use urimatch::{config::parse_route_table, domain::RouteTable};

/// Route table used by the HTTP tests
#[allow(dead_code)]
pub const TEST_ROUTES: &str = r#"
match_rule: best
routes:
  - pattern: /doc/{int:id}/{name}
    service: document
    description: Show a document
  - pattern: /doc/latest/{name}
    service: latest
  - pattern: /{lang}/home
    service: home
  - pattern: /files{/path*}
    service: files
  - pattern: /search/{q|encode}
    service: search
  - pattern: /tag/{slug}/{page=1}
    service: tag
variables:
  - type: int
    resolver: integer
  - name: lang
    options: [en, fr]
  - name: page
    resolver: integer
"#;

#[allow(dead_code)]
pub fn test_route_table() -> RouteTable {
    parse_route_table(TEST_ROUTES).expect("test route table should compile")
}

/// Create a test Axum router for integration tests
#[allow(dead_code)]
pub fn create_test_app() -> axum::Router {
    urimatch::create_router(test_route_table())
}

/// Read a response body as JSON
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    use http_body_util::BodyExt;

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
