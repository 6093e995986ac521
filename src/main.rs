use anyhow::{bail, Context};
use clap::{Arg, ArgAction};
use std::{collections::HashMap, path::Path};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use urimatch::{
    config::{load_route_table, DEFAULT_ROUTES_FILE},
    domain::{location::path_of, RouteTable},
};

const DEFAULT_BIND: &str = "127.0.0.1:8000";

fn cli() -> clap::Command {
    clap::Command::new("urimatch")
        .about("Match request paths against URI templates")
        .arg(
            Arg::new("routes")
                .short('r')
                .long("routes")
                .value_name("ROUTES")
                .help("Path to a YAML file containing the route table")
                .default_value(DEFAULT_ROUTES_FILE),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDR")
                .help("Address to serve on")
                .default_value(DEFAULT_BIND),
        )
        .arg(
            Arg::new("resolve")
                .long("resolve")
                .value_name("PATH_OR_URL")
                .help("Resolve a single path or URL and exit")
                .conflicts_with("expand"),
        )
        .arg(
            Arg::new("expand")
                .long("expand")
                .value_name("SERVICE")
                .help("Expand a route's template and exit"),
        )
        .arg(
            Arg::new("param")
                .short('p')
                .long("param")
                .value_name("NAME=VALUE")
                .help("Variable value used by --expand")
                .action(ArgAction::Append)
                .requires("expand"),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "urimatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = cli().get_matches();

    let routes_path = matches
        .get_one::<String>("routes")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_ROUTES_FILE);
    let table = load_route_table(Path::new(routes_path))
        .with_context(|| format!("Failed to load route table from {}", routes_path))?;

    if let Some(input) = matches.get_one::<String>("resolve") {
        return resolve_once(&table, input);
    }

    if let Some(service) = matches.get_one::<String>("expand") {
        let params = matches
            .get_many::<String>("param")
            .into_iter()
            .flatten()
            .map(|p| parse_param(p))
            .collect::<anyhow::Result<HashMap<_, _>>>()?;
        return expand_once(&table, service, &params);
    }

    let bind = matches
        .get_one::<String>("bind")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_BIND);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!("urimatch listening on {}", bind);

    axum::serve(listener, urimatch::create_router(table))
        .await
        .context("Server error")?;
    Ok(())
}

fn resolve_once(table: &RouteTable, input: &str) -> anyhow::Result<()> {
    let path = path_of(input);
    let Some(dispatch) = table.dispatch(&path) else {
        bail!("No route matches '{}'", path);
    };

    let result = dispatch.result();
    let output = serde_json::json!({
        "service": dispatch.route().service(),
        "pattern": dispatch.route().pattern().as_str(),
        "status": result.status(),
        "variables": result.values(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if !result.is_resolved() {
        bail!("'{}' is {}", path, result.status());
    }
    Ok(())
}

fn expand_once(table: &RouteTable, service: &str, params: &HashMap<String, String>) -> anyhow::Result<()> {
    let route = table
        .route(service)
        .with_context(|| format!("Unknown service: '{}'", service))?;
    println!("{}", route.pattern().template().expand(params));
    Ok(())
}

fn parse_param(param: &str) -> anyhow::Result<(String, String)> {
    let (name, value) = param
        .split_once('=')
        .with_context(|| format!("Expected NAME=VALUE, got '{}'", param))?;
    Ok((name.trim().to_string(), value.to_string()))
}
