//! Run one catalog query against the live TMDB API and print the GraphQL response.
//! Usage:
//!   cargo run --bin query_probe -- movie <id>
//!   cargo run --bin query_probe -- search <query>
//!   cargo run --bin query_probe -- trending <media_type> <time_window>
//!   cargo run --bin query_probe -- top_rated
//!   cargo run --bin query_probe -- sdl
//! Requires TMDB_ACCESS_TOKEN in the environment (.env supported), except for `sdl`.

use anyhow::{anyhow, Result};
use async_graphql::{Request, Variables};
use dotenvy::dotenv;
use moviegraph::schema::{build_schema, sdl};
use moviegraph::tmdb::{TmdbApi, TmdbClient};
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;

const SUMMARY_FIELDS: &str = "id title vote_average poster_path";
const DETAIL_FIELDS: &str = "id title original_title overview poster_path backdrop_path \
                             release_date revenue vote_average vote_count homepage";

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin query_probe -- movie <id>");
    eprintln!("       cargo run --bin query_probe -- search <query>");
    eprintln!("       cargo run --bin query_probe -- trending <media_type> <time_window>");
    eprintln!("       cargo run --bin query_probe -- top_rated");
    eprintln!("       cargo run --bin query_probe -- sdl");
    std::process::exit(1);
}

fn arg(args: &[String], idx: usize, name: &str) -> Result<String> {
    args.get(idx)
        .cloned()
        .ok_or_else(|| anyhow!("missing {} argument", name))
}

fn build_request(args: &[String]) -> Result<(String, Value)> {
    let request = match args[1].as_str() {
        "movie" => (
            format!("query ($id: String) {{ movie(id: $id) {{ {DETAIL_FIELDS} }} }}"),
            json!({ "id": arg(args, 2, "id")? }),
        ),
        "search" => (
            format!("query ($query: String) {{ search(query: $query) {{ {SUMMARY_FIELDS} }} }}"),
            json!({ "query": args.get(2).cloned().unwrap_or_default() }),
        ),
        "trending" => (
            format!(
                "query ($media_type: String, $time_window: String) {{ \
                 trending(media_type: $media_type, time_window: $time_window) {{ {SUMMARY_FIELDS} }} }}"
            ),
            json!({
                "media_type": arg(args, 2, "media_type")?,
                "time_window": arg(args, 3, "time_window")?,
            }),
        ),
        "top_rated" => (format!("{{ top_rated {{ {SUMMARY_FIELDS} }} }}"), json!({})),
        other => return Err(anyhow!("unknown query '{}'", other)),
    };
    Ok(request)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    if args[1] == "sdl" {
        println!("{}", sdl());
        return Ok(());
    }

    let (query, variables) = build_request(&args)?;
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::from_env()?);
    let schema = build_schema(tmdb);

    let response = schema
        .execute(Request::new(query).variables(Variables::from_json(variables)))
        .await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.is_err() {
        std::process::exit(2);
    }
    Ok(())
}
