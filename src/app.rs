use crate::schema::{build_schema, CatalogSchema};
use crate::tmdb::{TmdbApi, TmdbClient};
use anyhow::{Context, Result};
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{FromRequest, Request, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::{env, net::SocketAddr, sync::Arc};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};

const MAX_BODY_BYTES: usize = 1024 * 1024; // 1 MiB cap
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4000";

pub async fn run_server() -> Result<()> {
    let tmdb = TmdbClient::from_env()?;
    info!("Using TMDB at {}", tmdb.base_url());
    let tmdb: Arc<dyn TmdbApi> = Arc::new(tmdb);

    let app = build_router(build_schema(tmdb));

    let addr: SocketAddr = env::var("BIND_ADDR")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("BIND_ADDR is not a valid socket address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Now browse to http://{}/", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(schema: CatalogSchema) -> Router {
    Router::new()
        .route("/", get(graphql_get).post(graphql_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(schema)
}

async fn graphql_handler(
    State(schema): State<CatalogSchema>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(request.into_inner()).await.into()
}

/// `GET /?query=...` executes like a POST; a bare `GET /` serves GraphiQL.
async fn graphql_get(State(schema): State<CatalogSchema>, req: Request) -> Response {
    if !has_query_param(req.uri().query()) {
        return Html(GraphiQLSource::build().endpoint("/").finish()).into_response();
    }
    let extracted: std::result::Result<GraphQLRequest, _> =
        GraphQLRequest::from_request(req, &schema).await;
    match extracted {
        Ok(request) => GraphQLResponse::from(schema.execute(request.into_inner()).await)
            .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

fn has_query_param(query: Option<&str>) -> bool {
    query
        .map(|q| {
            q.split('&')
                .any(|pair| pair == "query" || pair.starts_with("query="))
        })
        .unwrap_or(false)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_query_parameter() {
        assert!(has_query_param(Some("query=%7B__typename%7D")));
        assert!(has_query_param(Some("operationName=x&query=%7Bx%7D")));
        assert!(!has_query_param(Some("querystring=1")));
        assert!(!has_query_param(None));
    }
}
