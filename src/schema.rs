//! GraphQL query surface. Each root field forwards to one [`TmdbApi`] call.

use async_graphql::{Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Schema};
use std::sync::Arc;

use crate::error::CatalogError;
use crate::models::{MovieDetails, MovieSummary};
use crate::tmdb::{MediaType, TimeWindow, TmdbApi};

pub type CatalogSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// `top_rated` exposes no pagination; it always reads the first page.
pub const TOP_RATED_PAGE: u32 = 1;

pub struct QueryRoot;

// Root fields are nullable: an upstream failure nulls the field and adds an error entry.
#[Object(rename_fields = "snake_case", rename_args = "snake_case")]
impl QueryRoot {
    async fn movie(
        &self,
        ctx: &Context<'_>,
        id: Option<String>,
    ) -> async_graphql::Result<Option<MovieDetails>> {
        let tmdb = ctx.data::<Arc<dyn TmdbApi>>()?;
        let movie = tmdb
            .get_movie(&id.unwrap_or_default())
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(movie))
    }

    async fn search(
        &self,
        ctx: &Context<'_>,
        query: Option<String>,
    ) -> async_graphql::Result<Option<Vec<MovieSummary>>> {
        let tmdb = ctx.data::<Arc<dyn TmdbApi>>()?;
        let results = tmdb
            .search_movies(&query.unwrap_or_default())
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(results))
    }

    async fn trending(
        &self,
        ctx: &Context<'_>,
        media_type: Option<String>,
        time_window: Option<String>,
    ) -> async_graphql::Result<Option<Vec<MovieSummary>>> {
        let media_type: MediaType = media_type
            .unwrap_or_default()
            .parse()
            .map_err(|e: CatalogError| e.extend())?;
        let time_window: TimeWindow = time_window
            .unwrap_or_default()
            .parse()
            .map_err(|e: CatalogError| e.extend())?;
        let tmdb = ctx.data::<Arc<dyn TmdbApi>>()?;
        let results = tmdb
            .get_trending(media_type, time_window)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(results))
    }

    async fn top_rated(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<Vec<MovieSummary>>> {
        let tmdb = ctx.data::<Arc<dyn TmdbApi>>()?;
        let results = tmdb
            .get_top_rated(TOP_RATED_PAGE)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(results))
    }
}

pub fn build_schema(tmdb: Arc<dyn TmdbApi>) -> CatalogSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(tmdb)
        .finish()
}

/// SDL of the query surface; needs no upstream client.
pub fn sdl() -> String {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .finish()
        .sdl()
}
