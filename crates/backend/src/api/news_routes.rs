use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing,
};
use libs::news::{ArticlePatch, NewArticle, NewsArticle, NewsFeed};

use crate::{
    common::{AdminSession, ApiError, ApiResult, AppState},
    news::NewsError,
};

pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/api/news", routing::get(published_news))
        .route(
            "/api/admin/news",
            routing::get(all_news).post(create_article),
        )
        .route(
            "/api/admin/news/{id}",
            routing::put(update_article).delete(delete_article),
        )
}

impl From<NewsError> for ApiError {
    fn from(e: NewsError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

async fn published_news(State(state): State<AppState>) -> Json<NewsFeed> {
    Json(NewsFeed {
        articles: state.news.published().await,
    })
}

async fn all_news(_session: AdminSession, State(state): State<AppState>) -> Json<NewsFeed> {
    Json(NewsFeed {
        articles: state.news.all().await,
    })
}

async fn create_article(
    _session: AdminSession,
    State(state): State<AppState>,
    Json(new): Json<NewArticle>,
) -> ApiResult<(StatusCode, Json<NewsArticle>)> {
    let article = state.news.create(new).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

async fn update_article(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<ArticlePatch>,
) -> ApiResult<Json<NewsArticle>> {
    state
        .news
        .update(id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no article with id {id}")))
}

async fn delete_article(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    if state.news.delete(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("no article with id {id}")))
    }
}
