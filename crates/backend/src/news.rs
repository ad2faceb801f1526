use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use libs::news::{self, ArticlePatch, NewArticle, NewsArticle};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NewsError {
    #[error("title must not be empty")]
    BlankTitle,
    #[error("date must be formatted as YYYY-MM-DD")]
    BadDate,
}

/// In-memory news articles. Edits are lost on restart; the bundled articles come back.
pub struct NewsBoard {
    articles: RwLock<Vec<NewsArticle>>,
    /// Never handed out twice, even after the newest article is deleted.
    next_id: AtomicU64,
}

impl NewsBoard {
    pub fn new(seed: Vec<NewsArticle>) -> Self {
        let next_id = seed.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        Self {
            articles: RwLock::new(seed),
            next_id: AtomicU64::new(next_id),
        }
    }

    pub fn from_bundled() -> anyhow::Result<Self> {
        Ok(Self::new(news::bundled_articles()?))
    }

    /// Newest first.
    pub async fn all(&self) -> Vec<NewsArticle> {
        let mut articles = self.articles.read().await.clone();
        sort_newest_first(&mut articles);
        articles
    }

    pub async fn published(&self) -> Vec<NewsArticle> {
        let mut articles: Vec<_> = self
            .articles
            .read()
            .await
            .iter()
            .filter(|a| a.published)
            .cloned()
            .collect();
        sort_newest_first(&mut articles);
        articles
    }

    pub async fn create(&self, new: NewArticle) -> Result<NewsArticle, NewsError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(NewsError::BlankTitle);
        }
        let date = match new.date {
            Some(d) => validate_date(d)?,
            None => chrono::Utc::now().format("%Y-%m-%d").to_string(),
        };

        let mut guard = self.articles.write().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let article = NewsArticle {
            id,
            title: title.to_owned(),
            content: new.content,
            date,
            image: new.image.filter(|s| !s.trim().is_empty()),
            published: new.published,
        };
        guard.push(article.clone());
        Ok(article)
    }

    /// `Ok(None)` when no article has this id.
    pub async fn update(
        &self,
        id: u64,
        patch: ArticlePatch,
    ) -> Result<Option<NewsArticle>, NewsError> {
        if matches!(&patch.title, Some(t) if t.trim().is_empty()) {
            return Err(NewsError::BlankTitle);
        }
        let date = patch.date.map(validate_date).transpose()?;

        let mut guard = self.articles.write().await;
        let Some(article) = guard.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        if let Some(v) = patch.title {
            article.title = v.trim().to_owned();
        }
        if let Some(v) = patch.content {
            article.content = v;
        }
        if let Some(v) = date {
            article.date = v;
        }
        if let Some(v) = patch.image {
            // an empty string clears the image
            article.image = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = patch.published {
            article.published = v;
        }
        Ok(Some(article.clone()))
    }

    pub async fn delete(&self, id: u64) -> bool {
        let mut guard = self.articles.write().await;
        let before = guard.len();
        guard.retain(|a| a.id != id);
        guard.len() != before
    }
}

fn validate_date(date: String) -> Result<String, NewsError> {
    NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| NewsError::BadDate)
}

fn sort_newest_first(articles: &mut [NewsArticle]) {
    articles.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}
