use serde::{Deserialize, Serialize};

/// Articles shipped with the site; the news board starts from these on every boot.
pub const BUNDLED_NEWS: &str = include_str!("../assets/news.json");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsArticle {
    pub id: u64,
    pub title: String,
    pub content: String,
    /// ISO date (`YYYY-MM-DD`), compared lexically.
    pub date: String,
    pub image: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub date: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsFeed {
    pub articles: Vec<NewsArticle>,
}

pub fn bundled_articles() -> serde_json::Result<Vec<NewsArticle>> {
    serde_json::from_str(BUNDLED_NEWS)
}
