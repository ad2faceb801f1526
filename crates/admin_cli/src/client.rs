use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::{
    Client, Response, StatusCode, header,
    multipart::{Form, Part},
    redirect,
};
use serde::{Deserialize, de::DeserializeOwned};

use libs::{
    gallery::{
        DeleteImageRequest, GalleryImage, GalleryListing, GalleryUploadResponse,
        HeroUploadResponse,
    },
    news::{ArticlePatch, NewArticle, NewsArticle, NewsFeed},
};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Thin HTTP client for the admin endpoints. The session cookie lives in the
/// client's cookie store for as long as the process runs.
pub struct SiteClient {
    http: Client,
    base: String,
}

impl SiteClient {
    pub fn new(base: &str) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub async fn login(&self, password: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url("/admin/login"))
            .form(&[("password", password)])
            .send()
            .await
            .context("login request failed")?;

        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if resp.status() != StatusCode::SEE_OTHER || location != "/admin" {
            bail!("login rejected (status {}, location {location:?})", resp.status());
        }
        tracing::debug!("logged in to {}", self.base);
        Ok(())
    }

    pub async fn gallery(&self) -> Result<Vec<GalleryImage>> {
        let resp = self.http.get(self.url("/api/gallery")).send().await?;
        let listing: GalleryListing = decode(resp).await?;
        Ok(listing.images)
    }

    pub async fn upload(&self, files: &[impl AsRef<Path>]) -> Result<Vec<GalleryImage>> {
        let mut form = Form::new();
        for path in files {
            form = form.part("image", file_part(path.as_ref()).await?);
        }
        let resp = self
            .http
            .post(self.url("/api/gallery/upload"))
            .multipart(form)
            .send()
            .await?;
        let body: GalleryUploadResponse = decode(resp).await?;
        Ok(body.images)
    }

    pub async fn delete(&self, src: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url("/api/gallery/delete"))
            .json(&DeleteImageRequest {
                image_src: Some(src.to_owned()),
            })
            .send()
            .await?;
        check(resp).await
    }

    pub async fn upload_hero(&self, file: &Path) -> Result<String> {
        let form = Form::new().part("image", file_part(file).await?);
        let resp = self
            .http
            .post(self.url("/api/hero/upload"))
            .multipart(form)
            .send()
            .await?;
        let body: HeroUploadResponse = decode(resp).await?;
        Ok(body.url)
    }

    pub async fn news(&self) -> Result<Vec<NewsArticle>> {
        let resp = self.http.get(self.url("/api/admin/news")).send().await?;
        let feed: NewsFeed = decode(resp).await?;
        Ok(feed.articles)
    }

    pub async fn create_article(&self, article: &NewArticle) -> Result<NewsArticle> {
        let resp = self
            .http
            .post(self.url("/api/admin/news"))
            .json(article)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn update_article(&self, id: u64, patch: &ArticlePatch) -> Result<NewsArticle> {
        let resp = self
            .http
            .put(self.url(&format!("/api/admin/news/{id}")))
            .json(patch)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_article(&self, id: u64) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/admin/news/{id}")))
            .send()
            .await?;
        check(resp).await
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_owned();
    Ok(Part::bytes(bytes)
        .file_name(name)
        .mime_str("application/octet-stream")?)
}

async fn check(resp: Response) -> Result<()> {
    if resp.status().is_success() {
        return Ok(());
    }
    Err(failure(resp).await)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    if !resp.status().is_success() {
        return Err(failure(resp).await);
    }
    Ok(resp.json().await?)
}

async fn failure(resp: Response) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorBody>().await {
        Ok(body) => anyhow!("{status}: {}", body.error),
        Err(_) => anyhow!("{status}"),
    }
}
