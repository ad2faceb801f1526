#![allow(dead_code)]

use std::{io::Cursor, path::PathBuf, sync::Arc, time::Duration};

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use r2d2_sqlite::SqliteConnectionManager;
use tempfile::TempDir;
use tower::ServiceExt;

use backend::{
    app,
    common::{AdminAuth, AppState},
    db::Repository,
    gallery::{SitePaths, UploadPolicy},
    news::NewsBoard,
};
use libs::site_settings::SharedSettings;

pub const PASSWORD: &str = "let-me-in";
pub const BOUNDARY: &str = "X-SITE-TEST-BOUNDARY";

pub struct TestSite {
    pub dir: TempDir,
    pub state: AppState,
    pub router: Router,
}

impl TestSite {
    pub fn new() -> Self {
        Self::with_policy(UploadPolicy {
            max_width: 64,
            max_height: 36,
            ..UploadPolicy::default()
        })
    }

    pub fn with_policy(upload: UploadPolicy) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir_all(public.join("admin")).unwrap();
        std::fs::write(public.join("admin/index.html"), "<h1>dashboard</h1>").unwrap();
        std::fs::write(public.join("admin/login.html"), "<form>login</form>").unwrap();
        std::fs::write(public.join("admin/gallery.html"), "<h1>gallery admin</h1>").unwrap();
        std::fs::write(public.join("index.html"), "<h1>welcome</h1>").unwrap();

        let manager = SqliteConnectionManager::file(dir.path().join("site.db"));
        let pool = r2d2::Pool::builder().max_size(2).build(manager).unwrap();
        let repo = Repository::new(pool);
        repo.init_schema().unwrap();

        let settings = SharedSettings::load(dir.path().join("site.toml")).unwrap();

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(PASSWORD.as_bytes(), &salt)
            .unwrap()
            .to_string();

        let state = AppState {
            repo: Arc::new(repo),
            settings,
            news: Arc::new(NewsBoard::from_bundled().unwrap()),
            paths: Arc::new(SitePaths::new(public)),
            upload,
            auth: Arc::new(AdminAuth {
                password_hash,
                session_ttl: Duration::from_secs(3600),
            }),
        };
        let router = app::router(state.clone(), 5 * 1024 * 1024);

        Self { dir, state, router }
    }

    pub fn gallery_dir(&self) -> PathBuf {
        self.state.paths.gallery_dir.clone()
    }

    pub fn public_path(&self, src: &str) -> PathBuf {
        self.state.paths.public_dir.join(src.trim_start_matches('/'))
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// Log in through the form and return the `Cookie` header value for the new session.
    pub async fn login(&self) -> String {
        let resp = self.send(login_request(PASSWORD)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/admin");
        session_cookie(&resp).expect("login sets a session cookie")
    }
}

pub fn login_request(password: &str) -> Request<Body> {
    Request::post("/admin/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("password={password}")))
        .unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::get(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, cookie: Option<&str>, json: serde_json::Value) -> Request<Body> {
    let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(json.to_string())).unwrap()
}

/// `(field name, file name, content type, bytes)`
pub type Part<'a> = (&'a str, &'a str, &'a str, Vec<u8>);

pub fn post_multipart(uri: &str, cookie: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file_name, content_type, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut req = Request::post(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body)).unwrap()
}

pub fn png(w: u32, h: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    RgbImage::from_pixel(w, h, Rgb([200, 120, 40]))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `adminSession=<token>` from the response's `Set-Cookie`, if it sets a non-empty one.
pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|kv| kv.starts_with("adminSession=") && kv.len() > "adminSession=".len())
        .map(str::to_owned)
}

pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<_> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}
