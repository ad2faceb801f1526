mod support;

use axum::http::{StatusCode, header};

use support::{TestSite, body_text, get, location, login_request, session_cookie};

#[tokio::test]
async fn admin_pages_redirect_to_login_without_a_session() {
    let site = TestSite::new();

    for path in [
        "/admin",
        "/admin/",
        "/admin/gallery",
        "/admin/does-not-exist",
        "/admin/gallery.html",
        "/admin/logout",
        "/%61dmin/gallery.html",
        "//admin/gallery.html",
        "/admin%2Fgallery.html",
    ] {
        let resp = site.send(get(path, None)).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&resp), "/admin/login", "{path}");
    }
}

#[tokio::test]
async fn legacy_boolean_cookie_grants_nothing() {
    let site = TestSite::new();

    let resp = site.send(get("/admin/gallery", Some("adminAuth=true"))).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

    let forged = format!("adminSession={}", "ab".repeat(32));
    let resp = site.send(get("/admin/gallery", Some(&forged))).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn login_page_is_reachable_without_a_session() {
    let site = TestSite::new();

    let resp = site.send(get("/admin/login", None)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "<form>login</form>");
}

#[tokio::test]
async fn wrong_password_sets_no_session() {
    let site = TestSite::new();

    let resp = site.send(login_request("guess")).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login?error=1");
    assert!(session_cookie(&resp).is_none());
    assert_eq!(site.state.repo.count_active_sessions().await.unwrap(), 0);
}

#[tokio::test]
async fn session_cookie_serves_the_original_page() {
    let site = TestSite::new();
    let cookie = site.login().await;

    let resp = site.send(get("/admin/gallery", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "<h1>gallery admin</h1>");

    let resp = site.send(get("/admin", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "<h1>dashboard</h1>");

    let resp = site.send(get("/admin/missing", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // logged in users skip the login form
    let resp = site.send(get("/admin/login", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin");
}

#[tokio::test]
async fn login_cookie_is_http_only_and_strict() {
    let site = TestSite::new();

    let resp = site.send(login_request(support::PASSWORD)).await;
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_owned();

    assert!(set_cookie.starts_with("adminSession="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Path=/"));
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let site = TestSite::new();
    let cookie = site.login().await;

    let resp = site.send(get("/admin/logout", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login");

    // replaying the old cookie no longer works
    let resp = site.send(get("/admin/gallery", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(site.state.repo.count_active_sessions().await.unwrap(), 0);
}

#[tokio::test]
async fn public_pages_are_not_gated() {
    let site = TestSite::new();

    let resp = site.send(get("/", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "<h1>welcome</h1>");

    let resp = site.send(get("/api/news", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
