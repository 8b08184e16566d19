//! Integration tests for the server-rendered pages and the add/confirm flow

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use catalog_common::db::{composers, compositions, init_memory_database};
use catalog_common::CatalogService;
use catalog_web::fetcher::{FetchError, TitleFetcher};
use catalog_web::flash::FlashStore;
use catalog_web::{build_router, AppState};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::util::ServiceExt;

/// Returns a fixed title for every URL, or fails when `title` is `None`
struct StubFetcher {
    title: Option<&'static str>,
}

#[async_trait]
impl TitleFetcher for StubFetcher {
    async fn fetch_title(&self, _url: &str) -> Result<String, FetchError> {
        self.title
            .map(str::to_string)
            .ok_or(FetchError::Status(404))
    }
}

async fn create_test_app(title: Option<&'static str>) -> (axum::Router, SqlitePool) {
    let pool = init_memory_database()
        .await
        .expect("Failed to create in-memory database");
    let state = AppState::new(
        CatalogService::new(pool.clone()),
        Arc::new(StubFetcher { title }),
    );
    (build_router(state), pool)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn text_body(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `name=value` part of the response's Set-Cookie header
fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie missing")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

const CONFIRM_BACH: &str = "composer_name=Johann+Sebastian+Bach&composerLifetime=1685-1750\
    &composition=Cello+Suite+No.+1&compositionYear=1720\
    &url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dbach1";

#[tokio::test]
async fn test_static_pages_render() {
    let (app, _pool) = create_test_app(None).await;

    for (uri, marker) in [
        ("/", "composer-count"),
        ("/scales", "Pentatonic Minor"),
        ("/composer", "<h1>Composer</h1>"),
    ] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert!(text_body(response).await.contains(marker), "{}", uri);
    }

    // Only the catalog script is served; there is no notation editor asset
    let editor = app
        .clone()
        .oneshot(get("/static/composer.js", None))
        .await
        .unwrap();
    assert_eq!(editor.status(), StatusCode::NOT_FOUND);

    let js = app.oneshot(get("/static/index.js", None)).await.unwrap();
    assert_eq!(js.status(), StatusCode::OK);
    assert_eq!(
        js.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/javascript"
    );
}

#[tokio::test]
async fn test_confirm_adds_and_flashes_success() {
    let (app, pool) = create_test_app(None).await;

    let response = app
        .clone()
        .oneshot(post_form("/confirm", CONFIRM_BACH, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/index/add");
    let cookie = session_cookie(&response);

    let composer = composers::find_by_name(&pool, "Johann Sebastian Bach")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(composer.lifetime.as_deref(), Some("1685-1750"));
    assert_eq!(compositions::count(&pool).await.unwrap(), 1);

    let page = app
        .clone()
        .oneshot(get("/index/add", Some(&cookie)))
        .await
        .unwrap();
    assert!(page.headers().get(header::SET_COOKIE).is_none());
    let html = text_body(page).await;
    assert!(html.contains(r#"class="flash flash-success""#));
    assert!(html.contains("Composition added successfully!"));

    // Flashes are shown once
    let again = app.oneshot(get("/index/add", Some(&cookie))).await.unwrap();
    assert!(!text_body(again).await.contains("Composition added successfully!"));
}

#[tokio::test]
async fn test_confirm_duplicate_flashes_info() {
    let (app, pool) = create_test_app(None).await;

    let first = app
        .clone()
        .oneshot(post_form("/confirm", CONFIRM_BACH, None))
        .await
        .unwrap();
    let cookie = session_cookie(&first);
    let _ = app
        .clone()
        .oneshot(get("/index/add", Some(&cookie)))
        .await
        .unwrap();

    let second = app
        .clone()
        .oneshot(post_form("/confirm", CONFIRM_BACH, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::SEE_OTHER);

    let html = text_body(app.oneshot(get("/index/add", Some(&cookie))).await.unwrap()).await;
    assert!(html.contains(r#"class="flash flash-info""#));
    assert!(html.contains("This composition already exists."));
    assert_eq!(composers::count(&pool).await.unwrap(), 1);
    assert_eq!(compositions::count(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_confirm_missing_fields_flashes_error() {
    let (app, pool) = create_test_app(None).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/confirm",
            "composer_name=Bach&composition=&url=https%3A%2F%2Fexample.com",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response);

    let html = text_body(app.oneshot(get("/index/add", Some(&cookie))).await.unwrap()).await;
    assert!(html.contains(r#"class="flash flash-error""#));
    assert!(html.contains("Composer, composition, URL fields are required."));
    assert_eq!(composers::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_prefill_splits_fetched_title() {
    let (app, _pool) = create_test_app(Some("Frédéric Chopin - Nocturne Op. 9 No. 2")).await;

    let response = app
        .oneshot(post_form(
            "/index/add",
            "url=https%3A%2F%2Fyoutu.be%2Fchopin",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_some());

    let html = text_body(response).await;
    assert!(html.contains(r#"value="Frédéric Chopin""#));
    assert!(html.contains(r#"value="Nocturne Op. 9 No. 2""#));
    assert!(html.contains(r#"value="https://youtu.be/chopin""#));
    assert!(html.contains(r#"action="/confirm""#));
}

#[tokio::test]
async fn test_prefill_fetch_failure_flashes_error() {
    let (app, _pool) = create_test_app(None).await;

    let response = app
        .oneshot(post_form("/index/add", "url=https%3A%2F%2Fyoutu.be%2Fgone", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = text_body(response).await;
    assert!(html.contains("Error retrieving video info: HTTP error 404"));
    assert!(html.contains(r#"class="flash flash-error""#));
}

#[tokio::test]
async fn test_index_orders_by_surname_and_year() {
    let (app, pool) = create_test_app(None).await;
    let service = CatalogService::new(pool.clone());

    for (composer, title, year, url) in [
        ("Ludwig van Beethoven", "Symphony No. 9", "1824", "https://a/9"),
        ("Johann Sebastian Bach", "Mass in B minor", "1749", "https://a/mass"),
        ("Ludwig van Beethoven", "Symphony No. 5", "1808", "https://a/5"),
        ("Béla Bartók", "Concerto for Orchestra", "1943", "https://a/cfo"),
    ] {
        let submission = catalog_common::Submission::new(
            Some(composer.into()),
            None,
            Some(title.into()),
            Some(year.into()),
            Some(url.into()),
        )
        .unwrap();
        service.reconcile(&submission).await.unwrap();
    }

    let response = app.oneshot(get("/index", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;

    let bach = html.find("Johann Sebastian Bach").unwrap();
    let bartok = html.find("Béla Bartók").unwrap();
    let beethoven = html.find("Ludwig van Beethoven").unwrap();
    assert!(bach < bartok && bartok < beethoven);

    let fifth = html.find("Symphony No. 5").unwrap();
    let ninth = html.find("Symphony No. 9").unwrap();
    assert!(fifth < ninth);

    assert!(html.contains(r#"id="edit-modal""#));
    assert!(!html.contains("data-api-token"));
}

#[tokio::test]
async fn test_index_exposes_api_token_to_script() {
    let pool = init_memory_database().await.unwrap();
    let state = AppState::new(
        CatalogService::new(pool),
        Arc::new(StubFetcher { title: None }),
    )
    .with_api_token(Some("tok".to_string()));
    let app = build_router(state);

    let html = text_body(app.oneshot(get("/index", None)).await.unwrap()).await;
    assert!(html.contains(r#"<body data-api-token="tok">"#));
}

#[tokio::test]
async fn test_cookieless_confirms_keep_flash_store_bounded() {
    let pool = init_memory_database().await.unwrap();
    let flashes = FlashStore::with_limits(Duration::from_secs(600), 8);
    let state = AppState::new(
        CatalogService::new(pool),
        Arc::new(StubFetcher { title: None }),
    )
    .with_flash_store(flashes.clone());
    let app = build_router(state);

    // A client that never sends the cookie back gets a new session every time
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(post_form("/confirm", CONFIRM_BACH, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let page = app.clone().oneshot(get("/index/add", None)).await.unwrap();
        assert_eq!(page.status(), StatusCode::OK);
    }

    assert!(
        flashes.pending_sessions().await <= 8,
        "flash store grew to {} sessions",
        flashes.pending_sessions().await
    );
}

#[tokio::test]
async fn test_cookie_client_still_sees_flash_after_store_fills() {
    let pool = init_memory_database().await.unwrap();
    let flashes = FlashStore::with_limits(Duration::from_secs(600), 4);
    let state = AppState::new(
        CatalogService::new(pool),
        Arc::new(StubFetcher { title: None }),
    )
    .with_flash_store(flashes);
    let app = build_router(state);

    for _ in 0..10 {
        let _ = app
            .clone()
            .oneshot(post_form("/confirm", CONFIRM_BACH, None))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(post_form("/confirm", CONFIRM_BACH, None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let html = text_body(app.oneshot(get("/index/add", Some(&cookie))).await.unwrap()).await;
    assert!(html.contains("This composition already exists."));
}
