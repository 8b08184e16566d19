//! Home and composer information pages

use axum::{extract::State, http::HeaderMap, response::Html};
use catalog_common::db::{composers, compositions};

use super::layout::render_page;
use crate::error::PageError;
use crate::AppState;

/// GET /
///
/// Landing page with catalog totals
pub async fn home_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, PageError> {
    let pool = state.catalog.pool();
    let composer_count = composers::count(pool)
        .await
        .map_err(|e| PageError::new("Failed to count composers", e))?;
    let composition_count = compositions::count(pool)
        .await
        .map_err(|e| PageError::new("Failed to count compositions", e))?;

    // Home never sets the cookie; only pick up flashes for a known browser
    let flashes = match crate::flash::session_id(&headers) {
        Some(id) => state.flashes.take(id).await,
        None => Vec::new(),
    };

    let content = format!(
        r#"<h1>Composer Catalog</h1>
<p>A catalog of composers and their compositions.</p>
<p class="totals"><span id="composer-count">{composer_count}</span> composers,
<span id="composition-count">{composition_count}</span> compositions.</p>
<p><a href="/index">Browse the catalog</a> or <a href="/index/add">add a composition from a video link</a>.</p>"#
    );

    Ok(Html(render_page("Home", &flashes, "", &content)))
}

/// GET /composer
///
/// Static pointer page; no notation editor is served.
pub async fn composer_page() -> Html<String> {
    let content = r#"<h1>Composer</h1>
<p>Sketch ideas for your own pieces while browsing the catalog. Pick a scale on the
<a href="/scales">scales page</a>, then look up how the composers in the
<a href="/index">catalog</a> used it.</p>"#;

    Html(render_page("Composer", &[], "", content))
}
