//! Catalog pages: composer index, add form and the confirm workflow
//!
//! The add form is pre-filled by fetching the title of a submitted media URL
//! and splitting it into composer and composition. Confirming always
//! redirects back to the form with a flash describing the outcome.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use catalog_common::db::models::{Composer, ComposerEntry};
use catalog_common::{
    parse_title, Error, ParsedTitle, ReconcileOutcome, Submission, UniqueConstraint,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::layout::{escape_html, escape_opt, render_page};
use crate::error::PageError;
use crate::flash::{Flash, FlashCategory, FlashSession};
use crate::AppState;

const ADD_PATH: &str = "/index/add";

/// POST /index/add form body
#[derive(Debug, Default, Deserialize)]
pub struct AddForm {
    #[serde(default)]
    pub url: Option<String>,
}

/// POST /confirm form body. Field names match the add form inputs.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub composer_name: Option<String>,
    #[serde(default, rename = "composerLifetime")]
    pub composer_lifetime: Option<String>,
    #[serde(default)]
    pub composition: Option<String>,
    #[serde(default, rename = "compositionYear")]
    pub composition_year: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Attach the flash cookie when this browser did not have one yet
fn with_session(session: FlashSession, response: impl IntoResponse) -> Response {
    match session.set_cookie() {
        Some(cookie) => ([cookie], response).into_response(),
        None => response.into_response(),
    }
}

/// GET /index
///
/// Composers ordered by surname with their compositions by year
pub async fn index_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let session = FlashSession::from_headers(&headers);
    let entries = state
        .catalog
        .list_index()
        .await
        .map_err(|e| PageError::new("Failed to load catalog", e))?;
    let flashes = state.flashes.take(session.id).await;

    let body_attrs = match &state.api_token {
        Some(token) => format!(r#" data-api-token="{}""#, escape_html(token)),
        None => String::new(),
    };

    let html = render_page(
        "Catalog",
        &flashes,
        &body_attrs,
        &render_index(&entries),
    );
    Ok(with_session(session, Html(html)))
}

/// GET /index/add
pub async fn add_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let session = FlashSession::from_headers(&headers);
    render_add(&state, session, None, None).await
}

/// POST /index/add
///
/// Fetch the title behind `url` and suggest a composer/composition split.
/// A failed fetch is flashed and the form renders without suggestions.
pub async fn add_prefill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AddForm>,
) -> Result<Response, PageError> {
    let session = FlashSession::from_headers(&headers);

    let url = form.url.filter(|u| !u.trim().is_empty());
    let suggestion = match &url {
        Some(url) => {
            info!("Received URL: {}", url);
            match state.fetcher.fetch_title(url).await {
                Ok(title) => {
                    info!("Video title: {}", title);
                    let parsed = parse_title(&title);
                    info!(
                        "Parsed composer: {}, composition: {}",
                        parsed.composer, parsed.composition
                    );
                    Some(parsed)
                }
                Err(e) => {
                    warn!("Failed to fetch title for {}: {}", url, e);
                    state
                        .flashes
                        .push(
                            session.id,
                            Flash::new(
                                FlashCategory::Error,
                                format!("Error retrieving video info: {}", e),
                            ),
                        )
                        .await;
                    None
                }
            }
        }
        None => None,
    };

    render_add(&state, session, suggestion, url).await
}

async fn render_add(
    state: &AppState,
    session: FlashSession,
    suggestion: Option<ParsedTitle>,
    url: Option<String>,
) -> Result<Response, PageError> {
    let composers = state
        .catalog
        .composers_by_name()
        .await
        .map_err(|e| PageError::new("Failed to load composers", e))?;
    let flashes = state.flashes.take(session.id).await;

    let html = render_page(
        "Add Composition",
        &flashes,
        "",
        &render_add_form(suggestion.as_ref(), url.as_deref(), &composers),
    );
    Ok(with_session(session, Html(html)))
}

/// POST /confirm
///
/// Validate the submission and reconcile it with the store, then redirect
/// back to the add form with the outcome flashed.
pub async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ConfirmForm>,
) -> Response {
    let session = FlashSession::from_headers(&headers);

    let flash = match Submission::new(
        form.composer_name,
        form.composer_lifetime,
        form.composition,
        form.composition_year,
        form.url,
    ) {
        Err(e) => {
            warn!("Rejected submission: {}", e);
            Flash::new(FlashCategory::Error, e.to_string())
        }
        Ok(submission) => match state.catalog.reconcile(&submission).await {
            Ok(outcome @ ReconcileOutcome::Added { .. }) => {
                Flash::new(FlashCategory::Success, outcome.message())
            }
            Ok(outcome @ ReconcileOutcome::Duplicate { .. }) => {
                Flash::new(FlashCategory::Info, outcome.message())
            }
            Err(e) => {
                error!("Failed to save composition '{}': {}", submission.composition_title, e);
                Flash::new(FlashCategory::Error, store_failure_message(&e))
            }
        },
    };

    state.flashes.push(session.id, flash).await;
    with_session(session, Redirect::to(ADD_PATH))
}

fn store_failure_message(err: &Error) -> String {
    match err.unique_violation() {
        Some(UniqueConstraint::CompositionUrl) => {
            "Could not save composition: that URL is already in the catalog.".to_string()
        }
        // Another request created the same composer between lookup and insert
        Some(UniqueConstraint::ComposerName) => {
            "Could not save composition: that composer was just added by another request. \
             Please submit again."
                .to_string()
        }
        Some(UniqueConstraint::Other) | None => format!("Could not save composition: {}", err),
    }
}

fn render_index(entries: &[ComposerEntry]) -> String {
    let mut html = String::from("<h1>Catalog</h1>\n");

    if entries.is_empty() {
        html.push_str(r#"<p class="empty">No composers yet. <a href="/index/add">Add one</a>.</p>"#);
    }

    for entry in entries {
        let composer = &entry.composer;
        html.push_str(&format!(
            r#"<section class="composer" id="composer-{id}">
<h2>{name} <small class="lifetime">{lifetime}</small>
<button type="button" class="edit-icon" title="Edit composer" data-type="composer" data-id="{id}" data-name="{name}" data-lifetime="{lifetime}">&#9998;</button></h2>
<ul class="compositions">
"#,
            id = composer.id,
            name = escape_html(&composer.name),
            lifetime = escape_opt(composer.lifetime.as_deref()),
        ));

        for composition in &entry.compositions {
            html.push_str(&format!(
                r#"<li id="composition-{id}"><a href="{url}" target="_blank" rel="noopener">{title}</a> <span class="year">{year}</span>
<button type="button" class="edit-icon" title="Edit composition" data-type="composition" data-id="{id}" data-title="{title}" data-year="{year}" data-url="{url}">&#9998;</button></li>
"#,
                id = composition.id,
                url = escape_html(&composition.url),
                title = escape_html(&composition.title),
                year = escape_opt(composition.year.as_deref()),
            ));
        }

        html.push_str("</ul>\n</section>\n");
    }

    html.push_str(EDIT_MODAL);
    html.push_str(r#"<script src="/static/index.js"></script>"#);
    html
}

const EDIT_MODAL: &str = r#"
<div id="edit-modal" class="modal">
  <div class="modal-content">
    <span class="close">&times;</span>
    <form id="edit-composer-form" onsubmit="return false;">
      <h3>Edit composer</h3>
      <input type="hidden" id="edit-composer-id">
      <label>Name <input type="text" id="composer-name"></label>
      <label>Lifetime <input type="text" id="composer-lifetime"></label>
      <button type="button" id="save-composer">Save</button>
      <button type="button" id="delete-composer" class="danger">Delete composer</button>
    </form>
    <form id="edit-composition-form" onsubmit="return false;">
      <h3>Edit composition</h3>
      <input type="hidden" id="edit-composition-id">
      <label>Title <input type="text" id="composition-title"></label>
      <label>Year <input type="text" id="composition-year"></label>
      <label>URL <input type="url" id="composition-url"></label>
      <button type="button" id="save-composition">Save</button>
      <button type="button" id="delete-composition" class="danger">Delete composition</button>
    </form>
  </div>
</div>
"#;

fn render_add_form(
    suggestion: Option<&ParsedTitle>,
    url: Option<&str>,
    composers: &[Composer],
) -> String {
    let composer_value = escape_opt(suggestion.map(|s| s.composer.as_str()));
    let composition_value = escape_opt(suggestion.map(|s| s.composition.as_str()));
    let url_value = escape_opt(url);

    let options: String = composers
        .iter()
        .map(|c| format!(r#"<option value="{}"></option>"#, escape_html(&c.name)))
        .collect();

    format!(
        r#"<h1>Add Composition</h1>
<form method="post" action="/index/add" class="fetch-form">
  <label>Video URL <input type="url" name="url" value="{url_value}" placeholder="https://www.youtube.com/watch?v=..."></label>
  <button type="submit">Fetch details</button>
</form>
<form method="post" action="/confirm" class="confirm-form">
  <label>Composer <input type="text" name="composer_name" list="composer-names" value="{composer_value}" required></label>
  <datalist id="composer-names">{options}</datalist>
  <label>Composer lifetime <input type="text" name="composerLifetime" placeholder="1685-1750"></label>
  <label>Composition <input type="text" name="composition" value="{composition_value}" required></label>
  <label>Year <input type="text" name="compositionYear"></label>
  <label>URL <input type="url" name="url" value="{url_value}" required></label>
  <button type="submit">Confirm</button>
</form>"#
    )
}
