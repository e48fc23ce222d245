use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::services::ServeDir;
use tracing::{debug, info};

use crate::catalogue::EntryFields;
use crate::db::{self, StoreError};
use crate::views::View;

use super::error::ApiError;
use super::forms::{LoginForm, NewEntryForm, RegisterForm, UpdateEntryForm};
use super::responses::{
    form_failure, login_page, render, storage_failure, AccountPage, HealthResponse, ListingPage, ModifyPage,
    ProfilePage,
};
use super::state::AppState;

const ADMIN_LISTING: &str = "/adminMovie";

pub fn router(state: AppState) -> anyhow::Result<Router> {
    // One request per interval; config caps per_second at 1000 so this stays >= 1ms.
    let replenish_ms = (1000 / state.rate_limit.per_second.max(1)).max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(state.rate_limit.burst_size)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("rate limit must be positive"))?,
    );

    let mut app = Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/adminMovie", get(admin_listing).post(create_entry))
        .route("/adminMovie/delete/{id}", post(delete_entry))
        .route("/adminMovie/modify/{id}", get(edit_entry).post(update_entry))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/profileUser", get(user_profile))
        .route("/profileAdmin", get(admin_profile));

    if let Some(dir) = &state.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    Ok(app
        .layer(GovernorLayer::new(governor_conf))
        // Propagate must sit inside Set to see the generated id.
        .layer(tower_http::request_id::PropagateRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
        ))
        .layer(tower_http::request_id::SetRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
            tower_http::request_id::MakeRequestUuid,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state))
}

/// Reads the leading integer of a path segment, so `10001x` means 10001.
/// Segments without leading digits match no entry.
fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let sign_len = usize::from(raw.starts_with(['-', '+']));
    let end = raw[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw.len(), |digits| sign_len + digits);
    raw[..end].parse().ok()
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    db::ping(&state.pool)
        .await
        .map_err(storage_failure("database unavailable"))?;
    Ok(Json(HealthResponse { status: "ok" }))
}

async fn home(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let entries = state
        .catalogue
        .list()
        .await
        .map_err(storage_failure("failed to load catalogue"))?;
    render(&state.views, View::Home, ListingPage { entries })
}

async fn admin_listing(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let entries = state
        .catalogue
        .list()
        .await
        .map_err(storage_failure("failed to load catalogue"))?;
    render(&state.views, View::AdminCatalogue, ListingPage { entries })
}

async fn create_entry(
    State(state): State<AppState>,
    form: Result<Form<NewEntryForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let Form(form) = form.map_err(form_failure("failed to add catalogue entry"))?;
    let fields = EntryFields::from(form);
    state
        .catalogue
        .create(&fields)
        .await
        .map_err(storage_failure("failed to add catalogue entry"))?;
    Ok(Redirect::to(ADMIN_LISTING))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Redirect, ApiError> {
    info!(id = %raw_id, "deleting catalogue entry");
    let id = parse_id(&raw_id).ok_or(ApiError::EntryNotFound)?;
    match state.catalogue.delete(id).await {
        Ok(()) => Ok(Redirect::to(ADMIN_LISTING)),
        Err(StoreError::NotFound) => Err(ApiError::EntryNotFound),
        Err(err) => Err(storage_failure("failed to delete catalogue entry")(err)),
    }
}

async fn edit_entry(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::EntryNotFoundText)?;
    let entry = match state.catalogue.fetch(id).await {
        Ok(entry) => entry,
        Err(StoreError::NotFound) => return Err(ApiError::EntryNotFoundText),
        Err(err) => return Err(storage_failure("failed to load catalogue entry")(err)),
    };
    render(&state.views, View::Modify, ModifyPage { entry })
}

async fn update_entry(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    form: Result<Form<UpdateEntryForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    let Some(id) = parse_id(&raw_id) else {
        debug!(id = %raw_id, "update for non-numeric id ignored");
        return Ok(Redirect::to(ADMIN_LISTING));
    };
    let Form(form) = form.map_err(form_failure("failed to update catalogue entry"))?;
    state
        .catalogue
        .update(id, &EntryFields::from(form))
        .await
        .map_err(storage_failure("failed to update catalogue entry"))?;
    Ok(Redirect::to(ADMIN_LISTING))
}

async fn register_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state.views, View::Register, AccountPage::blank())
}

async fn register(
    State(state): State<AppState>,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<Html<String>, ApiError> {
    let Form(form) = form.map_err(form_failure("failed to register account"))?;
    state
        .accounts
        .register(form.into())
        .await
        .map_err(storage_failure("failed to register account"))?;
    render(&state.views, View::Login, AccountPage::blank())
}

async fn login_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state.views, View::Login, AccountPage::blank())
}

async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Html<String>, ApiError> {
    let Form(form) = form.map_err(form_failure("failed to validate credentials"))?;
    let outcome = state
        .accounts
        .authenticate(&form.email, &form.password)
        .await
        .map_err(storage_failure("failed to validate credentials"))?;
    let (view, page) = login_page(outcome);
    render(&state.views, view, page)
}

async fn user_profile(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state.views, View::UserProfile, ProfilePage::default())
}

async fn admin_profile(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state.views, View::AdminProfile, ProfilePage::default())
}
