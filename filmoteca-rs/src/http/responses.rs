use axum::extract::rejection::FormRejection;
use axum::response::Html;
use minijinja::Value;
use serde::Serialize;
use tracing::{error, warn};

use crate::accounts::{LoginOutcome, Role};
use crate::catalogue::CatalogueEntry;
use crate::db::StoreError;
use crate::views::{View, Views};

use super::error::ApiError;

pub const UNKNOWN_ROLE_MESSAGE: &str = "unrecognized user role";
pub const BAD_CREDENTIALS_MESSAGE: &str = "incorrect email or password";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ListingPage {
    pub entries: Vec<CatalogueEntry>,
}

#[derive(Debug, Serialize)]
pub struct ModifyPage {
    pub entry: CatalogueEntry,
}

#[derive(Debug, Default, Serialize)]
pub struct AccountPage {
    pub is_register_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<&'static str>,
}

#[derive(Debug, Default, Serialize)]
pub struct ProfilePage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
}

impl AccountPage {
    pub fn blank() -> Self {
        Self {
            is_register_page: true,
            error_message: None,
        }
    }

    fn with_error(message: &'static str) -> Self {
        Self {
            is_register_page: true,
            error_message: Some(message),
        }
    }
}

/// Pick the page for a login attempt.
pub fn login_page(outcome: LoginOutcome) -> (View, Value) {
    match outcome {
        LoginOutcome::Profile {
            role,
            name,
            surname,
        } => {
            let view = match role {
                Role::User => View::UserProfile,
                Role::Admin => View::AdminProfile,
            };
            let page = ProfilePage {
                name: Some(name),
                surname: Some(surname),
            };
            (view, Value::from_serialize(&page))
        }
        LoginOutcome::UnknownRole { role_id } => {
            warn!(role_id, "login for account with unrecognized role");
            (
                View::Login,
                Value::from_serialize(AccountPage::with_error(UNKNOWN_ROLE_MESSAGE)),
            )
        }
        LoginOutcome::NoMatch => (
            View::Login,
            Value::from_serialize(AccountPage::with_error(BAD_CREDENTIALS_MESSAGE)),
        ),
    }
}

pub fn render<S: Serialize>(views: &Views, view: View, context: S) -> Result<Html<String>, ApiError> {
    views.render(view, context).map(Html).map_err(|err| {
        error!(?view, error = %err, "view rendering failed");
        ApiError::Internal("failed to render page")
    })
}

/// Log a storage failure and turn it into a 500 carrying `context`.
pub fn storage_failure(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |err| {
        error!(error = %err, "{context}");
        ApiError::Internal(context)
    }
}

/// Unreadable form bodies fail the same way the storage call would.
pub fn form_failure(context: &'static str) -> impl FnOnce(FormRejection) -> ApiError {
    move |rejection| {
        error!(error = %rejection.body_text(), "{context}");
        ApiError::Internal(context)
    }
}
