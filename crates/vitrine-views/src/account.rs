//! Account settings form backed by an in-memory store.

use std::collections::BTreeMap;

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use crate::error::ViewError;

pub const THEMES: &[&str] = &["light", "dark", "system"];

/// Template used for both the page and the form fragment.
pub const ACCOUNT_TEMPLATE: &str = "account.html";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSettings {
    pub display_name: String,
    pub email: String,
    pub theme: String,
    pub notifications: bool,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            display_name: "Guest".into(),
            email: "guest@example.com".into(),
            theme: "system".into(),
            notifications: true,
        }
    }
}

/// Field name → message for every field that failed validation.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Submitted settings form. Unchecked checkboxes are simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub display_name: String,
    pub email: String,
    pub theme: String,
    pub notifications: Option<String>,
}

impl SettingsForm {
    /// The settings as entered, valid or not.
    pub fn as_entered(&self) -> AccountSettings {
        AccountSettings {
            display_name: self.display_name.trim().to_string(),
            email: self.email.trim().to_string(),
            theme: self.theme.trim().to_string(),
            notifications: self.notifications.is_some(),
        }
    }

    pub fn validate(&self) -> Result<AccountSettings, FieldErrors> {
        let settings = self.as_entered();
        let mut errors = FieldErrors::new();

        if settings.display_name.is_empty() {
            errors.insert("display_name", "Display name is required".into());
        }
        if !settings.email.contains('@') {
            errors.insert("email", "Enter a valid email address".into());
        }
        if !THEMES.contains(&settings.theme.as_str()) {
            errors.insert("theme", format!("Theme must be one of {}", THEMES.join(", ")));
        }

        if errors.is_empty() { Ok(settings) } else { Err(errors) }
    }
}

/// In-memory settings. Nothing is persisted across restarts.
pub struct SettingsStore {
    current: RwLock<AccountSettings>,
}

impl SettingsStore {
    pub fn new(initial: AccountSettings) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub fn get(&self) -> AccountSettings {
        self.current.read().clone()
    }

    /// Validate and apply `form`, returning the stored settings.
    pub fn update(&self, form: &SettingsForm) -> Result<AccountSettings, FieldErrors> {
        let settings = form.validate()?;
        *self.current.write() = settings.clone();
        info!("Account settings updated for {}", settings.email);
        Ok(settings)
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(AccountSettings::default())
    }
}

#[derive(Debug, Serialize)]
pub struct AccountPage {
    pub settings: AccountSettings,
    pub themes: &'static [&'static str],
    pub saved: bool,
    pub errors: FieldErrors,
}

impl AccountPage {
    fn new(settings: AccountSettings) -> Self {
        Self {
            settings,
            themes: THEMES,
            saved: false,
            errors: FieldErrors::new(),
        }
    }
}

pub async fn show(State(state): State<AppState>) -> Result<AccountPage, ViewError> {
    Ok(AccountPage::new(state.settings.get()))
}

/// Apply a submitted form. Invalid input re-renders the form with errors and
/// status 422, keeping what the user typed.
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Response, ViewError> {
    let (page, status) = match state.settings.update(&form) {
        Ok(settings) => (
            AccountPage {
                saved: true,
                ..AccountPage::new(settings)
            },
            StatusCode::OK,
        ),
        Err(errors) => (
            AccountPage {
                errors,
                ..AccountPage::new(form.as_entered())
            },
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
    };

    let rendered = state.renderer.render(ACCOUNT_TEMPLATE, Some(&page))?;
    Ok(rendered.with_status(status).into_response())
}
