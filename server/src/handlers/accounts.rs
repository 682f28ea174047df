use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::Identity;
use crate::handlers::redirect_home;
use crate::models::{
    exceeds, Account, NewOrganization, NewVolunteer, Role, MAX_DISPLAY_NAME_LEN, MAX_USERNAME_LEN,
};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{page, success};
use crate::views::{LoginView, PortalView, RegisterView};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrganizationForm {
    pub user: String,
    pub pass: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

enum Profile {
    Volunteer,
    Organization { display_name: String },
}

impl Profile {
    fn role(&self) -> Role {
        match self {
            Profile::Volunteer => Role::Volunteer,
            Profile::Organization { .. } => Role::Organization,
        }
    }
}

struct Registration {
    username: String,
    password: String,
    profile: Profile,
}

impl Registration {
    /// Whitespace-only counts as missing.
    fn is_blank(&self) -> bool {
        self.username.is_empty()
            || self.password.trim().is_empty()
            || matches!(
                &self.profile,
                Profile::Organization { display_name } if display_name.trim().is_empty()
            )
    }

    fn is_too_long(&self) -> bool {
        exceeds(&self.username, MAX_USERNAME_LEN)
            || matches!(
                &self.profile,
                Profile::Organization { display_name }
                    if exceeds(display_name, MAX_DISPLAY_NAME_LEN)
            )
    }
}

pub async fn login_portal(Identity(account): Identity) -> Response {
    if account.is_some() {
        return redirect_home();
    }
    success(PortalView::login(), "Choose an account type")
}

pub async fn register_portal(Identity(account): Identity) -> Response {
    if account.is_some() {
        return redirect_home();
    }
    success(PortalView::register(), "Choose an account type")
}

pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    (state.sessions.end(jar), redirect_home()).into_response()
}

pub async fn login_volunteer_page(Identity(account): Identity) -> Response {
    login_page(account, Role::Volunteer)
}

pub async fn login_organization_page(Identity(account): Identity) -> Response {
    login_page(account, Role::Organization)
}

pub async fn login_volunteer(
    State(state): State<AppState>,
    Identity(account): Identity,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    login(&state, account, jar, Role::Volunteer, form).await
}

pub async fn login_organization(
    State(state): State<AppState>,
    Identity(account): Identity,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    login(&state, account, jar, Role::Organization, form).await
}

pub async fn register_volunteer_page(Identity(account): Identity) -> Response {
    register_page(account, Role::Volunteer)
}

pub async fn register_organization_page(Identity(account): Identity) -> Response {
    register_page(account, Role::Organization)
}

pub async fn register_volunteer(
    State(state): State<AppState>,
    Identity(account): Identity,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    let registration = Registration {
        username: form.user.trim().to_string(),
        password: form.pass,
        profile: Profile::Volunteer,
    };
    register(&state, account, jar, registration).await
}

pub async fn register_organization(
    State(state): State<AppState>,
    Identity(account): Identity,
    jar: SignedCookieJar,
    Form(form): Form<OrganizationForm>,
) -> AppResult<Response> {
    let registration = Registration {
        username: form.user.trim().to_string(),
        password: form.pass,
        profile: Profile::Organization {
            display_name: form.display_name.trim().to_string(),
        },
    };
    register(&state, account, jar, registration).await
}

fn login_page(account: Option<Account>, role: Role) -> Response {
    if account.is_some() {
        return redirect_home();
    }
    success(
        LoginView {
            role,
            failure: false,
        },
        format!("Log in as {role}"),
    )
}

fn register_page(account: Option<Account>, role: Role) -> Response {
    if account.is_some() {
        return redirect_home();
    }
    success(
        RegisterView {
            role,
            blank_failure: false,
            taken_failure: false,
            too_long_failure: false,
        },
        format!("Register as {role}"),
    )
}

/// Unknown usernames and wrong passwords both come back as `None`.
async fn authenticate(
    state: &AppState,
    role: Role,
    form: &CredentialsForm,
) -> AppResult<Option<Account>> {
    let username = form.user.trim();
    let account = match role {
        Role::Volunteer => state
            .store
            .find_volunteer_by_username(username)
            .await?
            .map(Account::Volunteer),
        Role::Organization => state
            .store
            .find_organization_by_username(username)
            .await?
            .map(Account::Organization),
    };

    let Some(account) = account else {
        return Ok(None);
    };

    if state
        .passwords
        .verify(&form.pass, account.password_hash())
        .await?
    {
        Ok(Some(account))
    } else {
        Ok(None)
    }
}

async fn login(
    state: &AppState,
    current: Option<Account>,
    jar: SignedCookieJar,
    role: Role,
    form: CredentialsForm,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(redirect_home());
    }

    match authenticate(state, role, &form).await? {
        Some(account) => {
            info!(username = %account.username(), %role, "Logged in");
            let jar = state.sessions.start(jar, &account);
            Ok((jar, redirect_home()).into_response())
        }
        None => {
            warn!(username = %form.user.trim(), %role, "Login failed");
            Ok(page(
                StatusCode::BAD_REQUEST,
                LoginView {
                    role,
                    failure: true,
                },
                Some("Invalid username or password".to_string()),
            ))
        }
    }
}

fn registration_failed(role: Role, blank: bool, taken: bool, too_long: bool) -> Response {
    page(
        StatusCode::BAD_REQUEST,
        RegisterView {
            role,
            blank_failure: blank,
            taken_failure: taken,
            too_long_failure: too_long,
        },
        Some("Registration failed".to_string()),
    )
}

async fn register(
    state: &AppState,
    current: Option<Account>,
    jar: SignedCookieJar,
    registration: Registration,
) -> AppResult<Response> {
    if current.is_some() {
        return Ok(redirect_home());
    }

    let role = registration.profile.role();
    let blank = registration.is_blank();
    let too_long = registration.is_too_long();
    let taken = !registration.username.is_empty()
        && state.store.username_taken(&registration.username).await?;
    if blank || taken || too_long {
        return Ok(registration_failed(role, blank, taken, too_long));
    }

    let password_hash = state.passwords.hash(&registration.password).await?;
    let created = match registration.profile {
        Profile::Volunteer => state
            .store
            .create_volunteer(NewVolunteer {
                username: registration.username,
                password_hash,
            })
            .await
            .map(Account::Volunteer),
        Profile::Organization { display_name } => state
            .store
            .create_organization(NewOrganization {
                username: registration.username,
                display_name,
                password_hash,
            })
            .await
            .map(Account::Organization),
    };

    match created {
        Ok(account) => {
            info!(username = %account.username(), role = %account.role(), "Registered account");
            let jar = state.sessions.start(jar, &account);
            Ok((jar, redirect_home()).into_response())
        }
        // lost a race with a concurrent registration
        Err(AppError::Conflict(_)) => Ok(registration_failed(role, false, true, false)),
        Err(e) => Err(e),
    }
}
