use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::models::{Account, Organization, Role, Volunteer};
use crate::state::AppState;
use crate::utils::error::AppError;

/// Where callers without the right role are sent.
pub const UNAUTHORIZED_REDIRECT: &str = "/home";

/// The account behind the session cookie, if any.
pub struct Identity(pub Option<Account>);

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.sessions.key().clone());
        let Some(token) = state.sessions.read(&jar) else {
            return Ok(Self(None));
        };

        let account = match token.role {
            Role::Volunteer => state
                .store
                .find_volunteer(token.account_id)
                .await?
                .map(Account::Volunteer),
            Role::Organization => state
                .store
                .find_organization(token.account_id)
                .await?
                .map(Account::Organization),
        };

        if account.is_none() {
            tracing::warn!(
                account_id = %token.account_id,
                role = %token.role,
                "Session refers to a missing account"
            );
        }

        Ok(Self(account))
    }
}

/// Logged-in organization; anyone else is redirected home.
pub struct CurrentOrganization(pub Organization);

#[async_trait]
impl FromRequestParts<AppState> for CurrentOrganization {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Identity::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?
        {
            Identity(Some(Account::Organization(organization))) => Ok(Self(organization)),
            _ => Err(Redirect::to(UNAUTHORIZED_REDIRECT).into_response()),
        }
    }
}

/// Logged-in volunteer; anyone else is redirected home.
pub struct CurrentVolunteer(pub Volunteer);

#[async_trait]
impl FromRequestParts<AppState> for CurrentVolunteer {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Identity::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?
        {
            Identity(Some(Account::Volunteer(volunteer))) => Ok(Self(volunteer)),
            _ => Err(Redirect::to(UNAUTHORIZED_REDIRECT).into_response()),
        }
    }
}
