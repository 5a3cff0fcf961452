use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    db::{
        errors::DbError,
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use tracing::{debug, instrument, trace};

/// Resolve the caller from the proxy-supplied identity header.
/// Returns:
/// - None: header absent, or the email is unknown and auto-create is off
/// - Some(Ok(user)): header present and resolved
/// - Some(Err(error)): header present but lookup or auto-create failed
#[instrument(skip(parts, config, db))]
async fn try_proxy_header_auth(parts: &Parts, config: &crate::config::Config, db: &PgPool) -> Option<Result<CurrentUser>> {
    let user_email = match parts.headers.get(&config.auth.user_header_name).and_then(|h| h.to_str().ok()) {
        Some(email) => email,
        None => return None,
    };

    let mut tx = match db.begin().await {
        Ok(tx) => tx,
        Err(e) => return Some(Err(DbError::from(e).into())),
    };
    let mut user_repo = Users::new(&mut tx);

    let user_result = match user_repo.get_by_email(user_email).await {
        Ok(Some(user)) => Some(CurrentUser::from(user)),
        Ok(None) => {
            if config.auth.auto_create_users {
                // The proxy vouched for this email. New accounts are always
                // owners; admins are provisioned explicitly.
                let create_request = UserCreateDBRequest {
                    email: user_email.to_string(),
                    display_name: None,
                    role: Role::Owner,
                };

                match user_repo.create(&create_request).await {
                    Ok(new_user) => Some(CurrentUser::from(new_user)),
                    Err(e) => return Some(Err(Error::Database(e))),
                }
            } else {
                None
            }
        }
        Err(e) => return Some(Err(Error::Database(e))),
    };

    match tx.commit().await {
        Ok(_) => {}
        Err(e) => return Some(Err(DbError::from(e).into())),
    }
    user_result.map(Ok)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_proxy_header_auth(parts, &state.config, &state.db).await {
            Some(Ok(user)) => {
                debug!(user_id = %user.id, role = ?user.role, "Authenticated via identity header");
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("Identity header authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No usable identity header in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

/// Admin-surface gate. Wraps the resolved [`CurrentUser`]; rejects
/// non-admins with 403.
#[derive(Debug)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(Error::Forbidden {
                message: "Administrator role required".to_string(),
            });
        }
        Ok(RequireAdmin(user))
    }
}

/// Owner-surface gate. Wraps the resolved [`CurrentUser`]; rejects
/// non-owners with 403.
#[derive(Debug)]
pub struct RequireOwner(pub CurrentUser);

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_owner() {
            return Err(Error::Forbidden {
                message: "Property owner role required".to_string(),
            });
        }
        Ok(RequireOwner(user))
    }
}
