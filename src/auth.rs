// Identity plumbing: turns an authenticated session into a stored user, and keeps
// users in sync with identity-provider webhooks.
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::model::{User, UserId, UserRole};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionClaims {
    pub username: Option<String>,
    pub email: Option<String>,
    pub email_address: Option<String>,
    pub image: Option<String>,
    pub picture: Option<String>,
}

// What the authentication layer hands us for each request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub claims: SessionClaims,
}

impl AuthContext {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            claims: SessionClaims::default(),
        }
    }

    pub fn with_claims(mut self, claims: SessionClaims) -> Self {
        self.claims = claims;
        self
    }
}

fn email_prefix(email: &str) -> Option<&str> {
    email.split('@').next().filter(|prefix| !prefix.is_empty())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Returns the stored user for `ctx`, creating it from the session claims on
/// first sight.
pub fn provision_user(
    store: &dyn DocumentStore,
    config: &ServiceConfig,
    ctx: &AuthContext,
) -> ServiceResult<User> {
    let user_id = ctx.user_id.trim();
    if user_id.is_empty() {
        return Err(ServiceError::Unauthenticated);
    }

    if let Some(user) = store.get_user(user_id) {
        return Ok(user);
    }

    let claims = &ctx.claims;
    let email = non_blank(&claims.email)
        .or_else(|| non_blank(&claims.email_address))
        .unwrap_or_default()
        .to_string();
    let username = non_blank(&claims.username)
        .or_else(|| email_prefix(&email))
        .map(str::to_string)
        .unwrap_or_else(|| user_id.chars().take(8).collect());
    let image = non_blank(&claims.image)
        .or_else(|| non_blank(&claims.picture))
        .unwrap_or(&config.default_avatar_url)
        .to_string();

    let user = User {
        id: user_id.to_string(),
        username,
        email,
        image,
        role: UserRole::User,
        recent_searched_cities: Vec::new(),
    };

    match store.insert_user(user.clone()) {
        Ok(()) => {
            info!(user_id = %user.id, username = %user.username, "provisioned user from session");
            Ok(user)
        }
        // Another request provisioned the same user first
        Err(StoreError::Conflict { .. }) => store
            .get_user(user_id)
            .ok_or_else(|| ServiceError::NotFound("User".to_string())),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WebhookEmail {
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct WebhookUser {
    id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email_addresses: Vec<WebhookEmail>,
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookDeletedUser {
    id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Created(UserId),
    Updated(UserId),
    Deleted(UserId),
    Ignored(String),
}

/// Applies a user lifecycle event. Signature verification happens before
/// the payload reaches this function.
pub fn apply_webhook(
    store: &dyn DocumentStore,
    config: &ServiceConfig,
    payload: &str,
) -> ServiceResult<WebhookOutcome> {
    let envelope: WebhookEnvelope =
        serde_json::from_str(payload).map_err(|e| ServiceError::MalformedPayload(e.to_string()))?;

    match envelope.event_type.as_str() {
        "user.created" | "user.updated" => {
            let data: WebhookUser = serde_json::from_value(envelope.data)
                .map_err(|e| ServiceError::MalformedPayload(e.to_string()))?;
            upsert_webhook_user(store, config, data)
        }
        "user.deleted" => {
            let data: WebhookDeletedUser = serde_json::from_value(envelope.data)
                .map_err(|e| ServiceError::MalformedPayload(e.to_string()))?;
            if store.delete_user(&data.id).is_none() {
                warn!(user_id = %data.id, "webhook deleted a user we never stored");
            }
            info!(user_id = %data.id, "user deleted");
            Ok(WebhookOutcome::Deleted(data.id))
        }
        other => Ok(WebhookOutcome::Ignored(other.to_string())),
    }
}

// Webhooks may be redelivered, so creation and update both upsert
fn upsert_webhook_user(
    store: &dyn DocumentStore,
    config: &ServiceConfig,
    data: WebhookUser,
) -> ServiceResult<WebhookOutcome> {
    let email = data
        .email_addresses
        .first()
        .map(|e| e.email_address.clone())
        .ok_or_else(|| ServiceError::MissingField("email_addresses".to_string()))?;
    let username = non_blank(&data.username)
        .or_else(|| email_prefix(&email))
        .map(str::to_string)
        .unwrap_or_else(|| data.id.chars().take(8).collect());
    let image = non_blank(&data.image_url)
        .unwrap_or(&config.default_avatar_url)
        .to_string();

    let mut apply = |user: &mut User| {
        user.username = username.clone();
        user.email = email.clone();
        user.image = image.clone();
    };

    match store.update_user(&data.id, &mut apply) {
        Ok(user) => {
            info!(user_id = %user.id, "user updated from webhook");
            return Ok(WebhookOutcome::Updated(user.id));
        }
        Err(StoreError::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    let inserted = store.insert_user(User {
        id: data.id.clone(),
        username: username.clone(),
        email: email.clone(),
        image: image.clone(),
        role: UserRole::User,
        recent_searched_cities: Vec::new(),
    });
    match inserted {
        Ok(()) => {
            info!(user_id = %data.id, "user created from webhook");
            Ok(WebhookOutcome::Created(data.id))
        }
        // A concurrent delivery or session created the user in between
        Err(StoreError::Conflict { .. }) => {
            let user = store.update_user(&data.id, &mut apply)?;
            info!(user_id = %user.id, "user updated from webhook after concurrent insert");
            Ok(WebhookOutcome::Updated(user.id))
        }
        Err(e) => Err(e.into()),
    }
}
