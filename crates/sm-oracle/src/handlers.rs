//! Handlers for the three endpoints the broker calls on every connection,
//! publish and subscribe: `/auth`, `/superuser`, `/acl`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use sm_credentials::CredentialStore;
use sm_types::topic::Access;
use tracing::{info, warn};

use crate::form::LenientForm;

#[derive(Debug, Default, Deserialize)]
pub struct AuthForm {
    #[serde(default)]
    pub clientid: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuperuserForm {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AclForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub acc: Option<i64>,
}

pub async fn auth(
    State(store): State<Arc<CredentialStore>>,
    LenientForm(form): LenientForm<AuthForm>,
) -> StatusCode {
    let (username, password) = match (form.username, form.password) {
        (Some(u), Some(p)) => (u, p),
        _ => {
            warn!(clientid = ?form.clientid, "auth: missing username or password, denying");
            return StatusCode::FORBIDDEN;
        }
    };

    if store.is_authenticated(&username, &password).await {
        info!(clientid = ?form.clientid, username, "auth: granted");
        StatusCode::OK
    } else {
        warn!(clientid = ?form.clientid, username, "auth: denied");
        StatusCode::FORBIDDEN
    }
}

pub async fn superuser(
    State(store): State<Arc<CredentialStore>>,
    LenientForm(form): LenientForm<SuperuserForm>,
) -> StatusCode {
    let Some(username) = form.username else {
        warn!("superuser: missing username, denying");
        return StatusCode::FORBIDDEN;
    };

    if store.is_superuser_preauth(&username) {
        info!(username, "superuser: granted");
        StatusCode::OK
    } else {
        warn!(username, "superuser: denied");
        StatusCode::FORBIDDEN
    }
}

pub async fn acl(
    State(store): State<Arc<CredentialStore>>,
    LenientForm(form): LenientForm<AclForm>,
) -> StatusCode {
    let (username, topic) = match (form.username, form.topic) {
        (Some(u), Some(t)) => (u, t),
        _ => {
            warn!("acl: missing username or topic, denying");
            return StatusCode::FORBIDDEN;
        }
    };
    let access = form.acc.and_then(Access::from_code);

    if store.is_authorized(&username, &topic, access).await {
        info!(username, topic, ?access, "acl: granted");
        StatusCode::OK
    } else {
        warn!(username, topic, ?access, "acl: denied");
        StatusCode::FORBIDDEN
    }
}
