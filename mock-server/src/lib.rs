use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub mod auth;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub owner_email: String,
}

#[derive(Deserialize)]
pub struct UpdateOrganization {
    pub owner_email: Option<String>,
}

/// A known API user and the material each scheme checks against.
#[derive(Clone, Debug)]
pub struct User {
    pub username: String,
    pub secret: String,
    pub password: String,
    pub token: String,
}

impl User {
    /// One value for the HMAC secret, Basic password and token.
    pub fn new(username: &str, key: &str) -> Self {
        Self {
            username: username.to_string(),
            secret: key.to_string(),
            password: key.to_string(),
            token: key.to_string(),
        }
    }
}

pub struct AppState {
    pub users: HashMap<String, User>,
    pub orgs: RwLock<BTreeMap<String, Organization>>,
    pub nonces: Mutex<HashMap<String, DateTime<Utc>>>,
}

pub type SharedState = Arc<AppState>;

/// Error answer in the API's shape: `{"description": ...}`.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub description: String,
}

impl ApiFailure {
    pub fn new(status: StatusCode, description: &str) -> Self {
        Self {
            status,
            description: description.to_string(),
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not found")
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "description": self.description }))).into_response()
    }
}

/// Router with user `admin` (key `sekrit`) and organization `test`.
pub fn app() -> Router {
    app_with_users(vec![User::new("admin", "sekrit")])
}

pub fn app_with_users(users: Vec<User>) -> Router {
    let mut orgs = BTreeMap::new();
    orgs.insert(
        "test".to_string(),
        Organization {
            name: "test".to_string(),
            owner_email: "admin@example.com".to_string(),
        },
    );
    let state: SharedState = Arc::new(AppState {
        users: users.into_iter().map(|u| (u.username.clone(), u)).collect(),
        orgs: RwLock::new(orgs),
        nonces: Mutex::new(HashMap::new()),
    });

    let protected = Router::new()
        .route("/organizations", get(list_orgs).post(create_org))
        .route(
            "/organizations/{name}",
            get(get_org).put(update_org).delete(delete_org),
        )
        .route("/token", post(issue_token))
        .route("/echo", post(echo))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/health/status", get(health))
        .merge(protected)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_orgs(State(state): State<SharedState>) -> Json<Vec<Organization>> {
    let orgs = state.orgs.read().await;
    Json(orgs.values().cloned().collect())
}

async fn create_org(
    State(state): State<SharedState>,
    Json(input): Json<Organization>,
) -> Result<Json<Organization>, ApiFailure> {
    let mut orgs = state.orgs.write().await;
    if orgs.contains_key(&input.name) {
        return Err(ApiFailure::new(StatusCode::CONFLICT, "organization already exists"));
    }
    orgs.insert(input.name.clone(), input.clone());
    Ok(Json(input))
}

async fn get_org(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Organization>, ApiFailure> {
    let orgs = state.orgs.read().await;
    orgs.get(&name).cloned().map(Json).ok_or_else(ApiFailure::not_found)
}

async fn update_org(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Json(input): Json<UpdateOrganization>,
) -> Result<Json<Organization>, ApiFailure> {
    let mut orgs = state.orgs.write().await;
    let org = orgs.get_mut(&name).ok_or_else(ApiFailure::not_found)?;
    if let Some(email) = input.owner_email {
        org.owner_email = email;
    }
    Ok(Json(org.clone()))
}

async fn delete_org(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiFailure> {
    let mut orgs = state.orgs.write().await;
    orgs.remove(&name)
        .map(|_| Json(json!({})))
        .ok_or_else(ApiFailure::not_found)
}

async fn issue_token(Json(claims): Json<Value>) -> Json<Value> {
    Json(json!({ "token": Uuid::new_v4().to_string(), "claims": claims }))
}

/// Reflects the raw body so clients can check what they sent.
async fn echo(headers: HeaderMap, body: String) -> Json<Value> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Json(json!({ "content_type": content_type, "body": body }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_serializes_to_json() {
        let org = Organization {
            name: "test".to_string(),
            owner_email: "admin@example.com".to_string(),
        };
        let json = serde_json::to_value(&org).unwrap();
        assert_eq!(json["name"], "test");
        assert_eq!(json["owner_email"], "admin@example.com");
    }

    #[test]
    fn organization_owner_email_defaults_to_empty() {
        let org: Organization = serde_json::from_str(r#"{"name":"solo"}"#).unwrap();
        assert_eq!(org.name, "solo");
        assert!(org.owner_email.is_empty());
    }

    #[test]
    fn failure_renders_description() {
        let failure = ApiFailure::not_found();
        assert_eq!(failure.status, StatusCode::NOT_FOUND);
        assert_eq!(failure.description, "not found");
    }

    #[test]
    fn user_shares_one_key() {
        let user = User::new("admin", "sekrit");
        assert_eq!(user.secret, "sekrit");
        assert_eq!(user.password, "sekrit");
        assert_eq!(user.token, "sekrit");
    }
}
