use crate::app::{AppState, failure, success};
use crate::roles::{ProfileLookup, Role, RoleClaim, resolve_destination};
use crate::saving::{load_collection, save_collection};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// A registered account held by the identity provider
///
/// The role claim is provider metadata captured at signup; it is a hint,
/// not the authoritative role, which lives in the user's profile row.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    /// Opaque unique identifier
    pub user_id: String,

    /// Email address (unique, used to sign in)
    pub email: String,

    /// Display name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Department the user belongs to
    pub department: String,

    /// Argon2 hash of the user's password
    pub password_hash: String,

    /// Role hint chosen at signup, if it was a recognized value
    pub role_claim: Option<RoleClaim>,

    /// Account creation timestamp
    pub created_at: String,
}

/// Authoritative role record, at most one per user
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserProfile {
    pub user_id: String,
    pub role: Role,
    pub name: String,
    pub department: String,
}

/// An authenticated session
#[derive(Debug, Clone)]
pub struct Session {
    /// User the session belongs to
    pub user_id: String,

    /// Time when the session expires
    pub expires_at: SystemTime,
}

/// Signup form data
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    /// Raw role string from the signup form
    #[serde(default)]
    pub role: String,
}

/// Login form data
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

// Constants
const USERS_FILE: &str = "users.json";
const PROFILES_FILE: &str = "profiles.json";
const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds

/// Canonical provider error for a credential mismatch. Deliberately the
/// same for an unknown email and a wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Translate a provider error into the message shown to the user
///
/// The canonical credential error becomes a friendlier message; every
/// other error passes through verbatim.
pub fn friendly_auth_error(message: &str) -> String {
    if message == INVALID_CREDENTIALS {
        "Invalid email or password".to_string()
    } else {
        message.to_string()
    }
}

/// Identity provider and session registry
///
/// Accounts and profiles are persisted as JSON collections under the
/// database directory; sessions are in-memory only and vanish on restart.
/// The store is a plain owned value injected through `AppState`, so tests
/// construct independent instances against scratch directories.
pub struct AuthStore {
    dir: PathBuf,
    sessions: RwLock<HashMap<String, Session>>,
}

impl AuthStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        AuthStore {
            dir: dir.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create the database directory and empty collections if absent.
    ///
    /// Call once before serving; all other operations assume the
    /// directory exists.
    pub fn init_database(&self) -> std::io::Result<()> {
        if !self.dir.exists() {
            create_dir_all(&self.dir)?;
        }
        for file in [USERS_FILE, PROFILES_FILE] {
            let path = self.dir.join(file);
            if !path.exists() {
                std::fs::write(&path, "[]")?;
            }
        }
        Ok(())
    }

    /// Directory the JSON collections live in.
    pub fn database_dir(&self) -> &Path {
        &self.dir
    }

    fn users_path(&self) -> PathBuf {
        self.dir.join(USERS_FILE)
    }

    fn profiles_path(&self) -> PathBuf {
        self.dir.join(PROFILES_FILE)
    }

    /// Get all registered users.
    pub fn get_users(&self) -> Result<Vec<User>, String> {
        load_collection(&self.users_path())
    }

    /// Register a new account
    ///
    /// Validates the form, hashes the password, stores the user with its
    /// role claim, and provisions the authoritative profile row when the
    /// claim maps to one. An unrecognized role string still creates the
    /// account; such a user simply has no claim and no profile yet.
    ///
    /// # Arguments
    /// * `req` - Signup form data
    ///
    /// # Returns
    /// * `Result<User, String>` - The stored user or an error message
    pub fn register_user(&self, req: &SignupRequest) -> Result<User, String> {
        if req.email.is_empty() || req.password.is_empty() || req.name.is_empty() {
            return Err("Name, email and password cannot be empty".to_string());
        }
        if !EMAIL_REGEX.is_match(&req.email) {
            return Err("Invalid email address".to_string());
        }
        if req.password.len() < 6 {
            return Err("Password must be at least 6 characters".to_string());
        }

        let mut users = self.get_users()?;
        if users.iter().any(|user| user.email == req.email) {
            return Err("Email address is already registered".to_string());
        }

        let password_hash = hash_password(&req.password)?;
        let claim = RoleClaim::parse(&req.role);
        if claim.is_none() && !req.role.is_empty() {
            log::info!(
                "signup for {} carried unrecognized role {:?}",
                req.email,
                req.role
            );
        }

        let user = User {
            user_id: Uuid::new_v4().to_string(),
            email: req.email.clone(),
            name: req.name.clone(),
            phone: req.phone.clone(),
            department: req.department.clone(),
            password_hash,
            role_claim: claim,
            created_at: Utc::now().to_rfc3339(),
        };

        users.push(user.clone());
        save_collection(&self.users_path(), &users)?;

        if let Some(claim) = claim {
            self.upsert_profile(&UserProfile {
                user_id: user.user_id.clone(),
                role: claim.profile_role(),
                name: user.name.clone(),
                department: user.department.clone(),
            })?;
        }

        Ok(user)
    }

    /// Verify credentials and return the matching account
    ///
    /// Both an unknown email and a wrong password produce the canonical
    /// `INVALID_CREDENTIALS` error so the response leaks nothing about
    /// which one it was.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<User, String> {
        let users = self.get_users()?;

        let user = users
            .into_iter()
            .find(|user| user.email == email)
            .ok_or_else(|| INVALID_CREDENTIALS.to_string())?;

        if verify_password(password, &user.password_hash)? {
            Ok(user)
        } else {
            Err(INVALID_CREDENTIALS.to_string())
        }
    }

    /// Create a new session and return its bearer token.
    pub fn create_session(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            user_id: user_id.to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(SESSION_DURATION),
        };

        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(token.clone(), session);

        token
    }

    /// Resolve a token to its user id if the session is valid and fresh.
    pub fn validate_session(&self, token: &str) -> Option<String> {
        let sessions = self.sessions.read().unwrap();

        if let Some(session) = sessions.get(token) {
            if session.expires_at > SystemTime::now() {
                return Some(session.user_id.clone());
            }
        }

        None
    }

    /// Drop a session. Unknown tokens are ignored.
    pub fn destroy_session(&self, token: &str) {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(token);
    }

    /// Best-effort authoritative role lookup
    ///
    /// Never fails the caller: a store error comes back as
    /// `ProfileLookup::Failed` and is handled exactly like a missing row.
    pub fn profile_lookup(&self, user_id: &str) -> ProfileLookup {
        match load_collection::<UserProfile>(&self.profiles_path()) {
            Ok(profiles) => match profiles.iter().find(|p| p.user_id == user_id) {
                Some(profile) => ProfileLookup::Found(profile.role),
                None => ProfileLookup::Missing,
            },
            Err(e) => ProfileLookup::Failed(e),
        }
    }

    /// Fetch the full profile row for a user.
    pub fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, String> {
        let profiles: Vec<UserProfile> = load_collection(&self.profiles_path())?;
        Ok(profiles.into_iter().find(|p| p.user_id == user_id))
    }

    /// Insert or replace the single profile row for a user.
    pub fn upsert_profile(&self, profile: &UserProfile) -> Result<(), String> {
        let mut profiles: Vec<UserProfile> = load_collection(&self.profiles_path())?;
        profiles.retain(|p| p.user_id != profile.user_id);
        profiles.push(profile.clone());
        save_collection(&self.profiles_path(), &profiles)
    }
}

/// Hash a password using Argon2
///
/// # Arguments
/// * `password` - The plaintext password to hash
///
/// # Returns
/// * `Result<String, String>` - The password hash or an error
fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    match argon2.hash_password(password.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(_) => Err("Password hashing failed".to_string()),
    }
}

/// Verify a password against a stored Argon2 hash
///
/// # Arguments
/// * `password` - The plaintext password to verify
/// * `hash` - The stored password hash to check against
///
/// # Returns
/// * `Result<bool, String>` - True if the password matches, false if not, or an error
fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(hash) => hash,
        Err(_) => return Err("Invalid password hash format".to_string()),
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false), // Password didn't match
    }
}

// Web handler functions below

/// Handle account signup
///
/// Creates the account and, when the chosen role is recognized, the
/// authoritative profile row. The caller signs in afterwards.
pub async fn handle_signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Response {
    match state.auth.register_user(&req) {
        Ok(user) => success(
            serde_json::json!({ "user_id": user.user_id, "email": user.email }),
            "Account created successfully",
        ),
        Err(e) => failure(StatusCode::BAD_REQUEST, &e),
    }
}

/// Handle user login
///
/// Verifies credentials, creates a session, then resolves the landing
/// destination: authoritative profile role first, signup role claim as
/// fallback, student portal as the degraded default. The profile lookup
/// only runs after authentication has succeeded, and a lookup failure
/// never blocks the login.
#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Response {
    let user = match state.auth.sign_in(&req.email, &req.password) {
        Ok(user) => user,
        Err(e) if e == INVALID_CREDENTIALS => {
            return failure(StatusCode::UNAUTHORIZED, &friendly_auth_error(&e));
        }
        Err(e) => {
            return failure(StatusCode::INTERNAL_SERVER_ERROR, &friendly_auth_error(&e));
        }
    };

    let token = state.auth.create_session(&user.user_id);

    let lookup = state.auth.profile_lookup(&user.user_id);
    if let ProfileLookup::Failed(reason) = &lookup {
        log::warn!("profile lookup failed for {}: {}", user.email, reason);
    }

    let resolution = resolve_destination(lookup, user.role_claim);
    if resolution.degraded {
        log::warn!(
            "no authoritative role or claim for {}; routing to the student portal",
            user.email
        );
    }

    let cookie = Cookie::new("session", token.clone());
    let body = success(
        serde_json::json!({
            "token": token,
            "user_id": user.user_id,
            "destination": resolution.destination,
            "redirect": resolution.destination.path(),
            "degraded": resolution.degraded,
        }),
        "Login successful",
    );

    (jar.add(cookie), body).into_response()
}

/// Handle user logout
///
/// Invalidates the session on both transport conventions: the bearer
/// token if one was sent, and the session cookie, which is cleared.
pub async fn handle_logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: axum::extract::Request,
) -> Response {
    if let Some(token) = bearer_token(&request) {
        state.auth.destroy_session(&token);
    }
    if let Some(cookie) = jar.get("session") {
        state.auth.destroy_session(cookie.value());
    }

    let jar = jar.add(Cookie::new("session", ""));
    (jar, success(serde_json::Value::Null, "Logout successful")).into_response()
}

/// Return the authenticated caller's account and profile.
pub async fn handle_me(
    State(state): State<Arc<AppState>>,
    request: axum::extract::Request,
) -> Response {
    let Some(user_id) = request.extensions().get::<AuthedUser>() else {
        return failure(StatusCode::UNAUTHORIZED, "Not authenticated");
    };

    let users = match state.auth.get_users() {
        Ok(users) => users,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };
    let Some(user) = users.into_iter().find(|u| u.user_id == user_id.0) else {
        return failure(StatusCode::NOT_FOUND, "User not found");
    };

    let profile = state.auth.get_profile(&user.user_id).unwrap_or(None);

    success(
        serde_json::json!({
            "user_id": user.user_id,
            "email": user.email,
            "name": user.name,
            "phone": user.phone,
            "department": user.department,
            "role": profile.map(|p| p.role),
        }),
        "User profile retrieved successfully",
    )
}

/// Authenticated user id inserted into request extensions by the
/// middleware.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub String);

/// Authentication middleware
///
/// Accepts a bearer token (API convention) or the session cookie (page
/// convention). API calls without a valid session get the JSON failure
/// envelope; page requests are redirected to the auth card.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let token =
        bearer_token(&request).or_else(|| jar.get("session").map(|c| c.value().to_string()));

    if let Some(token) = token {
        if let Some(user_id) = state.auth.validate_session(&token) {
            request.extensions_mut().insert(AuthedUser(user_id));
            return next.run(request).await;
        }
    }

    if request.uri().path().starts_with("/api/") || request.uri().path().starts_with("/auth/") {
        return failure(StatusCode::UNAUTHORIZED, "Missing or invalid credentials");
    }

    Redirect::to("/auth").into_response()
}

fn bearer_token(request: &axum::extract::Request) -> Option<String> {
    let header = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Destination;

    fn signup(email: &str, role: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: "correct horse".to_string(),
            name: "Test User".to_string(),
            phone: "555-0100".to_string(),
            department: "CSE".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn register_then_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        store.init_database().unwrap();

        let user = store
            .register_user(&signup("a@example.com", "Student"))
            .unwrap();
        assert_eq!(user.role_claim, Some(RoleClaim::Student));

        let signed_in = store.sign_in("a@example.com", "correct horse").unwrap();
        assert_eq!(signed_in.user_id, user.user_id);

        let err = store.sign_in("a@example.com", "wrong").unwrap_err();
        assert_eq!(err, INVALID_CREDENTIALS);
        let err = store
            .sign_in("nobody@example.com", "correct horse")
            .unwrap_err();
        assert_eq!(err, INVALID_CREDENTIALS);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        store.init_database().unwrap();

        store
            .register_user(&signup("a@example.com", "Student"))
            .unwrap();
        let err = store
            .register_user(&signup("a@example.com", "Student"))
            .unwrap_err();
        assert!(err.contains("already registered"));
    }

    #[test]
    fn signup_provisions_profile_from_claim() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        store.init_database().unwrap();

        let user = store
            .register_user(&signup("hod@example.com", "Head of Dept"))
            .unwrap();

        match store.profile_lookup(&user.user_id) {
            ProfileLookup::Found(role) => assert_eq!(role, Role::Hod),
            other => panic!("expected a provisioned profile, got {:?}", other),
        }

        let resolution =
            resolve_destination(store.profile_lookup(&user.user_id), user.role_claim);
        assert_eq!(resolution.destination, Destination::Coordinator);
        assert!(!resolution.degraded);
    }

    #[test]
    fn unknown_role_string_leaves_no_claim_and_no_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        store.init_database().unwrap();

        let user = store
            .register_user(&signup("mystery@example.com", "Dean of Everything"))
            .unwrap();
        assert_eq!(user.role_claim, None);

        let lookup = store.profile_lookup(&user.user_id);
        assert!(matches!(lookup, ProfileLookup::Missing));

        let resolution = resolve_destination(lookup, user.role_claim);
        assert_eq!(resolution.destination, Destination::Student);
        assert!(resolution.degraded);
    }

    #[test]
    fn sessions_round_trip_and_destroy() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        store.init_database().unwrap();

        let token = store.create_session("user-1");
        assert_eq!(store.validate_session(&token), Some("user-1".to_string()));
        assert_eq!(store.validate_session("not-a-token"), None);

        store.destroy_session(&token);
        assert_eq!(store.validate_session(&token), None);
    }

    #[test]
    fn credential_error_is_translated() {
        assert_eq!(
            friendly_auth_error(INVALID_CREDENTIALS),
            "Invalid email or password"
        );
        assert_eq!(
            friendly_auth_error("Email address is already registered"),
            "Email address is already registered"
        );
    }

    #[test]
    fn signup_validation() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::new(dir.path());
        store.init_database().unwrap();

        let mut bad = signup("", "Student");
        assert!(store.register_user(&bad).is_err());

        bad = signup("not-an-email", "Student");
        assert!(store.register_user(&bad).is_err());

        bad = signup("short@example.com", "Student");
        bad.password = "tiny".to_string();
        assert!(store.register_user(&bad).is_err());
    }
}
