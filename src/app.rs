use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::Settings;
use crate::login::{self, AuthStore};
use crate::mailer::Mailer;
use crate::toast::{ToastKind, ToastQueue};
use crate::{divisions, faculty, subjects};

/// Shared application state injected into every handler
pub struct AppState {
    pub settings: Settings,
    pub auth: AuthStore,
    pub toasts: ToastQueue,
    pub mailer: Option<Mailer>,
}

/// Success envelope: `{ "data": ..., "message": ... }`.
pub fn success(data: serde_json::Value, message: &str) -> Response {
    Json(serde_json::json!({ "data": data, "message": message })).into_response()
}

/// Failure envelope: `{ "detail": ... }` with the given status.
pub fn failure(status: StatusCode, detail: &str) -> Response {
    (status, Json(serde_json::json!({ "detail": detail }))).into_response()
}

#[derive(Deserialize)]
struct ShowToast {
    message: String,
    kind: ToastKind,
    #[serde(default)]
    duration_ms: u64,
}

async fn list_toasts(State(state): State<Arc<AppState>>) -> Response {
    success(
        serde_json::to_value(state.toasts.active()).unwrap_or_default(),
        "Active toasts retrieved",
    )
}

async fn show_toast(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ShowToast>,
) -> Response {
    let id = state.toasts.show(&req.message, req.kind, req.duration_ms);
    success(serde_json::json!({ "id": id }), "Toast queued")
}

// Dismissal races the expiry timer; losing the race is still a 200.
async fn dismiss_toast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Response {
    let removed = state.toasts.dismiss(id);
    success(serde_json::json!({ "removed": removed }), "Toast dismissed")
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    Json(serde_json::json!({
        "status": "healthy",
        "environment": state.settings.environment,
        "service": "Timetable Scheduler Portal",
    }))
    .into_response()
}

async fn serve_landing() -> Html<&'static str> {
    Html(include_str!("./static/landing.html"))
}

async fn serve_auth_page() -> Html<&'static str> {
    Html(include_str!("./static/auth.html"))
}

async fn serve_student_dashboard() -> Html<&'static str> {
    Html(include_str!("./static/dashboard_student.html"))
}

async fn serve_faculty_dashboard() -> Html<&'static str> {
    Html(include_str!("./static/dashboard_faculty.html"))
}

async fn serve_coordinator_dashboard() -> Html<&'static str> {
    Html(include_str!("./static/dashboard_coordinator.html"))
}

/// Build the full route table against a shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Everything behind the session check: the role dashboards and the
    // JSON API the dashboard forms call.
    let protected = Router::new()
        .route("/auth/me", get(login::handle_me))
        .route("/api/toasts", get(list_toasts).post(show_toast))
        .route("/api/toasts/:id", delete(dismiss_toast))
        .route(
            "/api/divisions",
            get(divisions::list_divisions).post(divisions::create_division),
        )
        .route(
            "/api/divisions/:id",
            get(divisions::get_division)
                .put(divisions::update_division)
                .delete(divisions::delete_division),
        )
        .route(
            "/api/faculty",
            get(faculty::list_faculty).post(faculty::create_faculty),
        )
        .route(
            "/api/faculty/:id",
            get(faculty::get_faculty)
                .put(faculty::update_faculty)
                .delete(faculty::delete_faculty),
        )
        .route("/api/faculty/:id/subjects", post(faculty::assign_subjects))
        .route(
            "/api/subjects",
            get(subjects::list_subjects).post(subjects::create_subject),
        )
        .route(
            "/api/subjects/:id",
            get(subjects::get_subject)
                .put(subjects::update_subject)
                .delete(subjects::delete_subject),
        )
        .route("/dashboard/student", get(serve_student_dashboard))
        .route("/dashboard/faculty", get(serve_faculty_dashboard))
        .route("/dashboard/coordinator", get(serve_coordinator_dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            login::require_auth,
        ));

    Router::new()
        .route("/", get(serve_landing))
        .route("/auth", get(serve_auth_page))
        .route("/auth/signup", post(login::handle_signup))
        .route("/auth/login", post(login::handle_login))
        .route("/auth/logout", post(login::handle_logout))
        .route("/health", get(health))
        .merge(protected)
        .nest_service("/static", ServeDir::new("static"))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Start the portal and serve until shutdown
///
/// Initializes the database directory, the mailer (when configured) and
/// the toast queue, then binds and serves. On shutdown the toast queue is
/// torn down so no expiry timer outlives the collection it would mutate.
pub async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let auth = AuthStore::new(&settings.database_dir);
    auth.init_database()?;

    let mailer = if settings.mail_configured() {
        match Mailer::new(&settings) {
            Ok(mailer) => Some(mailer),
            Err(e) => {
                log::warn!("mailer unavailable: {}", e);
                None
            }
        }
    } else {
        log::info!("SMTP not configured; credential mail disabled");
        None
    };

    let state = Arc::new(AppState {
        auth,
        toasts: ToastQueue::new(),
        mailer,
        settings: settings.clone(),
    });

    let app = build_router(state.clone());

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    log::info!(
        "portal listening on http://{} ({} mode)",
        settings.bind_addr,
        settings.environment
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    state.toasts.clear();
    Ok(())
}
