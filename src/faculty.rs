use crate::app::{AppState, failure, success};
use crate::login::{SignupRequest, UserProfile};
use crate::mailer::generate_password;
use crate::roles::Role;
use crate::saving::{load_collection, save_collection};
use crate::subjects::{Subject, subjects_path};
use crate::toast::ToastKind;
use axum::{
    Json,
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

const FACULTY_FILE: &str = "faculty.json";

/// Departmental role of a faculty member (distinct from the portal login
/// role; a HOD here is still FACULTY to the scheduler unless their portal
/// profile says otherwise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacultyRole {
    Faculty,
    LabIncharge,
    Coordinator,
    Hod,
}

/// A faculty member with scheduling preferences and load limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faculty {
    pub faculty_id: String,
    /// Short department code, e.g. "AKJ" (unique)
    pub faculty_code: String,
    pub faculty_name: String,
    pub email: String,
    pub role: FacultyRole,
    pub priority_level: u8,
    pub preferred_start_time: String,
    pub preferred_end_time: String,
    pub min_working_days: u8,
    pub max_working_days: u8,
    pub max_load_per_week: u8,
    pub department: String,
    pub is_active: bool,
    /// Subject ids this member teaches
    pub subjects: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct FacultyCreate {
    pub faculty_code: String,
    pub faculty_name: String,
    pub email: String,
    pub role: FacultyRole,
    pub priority_level: u8,
    pub preferred_start_time: String,
    pub preferred_end_time: String,
    pub min_working_days: u8,
    pub max_working_days: u8,
    pub max_load_per_week: u8,
    #[serde(default)]
    pub department: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct FacultyUpdate {
    pub faculty_code: Option<String>,
    pub faculty_name: Option<String>,
    pub role: Option<FacultyRole>,
    pub priority_level: Option<u8>,
    pub preferred_start_time: Option<String>,
    pub preferred_end_time: Option<String>,
    pub min_working_days: Option<u8>,
    pub max_working_days: Option<u8>,
    pub max_load_per_week: Option<u8>,
    pub is_active: Option<bool>,
}

/// Subject assignment request
#[derive(Debug, Deserialize)]
pub struct AssignSubjects {
    pub subject_ids: Vec<String>,
}

impl Faculty {
    fn apply(&mut self, update: FacultyUpdate) {
        if let Some(v) = update.faculty_code {
            self.faculty_code = v;
        }
        if let Some(v) = update.faculty_name {
            self.faculty_name = v;
        }
        if let Some(v) = update.role {
            self.role = v;
        }
        if let Some(v) = update.priority_level {
            self.priority_level = v;
        }
        if let Some(v) = update.preferred_start_time {
            self.preferred_start_time = v;
        }
        if let Some(v) = update.preferred_end_time {
            self.preferred_end_time = v;
        }
        if let Some(v) = update.min_working_days {
            self.min_working_days = v;
        }
        if let Some(v) = update.max_working_days {
            self.max_working_days = v;
        }
        if let Some(v) = update.max_load_per_week {
            self.max_load_per_week = v;
        }
        if let Some(v) = update.is_active {
            self.is_active = v;
        }
    }
}

fn faculty_path(state: &AppState) -> PathBuf {
    state.auth.database_dir().join(FACULTY_FILE)
}

pub async fn list_faculty(State(state): State<Arc<AppState>>) -> Response {
    match load_collection::<Faculty>(&faculty_path(&state)) {
        Ok(faculty) => success(
            serde_json::to_value(faculty).unwrap_or_default(),
            "Faculty retrieved successfully",
        ),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

pub async fn get_faculty(
    State(state): State<Arc<AppState>>,
    AxumPath(faculty_id): AxumPath<String>,
) -> Response {
    let faculty = match load_collection::<Faculty>(&faculty_path(&state)) {
        Ok(faculty) => faculty,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    match faculty.into_iter().find(|f| f.faculty_id == faculty_id) {
        Some(member) => success(
            serde_json::to_value(member).unwrap_or_default(),
            "Faculty retrieved successfully",
        ),
        None => failure(StatusCode::NOT_FOUND, "Faculty not found"),
    }
}

/// Create a faculty member
///
/// Besides the scheduler record this provisions a portal account with a
/// generated starter password and emails the credentials. Mail problems
/// degrade to a warning and an error toast; the record itself is kept.
pub async fn create_faculty(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FacultyCreate>,
) -> Response {
    if req.faculty_code.is_empty() || req.faculty_name.is_empty() {
        return failure(
            StatusCode::BAD_REQUEST,
            "Faculty code and name cannot be empty",
        );
    }

    let path = faculty_path(&state);
    let mut faculty = match load_collection::<Faculty>(&path) {
        Ok(faculty) => faculty,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    if faculty.iter().any(|f| f.faculty_code == req.faculty_code) {
        return failure(StatusCode::BAD_REQUEST, "Faculty code already exists");
    }

    let member = Faculty {
        faculty_id: Uuid::new_v4().to_string(),
        faculty_code: req.faculty_code,
        faculty_name: req.faculty_name,
        email: req.email,
        role: req.role,
        priority_level: req.priority_level,
        preferred_start_time: req.preferred_start_time,
        preferred_end_time: req.preferred_end_time,
        min_working_days: req.min_working_days,
        max_working_days: req.max_working_days,
        max_load_per_week: req.max_load_per_week,
        department: req.department,
        is_active: req.is_active,
        subjects: Vec::new(),
        created_at: Utc::now().to_rfc3339(),
    };

    faculty.push(member.clone());
    if let Err(e) = save_collection(&path, &faculty) {
        state
            .toasts
            .show("Failed to create faculty", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    provision_account(&state, &member);

    state.toasts.show(
        &format!("Faculty {} added", member.faculty_name),
        ToastKind::Success,
        3000,
    );
    success(
        serde_json::to_value(member).unwrap_or_default(),
        "Faculty created successfully",
    )
}

/// Create the portal login for a new faculty member and mail the
/// generated credentials. Every failure path here is non-fatal.
fn provision_account(state: &AppState, member: &Faculty) {
    let password = generate_password();
    let signup = SignupRequest {
        email: member.email.clone(),
        password: password.clone(),
        name: member.faculty_name.clone(),
        phone: String::new(),
        department: member.department.clone(),
        role: String::new(),
    };

    let user = match state.auth.register_user(&signup) {
        Ok(user) => user,
        Err(e) => {
            // Likely a re-registered email; the existing login keeps working.
            log::info!(
                "no portal account created for {}: {}",
                member.email,
                e
            );
            return;
        }
    };

    // The scheduler role is authoritative for the portal too.
    if let Err(e) = state.auth.upsert_profile(&UserProfile {
        user_id: user.user_id,
        role: Role::Faculty,
        name: member.faculty_name.clone(),
        department: member.department.clone(),
    }) {
        log::warn!("profile provisioning failed for {}: {}", member.email, e);
    }

    match &state.mailer {
        Some(mailer) => {
            if let Err(e) = mailer.send_faculty_credentials(
                &member.email,
                &member.faculty_name,
                &member.faculty_code,
                &password,
            ) {
                log::warn!("credential mail to {} failed: {}", member.email, e);
                state.toasts.show(
                    &format!("Could not email credentials to {}", member.email),
                    ToastKind::Error,
                    5000,
                );
            }
        }
        None => log::warn!(
            "mail disabled; credentials for {} were not delivered",
            member.email
        ),
    }
}

pub async fn update_faculty(
    State(state): State<Arc<AppState>>,
    AxumPath(faculty_id): AxumPath<String>,
    Json(req): Json<FacultyUpdate>,
) -> Response {
    let path = faculty_path(&state);
    let mut faculty = match load_collection::<Faculty>(&path) {
        Ok(faculty) => faculty,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    let Some(member) = faculty.iter_mut().find(|f| f.faculty_id == faculty_id) else {
        return failure(StatusCode::NOT_FOUND, "Faculty not found");
    };

    member.apply(req);
    let updated = member.clone();

    if let Err(e) = save_collection(&path, &faculty) {
        state
            .toasts
            .show("Failed to update faculty", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state.toasts.show(
        &format!("Faculty {} updated", updated.faculty_name),
        ToastKind::Success,
        3000,
    );
    success(
        serde_json::to_value(updated).unwrap_or_default(),
        "Faculty updated successfully",
    )
}

pub async fn delete_faculty(
    State(state): State<Arc<AppState>>,
    AxumPath(faculty_id): AxumPath<String>,
) -> Response {
    let path = faculty_path(&state);
    let mut faculty = match load_collection::<Faculty>(&path) {
        Ok(faculty) => faculty,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    let before = faculty.len();
    faculty.retain(|f| f.faculty_id != faculty_id);
    if faculty.len() == before {
        return failure(StatusCode::NOT_FOUND, "Faculty not found");
    }

    if let Err(e) = save_collection(&path, &faculty) {
        state
            .toasts
            .show("Failed to delete faculty", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state
        .toasts
        .show("Faculty removed", ToastKind::Success, 3000);
    success(serde_json::Value::Null, "Faculty deleted successfully")
}

/// Assign the set of subjects a faculty member teaches
///
/// Replaces the previous assignment. Every referenced subject id must
/// exist in the subject catalog.
pub async fn assign_subjects(
    State(state): State<Arc<AppState>>,
    AxumPath(faculty_id): AxumPath<String>,
    Json(req): Json<AssignSubjects>,
) -> Response {
    let catalog = match load_collection::<Subject>(&subjects_path(&state)) {
        Ok(catalog) => catalog,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    for subject_id in &req.subject_ids {
        if !catalog.iter().any(|s| &s.subject_id == subject_id) {
            return failure(
                StatusCode::BAD_REQUEST,
                &format!("Unknown subject id: {}", subject_id),
            );
        }
    }

    let path = faculty_path(&state);
    let mut faculty = match load_collection::<Faculty>(&path) {
        Ok(faculty) => faculty,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    let Some(member) = faculty.iter_mut().find(|f| f.faculty_id == faculty_id) else {
        return failure(StatusCode::NOT_FOUND, "Faculty not found");
    };

    member.subjects = req.subject_ids;
    let updated = member.clone();

    if let Err(e) = save_collection(&path, &faculty) {
        state
            .toasts
            .show("Failed to assign subjects", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state.toasts.show(
        &format!(
            "{} subject(s) assigned to {}",
            updated.subjects.len(),
            updated.faculty_name
        ),
        ToastKind::Success,
        3000,
    );
    success(
        serde_json::to_value(updated).unwrap_or_default(),
        "Subjects assigned successfully",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Faculty {
        Faculty {
            faculty_id: "f1".to_string(),
            faculty_code: "AKJ".to_string(),
            faculty_name: "A. K. Joshi".to_string(),
            email: "akj@example.edu".to_string(),
            role: FacultyRole::Faculty,
            priority_level: 2,
            preferred_start_time: "09:00".to_string(),
            preferred_end_time: "16:00".to_string(),
            min_working_days: 4,
            max_working_days: 5,
            max_load_per_week: 16,
            department: "CSE".to_string(),
            is_active: true,
            subjects: vec!["CS301".to_string()],
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn partial_update_keeps_subject_assignment() {
        let mut member = sample();
        member.apply(FacultyUpdate {
            faculty_code: None,
            faculty_name: None,
            role: Some(FacultyRole::Hod),
            priority_level: Some(1),
            preferred_start_time: None,
            preferred_end_time: None,
            min_working_days: None,
            max_working_days: None,
            max_load_per_week: None,
            is_active: None,
        });

        assert_eq!(member.role, FacultyRole::Hod);
        assert_eq!(member.priority_level, 1);
        assert_eq!(member.subjects, vec!["CS301".to_string()]);
        assert!(member.is_active);
    }

    #[test]
    fn deactivation_is_not_deletion() {
        let mut member = sample();
        member.apply(FacultyUpdate {
            faculty_code: None,
            faculty_name: None,
            role: None,
            priority_level: None,
            preferred_start_time: None,
            preferred_end_time: None,
            min_working_days: None,
            max_working_days: None,
            max_load_per_week: None,
            is_active: Some(false),
        });

        assert!(!member.is_active);
        assert_eq!(member.faculty_code, "AKJ");
    }
}
