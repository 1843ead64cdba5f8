use crate::app::{AppState, failure, success};
use crate::saving::{load_collection, save_collection};
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

const SUBJECTS_FILE: &str = "subjects.json";

/// Kind of teaching a subject requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubjectType {
    Theory,
    Lab,
    Tutorial,
}

/// A taught subject with its weekly hour split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Catalog code, e.g. "CS301" (unique)
    pub subject_id: String,
    pub subject_name: String,
    pub subject_type: SubjectType,
    pub credits: u8,
    pub theory_hours: u8,
    pub lab_hours: u8,
    pub tutorial_hours: u8,
    /// Lab blocks must be scheduled back to back when set
    pub requires_continuity: bool,
    pub department: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SubjectCreate {
    pub subject_id: String,
    pub subject_name: String,
    pub subject_type: SubjectType,
    pub credits: u8,
    #[serde(default)]
    pub theory_hours: u8,
    #[serde(default)]
    pub lab_hours: u8,
    #[serde(default)]
    pub tutorial_hours: u8,
    pub requires_continuity: bool,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Deserialize)]
pub struct SubjectUpdate {
    pub subject_name: Option<String>,
    pub subject_type: Option<SubjectType>,
    pub credits: Option<u8>,
    pub theory_hours: Option<u8>,
    pub lab_hours: Option<u8>,
    pub tutorial_hours: Option<u8>,
    pub requires_continuity: Option<bool>,
}

impl Subject {
    fn apply(&mut self, update: SubjectUpdate) {
        if let Some(v) = update.subject_name {
            self.subject_name = v;
        }
        if let Some(v) = update.subject_type {
            self.subject_type = v;
        }
        if let Some(v) = update.credits {
            self.credits = v;
        }
        if let Some(v) = update.theory_hours {
            self.theory_hours = v;
        }
        if let Some(v) = update.lab_hours {
            self.lab_hours = v;
        }
        if let Some(v) = update.tutorial_hours {
            self.tutorial_hours = v;
        }
        if let Some(v) = update.requires_continuity {
            self.requires_continuity = v;
        }
    }
}

pub fn subjects_path(state: &AppState) -> PathBuf {
    state.auth.database_dir().join(SUBJECTS_FILE)
}

pub async fn list_subjects(State(state): State<Arc<AppState>>) -> Response {
    match load_collection::<Subject>(&subjects_path(&state)) {
        Ok(subjects) => success(
            serde_json::to_value(subjects).unwrap_or_default(),
            "Subjects retrieved successfully",
        ),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

pub async fn get_subject(
    State(state): State<Arc<AppState>>,
    AxumPath(subject_id): AxumPath<String>,
) -> Response {
    let subjects = match load_collection::<Subject>(&subjects_path(&state)) {
        Ok(subjects) => subjects,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    match subjects.into_iter().find(|s| s.subject_id == subject_id) {
        Some(subject) => success(
            serde_json::to_value(subject).unwrap_or_default(),
            "Subject retrieved successfully",
        ),
        None => failure(StatusCode::NOT_FOUND, "Subject not found"),
    }
}

pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubjectCreate>,
) -> Response {
    if req.subject_id.is_empty() || req.subject_name.is_empty() {
        return failure(
            StatusCode::BAD_REQUEST,
            "Subject id and name cannot be empty",
        );
    }

    let path = subjects_path(&state);
    let mut subjects = match load_collection::<Subject>(&path) {
        Ok(subjects) => subjects,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    if subjects.iter().any(|s| s.subject_id == req.subject_id) {
        return failure(StatusCode::BAD_REQUEST, "Subject id already exists");
    }

    let subject = Subject {
        subject_id: req.subject_id,
        subject_name: req.subject_name,
        subject_type: req.subject_type,
        credits: req.credits,
        theory_hours: req.theory_hours,
        lab_hours: req.lab_hours,
        tutorial_hours: req.tutorial_hours,
        requires_continuity: req.requires_continuity,
        department: req.department,
        created_at: Utc::now().to_rfc3339(),
    };

    subjects.push(subject.clone());
    if let Err(e) = save_collection(&path, &subjects) {
        state
            .toasts
            .show("Failed to create subject", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state.toasts.show(
        &format!("Subject {} created", subject.subject_id),
        ToastKind::Success,
        3000,
    );
    success(
        serde_json::to_value(subject).unwrap_or_default(),
        "Subject created successfully",
    )
}

pub async fn update_subject(
    State(state): State<Arc<AppState>>,
    AxumPath(subject_id): AxumPath<String>,
    Json(req): Json<SubjectUpdate>,
) -> Response {
    let path = subjects_path(&state);
    let mut subjects = match load_collection::<Subject>(&path) {
        Ok(subjects) => subjects,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    let Some(subject) = subjects.iter_mut().find(|s| s.subject_id == subject_id) else {
        return failure(StatusCode::NOT_FOUND, "Subject not found");
    };

    subject.apply(req);
    let updated = subject.clone();

    if let Err(e) = save_collection(&path, &subjects) {
        state
            .toasts
            .show("Failed to update subject", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state.toasts.show(
        &format!("Subject {} updated", updated.subject_id),
        ToastKind::Success,
        3000,
    );
    success(
        serde_json::to_value(updated).unwrap_or_default(),
        "Subject updated successfully",
    )
}

pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    AxumPath(subject_id): AxumPath<String>,
) -> Response {
    let path = subjects_path(&state);
    let mut subjects = match load_collection::<Subject>(&path) {
        Ok(subjects) => subjects,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    let before = subjects.len();
    subjects.retain(|s| s.subject_id != subject_id);
    if subjects.len() == before {
        return failure(StatusCode::NOT_FOUND, "Subject not found");
    }

    if let Err(e) = save_collection(&path, &subjects) {
        state
            .toasts
            .show("Failed to delete subject", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state
        .toasts
        .show("Subject deleted", ToastKind::Success, 3000);
    success(serde_json::Value::Null, "Subject deleted successfully")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_preserves_unset_fields() {
        let mut subject = Subject {
            subject_id: "CS301".to_string(),
            subject_name: "Operating Systems".to_string(),
            subject_type: SubjectType::Theory,
            credits: 4,
            theory_hours: 3,
            lab_hours: 0,
            tutorial_hours: 1,
            requires_continuity: false,
            department: "CSE".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        subject.apply(SubjectUpdate {
            subject_name: None,
            subject_type: Some(SubjectType::Lab),
            credits: None,
            theory_hours: None,
            lab_hours: Some(2),
            tutorial_hours: None,
            requires_continuity: Some(true),
        });

        assert_eq!(subject.subject_name, "Operating Systems");
        assert_eq!(subject.subject_type, SubjectType::Lab);
        assert_eq!(subject.credits, 4);
        assert_eq!(subject.lab_hours, 2);
        assert!(subject.requires_continuity);
    }
}
