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
use uuid::Uuid;

const DIVISIONS_FILE: &str = "divisions.json";

/// A student division (one scheduled class group)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    pub division_id: String,
    pub division_name: String,
    pub year: String,
    pub department: String,
    pub student_count: u32,
    pub min_working_days: u8,
    pub max_working_days: u8,
    pub earliest_start_time: String,
    pub latest_end_time: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct DivisionCreate {
    pub division_name: String,
    pub year: String,
    pub department: String,
    pub student_count: u32,
    pub min_working_days: u8,
    pub max_working_days: u8,
    pub earliest_start_time: String,
    pub latest_end_time: String,
}

#[derive(Debug, Deserialize)]
pub struct DivisionUpdate {
    pub division_name: Option<String>,
    pub year: Option<String>,
    pub student_count: Option<u32>,
    pub min_working_days: Option<u8>,
    pub max_working_days: Option<u8>,
    pub earliest_start_time: Option<String>,
    pub latest_end_time: Option<String>,
}

impl Division {
    fn apply(&mut self, update: DivisionUpdate) {
        if let Some(v) = update.division_name {
            self.division_name = v;
        }
        if let Some(v) = update.year {
            self.year = v;
        }
        if let Some(v) = update.student_count {
            self.student_count = v;
        }
        if let Some(v) = update.min_working_days {
            self.min_working_days = v;
        }
        if let Some(v) = update.max_working_days {
            self.max_working_days = v;
        }
        if let Some(v) = update.earliest_start_time {
            self.earliest_start_time = v;
        }
        if let Some(v) = update.latest_end_time {
            self.latest_end_time = v;
        }
    }
}

fn divisions_path(state: &AppState) -> PathBuf {
    state.auth.database_dir().join(DIVISIONS_FILE)
}

pub async fn list_divisions(State(state): State<Arc<AppState>>) -> Response {
    match load_collection::<Division>(&divisions_path(&state)) {
        Ok(divisions) => success(
            serde_json::to_value(divisions).unwrap_or_default(),
            "Divisions retrieved successfully",
        ),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

pub async fn get_division(
    State(state): State<Arc<AppState>>,
    AxumPath(division_id): AxumPath<String>,
) -> Response {
    let divisions = match load_collection::<Division>(&divisions_path(&state)) {
        Ok(divisions) => divisions,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    match divisions.into_iter().find(|d| d.division_id == division_id) {
        Some(division) => success(
            serde_json::to_value(division).unwrap_or_default(),
            "Division retrieved successfully",
        ),
        None => failure(StatusCode::NOT_FOUND, "Division not found"),
    }
}

pub async fn create_division(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DivisionCreate>,
) -> Response {
    if req.division_name.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Division name cannot be empty");
    }
    if req.min_working_days > req.max_working_days {
        state
            .toasts
            .show("Failed to create division", ToastKind::Error, 5000);
        return failure(
            StatusCode::BAD_REQUEST,
            "Minimum working days cannot exceed maximum working days",
        );
    }

    let path = divisions_path(&state);
    let mut divisions = match load_collection::<Division>(&path) {
        Ok(divisions) => divisions,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    if divisions
        .iter()
        .any(|d| d.division_name == req.division_name && d.year == req.year)
    {
        return failure(StatusCode::BAD_REQUEST, "Division already exists");
    }

    let division = Division {
        division_id: Uuid::new_v4().to_string(),
        division_name: req.division_name,
        year: req.year,
        department: req.department,
        student_count: req.student_count,
        min_working_days: req.min_working_days,
        max_working_days: req.max_working_days,
        earliest_start_time: req.earliest_start_time,
        latest_end_time: req.latest_end_time,
        created_at: Utc::now().to_rfc3339(),
    };

    divisions.push(division.clone());
    if let Err(e) = save_collection(&path, &divisions) {
        state
            .toasts
            .show("Failed to create division", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state.toasts.show(
        &format!("Division {} created", division.division_name),
        ToastKind::Success,
        3000,
    );
    success(
        serde_json::to_value(division).unwrap_or_default(),
        "Division created successfully",
    )
}

pub async fn update_division(
    State(state): State<Arc<AppState>>,
    AxumPath(division_id): AxumPath<String>,
    Json(req): Json<DivisionUpdate>,
) -> Response {
    let path = divisions_path(&state);
    let mut divisions = match load_collection::<Division>(&path) {
        Ok(divisions) => divisions,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    let Some(division) = divisions.iter_mut().find(|d| d.division_id == division_id) else {
        return failure(StatusCode::NOT_FOUND, "Division not found");
    };

    division.apply(req);
    let updated = division.clone();

    if let Err(e) = save_collection(&path, &divisions) {
        state
            .toasts
            .show("Failed to update division", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state.toasts.show(
        &format!("Division {} updated", updated.division_name),
        ToastKind::Success,
        3000,
    );
    success(
        serde_json::to_value(updated).unwrap_or_default(),
        "Division updated successfully",
    )
}

pub async fn delete_division(
    State(state): State<Arc<AppState>>,
    AxumPath(division_id): AxumPath<String>,
) -> Response {
    let path = divisions_path(&state);
    let mut divisions = match load_collection::<Division>(&path) {
        Ok(divisions) => divisions,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e),
    };

    let before = divisions.len();
    divisions.retain(|d| d.division_id != division_id);
    if divisions.len() == before {
        return failure(StatusCode::NOT_FOUND, "Division not found");
    }

    if let Err(e) = save_collection(&path, &divisions) {
        state
            .toasts
            .show("Failed to delete division", ToastKind::Error, 5000);
        return failure(StatusCode::INTERNAL_SERVER_ERROR, &e);
    }

    state
        .toasts
        .show("Division deleted", ToastKind::Success, 3000);
    success(serde_json::Value::Null, "Division deleted successfully")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_only_touches_provided_fields() {
        let mut division = Division {
            division_id: "d1".to_string(),
            division_name: "SE-A".to_string(),
            year: "SE".to_string(),
            department: "CSE".to_string(),
            student_count: 60,
            min_working_days: 4,
            max_working_days: 5,
            earliest_start_time: "08:00".to_string(),
            latest_end_time: "17:00".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        division.apply(DivisionUpdate {
            division_name: None,
            year: None,
            student_count: Some(72),
            min_working_days: None,
            max_working_days: None,
            earliest_start_time: None,
            latest_end_time: Some("18:00".to_string()),
        });

        assert_eq!(division.division_name, "SE-A");
        assert_eq!(division.student_count, 72);
        assert_eq!(division.latest_end_time, "18:00");
        assert_eq!(division.earliest_start_time, "08:00");
    }
}
