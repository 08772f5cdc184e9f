use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Outcome};
use crate::models::*;
use crate::services::{DefenseSchedule, SearchField};
use crate::state::AppState;

#[derive(Deserialize)]
struct LoginRequest {
    role: Role,
    user_id: String,
    password: String,
}

#[derive(Deserialize)]
struct ChangePasswordRequest {
    role: Role,
    user_id: String,
    new_password: String,
    confirm_password: String,
}

#[derive(Deserialize)]
struct NewCourseRequest {
    student_id: String,
    course_id: String,
}

#[derive(Deserialize)]
struct DecisionRequest {
    professor_id: String,
    action: String,
}

#[derive(Deserialize)]
struct NewDefenseRequest {
    student_id: String,
    #[serde(flatten)]
    details: DefenseDetails,
}

#[derive(Deserialize)]
struct ScheduleRequest {
    professor_id: String,
    #[serde(flatten)]
    schedule: DefenseSchedule,
}

#[derive(Deserialize)]
struct GradeRequest {
    examiner_id: String,
    score: u32,
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
    field: SearchField,
}

/// Successful mutation: the outcome pair plus the record it produced.
#[derive(Serialize)]
struct Accepted<T> {
    #[serde(flatten)]
    outcome: Outcome,
    data: T,
}

impl<T> Accepted<T> {
    fn new(message: &str, data: T) -> Json<Self> {
        Json(Self {
            outcome: Outcome::ok(message),
            data,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/password", post(change_password))
        .route("/courses/available", get(available_courses))
        .route("/course-requests", post(submit_course_request))
        .route("/course-requests/{id}/decision", post(decide_course_request))
        .route("/students/{id}/course-requests", get(student_course_requests))
        .route("/professors/{id}", get(professor_dashboard))
        .route("/professors/{id}/course-requests", get(pending_supervision_requests))
        .route("/professors/{id}/defense-requests", get(pending_defense_requests))
        .route("/professors/{id}/assigned-theses", get(assigned_theses))
        .route("/defense-requests", post(submit_defense_request))
        .route("/defense-requests/{id}/schedule", post(schedule_defense))
        .route("/theses/{id}/grades", post(submit_grade))
        .route("/theses/search", get(search_theses))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.service.health().await?;
    Ok(StatusCode::OK)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let user = state
        .service
        .login(req.role, &req.user_id, &req.password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    Ok(Json(Session::from(&user)))
}

async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Outcome>, AppError> {
    if req.new_password != req.confirm_password {
        return Err(AppError::PasswordMismatch);
    }
    let changed = state
        .service
        .change_password(req.role, &req.user_id, &req.new_password)
        .await?;
    if !changed {
        return Err(AppError::UserNotFound);
    }
    Ok(Json(Outcome::ok("Password changed successfully.")))
}

async fn available_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(state.service.available_courses().await?))
}

async fn submit_course_request(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Accepted<CourseRequest>>, AppError> {
    let request = state
        .service
        .submit_course_request(&req.student_id, &req.course_id)
        .await?;
    Ok(Accepted::new("Your request has been successfully submitted.", request))
}

async fn decide_course_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<Accepted<CourseRequest>>, AppError> {
    let request = state
        .service
        .decide_course_request(&req.professor_id, &id, &req.action)
        .await?;
    let message = match request.status {
        CourseRequestStatus::Approved => "Request has been successfully approved.",
        _ => "Request has been successfully rejected.",
    };
    Ok(Accepted::new(message, request))
}

async fn student_course_requests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CourseRequest>>, AppError> {
    Ok(Json(state.service.student_course_requests(&id).await?))
}

async fn professor_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let professor = state.service.professor(&id).await?;
    Ok(Json(Session::from(&User::Professor(professor))))
}

async fn pending_supervision_requests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CourseRequest>>, AppError> {
    Ok(Json(state.service.pending_supervision_requests(&id).await?))
}

async fn pending_defense_requests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DefenseRequest>>, AppError> {
    Ok(Json(state.service.pending_defense_requests(&id).await?))
}

async fn assigned_theses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Thesis>>, AppError> {
    Ok(Json(state.service.assigned_for_grading(&id).await?))
}

async fn submit_defense_request(
    State(state): State<AppState>,
    Json(req): Json<NewDefenseRequest>,
) -> Result<Json<Accepted<DefenseRequest>>, AppError> {
    let request = state
        .service
        .submit_defense_request(&req.student_id, req.details)
        .await?;
    Ok(Accepted::new(
        "Your defense request has been successfully submitted.",
        request,
    ))
}

async fn schedule_defense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<Accepted<Thesis>>, AppError> {
    let thesis = state
        .service
        .schedule_defense(&req.professor_id, &id, req.schedule)
        .await?;
    Ok(Accepted::new(
        "Defense session has been successfully scheduled.",
        thesis,
    ))
}

async fn submit_grade(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<GradeRequest>,
) -> Result<Json<Accepted<Thesis>>, AppError> {
    let thesis = state
        .service
        .submit_grade(&id, &req.examiner_id, req.score)
        .await?;
    Ok(Accepted::new("Grade submitted successfully.", thesis))
}

async fn search_theses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Thesis>>, AppError> {
    Ok(Json(state.service.search(&params.query, params.field).await?))
}
