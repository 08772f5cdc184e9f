use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Course, CourseRequest, CourseRequestStatus, DefenseDetails, DefenseRequest, DefenseStatus,
    RequestRecord, Thesis, ThesisStatus,
};
use crate::registry::Registry;
use crate::repository::Collection;

/// Days a student must wait after course approval before requesting a defense.
pub const DEFENSE_WAITING_PERIOD_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl FromStr for Decision {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Decision::Approve),
            "reject" => Ok(Decision::Reject),
            _ => Err(AppError::InvalidAction),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefenseSchedule {
    pub defense_date: NaiveDate,
    pub internal_examiner_id: String,
    pub external_examiner_id: String,
}

pub fn available_courses(registry: &Registry) -> Vec<Course> {
    registry
        .courses
        .iter()
        .filter(|c| c.is_available())
        .cloned()
        .collect()
}

pub fn student_course_requests(registry: &Registry, student_id: &str) -> Vec<CourseRequest> {
    registry
        .requests
        .iter()
        .filter_map(RequestRecord::as_course)
        .filter(|r| r.student_id == student_id)
        .cloned()
        .collect()
}

pub fn pending_supervision_requests(registry: &Registry, professor_id: &str) -> Vec<CourseRequest> {
    registry
        .requests
        .iter()
        .filter_map(RequestRecord::as_course)
        .filter(|r| r.professor_id == professor_id && r.status == CourseRequestStatus::Pending)
        .cloned()
        .collect()
}

pub fn pending_defense_requests(registry: &Registry, professor_id: &str) -> Vec<DefenseRequest> {
    registry
        .requests
        .iter()
        .filter_map(RequestRecord::as_defense)
        .filter(|r| {
            r.professor_id == professor_id && r.status == DefenseStatus::PendingDefenseApproval
        })
        .cloned()
        .collect()
}

pub fn submit_course_request(
    registry: &mut Registry,
    student_id: &str,
    course_id: &str,
    now: DateTime<Utc>,
) -> Result<CourseRequest, AppError> {
    let has_active = registry
        .requests
        .iter()
        .filter_map(RequestRecord::as_course)
        .any(|r| r.student_id == student_id && r.is_active());
    if has_active {
        return Err(AppError::DuplicateActiveRequest);
    }

    let course = registry
        .courses
        .get(course_id)
        .filter(|c| c.is_available())
        .ok_or(AppError::CourseUnavailable)?;

    let request = CourseRequest {
        request_id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        course_id: course_id.to_string(),
        professor_id: course.professor_id.clone(),
        request_date: now,
        status: CourseRequestStatus::Pending,
        approval_date: None,
    };

    registry
        .requests
        .insert(RequestRecord::CourseRequest(request.clone()));
    registry.mark_dirty(Collection::Requests);
    info!(
        "student {} requested course {} ({})",
        student_id, course_id, request.request_id
    );
    Ok(request)
}

pub fn decide_course_request(
    registry: &mut Registry,
    professor_id: &str,
    request_id: &str,
    action: &str,
    now: DateTime<Utc>,
) -> Result<CourseRequest, AppError> {
    let request = registry
        .requests
        .get(request_id)
        .and_then(RequestRecord::as_course)
        .filter(|r| r.professor_id == professor_id)
        .ok_or(AppError::RequestNotFound)?;
    let decision: Decision = action.parse()?;
    if request.status != CourseRequestStatus::Pending {
        return Err(AppError::AlreadyDecided);
    }
    let course_id = request.course_id.clone();

    if decision == Decision::Approve {
        registry.debit_supervision(professor_id)?;
        if let Err(e) = registry.debit_course(&course_id) {
            registry.credit_supervision(professor_id);
            return Err(e);
        }
    }

    let request = registry
        .requests
        .get_mut(request_id)
        .and_then(RequestRecord::as_course_mut)
        .ok_or(AppError::RequestNotFound)?;
    match decision {
        Decision::Approve => {
            request.status = CourseRequestStatus::Approved;
            request.approval_date = Some(now);
        }
        Decision::Reject => request.status = CourseRequestStatus::Rejected,
    }
    let request = request.clone();
    registry.mark_dirty(Collection::Requests);

    info!(
        "professor {} {:?} course request {}",
        professor_id, request.status, request_id
    );
    Ok(request)
}

pub fn submit_defense_request(
    registry: &mut Registry,
    student_id: &str,
    details: DefenseDetails,
    now: DateTime<Utc>,
) -> Result<DefenseRequest, AppError> {
    let approved = registry
        .requests
        .iter()
        .filter_map(RequestRecord::as_course)
        .find(|r| r.student_id == student_id && r.status == CourseRequestStatus::Approved)
        .ok_or(AppError::NoApprovedCourse)?;
    let approval_date = approved.approval_date.ok_or(AppError::NoApprovedCourse)?;

    if now < approval_date + Duration::days(DEFENSE_WAITING_PERIOD_DAYS) {
        return Err(AppError::WaitingPeriodNotElapsed);
    }

    let already_filed = registry
        .requests
        .iter()
        .filter_map(RequestRecord::as_defense)
        .any(|d| d.course_request_id == approved.request_id);
    if already_filed {
        return Err(AppError::DuplicateActiveRequest);
    }

    let request = DefenseRequest {
        request_id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        course_request_id: approved.request_id.clone(),
        professor_id: approved.professor_id.clone(),
        submission_date: now,
        status: DefenseStatus::PendingDefenseApproval,
        details,
    };

    registry
        .requests
        .insert(RequestRecord::DefenseRequest(request.clone()));
    registry.mark_dirty(Collection::Requests);
    info!(
        "student {} submitted defense request {}",
        student_id, request.request_id
    );
    Ok(request)
}

pub fn schedule_defense(
    registry: &mut Registry,
    professor_id: &str,
    request_id: &str,
    schedule: DefenseSchedule,
) -> Result<Thesis, AppError> {
    let request = registry
        .requests
        .get(request_id)
        .and_then(RequestRecord::as_defense)
        .filter(|r| r.professor_id == professor_id)
        .ok_or(AppError::RequestNotFound)?;
    if request.status == DefenseStatus::Finalized {
        return Err(AppError::AlreadyDecided);
    }

    let thesis = Thesis {
        thesis_id: Uuid::new_v4().to_string(),
        student_id: request.student_id.clone(),
        supervisor_id: professor_id.to_string(),
        title: request.details.title.clone(),
        abstract_text: request.details.abstract_text.clone(),
        keywords: request.details.keywords.clone(),
        pdf_path: request.details.pdf_path.clone(),
        image_path: request.details.image_path.clone(),
        defense_date: schedule.defense_date,
        examiners: [
            schedule.internal_examiner_id.clone(),
            schedule.external_examiner_id.clone(),
        ],
        status: ThesisStatus::ApprovedForDefense,
        grade: None,
        scores: Default::default(),
    };

    // Internal and external may name the same professor; the debits then stack.
    registry.debit_examiner(&schedule.internal_examiner_id, "Internal")?;
    if let Err(e) = registry.debit_examiner(&schedule.external_examiner_id, "External") {
        registry.credit_examiner(&schedule.internal_examiner_id);
        return Err(e);
    }

    if let Some(request) = registry
        .requests
        .get_mut(request_id)
        .and_then(RequestRecord::as_defense_mut)
    {
        request.status = DefenseStatus::Finalized;
    }
    registry.theses.insert(thesis.clone());
    registry.mark_dirty(Collection::Requests);
    registry.mark_dirty(Collection::Theses);

    info!(
        "defense for request {} scheduled on {} as thesis {}",
        request_id, thesis.defense_date, thesis.thesis_id
    );
    Ok(thesis)
}
