use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Keyed, timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseRequestStatus {
    #[serde(rename = "Pending Professor Approval")]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefenseStatus {
    #[serde(rename = "Pending Defense Approval")]
    PendingDefenseApproval,
    Finalized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRequest {
    pub request_id: String,
    pub student_id: String,
    pub course_id: String,
    pub professor_id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub request_date: DateTime<Utc>,
    pub status: CourseRequestStatus,
    #[serde(
        default,
        deserialize_with = "timestamp::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub approval_date: Option<DateTime<Utc>>,
}

impl CourseRequest {
    /// Anything but a rejection blocks further course requests from the student.
    pub fn is_active(&self) -> bool {
        self.status != CourseRequestStatus::Rejected
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseDetails {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
    pub pdf_path: String,
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseRequest {
    pub request_id: String,
    pub student_id: String,
    pub course_request_id: String,
    pub professor_id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub submission_date: DateTime<Utc>,
    pub status: DefenseStatus,
    pub details: DefenseDetails,
}

/// Both request kinds share the `requests` collection, told apart by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestRecord {
    CourseRequest(CourseRequest),
    DefenseRequest(DefenseRequest),
}

impl RequestRecord {
    pub fn as_course(&self) -> Option<&CourseRequest> {
        match self {
            RequestRecord::CourseRequest(r) => Some(r),
            RequestRecord::DefenseRequest(_) => None,
        }
    }

    pub fn as_course_mut(&mut self) -> Option<&mut CourseRequest> {
        match self {
            RequestRecord::CourseRequest(r) => Some(r),
            RequestRecord::DefenseRequest(_) => None,
        }
    }

    pub fn as_defense(&self) -> Option<&DefenseRequest> {
        match self {
            RequestRecord::DefenseRequest(r) => Some(r),
            RequestRecord::CourseRequest(_) => None,
        }
    }

    pub fn as_defense_mut(&mut self) -> Option<&mut DefenseRequest> {
        match self {
            RequestRecord::DefenseRequest(r) => Some(r),
            RequestRecord::CourseRequest(_) => None,
        }
    }
}

impl Keyed for RequestRecord {
    fn key(&self) -> &str {
        match self {
            RequestRecord::CourseRequest(r) => &r.request_id,
            RequestRecord::DefenseRequest(r) => &r.request_id,
        }
    }
}
