use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::warn;

use crate::auth;
use crate::error::AppError;
use crate::models::{
    Course, CourseRequest, DefenseDetails, DefenseRequest, Professor, Role, Thesis, User,
};
use crate::registry::{Registry, load_table};
use crate::repository::{Collection, PersistenceGateway};
use crate::services::archive::{self, SearchField};
use crate::services::clock::{Clock, SystemClock};
use crate::services::requests::{self, DefenseSchedule};
use crate::services::theses;

/// Operation boundary of the workflow. Each write loads a snapshot, applies
/// one transition and saves what changed. Writers are serialized within the
/// process only; separate processes sharing storage can still lose updates.
pub struct ThesisService {
    gateway: Arc<dyn PersistenceGateway>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl ThesisService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self::with_clock(gateway, Arc::new(SystemClock))
    }

    pub fn with_clock(gateway: Arc<dyn PersistenceGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn gateway(&self) -> &dyn PersistenceGateway {
        self.gateway.as_ref()
    }

    async fn read(&self) -> Result<Registry, AppError> {
        Registry::load(self.gateway.as_ref()).await
    }

    async fn write<T>(
        &self,
        op: impl FnOnce(&mut Registry, DateTime<Utc>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut registry = self.read().await?;
        let value = op(&mut registry, self.clock.now()).inspect_err(|e| {
            warn!("operation rejected: {}", e);
        })?;
        registry.commit(self.gateway.as_ref()).await?;
        Ok(value)
    }

    pub async fn health(&self) -> Result<(), AppError> {
        self.gateway.ping().await
    }

    pub async fn login(
        &self,
        role: Role,
        user_id: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        auth::login(self.gateway.as_ref(), role, user_id, password).await
    }

    pub async fn change_password(
        &self,
        role: Role,
        user_id: &str,
        new_password: &str,
    ) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        auth::change_password(self.gateway.as_ref(), role, user_id, new_password).await
    }

    pub async fn professor(&self, professor_id: &str) -> Result<Professor, AppError> {
        load_table::<Professor>(self.gateway.as_ref(), Collection::Professors)
            .await?
            .get(professor_id)
            .cloned()
            .ok_or(AppError::ProfessorNotFound)
    }

    pub async fn available_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(requests::available_courses(&self.read().await?))
    }

    pub async fn student_course_requests(&self, student_id: &str) -> Result<Vec<CourseRequest>, AppError> {
        Ok(requests::student_course_requests(&self.read().await?, student_id))
    }

    pub async fn pending_supervision_requests(
        &self,
        professor_id: &str,
    ) -> Result<Vec<CourseRequest>, AppError> {
        Ok(requests::pending_supervision_requests(&self.read().await?, professor_id))
    }

    pub async fn pending_defense_requests(
        &self,
        professor_id: &str,
    ) -> Result<Vec<DefenseRequest>, AppError> {
        Ok(requests::pending_defense_requests(&self.read().await?, professor_id))
    }

    pub async fn assigned_for_grading(&self, professor_id: &str) -> Result<Vec<Thesis>, AppError> {
        Ok(theses::assigned_for_grading(&self.read().await?, professor_id))
    }

    pub async fn search(&self, query: &str, field: SearchField) -> Result<Vec<Thesis>, AppError> {
        let archive = load_table::<Thesis>(self.gateway.as_ref(), Collection::Theses).await?;
        Ok(archive::search(&archive, query, field))
    }

    pub async fn submit_course_request(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<CourseRequest, AppError> {
        self.write(|registry, now| {
            requests::submit_course_request(registry, student_id, course_id, now)
        })
        .await
    }

    pub async fn decide_course_request(
        &self,
        professor_id: &str,
        request_id: &str,
        action: &str,
    ) -> Result<CourseRequest, AppError> {
        self.write(|registry, now| {
            requests::decide_course_request(registry, professor_id, request_id, action, now)
        })
        .await
    }

    pub async fn submit_defense_request(
        &self,
        student_id: &str,
        details: DefenseDetails,
    ) -> Result<DefenseRequest, AppError> {
        self.write(|registry, now| {
            requests::submit_defense_request(registry, student_id, details, now)
        })
        .await
    }

    pub async fn schedule_defense(
        &self,
        professor_id: &str,
        request_id: &str,
        schedule: DefenseSchedule,
    ) -> Result<Thesis, AppError> {
        self.write(|registry, _| {
            requests::schedule_defense(registry, professor_id, request_id, schedule)
        })
        .await
    }

    pub async fn submit_grade(
        &self,
        thesis_id: &str,
        examiner_id: &str,
        score: u32,
    ) -> Result<Thesis, AppError> {
        self.write(|registry, _| theses::submit_grade(registry, thesis_id, examiner_id, score))
            .await
    }
}
