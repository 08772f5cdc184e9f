//! Capacity accounting. Every debit refuses to take a counter below zero and
//! every credit is paired with an earlier debit by the caller.

use tracing::{debug, warn};

use crate::error::AppError;
use crate::registry::Registry;
use crate::repository::Collection;

impl Registry {
    pub fn debit_supervision(&mut self, professor_id: &str) -> Result<(), AppError> {
        let professor = self
            .professors
            .get_mut(professor_id)
            .ok_or(AppError::ProfessorNotFound)?;
        professor.supervision_capacity = professor
            .supervision_capacity
            .checked_sub(1)
            .ok_or(AppError::CapacityExhausted)?;
        debug!(
            "supervision capacity of {} is now {}",
            professor_id, professor.supervision_capacity
        );
        self.mark_dirty(Collection::Professors);
        Ok(())
    }

    /// `slot` names the examiner role ("Internal"/"External") for the error message.
    pub fn debit_examiner(&mut self, professor_id: &str, slot: &'static str) -> Result<(), AppError> {
        let professor = self
            .professors
            .get_mut(professor_id)
            .ok_or(AppError::ExaminerUnavailable(slot))?;
        professor.examiner_capacity = professor
            .examiner_capacity
            .checked_sub(1)
            .ok_or(AppError::ExaminerUnavailable(slot))?;
        debug!(
            "examiner capacity of {} is now {}",
            professor_id, professor.examiner_capacity
        );
        self.mark_dirty(Collection::Professors);
        Ok(())
    }

    /// Returns `Ok(false)` when the course no longer exists; nothing is debited then.
    pub fn debit_course(&mut self, course_id: &str) -> Result<bool, AppError> {
        let Some(course) = self.courses.get_mut(course_id) else {
            warn!("course {} not found, capacity left untouched", course_id);
            return Ok(false);
        };
        course.capacity = course
            .capacity
            .checked_sub(1)
            .ok_or(AppError::CourseUnavailable)?;
        self.mark_dirty(Collection::Courses);
        Ok(true)
    }

    pub fn credit_supervision(&mut self, professor_id: &str) -> bool {
        match self.professors.get_mut(professor_id) {
            Some(professor) => {
                professor.supervision_capacity = professor.supervision_capacity.saturating_add(1);
                self.mark_dirty(Collection::Professors);
                true
            }
            None => {
                warn!("supervisor {} not found, capacity not returned", professor_id);
                false
            }
        }
    }

    pub fn credit_examiner(&mut self, professor_id: &str) -> bool {
        match self.professors.get_mut(professor_id) {
            Some(professor) => {
                professor.examiner_capacity = professor.examiner_capacity.saturating_add(1);
                self.mark_dirty(Collection::Professors);
                true
            }
            None => {
                warn!("examiner {} not found, capacity not returned", professor_id);
                false
            }
        }
    }
}
