use tracing::info;

use crate::error::AppError;
use crate::models::{Grade, Thesis, ThesisStatus};
use crate::registry::Registry;
use crate::repository::Collection;

pub const MAX_SCORE: u32 = 100;

/// Scores needed before a thesis can be graded.
pub const REQUIRED_SCORES: usize = 2;

pub fn assigned_for_grading(registry: &Registry, professor_id: &str) -> Vec<Thesis> {
    registry
        .theses
        .iter()
        .filter(|t| t.is_examiner(professor_id) && t.grade.is_none())
        .cloned()
        .collect()
}

/// Records one examiner's score. The second distinct score grades the thesis
/// and returns the supervisor and examiner capacities it held.
pub fn submit_grade(
    registry: &mut Registry,
    thesis_id: &str,
    examiner_id: &str,
    score: u32,
) -> Result<Thesis, AppError> {
    let thesis = registry
        .theses
        .get_mut(thesis_id)
        .ok_or(AppError::ThesisNotFound)?;
    let score = u8::try_from(score)
        .ok()
        .filter(|s| u32::from(*s) <= MAX_SCORE)
        .ok_or(AppError::InvalidScore(score))?;
    if thesis.is_defended() {
        return Err(AppError::ThesisClosed);
    }
    if !thesis.is_examiner(examiner_id) {
        return Err(AppError::NotAnExaminer);
    }

    thesis.scores.insert(examiner_id.to_string(), score);

    let completed = thesis.scores.len() == REQUIRED_SCORES;
    if completed {
        let average = thesis.average_score().unwrap_or_default();
        let grade = Grade::from_average(average);
        thesis.grade = Some(grade);
        thesis.status = ThesisStatus::Defended;
        info!(
            "thesis {} defended with average {} (grade {:?})",
            thesis_id, average, grade
        );
    }
    let thesis = thesis.clone();
    registry.mark_dirty(Collection::Theses);

    if completed {
        registry.credit_supervision(&thesis.supervisor_id);
        for examiner in &thesis.examiners {
            registry.credit_examiner(examiner);
        }
    } else {
        info!("examiner {} scored thesis {}", examiner_id, thesis_id);
    }

    Ok(thesis)
}
