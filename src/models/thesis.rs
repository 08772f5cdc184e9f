use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThesisStatus {
    #[serde(rename = "Approved for Defense")]
    ApprovedForDefense,
    Defended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Maps an averaged score onto the letter scale: [90,100] A, [80,90) B, [70,80) C, else D.
    pub fn from_average(average: f64) -> Self {
        if average >= 90.0 {
            Grade::A
        } else if average >= 80.0 {
            Grade::B
        } else if average >= 70.0 {
            Grade::C
        } else {
            Grade::D
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thesis {
    pub thesis_id: String,
    pub student_id: String,
    pub supervisor_id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
    pub pdf_path: String,
    pub image_path: String,
    pub defense_date: NaiveDate,
    /// `[internal, external]`
    pub examiners: [String; 2],
    pub status: ThesisStatus,
    pub grade: Option<Grade>,
    #[serde(default)]
    pub scores: BTreeMap<String, u8>,
}

impl Thesis {
    pub fn is_examiner(&self, professor_id: &str) -> bool {
        self.examiners.iter().any(|e| e == professor_id)
    }

    pub fn is_defended(&self) -> bool {
        self.status == ThesisStatus::Defended
    }

    pub fn average_score(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let sum: u32 = self.scores.values().map(|s| u32::from(*s)).sum();
        Some(f64::from(sum) / self.scores.len() as f64)
    }
}

impl Keyed for Thesis {
    fn key(&self) -> &str {
        &self.thesis_id
    }
}
