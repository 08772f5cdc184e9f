use serde::{Deserialize, Serialize};

use super::Keyed;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub title: String,
    pub professor_id: String,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<u32>,
}

impl Course {
    pub fn is_available(&self) -> bool {
        self.capacity > 0
    }
}

impl Keyed for Course {
    fn key(&self) -> &str {
        &self.course_id
    }
}
