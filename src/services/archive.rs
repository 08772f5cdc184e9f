use std::str::FromStr;

use serde::Deserialize;

use crate::error::AppError;
use crate::models::Thesis;
use crate::registry::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Author,
    Supervisor,
    Keywords,
}

impl SearchField {
    fn value<'a>(self, thesis: &'a Thesis) -> &'a str {
        match self {
            SearchField::Title => &thesis.title,
            SearchField::Author => &thesis.student_id,
            SearchField::Supervisor => &thesis.supervisor_id,
            SearchField::Keywords => &thesis.keywords,
        }
    }
}

impl FromStr for SearchField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "author" => Ok(SearchField::Author),
            "supervisor" => Ok(SearchField::Supervisor),
            "keywords" => Ok(SearchField::Keywords),
            _ => Err(AppError::InvalidAction),
        }
    }
}

/// Case-insensitive substring search over defended theses, in storage order.
pub fn search(theses: &Table<Thesis>, query: &str, field: SearchField) -> Vec<Thesis> {
    let query = query.to_lowercase();
    theses
        .iter()
        .filter(|t| t.is_defended())
        .filter(|t| field.value(t).to_lowercase().contains(&query))
        .cloned()
        .collect()
}
