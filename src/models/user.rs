use serde::{Deserialize, Serialize};

use super::Keyed;
use crate::repository::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Professor,
}

impl Role {
    pub fn collection(self) -> Collection {
        match self {
            Role::Student => Collection::Students,
            Role::Professor => Collection::Professors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub user_id: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub user_id: String,
    pub name: String,
    pub password_hash: String,
    pub supervision_capacity: u32,
    pub examiner_capacity: u32,
}

impl Keyed for Student {
    fn key(&self) -> &str {
        &self.user_id
    }
}

impl Keyed for Professor {
    fn key(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum User {
    Student(Student),
    Professor(Professor),
}

impl User {
    pub fn role(&self) -> Role {
        match self {
            User::Student(_) => Role::Student,
            User::Professor(_) => Role::Professor,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            User::Student(s) => &s.user_id,
            User::Professor(p) => &p.user_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            User::Student(s) => &s.name,
            User::Professor(p) => &p.name,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            User::Student(s) => &s.password_hash,
            User::Professor(p) => &p.password_hash,
        }
    }
}

/// Who is acting. Handed out by login and passed back explicitly by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub role: Role,
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervision_capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examiner_capacity: Option<u32>,
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        let (supervision_capacity, examiner_capacity) = match user {
            User::Professor(p) => (Some(p.supervision_capacity), Some(p.examiner_capacity)),
            User::Student(_) => (None, None),
        };
        Self {
            role: user.role(),
            user_id: user.user_id().to_string(),
            name: user.name().to_string(),
            supervision_capacity,
            examiner_capacity,
        }
    }
}
