pub mod course;
pub mod request;
pub mod thesis;
pub mod timestamp;
pub mod user;

pub use course::Course;
pub use request::{
    CourseRequest, CourseRequestStatus, DefenseDetails, DefenseRequest, DefenseStatus,
    RequestRecord,
};
pub use thesis::{Grade, Thesis, ThesisStatus};
pub use user::{Professor, Role, Session, Student, User};

/// A persisted record addressable by its unique id.
pub trait Keyed {
    fn key(&self) -> &str;
}
