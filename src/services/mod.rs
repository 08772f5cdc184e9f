pub mod archive;
pub mod clock;
pub mod ledger;
pub mod requests;
pub mod theses;
pub mod thesis_service;

pub use archive::SearchField;
pub use clock::{Clock, ManualClock, SystemClock};
pub use requests::{Decision, DefenseSchedule};
pub use thesis_service::ThesisService;
