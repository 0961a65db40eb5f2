mod identifier;
pub use identifier::Identifier;

mod roster;
pub use roster::Roster;

mod outcome;
pub use outcome::FetchOutcome;

mod probe_status;
pub use probe_status::ProbeStatus;

mod exam;
pub use exam::{DEFAULT_LOOKUP_BASE, ExamConfig, LookupUrl};
