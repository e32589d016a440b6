//! Report workflows.

pub mod lookup;
pub mod retry;
pub mod submit;

pub use lookup::{close_lost_case, find_lost_case, CaseAction, ClosedCase, LookupError, LostCaseView};
pub use retry::{insert_lost_report, AssignError, MAX_CASE_ID_ATTEMPTS};
pub use submit::{submit_report, validate, FieldIssue, ReportSubmission, SubmitError, LOST_CASE_TTL_DAYS};
