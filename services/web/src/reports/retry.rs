//! Case ID assignment with collision retry.

use pawscue_case_id::LostCaseId;
use tracing::{info, warn};

use crate::db::{Report, ReportStore, StoreError, LOST_CASE_ID_CONSTRAINT};

/// Attempts made before giving up on finding a free case ID.
pub const MAX_CASE_ID_ATTEMPTS: u32 = 5;

/// Why a lost report could not be stored.
#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    /// Every generated case ID collided with an open case.
    #[error("no free case ID after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Inserts a lost report, giving it a fresh case ID.
///
/// A unique violation on the case ID index means another open case holds
/// the code: a new one is drawn and the insert repeated, up to
/// `max_attempts` times. Any other failure is returned immediately.
/// Attempts run sequentially; concurrent submitters are kept apart only by
/// the store's constraint.
pub async fn insert_lost_report(
    store: &dyn ReportStore,
    mut report: Report,
    max_attempts: u32,
) -> Result<Report, AssignError> {
    for attempt in 1..=max_attempts {
        let case_id = LostCaseId::generate();
        report.lost_case_id = Some(case_id.clone());

        match store.insert(&report).await {
            Ok(()) => {
                info!(report_id = %report.id, case_id = %case_id, attempt, "Lost report stored");
                return Ok(report);
            }
            Err(e) if e.is_unique_violation_on(LOST_CASE_ID_CONSTRAINT) => {
                warn!(case_id = %case_id, attempt, "Case ID collision, regenerating");
            }
            Err(e) => return Err(AssignError::Store(e)),
        }
    }

    Err(AssignError::Exhausted {
        attempts: max_attempts,
    })
}
