//! # pawscue-case-id
//!
//! Short, human-shareable case IDs for lost animal reports.
//!
//! ## ID Format
//!
//! `LOST-` followed by six symbols from `23456789ABCDEFGHJKLMNPQRSTUVWXYZ`.
//!
//! Examples:
//! - `LOST-7K4M9B`
//! - `LOST-Q2WXZ8`
//!
//! The alphabet leaves out 0/O and 1/I so codes survive being read aloud,
//! copied by hand, or re-typed. Input is accepted in any case and with
//! surrounding whitespace; the canonical form is upper case.
//!
//! Uniqueness is not guaranteed here. The report store holds a unique
//! constraint on the case ID column and the submitter regenerates on
//! conflict.

mod case_id;
mod error;

pub use case_id::{
    generate, is_valid_format, normalize, LostCaseId, ALPHABET, CODE_LENGTH, PREFIX,
};
pub use error::CaseIdError;
