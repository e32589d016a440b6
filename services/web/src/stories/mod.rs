//! Community story workflows.

pub mod moderate;
pub mod submit;

pub use moderate::{approve_story, parse_category, reject_story, ModerationError};
pub use submit::{
    slugify, story_slug, submit_story, validate_story, StorySubmission, StorySubmitError,
    MAX_EXCERPT_CHARS, MAX_SLUG_ATTEMPTS,
};
