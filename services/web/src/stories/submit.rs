//! Story submission: validation, slug assignment and storage.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{StoreError, Story, StoryAnimal, StoryStatus, StoryStore, STORY_SLUG_CONSTRAINT};
use crate::reports::FieldIssue;

/// Longest accepted excerpt, in characters.
pub const MAX_EXCERPT_CHARS: usize = 140;

/// Attempts made before giving up on finding a free slug.
pub const MAX_SLUG_ATTEMPTS: u32 = 5;

const SLUG_SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SLUG_SUFFIX_LENGTH: usize = 4;
const FALLBACK_SLUG: &str = "story";

/// Story form as submitted. Every field is optional at this stage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorySubmission {
    pub title: String,
    pub animal_type: String,
    pub city: String,
    pub month_year: String,
    pub excerpt: String,
    pub content: String,
    pub author_name: String,
    pub author_contact: String,
    pub consent: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StorySubmitError {
    #[error("story has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldIssue>),

    #[error("no free slug after {attempts} attempts")]
    SlugExhausted { attempts: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidStory {
    pub title: String,
    pub animal_type: StoryAnimal,
    pub city: String,
    pub month_year: String,
    pub excerpt: String,
    pub content: String,
    pub author_name: Option<String>,
    pub author_contact: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Lower-cases `value` and joins its ASCII alphanumeric runs with `-`.
///
/// Titles with nothing usable become `story`.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let slug = lowered
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// `slugify(title)` plus a random four character base-36 suffix.
pub fn story_slug(title: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SLUG_SUFFIX_LENGTH)
        .map(|_| SLUG_SUFFIX_ALPHABET[rng.random_range(0..SLUG_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{suffix}", slugify(title))
}

/// Checks a submission, collecting every field problem at once.
pub fn validate_story(input: &StorySubmission) -> Result<ValidStory, Vec<FieldIssue>> {
    let mut issues = Vec::new();

    let title = non_blank(&input.title);
    if title.is_none() {
        issues.push(FieldIssue::new("title", "Title is required."));
    }

    let animal_type = match non_blank(&input.animal_type) {
        None => {
            issues.push(FieldIssue::new("animal_type", "Animal type is required."));
            None
        }
        Some(raw) => {
            let parsed = StoryAnimal::from_str(&raw.to_ascii_lowercase());
            if parsed.is_none() {
                issues.push(FieldIssue::new(
                    "animal_type",
                    "Please choose a valid animal type.",
                ));
            }
            parsed
        }
    };

    let city = non_blank(&input.city);
    if city.is_none() {
        issues.push(FieldIssue::new("city", "City is required."));
    }

    let month_year = non_blank(&input.month_year);
    if month_year.is_none() {
        issues.push(FieldIssue::new("month_year", "Month and year are required."));
    }

    let excerpt = non_blank(&input.excerpt);
    match &excerpt {
        None => issues.push(FieldIssue::new("excerpt", "Excerpt is required.")),
        Some(text) if text.chars().count() > MAX_EXCERPT_CHARS => issues.push(FieldIssue::new(
            "excerpt",
            "Excerpt must be 140 characters or less.",
        )),
        Some(_) => {}
    }

    let content = non_blank(&input.content);
    if content.is_none() {
        issues.push(FieldIssue::new("content", "Story content is required."));
    }

    if !input.consent {
        issues.push(FieldIssue::new(
            "consent",
            "Consent is required to submit a story.",
        ));
    }

    match (title, animal_type, city, month_year, excerpt, content) {
        (Some(title), Some(animal_type), Some(city), Some(month_year), Some(excerpt), Some(content))
            if issues.is_empty() =>
        {
            Ok(ValidStory {
                title,
                animal_type,
                city,
                month_year,
                excerpt,
                content,
                author_name: non_blank(&input.author_name),
                author_contact: non_blank(&input.author_contact),
            })
        }
        _ => Err(issues),
    }
}

/// Validates and stores a story as pending review.
///
/// A unique violation on the slug index draws a new suffix and repeats the
/// insert, up to [`MAX_SLUG_ATTEMPTS`] times.
pub async fn submit_story(
    store: &dyn StoryStore,
    input: &StorySubmission,
    now: DateTime<Utc>,
) -> Result<Story, StorySubmitError> {
    let valid = validate_story(input).map_err(StorySubmitError::Invalid)?;

    let mut story = Story {
        id: Uuid::new_v4(),
        slug: String::new(),
        title: valid.title,
        animal_type: valid.animal_type,
        city: valid.city,
        month_year: valid.month_year,
        excerpt: valid.excerpt,
        content: valid.content,
        author_name: valid.author_name,
        author_contact: valid.author_contact,
        status: StoryStatus::Pending,
        category: None,
        created_at: now,
        published_at: None,
    };

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        story.slug = story_slug(&story.title);

        match store.insert(&story).await {
            Ok(()) => {
                info!(story_id = %story.id, slug = %story.slug, attempt, "Story submitted for review");
                return Ok(story);
            }
            Err(e) if e.is_unique_violation_on(STORY_SLUG_CONSTRAINT) => {
                warn!(slug = %story.slug, attempt, "Story slug collision, regenerating");
            }
            Err(e) => return Err(StorySubmitError::Store(e)),
        }
    }

    Err(StorySubmitError::SlugExhausted {
        attempts: MAX_SLUG_ATTEMPTS,
    })
}
