// ABOUTME: SiteMetadata struct holding the structured result of extracting a URL.
// ABOUTME: Also defines FieldKey and ExtractedField, the (key, value, provenance) unit produced by extractors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder title used when a fetched page yields no title at all.
pub const UNTITLED: &str = "Untitled";

/// Keys that extractors may populate on a [`SiteMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Title,
    Description,
    Ingredients,
    Instructions,
    Duration,
    Difficulty,
    Category,
    Exercises,
    Price,
    Rating,
    Author,
    Subtitle,
    ReadTime,
    Features,
    VideoId,
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKey::Title => "title",
            FieldKey::Description => "description",
            FieldKey::Ingredients => "ingredients",
            FieldKey::Instructions => "instructions",
            FieldKey::Duration => "duration",
            FieldKey::Difficulty => "difficulty",
            FieldKey::Category => "category",
            FieldKey::Exercises => "exercises",
            FieldKey::Price => "price",
            FieldKey::Rating => "rating",
            FieldKey::Author => "author",
            FieldKey::Subtitle => "subtitle",
            FieldKey::ReadTime => "read_time",
            FieldKey::Features => "features",
            FieldKey::VideoId => "video_id",
        };
        write!(f, "{}", s)
    }
}

/// A single extracted value together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedField {
    pub key: FieldKey,
    pub value: String,
    /// Which extractor and selector produced the value, e.g. `allrecipes:h1.headline`.
    pub source: String,
}

impl ExtractedField {
    pub fn new(key: FieldKey, value: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
            source: source.into(),
        }
    }
}

/// Structured metadata extracted from a URL.
///
/// Absent fields are omitted when serialized. `domain` and `used_proxy` are
/// always present; `used_proxy` is empty when no proxy produced the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_rich_content: Option<bool>,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub used_proxy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exercise_mentions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl SiteMetadata {
    fn slot_mut(&mut self, key: FieldKey) -> Option<&mut Option<String>> {
        let slot = match key {
            FieldKey::Title => return None,
            FieldKey::Description => &mut self.description,
            FieldKey::Ingredients => &mut self.ingredients,
            FieldKey::Instructions => &mut self.instructions,
            FieldKey::Duration => &mut self.duration,
            FieldKey::Difficulty => &mut self.difficulty,
            FieldKey::Category => &mut self.category,
            FieldKey::Exercises => &mut self.exercises,
            FieldKey::Price => &mut self.price,
            FieldKey::Rating => &mut self.rating,
            FieldKey::Author => &mut self.author,
            FieldKey::Subtitle => &mut self.subtitle,
            FieldKey::ReadTime => &mut self.read_time,
            FieldKey::Features => &mut self.features,
            FieldKey::VideoId => &mut self.video_id,
        };
        Some(slot)
    }

    /// Returns the current value for a key, treating empty strings as absent.
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        let value = match key {
            FieldKey::Title => Some(self.title.as_str()),
            FieldKey::Description => self.description.as_deref(),
            FieldKey::Ingredients => self.ingredients.as_deref(),
            FieldKey::Instructions => self.instructions.as_deref(),
            FieldKey::Duration => self.duration.as_deref(),
            FieldKey::Difficulty => self.difficulty.as_deref(),
            FieldKey::Category => self.category.as_deref(),
            FieldKey::Exercises => self.exercises.as_deref(),
            FieldKey::Price => self.price.as_deref(),
            FieldKey::Rating => self.rating.as_deref(),
            FieldKey::Author => self.author.as_deref(),
            FieldKey::Subtitle => self.subtitle.as_deref(),
            FieldKey::ReadTime => self.read_time.as_deref(),
            FieldKey::Features => self.features.as_deref(),
            FieldKey::VideoId => self.video_id.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Sets a key to a value. Empty values are ignored.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        match self.slot_mut(key) {
            Some(slot) => *slot = Some(value),
            None => self.title = value,
        }
    }

    /// Returns true if the metadata carries any recipe fields.
    pub fn has_recipe(&self) -> bool {
        self.get(FieldKey::Ingredients).is_some() || self.get(FieldKey::Instructions).is_some()
    }

    /// Returns true if the metadata carries a structured workout.
    pub fn has_workout(&self) -> bool {
        self.get(FieldKey::Exercises).is_some()
    }
}
