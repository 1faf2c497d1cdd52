//! # Recipe Data Model
//!
//! This module defines the values exchanged with the model and persisted in
//! the history: dietary preferences, recipes and history items.
//!
//! ## Core Concepts
//!
//! - **Ingredient**: a bare display string, free-form and possibly duplicated
//! - **Preferences**: dietary flags, party size and an exclusions string
//! - **Recipe**: one suggestion returned by the model, kept exactly as parsed
//! - **HistoryItem**: one (ingredients, recipes) pair with id and timestamp
//!
//! ## Usage
//!
//! ```rust
//! use pantry_chef::recipe_model::{DietaryFlag, Preferences};
//!
//! let prefs = Preferences::default()
//!     .with_flag(DietaryFlag::Vegetarian)
//!     .with_servings(4)
//!     .with_allergies("nuts");
//!
//! assert!(prefs.vegetarian);
//! assert_eq!(prefs.active_flags(), vec![DietaryFlag::Vegetarian]);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Smallest party size offered by the front end
pub const MIN_SERVINGS: u32 = 1;
/// Largest party size offered by the front end
pub const MAX_SERVINGS: u32 = 8;
/// Party size used when none is given
pub const DEFAULT_SERVINGS: u32 = 2;

/// Dietary preferences for a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Prefer recipes that are fast to prepare
    pub quick: bool,
    /// Prefer light, balanced recipes
    pub healthy: bool,
    /// Avoid recipes that need an oven
    pub no_oven: bool,
    /// Vegetarian recipes only
    pub vegetarian: bool,
    /// Number of people to cook for
    pub servings: u32,
    /// Free-text exclusions and allergies, treated as a hard constraint
    pub allergies: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            quick: false,
            healthy: false,
            no_oven: false,
            vegetarian: false,
            servings: DEFAULT_SERVINGS,
            allergies: String::new(),
        }
    }
}

impl Preferences {
    /// Enable one dietary flag
    pub fn with_flag(mut self, flag: DietaryFlag) -> Self {
        self.set_flag(flag, true);
        self
    }

    /// Set the party size
    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }

    /// Set the exclusions string
    pub fn with_allergies(mut self, allergies: impl Into<String>) -> Self {
        self.allergies = allergies.into();
        self
    }

    /// Read a flag through the explicit flag table
    pub fn flag(&self, flag: DietaryFlag) -> bool {
        match flag {
            DietaryFlag::Quick => self.quick,
            DietaryFlag::Healthy => self.healthy,
            DietaryFlag::NoOven => self.no_oven,
            DietaryFlag::Vegetarian => self.vegetarian,
        }
    }

    /// Write a flag through the explicit flag table
    pub fn set_flag(&mut self, flag: DietaryFlag, value: bool) {
        match flag {
            DietaryFlag::Quick => self.quick = value,
            DietaryFlag::Healthy => self.healthy = value,
            DietaryFlag::NoOven => self.no_oven = value,
            DietaryFlag::Vegetarian => self.vegetarian = value,
        }
    }

    /// Flags currently enabled, in table order
    pub fn active_flags(&self) -> Vec<DietaryFlag> {
        DietaryFlag::ALL
            .iter()
            .copied()
            .filter(|flag| self.flag(*flag))
            .collect()
    }
}

/// The boolean dietary preferences, paired with their display labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DietaryFlag {
    Quick,
    Healthy,
    NoOven,
    Vegetarian,
}

impl DietaryFlag {
    /// Iteration table used by prompts and front ends
    pub const ALL: [DietaryFlag; 4] = [
        DietaryFlag::Quick,
        DietaryFlag::Healthy,
        DietaryFlag::NoOven,
        DietaryFlag::Vegetarian,
    ];

    /// Short label for menus and listings
    pub fn label(self) -> &'static str {
        match self {
            DietaryFlag::Quick => "Quick",
            DietaryFlag::Healthy => "Healthy",
            DietaryFlag::NoOven => "No oven",
            DietaryFlag::Vegetarian => "Vegetarian",
        }
    }

    /// Localization key for the label
    pub fn message_key(self) -> &'static str {
        match self {
            DietaryFlag::Quick => "flag-quick",
            DietaryFlag::Healthy => "flag-healthy",
            DietaryFlag::NoOven => "flag-no-oven",
            DietaryFlag::Vegetarian => "flag-vegetarian",
        }
    }

    /// Constraint sentence embedded in the generation prompt when the flag is on
    pub fn prompt_when_set(self) -> &'static str {
        match self {
            DietaryFlag::Quick => "quick to prepare (about 30 minutes or less in total)",
            DietaryFlag::Healthy => "healthy and balanced",
            DietaryFlag::NoOven => "cooked without an oven",
            DietaryFlag::Vegetarian => "vegetarian (no meat or fish)",
        }
    }

    /// Constraint sentence embedded in the generation prompt when the flag is off
    pub fn prompt_when_unset(self) -> &'static str {
        match self {
            DietaryFlag::Quick => "any preparation time",
            DietaryFlag::Healthy => "no particular nutritional focus",
            DietaryFlag::NoOven => "an oven is available",
            DietaryFlag::Vegetarian => "any diet",
        }
    }
}

impl fmt::Display for DietaryFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recipe difficulty; the model may only pick these two levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
}

impl Difficulty {
    /// Wire values, in the order used by the response schema
    pub const WIRE_VALUES: [&'static str; 2] = ["easy", "medium"];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub name: String,
    /// Whether the user already has it
    pub has_it: bool,
}

/// A recipe suggestion as returned by the model.
///
/// `missing_ingredients` should mirror the `ingredients` entries with
/// `has_it == false`, but that correspondence is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Model-supplied identifier, not guaranteed unique
    pub id: String,
    pub name: String,
    /// Free-text time estimate (e.g. "20 min")
    pub time: String,
    pub difficulty: Difficulty,
    #[serde(deserialize_with = "deserialize_servings")]
    pub servings: u32,
    pub ingredients: Vec<RecipeIngredient>,
    pub missing_ingredients: Vec<String>,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

// The schema declares a JSON number, which may arrive as `2.0`. Fractional
// party sizes are rejected rather than rounded.
fn deserialize_servings<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "servings out of range: {value}"
        )));
    }
    if value.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!(
            "servings is not a whole number: {value}"
        )));
    }
    Ok(value as u32)
}

/// One persisted (ingredients, recipes) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Client-generated random token
    pub id: String,
    /// Creation time in epoch milliseconds
    pub timestamp: i64,
    pub ingredients: Vec<String>,
    pub recipes: Vec<Recipe>,
}

impl HistoryItem {
    /// Creation time as a UTC date, if the timestamp is representable
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}
