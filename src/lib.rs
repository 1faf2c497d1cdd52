//! # Pantry Chef
//!
//! Suggests recipes from photos of the food you have. A multimodal Gemini
//! model first lists the ingredients it sees, the list can be edited, and the
//! same service then proposes a few recipes built from those ingredients and
//! your dietary preferences. Results are kept in a short local history.

pub mod assistant;
pub mod config;
pub mod errors;
pub mod fake_backend;
pub mod formatting;
pub mod gemini;
pub mod history;
pub mod image_payload;
pub mod localization;
pub mod prompts;
pub mod recipe_model;
pub mod response;
pub mod retry;
pub mod session;

pub use assistant::RecipeAssistant;
pub use config::{resolve_api_key, AppConfig, RecoveryConfig};
pub use errors::{RecipeError, Result};
pub use gemini::{GeminiClient, GenerateRequest, GenerativeBackend};
pub use history::{FileStorage, HistoryStore, KeyValueStorage, MemoryStorage};
pub use image_payload::ImagePayload;
pub use recipe_model::{DietaryFlag, Difficulty, HistoryItem, Preferences, Recipe, RecipeIngredient};
pub use retry::with_retry;
pub use session::{Outcome, RecipeSession};
