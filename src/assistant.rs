//! # Recipe Assistant Module
//!
//! The two model-backed operations:
//!
//! - [`RecipeAssistant::extract_ingredients`]: photos to ingredient names
//! - [`RecipeAssistant::generate_recipes`]: ingredients and preferences to recipes
//!
//! Each operation resolves the API key first, builds exactly one request,
//! sends it through the retry wrapper, then parses the answer. Parsing is
//! outside the retry loop, so a malformed answer is never requested twice.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{resolve_api_key, AppConfig};
use crate::errors::Result;
use crate::gemini::{GenerateRequest, GenerativeBackend, Part};
use crate::image_payload::{validate_image_count, ImagePayload};
use crate::prompts::{
    ingredients_schema, recipes_schema, render_extract_prompt, render_recipe_prompt,
};
use crate::recipe_model::{Preferences, Recipe};
use crate::response::{parse_ingredients, parse_recipes};
use crate::retry::with_retry;

/// Resolves the API key at the start of each operation
pub type CredentialResolver = Arc<dyn Fn() -> Result<String> + Send + Sync>;

/// Issues extraction and generation calls against a [`GenerativeBackend`]
pub struct RecipeAssistant<B> {
    backend: B,
    config: AppConfig,
    credentials: CredentialResolver,
}

impl<B: GenerativeBackend> RecipeAssistant<B> {
    /// Assistant reading its API key from the process environment
    pub fn new(backend: B, config: AppConfig) -> Self {
        Self {
            backend,
            config,
            credentials: Arc::new(resolve_api_key),
        }
    }

    /// Replace how the API key is resolved
    pub fn with_credentials<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        self.credentials = Arc::new(resolver);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Detect ingredient names in 1 to 5 photos
    pub async fn extract_ingredients(&self, images: &[ImagePayload]) -> Result<Vec<String>> {
        validate_image_count(images.len())?;
        let api_key = (self.credentials)()?;

        let mut parts: Vec<Part> = images.iter().map(Part::image).collect();
        parts.push(Part::text(render_extract_prompt(&self.config.language)));
        let request =
            GenerateRequest::json(&self.config.extract_model, parts, ingredients_schema());

        info!(images = images.len(), model = %request.model, "Extracting ingredients");
        let raw = with_retry(&self.config.recovery, || {
            self.backend.generate(&api_key, &request)
        })
        .await?;

        let ingredients = parse_ingredients(&raw)?;
        info!(count = ingredients.len(), "Ingredients extracted");
        Ok(ingredients)
    }

    /// Suggest recipes for `ingredients`; an empty list sends nothing
    pub async fn generate_recipes(
        &self,
        ingredients: &[String],
        preferences: &Preferences,
    ) -> Result<Vec<Recipe>> {
        if ingredients.is_empty() {
            debug!("No ingredients given, skipping recipe generation");
            return Ok(Vec::new());
        }
        let api_key = (self.credentials)()?;

        let prompt = render_recipe_prompt(ingredients, preferences, &self.config.language);
        let request = GenerateRequest::json(
            &self.config.recipe_model,
            vec![Part::text(prompt)],
            recipes_schema(),
        )
        .with_thinking_budget(self.config.thinking_budget);

        info!(
            ingredients = ingredients.len(),
            servings = preferences.servings,
            model = %request.model,
            "Generating recipes"
        );
        let raw = with_retry(&self.config.recovery, || {
            self.backend.generate(&api_key, &request)
        })
        .await?;

        let recipes = parse_recipes(&raw)?;
        info!(count = recipes.len(), "Recipes generated");
        Ok(recipes)
    }
}
