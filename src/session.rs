//! # Session Module
//!
//! Front-end state for one user: the editable ingredient list, preferences,
//! the last recipes and the history store, plus the assistant that fills them.
//!
//! Every model call takes a ticket from a monotonic counter before it is
//! issued. When the call completes, its result is applied only if no newer
//! call has been issued in the meantime; otherwise it is dropped and the
//! caller gets [`Outcome::Superseded`], even if the call failed. This keeps a slow, older call from
//! overwriting the result of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::assistant::RecipeAssistant;
use crate::errors::Result;
use crate::gemini::GenerativeBackend;
use crate::history::{HistoryStore, KeyValueStorage};
use crate::image_payload::ImagePayload;
use crate::recipe_model::{HistoryItem, Preferences, Recipe};

/// Result of a call that may have been overtaken by a newer one
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The call was the latest one; its result is now the session state
    Applied(T),
    /// A newer call was issued before this one finished; nothing changed
    Superseded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Superseded => None,
        }
    }
}

struct SessionState<S> {
    ingredients: Vec<String>,
    recipes: Vec<Recipe>,
    preferences: Preferences,
    history: HistoryStore<S>,
}

pub struct RecipeSession<B, S> {
    assistant: RecipeAssistant<B>,
    state: Mutex<SessionState<S>>,
    sequence: AtomicU64,
}

impl<B: GenerativeBackend, S: KeyValueStorage> RecipeSession<B, S> {
    pub fn new(assistant: RecipeAssistant<B>, history: HistoryStore<S>) -> Self {
        Self {
            assistant,
            state: Mutex::new(SessionState {
                ingredients: Vec::new(),
                recipes: Vec::new(),
                preferences: Preferences::default(),
                history,
            }),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn assistant(&self) -> &RecipeAssistant<B> {
        &self.assistant
    }

    fn next_ticket(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket
    }

    /// Detect ingredients in `images` and make them the editable list
    pub async fn analyze(&self, images: &[ImagePayload]) -> Result<Outcome<Vec<String>>> {
        let ticket = self.next_ticket();
        let result = self.assistant.extract_ingredients(images).await;

        let mut state = self.state.lock().await;
        if !self.is_current(ticket) {
            info!(ticket, failed = result.is_err(), "Discarding superseded ingredient extraction");
            return Ok(Outcome::Superseded);
        }
        let detected = result?;
        state.ingredients = detected.clone();
        state.recipes.clear();
        Ok(Outcome::Applied(detected))
    }

    /// Generate recipes for the current list and preferences, then record them.
    ///
    /// With an empty ingredient list nothing is sent and nothing is recorded.
    pub async fn generate(&self) -> Result<Outcome<Vec<Recipe>>> {
        let (ingredients, preferences) = {
            let state = self.state.lock().await;
            (state.ingredients.clone(), state.preferences.clone())
        };
        if ingredients.is_empty() {
            debug!("Generate requested without ingredients");
            return Ok(Outcome::Applied(Vec::new()));
        }

        let ticket = self.next_ticket();
        let result = self
            .assistant
            .generate_recipes(&ingredients, &preferences)
            .await;

        let mut state = self.state.lock().await;
        if !self.is_current(ticket) {
            info!(ticket, failed = result.is_err(), "Discarding superseded recipe generation");
            return Ok(Outcome::Superseded);
        }
        let recipes = result?;
        state.history.record(ingredients, recipes.clone())?;
        state.recipes = recipes.clone();
        Ok(Outcome::Applied(recipes))
    }

    pub async fn ingredients(&self) -> Vec<String> {
        self.state.lock().await.ingredients.clone()
    }

    pub async fn recipes(&self) -> Vec<Recipe> {
        self.state.lock().await.recipes.clone()
    }

    pub async fn preferences(&self) -> Preferences {
        self.state.lock().await.preferences.clone()
    }

    pub async fn set_preferences(&self, preferences: Preferences) {
        self.state.lock().await.preferences = preferences;
    }

    pub async fn set_ingredients(&self, ingredients: Vec<String>) {
        self.state.lock().await.ingredients = ingredients;
    }

    /// Append a user-typed ingredient; blank input is ignored
    pub async fn add_ingredient(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.state.lock().await.ingredients.push(name.to_string());
        true
    }

    /// Remove the ingredient at `index`, returning it
    pub async fn remove_ingredient(&self, index: usize) -> Option<String> {
        let mut state = self.state.lock().await;
        (index < state.ingredients.len()).then(|| state.ingredients.remove(index))
    }

    /// Forget the current ingredients and recipes; history is kept
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.ingredients.clear();
        state.recipes.clear();
    }

    pub async fn history(&self) -> Vec<HistoryItem> {
        self.state.lock().await.history.items().to_vec()
    }

    /// Show a past result again as the current ingredients and recipes
    pub async fn restore_history_item(&self, id: &str) -> Option<HistoryItem> {
        let mut state = self.state.lock().await;
        let item = state.history.get(id).cloned()?;
        state.ingredients = item.ingredients.clone();
        state.recipes = item.recipes.clone();
        Some(item)
    }

    pub async fn remove_history_item(&self, id: &str) -> Result<Vec<HistoryItem>> {
        self.state.lock().await.history.remove(id)
    }

    pub async fn clear_history(&self) -> Result<Vec<HistoryItem>> {
        self.state.lock().await.history.clear()
    }
}
