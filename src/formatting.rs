//! Text formatting for the command-line front end

use crate::errors::RecipeError;
use crate::localization::LocalizationManager;
use crate::recipe_model::{Difficulty, HistoryItem, Preferences, Recipe};

/// Format ingredients as a simple numbered list for review
pub fn format_ingredients_list(ingredients: &[String]) -> String {
    let mut result = String::new();
    for (i, ingredient) in ingredients.iter().enumerate() {
        result.push_str(&format!("{}. {}\n", i + 1, ingredient));
    }
    result
}

/// One-line summary of the active preferences
pub fn format_preferences(prefs: &Preferences, l10n: &LocalizationManager, lang: &str) -> String {
    let mut parts: Vec<String> = prefs
        .active_flags()
        .into_iter()
        .map(|flag| l10n.message(flag.message_key(), lang, &[]))
        .collect();
    parts.push(l10n.message(
        "preferences-servings",
        lang,
        &[("servings", prefs.servings.to_string().as_str())],
    ));
    if !prefs.allergies.trim().is_empty() {
        parts.push(l10n.message(
            "preferences-exclusions",
            lang,
            &[("exclusions", prefs.allergies.trim())],
        ));
    }
    parts.join(" · ")
}

fn difficulty_label(difficulty: Difficulty, l10n: &LocalizationManager, lang: &str) -> String {
    let key = match difficulty {
        Difficulty::Easy => "difficulty-easy",
        Difficulty::Medium => "difficulty-medium",
    };
    l10n.message(key, lang, &[])
}

/// Full recipe card
pub fn format_recipe(recipe: &Recipe, l10n: &LocalizationManager, lang: &str) -> String {
    let mut out = format!("## {}\n", recipe.name);
    out.push_str(&l10n.message(
        "recipe-meta",
        lang,
        &[
            ("time", recipe.time.as_str()),
            ("difficulty", difficulty_label(recipe.difficulty, l10n, lang).as_str()),
            ("servings", recipe.servings.to_string().as_str()),
        ],
    ));
    out.push_str("\n\n");

    out.push_str(&l10n.message("recipe-ingredients", lang, &[]));
    out.push('\n');
    for ingredient in &recipe.ingredients {
        let marker = if ingredient.has_it { "✓" } else { "✗" };
        out.push_str(&format!("  {} {}\n", marker, ingredient.name));
    }
    if !recipe.missing_ingredients.is_empty() {
        out.push_str(&l10n.message(
            "recipe-missing",
            lang,
            &[("missing", recipe.missing_ingredients.join(", ").as_str())],
        ));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&l10n.message("recipe-steps", lang, &[]));
    out.push('\n');
    for (i, step) in recipe.steps.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step));
    }

    if let Some(tip) = recipe.tips.as_deref().filter(|t| !t.trim().is_empty()) {
        out.push('\n');
        out.push_str(&l10n.message("recipe-tip", lang, &[("tip", tip)]));
        out.push('\n');
    }
    out
}

/// Heading plus every recipe card
pub fn format_recipes(
    ingredients: &[String],
    recipes: &[Recipe],
    l10n: &LocalizationManager,
    lang: &str,
) -> String {
    if recipes.is_empty() {
        return l10n.message("recipes-none", lang, &[]);
    }
    let mut out = l10n.message(
        "recipes-heading",
        lang,
        &[("ingredients", ingredients.join(", ").as_str())],
    );
    out.push_str("\n\n");
    let cards: Vec<String> = recipes
        .iter()
        .map(|recipe| format_recipe(recipe, l10n, lang))
        .collect();
    out.push_str(&cards.join("\n"));
    out
}

/// One line per history item
pub fn format_history(items: &[HistoryItem], l10n: &LocalizationManager, lang: &str) -> String {
    if items.is_empty() {
        return l10n.message("history-empty", lang, &[]);
    }
    let mut out = l10n.message("history-heading", lang, &[]);
    out.push('\n');
    for item in items {
        let date = item
            .created_at()
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".to_string());
        out.push_str("  ");
        out.push_str(&l10n.message(
            "history-item",
            lang,
            &[
                ("id", item.id.as_str()),
                ("date", date.as_str()),
                ("ingredients", item.ingredients.join(", ").as_str()),
                ("count", item.recipes.len().to_string().as_str()),
            ],
        ));
        out.push('\n');
    }
    out
}

/// User-facing text for a failure: the mapped message plus the details line
pub fn format_error(err: &RecipeError, l10n: &LocalizationManager, lang: &str) -> String {
    let mut out = l10n.message(err.user_message_key(), lang, &[]);
    if !matches!(err, RecipeError::MissingCredential) {
        out.push('\n');
        out.push_str(&l10n.message("error-details", lang, &[("details", err.to_string().as_str())]));
    }
    out
}
