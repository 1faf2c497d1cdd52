//! # Formatting Tests
//!
//! Rendering of ingredients, recipes, history and errors for the terminal.

use pantry_chef::formatting::{
    format_error, format_history, format_ingredients_list, format_preferences, format_recipe,
    format_recipes,
};
use pantry_chef::localization::LocalizationManager;
use pantry_chef::recipe_model::{
    DietaryFlag, Difficulty, HistoryItem, Preferences, Recipe, RecipeIngredient,
};
use pantry_chef::RecipeError;

fn l10n() -> LocalizationManager {
    LocalizationManager::new().unwrap()
}

fn tortilla() -> Recipe {
    Recipe {
        id: "r1".to_string(),
        name: "Tortilla".to_string(),
        time: "25 min".to_string(),
        difficulty: Difficulty::Medium,
        servings: 2,
        ingredients: vec![
            RecipeIngredient {
                name: "huevo".to_string(),
                has_it: true,
            },
            RecipeIngredient {
                name: "cebolla".to_string(),
                has_it: false,
            },
        ],
        missing_ingredients: vec!["cebolla".to_string()],
        steps: vec!["Batir".to_string(), "Cuajar".to_string()],
        tips: Some("Poco aceite".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredients_list_is_numbered() {
        let list = format_ingredients_list(&["tomate".to_string(), "pan".to_string()]);
        assert_eq!(list, "1. tomate\n2. pan\n");
    }

    #[test]
    fn test_preferences_summary() {
        let prefs = Preferences::default()
            .with_flag(DietaryFlag::Quick)
            .with_servings(3)
            .with_allergies("nueces");

        let summary = format_preferences(&prefs, &l10n(), "en");
        assert!(summary.contains("Quick"));
        assert!(summary.contains("Servings: 3"));
        assert!(summary.contains("nueces"));
        assert!(!summary.contains("Vegetarian"));
    }

    #[test]
    fn test_recipe_card() {
        let card = format_recipe(&tortilla(), &l10n(), "en");

        assert!(card.starts_with("## Tortilla\n"));
        assert!(card.contains("25 min"));
        assert!(card.contains("medium"));
        assert!(card.contains("✓ huevo"));
        assert!(card.contains("✗ cebolla"));
        assert!(card.contains("1. Batir"));
        assert!(card.contains("2. Cuajar"));
        assert!(card.contains("Poco aceite"));
    }

    #[test]
    fn test_recipe_card_without_tip() {
        let recipe = Recipe {
            tips: None,
            missing_ingredients: vec![],
            ..tortilla()
        };
        let l10n = l10n();
        let card = format_recipe(&recipe, &l10n, "en");
        let tip_label = l10n.message("recipe-tip", "en", &[("tip", "")]);

        assert!(!card.contains(tip_label.trim()));
    }

    #[test]
    fn test_empty_recipe_list() {
        let l10n = l10n();
        let text = format_recipes(&["pan".to_string()], &[], &l10n, "en");
        assert_eq!(text, l10n.message("recipes-none", "en", &[]));
    }

    #[test]
    fn test_history_listing() {
        let l10n = l10n();
        assert_eq!(
            format_history(&[], &l10n, "en"),
            l10n.message("history-empty", "en", &[])
        );

        let item = HistoryItem {
            id: "abc123xyz".to_string(),
            timestamp: 1_700_000_000_000,
            ingredients: vec!["huevo".to_string(), "patata".to_string()],
            recipes: vec![tortilla()],
        };
        let listing = format_history(&[item], &l10n, "en");
        assert!(listing.contains("abc123xyz"));
        assert!(listing.contains("2023-11-14"));
        assert!(listing.contains("huevo, patata"));
    }

    #[test]
    fn test_error_messages() {
        let l10n = l10n();

        let missing = format_error(&RecipeError::MissingCredential, &l10n, "en");
        assert_eq!(missing, l10n.message("error-missing-credential", "en", &[]));

        let overloaded = RecipeError::TransientServiceUnavailable {
            status: 503,
            message: "overloaded".to_string(),
        };
        let text = format_error(&overloaded, &l10n, "en");
        assert!(text.starts_with(&l10n.message("error-generic", "en", &[])));
        assert!(text.contains("overloaded"));
    }
}
