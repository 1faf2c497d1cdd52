//! # Response Parsing Module
//!
//! Cleanup and structural parsing of the model's JSON text. Models sometimes
//! wrap JSON in a markdown code fence even when asked for raw JSON, so the
//! fence is stripped before parsing. Any structural mismatch is reported as
//! [`RecipeError::MalformedResponse`]; nothing is silently dropped.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::errors::{RecipeError, Result};
use crate::recipe_model::Recipe;

lazy_static! {
    static ref OPENING_FENCE: Regex =
        Regex::new(r"(?i)^```[a-z]*[ \t]*\r?\n?").expect("Opening fence pattern should be valid");
    static ref CLOSING_FENCE: Regex =
        Regex::new(r"\r?\n?```$").expect("Closing fence pattern should be valid");
}

/// Remove a surrounding markdown code fence, if any
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = match OPENING_FENCE.find(trimmed) {
        Some(m) => &trimmed[m.end()..],
        None => trimmed,
    };
    let without_close = match CLOSING_FENCE.find(without_open) {
        Some(m) => &without_open[..m.start()],
        None => without_open,
    };
    without_close.trim()
}

#[derive(Debug, Deserialize)]
struct IngredientsResponse {
    #[serde(default)]
    ingredients: Vec<String>,
}

/// Parse the extraction response; a missing `ingredients` field is an empty list
pub fn parse_ingredients(raw: &str) -> Result<Vec<String>> {
    let body = strip_code_fence(raw);
    let parsed: IngredientsResponse = serde_json::from_str(body).map_err(|e| {
        RecipeError::MalformedResponse(format!("failed to parse ingredient list: {e}"))
    })?;
    Ok(parsed.ingredients)
}

/// Parse the generation response as an array of recipes
pub fn parse_recipes(raw: &str) -> Result<Vec<Recipe>> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body)
        .map_err(|e| RecipeError::MalformedResponse(format!("failed to parse recipes: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(
            strip_code_fence("```json\n{\"ingredients\":[]}\n```"),
            "{\"ingredients\":[]}"
        );
    }

    #[test]
    fn test_strip_plain_fence_and_whitespace() {
        assert_eq!(strip_code_fence("  ```\n[1, 2]\n```  \n"), "[1, 2]");
    }

    #[test]
    fn test_unfenced_text_untouched() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_fenced_and_bare_parse_identically() {
        let fenced = parse_ingredients("```json\n{\"ingredients\":[]}\n```").unwrap();
        let bare = parse_ingredients("{\"ingredients\":[]}").unwrap();
        assert_eq!(fenced, bare);
        assert!(bare.is_empty());
    }

    #[test]
    fn test_parse_ingredients_keeps_order_and_duplicates() {
        let parsed = parse_ingredients(r#"{"ingredients":["tomate","pan","tomate"]}"#).unwrap();
        assert_eq!(parsed, vec!["tomate", "pan", "tomate"]);
    }

    #[test]
    fn test_missing_field_is_empty() {
        assert!(parse_ingredients("{}").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        assert!(matches!(
            parse_ingredients(r#"{"ingredients":"tomate"}"#),
            Err(RecipeError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_ingredients("I see a tomato"),
            Err(RecipeError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_recipes_empty_array() {
        assert!(parse_recipes("[]").unwrap().is_empty());
    }

    #[test]
    fn test_fractional_servings_are_malformed() {
        let raw = r#"[{"id":"r1","name":"Tortilla","time":"25 min","difficulty":"easy",
            "servings":2.5,"ingredients":[],"missingIngredients":[],"steps":["Cuajar"]}]"#;
        assert!(matches!(parse_recipes(raw), Err(RecipeError::MalformedResponse(_))));

        let whole = raw.replace("2.5", "3.0");
        assert_eq!(parse_recipes(&whole).unwrap()[0].servings, 3);
    }

    #[test]
    fn test_parse_recipes_object_is_malformed() {
        assert!(matches!(
            parse_recipes(r#"{"recipes":[]}"#),
            Err(RecipeError::MalformedResponse(_))
        ));
    }
}
