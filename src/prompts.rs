//! Prompt templates and response schemas for the two model calls.

use serde_json::{json, Value};

use crate::recipe_model::{DietaryFlag, Difficulty, Preferences};

/// Basics the model may use without listing them as missing
pub const PANTRY_STAPLES: [&str; 6] = ["salt", "oil", "water", "pepper", "flour", "sugar"];

/// Fewest recipes requested per generation call
pub const MIN_RECIPES: usize = 2;
/// Most recipes requested per generation call
pub const MAX_RECIPES: usize = 3;

pub fn render_extract_prompt(language: &str) -> String {
    format!(
        r#"Analyze these photos of food items.
Identify each food item individually and return a clean list of ingredient names written in {language}.
Be precise about what you see: if you see half a lemon, write "lemon".
Do not include packaging, utensils or anything that is not food.
Return a JSON object with a single field "ingredients" holding the list."#
    )
}

/// Object with one required string-array field
pub fn ingredients_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ingredients": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["ingredients"]
    })
}

pub fn render_recipe_prompt(ingredients: &[String], prefs: &Preferences, language: &str) -> String {
    let constraints = DietaryFlag::ALL
        .iter()
        .map(|flag| {
            let text = if prefs.flag(*flag) {
                flag.prompt_when_set()
            } else {
                flag.prompt_when_unset()
            };
            format!("   - {}: {}", flag.label(), text)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let exclusions = match prefs.allergies.trim() {
        "" => "none".to_string(),
        text => text.to_string(),
    };

    format!(
        r#"Act as a creative home chef. I have these ingredients: {ingredients}.

GROUND RULES:
1. The recipes MUST be built from these ingredients. Prefer what is listed over anything else.
2. You may assume these basic staples without listing them as missing: {staples}. Any other ingredient you need must appear in "missingIngredients" and be marked "hasIt": false.
3. Be coherent: if I only have bread and tomato, suggest bread with tomato or similar, not a lasagna.
4. Cook for {servings} people and respect these preferences:
{constraints}
5. Exclusions and allergies (never use these, not even as a garnish): {exclusions}.
6. Difficulty must be "{easy}" or "{medium}".

Write every recipe in {language}. Return a JSON array of {min} to {max} recipe objects."#,
        ingredients = ingredients.join(", "),
        staples = PANTRY_STAPLES.join(", "),
        servings = prefs.servings,
        easy = Difficulty::Easy.as_str(),
        medium = Difficulty::Medium.as_str(),
        min = MIN_RECIPES,
        max = MAX_RECIPES,
    )
}

/// Array of recipe objects; `tips` is the only optional field
pub fn recipes_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "name": { "type": "STRING" },
                "time": { "type": "STRING" },
                "difficulty": { "type": "STRING", "enum": Difficulty::WIRE_VALUES },
                "servings": { "type": "NUMBER" },
                "ingredients": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "hasIt": { "type": "BOOLEAN" }
                        },
                        "required": ["name", "hasIt"]
                    }
                },
                "missingIngredients": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                },
                "steps": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                },
                "tips": { "type": "STRING" }
            },
            "required": ["id", "name", "time", "difficulty", "servings", "ingredients", "missingIngredients", "steps"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_prompt_embeds_every_preference() {
        let prefs = Preferences::default()
            .with_flag(DietaryFlag::Vegetarian)
            .with_flag(DietaryFlag::NoOven)
            .with_servings(3)
            .with_allergies("peanuts");
        let ingredients = vec!["huevo".to_string(), "pan".to_string()];

        let prompt = render_recipe_prompt(&ingredients, &prefs, "Spanish");

        assert!(prompt.contains("huevo, pan"));
        assert!(prompt.contains("Cook for 3 people"));
        assert!(prompt.contains("vegetarian (no meat or fish)"));
        assert!(prompt.contains("cooked without an oven"));
        assert!(prompt.contains("any preparation time"));
        assert!(prompt.contains("no particular nutritional focus"));
        assert!(prompt.contains("peanuts"));
        assert!(prompt.contains("salt, oil, water, pepper, flour, sugar"));
        assert!(prompt.contains("\"easy\" or \"medium\""));
        assert!(prompt.contains("2 to 3 recipe objects"));
        assert!(prompt.contains("in Spanish"));
    }

    #[test]
    fn test_recipe_prompt_blank_exclusions() {
        let prompt = render_recipe_prompt(&["rice".to_string()], &Preferences::default(), "English");
        assert!(prompt.contains("not even as a garnish): none."));
    }

    #[test]
    fn test_recipe_schema_requirements() {
        let schema = recipes_schema();
        let required = schema["items"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 8);
        assert!(!required.iter().any(|v| v == "tips"));
        assert_eq!(
            schema["items"]["properties"]["difficulty"]["enum"],
            json!(["easy", "medium"])
        );
    }

    #[test]
    fn test_ingredients_schema_shape() {
        let schema = ingredients_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"], json!(["ingredients"]));
    }
}
