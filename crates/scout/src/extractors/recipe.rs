// ABOUTME: Recipe extraction from schema.org JSON-LD blocks, with a CSS fallback for recipe-looking pages.
// ABOUTME: Malformed JSON-LD blocks are logged and skipped; they never fail the extraction.

use scraper::Html;
use serde_json::Value;

use crate::dom::select_all;
use crate::error::ExtractError;
use crate::extractors::custom::SelectorSpec;
use crate::extractors::select::{query_all, query_first_match};
use crate::result::{ExtractedField, FieldKey};

const SOURCE_JSON_LD: &str = "recipe:json-ld";

/// Hosts whose pages are treated as recipes even without structured data.
const RECIPE_HOSTS: &[&str] = &[
    "allrecipes.com",
    "foodnetwork.com",
    "epicurious.com",
    "bonappetit.com",
    "seriouseats.com",
];

/// Fields parsed from a JSON-LD Recipe object. Empty strings mean absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeData {
    pub ingredients: String,
    pub instructions: String,
    pub duration: String,
}

impl RecipeData {
    fn into_fields(self, source: &str) -> Vec<ExtractedField> {
        [
            (FieldKey::Ingredients, self.ingredients),
            (FieldKey::Instructions, self.instructions),
            (FieldKey::Duration, self.duration),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| ExtractedField::new(k, v, source))
        .collect()
    }
}

/// Runs JSON-LD extraction and, when that finds nothing on a recipe-looking page, the CSS fallback.
pub fn extract_recipe(doc: &Html, url: &str) -> Vec<ExtractedField> {
    if let Some(data) = recipe_from_json_ld(doc, url) {
        let fields = data.into_fields(SOURCE_JSON_LD);
        if !fields.is_empty() {
            return fields;
        }
    }
    if looks_like_recipe_page(doc, url) {
        return recipe_from_markup(doc);
    }
    Vec::new()
}

/// Parses every `application/ld+json` script and returns the first Recipe found.
pub fn recipe_from_json_ld(doc: &Html, url: &str) -> Option<RecipeData> {
    for script in select_all(doc, "script[type=\"application/ld+json\"]") {
        let raw: String = script.text().collect();
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(e) => {
                let err = ExtractError::malformed_json_ld(url, "recipe", Some(e.into()));
                tracing::debug!(error = %err, "skipping JSON-LD block");
                continue;
            }
        };
        if let Some(recipe) = find_recipe(&value) {
            return Some(parse_recipe(recipe));
        }
    }
    None
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "Recipe",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Recipe")),
        _ => false,
    }
}

fn find_recipe(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe),
        Value::Object(map) => {
            if is_recipe_type(value) {
                return Some(value);
            }
            map.get("@graph").and_then(find_recipe)
        }
        _ => None,
    }
}

fn parse_recipe(recipe: &Value) -> RecipeData {
    let ingredients = match recipe.get("recipeIngredient") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let instructions = match recipe.get("recipeInstructions") {
        Some(Value::Array(steps)) => {
            let mut lines = Vec::new();
            for step in steps {
                collect_steps(step, &mut lines);
            }
            lines.join("\n")
        }
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let duration = ["totalTime", "prepTime"]
        .iter()
        .filter_map(|k| recipe.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string();

    RecipeData {
        ingredients,
        instructions,
        duration,
    }
}

fn collect_steps(step: &Value, out: &mut Vec<String>) {
    match step {
        Value::String(s) => out.push(s.clone()),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("itemListElement") {
                for item in items {
                    collect_steps(item, out);
                }
                return;
            }
            let text = ["text", "name"]
                .iter()
                .filter_map(|k| map.get(*k).and_then(Value::as_str))
                .find(|s| !s.is_empty());
            if let Some(text) = text {
                out.push(text.to_string());
            }
        }
        _ => {}
    }
}

/// Known recipe host, `recipe` in the URL, or schema.org Recipe microdata.
pub fn looks_like_recipe_page(doc: &Html, url: &str) -> bool {
    let lower = url.to_lowercase();
    RECIPE_HOSTS.iter().any(|h| lower.contains(h))
        || lower.contains("recipe")
        || !select_all(doc, "[itemtype*=\"schema.org/Recipe\"]").is_empty()
}

fn recipe_from_markup(doc: &Html) -> Vec<ExtractedField> {
    let ingredient_specs = [
        SelectorSpec::text("[itemprop=\"recipeIngredient\"]"),
        SelectorSpec::text(".wprm-recipe-ingredient"),
        SelectorSpec::text(".ingredients li"),
        SelectorSpec::text(".recipe-ingredient"),
    ];
    let instruction_specs = [
        SelectorSpec::text("[itemprop=\"recipeInstructions\"]"),
        SelectorSpec::text(".wprm-recipe-instruction"),
        SelectorSpec::text(".instructions li"),
        SelectorSpec::text(".recipe-instruction"),
    ];
    let duration_specs = [
        SelectorSpec::attr("[itemprop=\"totalTime\"]", "content"),
        SelectorSpec::attr("[itemprop=\"prepTime\"]", "content"),
        SelectorSpec::text(".total-time"),
        SelectorSpec::text(".prep-time"),
    ];

    let mut fields = Vec::new();
    for (key, specs) in [
        (FieldKey::Ingredients, &ingredient_specs),
        (FieldKey::Instructions, &instruction_specs),
    ] {
        if let Some((values, selector)) = query_all(doc, specs, None) {
            fields.push(ExtractedField::new(
                key,
                values.join("\n"),
                format!("recipe:{selector}"),
            ));
        }
    }
    if let Some(m) = query_first_match(doc, &duration_specs) {
        fields.push(ExtractedField::new(
            FieldKey::Duration,
            m.value,
            format!("recipe:{}", m.selector),
        ));
    }
    fields
}
