//! Recipe catalog as supplied by the host.
//!
//! Quantities are mirrors of the host's live inventory: nothing in this crate
//! writes to them, a fresh `updateRecipes` message replaces them wholesale.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub required: u32,
    pub available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Ingredient {
    pub fn is_satisfied(&self) -> bool {
        self.available >= self.required
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    pub result: ResultItem,
    // Display-only fields passed through to the presentation layer.
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Recipe {
    pub fn can_cook(&self) -> bool {
        self.ingredients.iter().all(Ingredient::is_satisfied)
    }

    /// Names of ingredients that are short, in recipe order.
    pub fn missing_ingredients(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .filter(|ing| !ing.is_satisfied())
            .map(|ing| ing.name.clone())
            .collect()
    }
}

// --- Lenient host decoding ------------------------------------------------------

// Host configs written in Lua often emit ids and levels as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<StringOrNumber>::deserialize(d)?.map(String::from))
}

/// Decodes a `recipes` field without failing the whole message: a non-array
/// value yields `None` (catalog kept), malformed entries are skipped.
pub(crate) fn lenient_catalog<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<Recipe>>, D::Error> {
    let items = match Option::<serde_json::Value>::deserialize(d)? {
        None => return Ok(None),
        Some(serde_json::Value::Array(items)) => items,
        Some(other) => {
            warn!("recipes is not an array ({}), keeping current catalog", json_kind(&other));
            return Ok(None);
        }
    };
    let recipes = items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match Recipe::deserialize(item) {
            Ok(recipe) => Some(recipe),
            Err(err) => {
                warn!("skipping recipe #{}: {}", idx, err);
                None
            }
        })
        .collect();
    Ok(Some(recipes))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

pub fn find_recipe<'a>(recipes: &'a [Recipe], id: &str) -> Option<&'a Recipe> {
    recipes.iter().find(|r| r.id == id)
}
