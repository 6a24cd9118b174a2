//! The recipe entity as it is written to and read from the store.

use serde::{Deserialize, Serialize};

use crate::IngestError;

/// A recipe document.
///
/// Field names are camelCase on the wire to match the collection's document
/// model. `id` doubles as the partition key; when absent it is derived from
/// `name` with [`Recipe::derived_id`]. The descriptive fields are opaque to
/// ingestion and search — they are carried, indexed per the collection's
/// policy, and returned as-is.
///
/// There is deliberately no score field here: similarity scores are
/// query-time annotations and never persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
    /// Semantic vector; absent for documents that have not been embedded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Recipe {
    /// Minimal recipe with just an identity-bearing name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            cuisine: None,
            difficulty: None,
            prep_time: None,
            cook_time: None,
            total_time: None,
            servings: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            embedding: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Identifier derived from a name: the name with every whitespace
    /// character removed. Deterministic, so two entities whose names differ
    /// only in whitespace share an identity — callers own that collision
    /// unless it is intended.
    pub fn derived_id(name: &str) -> String {
        name.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Ensure the recipe has an identifier, deriving one from `name` if
    /// needed, and return it.
    ///
    /// An absent `id` together with a whitespace-only `name` cannot produce
    /// an identity and is rejected rather than written under an empty key.
    pub fn ensure_id(&mut self) -> Result<&str, IngestError> {
        if self.id.as_deref().is_none_or(str::is_empty) {
            let derived = Self::derived_id(&self.name);
            if derived.is_empty() {
                return Err(IngestError::InvalidIdentity(format!(
                    "recipe name {:?} yields an empty identifier",
                    self.name
                )));
            }
            self.id = Some(derived);
        }
        Ok(self.id.as_deref().unwrap_or_default())
    }

    /// Wire field names, used as the projection for search queries.
    pub fn projection() -> [&'static str; 12] {
        [
            "id",
            "name",
            "description",
            "cuisine",
            "difficulty",
            "prepTime",
            "cookTime",
            "totalTime",
            "servings",
            "ingredients",
            "instructions",
            "embedding",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derived_id_strips_all_whitespace() {
        assert_eq!(Recipe::derived_id("Beef Wellington"), "BeefWellington");
        assert_eq!(Recipe::derived_id(" Pad\tThai \n"), "PadThai");
        assert_eq!(Recipe::derived_id("Gazpacho"), "Gazpacho");
    }

    #[test]
    fn ensure_id_prefers_explicit_identifier() {
        let mut recipe = Recipe::named("Beef Wellington");
        recipe.id = Some("custom-7".into());
        assert_eq!(recipe.ensure_id().expect("id present"), "custom-7");
    }

    #[test]
    fn ensure_id_derives_from_name() {
        let mut recipe = Recipe::named("Beef Wellington");
        assert_eq!(recipe.ensure_id().expect("id derived"), "BeefWellington");
        assert_eq!(recipe.id.as_deref(), Some("BeefWellington"));
    }

    #[test]
    fn ensure_id_rejects_blank_names() {
        let mut recipe = Recipe::named("   ");
        assert!(matches!(
            recipe.ensure_id(),
            Err(IngestError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn wire_fields_are_camel_case() {
        let mut recipe = Recipe::named("Pho").with_embedding(vec![1.0, 0.0]);
        recipe.prep_time = Some("20 min".into());
        recipe.servings = Some(2);
        let _ = recipe.ensure_id().expect("id derived");

        let value = serde_json::to_value(&recipe).expect("serializes");
        assert_eq!(value["id"], "Pho");
        assert_eq!(value["prepTime"], "20 min");
        assert_eq!(value["servings"], 2);
        assert_eq!(value["embedding"], json!([1.0, 0.0]));
    }

    #[test]
    fn rows_with_extra_fields_deserialize() {
        // Query rows carry a score alias alongside the entity fields.
        let row = json!({
            "id": "Pho",
            "name": "Pho",
            "description": "Noodle soup",
            "embedding": [1.0, 0.0],
            "score": "0.98"
        });

        let recipe: Recipe = serde_json::from_value(row).expect("deserializes");
        assert_eq!(recipe.id.as_deref(), Some("Pho"));
        assert_eq!(recipe.embedding, Some(vec![1.0, 0.0]));
    }
}
