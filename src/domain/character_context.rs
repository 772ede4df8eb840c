use serde::{Deserialize, Serialize};

/// Persona the user talks to. Read-only here; it grounds every prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterContext {
    pub name: String,
    pub compiled_description: String,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Default for CharacterContext {
    fn default() -> Self {
        Self {
            name: "Auntie Ro".to_string(),
            compiled_description: "A warm, blunt advice columnist who has seen everything \
                                   twice and still believes people can change."
                .to_string(),
            archetype: Some("advice columnist".to_string()),
            avatar_url: None,
        }
    }
}

impl CharacterContext {
    pub fn prompt_block(&self) -> String {
        match &self.archetype {
            Some(archetype) => format!(
                "Persona name: {}\nArchetype: {}\nDescription: {}",
                self.name, archetype, self.compiled_description
            ),
            None => format!(
                "Persona name: {}\nDescription: {}",
                self.name, self.compiled_description
            ),
        }
    }
}
