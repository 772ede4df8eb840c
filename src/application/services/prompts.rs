use serde_json::{Value, json};

use crate::domain::CharacterContext;

pub const EDITORIAL_SCHEMA_NAME: &str = "editorial_verdict";
pub const REFLECTION_SCHEMA_NAME: &str = "reflection_post";

pub fn editorial_system_prompt(character: &CharacterContext) -> String {
    format!(
        "You are the editor of an anonymous advice column written by the persona below.\n\
         {persona}\n\n\
         You receive the transcript of a private conversation between a reader and the persona. \
         Decide whether it contains enough substance to become a public column entry.\n\
         Reject noise: greetings, test messages, one-word replies, circular exchanges that never \
         reach a real problem.\n\
         Accept genuine requests for guidance, and exchanges with concrete lifestyle or aesthetic \
         detail worth sharing.\n\n\
         When publishable, ghost-write the reader's side as a first-person letter that opens with \
         \"Dear {name},\" and closes with \"Signed, \" followed by the pseudonym. Write the persona's \
         reply in the persona's voice. Remove every name, place, employer, contact detail and any \
         other identifying information. Also provide an image prompt for an illustrative painting \
         (no people's faces, no text) and a stock photo query of at most three words.",
        persona = character.prompt_block(),
        name = character.name,
    )
}

pub fn editorial_prompt(transcript: &str) -> String {
    format!("Conversation transcript:\n\n{}", transcript)
}

pub fn editorial_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "is_publishable": { "type": "boolean" },
            "post": {
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "pseudonym": { "type": "string" },
                    "letter": { "type": "string" },
                    "response": { "type": "string" },
                    "image_prompt": { "type": "string" },
                    "stock_query": { "type": "string" }
                },
                "required": ["title", "pseudonym", "letter", "response", "image_prompt", "stock_query"]
            }
        },
        "required": ["is_publishable"]
    })
}

pub fn reflection_system_prompt(character: &CharacterContext) -> String {
    format!(
        "You write entries for an anonymous advice column in the voice of the persona below.\n\
         {persona}\n\n\
         Turn the reader's private reflection into a first-person letter that opens with \
         \"Dear {name},\" and closes with \"Signed, \" followed by a fitting pseudonym, then answer \
         it in the persona's voice. Remove every name, place, employer, contact detail and any \
         other identifying information. Give the entry a short title.",
        persona = character.prompt_block(),
        name = character.name,
    )
}

pub fn reflection_prompt(rant: &str, counsel: Option<&str>, directives: &[String]) -> String {
    let mut prompt = format!("Reader's reflection:\n{}", rant.trim());
    if let Some(counsel) = counsel.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("\n\nAdvice the persona already gave:\n{}", counsel.trim()));
    }
    if !directives.is_empty() {
        prompt.push_str("\n\nThe reader is currently working on:\n");
        for directive in directives {
            prompt.push_str(&format!("- {}\n", directive));
        }
    }
    prompt
}

pub fn reflection_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "pseudonym": { "type": "string" },
            "letter": { "type": "string" },
            "response": { "type": "string" }
        },
        "required": ["title", "pseudonym", "letter", "response"]
    })
}

pub fn counsel_system_prompt(character: &CharacterContext, directives: &[String]) -> String {
    let mut prompt = format!(
        "Stay in character as the persona below and talk with the user privately.\n{}\n\n\
         Keep replies under 150 words. Be direct and kind.",
        character.prompt_block()
    );
    if !directives.is_empty() {
        prompt.push_str("\nThe user is currently working on: ");
        prompt.push_str(&directives.join("; "));
    }
    prompt
}
