use serde::{Deserialize, Serialize};

/// Public text of a post before it is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub pseudonym: String,
    pub letter: String,
    pub response: String,
}

/// Draft produced by the editorial gate, with the two media hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorialDraft {
    pub title: String,
    pub pseudonym: String,
    pub letter: String,
    pub response: String,
    pub image_prompt: String,
    pub stock_query: String,
}

impl EditorialDraft {
    pub fn post_draft(&self) -> PostDraft {
        PostDraft {
            title: self.title.clone(),
            pseudonym: self.pseudonym.clone(),
            letter: self.letter.clone(),
            response: self.response.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorialVerdict {
    pub is_publishable: bool,
    #[serde(default)]
    pub post: Option<EditorialDraft>,
}

impl EditorialVerdict {
    /// A publishable verdict without a draft is treated as a rejection.
    pub fn into_draft(self) -> Option<EditorialDraft> {
        if self.is_publishable { self.post } else { None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_image_url: Option<String>,
}
