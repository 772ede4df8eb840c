use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PostAuthor, PostOrigin, PrivateContent, PublicContent};

pub const POST_SCHEMA_VERSION: u32 = 2;

/// Stored shape of a post's content. Version 2 nests public, private and author
/// blocks; older records carry the same fields flat at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_content: Option<PublicContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_content: Option<PrivateContent>,
    #[serde(default)]
    pub author: PostAuthor,
    pub origin: PostOrigin,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyFlatPost {
    title: Option<String>,
    pseudonym: Option<String>,
    letter: Option<String>,
    response: Option<String>,
    #[serde(alias = "imageUrl")]
    ai_image_url: Option<String>,
    stock_image_url: Option<String>,
    raw_input: Option<String>,
    raw_advice: Option<String>,
    region: Option<String>,
    display_name: Option<String>,
    origin: Option<PostOrigin>,
}

impl PostDocument {
    pub fn new(
        public_content: Option<PublicContent>,
        private_content: Option<PrivateContent>,
        author: PostAuthor,
        origin: PostOrigin,
    ) -> Self {
        Self {
            schema_version: POST_SCHEMA_VERSION,
            public_content,
            private_content,
            author,
            origin,
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let is_versioned = value
            .get("schemaVersion")
            .and_then(Value::as_u64)
            .is_some_and(|version| version >= u64::from(POST_SCHEMA_VERSION));

        if is_versioned {
            return serde_json::from_value(value);
        }

        let legacy: LegacyFlatPost = serde_json::from_value(value)?;
        Ok(legacy.into_document())
    }
}

impl LegacyFlatPost {
    fn into_document(self) -> PostDocument {
        let public_content = match (self.title, self.letter, self.response) {
            (Some(title), Some(letter), Some(response)) => Some(PublicContent {
                title,
                pseudonym: self.pseudonym.unwrap_or_default(),
                letter,
                response,
                ai_image_url: self.ai_image_url,
                stock_image_url: self.stock_image_url,
            }),
            _ => None,
        };

        let private_content = self.raw_input.map(|raw_input| PrivateContent {
            raw_input,
            raw_advice: self.raw_advice,
        });

        PostDocument::new(
            public_content,
            private_content,
            PostAuthor {
                region: self.region,
                display_name: self.display_name,
            },
            self.origin.unwrap_or(PostOrigin::Sweep),
        )
    }
}
