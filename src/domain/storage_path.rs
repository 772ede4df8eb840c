use std::fmt;

use super::PostId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// Deterministic location of a post's generated image; rewriting it replaces the object.
    /// The extension follows the image's content type and falls back to `png`.
    pub fn post_image(post_id: &PostId, content_type: &str) -> Self {
        Self(format!(
            "post-images/{}.{}",
            post_id.as_uuid(),
            image_extension(content_type)
        ))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn image_extension(content_type: &str) -> &'static str {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
