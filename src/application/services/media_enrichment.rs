use std::sync::Arc;

use crate::application::ports::{
    ImageGenerator, MediaSourceError, MediaStore, MediaStoreError, StockPhotoSearch,
};
use crate::domain::{MediaUrls, PostId, StoragePath};

/// Looks up the two images for a post concurrently. Neither lookup can fail the
/// enrichment; a failed source leaves its field empty.
pub struct MediaEnrichment {
    image_generator: Arc<dyn ImageGenerator>,
    stock_search: Arc<dyn StockPhotoSearch>,
    media_store: Arc<dyn MediaStore>,
}

impl MediaEnrichment {
    pub fn new(
        image_generator: Arc<dyn ImageGenerator>,
        stock_search: Arc<dyn StockPhotoSearch>,
        media_store: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            image_generator,
            stock_search,
            media_store,
        }
    }

    pub async fn enrich(
        &self,
        post_id: &PostId,
        image_prompt: &str,
        stock_query: &str,
    ) -> MediaUrls {
        let (ai_image, stock_image) = tokio::join!(
            self.generate_and_store(post_id, image_prompt),
            self.stock_search.first_match(stock_query),
        );

        let ai_image_url = match ai_image {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    post_id = %post_id,
                    source = "image_generation",
                    "Enrichment source failed"
                );
                None
            }
        };

        let stock_image_url = match stock_image {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    post_id = %post_id,
                    source = "stock_photo",
                    "Enrichment source failed"
                );
                None
            }
        };

        MediaUrls {
            ai_image_url,
            stock_image_url,
        }
    }

    async fn generate_and_store(
        &self,
        post_id: &PostId,
        prompt: &str,
    ) -> Result<String, EnrichmentError> {
        let image = self.image_generator.generate(prompt).await?;
        let path = StoragePath::post_image(post_id, &image.content_type);
        let url = self
            .media_store
            .put(&path, image.bytes, &image.content_type)
            .await?;
        Ok(url)
    }
}

#[derive(Debug, thiserror::Error)]
enum EnrichmentError {
    #[error("source: {0}")]
    Source(#[from] MediaSourceError),
    #[error("store: {0}")]
    Store(#[from] MediaStoreError),
}
