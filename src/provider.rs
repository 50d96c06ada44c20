use async_trait::async_trait;
use thiserror::Error;

use crate::upload::EncodedImage;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key is missing")]
    MissingCredential,
    #[error("no image data found in the response")]
    NoImageInResponse,
    #[error("generation failed: {0}")]
    GenerationFailed(String),
}

/// What the provider is asked to do: restyle the hair in `base`, either toward
/// `style_description` or toward the hair shown in `reference`.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub base: EncodedImage,
    pub reference: Option<EncodedImage>,
    pub style_description: String,
}

impl EditRequest {
    /// The text part sent alongside the images. With a reference image the
    /// free-text description is ignored.
    pub fn instruction(&self) -> String {
        if self.reference.is_some() {
            "You are an expert hair stylist AI. \
            Task: Transfer the hairstyle from the SECOND image to the person in the FIRST image. \
            1. Analyze the hairstyle in the second image (cut, texture, color, volume). \
            2. Apply exactly that hairstyle to the person in the first image. \
            3. CRITICAL: Keep the first person's face, facial features, skin tone, lighting, pose, and background EXACTLY the same. Only change the hair area. \
            4. The result must be photorealistic.".to_string()
        } else {
            format!(
                "Change the hairstyle of the person in the image to: {}. \
                Important: Keep the face, facial features, skin tone, lighting, and background exactly the same. \
                Only change the hair. The result should be photorealistic and high quality.",
                self.style_description
            )
        }
    }
}

/// An image-editing backend. Returns the edited image as a data URI.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn edit_hairstyle(&self, request: &EditRequest) -> Result<String, ProviderError>;
}
