//! AI image work: product-photo remake and seeking-reference generation.
//!
//! Two pipelines share the [`ImageModel`] port:
//! - remake: the uploaded product photo is re-rendered on a clean,
//!   sustainability-themed background (fixed prompt, single edit call);
//! - seeking image: a text model first writes a detailed English
//!   image-generation prompt from the seeking request, then the image model
//!   renders it.

use tracing::{Instrument, info_span};

use reviveai_types::error::ImageError;
use reviveai_types::llm::{CompletionRequest, Message, MessageRole};

use crate::llm::LlmProvider;

/// Trait for hosted image-generation backends.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in reviveai-infra (e.g., `GeminiImageClient`).
pub trait ImageModel: Send + Sync {
    /// Model identifier (e.g., "gemini-2.5-flash-image").
    fn model_name(&self) -> &str;

    /// Render an image from a text prompt. Returns encoded image bytes.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, ImageError>> + Send;

    /// Edit an existing image under a text prompt. Returns encoded image bytes.
    fn edit(
        &self,
        prompt: &str,
        image: &[u8],
        media_type: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, ImageError>> + Send;
}

/// Fixed prompt for the product-photo remake: keep the product untouched,
/// replace the background with a soft, sustainability-themed scene.
const REMAKE_PROMPT: &str = "\
Please process this product image with the following steps:

1. **Background Removal**:
   - Precisely identify and preserve the main product object in the image
   - Remove the original background to make the product the focal point
   - Maintain all details, textures, and colors of the product unchanged

2. **Sustainable Background Generation**:
   - Create a minimalist, modern background with a strong sense of sustainability
   - The background should include one or more of the following elements:
     * Soft green plants (such as blurred leaves, small potted plants)
     * Natural lighting creating a warm atmosphere
     * Minimalist wooden or eco-friendly material surfaces
     * Soft beige or light green tones
   - The background should be softly focused, not competing for visual attention
   - Overall style should convey the concept of \"second-hand is beautiful\" and \"sustainable and eco-friendly\"

3. **Composition Requirements**:
   - The product should naturally blend into the new background
   - Maintain appropriate lighting effects and shadows
   - Ensure natural edge treatment with no obvious cut-out artifacts
   - Overall presentation should be professional and appealing, suitable for e-commerce or social media

Please generate a high-quality product display image.";

/// System role for the seeking-image prompt writer.
const PROMPT_WRITER_SYSTEM: &str =
    "You are an expert in writing detailed, vivid, and effective image generation prompts.";

/// Coordinates the text model (prompt writing) and the image model.
pub struct ImageStudio<P: LlmProvider, M: ImageModel> {
    provider: P,
    prompt_model: String,
    image_model: M,
}

impl<P: LlmProvider, M: ImageModel> ImageStudio<P, M> {
    pub fn new(provider: P, prompt_model: impl Into<String>, image_model: M) -> Self {
        Self {
            provider,
            prompt_model: prompt_model.into(),
            image_model,
        }
    }

    /// Re-render a product photo on a sustainability-themed background.
    pub async fn remake_product_image(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<Vec<u8>, ImageError> {
        let span = info_span!(
            "gen_ai.remake_image",
            gen_ai.request.model = self.image_model.model_name(),
            image.bytes = image.len(),
        );
        self.image_model
            .edit(REMAKE_PROMPT, image, media_type)
            .instrument(span)
            .await
    }

    /// Generate a realistic reference photo for a seeking post.
    ///
    /// The seeking information (item, purpose, budget) is turned into a
    /// detailed English prompt styled as a casual Taiwanese smartphone
    /// photo, then rendered by the image model.
    pub async fn create_seeking_image(&self, user_input: &str) -> Result<Vec<u8>, ImageError> {
        let detailed_prompt = self.write_seeking_prompt(user_input).await?;

        let span = info_span!(
            "gen_ai.generate_image",
            gen_ai.request.model = self.image_model.model_name(),
        );
        self.image_model
            .generate(&detailed_prompt)
            .instrument(span)
            .await
    }

    /// Ask the text model for the image-generation prompt.
    async fn write_seeking_prompt(&self, user_input: &str) -> Result<String, ImageError> {
        let prompt = format!(
            "Based on the user's detailed seeking post information, create a detailed and specific \
             English prompt for an image generation model. The target audience is Taiwanese users \
             seeking second-hand items, and the image should look like a realistic photo taken with \
             a smartphone.\n\n\
             Follow these guidelines:\n\
             1. **Realistic Smartphone Photography Style**: The image should look like it was taken \
             with a modern smartphone. Include natural imperfections like slight blur, natural \
             lighting, casual composition.\n\
             2. **Aspect Ratio**: Specify either \"1:1 square format\" or \"4:3 landscape format\" \
             depending on what suits the item best.\n\
             3. **Taiwanese Context**: Consider typical Taiwanese home/office settings - items might \
             be photographed on wooden tables, tiled floors, or against simple walls. Natural \
             daylight from windows is common.\n\
             4. **Be Specific and Detailed**: Parse the seeking information to describe the item \
             clearly with realistic details, textures, and any visible wear that shows it's \
             second-hand.\n\
             5. **Casual but Clear**: Clear enough to see details, but keep the authentic \
             \"user-taken\" feel - not professional studio quality.\n\
             6. **Natural Lighting**: Natural indoor lighting, window light, or everyday home \
             lighting - avoid studio setup descriptions.\n\
             7. **Simple Background**: Typical home environments - wooden desks, plain walls, tile \
             floors, or simple fabric backgrounds.\n\
             8. **Second-hand Appearance**: Show realistic wear, use, and aging expected from \
             pre-owned items.\n\n\
             User's Seeking Information: \"{user_input}\"\n\n\
             Parse this information to understand what specific item they want, the purpose/use \
             case, budget constraints (if mentioned), and any other relevant details.\n\n\
             Generate a single, concise paragraph prompt in English. MUST include the aspect ratio \
             specification at the start."
        );

        let request = CompletionRequest {
            model: self.prompt_model.clone(),
            messages: vec![Message::text(MessageRole::User, prompt)],
            system: Some(PROMPT_WRITER_SYSTEM.to_string()),
            max_tokens: 512,
            temperature: None,
            stream: false,
            stop_sequences: None,
            tools: Vec::new(),
            output_schema: None,
        };

        let span = info_span!(
            "gen_ai.write_image_prompt",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
        );

        let response = self
            .provider
            .complete(&request)
            .instrument(span)
            .await
            .map_err(|e| ImageError::PromptGeneration(e.to_string()))?;

        if response.content.trim().is_empty() {
            return Err(ImageError::PromptGeneration(
                "prompt model returned empty output".into(),
            ));
        }

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Mutex;

    use futures_util::Stream;
    use reviveai_types::llm::{
        CompletionResponse, LlmError, ProviderCapabilities, StopReason, StreamEvent, Usage,
    };

    struct FixedProvider {
        content: String,
        capabilities: ProviderCapabilities,
    }

    impl FixedProvider {
        fn new(content: &str) -> Self {
            Self {
                content: content.to_string(),
                capabilities: ProviderCapabilities {
                    streaming: false,
                    tool_calling: false,
                    vision: false,
                    max_context_tokens: 128_000,
                    max_output_tokens: 16_384,
                },
            }
        }
    }

    impl LlmProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                id: "resp".into(),
                content: self.content.clone(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                tool_calls: Vec::new(),
                usage: Usage::default(),
            })
        }

        fn stream(
            &self,
            _request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
            Box::pin(futures_util::stream::empty())
        }
    }

    struct RecordingImageModel {
        last_prompt: Mutex<Option<String>>,
    }

    impl RecordingImageModel {
        fn new() -> Self {
            Self {
                last_prompt: Mutex::new(None),
            }
        }
    }

    impl ImageModel for RecordingImageModel {
        fn model_name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(vec![0x89, 0x50, 0x4E, 0x47])
        }

        async fn edit(
            &self,
            prompt: &str,
            _image: &[u8],
            _media_type: &str,
        ) -> Result<Vec<u8>, ImageError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(vec![0x89, 0x50, 0x4E, 0x47])
        }
    }

    #[tokio::test]
    async fn test_remake_uses_fixed_prompt() {
        let studio = ImageStudio::new(
            FixedProvider::new("unused"),
            "gpt-4.1-nano",
            RecordingImageModel::new(),
        );
        let bytes = studio
            .remake_product_image(&[1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(bytes[..4], [0x89, 0x50, 0x4E, 0x47]);

        let prompt = studio.image_model.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Background Removal"));
        assert!(prompt.contains("Sustainable Background Generation"));
    }

    #[tokio::test]
    async fn test_seeking_image_renders_generated_prompt() {
        let studio = ImageStudio::new(
            FixedProvider::new("4:3 landscape format. A realistic smartphone photo of ..."),
            "gpt-4.1-nano",
            RecordingImageModel::new(),
        );
        studio
            .create_seeking_image("MacBook Air M1 - 學習程式設計 - 希望不超過 $7,000")
            .await
            .unwrap();

        let prompt = studio.image_model.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.starts_with("4:3 landscape format"));
    }

    #[tokio::test]
    async fn test_seeking_image_rejects_empty_prompt() {
        let studio = ImageStudio::new(
            FixedProvider::new("   "),
            "gpt-4.1-nano",
            RecordingImageModel::new(),
        );
        let err = studio.create_seeking_image("anything").await.unwrap_err();
        assert!(matches!(err, ImageError::PromptGeneration(_)));
    }
}
