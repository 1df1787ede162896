//! Screenshot loading and vision-model analysis.
//!
//! Images are normalized before upload: converted to RGB, downsized when
//! above the ~4 megapixel soft cap (fit within 2048x2048, aspect preserved),
//! JPEG-encoded at quality 85, and base64-encoded.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use llm::{GenerateOptions, ImagePart, Message, ModelProvider};

use crate::analysis::prompts::PromptManager;
use crate::errors::ScengenResult;

/// Pixel count above which an image is downsized.
const MAX_PIXELS: u64 = 4_000_000;

/// Bounding box for downsized images.
const MAX_DIMENSION: u32 = 2048;

/// JPEG quality for uploads.
const JPEG_QUALITY: u8 = 85;

/// A normalized image ready for the vision endpoint.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub filename: String,
    /// Base64-encoded JPEG bytes.
    pub data: String,
    pub width: u32,
    pub height: u32,
}

/// Load and normalize images, skipping unreadable files with a warning.
#[must_use]
pub fn load_images(paths: &[PathBuf]) -> Vec<LoadedImage> {
    let mut loaded = Vec::new();

    for path in paths {
        match load_image(path) {
            Ok(img) => {
                tracing::info!(file = %img.filename, "Loaded image");
                loaded.push(img);
            }
            Err(reason) => {
                tracing::warn!(path = %path.display(), reason = %reason, "Skipping image");
            }
        }
    }

    tracing::info!(count = loaded.len(), "Loaded images");
    loaded
}

fn load_image(path: &Path) -> Result<LoadedImage, String> {
    if !path.exists() {
        return Err("file not found".to_string());
    }

    let img = image::open(path).map_err(|e| format!("failed to decode: {e}"))?;
    let normalized = normalize(img);
    let (width, height) = (normalized.width(), normalized.height());

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    normalized
        .write_with_encoder(encoder)
        .map_err(|e| format!("failed to encode JPEG: {e}"))?;

    Ok(LoadedImage {
        path: path.to_path_buf(),
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        data: BASE64.encode(&buffer),
        width,
        height,
    })
}

/// Convert to RGB and downsize above the megapixel cap.
fn normalize(img: DynamicImage) -> DynamicImage {
    let img = DynamicImage::ImageRgb8(img.to_rgb8());
    if u64::from(img.width()) * u64::from(img.height()) > MAX_PIXELS {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    }
}

/// Analyzes screenshots with the vision-capable model endpoint.
pub struct ImageAnalyzer {
    provider: Arc<dyn ModelProvider>,
    prompts: PromptManager,
    model: String,
    options: GenerateOptions,
}

impl ImageAnalyzer {
    /// Create a new analyzer.
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: String,
        options: GenerateOptions,
    ) -> ScengenResult<Self> {
        let prompts = PromptManager::new()?;
        Ok(Self {
            provider,
            prompts,
            model,
            options,
        })
    }

    /// Analyze each image and join the per-image analyses.
    ///
    /// A failure on one image becomes an inline error line; the rest are
    /// still analyzed.
    pub async fn analyze(&self, images: &[LoadedImage]) -> ScengenResult<String> {
        if images.is_empty() {
            return Ok("No images provided for analysis".to_string());
        }

        let prompt = self.prompts.render("image", &serde_json::json!({}))?;
        let mut analyses = Vec::new();

        for (idx, image) in images.iter().enumerate() {
            let message = Message::user_with_images(
                prompt.clone(),
                vec![ImagePart::jpeg(image.data.clone())],
            );

            match self
                .provider
                .generate(&self.model, &[message], &self.options)
                .await
            {
                Ok(response) => {
                    tracing::info!(file = %image.filename, "Analyzed image");
                    analyses.push(format!(
                        "=== Image Analysis {}: {} ===\nFile: {}\nSize: {}x{}\n\n{}\n\n{}",
                        idx + 1,
                        image.filename,
                        image.path.display(),
                        image.width,
                        image.height,
                        response.text,
                        "=".repeat(60),
                    ));
                }
                Err(e) => {
                    tracing::warn!(file = %image.filename, error = %e, "Image analysis failed");
                    analyses.push(format!("Error analyzing {}: {e}", image.filename));
                }
            }
        }

        Ok(analyses.join("\n\n"))
    }
}
