//! AI-first segmentation with the classic splitter as fallback.

use crate::ai::{AiSegmentationAdapter, VisionClient};
use crate::config::ManualSplitConfig;
use crate::error::EmojiCutError;
use crate::pixel::codec;
use crate::segment::{detect_emojis_result, SegmentationResult};

/// Segments an encoded image, preferring the vision model when one is
/// configured and enabled.
///
/// Falls back to [`detect_emojis_result`] when there is no adapter, AI is
/// disabled, the AI request fails, or it finds no regions. The returned
/// `method` says which path produced the regions.
///
/// # Errors
/// Only if the image cannot be decoded for the classic path.
pub async fn segment_with_fallback<C: VisionClient>(
    adapter: Option<&AiSegmentationAdapter<C>>,
    image: &[u8],
    split: &ManualSplitConfig,
) -> Result<SegmentationResult, EmojiCutError> {
    if let Some(adapter) = adapter.filter(|a| a.config().enabled) {
        let result = adapter.segment(image).await;
        if result.success && !result.regions.is_empty() {
            return Ok(result);
        }
        match &result.error {
            Some(error) => log::warn!("falling back to classic segmentation: {error}"),
            None => log::info!("AI found no regions, falling back to classic segmentation"),
        }
    }

    let pixels = codec::decode(image)?;
    let result = detect_emojis_result(&pixels, split);
    if result.regions.is_empty() {
        log::info!("no regions found; check that the background is uniform or adjust tolerance");
    }
    Ok(result)
}
