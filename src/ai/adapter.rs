use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::compress::compress_image;
use super::prompt::build_prompt;
use super::response::parse_response;
use super::transport::{
    classify_error, CancellationToken, TransportErrorKind, VisionClient, VisionRequest,
};
use crate::config::AiSegmentationConfig;
use crate::error::EmojiCutError;
use crate::segment::{SegmentationMethod, SegmentationRegion, SegmentationResult};

/// Runs vision-model segmentation for one caller.
///
/// At most one request is current per adapter: starting a new
/// [`segment`](Self::segment) cancels the one before it, and
/// [`cancel`](Self::cancel) aborts whatever is in flight. Every outcome,
/// including cancellation, comes back as a [`SegmentationResult`].
pub struct AiSegmentationAdapter<C> {
    client: C,
    config: AiSegmentationConfig,
    current: Mutex<Option<CancellationToken>>,
}

impl<C: VisionClient> AiSegmentationAdapter<C> {
    pub fn new(client: C, config: AiSegmentationConfig) -> Self {
        Self {
            client,
            config,
            current: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AiSegmentationConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Cancels the in-flight request, if any.
    pub fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = current.take() {
            token.cancel();
        }
    }

    fn begin(&self) -> CancellationToken {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = current.take() {
            log::debug!("superseding in-flight AI segmentation");
            previous.cancel();
        }
        let token = CancellationToken::new();
        *current = Some(token.clone());
        token
    }

    fn finish(&self, token: &CancellationToken) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_some_and(|t| t.same_as(token)) {
            *current = None;
        }
    }

    /// Segments an encoded image. Never fails; see [`SegmentationResult`].
    pub async fn segment(&self, image: &[u8]) -> SegmentationResult {
        let token = self.begin();
        let outcome = self.request(image, &token).await;
        self.finish(&token);

        let (raw, width, height) = match outcome {
            Ok(answer) => answer,
            Err(err) => return failure(&err, None),
        };
        match parse_response(&raw, width, height) {
            Ok(regions) => {
                log::info!("AI segmentation found {} regions", regions.len());
                let regions = if self.config.use_polygon {
                    regions.into_iter().map(SegmentationRegion::into_polygon).collect()
                } else {
                    regions
                };
                SegmentationResult::succeeded(regions, SegmentationMethod::Ai)
                    .with_raw_response(raw)
            }
            Err(err) => failure(&err, Some(raw)),
        }
    }

    async fn request(
        &self,
        image: &[u8],
        token: &CancellationToken,
    ) -> Result<(String, u32, u32), EmojiCutError> {
        let size = imagesize::blob_size(image).map_err(|e| {
            EmojiCutError::UnsupportedFormat(format!("cannot read image size: {e}"))
        })?;
        let (width, height) = (size.width as u32, size.height as u32);

        let upload = compress_image(image, self.config.max_image_size)?;
        let request = VisionRequest {
            image: upload,
            prompt: build_prompt(width, height),
            width,
            height,
        };
        let timeout = Duration::from_millis(self.config.timeout_ms);

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(EmojiCutError::Transport {
                kind: TransportErrorKind::Cancelled,
                message: "request cancelled".to_string(),
            }),
            answer = tokio::time::timeout(timeout, self.client.analyze(request)) => match answer {
                Ok(Ok(raw)) => Ok((raw, width, height)),
                Ok(Err(err)) => Err(EmojiCutError::Transport {
                    kind: classify_error(&err.0),
                    message: err.0,
                }),
                Err(_) => Err(EmojiCutError::Transport {
                    kind: TransportErrorKind::Timeout,
                    message: format!("no answer within {}ms", self.config.timeout_ms),
                }),
            },
        }
    }
}

fn failure(err: &EmojiCutError, raw: Option<String>) -> SegmentationResult {
    let kind = match err {
        EmojiCutError::Transport { kind, .. } => *kind,
        other => classify_error(&other.to_string()),
    };
    if kind == TransportErrorKind::Cancelled {
        log::debug!("AI segmentation cancelled");
    } else {
        log::warn!("AI segmentation failed ({kind:?}): {err}");
    }
    let result = SegmentationResult::failed(SegmentationMethod::Ai, kind);
    match raw {
        Some(raw) => result.with_raw_response(raw),
        None => result,
    }
}
