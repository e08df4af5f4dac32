//! Vision-model segmentation.
//!
//! The crate ships no HTTP client: callers plug one in through
//! [`VisionClient`]. Everything between that seam and a
//! [`SegmentationResult`](crate::segment::SegmentationResult) lives here:
//! the prompt, upload compression, timeout and cancellation, error
//! classification, and parsing the free-text answer into clamped regions.

mod adapter;
mod compress;
mod prompt;
mod response;
mod transport;

pub use adapter::AiSegmentationAdapter;
pub use compress::compress_image;
pub use prompt::build_prompt;
pub use response::{extract_json_from_text, parse_response, parse_response_with, CoordinateUnit};
#[cfg(feature = "fuzzing")]
pub use response::fuzz_balanced_object;
pub use transport::{
    classify_error, CancellationToken, ClientError, TransportErrorKind, VisionClient, VisionRequest,
};
