//! Border-connected background removal.
//!
//! The simple remover floods inward from the image border through
//! background-colored, opaque pixels and clears their alpha. Background
//! colored pixels fully enclosed by the subject are never reached, so
//! details like white eyes survive. An optional feathering pass then
//! softens the anti-aliased fringe left behind.
//!
//! An external [`BackgroundRemover`] (e.g. an ML matting model) can be tried
//! first through [`remove_background`]; the flood fill is its fallback.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::EmojiCutError;
use crate::pixel::{
    color_distance, detect_background_color, PixelBuffer, RgbaColor, OPACITY_THRESHOLD,
};

/// Default number of feathering rounds after the hard fill.
pub const DEFAULT_FEATHER_ROUNDS: u32 = 3;

/// Parameters for the flood-fill remover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemovalOptions {
    pub tolerance: f64,
    pub feather: bool,
    pub feather_rounds: u32,
    /// Known background; detected from the corners when `None`.
    pub background_color: Option<RgbaColor>,
}

impl Default for RemovalOptions {
    fn default() -> Self {
        Self {
            tolerance: 30.0,
            feather: true,
            feather_rounds: DEFAULT_FEATHER_ROUNDS,
            background_color: None,
        }
    }
}

/// Which tier produced a removal result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMethod {
    Advanced,
    Simple,
}

/// Result of [`remove_background`].
#[derive(Clone, Debug)]
pub struct RemovalOutcome {
    pub pixels: PixelBuffer,
    pub method: RemovalMethod,
    /// True when an advanced remover was supplied but failed.
    pub did_fallback: bool,
}

/// An external background-removal implementation.
pub trait BackgroundRemover {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns a copy of `pixels` with the background made transparent.
    fn remove(&self, pixels: &PixelBuffer) -> Result<PixelBuffer, EmojiCutError>;
}

/// Returns true if any pixel is not fully opaque.
pub fn has_transparent_pixels(pixels: &PixelBuffer) -> bool {
    (0..pixels.pixel_count()).any(|i| pixels.alpha_at_index(i) < u8::MAX)
}

/// Tries `advanced` first (if given) and falls back to the flood fill.
pub fn remove_background(
    pixels: &PixelBuffer,
    options: &RemovalOptions,
    advanced: Option<&dyn BackgroundRemover>,
) -> Result<RemovalOutcome, EmojiCutError> {
    let mut did_fallback = false;
    if let Some(remover) = advanced {
        match remover.remove(pixels) {
            Ok(result) => {
                return Ok(RemovalOutcome {
                    pixels: result,
                    method: RemovalMethod::Advanced,
                    did_fallback: false,
                })
            }
            Err(err) => {
                log::warn!(
                    "{} background removal failed, using flood fill: {}",
                    remover.name(),
                    err
                );
                did_fallback = true;
            }
        }
    }

    Ok(RemovalOutcome {
        pixels: remove_background_simple(pixels, options)?,
        method: RemovalMethod::Simple,
        did_fallback,
    })
}

/// Border-seeded flood fill with optional feathering.
///
/// # Errors
/// Fails only for an image with no pixels.
pub fn remove_background_simple(
    pixels: &PixelBuffer,
    options: &RemovalOptions,
) -> Result<PixelBuffer, EmojiCutError> {
    if pixels.is_empty() {
        return Err(EmojiCutError::BackgroundRemovalFailed(
            "image has no pixels".to_string(),
        ));
    }

    let background = options
        .background_color
        .unwrap_or_else(|| detect_background_color(pixels, options.tolerance));
    let mut out = pixels.clone();
    let mut erased = flood_from_border(pixels, background, options.tolerance);
    for (i, &is_erased) in erased.iter().enumerate() {
        if is_erased {
            out.set_alpha_at_index(i, 0);
        }
    }

    if options.feather {
        feather(&mut out, pixels, &mut erased, background, options);
    }
    Ok(out)
}

fn is_fillable(pixels: &PixelBuffer, index: usize, background: RgbaColor, tolerance: f64) -> bool {
    let color = pixels.color_at_index(index);
    color.a >= OPACITY_THRESHOLD && color_distance(color, background) <= tolerance
}

fn neighbors(index: usize, width: usize, height: usize) -> impl Iterator<Item = usize> {
    let (x, y) = (index % width, index / width);
    let left = (x > 0).then(|| index - 1);
    let right = (x + 1 < width).then(|| index + 1);
    let up = (y > 0).then(|| index - width);
    let down = (y + 1 < height).then(|| index + width);
    [left, right, up, down].into_iter().flatten()
}

fn flood_from_border(pixels: &PixelBuffer, background: RgbaColor, tolerance: f64) -> Vec<bool> {
    let width = pixels.width() as usize;
    let height = pixels.height() as usize;
    let mut visited = vec![false; width * height];
    let mut queue = VecDeque::new();

    let border = (0..width)
        .flat_map(|x| [x, (height - 1) * width + x])
        .chain((0..height).flat_map(|y| [y * width, y * width + width - 1]));
    for index in border {
        if !visited[index] && is_fillable(pixels, index, background, tolerance) {
            visited[index] = true;
            queue.push_back(index);
        }
    }

    while let Some(index) = queue.pop_front() {
        for next in neighbors(index, width, height) {
            if !visited[next] && is_fillable(pixels, next, background, tolerance) {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }
    visited
}

/// Softens the fringe next to erased pixels.
///
/// Each round looks at not-yet-erased neighbors of erased pixels that are
/// within twice the tolerance of the background. Those within tolerance are
/// cleared; the rest keep alpha proportional to how far past the tolerance
/// they are. Touched pixels count as erased for the next round.
fn feather(
    out: &mut PixelBuffer,
    source: &PixelBuffer,
    erased: &mut [bool],
    background: RgbaColor,
    options: &RemovalOptions,
) {
    let width = source.width() as usize;
    let height = source.height() as usize;
    let tolerance = options.tolerance;
    let reach = tolerance * 2.0;

    for round in 0..options.feather_rounds {
        let mut frontier = Vec::new();
        for index in 0..erased.len() {
            if erased[index] {
                continue;
            }
            if !neighbors(index, width, height).any(|n| erased[n]) {
                continue;
            }
            let distance = color_distance(source.color_at_index(index), background);
            if distance <= reach {
                frontier.push((index, distance));
            }
        }
        if frontier.is_empty() {
            break;
        }
        log::trace!("feather round {}: {} pixels", round + 1, frontier.len());

        for (index, distance) in frontier {
            let alpha = if distance <= tolerance || tolerance <= 0.0 {
                0
            } else {
                let keep = ((distance - tolerance) / tolerance).clamp(0.0, 1.0);
                (f64::from(source.alpha_at_index(index)) * keep).round() as u8
            };
            out.set_alpha_at_index(index, alpha.min(out.alpha_at_index(index)));
            erased[index] = true;
        }
    }
}
