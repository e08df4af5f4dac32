#![allow(dead_code)]

use emojicut::geometry::{BoundingBox, Point};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const EPS_GEOMETRY: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Image dimensions as (width, height).
pub fn arb_image_size() -> BoxedStrategy<(u32, u32)> {
    (1u32..=4000, 1u32..=4000).boxed()
}

/// Any finite coordinate, including far outside typical images.
pub fn arb_coordinate() -> BoxedStrategy<f64> {
    prop_oneof![
        -1.0e6..1.0e6_f64,
        Just(0.0),
        Just(-0.0),
        Just(f64::MIN_POSITIVE),
    ]
    .boxed()
}

pub fn arb_point() -> BoxedStrategy<Point> {
    (arb_coordinate(), arb_coordinate())
        .prop_map(|(x, y)| Point::new(x, y))
        .boxed()
}

/// A box with strictly positive extent.
pub fn arb_valid_bbox() -> BoxedStrategy<BoundingBox> {
    (-1.0e4..1.0e4_f64, -1.0e4..1.0e4_f64, 0.01..1.0e4_f64, 0.01..1.0e4_f64)
        .prop_map(|(x, y, w, h)| BoundingBox::new(x, y, w, h))
        .boxed()
}

/// One AI-style rectangle declaration whose corners lie inside a
/// `width x height` image and span at least one pixel.
#[derive(Clone, Debug)]
pub struct RectDecl {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub label: Option<String>,
}

impl RectDecl {
    pub fn to_json(&self) -> String {
        let label = match &self.label {
            Some(l) => format!(", \"label\": {}", serde_json_string(l)),
            None => String::new(),
        };
        format!(
            "{{\"type\": \"rectangle\", \"topLeft\": {{\"x\": {}, \"y\": {}}}, \"bottomRight\": {{\"x\": {}, \"y\": {}}}{}}}",
            self.x0, self.y0, self.x1, self.y1, label
        )
    }
}

fn serde_json_string(s: &str) -> String {
    serde_json::to_string(s).expect("string encodes")
}

pub fn arb_rect_decl(width: u32, height: u32) -> BoxedStrategy<RectDecl> {
    (
        0..width.max(2) - 1,
        0..height.max(2) - 1,
        1u32..=200,
        1u32..=200,
        proptest::option::of("[a-z ]{0,12}"),
    )
        .prop_map(move |(x0, y0, w, h, label)| RectDecl {
            x0,
            y0,
            x1: (x0 + w).min(width),
            y1: (y0 + h).min(height),
            label,
        })
        .boxed()
}

/// A `{"regions": [...]}` answer for a 1000x1000 image with 1-8 rectangles.
pub fn arb_regions_answer() -> BoxedStrategy<(String, usize)> {
    proptest::collection::vec(arb_rect_decl(1000, 1000), 1..8)
        .prop_map(|decls| {
            let body: Vec<String> = decls.iter().map(RectDecl::to_json).collect();
            (format!("{{\"regions\": [{}]}}", body.join(", ")), decls.len())
        })
        .boxed()
}

/// Prose or markdown that a model might wrap around its JSON.
pub fn arb_wrapping() -> BoxedStrategy<(String, String)> {
    prop_oneof![
        Just((String::new(), String::new())),
        Just((
            "Here are the emoji I found:\n".to_string(),
            "\nLet me know if you need more.".to_string()
        )),
        Just(("```json\n".to_string(), "\n```".to_string())),
        Just(("Sure! ```json\n".to_string(), "\n``` Anything else?".to_string())),
        Just(("Result: ".to_string(), " (coordinates are in pixels)".to_string())),
    ]
    .boxed()
}
