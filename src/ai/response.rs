//! Parsing and sanitizing vision-model answers.
//!
//! Model output is untrusted text. The JSON is dug out of whatever prose or
//! markdown surrounds it, each region is decoded on its own (a bad element
//! is skipped, not fatal), and every coordinate is clamped into the image
//! because models routinely overshoot near the edges.

use serde::Deserialize;
use serde_json::Value;

use crate::error::EmojiCutError;
use crate::geometry::{normalize, BoundingBox, Point, Polygon};
use crate::segment::SegmentationRegion;

const REGIONS_KEY: &str = "\"regions\"";

/// How the model expressed coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoordinateUnit {
    #[default]
    Pixels,
    /// 0-100 of the image width/height.
    Percent,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawRegion {
    #[serde(rename_all = "camelCase")]
    Rectangle {
        top_left: RawPoint,
        bottom_right: RawPoint,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        confidence: Option<f64>,
    },
    Polygon {
        vertices: Vec<RawPoint>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        confidence: Option<f64>,
    },
}

/// Finds the JSON payload in a model answer.
///
/// Tried in order: the whole (trimmed) text, the body of a ```` ```json ````
/// fence, then the first balanced `{...}` that mentions `"regions"`.
pub fn extract_json_from_text(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if !trimmed.is_empty() && serde_json::from_str::<Value>(trimmed).is_ok() {
        return Some(trimmed);
    }
    fenced_json(text).or_else(|| balanced_object_with_regions(text))
}

fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Outermost objects are tried left to right. An object without the key
/// is skipped whole, since nothing nested in it can carry the key either,
/// and the scan stops at the first `{` that never closes. Each byte is
/// visited a bounded number of times.
fn balanced_object_with_regions(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        let end = matching_brace(bytes, start)?;
        let candidate = &text[start..=end];
        if candidate.contains(REGIONS_KEY) {
            return Some(candidate);
        }
        from = end + 1;
    }
    None
}

/// Index of the `}` closing the `{` at `start`, ignoring braces in strings.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Fuzz-only entrypoint for the balanced-object scan.
#[cfg(feature = "fuzzing")]
pub fn fuzz_balanced_object(text: &str) -> Option<&str> {
    balanced_object_with_regions(text)
}

/// Parses pixel-coordinate regions; see [`parse_response_with`].
pub fn parse_response(
    text: &str,
    image_width: u32,
    image_height: u32,
) -> Result<Vec<SegmentationRegion>, EmojiCutError> {
    parse_response_with(text, image_width, image_height, CoordinateUnit::Pixels)
}

/// Parses a model answer into regions numbered from 1.
///
/// # Errors
/// [`EmojiCutError::InvalidJson`] if no JSON can be found, it does not
/// parse, or its root has no `regions` array. Individual regions that are
/// malformed, polygons with fewer than 3 vertices, and regions that collapse
/// to nothing after clamping are skipped with a warning.
pub fn parse_response_with(
    text: &str,
    image_width: u32,
    image_height: u32,
    unit: CoordinateUnit,
) -> Result<Vec<SegmentationRegion>, EmojiCutError> {
    let json = extract_json_from_text(text)
        .ok_or_else(|| EmojiCutError::invalid_json("no JSON object found in response"))?;
    let root: Value = serde_json::from_str(json)
        .map_err(|e| EmojiCutError::invalid_json(format!("response is not valid JSON: {e}")))?;
    let declared = root
        .get("regions")
        .and_then(Value::as_array)
        .ok_or_else(|| EmojiCutError::invalid_json("missing \"regions\" array"))?;

    let frame = Frame {
        width: f64::from(image_width),
        height: f64::from(image_height),
        unit,
    };

    let mut regions = Vec::with_capacity(declared.len());
    for (index, value) in declared.iter().enumerate() {
        let raw = match RawRegion::deserialize(value) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("skipping AI region #{index}: {err}");
                continue;
            }
        };
        let id = regions.len() as u64 + 1;
        match frame.sanitize(id, raw) {
            Ok(region) => regions.push(region),
            Err(err) => log::warn!("skipping AI region #{index}: {err}"),
        }
    }
    log::debug!("parsed {} of {} AI regions", regions.len(), declared.len());
    Ok(regions)
}

struct Frame {
    width: f64,
    height: f64,
    unit: CoordinateUnit,
}

impl Frame {
    /// Converts to pixels and clamps into `[0, width] x [0, height]`.
    fn place(&self, raw: &RawPoint) -> Point {
        let p = normalize(
            Point::new(raw.x, raw.y),
            self.width,
            self.height,
            self.unit == CoordinateUnit::Percent,
        );
        Point::new(clamp_closed(p.x, self.width), clamp_closed(p.y, self.height))
    }

    fn sanitize(&self, id: u64, raw: RawRegion) -> Result<SegmentationRegion, EmojiCutError> {
        match raw {
            RawRegion::Rectangle {
                top_left,
                bottom_right,
                label,
                confidence,
            } => {
                let a = self.place(&top_left);
                let b = self.place(&bottom_right);
                let bbox = BoundingBox::from_xyxy(
                    a.x.min(b.x),
                    a.y.min(b.y),
                    a.x.max(b.x),
                    a.y.max(b.y),
                );
                let region = SegmentationRegion::rectangle(id, bbox).ok_or(
                    EmojiCutError::DegenerateRegion {
                        width: bbox.width,
                        height: bbox.height,
                    },
                )?;
                Ok(region
                    .with_label(clean_label(label))
                    .with_confidence(clean_confidence(confidence)))
            }
            RawRegion::Polygon {
                vertices,
                label,
                confidence,
            } => {
                if vertices.len() < 3 {
                    return Err(EmojiCutError::InvalidPolygon {
                        message: format!("{} vertices", vertices.len()),
                    });
                }
                let polygon = Polygon::new(vertices.iter().map(|v| self.place(v)).collect());
                let region = SegmentationRegion::polygon(id, polygon).ok_or(
                    EmojiCutError::InvalidPolygon {
                        message: "vertices collapse to a zero-area bound".to_string(),
                    },
                )?;
                Ok(region
                    .with_label(clean_label(label))
                    .with_confidence(clean_confidence(confidence)))
            }
        }
    }
}

fn clamp_closed(value: f64, limit: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, limit.max(0.0))
    }
}

fn clean_label(label: Option<String>) -> Option<String> {
    label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

fn clean_confidence(confidence: Option<f64>) -> Option<f64> {
    confidence.filter(|c| c.is_finite()).map(|c| c.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::RegionKind;

    const TWO_REGIONS: &str = r#"{"regions": [
        {"type": "rectangle", "topLeft": {"x": 10, "y": 20}, "bottomRight": {"x": 110, "y": 120}, "label": "smile", "confidence": 0.95},
        {"type": "polygon", "vertices": [{"x": 200, "y": 200}, {"x": 300, "y": 200}, {"x": 250, "y": 300}]}
    ]}"#;

    #[test]
    fn test_extract_whole_text() {
        assert_eq!(extract_json_from_text("  {\"regions\": []}  "), Some("{\"regions\": []}"));
    }

    #[test]
    fn test_extract_fenced() {
        let text = "Here you go:\n```json\n{\"regions\": []}\n```\nAnything else?";
        assert_eq!(extract_json_from_text(text), Some("{\"regions\": []}"));
    }

    #[test]
    fn test_extract_balanced_object() {
        let text = "I found {some} emoji: {\"regions\": [{\"label\": \"a } in a string\"}]} hope that helps";
        assert_eq!(
            extract_json_from_text(text),
            Some("{\"regions\": [{\"label\": \"a } in a string\"}]}")
        );
    }

    #[test]
    fn test_extract_skips_objects_without_regions() {
        let text = "First {\"a\": {\"b\": 1}}, then {\"regions\": []} and {\"regions\": [1]}";
        assert_eq!(extract_json_from_text(text), Some("{\"regions\": []}"));
    }

    #[test]
    fn test_extract_deeply_nested_noise() {
        let noise = format!("{}{}", "{".repeat(50_000), "}".repeat(50_000));
        let text = format!("{noise} then {{\"regions\": []}}");
        assert_eq!(extract_json_from_text(&text), Some("{\"regions\": []}"));
    }

    #[test]
    fn test_extract_stops_at_unclosed_brace() {
        let text = format!("{}{{\"regions\": []}}", "{".repeat(50_000));
        assert_eq!(extract_json_from_text(&text), None);
    }

    #[test]
    fn test_extract_nothing() {
        assert_eq!(extract_json_from_text(""), None);
        assert_eq!(extract_json_from_text("not json"), None);
        assert_eq!(extract_json_from_text("{\"other\": 1"), None);
    }

    #[test]
    fn test_parse_mixed_regions() {
        let regions = parse_response(TWO_REGIONS, 1000, 1000).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].kind, RegionKind::Rectangle);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(10.0, 20.0, 100.0, 100.0));
        assert_eq!(regions[0].label.as_deref(), Some("smile"));
        assert_eq!(regions[0].confidence, Some(0.95));
        assert_eq!(regions[1].kind, RegionKind::Polygon);
        assert_eq!(regions[1].bounding_box, BoundingBox::new(200.0, 200.0, 100.0, 100.0));
        assert_eq!(regions[1].id.as_u64(), 2);
    }

    #[test]
    fn test_wrapping_does_not_change_result() {
        let plain = parse_response(TWO_REGIONS, 1000, 1000).unwrap();
        let fenced = format!("Sure!\n```json\n{TWO_REGIONS}\n```\nLet me know.");
        let prose = format!("The regions are {TWO_REGIONS} as requested.");
        assert_eq!(parse_response(&fenced, 1000, 1000).unwrap(), plain);
        assert_eq!(parse_response(&prose, 1000, 1000).unwrap(), plain);
    }

    #[test]
    fn test_two_vertex_polygon_dropped() {
        let text = r#"{"regions": [
            {"type": "polygon", "vertices": [{"x": 1, "y": 1}, {"x": 5, "y": 5}]},
            {"type": "polygon", "vertices": [{"x": 1, "y": 1}, {"x": 5, "y": 1}, {"x": 3, "y": 5}]}
        ]}"#;
        let regions = parse_response(text, 100, 100).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].id.as_u64(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_clamped() {
        let text = r#"{"regions": [{"type": "rectangle", "topLeft": {"x": -50, "y": -50}, "bottomRight": {"x": 1500, "y": 1500}}]}"#;
        let regions = parse_response(text, 1000, 1000).unwrap();
        assert_eq!(regions[0].bounding_box, BoundingBox::new(0.0, 0.0, 1000.0, 1000.0));
    }

    #[test]
    fn test_swapped_corners_and_degenerate() {
        let text = r#"{"regions": [
            {"type": "rectangle", "topLeft": {"x": 50, "y": 60}, "bottomRight": {"x": 10, "y": 20}},
            {"type": "rectangle", "topLeft": {"x": 1200, "y": 10}, "bottomRight": {"x": 1300, "y": 90}}
        ]}"#;
        let regions = parse_response(text, 1000, 1000).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(10.0, 20.0, 40.0, 40.0));
    }

    #[test]
    fn test_malformed_elements_skipped_individually() {
        let text = r#"{"regions": [
            {"type": "rectangle", "topLeft": {"x": "ten", "y": 0}, "bottomRight": {"x": 5, "y": 5}},
            {"type": "circle", "center": {"x": 5, "y": 5}},
            42,
            {"type": "rectangle", "topLeft": {"x": 0, "y": 0}, "bottomRight": {"x": 5, "y": 5}}
        ]}"#;
        let regions = parse_response(text, 100, 100).unwrap();
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_percent_coordinates() {
        let text = r#"{"regions": [{"type": "rectangle", "topLeft": {"x": 10, "y": 25}, "bottomRight": {"x": 50, "y": 100}}]}"#;
        let regions = parse_response_with(text, 200, 400, CoordinateUnit::Percent).unwrap();
        assert_eq!(regions[0].bounding_box, BoundingBox::new(20.0, 100.0, 80.0, 300.0));
    }

    #[test]
    fn test_invalid_inputs_fail() {
        for text in ["", "not json", r#"{"regions":"x"}"#, r#"{"items": []}"#, "[1, 2]"] {
            let err = parse_response(text, 100, 100).unwrap_err();
            assert!(matches!(err, EmojiCutError::InvalidJson { .. }), "{text:?}");
        }
    }

    #[test]
    fn test_blank_label_and_wild_confidence() {
        let text = r#"{"regions": [{"type": "rectangle", "topLeft": {"x": 0, "y": 0}, "bottomRight": {"x": 5, "y": 5}, "label": "  ", "confidence": 7}]}"#;
        let regions = parse_response(text, 100, 100).unwrap();
        assert_eq!(regions[0].label, None);
        assert_eq!(regions[0].confidence, Some(1.0));
    }
}
