//! Detection output: regions and the result envelope.

use serde::{Deserialize, Serialize};

use super::ids::RegionId;
use crate::ai::TransportErrorKind;
use crate::geometry::{bounding_box_of, bounding_box_to_polygon, BoundingBox, Polygon};

/// Shape of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Rectangle,
    Polygon,
}

/// A read-only detection result, from either the classic pipeline or the AI.
///
/// `polygon` is present iff `kind == Polygon`; `confidence` and `label` only
/// ever come from the AI path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationRegion {
    pub id: RegionId,

    #[serde(rename = "type")]
    pub kind: RegionKind,

    pub bounding_box: BoundingBox,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SegmentationRegion {
    /// A rectangle region. Returns `None` for a degenerate box.
    pub fn rectangle(id: impl Into<RegionId>, bounding_box: BoundingBox) -> Option<Self> {
        if !bounding_box.is_valid() {
            return None;
        }
        Some(Self {
            id: id.into(),
            kind: RegionKind::Rectangle,
            bounding_box,
            polygon: None,
            confidence: None,
            label: None,
        })
    }

    /// A polygon region whose box is derived from the vertices.
    ///
    /// Returns `None` for fewer than three vertices or a degenerate bound.
    pub fn polygon(id: impl Into<RegionId>, polygon: Polygon) -> Option<Self> {
        if polygon.len() < 3 {
            return None;
        }
        let bounding_box = bounding_box_of(&polygon);
        if !bounding_box.is_valid() {
            return None;
        }
        Some(Self {
            id: id.into(),
            kind: RegionKind::Polygon,
            bounding_box,
            polygon: Some(polygon),
            confidence: None,
            label: None,
        })
    }

    pub fn with_confidence(mut self, confidence: Option<f64>) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Turns a rectangle into the equivalent four-vertex polygon so its
    /// corners can be edited. Polygons are returned unchanged.
    pub fn into_polygon(mut self) -> Self {
        if self.kind == RegionKind::Rectangle {
            self.polygon = Some(bounding_box_to_polygon(&self.bounding_box));
            self.kind = RegionKind::Polygon;
        }
        self
    }
}

/// Which path produced a [`SegmentationResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationMethod {
    Ai,
    Fallback,
}

/// Outcome of a segmentation attempt.
///
/// Always returned, never raised: callers branch on `success`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationResult {
    pub success: bool,
    pub regions: Vec<SegmentationRegion>,
    pub method: SegmentationMethod,

    /// Short user-facing message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<TransportErrorKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl SegmentationResult {
    pub fn succeeded(regions: Vec<SegmentationRegion>, method: SegmentationMethod) -> Self {
        Self {
            success: true,
            regions,
            method,
            error: None,
            error_kind: None,
            raw_response: None,
        }
    }

    pub fn failed(method: SegmentationMethod, kind: TransportErrorKind) -> Self {
        Self {
            success: false,
            regions: Vec::new(),
            method,
            error: Some(kind.user_message().to_string()),
            error_kind: Some(kind),
            raw_response: None,
        }
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_rectangle_rejects_degenerate() {
        assert!(SegmentationRegion::rectangle(1, BoundingBox::new(0.0, 0.0, 5.0, 5.0)).is_some());
        assert!(SegmentationRegion::rectangle(1, BoundingBox::new(0.0, 0.0, 0.0, 5.0)).is_none());
    }

    #[test]
    fn test_polygon_derives_bbox() {
        let polygon = Polygon::new(vec![
            Point::new(10.0, 10.0),
            Point::new(30.0, 12.0),
            Point::new(20.0, 40.0),
        ]);
        let region = SegmentationRegion::polygon(3, polygon).unwrap();
        assert_eq!(region.kind, RegionKind::Polygon);
        assert_eq!(region.bounding_box, BoundingBox::new(10.0, 10.0, 20.0, 30.0));
    }

    #[test]
    fn test_into_polygon_keeps_box_and_label() {
        let region = SegmentationRegion::rectangle(2, BoundingBox::new(5.0, 6.0, 10.0, 20.0))
            .unwrap()
            .with_label(Some("wink".into()))
            .into_polygon();
        assert_eq!(region.kind, RegionKind::Polygon);
        assert_eq!(region.bounding_box, BoundingBox::new(5.0, 6.0, 10.0, 20.0));
        let ring = region.polygon.as_ref().unwrap();
        assert_eq!(ring.vertices[0], Point::new(5.0, 6.0));
        assert_eq!(ring.vertices[2], Point::new(15.0, 26.0));
        assert_eq!(region.label.as_deref(), Some("wink"));

        let again = region.clone().into_polygon();
        assert_eq!(again, region);
    }

    #[test]
    fn test_region_json_shape() {
        let region = SegmentationRegion::rectangle(1, BoundingBox::new(1.0, 2.0, 3.0, 4.0))
            .unwrap()
            .with_label(Some("smile".into()));
        let json = serde_json::to_string(&region).unwrap();
        assert!(json.contains("\"type\":\"rectangle\""));
        assert!(json.contains("\"boundingBox\""));
        assert!(json.contains("\"label\":\"smile\""));
        assert!(!json.contains("confidence"));
    }

    #[test]
    fn test_failed_result_carries_message() {
        let result =
            SegmentationResult::failed(SegmentationMethod::Ai, TransportErrorKind::Timeout);
        assert!(!result.success);
        assert!(result.regions.is_empty());
        assert_eq!(result.error_kind, Some(TransportErrorKind::Timeout));
        assert!(result.error.is_some());
    }
}
