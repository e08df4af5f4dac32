//! Validation of configs and region documents.
//!
//! Region checks cover:
//! - Structural integrity (unique ids, `type` agreeing with the polygon)
//! - Geometric validity (finite, positive-extent boxes within the image)
//! - Polygon quality (enough vertices, no self-intersection, tight bound)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::geometry::{bounding_box_of, self_intersects};
use crate::segment::io_json::RegionDocument;
use crate::segment::{RegionId, RegionKind, SegmentationRegion};

/// Slack allowed when comparing coordinates against image bounds.
const BOUNDS_TOLERANCE: f64 = 0.5;

/// Slack allowed between a polygon's bound and the stored box.
const BBOX_MATCH_EPSILON: f64 = 1e-6;

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// Checks documented ranges of every config field.
pub fn validate_config(config: &EngineConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    check_tolerance(config.split.tolerance, "split.tolerance", &mut report);
    check_tolerance(config.extract.tolerance, "extract.tolerance", &mut report);

    let merge = config.split.merge_distance_percent;
    if !(0.0..=10.0).contains(&merge) {
        report.add(ValidationIssue::error(
            IssueCode::MergeDistanceOutOfRange,
            format!("{} is outside 0-10 %", merge),
            IssueContext::Config {
                field: "split.mergeDistancePercent",
            },
        ));
    }

    for (value, field) in [
        (config.split.min_area, "split.minArea"),
        (config.split.min_size, "split.minSize"),
    ] {
        if !value.is_finite() || value < 0.0 {
            report.add(ValidationIssue::error(
                IssueCode::InvalidSizeFilter,
                format!("{} must be a non-negative number", value),
                IssueContext::Config { field },
            ));
        }
    }

    if config.ai.timeout_ms == 0 {
        report.add(ValidationIssue::error(
            IssueCode::ZeroTimeout,
            "AI timeout must be greater than zero",
            IssueContext::Config { field: "ai.timeoutMs" },
        ));
    }
    if config.ai.max_image_size == 0 {
        report.add(ValidationIssue::error(
            IssueCode::ZeroMaxImageSize,
            "AI upload cap must be greater than zero",
            IssueContext::Config {
                field: "ai.maxImageSize",
            },
        ));
    }

    report
}

fn check_tolerance(value: f64, field: &'static str, report: &mut ValidationReport) {
    if !(0.0..=255.0).contains(&value) {
        report.add(ValidationIssue::error(
            IssueCode::ToleranceOutOfRange,
            format!("{} is outside 0-255", value),
            IssueContext::Config { field },
        ));
    }
}

/// Validates a region document and returns every issue found.
///
/// With `strict` set every warning is reported as an error.
pub fn validate_regions(document: &RegionDocument, opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    let (width, height) = (document.image.width, document.image.height);

    if width == 0 || height == 0 {
        report.add(ValidationIssue::error(
            IssueCode::InvalidImageDimensions,
            format!("Invalid dimensions {}x{} (must be positive)", width, height),
            IssueContext::Document,
        ));
    }
    if document.regions.is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::NoRegions,
            "No regions; check that the background is uniform or adjust tolerance",
            IssueContext::Document,
        ));
    }

    let mut seen_ids: HashMap<RegionId, usize> = HashMap::new();
    for (idx, region) in document.regions.iter().enumerate() {
        if let Some(first_idx) = seen_ids.get(&region.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateRegionId,
                format!(
                    "Duplicate region ID {} (first seen at index {})",
                    region.id, first_idx
                ),
                IssueContext::Region {
                    id: region.id.as_u64(),
                },
            ));
        } else {
            seen_ids.insert(region.id, idx);
        }

        validate_region(region, f64::from(width), f64::from(height), &mut report);
    }

    if opts.strict {
        report.escalate_warnings();
    }
    report
}

fn validate_region(
    region: &SegmentationRegion,
    width: f64,
    height: f64,
    report: &mut ValidationReport,
) {
    let context = || IssueContext::Region {
        id: region.id.as_u64(),
    };
    let bbox = &region.bounding_box;

    if !bbox.is_finite() {
        report.add(ValidationIssue::error(
            IssueCode::BBoxNotFinite,
            format!(
                "Non-finite box ({}, {}, {}, {})",
                bbox.x, bbox.y, bbox.width, bbox.height
            ),
            context(),
        ));
        return;
    }

    if !bbox.is_valid() {
        report.add(ValidationIssue::error(
            IssueCode::DegenerateBBox,
            format!("Non-positive extent {}x{}", bbox.width, bbox.height),
            context(),
        ));
    }

    if bbox.x < -BOUNDS_TOLERANCE
        || bbox.y < -BOUNDS_TOLERANCE
        || bbox.right() > width + BOUNDS_TOLERANCE
        || bbox.bottom() > height + BOUNDS_TOLERANCE
    {
        report.add(ValidationIssue::error(
            IssueCode::BBoxOutOfBounds,
            format!(
                "Box ({:.1}, {:.1}, {:.1}, {:.1}) extends outside image bounds (0, 0, {}, {})",
                bbox.x,
                bbox.y,
                bbox.right(),
                bbox.bottom(),
                width,
                height
            ),
            context(),
        ));
    }

    if let Some(confidence) = region.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            report.add(ValidationIssue::warning(
                IssueCode::ConfidenceOutOfRange,
                format!("Confidence {} is outside 0-1", confidence),
                context(),
            ));
        }
    }

    match (region.kind, &region.polygon) {
        (RegionKind::Rectangle, None) => {}
        (RegionKind::Polygon, Some(polygon)) => {
            if polygon.len() < 3 {
                report.add(ValidationIssue::error(
                    IssueCode::PolygonTooFewVertices,
                    format!("Polygon has {} vertices (need at least 3)", polygon.len()),
                    context(),
                ));
                return;
            }
            if self_intersects(polygon) {
                report.add(ValidationIssue::warning(
                    IssueCode::PolygonSelfIntersecting,
                    "Polygon edges cross each other",
                    context(),
                ));
            }
            let tight = bounding_box_of(polygon);
            if !tight.approx_eq(bbox, BBOX_MATCH_EPSILON) {
                report.add(ValidationIssue::error(
                    IssueCode::PolygonBBoxMismatch,
                    format!(
                        "Box ({}, {}, {}, {}) is not the polygon's bound ({}, {}, {}, {})",
                        bbox.x,
                        bbox.y,
                        bbox.width,
                        bbox.height,
                        tight.x,
                        tight.y,
                        tight.width,
                        tight.height
                    ),
                    context(),
                ));
            }
        }
        (RegionKind::Polygon, None) => {
            report.add(ValidationIssue::error(
                IssueCode::RegionKindMismatch,
                "Polygon region has no vertices",
                context(),
            ));
        }
        (RegionKind::Rectangle, Some(_)) => {
            report.add(ValidationIssue::warning(
                IssueCode::RegionKindMismatch,
                "Rectangle region carries a polygon; it will be ignored",
                context(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point, Polygon};

    fn valid_document() -> RegionDocument {
        RegionDocument::new(
            100,
            100,
            vec![
                SegmentationRegion::rectangle(1, BoundingBox::new(10.0, 10.0, 20.0, 20.0)).unwrap(),
                SegmentationRegion::polygon(
                    2,
                    Polygon::new(vec![
                        Point::new(50.0, 50.0),
                        Point::new(80.0, 50.0),
                        Point::new(65.0, 90.0),
                    ]),
                )
                .unwrap(),
            ],
        )
    }

    #[test]
    fn test_valid_document_is_clean() {
        let report = validate_regions(&valid_document(), &ValidateOptions::default());
        assert!(report.is_ok_strict(), "{report}");
    }

    #[test]
    fn test_duplicate_ids() {
        let mut doc = valid_document();
        doc.regions[1].id = RegionId::new(1);
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(report.has(IssueCode::DuplicateRegionId));
    }

    #[test]
    fn test_box_problems() {
        let mut doc = valid_document();
        doc.regions[0].bounding_box = BoundingBox::new(90.0, 90.0, 20.0, 0.0);
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(report.has(IssueCode::DegenerateBBox));
        assert!(report.has(IssueCode::BBoxOutOfBounds));

        doc.regions[0].bounding_box = BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0);
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(report.has(IssueCode::BBoxNotFinite));
        assert!(!report.has(IssueCode::DegenerateBBox));
    }

    #[test]
    fn test_out_of_bounds_tolerance() {
        let mut doc = valid_document();
        doc.regions[0].bounding_box = BoundingBox::new(-0.4, 0.0, 100.8, 100.0);
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(!report.has(IssueCode::BBoxOutOfBounds));
    }

    #[test]
    fn test_polygon_problems() {
        let mut doc = valid_document();
        doc.regions[1].bounding_box = BoundingBox::new(0.0, 0.0, 5.0, 5.0);
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(report.has(IssueCode::PolygonBBoxMismatch));

        let bowtie = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ]);
        doc.regions[1] = SegmentationRegion::polygon(2, bowtie).unwrap();
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(report.has(IssueCode::PolygonSelfIntersecting));
        assert!(report.is_ok());

        let line = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        doc.regions[1].polygon = Some(line);
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(report.has(IssueCode::PolygonTooFewVertices));

        doc.regions[1].polygon = None;
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(report.has(IssueCode::RegionKindMismatch));
    }

    #[test]
    fn test_empty_and_zero_sized_document() {
        let doc = RegionDocument::new(0, 100, Vec::new());
        let report = validate_regions(&doc, &ValidateOptions::default());
        assert!(report.has(IssueCode::InvalidImageDimensions));
        assert!(report.has(IssueCode::NoRegions));
    }

    #[test]
    fn test_strict_reports_warnings_as_errors() {
        let mut doc = valid_document();
        doc.regions[0].polygon = Some(Polygon::new(vec![
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(20.0, 30.0),
        ]));

        let lenient = validate_regions(&doc, &ValidateOptions::default());
        assert!(lenient.is_ok());
        assert_eq!(lenient.warning_count(), 1);

        let strict = validate_regions(&doc, &ValidateOptions { strict: true });
        assert!(!strict.is_ok());
        assert_eq!(strict.error_count(), 1);
        assert_eq!(strict.warning_count(), 0);
        assert!(strict.has(IssueCode::RegionKindMismatch));
    }

    #[test]
    fn test_config_ranges() {
        assert!(validate_config(&EngineConfig::default()).is_ok_strict());

        let mut config = EngineConfig::default();
        config.split.tolerance = 300.0;
        config.split.merge_distance_percent = 12.0;
        config.split.min_size = -1.0;
        config.ai.timeout_ms = 0;
        config.ai.max_image_size = 0;
        let report = validate_config(&config);
        for code in [
            IssueCode::ToleranceOutOfRange,
            IssueCode::MergeDistanceOutOfRange,
            IssueCode::InvalidSizeFilter,
            IssueCode::ZeroTimeout,
            IssueCode::ZeroMaxImageSize,
        ] {
            assert!(report.has(code), "missing {code:?}");
        }
        assert_eq!(report.error_count(), 5);
    }
}
