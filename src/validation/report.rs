//! Validation report types for structured error reporting.
//!
//! Reports can be printed for people (`Display`) or serialized as JSON for
//! scripts.

use std::fmt;

use serde::Serialize;

/// The result of validating a config or a region document.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all (strict mode).
    pub fn is_ok_strict(&self) -> bool {
        self.issues.is_empty()
    }

    /// Turns every warning into an error.
    pub fn escalate_warnings(&mut self) {
        for issue in &mut self.issues {
            issue.severity = Severity::Error;
        }
    }

    /// True if any issue carries `code`.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    pub message: String,

    /// Where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but usable.
    Warning,
    /// Invalid; the CLI refuses to continue.
    Error,
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    // Config issues
    /// A color tolerance outside 0-255.
    ToleranceOutOfRange,
    /// Merge distance outside 0-10 %.
    MergeDistanceOutOfRange,
    /// A negative or non-finite size filter.
    InvalidSizeFilter,
    /// AI timeout of zero.
    ZeroTimeout,
    /// AI upload cap of zero bytes.
    ZeroMaxImageSize,

    // Document issues
    /// The recorded image size has a zero side.
    InvalidImageDimensions,
    /// The document has no regions at all.
    NoRegions,

    // Region issues
    DuplicateRegionId,
    /// A bounding box has NaN or infinite components.
    BBoxNotFinite,
    /// A bounding box has zero or negative extent.
    DegenerateBBox,
    /// A bounding box extends outside the image.
    BBoxOutOfBounds,
    /// `type` disagrees with whether a polygon is present.
    RegionKindMismatch,
    PolygonTooFewVertices,
    PolygonSelfIntersecting,
    /// The bounding box is not the tight bound of the polygon.
    PolygonBBoxMismatch,
    ConfidenceOutOfRange,
}

/// Where a validation issue occurred.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum IssueContext {
    /// The document as a whole.
    Document,
    /// One config field, as written in YAML.
    Config { field: &'static str },
    Region { id: u64 },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Document => write!(f, "document"),
            IssueContext::Config { field } => write!(f, "config field '{}'", field),
            IssueContext::Region { id } => write!(f, "region {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_display() {
        let mut report = ValidationReport::new();
        assert!(report.is_ok_strict());
        assert!(report.to_string().contains("no issues"));

        report.add(ValidationIssue::error(
            IssueCode::DegenerateBBox,
            "zero width",
            IssueContext::Region { id: 3 },
        ));
        report.add(ValidationIssue::warning(
            IssueCode::NoRegions,
            "empty",
            IssueContext::Document,
        ));
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(!report.is_ok());
        assert!(report.has(IssueCode::NoRegions));

        let text = report.to_string();
        assert!(text.contains("[ERROR] DegenerateBBox in region 3: zero width"));
    }

    #[test]
    fn test_json_shape() {
        let issue = ValidationIssue::warning(
            IssueCode::ToleranceOutOfRange,
            "too high",
            IssueContext::Config { field: "split.tolerance" },
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["code"], "tolerance_out_of_range");
        assert_eq!(json["context"]["scope"], "config");
        assert_eq!(json["context"]["field"], "split.tolerance");
    }
}
