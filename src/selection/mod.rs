//! Manual selection: user-drawn rectangles and polygons with undo/redo.

mod history;
mod region;
mod set;

pub use history::{History, HistoryAction, HistoryEntry, DEFAULT_HISTORY_LIMIT};
pub use region::{validate_polygon, PolygonIssue, PolygonValidation, SelectionRegion};
pub use set::SelectionSet;
