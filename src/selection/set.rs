//! The editable set of regions on one image, with undo/redo.

use super::history::{History, HistoryAction};
use super::region::SelectionRegion;
use crate::geometry::{BoundingBox, Point};
use crate::segment::{RegionId, SegmentationRegion};

/// All selection regions for one image.
///
/// Each successful edit snapshots the region list into the history, so
/// [`undo`](Self::undo) and [`redo`](Self::redo) restore whole states.
/// Refused edits leave both the regions and the history untouched.
#[derive(Clone, Debug)]
pub struct SelectionSet {
    regions: Vec<SelectionRegion>,
    history: History<Vec<SelectionRegion>>,
    next_id: u64,
    image_width: f64,
    image_height: f64,
}

impl SelectionSet {
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self::with_history_limit(image_width, image_height, super::history::DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(image_width: u32, image_height: u32, limit: usize) -> Self {
        Self {
            regions: Vec::new(),
            history: History::new(limit),
            next_id: 1,
            image_width: f64::from(image_width),
            image_height: f64::from(image_height),
        }
    }

    pub fn regions(&self) -> &[SelectionRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<&SelectionRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// The currently selected region, if any.
    pub fn selected(&self) -> Option<&SelectionRegion> {
        self.regions.iter().find(|r| r.is_selected)
    }

    pub fn history(&self) -> &History<Vec<SelectionRegion>> {
        &self.history
    }

    fn allocate_id(&mut self) -> RegionId {
        let id = RegionId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn commit(&mut self, action: HistoryAction, regions: Vec<SelectionRegion>) {
        let previous = std::mem::replace(&mut self.regions, regions);
        self.history.push(action, previous, self.regions.clone());
    }

    fn replace_region(&mut self, action: HistoryAction, edited: SelectionRegion) -> bool {
        let Some(index) = self.regions.iter().position(|r| r.id == edited.id) else {
            return false;
        };
        let mut next = self.regions.clone();
        next[index] = edited;
        self.commit(action, next);
        true
    }

    fn edit(
        &mut self,
        id: RegionId,
        action: HistoryAction,
        f: impl FnOnce(&SelectionRegion, f64, f64) -> Option<SelectionRegion>,
    ) -> bool {
        let Some(current) = self.get(id) else {
            return false;
        };
        match f(current, self.image_width, self.image_height) {
            Some(edited) => self.replace_region(action, edited),
            None => {
                log::debug!("refused {:?} on region {}", action, id);
                false
            }
        }
    }

    /// Adds a rectangle from a drag gesture.
    pub fn add_rectangle(&mut self, start: Point, end: Point) -> Option<RegionId> {
        let id = RegionId::new(self.next_id);
        let region =
            SelectionRegion::create_rectangle(id, start, end, self.image_width, self.image_height)?;
        self.push_new(region)
    }

    /// Adds a polygon from clicked vertices.
    pub fn add_polygon(&mut self, vertices: &[Point]) -> Option<RegionId> {
        let id = RegionId::new(self.next_id);
        let region =
            SelectionRegion::create_polygon(id, vertices, self.image_width, self.image_height)?;
        self.push_new(region)
    }

    fn push_new(&mut self, region: SelectionRegion) -> Option<RegionId> {
        let id = self.allocate_id();
        let mut next = self.regions.clone();
        next.push(region);
        self.commit(HistoryAction::Create, next);
        Some(id)
    }

    pub fn move_region(&mut self, id: RegionId, dx: f64, dy: f64) -> bool {
        self.edit(id, HistoryAction::Move, |r, w, h| Some(r.moved(dx, dy, w, h)))
    }

    pub fn resize_region(&mut self, id: RegionId, new_box: BoundingBox) -> bool {
        self.edit(id, HistoryAction::Resize, |r, w, h| r.resized(new_box, w, h))
    }

    pub fn move_vertex(&mut self, id: RegionId, index: usize, position: Point) -> bool {
        self.edit(id, HistoryAction::EditVertex, |r, w, h| {
            r.with_vertex_moved(index, position, w, h)
        })
    }

    pub fn insert_vertex(&mut self, id: RegionId, edge_index: usize, position: Point) -> bool {
        self.edit(id, HistoryAction::InsertVertex, |r, w, h| {
            r.with_vertex_inserted(edge_index, position, w, h)
        })
    }

    pub fn delete(&mut self, id: RegionId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self.regions.iter().filter(|r| r.id != id).cloned().collect();
        self.commit(HistoryAction::Delete, next);
        true
    }

    /// Marks one region as selected and every other one as not.
    ///
    /// Selection is view state and is not recorded in the history.
    pub fn select(&mut self, id: RegionId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        for region in &mut self.regions {
            region.is_selected = region.id == id;
        }
        true
    }

    pub fn clear_selection(&mut self) {
        for region in &mut self.regions {
            region.is_selected = false;
        }
    }

    /// Replaces the set with detected regions, renumbering them from the
    /// next free id. Returns the number imported.
    pub fn import(&mut self, detected: &[SegmentationRegion]) -> usize {
        let mut next = Vec::with_capacity(detected.len());
        for region in detected {
            let mut selection = SelectionRegion::from(region);
            selection.id = self.allocate_id();
            next.push(selection);
        }
        let count = next.len();
        self.commit(HistoryAction::Import, next);
        count
    }

    /// Removes every region, recording the removal so it can be undone.
    pub fn clear(&mut self) {
        if self.regions.is_empty() {
            return;
        }
        self.commit(HistoryAction::Clear, Vec::new());
    }

    /// Drops regions and history entirely, e.g. when a new image is loaded.
    pub fn reset(&mut self, image_width: u32, image_height: u32) {
        *self = Self::with_history_limit(image_width, image_height, self.history.max_entries());
    }

    /// Steps back one edit. The current selection carries over to the
    /// restored regions.
    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(state) => {
                self.restore(state);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(state) => {
                self.restore(state);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, mut state: Vec<SelectionRegion>) {
        let selected = self.selected().map(|r| r.id);
        for region in &mut state {
            region.is_selected = Some(region.id) == selected;
        }
        self.regions = state;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
