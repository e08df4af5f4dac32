//! Connected-component labeling over a foreground mask.

use std::collections::VecDeque;

use crate::geometry::BoundingBox;
use crate::pixel::BinaryMask;

/// Connected components of a mask, each a list of flat pixel indices.
#[derive(Clone, Debug, Default)]
pub struct ComponentLabels {
    pub width: u32,
    pub height: u32,
    pub components: Vec<Vec<usize>>,
}

impl ComponentLabels {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Labels 4-connected foreground components with a breadth-first fill.
///
/// Each foreground pixel is visited exactly once; the visited array is flat
/// and indexed by `y * width + x`.
pub fn label_connected_regions(mask: &BinaryMask) -> ComponentLabels {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let mut visited = vec![false; mask.len()];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..mask.len() {
        if visited[start] || !mask.is_foreground(start) {
            continue;
        }

        let mut component = Vec::new();
        visited[start] = true;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            component.push(idx);
            let (x, y) = (idx % width, idx / width);

            let mut visit = |n: usize| {
                if !visited[n] && mask.is_foreground(n) {
                    visited[n] = true;
                    queue.push_back(n);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < width {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - width);
            }
            if y + 1 < height {
                visit(idx + width);
            }
        }

        components.push(component);
    }

    ComponentLabels {
        width: mask.width(),
        height: mask.height(),
        components,
    }
}

/// Tight pixel-aligned box around each component.
pub fn extract_bounding_boxes(labels: &ComponentLabels) -> Vec<BoundingBox> {
    let width = labels.width as usize;
    labels
        .components
        .iter()
        .filter(|c| !c.is_empty())
        .map(|component| {
            let (mut xmin, mut ymin) = (usize::MAX, usize::MAX);
            let (mut xmax, mut ymax) = (0usize, 0usize);
            for &idx in component {
                let (x, y) = (idx % width, idx / width);
                xmin = xmin.min(x);
                ymin = ymin.min(y);
                xmax = xmax.max(x);
                ymax = ymax.max(y);
            }
            BoundingBox::from_xyxy(
                xmin as f64,
                ymin as f64,
                (xmax + 1) as f64,
                (ymax + 1) as f64,
            )
        })
        .collect()
}
