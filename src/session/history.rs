//! Linear undo/redo log of committed layers

use crate::domain::Layer;

/// Committed layers plus a cursor separating done from undone entries
///
/// Only the first `visible` layers are drawn. Committing while some layers
/// are undone drops them for good; there is no branching history.
#[derive(Clone, Debug)]
pub struct History {
    layers: Vec<Layer>,
    visible: usize,
    next_step: u32,
}

impl Default for History {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            visible: 0,
            next_step: 1,
        }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `layer`, discarding any redo entries
    pub fn commit(&mut self, layer: Layer) {
        self.layers.truncate(self.visible);
        log::debug!("Committing {} layer at index {}", layer.kind(), self.visible);
        self.layers.push(layer);
        self.visible = self.layers.len();
    }

    pub fn undo(&mut self) {
        if self.visible > 0 {
            self.visible -= 1;
        }
    }

    pub fn redo(&mut self) {
        if self.visible < self.layers.len() {
            self.visible += 1;
        }
    }

    /// Drop every layer and restart step numbering at 1
    pub fn clear(&mut self) {
        self.layers.clear();
        self.visible = 0;
        self.next_step = 1;
    }

    /// Layers up to the cursor, in commit order
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers[..self.visible].iter()
    }

    /// Cursor as an index in `[-1, len - 1]`, -1 meaning nothing is visible
    pub fn history_index(&self) -> isize {
        self.visible as isize - 1
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.visible > 0
    }

    pub fn can_redo(&self) -> bool {
        self.visible < self.layers.len()
    }

    /// Number for the next step marker; undo does not rewind it
    pub fn peek_step(&self) -> u32 {
        self.next_step
    }

    /// Hand out the next step number and advance the counter
    pub fn take_step(&mut self) -> u32 {
        let n = self.next_step;
        self.next_step += 1;
        n
    }

    /// Rewrite every layer through `f`, dropping those it rejects
    ///
    /// The cursor keeps pointing just past the last surviving visible layer,
    /// so undone layers stay undone.
    pub fn rebase(&mut self, mut f: impl FnMut(&mut Layer) -> bool) {
        let mut visible = 0;
        let mut kept = Vec::with_capacity(self.layers.len());
        for (index, mut layer) in self.layers.drain(..).enumerate() {
            if f(&mut layer) {
                if index < self.visible {
                    visible += 1;
                }
                kept.push(layer);
            }
        }
        self.layers = kept;
        self.visible = visible;
    }
}
