// Selected-items panel: projection of the selection store into rows with
// removal controls.
//
// Every render pass stamps its controls with a new generation. Only controls
// from the current generation act on the store, so a control left over from
// an earlier render can never fire twice or remove the wrong entry.

use tracing::debug;

use crate::catalog::{Product, ProductId};
use crate::selection::SelectionStore;

pub const NO_SELECTION_MESSAGE: &str = "No products selected";

/// Removal control bound to one row of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveControl {
    /// Product id as rendered text.
    pub key: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRow {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub remove: RemoveControl,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectedPanel {
    Placeholder(&'static str),
    Rows(Vec<SelectedRow>),
}

impl Default for SelectedPanel {
    fn default() -> Self {
        SelectedPanel::Placeholder(NO_SELECTION_MESSAGE)
    }
}

impl SelectedPanel {
    pub fn rows(&self) -> &[SelectedRow] {
        match self {
            SelectedPanel::Placeholder(_) => &[],
            SelectedPanel::Rows(rows) => rows,
        }
    }
}

/// Project `entries` into panel content, in store order.
pub fn render(entries: &[Product], generation: u64) -> SelectedPanel {
    if entries.is_empty() {
        return SelectedPanel::Placeholder(NO_SELECTION_MESSAGE);
    }
    SelectedPanel::Rows(
        entries
            .iter()
            .map(|p| SelectedRow {
                id: p.id,
                name: p.name.clone(),
                brand: p.brand.clone(),
                remove: RemoveControl {
                    key: p.id.to_string(),
                    generation,
                },
            })
            .collect(),
    )
}

/// Owns the current panel content and its control generation.
#[derive(Debug, Clone)]
pub struct SelectedPanelBinder {
    generation: u64,
    panel: SelectedPanel,
}

impl Default for SelectedPanelBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectedPanelBinder {
    pub fn new() -> Self {
        SelectedPanelBinder {
            generation: 0,
            panel: SelectedPanel::default(),
        }
    }

    /// Re-render from the store and replace every previously bound control.
    pub fn refresh(&mut self, store: &SelectionStore) {
        self.generation += 1;
        self.panel = render(store.list(), self.generation);
    }

    pub fn panel(&self) -> &SelectedPanel {
        &self.panel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Controls bound in the current generation.
    pub fn controls(&self) -> impl Iterator<Item = &RemoveControl> {
        self.panel.rows().iter().map(|r| &r.remove)
    }

    /// Handle a click on `control`. Stale controls are ignored. Returns
    /// `true` when the store changed.
    pub fn click_remove(&mut self, control: &RemoveControl, store: &mut SelectionStore) -> bool {
        if control.generation != self.generation {
            debug!(
                "Ignoring stale remove control for {} (generation {} != {})",
                control.key, control.generation, self.generation
            );
            return false;
        }
        let removed = store.remove(&control.key);
        self.refresh(store);
        removed
    }
}
