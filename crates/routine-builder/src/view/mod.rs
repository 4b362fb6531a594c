// View models derived from selection and catalog state.
//
// These projections are pure data: the terminal widgets draw them, and the
// app loop routes user intents back through the binders.

pub mod grid;
pub mod selected;

pub use grid::{CardGrid, ProductCard, CHOOSE_CATEGORY_MESSAGE, EMPTY_CATEGORY_MESSAGE};
pub use selected::{
    RemoveControl, SelectedPanel, SelectedPanelBinder, SelectedRow, NO_SELECTION_MESSAGE,
};
