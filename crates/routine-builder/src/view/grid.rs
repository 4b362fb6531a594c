// Card grid: the products of one category as selectable cards.

use tracing::{debug, warn};

use crate::catalog::{Catalog, Product, ProductId};
use crate::selection::{SelectionStore, Toggle};

pub const CHOOSE_CATEGORY_MESSAGE: &str = "Select a category to view products";
pub const EMPTY_CATEGORY_MESSAGE: &str = "No products in this category";

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    /// Lookup key carried by the card: the product id as text.
    pub key: String,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub image: String,
    pub selected: bool,
}

/// One card per product, in the order given.
pub fn render(products: &[Product], selected: &[Product]) -> Vec<ProductCard> {
    let mut cards: Vec<ProductCard> = products
        .iter()
        .map(|p| ProductCard {
            key: p.id.to_string(),
            name: p.name.clone(),
            brand: p.brand.clone(),
            description: p.description.clone(),
            image: p.image.clone(),
            selected: false,
        })
        .collect();
    restore_visual_state(&mut cards, selected);
    cards
}

/// Recompute every card's `selected` flag from the selection.
pub fn restore_visual_state(cards: &mut [ProductCard], selected: &[Product]) {
    for card in cards.iter_mut() {
        card.selected = ProductId::parse_lenient(&card.key)
            .is_some_and(|id| selected.iter().any(|p| p.id == id));
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardGrid {
    category: Option<String>,
    products: Vec<Product>,
    cards: Vec<ProductCard>,
}

impl CardGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the grid with the products of `category`.
    pub fn show_category(&mut self, catalog: &Catalog, category: &str, store: &SelectionStore) {
        self.products = catalog.in_category(category);
        self.cards = render(&self.products, store.list());
        self.category = Some(category.to_string());
        debug!("Showing {} cards for '{}'", self.cards.len(), category);
    }

    /// Toggle the product behind the card keyed `key`. Returns `None` when
    /// the key names no product on the grid.
    pub fn click(&mut self, key: &str, store: &mut SelectionStore) -> Option<Toggle> {
        let Some(id) = ProductId::parse_lenient(key) else {
            warn!("Card click with unparseable key '{}'", key);
            return None;
        };
        let Some(product) = self.products.iter().find(|p| p.id == id).cloned() else {
            warn!("Card click for unknown product {}", id);
            return None;
        };

        let outcome = store.toggle(product);
        let selected = outcome == Toggle::Added;
        for card in self
            .cards
            .iter_mut()
            .filter(|c| ProductId::parse_lenient(&c.key) == Some(id))
        {
            card.selected = selected;
        }
        Some(outcome)
    }

    /// Re-apply selection flags after the store changed elsewhere.
    pub fn sync_selection(&mut self, store: &SelectionStore) {
        restore_visual_state(&mut self.cards, store.list());
    }

    pub fn cards(&self) -> &[ProductCard] {
        &self.cards
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Message shown in place of cards, if any.
    pub fn placeholder(&self) -> Option<&'static str> {
        match &self.category {
            None => Some(CHOOSE_CATEGORY_MESSAGE),
            Some(_) if self.cards.is_empty() => Some(EMPTY_CATEGORY_MESSAGE),
            Some(_) => None,
        }
    }
}
