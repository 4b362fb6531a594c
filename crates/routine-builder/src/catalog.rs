// Product catalog: loading `products.json` and filtering by category.
//
// The catalog is a static list read once at startup. Every other component
// refers to products by `ProductId`, and all id comparisons go through the
// single numeric representation defined here.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// ProductId
// ---------------------------------------------------------------------------

/// Numeric product identifier, unique within a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl ProductId {
    /// Normalize a textual id the way a lenient integer parse does.
    ///
    /// Leading and trailing whitespace is ignored, an optional sign is
    /// accepted, and only the leading run of decimal digits is read
    /// (`"7"`, `" 7 "` and `"7px"` all yield `7`). Returns `None` when the
    /// text has no leading digits or the value does not fit in an `i64`.
    pub fn parse_lenient(text: &str) -> Option<ProductId> {
        let trimmed = text.trim();
        let sign_len = usize::from(matches!(trimmed.as_bytes().first(), Some(b'-' | b'+')));
        let digit_len = trimmed[sign_len..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digit_len == 0 {
            return None;
        }

        // Parse sign and digits together so `i64::MIN` fits.
        trimmed[..sign_len + digit_len].parse().ok().map(ProductId)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        ProductId(value)
    }
}

/// Anything that can name a product: a typed id, a raw integer, or the
/// textual key carried by a rendered control.
pub trait IntoProductId {
    fn into_product_id(self) -> Option<ProductId>;
}

impl IntoProductId for ProductId {
    fn into_product_id(self) -> Option<ProductId> {
        Some(self)
    }
}

impl IntoProductId for i64 {
    fn into_product_id(self) -> Option<ProductId> {
        Some(ProductId(self))
    }
}

impl IntoProductId for u32 {
    fn into_product_id(self) -> Option<ProductId> {
        Some(ProductId(i64::from(self)))
    }
}

impl IntoProductId for &str {
    fn into_product_id(self) -> Option<ProductId> {
        ProductId::parse_lenient(self)
    }
}

impl IntoProductId for &String {
    fn into_product_id(self) -> Option<ProductId> {
        ProductId::parse_lenient(self)
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    /// Image URL.
    pub image: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse catalog {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Wrapper matching the on-disk `{ "products": [...] }` shape.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

/// The loaded product list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// Load the catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|_| CatalogError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let catalog = Self::from_json(&text).map_err(|e| CatalogError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(
            "Loaded {} products from {}",
            catalog.products.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: CatalogFile = serde_json::from_str(text)?;
        Ok(Catalog::new(file.products))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories in first-seen catalog order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for product in &self.products {
            if !categories.iter().any(|c| *c == product.category) {
                categories.push(product.category.clone());
            }
        }
        categories
    }

    /// Products whose category matches exactly, in catalog order.
    pub fn in_category(&self, category: &str) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect()
    }

    /// Look up a product by id (numeric or textual).
    pub fn find<K: IntoProductId>(&self, key: K) -> Option<&Product> {
        let id = key.into_product_id()?;
        self.products.iter().find(|p| p.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
