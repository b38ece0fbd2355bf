//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Catalogue identifier for a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Product
#[derive(Debug, Clone)]
pub struct Product {
    /// Catalogue identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Brand, when the catalogue lists one
    pub brand: Option<String>,

    /// Image URL
    pub image: String,

    /// Unit price
    pub price: Money<'static, Currency>,

    /// Whether the product can currently be ordered
    pub in_stock: bool,
}

impl Product {
    /// Create an in-stock product with no brand or image.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money<'static, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: None,
            image: String::new(),
            price,
            in_stock: true,
        }
    }

    /// Set the brand.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Mark the product as out of stock.
    #[must_use]
    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;

    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let product = Product::new("lip-01", "Velvet Lipstick", Money::from_minor(1299, iso::USD))
            .with_brand("Aura")
            .with_image("https://cdn.example/lip-01.png")
            .out_of_stock();

        assert_eq!(product.id.as_str(), "lip-01");
        assert_eq!(product.brand.as_deref(), Some("Aura"));
        assert_eq!(product.image, "https://cdn.example/lip-01.png");
        assert!(!product.in_stock);
    }

    #[test]
    fn product_id_displays_raw_value() {
        assert_eq!(ProductId::from("serum-9").to_string(), "serum-9");
    }
}
