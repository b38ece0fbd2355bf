//! Cart
//!
//! The cart is the single source of truth for what the shopper intends to buy. It is an ordinary
//! value owned by whoever creates it at session start and handed to the views and services that
//! need it; nothing here is global.
//!
//! Mutations notify subscribed [`CartObserver`]s so dependent views can refresh. Totals are never
//! cached, so they cannot drift from the lines.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::debug;

use crate::{
    pricing::{PricingError, PricingRules, PricingSummary, summarise, total_price},
    products::{Product, ProductId},
    promotions::{AppliedPromo, PromoResult, PromoTable},
};

/// Largest quantity a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Errors raised by cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The requested quantity is above [`MAX_LINE_QUANTITY`].
    #[error("Quantity {requested} for product {product_id} exceeds the limit of {limit}")]
    QuantityLimit {
        /// Product the quantity was requested for
        product_id: ProductId,

        /// Quantity that would have resulted
        requested: u64,

        /// Maximum allowed quantity
        limit: u32,
    },

    /// The product is priced in a different currency from the cart.
    #[error("Product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// The product has a negative unit price.
    #[error("Product {0} has a negative price")]
    NegativePrice(ProductId),
}

new_key_type! {
    /// Handle returned by [`Cart::subscribe`]
    pub struct SubscriptionKey;
}

/// A change made to the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// A product was added, either as a new line or onto an existing one.
    ItemAdded {
        /// Product added
        product_id: ProductId,

        /// Line quantity after the change
        quantity: u32,
    },

    /// A line's quantity was set.
    QuantityChanged {
        /// Product changed
        product_id: ProductId,

        /// New quantity
        quantity: u32,
    },

    /// A line was removed.
    ItemRemoved {
        /// Product removed
        product_id: ProductId,
    },

    /// Every line was removed.
    Cleared,

    /// A promo code was applied, replacing any earlier one.
    PromoApplied {
        /// Canonical code
        code: String,
    },

    /// The applied promo code was removed.
    PromoRemoved {
        /// Canonical code
        code: String,
    },
}

/// Receives cart change notifications.
pub trait CartObserver: Send {
    /// Called after each change to the cart.
    fn on_change(&mut self, event: &CartEvent);
}

impl<F> CartObserver for F
where
    F: FnMut(&CartEvent) + Send,
{
    fn on_change(&mut self, event: &CartEvent) {
        self(event);
    }
}

/// One product in the cart together with its quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product_id: ProductId,
    name: String,
    brand: Option<String>,
    image: String,
    unit_price: Money<'static, Currency>,
    quantity: u32,
    in_stock: bool,
}

impl CartLine {
    /// Create a line for `quantity` units of a product.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            quantity,
            in_stock: product.in_stock,
        }
    }

    /// Product identifier
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Brand, if any
    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    /// Image URL
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Price of a single unit
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether the product was in stock when added
    pub fn in_stock(&self) -> bool {
        self.in_stock
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::LineOverflow`] if the product does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'static, Currency>, PricingError> {
        self.unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .map(|minor| Money::from_minor(minor, self.unit_price.currency()))
            .ok_or_else(|| PricingError::LineOverflow(self.product_id.clone()))
    }
}

/// Shopping cart
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
    promo: Option<AppliedPromo>,
    observers: SlotMap<SubscriptionKey, Box<dyn CartObserver>>,
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("lines", &self.lines)
            .field("currency", &self.currency.iso_alpha_code)
            .field("promo", &self.promo)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
            promo: None,
            observers: SlotMap::with_key(),
        }
    }

    /// Add a single unit of a product.
    ///
    /// # Errors
    ///
    /// See [`Cart::add_item`].
    pub fn add_one(&mut self, product: &Product) -> Result<(), CartError> {
        self.add_item(product, 1)
    }

    /// Add `quantity` units of a product.
    ///
    /// Adding a product that is already in the cart increases that line's quantity. Adding zero
    /// units changes nothing.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the product is not priced in the cart's currency.
    /// - [`CartError::NegativePrice`]: the product's unit price is below zero.
    /// - [`CartError::QuantityLimit`]: the line would hold more than [`MAX_LINE_QUANTITY`].
    ///
    /// The cart is unchanged when an error is returned.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.id.clone(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if product.price.to_minor_units() < 0 {
            return Err(CartError::NegativePrice(product.id.clone()));
        }

        if quantity == 0 {
            return Ok(());
        }

        let existing = self.lines.iter().position(|line| line.product_id == product.id);
        let current = existing
            .and_then(|index| self.lines.get(index))
            .map_or(0, CartLine::quantity);

        let requested = u64::from(current) + u64::from(quantity);
        let new_quantity = checked_quantity(&product.id, requested)?;

        match existing.and_then(|index| self.lines.get_mut(index)) {
            Some(line) => line.quantity = new_quantity,
            None => self.lines.push(CartLine::from_product(product, new_quantity)),
        }

        debug!(product_id = %product.id, quantity = new_quantity, "cart item added");

        self.notify(&CartEvent::ItemAdded {
            product_id: product.id.clone(),
            quantity: new_quantity,
        });

        Ok(())
    }

    /// Set the quantity of a line.
    ///
    /// A quantity of zero or less removes the line. Unknown products are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityLimit`] if `quantity` is above [`MAX_LINE_QUANTITY`]. The
    /// line keeps its previous quantity.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }

        let new_quantity = checked_quantity(product_id, quantity.unsigned_abs())?;

        let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
        else {
            return Ok(());
        };

        if line.quantity == new_quantity {
            return Ok(());
        }

        line.quantity = new_quantity;

        debug!(%product_id, quantity = new_quantity, "cart quantity changed");

        self.notify(&CartEvent::QuantityChanged {
            product_id: product_id.clone(),
            quantity: new_quantity,
        });

        Ok(())
    }

    /// Remove a line. Removing a product that is not in the cart does nothing.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        let before = self.lines.len();

        self.lines.retain(|line| &line.product_id != product_id);

        if self.lines.len() != before {
            debug!(%product_id, "cart item removed");

            self.notify(&CartEvent::ItemRemoved {
                product_id: product_id.clone(),
            });
        }
    }

    /// Remove every line. Clearing an empty cart does nothing.
    pub fn clear(&mut self) {
        if self.lines.is_empty() {
            return;
        }

        self.lines.clear();

        debug!("cart cleared");

        self.notify(&CartEvent::Cleared);
    }

    /// Sum of unit price times quantity over every line.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn total(&self) -> Result<Money<'static, Currency>, PricingError> {
        total_price(&self.lines, self.currency)
    }

    /// Total number of units across every line.
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for a product.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency every line is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Evaluate a promo code and apply it if it is valid.
    ///
    /// A valid code replaces any promo already applied. An invalid code leaves the current promo
    /// in place; removing a promo is always an explicit [`Cart::remove_promo_code`].
    pub fn apply_promo_code(&mut self, code: &str, table: &PromoTable) -> PromoResult {
        let result = table.evaluate(code);

        if let PromoResult::Applied(promo) = &result {
            debug!(code = %promo.code, "promo applied");

            self.promo = Some(promo.clone());

            self.notify(&CartEvent::PromoApplied {
                code: promo.code.clone(),
            });
        }

        result
    }

    /// Remove the applied promo, returning it.
    pub fn remove_promo_code(&mut self) -> Option<AppliedPromo> {
        let removed = self.promo.take();

        if let Some(promo) = &removed {
            self.notify(&CartEvent::PromoRemoved {
                code: promo.code.clone(),
            });
        }

        removed
    }

    /// The currently applied promo.
    pub fn applied_promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    /// Price the cart under the given rules.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced under `rules`.
    pub fn pricing(&self, rules: &PricingRules) -> Result<PricingSummary, PricingError> {
        summarise(&self.lines, self.promo.as_ref(), rules)
    }

    /// Register an observer for cart changes.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) -> SubscriptionKey {
        self.observers.insert(Box::new(observer))
    }

    /// Stop notifying an observer. Returns `false` if the key was not subscribed.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.observers.remove(key).is_some()
    }

    fn notify(&mut self, event: &CartEvent) {
        for observer in self.observers.values_mut() {
            observer.on_change(event);
        }
    }
}

fn checked_quantity(product_id: &ProductId, requested: u64) -> Result<u32, CartError> {
    u32::try_from(requested)
        .ok()
        .filter(|quantity| *quantity <= MAX_LINE_QUANTITY)
        .ok_or_else(|| CartError::QuantityLimit {
            product_id: product_id.clone(),
            requested,
            limit: MAX_LINE_QUANTITY,
        })
}
