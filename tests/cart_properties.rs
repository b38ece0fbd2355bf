//! Cart, promo and pricing behaviour as seen by the storefront.
//!
//! Worked pricing examples use the storefront policy: free shipping above 75.00, otherwise 8.99,
//! and 8% tax on the subtotal.

use std::sync::{Arc, Mutex};

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use aura::prelude::*;

fn usd(minor: i64) -> Money<'static, rusty_money::iso::Currency> {
    Money::from_minor(minor, USD)
}

fn catalogue() -> [Product; 4] {
    [
        Product::new("lip-01", "Velvet Lipstick", usd(24_99)).with_brand("Aura"),
        Product::new("ser-02", "Glow Serum", usd(38_50)).with_brand("Lumen"),
        Product::new("msk-03", "Clay Mask", usd(12_00)),
        Product::new("pal-04", "Dusk Palette", usd(54_00)).with_brand("Aura"),
    ]
}

fn expected_total(cart: &Cart) -> i64 {
    cart.lines()
        .iter()
        .map(|line| line.unit_price().to_minor_units() * i64::from(line.quantity()))
        .sum()
}

/// Small deterministic generator so the operation sequence is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        (self.0 >> 33) % bound
    }
}

#[test]
fn total_tracks_lines_through_any_mutation_sequence() -> TestResult {
    let products = catalogue();
    let mut cart = Cart::new(USD);
    let mut rng = Lcg(42);

    for _ in 0..500 {
        let index = usize::try_from(rng.next(u64::try_from(products.len())?))?;
        let product = products.get(index).ok_or("index out of range")?;

        match rng.next(4) {
            0 => cart.add_one(product)?,
            1 => cart.add_item(product, u32::try_from(rng.next(5) + 1)?)?,
            2 => {
                let quantity = i64::try_from(rng.next(8))? - 2;
                cart.update_quantity(&product.id, quantity)?;
            }
            _ => cart.remove_item(&product.id),
        }

        assert_eq!(cart.total()?.to_minor_units(), expected_total(&cart));
        assert!(
            cart.lines().iter().all(|line| line.quantity() >= 1),
            "no line may hold a non-positive quantity"
        );
    }

    Ok(())
}

#[test]
fn negative_prices_never_reach_the_totals() -> TestResult {
    let rules = PricingRules::storefront(USD);
    let [lipstick, ..] = catalogue();

    for minor in [-1, -50_00, -999_999_99] {
        let mut cart = Cart::new(USD);
        cart.add_item(&lipstick, 2)?;

        let refund = Product::new("rfd-00", "Refund", usd(minor));

        assert!(matches!(
            cart.add_one(&refund),
            Err(CartError::NegativePrice(_))
        ));

        let summary = cart.pricing(&rules)?;

        assert_eq!(summary.subtotal, usd(2 * 24_99));
        assert!(summary.tax.to_minor_units() >= 0);
        assert!(summary.total.to_minor_units() >= 0);
    }

    Ok(())
}

#[test]
fn zero_and_negative_quantities_remove_the_line() -> TestResult {
    let [lipstick, serum, ..] = catalogue();

    for quantity in [0, -1] {
        let mut cart = Cart::new(USD);
        cart.add_item(&lipstick, 2)?;
        cart.add_item(&serum, 1)?;

        cart.update_quantity(&lipstick.id, quantity)?;

        assert!(cart.line(&lipstick.id).is_none());
        assert_eq!(cart.total()?, usd(38_50));
    }

    Ok(())
}

#[test]
fn promo_codes_on_a_hundred_subtotal() -> TestResult {
    let table = PromoTable::storefront(USD);
    let rules = PricingRules::storefront(USD);

    let mut cart = Cart::new(USD);
    cart.add_item(&Product::new("set-05", "Gift Set", usd(50_00)), 2)?;

    assert!(cart.apply_promo_code("SAVE20", &table).is_applied());
    assert_eq!(cart.pricing(&rules)?.discount, usd(20_00));

    assert!(cart.apply_promo_code("FREE10", &table).is_applied());
    assert_eq!(cart.pricing(&rules)?.discount, usd(10_00));

    cart.remove_promo_code();

    assert_eq!(
        cart.apply_promo_code("BADCODE", &table),
        PromoResult::Rejected
    );
    assert_eq!(cart.pricing(&rules)?.discount, usd(0));

    Ok(())
}

#[test]
fn rejected_code_keeps_existing_promo() -> TestResult {
    let table = PromoTable::storefront(USD);
    let mut cart = Cart::new(USD);

    cart.apply_promo_code("save20", &table);
    cart.apply_promo_code("NOPE", &table);

    assert_eq!(cart.applied_promo().map(|promo| promo.code.as_str()), Some("SAVE20"));

    Ok(())
}

#[test]
fn fifty_subtotal_pays_shipping() -> TestResult {
    let mut cart = Cart::new(USD);
    cart.add_item(&Product::new("msk-03", "Clay Mask", usd(25_00)), 2)?;

    let summary = cart.pricing(&PricingRules::storefront(USD))?;

    assert_eq!(summary.subtotal, usd(50_00));
    assert_eq!(summary.shipping, usd(8_99));
    assert_eq!(summary.tax, usd(4_00));
    assert_eq!(summary.total, usd(62_99));

    Ok(())
}

#[test]
fn eighty_subtotal_ships_free() -> TestResult {
    let mut cart = Cart::new(USD);
    cart.add_item(&Product::new("pal-04", "Dusk Palette", usd(40_00)), 2)?;

    let summary = cart.pricing(&PricingRules::storefront(USD))?;

    assert_eq!(summary.shipping, usd(0));
    assert_eq!(summary.tax, usd(6_40));
    assert_eq!(summary.total, usd(86_40));
    assert!(summary.has_free_shipping());

    Ok(())
}

#[test]
fn observers_see_every_mutation() -> TestResult {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let [lipstick, ..] = catalogue();

    let mut cart = Cart::new(USD);
    let sink = Arc::clone(&seen);
    cart.subscribe(move |event: &CartEvent| {
        if let Ok(mut events) = sink.lock() {
            events.push(event.clone());
        }
    });

    cart.add_one(&lipstick)?;
    cart.update_quantity(&lipstick.id, 3)?;
    cart.remove_item(&lipstick.id);

    let events = seen.lock().map(|events| events.len()).unwrap_or_default();

    assert_eq!(events, 3);

    Ok(())
}

#[test]
fn yaml_promo_table_drives_the_cart() -> TestResult {
    let table = PromoTable::from_yaml(include_str!("fixtures/promos.yaml"), USD)?;
    let rules = PricingRules::storefront(USD);

    let mut cart = Cart::new(USD);
    cart.add_item(&Product::new("ser-02", "Glow Serum", usd(40_00)), 1)?;
    cart.apply_promo_code("glow15", &table);

    let summary = cart.pricing(&rules)?;

    assert_eq!(table.len(), 3);
    assert_eq!(summary.discount, usd(6_00));
    assert_eq!(summary.tax, usd(3_20));
    assert_eq!(summary.total, usd(40_00 + 8_99 + 3_20 - 6_00));

    Ok(())
}

#[test]
fn order_summary_renders_breakdown() -> TestResult {
    let [lipstick, ..] = catalogue();
    let mut cart = Cart::new(USD);
    cart.add_item(&lipstick, 2)?;
    cart.apply_promo_code("FREE10", &PromoTable::storefront(USD));

    let rules = PricingRules::storefront(USD);
    let mut out = Vec::new();

    OrderSummary::new(&cart, &rules).write_to(&mut out)?;

    let rendered = String::from_utf8(out)?;

    assert!(rendered.contains("Velvet Lipstick"), "{rendered}");
    assert!(rendered.contains("Discount (FREE10)"), "{rendered}");
    assert!(rendered.contains("Add"), "{rendered}");

    Ok(())
}
