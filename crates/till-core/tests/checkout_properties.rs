use proptest::prelude::*;
use till_core::{
    Checkout, DiscountType, Money, PricingRule, Product, RuleCatalog, RuleConditions, ScanOutcome,
};

const KNOWN: [&str; 4] = ["ipd", "mbp", "atv", "vga"];

fn catalog() -> Vec<Product> {
    vec![
        Product::new("ipd", "Super iPad", Money::from_cents(54999)),
        Product::new("mbp", "MacBook Pro", Money::from_cents(139999)),
        Product::new("atv", "Apple TV", Money::from_cents(10950)),
        Product::new("vga", "VGA adapter", Money::from_cents(3000)),
    ]
}

fn price_of(sku: &str) -> i64 {
    catalog()
        .into_iter()
        .find(|p| p.sku == sku)
        .map(|p| p.price_cents)
        .unwrap_or(0)
}

fn store_rules() -> Vec<PricingRule> {
    vec![
        PricingRule::new(
            "3 for 2 on Apple TV",
            DiscountType::BuyXGetY,
            RuleConditions::at_quantity(3).pay_for(2),
        )
        .for_skus(["atv"])
        .with_priority(10),
        PricingRule::new(
            "Bulk iPad",
            DiscountType::BulkDiscount,
            RuleConditions::at_quantity(5).discounted_price(Money::from_cents(49999)),
        )
        .for_skus(["ipd"])
        .with_priority(20),
    ]
}

fn run(rules: Vec<PricingRule>, basket: &[&str]) -> Checkout {
    let mut checkout = Checkout::new(catalog(), RuleCatalog::new(rules));
    for sku in basket {
        checkout.scan(sku).expect("scan must not fail for well-formed rules");
    }
    checkout
}

fn arb_basket() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(KNOWN.to_vec()), 0..40)
}

// ---------------------------------------------------------------------------
// Invariant 1: Without rules, the total is the catalog sum
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn no_rules_total_is_catalog_sum(basket in arb_basket()) {
        let checkout = run(vec![], &basket);
        let expected: i64 = basket.iter().map(|sku| price_of(sku)).sum();

        prop_assert_eq!(checkout.total().cents(), expected);
        prop_assert_eq!(checkout.total_discount(), Money::zero());
        prop_assert!(checkout.lines().all(|l| !l.has_rule()));
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Scan order across SKUs does not matter
//
// Units of one SKU are interchangeable, so any permutation of a basket
// replays the same per-SKU scan sequence.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn total_independent_of_interleaving(
        (basket, shuffled) in arb_basket().prop_flat_map(|b| {
            let original = b.clone();
            (Just(original), Just(b).prop_shuffle())
        })
    ) {
        let a = run(store_rules(), &basket);
        let b = run(store_rules(), &shuffled);
        prop_assert_eq!(a.total(), b.total());
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Totals are pure reads and discounts never go negative
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn total_is_idempotent(basket in arb_basket()) {
        let checkout = run(store_rules(), &basket);
        let first = checkout.total();
        for _ in 0..3 {
            prop_assert_eq!(checkout.total(), first);
        }
        prop_assert!(checkout.total() <= checkout.subtotal());
    }

    #[test]
    fn quantities_are_conserved(basket in arb_basket()) {
        let checkout = run(store_rules(), &basket);
        for sku in KNOWN {
            let scanned = basket.iter().filter(|s| **s == sku).count() as i64;
            prop_assert_eq!(checkout.quantity_of(sku), scanned);
        }
        let lines: i64 = checkout.lines().map(|l| l.quantity).sum();
        prop_assert_eq!(lines, basket.len() as i64);
    }

    #[test]
    fn credits_account_for_every_discount(basket in arb_basket()) {
        let checkout = run(store_rules(), &basket);
        for line in checkout.lines() {
            let credited: i64 = line.credits.iter().map(|c| c.discount_cents).sum();
            prop_assert_eq!(credited, line.discount().cents());
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: A rule never fires below its minimum quantity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn below_threshold_never_applies(min in 2i64..20, count in 1i64..20) {
        prop_assume!(count < min);
        let rule = PricingRule::new(
            "bulk",
            DiscountType::BulkDiscount,
            RuleConditions::at_quantity(min).discounted_price(Money::from_cents(1)),
        )
        .for_skus(["vga"]);

        let mut checkout = Checkout::new(catalog(), RuleCatalog::new([rule]));
        for _ in 0..count {
            prop_assert_eq!(checkout.scan("vga").unwrap(), ScanOutcome::Added);
        }
        prop_assert_eq!(checkout.total().cents(), count * 3000);
    }

    #[test]
    fn unknown_skus_change_nothing(basket in arb_basket(), noise in 1usize..10) {
        let clean = run(store_rules(), &basket);

        let mut noisy_basket = basket.clone();
        noisy_basket.extend(std::iter::repeat("not-a-sku").take(noise));
        let noisy = run(store_rules(), &noisy_basket);

        prop_assert_eq!(clean.total(), noisy.total());
        prop_assert_eq!(clean.lines().count(), noisy.lines().count());
    }
}
