//! Monthly settlement arithmetic: market scaling, inventory capping and the
//! per-store split of capped sales.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::StoreSales;

/// Scale units (truncated) and revenue by the market multiplier.
pub fn apply_market(units: u64, revenue: Decimal, multiplier: Decimal) -> (u64, Decimal) {
    let m = multiplier.max(Decimal::ZERO);
    let scaled = (Decimal::from(units) * m).floor().to_u64().unwrap_or(0);
    (scaled, revenue * m)
}

/// Sales and revenue after capping at the goods available this month.
#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    pub sold: u64,
    /// Revenue rounded to cents.
    pub revenue: Decimal,
    pub store_sales: Vec<StoreSales>,
}

/// Cap `units` at `available`, rescale revenue by the capped share and split
/// the sold units across stores in proportion to their demand.
pub fn settle(
    units: u64,
    revenue: Decimal,
    available: u64,
    store_demand: &[StoreSales],
) -> Settlement {
    let sold = units.min(available);
    let revenue = if units == 0 {
        Decimal::ZERO
    } else if sold == units {
        revenue
    } else {
        revenue * Decimal::from(sold) / Decimal::from(units)
    };
    let revenue = revenue.round_dp(2).max(Decimal::ZERO);
    Settlement {
        sold,
        revenue,
        store_sales: rescale_store_sales(store_demand, sold),
    }
}

/// Distribute `target` units across stores proportionally to `raw`, using
/// largest remainders so the parts sum to `target` exactly. Ties go to the
/// earlier store.
pub fn rescale_store_sales(raw: &[StoreSales], target: u64) -> Vec<StoreSales> {
    let total = u128::from(StoreSales::total(raw));
    if total == 0 {
        return raw
            .iter()
            .map(|s| StoreSales {
                store: s.store,
                sales: 0,
            })
            .collect();
    }
    let target_wide = u128::from(target);
    let mut parts: Vec<(u64, u128)> = raw
        .iter()
        .map(|s| {
            let num = u128::from(s.sales) * target_wide;
            ((num / total) as u64, num % total)
        })
        .collect();
    let assigned: u64 = parts.iter().map(|p| p.0).sum();
    let mut order: Vec<usize> = (0..parts.len()).collect();
    order.sort_by(|&a, &b| parts[b].1.cmp(&parts[a].1).then(a.cmp(&b)));
    for &i in order.iter().take(target.saturating_sub(assigned) as usize) {
        parts[i].0 += 1;
    }
    raw.iter()
        .zip(parts)
        .map(|(s, (sales, _))| StoreSales {
            store: s.store,
            sales,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::StoreId;

    fn stores(sales: [u64; 5]) -> Vec<StoreSales> {
        StoreId::ALL
            .iter()
            .zip(sales)
            .map(|(&store, sales)| StoreSales { store, sales })
            .collect()
    }

    #[test]
    fn market_multiplier_scales_both() {
        let (u, r) = apply_market(101, Decimal::new(32825, 2), Decimal::new(90, 2));
        assert_eq!(u, 90);
        assert_eq!(r, Decimal::new(295425, 3));
        assert_eq!(apply_market(10, Decimal::TEN, Decimal::new(-5, 1)), (0, Decimal::ZERO));
    }

    #[test]
    fn capping_rescales_revenue() {
        let s = settle(200, Decimal::new(650, 0), 50, &stores([100, 50, 50, 0, 0]));
        assert_eq!(s.sold, 50);
        assert_eq!(s.revenue, Decimal::new(16250, 2));
        assert_eq!(s.store_sales, stores([25, 13, 12, 0, 0]));
    }

    #[test]
    fn uncapped_sales_keep_revenue() {
        let s = settle(12, Decimal::new(39, 0), 1000, &stores([6, 6, 0, 0, 0]));
        assert_eq!(s.sold, 12);
        assert_eq!(s.revenue, Decimal::new(39, 0));
        assert_eq!(s.store_sales, stores([6, 6, 0, 0, 0]));
    }

    #[test]
    fn zero_sales_zero_revenue() {
        let s = settle(0, Decimal::new(3, 0), 10, &stores([0; 5]));
        assert_eq!(s.sold, 0);
        assert_eq!(s.revenue, Decimal::ZERO);
        assert_eq!(StoreSales::total(&s.store_sales), 0);
    }

    #[test]
    fn market_boost_spreads_extra_units() {
        let out = rescale_store_sales(&stores([3, 3, 3, 0, 1]), 12);
        assert_eq!(StoreSales::total(&out), 12);
        assert_eq!(out, stores([4, 4, 3, 0, 1]));
    }

    proptest! {
        #[test]
        fn rescaled_parts_sum_to_target(
            raw in proptest::array::uniform5(0u64..10_000),
            frac in 0.0f64..2.0,
        ) {
            let raw = stores(raw);
            let total = StoreSales::total(&raw);
            let target = if total == 0 { 0 } else { (total as f64 * frac) as u64 };
            let out = rescale_store_sales(&raw, target);
            prop_assert_eq!(StoreSales::total(&out), target);
            for (o, r) in out.iter().zip(&raw) {
                prop_assert_eq!(o.store, r.store);
                if r.sales == 0 {
                    prop_assert_eq!(o.sales, 0);
                }
            }
        }

        #[test]
        fn settled_sales_never_exceed_available(
            units in 0u64..100_000,
            available in 0u64..100_000,
            cents in 0i64..10_000_000,
        ) {
            let s = settle(units, Decimal::new(cents, 2), available, &stores([units, 0, 0, 0, 0]));
            prop_assert!(s.sold <= available);
            prop_assert!(s.revenue >= Decimal::ZERO);
            prop_assert_eq!(StoreSales::total(&s.store_sales), s.sold);
        }
    }
}
