//! Property-based tests for core types.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::types::{
        Discount, Money, Page, PageRequest, Priority, RatingSummary, VendorId,
    };
    use proptest::prelude::*;
    use uuid::Uuid;

    proptest! {
        #[test]
        fn test_vendor_id_display_parse_roundtrip(uuid in any::<u128>()) {
            let id = VendorId::from_uuid(Uuid::from_u128(uuid));
            let parsed: VendorId = id.to_string().parse().unwrap();
            prop_assert_eq!(id, parsed);
        }

        #[test]
        fn test_discount_never_exceeds_amount(
            amount in 0u64..10_000_000,
            percent in 1u8..=100,
            flat in 1u64..10_000_000,
        ) {
            let amount = Money::from_minor(amount);
            let pct = Discount::Percentage { percent, max_discount: None };
            let flat = Discount::Flat { amount: Money::from_minor(flat) };
            prop_assert!(pct.apply(amount) <= amount);
            prop_assert!(flat.apply(amount) <= amount);
        }

        #[test]
        fn test_page_never_exceeds_limit(total in 0usize..500, page in 0u32..40, limit in 0u32..200) {
            let request = PageRequest::new(page, limit);
            let result = Page::from_sorted(0..total, request);
            prop_assert!(result.items.len() <= request.limit as usize);
            prop_assert_eq!(result.total, total);
        }

        #[test]
        fn test_raised_priority_is_monotonic(levels in 0u32..10) {
            for p in Priority::ALL {
                prop_assert!(p.raised(levels) >= p);
                prop_assert!(p.raised(levels + 1) >= p.raised(levels));
            }
        }

        #[test]
        fn test_rating_add_then_remove_restores(
            existing in proptest::collection::vec(1u8..=5, 0..20),
            extra in 1u8..=5,
        ) {
            let mut summary = RatingSummary::default();
            for stars in &existing {
                summary.add(*stars);
            }
            let before = summary;
            summary.add(extra);
            summary.remove(extra);
            prop_assert_eq!(summary.count, before.count);
            prop_assert_eq!(summary.total_stars, before.total_stars);
        }
    }
}
