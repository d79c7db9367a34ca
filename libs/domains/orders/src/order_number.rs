//! Order numbers: `CMD-YYMMDD-NNNNN`.
//!
//! The date is the order's creation date in UTC and the suffix is drawn
//! uniformly from `10000..=99999`, giving 90,000 numbers per day.
//!
//! Order creation does not check for collisions before saving. The unique
//! index on `order_number` rejects a duplicate, and the service draws a new
//! number and saves again, at most [`MAX_SAVE_ATTEMPTS`] times in total.
//! [`generate_unique_order_number`] is the query-first variant for callers
//! that assign numbers outside the insert path, such as the backfill.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use std::future::Future;
use std::ops::RangeInclusive;

use crate::error::{OrderError, OrderResult};

pub const ORDER_NUMBER_PREFIX: &str = "CMD";

/// Inserts tried before order creation gives up
pub const MAX_SAVE_ATTEMPTS: u32 = 5;

/// Candidates checked by [`generate_unique_order_number`]
pub const MAX_PRECHECK_ATTEMPTS: u32 = 100;

const SUFFIX_RANGE: RangeInclusive<u32> = 10_000..=99_999;

/// A random order number for an order created at `at`
pub fn generate_order_number(at: DateTime<Utc>) -> String {
    let suffix = rand::rng().random_range(SUFFIX_RANGE);
    format!("{ORDER_NUMBER_PREFIX}-{}-{suffix}", at.format("%y%m%d"))
}

/// Creation date embedded in an order number
pub fn order_number_date(number: &str) -> Option<NaiveDate> {
    let mut parts = number.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let well_formed = prefix == ORDER_NUMBER_PREFIX
        && date.len() == 6
        && date.bytes().all(|b| b.is_ascii_digit())
        && (4..=5).contains(&suffix.len())
        && suffix.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return None;
    }

    NaiveDate::parse_from_str(date, "%y%m%d").ok()
}

pub fn is_order_number(number: &str) -> bool {
    order_number_date(number).is_some()
}

/// Draw numbers until `exists` reports one as free.
///
/// Fails with [`OrderError::OrderNumberExhausted`] after
/// [`MAX_PRECHECK_ATTEMPTS`] taken candidates. The check and the later write
/// are not atomic; the unique index still has the final word.
pub async fn generate_unique_order_number<F, Fut>(
    at: DateTime<Utc>,
    mut exists: F,
) -> OrderResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = OrderResult<bool>>,
{
    for attempt in 1..=MAX_PRECHECK_ATTEMPTS {
        let candidate = generate_order_number(at);
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        tracing::debug!(attempt, %candidate, "Order number taken");
    }
    Err(OrderError::OrderNumberExhausted(MAX_PRECHECK_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_format_and_embedded_date() {
        let pattern = Regex::new(r"^CMD-\d{6}-\d{4,5}$").unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 23, 59, 59).unwrap();

        for _ in 0..500 {
            let number = generate_order_number(at);
            assert!(pattern.is_match(&number), "{number}");
            assert!(number.starts_with("CMD-250307-"));
            assert_eq!(order_number_date(&number), Some(at.date_naive()));

            let suffix: u32 = number[11..].parse().unwrap();
            assert!(SUFFIX_RANGE.contains(&suffix));
        }
    }

    #[test]
    fn test_date_is_utc() {
        // 23:30 UTC is already the next day east of Greenwich
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
        assert!(generate_order_number(at).starts_with("CMD-241231-"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(is_order_number("CMD-250307-12345"));
        assert!(is_order_number("CMD-250307-1234"));
        assert!(!is_order_number("ORD-250307-12345"));
        assert!(!is_order_number("CMD-251307-12345"));
        assert!(!is_order_number("CMD-250307-123"));
        assert!(!is_order_number("CMD-250307-12345-1"));
        assert!(!is_order_number(""));
    }

    #[test]
    fn test_numbers_spread_over_the_range() {
        let at = Utc::now();
        let drawn: HashSet<String> = (0..200).map(|_| generate_order_number(at)).collect();
        // 200 draws from 90,000 values; a handful of collisions at most
        assert!(drawn.len() > 190);
    }

    #[tokio::test]
    async fn test_precheck_skips_taken_numbers() {
        let calls = AtomicU32::new(0);
        let number = generate_unique_order_number(Utc::now(), |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n < 3) }
        })
        .await
        .unwrap();

        assert!(is_order_number(&number));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_precheck_gives_up_after_bound() {
        let calls = AtomicU32::new(0);
        let result = generate_unique_order_number(Utc::now(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(true) }
        })
        .await;

        assert!(matches!(
            result,
            Err(OrderError::OrderNumberExhausted(MAX_PRECHECK_ATTEMPTS))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_PRECHECK_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_precheck_propagates_lookup_errors() {
        let result = generate_unique_order_number(Utc::now(), |_| async {
            Err(OrderError::Database("connection reset".to_string()))
        })
        .await;

        assert!(matches!(result, Err(OrderError::Database(_))));
    }
}
