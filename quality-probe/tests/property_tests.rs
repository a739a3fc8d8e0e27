//! Property-based tests for the probes and the profiler.
//!
//! Each property generates a small column, registers it on a fresh DataFusion
//! session, runs one operation and compares the result with a count computed
//! directly from the generated data.

use std::collections::HashMap;

use proptest::prelude::*;
use quality_probe::prelude::*;
use quality_probe::test_fixtures::{
    connected_executor, create_empty_context, register_int_column, register_text_column,
};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new().unwrap().block_on(future)
}

fn column_strategy() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::weighted(0.8, -50i64..50), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// null_count matches the generated NULLs and the percentage is rounded
    /// to two decimals, with 0 for an empty table.
    #[test]
    fn test_null_check_matches_data(values in column_strategy()) {
        let expected_nulls = values.iter().filter(|v| v.is_none()).count() as u64;
        let total = values.len() as u64;

        let result = block_on(async {
            let ctx = create_empty_context(&ConnectionConfig::default());
            register_int_column(&ctx, "t", "v", values).unwrap();
            let executor = connected_executor(ctx).await.unwrap();
            QualityProbe::new(&executor).check_nulls(&TableRef::new("t"), "v").await
        }).unwrap();

        prop_assert_eq!(result.total_rows, total);
        prop_assert_eq!(result.null_count, expected_nulls);
        if total == 0 {
            prop_assert_eq!(result.null_percentage, 0.0);
        } else {
            let exact = expected_nulls as f64 * 100.0 / total as f64;
            prop_assert!((result.null_percentage - exact).abs() <= 0.005 + 1e-9);
        }
    }

    /// The duplicate list is empty exactly when all values are distinct, and
    /// otherwise lists every repeated value with its count.
    #[test]
    fn test_duplicates_match_data(values in prop::collection::vec(0i64..15, 0..30)) {
        let mut counts: HashMap<i64, u64> = HashMap::new();
        for v in &values {
            *counts.entry(*v).or_default() += 1;
        }
        let mut expected: Vec<(i64, u64)> = counts.into_iter().filter(|(_, c)| *c > 1).collect();
        expected.sort();

        let dups = block_on(async {
            let ctx = create_empty_context(&ConnectionConfig::default());
            register_int_column(&ctx, "t", "v", values.into_iter().map(Some).collect()).unwrap();
            let executor = connected_executor(ctx).await.unwrap();
            QualityProbe::new(&executor).check_duplicates(&TableRef::new("t"), "v").await
        }).unwrap();

        prop_assert!(dups.windows(2).all(|w| w[0].count >= w[1].count));
        let mut actual: Vec<(i64, u64)> = dups
            .iter()
            .map(|d| (d.value.as_i64().unwrap(), d.count))
            .collect();
        actual.sort();
        prop_assert_eq!(actual, expected);
    }

    /// Out-of-range values are counted over non-null rows only.
    #[test]
    fn test_range_check_matches_data(
        values in column_strategy(),
        min in -60i64..60,
        width in 0i64..60,
    ) {
        let max = min + width;
        let present: Vec<i64> = values.iter().flatten().copied().collect();
        let expected_out = present.iter().filter(|v| **v < min || **v > max).count() as u64;

        let range = block_on(async {
            let ctx = create_empty_context(&ConnectionConfig::default());
            register_int_column(&ctx, "t", "v", values).unwrap();
            let executor = connected_executor(ctx).await.unwrap();
            QualityProbe::new(&executor)
                .check_value_range(&TableRef::new("t"), "v", min as f64, max as f64)
                .await
        }).unwrap();

        prop_assert_eq!(range.total_rows, present.len() as u64);
        prop_assert_eq!(range.out_of_range_count, expected_out);
    }

    /// A distribution never has more than `limit` rows and is sorted by
    /// frequency, most frequent first.
    #[test]
    fn test_distribution_is_bounded_and_sorted(
        values in prop::collection::vec("[a-e]", 1..40),
        limit in 1usize..8,
    ) {
        let distinct = {
            let mut v = values.clone();
            v.sort();
            v.dedup();
            v.len()
        };

        let dist = block_on(async {
            let ctx = create_empty_context(&ConnectionConfig::default());
            register_text_column(&ctx, "t", "v", values.iter().map(|s| Some(s.as_str())).collect()).unwrap();
            let executor = connected_executor(ctx).await.unwrap();
            Profiler::new(&executor).distribution(&TableRef::new("t"), "v", limit).await
        }).unwrap();

        prop_assert_eq!(dist.len(), limit.min(distinct));
        prop_assert!(dist.windows(2).all(|w| w[0].frequency >= w[1].frequency));
        for row in &dist {
            let exact = row.frequency as f64 * 100.0 / values.len() as f64;
            prop_assert!((row.percentage - exact).abs() <= 0.005 + 1e-9);
        }
    }

    /// Text statistics ignore NULLs.
    #[test]
    fn test_text_profile_matches_data(
        values in prop::collection::vec(prop::option::of("[a-z]{1,12}"), 1..30),
    ) {
        let present: Vec<&String> = values.iter().flatten().collect();
        let lengths: Vec<u64> = present.iter().map(|s| s.chars().count() as u64).collect();

        let profile = block_on(async {
            let ctx = create_empty_context(&ConnectionConfig::default());
            register_text_column(&ctx, "t", "v", values.iter().map(|v| v.as_deref()).collect()).unwrap();
            let executor = connected_executor(ctx).await.unwrap();
            Profiler::new(&executor).profile_text(&TableRef::new("t"), "v").await
        }).unwrap();

        prop_assert_eq!(profile.count, present.len() as u64);
        prop_assert_eq!(profile.min_length, lengths.iter().min().copied());
        prop_assert_eq!(profile.max_length, lengths.iter().max().copied());
        if lengths.is_empty() {
            prop_assert_eq!(profile.avg_length, None);
        } else {
            let mean = lengths.iter().sum::<u64>() as f64 / lengths.len() as f64;
            prop_assert!((profile.avg_length.unwrap() - mean).abs() < 1e-9);
        }
    }
}

mod identifier_properties {
    use super::*;
    use quality_probe::security::SqlSecurity;

    proptest! {
        /// Whatever passes validation is made of hyphen-joined plain words and
        /// cannot break out of quotes or open a comment.
        #[test]
        fn test_accepted_identifiers_are_plain_words(name in "\\PC{0,40}") {
            if let Ok(quoted) = SqlSecurity::quote_identifier(&name) {
                prop_assert_eq!(quoted, format!("\"{name}\""));
                prop_assert!(name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
                prop_assert!(!name.starts_with(|c: char| c.is_ascii_digit() || c == '-'));
                prop_assert!(!name.ends_with('-'));
                prop_assert!(!name.contains("--"));
            }
        }

        #[test]
        fn test_snake_case_names_are_accepted(name in "[a-z_][a-z0-9_]{0,40}") {
            prop_assert!(SqlSecurity::validate_identifier(&name).is_ok());
        }

        #[test]
        fn test_kebab_case_names_are_accepted(name in "[a-z][a-z0-9]{0,10}(-[a-z0-9]{1,10}){1,4}") {
            prop_assert!(SqlSecurity::validate_identifier(&name).is_ok());
        }
    }
}
