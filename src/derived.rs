//! Values computed from stored airline fields at read time.

use crate::country::country_name;
use serde::Serialize;
use utoipa::ToSchema;

/// A hiring region code with its resolved display name (or the code itself when unknown).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegionName {
    pub code: String,
    pub name: String,
}

/// Comma-separated text to trimmed, non-empty tokens.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn hiring_regions_with_names(text: &str) -> Vec<RegionName> {
    split_list(text)
        .into_iter()
        .map(|code| RegionName {
            name: country_name(&code),
            code,
        })
        .collect()
}

/// Mean overall rating rounded to one decimal; `None` when there is nothing to average.
pub fn average_rating<I>(ratings: I) -> Option<f64>
where
    I: IntoIterator<Item = i32>,
{
    let (sum, n) = ratings
        .into_iter()
        .fold((0i64, 0u32), |(sum, n), r| (sum + i64::from(r), n + 1));
    if n == 0 {
        return None;
    }
    let mean = sum as f64 / f64::from(n);
    Some((mean * 10.0).round() / 10.0)
}

pub fn review_count<T>(reviews: &[T]) -> usize {
    reviews.len()
}
