//! In-memory aggregation toolkit.
//!
//! Analyses are written as ordinary sequence operations over a slice of
//! survey records: filter, explode delimited fields into rows, group by a
//! key while folding reducers, then sort and keep the top entries. The
//! helpers here are the shared building blocks.

use crate::models::SurveyRecord;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Separator used by every multi-valued survey answer.
pub const LIST_DELIMITER: char = ';';

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("integer pattern is valid"));

/// A declarative analysis that runs over a collection snapshot.
pub trait Pipeline {
    /// One result document.
    type Output: Serialize;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Run the pipeline over every record of the snapshot.
    fn execute(&self, records: &[SurveyRecord]) -> Vec<Self::Output>;
}

/// Split a multi-valued answer into its elements.
///
/// Empty segments are kept so a trailing delimiter still yields a row.
pub fn explode(value: &str) -> impl Iterator<Item = &str> {
    value.split(LIST_DELIMITER)
}

/// Number of elements in a multi-valued answer.
///
/// An unanswered field still holds the single `NA` element.
pub fn element_count(value: Option<&str>) -> usize {
    value.map_or(1, |v| explode(v).count())
}

/// True when `haystack` contains any of the needles.
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// The first run of ASCII digits in free text, as an integer.
pub fn first_integer(text: &str) -> Option<u64> {
    INTEGER.find(text).and_then(|m| m.as_str().parse().ok())
}

/// The largest integer in free text, ignoring thousands separators.
pub fn largest_integer(text: &str) -> Option<u64> {
    let compact = text.replace(',', "");
    INTEGER
        .find_iter(&compact)
        .filter_map(|m| m.as_str().parse().ok())
        .max()
}

/// Running arithmetic mean that ignores missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mean {
    sum: f64,
    samples: u64,
}

impl Mean {
    pub fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.samples += 1;
        }
    }

    /// The mean, or `None` when nothing numeric was pushed.
    pub fn value(&self) -> Option<f64> {
        if self.samples == 0 {
            None
        } else {
            Some(self.sum / self.samples as f64)
        }
    }

    #[cfg(test)]
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

/// Group items by key, folding each item into its group's accumulator.
///
/// Groups come back ordered by key, which keeps every downstream stage
/// deterministic.
pub fn group_by<I, K, A, F, G>(items: I, mut key: F, mut fold: G) -> BTreeMap<K, A>
where
    I: IntoIterator,
    K: Ord,
    A: Default,
    F: FnMut(&I::Item) -> K,
    G: FnMut(&mut A, I::Item),
{
    let mut groups: BTreeMap<K, A> = BTreeMap::new();
    for item in items {
        let k = key(&item);
        fold(groups.entry(k).or_default(), item);
    }
    groups
}

/// Stable sort then truncate to `k` entries.
pub fn top_k<T, F>(mut items: Vec<T>, k: usize, compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    items.sort_by(compare);
    items.truncate(k);
    items
}

/// Descending order for floats; NaN sorts last.
pub fn descending_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// `part` as a percentage of `whole`; zero when `whole` is zero.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explode_keeps_empty_segments() {
        let parts: Vec<_> = explode("Python;;Rust;").collect();
        assert_eq!(parts, vec!["Python", "", "Rust", ""]);
        assert_eq!(element_count(Some("a;b;c")), 3);
        assert_eq!(element_count(None), 1);
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("25-34 years old"), Some(25));
        assert_eq!(first_integer("Under 18 years old"), Some(18));
        assert_eq!(first_integer("Prefer not to say"), None);
    }

    #[test]
    fn test_largest_integer() {
        assert_eq!(largest_integer("100 to 499 employees"), Some(499));
        assert_eq!(largest_integer("10,000 or more employees"), Some(10000));
        assert_eq!(largest_integer("Just me - I am a freelancer"), None);
    }

    #[test]
    fn test_mean_ignores_missing() {
        let mut mean = Mean::default();
        assert_eq!(mean.value(), None);

        mean.push(Some(10.0));
        mean.push(None);
        mean.push(Some(20.0));
        mean.push(Some(f64::NAN));

        assert_eq!(mean.value(), Some(15.0));
        assert_eq!(mean.samples(), 2);
    }

    #[test]
    fn test_group_by_orders_keys() {
        let words = vec!["pear", "apple", "plum", "avocado"];
        let groups = group_by(
            words,
            |w| w.chars().next().unwrap_or_default(),
            |count: &mut usize, _| *count += 1,
        );

        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec!['a', 'p']);
        assert_eq!(groups[&'p'], 2);
    }

    #[test]
    fn test_top_k_is_stable() {
        let items = vec![("a", 1), ("b", 3), ("c", 3), ("d", 2)];
        let top = top_k(items, 3, |x, y| y.1.cmp(&x.1));
        assert_eq!(top, vec![("b", 3), ("c", 3), ("d", 2)]);
    }

    #[test]
    fn test_descending_f64_with_nan() {
        let mut values = vec![1.0, f64::NAN, 3.0, 2.0];
        values.sort_by(|a, b| descending_f64(*a, *b));
        assert_eq!(&values[..3], &[3.0, 2.0, 1.0]);
        assert!(values[3].is_nan());
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(0, 0), 0.0);
    }
}
