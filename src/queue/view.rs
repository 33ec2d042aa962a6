//! Filtered / searched / sorted projections over the current queue collection.
//!
//! Projections copy; the source collection is never reordered or trimmed.

#![allow(missing_docs)]

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::queue::types::Queue;
use crate::queue::units::parse_rate_to_mbps;

/// Utilization above which a queue counts as "high" for filtering and summaries.
pub const HIGH_UTILIZATION_PCT: f64 = 80.0;

// ──────────────────── view mode ────────────────────

/// Which of the two alternate presentations is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

// ──────────────────── filter ────────────────────

/// Queue-type filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    /// Names containing `_OUT`.
    Upload,
    /// Names containing `_IN`.
    Download,
    /// Utilization strictly above 80%.
    High,
}

impl Filter {
    /// Parse a filter label; unrecognized labels filter nothing.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "upload" => Self::Upload,
            "download" => Self::Download,
            "high" => Self::High,
            _ => Self::All,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Upload => "upload",
            Self::Download => "download",
            Self::High => "high",
        }
    }

    /// Advance to the next filter in the cycle.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::All => Self::Upload,
            Self::Upload => Self::Download,
            Self::Download => Self::High,
            Self::High => Self::All,
        }
    }

    #[must_use]
    pub fn matches(self, queue: &Queue) -> bool {
        match self {
            Self::All => true,
            Self::Upload => queue.name.contains("_OUT"),
            Self::Download => queue.name.contains("_IN"),
            Self::High => queue.utilization > HIGH_UTILIZATION_PCT,
        }
    }
}

// ──────────────────── sort ────────────────────

/// Sort key for projections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Locale-style ascending by name.
    #[default]
    Name,
    /// Highest utilization first.
    Utilization,
    /// Highest current rate (in Mbps) first.
    Rate,
    /// Keep arrival order. Produced by unrecognized sort labels.
    Arrival,
}

impl SortKey {
    /// Parse a sort label; unrecognized labels keep arrival order.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "name" => Self::Name,
            "utilization" => Self::Utilization,
            "rate" => Self::Rate,
            _ => Self::Arrival,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Utilization => "utilization",
            Self::Rate => "rate",
            Self::Arrival => "arrival",
        }
    }

    /// Cycle through the user-selectable keys (`Arrival` re-enters at `Name`).
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Name => Self::Utilization,
            Self::Utilization => Self::Rate,
            Self::Rate | Self::Arrival => Self::Name,
        }
    }

    fn compare(self, a: &Queue, b: &Queue) -> Ordering {
        match self {
            Self::Name => locale_compare(&a.name, &b.name),
            Self::Utilization => b.utilization.total_cmp(&a.utilization),
            Self::Rate => parse_rate_to_mbps(&b.rate).total_cmp(&parse_rate_to_mbps(&a.rate)),
            Self::Arrival => Ordering::Equal,
        }
    }
}

/// Case-insensitive primary ordering with a lowercase-first tie break.
#[must_use]
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    primary.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map_or(Ordering::Equal, |(x, y)| {
                // Lowercase sorts ahead of its uppercase twin.
                y.is_lowercase().cmp(&x.is_lowercase())
            })
    })
}

// ──────────────────── status ────────────────────

/// Utilization-derived status shared by every presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Normal,
    Warning,
    Critical,
}

impl Status {
    #[must_use]
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization >= 90.0 {
            Self::Critical
        } else if utilization >= 70.0 {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    /// Style class name.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Human-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Critical => "Danger",
        }
    }
}

// ──────────────────── projection ────────────────────

/// Derive the visible list: search, then filter, then a stable sort.
#[must_use]
pub fn project(queues: &[Queue], filter: Filter, search: &str, sort: SortKey) -> Vec<Queue> {
    let needle = search.to_lowercase();
    let mut visible: Vec<Queue> = queues
        .iter()
        .filter(|q| needle.is_empty() || q.name.to_lowercase().contains(&needle))
        .filter(|q| filter.matches(q))
        .cloned()
        .collect();
    visible.sort_by(|a, b| sort.compare(a, b));
    visible
}

/// Number of queues above the high-utilization threshold.
#[must_use]
pub fn high_utilization_count(queues: &[Queue]) -> usize {
    queues
        .iter()
        .filter(|q| q.utilization > HIGH_UTILIZATION_PCT)
        .count()
}

/// Mean utilization, `None` for an empty collection.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_utilization(queues: &[Queue]) -> Option<f64> {
    if queues.is_empty() {
        return None;
    }
    let sum: f64 = queues.iter().map(|q| q.utilization).sum();
    Some(sum / queues.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn queue(name: &str, rate: &str, utilization: f64) -> Queue {
        Queue {
            name: name.to_string(),
            rate: rate.to_string(),
            max_limit: "100Mbps".to_string(),
            utilization,
            ..Queue::default()
        }
    }

    fn names(queues: &[Queue]) -> Vec<&str> {
        queues.iter().map(|q| q.name.as_str()).collect()
    }

    fn sample() -> Vec<Queue> {
        vec![
            queue("wan_OUT", "40Mbps", 40.0),
            queue("wan_IN", "95Mbps", 95.0),
            queue("guest_OUT", "1Gbps", 81.0),
            queue("Guest_IN", "500kbps", 10.0),
            queue("voip", "2Mbps", 80.0),
        ]
    }

    #[test]
    fn projection_does_not_touch_source() {
        let source = sample();
        let before = source.clone();
        let _ = project(&source, Filter::High, "g", SortKey::Utilization);
        assert_eq!(source, before);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let out = project(&sample(), Filter::All, "GUEST", SortKey::Arrival);
        assert_eq!(names(&out), vec!["guest_OUT", "Guest_IN"]);
    }

    #[test]
    fn upload_and_download_filters_use_name_markers() {
        let up = project(&sample(), Filter::Upload, "", SortKey::Arrival);
        assert_eq!(names(&up), vec!["wan_OUT", "guest_OUT"]);
        let down = project(&sample(), Filter::Download, "", SortKey::Arrival);
        assert_eq!(names(&down), vec!["wan_IN", "Guest_IN"]);
    }

    #[test]
    fn high_filter_is_strictly_above_eighty() {
        let out = project(&sample(), Filter::High, "", SortKey::Arrival);
        assert_eq!(names(&out), vec!["wan_IN", "guest_OUT"]);
    }

    #[test]
    fn utilization_sort_is_descending() {
        let out = project(&sample(), Filter::All, "", SortKey::Utilization);
        assert_eq!(
            names(&out),
            vec!["wan_IN", "guest_OUT", "voip", "wan_OUT", "Guest_IN"]
        );
    }

    #[test]
    fn rate_sort_uses_parsed_mbps() {
        let out = project(&sample(), Filter::All, "", SortKey::Rate);
        assert_eq!(
            names(&out),
            vec!["guest_OUT", "wan_IN", "wan_OUT", "voip", "Guest_IN"]
        );
    }

    #[test]
    fn name_sort_ignores_case() {
        let out = project(&sample(), Filter::All, "", SortKey::Name);
        assert_eq!(
            names(&out),
            vec!["Guest_IN", "guest_OUT", "voip", "wan_IN", "wan_OUT"]
        );
    }

    #[test]
    fn locale_compare_puts_lowercase_first_on_ties() {
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("B", "a"), Ordering::Greater);
        assert_eq!(locale_compare("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn unknown_labels_are_lenient() {
        assert_eq!(Filter::from_label("nonsense"), Filter::All);
        assert_eq!(SortKey::from_label("nonsense"), SortKey::Arrival);
        let out = project(&sample(), Filter::All, "", SortKey::from_label("bogus"));
        assert_eq!(names(&out), names(&sample()));
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(Status::from_utilization(95.0), Status::Critical);
        assert_eq!(Status::from_utilization(90.0), Status::Critical);
        assert_eq!(Status::from_utilization(89.99), Status::Warning);
        assert_eq!(Status::from_utilization(85.0), Status::Warning);
        assert_eq!(Status::from_utilization(70.0), Status::Warning);
        assert_eq!(Status::from_utilization(69.9), Status::Normal);
        assert_eq!(Status::Critical.label(), "Danger");
        assert_eq!(Status::Warning.class(), "warning");
    }

    #[test]
    fn summary_helpers() {
        assert_eq!(high_utilization_count(&sample()), 2);
        let avg = average_utilization(&sample()).expect("non-empty");
        assert!((avg - 61.2).abs() < 1e-9);
        assert!(average_utilization(&[]).is_none());
    }

    #[test]
    fn cycles_visit_every_option() {
        let mut f = Filter::All;
        for _ in 0..4 {
            f = f.cycle();
        }
        assert_eq!(f, Filter::All);
        assert_eq!(SortKey::Arrival.cycle(), SortKey::Name);
        assert_eq!(SortKey::Rate.cycle(), SortKey::Name);
        assert_eq!(ViewMode::Grid.toggle(), ViewMode::List);
    }

    proptest! {
        #[test]
        fn status_partition_is_total(u in -50.0_f64..250.0) {
            let s = Status::from_utilization(u);
            prop_assert_eq!(s == Status::Critical, u >= 90.0);
            prop_assert_eq!(s == Status::Warning, (70.0..90.0).contains(&u));
            prop_assert_eq!(s == Status::Normal, u < 70.0);
        }

        #[test]
        fn high_filter_is_order_independent(
            utils in proptest::collection::vec(0.0_f64..120.0, 0..24),
            rotate in 0_usize..24,
        ) {
            let queues: Vec<Queue> = utils
                .iter()
                .enumerate()
                .map(|(i, u)| queue(&format!("q{i}"), "1Mbps", *u))
                .collect();
            let mut rotated = queues.clone();
            if !rotated.is_empty() {
                let k = rotate % rotated.len();
                rotated.rotate_left(k);
            }
            let mut a = names(&project(&queues, Filter::High, "", SortKey::Arrival))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            let mut b = names(&project(&rotated, Filter::High, "", SortKey::Arrival))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            a.sort();
            b.sort();
            prop_assert_eq!(&a, &b);
            prop_assert!(project(&queues, Filter::High, "", SortKey::Arrival)
                .iter()
                .all(|q| q.utilization > 80.0));
            prop_assert_eq!(a.len(), high_utilization_count(&queues));
        }

        #[test]
        fn name_sort_is_stable(dups in 1_usize..6) {
            let queues: Vec<Queue> = (0..dups)
                .map(|i| queue("same", &format!("{i}Mbps"), 0.0))
                .collect();
            let out = project(&queues, Filter::All, "", SortKey::Name);
            prop_assert_eq!(out, queues);
        }
    }
}
