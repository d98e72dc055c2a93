//! Resource ranking.
//!
//! score = 100 * render_blocking + 100 * hit_ratio - average_position - consecutive_misses
//!
//! The render-blocking bonus dominates: for identical statistics a
//! stylesheet, script or font always outranks an image by exactly 100.

use crate::types::ResourceRecord;

/// Weight of the render-blocking bonus and of the hit ratio.
pub const CATEGORY_WEIGHT: f32 = 100.0;

/// Rank of a resource within its aggregate. Higher is better.
pub fn compute_score(record: &ResourceRecord) -> f32 {
    let blocking = if record.resource_category.is_render_blocking() {
        CATEGORY_WEIGHT
    } else {
        0.0
    };
    blocking + CATEGORY_WEIGHT * hit_ratio(record)
        - record.average_position as f32
        - record.consecutive_miss_count as f32
}

/// Fraction of observations that were hits; 0 for an unobserved record.
pub fn hit_ratio(record: &ResourceRecord) -> f32 {
    let total = record.observations();
    if total == 0 {
        return 0.0;
    }
    (f64::from(record.hit_count) / total as f64) as f32
}

/// Sort by descending score. Stable, so equal scores keep their order.
pub fn sort_resources(resources: &mut [ResourceRecord]) {
    resources.sort_by(|a, b| compute_score(b).total_cmp(&compute_score(a)));
}

/// Sort, then keep the `max` best records.
pub fn trim_resources(resources: &mut Vec<ResourceRecord>, max: usize) {
    sort_resources(resources);
    resources.truncate(max);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RequestPriority, ResourceCategory};

    fn record(category: ResourceCategory, hits: u32, misses: u32, position: f64) -> ResourceRecord {
        ResourceRecord::new(
            "http://a.com/r",
            category,
            hits,
            misses,
            0,
            position,
            RequestPriority::Medium,
            false,
            false,
        )
    }

    #[test]
    fn earlier_position_scores_higher() {
        let early = record(ResourceCategory::Image, 5, 0, 1.0);
        let late = record(ResourceCategory::Image, 5, 0, 7.5);
        assert!(compute_score(&early) > compute_score(&late));
    }

    #[test]
    fn misses_lower_the_score() {
        let reliable = record(ResourceCategory::Script, 4, 0, 2.0);
        let flaky = record(ResourceCategory::Script, 4, 4, 2.0);
        assert!(compute_score(&reliable) > compute_score(&flaky));
    }

    #[test]
    fn consecutive_misses_lower_the_score() {
        let mut stale = record(ResourceCategory::Font, 4, 1, 2.0);
        let fresh = stale.clone();
        stale.consecutive_miss_count = 1;
        assert!(compute_score(&fresh) > compute_score(&stale));
    }

    #[test]
    fn trim_keeps_best() {
        let mut resources = vec![
            record(ResourceCategory::Image, 1, 0, 1.0),
            record(ResourceCategory::Script, 1, 0, 3.0),
            record(ResourceCategory::Other, 1, 0, 2.0),
        ];
        resources[0].resource_url = "image".into();
        resources[1].resource_url = "script".into();
        resources[2].resource_url = "other".into();
        trim_resources(&mut resources, 2);
        let urls: Vec<_> = resources.iter().map(|r| r.resource_url.as_str()).collect();
        assert_eq!(urls, vec!["script", "image"]);
    }
}
