//! Last-result cache for interactive recomputation.

use std::sync::Arc;

use crate::config::ScoringConfig;
use crate::engine::{compute_series, ViabilitySeries};
use crate::metrics::MetricStore;

/// Remembers the last `(store, config)` pair and its series.
///
/// Stores are compared by identity (`Arc` pointer), configs structurally.
/// A miss simply recomputes; results never differ from [`compute_series`].
#[derive(Debug, Default)]
pub struct SeriesMemo {
    last: Option<(Arc<MetricStore>, ScoringConfig, ViabilitySeries)>,
    hits: u64,
    misses: u64,
}

impl SeriesMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute(
        &mut self,
        store: &Arc<MetricStore>,
        config: &ScoringConfig,
    ) -> &ViabilitySeries {
        let hit = matches!(&self.last, Some((s, c, _)) if Arc::ptr_eq(s, store) && c == config);
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
            self.last = None;
        }
        let (_, _, series) = self.last.get_or_insert_with(|| {
            (Arc::clone(store), config.clone(), compute_series(store, config))
        });
        series
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricFamily, MetricKey, YearMetrics};
    use crate::presets::cover_crop_feasibility;

    fn store() -> Arc<MetricStore> {
        let w21 = MetricKey::windowed(MetricFamily::WindowMinRainfall, 21);
        Arc::new(
            MetricStore::new(vec![YearMetrics::new(2030)
                .with("r1", w21, Some(18.0))
                .with("r2", w21, Some(12.0))])
            .unwrap(),
        )
    }

    #[test]
    fn same_inputs_hit() {
        let s = store();
        let cfg = cover_crop_feasibility().unwrap();
        let mut memo = SeriesMemo::new();
        let first = memo.compute(&s, &cfg).clone();
        let second = memo.compute(&s, &cfg).clone();
        assert_eq!(first, second);
        assert_eq!(first, compute_series(&s, &cfg));
        assert_eq!(memo.stats(), (1, 1));
    }

    #[test]
    fn edited_config_or_new_store_misses() {
        let s = store();
        let cfg = cover_crop_feasibility().unwrap();
        let mut memo = SeriesMemo::new();
        memo.compute(&s, &cfg);

        let edited = cfg.with_parameter("min_rainfall", 10.0).unwrap();
        let pct = memo.compute(&s, &edited).year(2030).and_then(|r| r.percentage("window_21d"));
        assert_eq!(pct, Some(100.0));

        // Equal content, different allocation: identity decides.
        let other = Arc::new((*s).clone());
        memo.compute(&other, &edited);
        assert_eq!(memo.stats(), (0, 3));

        memo.clear();
        memo.compute(&other, &edited);
        assert_eq!(memo.stats(), (0, 4));
    }
}
