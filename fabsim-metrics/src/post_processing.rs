//! The post-processor: event log in, KPIs out.

use std::collections::HashMap;

use fabsim_components::{ActivityKind, EventRecord};
use hdrhistogram::Histogram;

use crate::kpi::{SimulationResults, ThroughputKpi, ThroughputTimeKpi, WipSummary};
use crate::resource_states;

/// Derives KPIs from a finished run's event log.
pub struct PostProcessor {
    records: Vec<EventRecord>,
    horizon: f64,
}

/// Product ids are `<type>_<counter>`; the type is everything before the
/// final underscore.
fn product_type_of(product_id: &str) -> &str {
    product_id
        .rsplit_once('_')
        .map(|(t, _)| t)
        .unwrap_or(product_id)
}

impl PostProcessor {
    pub fn new(records: Vec<EventRecord>, horizon: f64) -> Self {
        Self { records, horizon }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Finished counts and rates per product type, ordered by type name.
    pub fn throughput(&self) -> Vec<ThroughputKpi> {
        let mut finished: HashMap<&str, u64> = HashMap::new();
        for r in &self.records {
            if r.activity == ActivityKind::FinishedProduct {
                if let Some(product) = &r.product {
                    *finished.entry(product_type_of(product)).or_insert(0) += 1;
                }
            }
        }
        let mut kpis: Vec<ThroughputKpi> = finished
            .into_iter()
            .map(|(product_type, count)| ThroughputKpi {
                product_type: product_type.to_string(),
                finished: count,
                rate: if self.horizon > 0.0 {
                    count as f64 / self.horizon
                } else {
                    0.0
                },
            })
            .collect();
        kpis.sort_by(|a, b| a.product_type.cmp(&b.product_type));
        kpis
    }

    /// Time-weighted WIP statistics from creation/completion records.
    pub fn wip(&self) -> WipSummary {
        let mut current: i64 = 0;
        let mut maximum: i64 = 0;
        let mut weighted: f64 = 0.0;
        let mut per_type_current: HashMap<String, i64> = HashMap::new();
        let mut per_type_weighted: HashMap<String, f64> = HashMap::new();
        let mut last_time = 0.0f64;

        for r in &self.records {
            let delta = match r.activity {
                ActivityKind::CreatedProduct => 1,
                ActivityKind::FinishedProduct => -1,
                _ => continue,
            };
            let Some(product) = &r.product else { continue };
            let t = r.time.min(self.horizon);
            if t > last_time {
                weighted += current as f64 * (t - last_time);
                for (ty, c) in &per_type_current {
                    *per_type_weighted.entry(ty.clone()).or_insert(0.0) +=
                        *c as f64 * (t - last_time);
                }
                last_time = t;
            }
            current += delta;
            maximum = maximum.max(current);
            *per_type_current
                .entry(product_type_of(product).to_string())
                .or_insert(0) += delta;
        }
        if self.horizon > last_time {
            weighted += current as f64 * (self.horizon - last_time);
            for (ty, c) in &per_type_current {
                *per_type_weighted.entry(ty.clone()).or_insert(0.0) +=
                    *c as f64 * (self.horizon - last_time);
            }
        }

        let mut per_type: Vec<(String, f64)> = per_type_weighted
            .into_iter()
            .map(|(ty, w)| (ty, if self.horizon > 0.0 { w / self.horizon } else { 0.0 }))
            .collect();
        per_type.sort_by(|a, b| a.0.cmp(&b.0));

        WipSummary {
            average: if self.horizon > 0.0 {
                weighted / self.horizon
            } else {
                0.0
            },
            maximum: maximum.max(0) as u64,
            at_end: current.max(0) as u64,
            per_type,
        }
    }

    /// Throughput-time statistics (creation to completion) per product type.
    pub fn throughput_time(&self) -> Vec<ThroughputTimeKpi> {
        let mut created: HashMap<&str, f64> = HashMap::new();
        let mut by_type: HashMap<&str, Vec<f64>> = HashMap::new();
        for r in &self.records {
            let Some(product) = r.product.as_deref() else { continue };
            match r.activity {
                ActivityKind::CreatedProduct => {
                    created.insert(product, r.time);
                }
                ActivityKind::FinishedProduct => {
                    if let Some(&start) = created.get(product) {
                        by_type
                            .entry(product_type_of(product))
                            .or_default()
                            .push(r.time - start);
                    }
                }
                _ => {}
            }
        }
        let mut kpis: Vec<ThroughputTimeKpi> = by_type
            .into_iter()
            .map(|(product_type, times)| {
                let count = times.len() as u64;
                let mean = times.iter().sum::<f64>() / times.len() as f64;
                // Millisecond-resolution histogram for the quantiles.
                let mut histogram: Histogram<u64> =
                    Histogram::new(3).expect("3 significant digits is valid");
                for &t in &times {
                    let value = (t * 1000.0).round().max(0.0) as u64;
                    histogram.saturating_record(value.max(1));
                }
                ThroughputTimeKpi {
                    product_type: product_type.to_string(),
                    count,
                    mean,
                    median: histogram.value_at_quantile(0.5) as f64 / 1000.0,
                    p95: histogram.value_at_quantile(0.95) as f64 / 1000.0,
                }
            })
            .collect();
        kpis.sort_by(|a, b| a.product_type.cmp(&b.product_type));
        kpis
    }

    /// PR/SB/ST/UD shares per resource.
    pub fn resource_states(&self) -> Vec<crate::kpi::ResourceStateKpi> {
        resource_states::time_in_states(&self.records, self.horizon)
    }

    /// All KPIs in one bundle.
    pub fn results(&self) -> SimulationResults {
        SimulationResults {
            horizon: self.horizon,
            throughput: self.throughput(),
            wip: self.wip(),
            throughput_time: self.throughput_time(),
            resource_states: self.resource_states(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabsim_components::EventLogger;

    fn log_with_two_products() -> Vec<EventRecord> {
        let mut log = EventLogger::new();
        log.created_product(1.0, "S1", "Product_1_1");
        log.created_product(2.0, "S1", "Product_1_2");
        log.finished_product(4.0, "K1", "Product_1_1");
        log.finished_product(8.0, "K1", "Product_1_2");
        log.into_records()
    }

    #[test]
    fn test_product_type_extraction() {
        assert_eq!(product_type_of("Product_1_17"), "Product_1");
        assert_eq!(product_type_of("housing_3"), "housing");
        assert_eq!(product_type_of("plain"), "plain");
    }

    #[test]
    fn test_throughput_counts_finished() {
        let p = PostProcessor::new(log_with_two_products(), 10.0);
        let tp = p.throughput();
        assert_eq!(tp.len(), 1);
        assert_eq!(tp[0].product_type, "Product_1");
        assert_eq!(tp[0].finished, 2);
        assert!((tp[0].rate - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_wip_time_weighted_average() {
        let p = PostProcessor::new(log_with_two_products(), 10.0);
        let wip = p.wip();
        // WIP: 0 on [0,1), 1 on [1,2), 2 on [2,4), 1 on [4,8), 0 after.
        // Average = (0*1 + 1*1 + 2*2 + 1*4 + 0*2) / 10 = 0.9
        assert!((wip.average - 0.9).abs() < 1e-12);
        assert_eq!(wip.maximum, 2);
        assert_eq!(wip.at_end, 0);
    }

    #[test]
    fn test_throughput_time_mean() {
        let p = PostProcessor::new(log_with_two_products(), 10.0);
        let tt = p.throughput_time();
        assert_eq!(tt.len(), 1);
        assert_eq!(tt[0].count, 2);
        // Durations 3.0 and 6.0.
        assert!((tt[0].mean - 4.5).abs() < 1e-12);
        assert!(tt[0].median >= 2.9 && tt[0].median <= 6.1);
    }

    #[test]
    fn test_unfinished_products_stay_in_wip() {
        let mut log = EventLogger::new();
        log.created_product(1.0, "S1", "Product_1_1");
        let p = PostProcessor::new(log.into_records(), 5.0);
        let wip = p.wip();
        assert_eq!(wip.at_end, 1);
        // In WIP for 4 of 5 units.
        assert!((wip.average - 0.8).abs() < 1e-12);
        assert!(p.throughput().is_empty());
    }

    #[test]
    fn test_results_bundle() {
        let p = PostProcessor::new(log_with_two_products(), 10.0);
        let results = p.results();
        assert_eq!(results.horizon, 10.0);
        assert_eq!(results.throughput.len(), 1);
        let json = serde_json::to_value(&results).unwrap();
        assert!(json["wip"]["average"].is_number());
    }
}
