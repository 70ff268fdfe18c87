// [libs/core/reliability/src/metrics.rs]
/*!
 * =================================================================
 * APARATO: METRICS & HEALTH (V1.0 - GROUND ZERO)
 * CLASIFICACIÓN: RELIABILITY SUBSTRATE (ESTRATO L1)
 * RESPONSABILIDAD: OBSERVABILIDAD INTERNA Y REGLAS DE ALERTA
 *
 * Tres primitivas: contador (monotono), gauge (último valor) e
 * histograma (ventana deslizante acotada para percentiles
 * aproximados). Nada aquí abre sockets de red; `/monitoring` (wildcard)
 * en `apps/hub` es quien expone estos números por HTTP.
 * =================================================================
 */

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::RwLock;

const HISTOGRAM_WINDOW_CAPACITY: usize = 1000;

#[derive(Default)]
struct Histogram {
    samples: Vec<f64>,
    cursor: usize,
}

impl Histogram {
    fn record(&mut self, value: f64) {
        if self.samples.len() < HISTOGRAM_WINDOW_CAPACITY {
            self.samples.push(value);
        } else {
            self.samples[self.cursor] = value;
            self.cursor = (self.cursor + 1) % HISTOGRAM_WINDOW_CAPACITY;
        }
    }

    fn percentile(&self, p: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let rank = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[rank.min(sorted.len() - 1)]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertComparison {
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone)]
pub struct AlertRule {
    pub name: &'static str,
    pub metric: &'static str,
    pub comparison: AlertComparison,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertStatus {
    pub name: String,
    pub firing: bool,
    pub observed: f64,
    pub threshold: f64,
}

/// Process-wide registry of counters, gauges and histograms. Cheap to
/// clone (an `Arc` in `AppState`); every metric name is allocated once
/// and updated via atomics or a narrow write lock.
pub struct MetricsRegistry {
    counters: RwLock<HashMap<String, AtomicU64>>,
    gauges: RwLock<HashMap<String, AtomicI64>>,
    histograms: RwLock<HashMap<String, Histogram>>,
    alert_rules: Vec<AlertRule>,
}

impl MetricsRegistry {
    pub fn new(alert_rules: Vec<AlertRule>) -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            alert_rules,
        }
    }

    pub fn incr_counter(&self, name: &str, delta: u64) {
        if let Some(counter) = self.counters.read().expect("counters poisoned").get(name) {
            counter.fetch_add(delta, Ordering::Relaxed);
            return;
        }
        self.counters
            .write()
            .expect("counters poisoned")
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(delta, Ordering::Relaxed);
    }

    pub fn set_gauge(&self, name: &str, value: i64) {
        if let Some(gauge) = self.gauges.read().expect("gauges poisoned").get(name) {
            gauge.store(value, Ordering::Relaxed);
            return;
        }
        self.gauges
            .write()
            .expect("gauges poisoned")
            .entry(name.to_string())
            .or_insert_with(|| AtomicI64::new(0))
            .store(value, Ordering::Relaxed);
    }

    pub fn observe(&self, name: &str, value: f64) {
        let mut histograms = self.histograms.write().expect("histograms poisoned");
        histograms.entry(name.to_string()).or_default().record(value);
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .expect("counters poisoned")
            .get(name)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn gauge(&self, name: &str) -> i64 {
        self.gauges
            .read()
            .expect("gauges poisoned")
            .get(name)
            .map(|gauge| gauge.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn histogram_snapshot(&self, name: &str) -> HistogramSnapshot {
        let histograms = self.histograms.read().expect("histograms poisoned");
        match histograms.get(name) {
            Some(histogram) => HistogramSnapshot {
                count: histogram.samples.len() as u64,
                p50: histogram.percentile(50.0),
                p95: histogram.percentile(95.0),
                p99: histogram.percentile(99.0),
            },
            None => HistogramSnapshot { count: 0, p50: 0.0, p95: 0.0, p99: 0.0 },
        }
    }

    /// Evaluates every configured alert rule against the metric it names.
    /// Gauges and counters are both readable as an `f64` observation;
    /// histogram-backed rules compare against the p99.
    pub fn evaluate_alerts(&self) -> Vec<AlertStatus> {
        self.alert_rules
            .iter()
            .map(|rule| {
                let observed = self
                    .gauges
                    .read()
                    .expect("gauges poisoned")
                    .get(rule.metric)
                    .map(|gauge| gauge.load(Ordering::Relaxed) as f64)
                    .or_else(|| {
                        self.counters
                            .read()
                            .expect("counters poisoned")
                            .get(rule.metric)
                            .map(|counter| counter.load(Ordering::Relaxed) as f64)
                    })
                    .unwrap_or_else(|| self.histogram_snapshot(rule.metric).p99);

                let firing = match rule.comparison {
                    AlertComparison::GreaterThan => observed > rule.threshold,
                    AlertComparison::LessThan => observed < rule.threshold,
                };

                AlertStatus { name: rule.name.to_string(), firing, observed, threshold: rule.threshold }
            })
            .collect()
    }
}

pub const DEFAULT_ALERT_RULES: &[AlertRule] = &[
    AlertRule {
        name: "energy_consume_failure_rate_high",
        metric: "energy.consume.errors",
        comparison: AlertComparison::GreaterThan,
        threshold: 50.0,
    },
    AlertRule {
        name: "db_circuit_open",
        metric: "pool.db.trips",
        comparison: AlertComparison::GreaterThan,
        threshold: 0.0,
    },
    AlertRule {
        name: "cache_fallback_saturated",
        metric: "cache.fallback_uses",
        comparison: AlertComparison::GreaterThan,
        threshold: 10000.0,
    },
];
