// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Self-telemetry for pipeline components.
//!
//! Components never reach for a global registry. They receive a
//! [`TelemetrySettings`] at construction and ask it for a meter at the
//! verbosity level their instruments belong to. When the configured level is
//! lower, or no provider is wired in, they get nothing back and record
//! nothing.
//!
//! [`InMemoryMeterProvider`] keeps cumulative sums in memory and exposes them
//! through [`InMemoryMeterProvider::collect`], which makes instrumentation
//! assertions deterministic in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Verbosity of the metrics a component emits about itself.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    /// No self-telemetry.
    None,
    /// Essential instruments only.
    #[default]
    Basic,
    Normal,
    /// Everything, including high-cardinality instruments.
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metrics level \"{0}\"")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Level::None),
            "basic" => Ok(Level::Basic),
            "normal" => Ok(Level::Normal),
            "detailed" => Ok(Level::Detailed),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::None => "none",
            Level::Basic => "basic",
            Level::Normal => "normal",
            Level::Detailed => "detailed",
        };
        f.write_str(s)
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.to_string()
    }
}

/// Sorted set of string attributes attached to a measurement.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeSet(Vec<(String, String)>);

impl AttributeSet {
    /// Builds a set from key/value pairs. Later duplicates of a key win.
    pub fn new<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = BTreeMap::new();
        for (k, v) in pairs {
            map.insert(k.into(), v.into());
        }
        Self(map.into_iter().collect())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Static description of an instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentDescriptor {
    pub name: String,
    pub description: String,
    pub unit: String,
}

impl InstrumentDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            unit: unit.into(),
        }
    }
}

/// Monotonic cumulative counter.
pub trait Counter: Send + Sync {
    fn add(&self, value: u64, attributes: &AttributeSet);
}

/// Source of instruments for one instrumentation scope.
pub trait Meter: Send + Sync {
    fn u64_counter(&self, descriptor: InstrumentDescriptor) -> Arc<dyn Counter>;
}

/// Hands out meters per instrumentation scope.
pub trait MeterProvider: Send + Sync {
    fn meter(&self, scope: &str) -> Arc<dyn Meter>;
}

/// Returns the provider to use for instruments of a given level, or `None`
/// when instruments of that level should not be recorded.
pub type LeveledMeterProvider = Arc<dyn Fn(Level) -> Option<Arc<dyn MeterProvider>> + Send + Sync>;

/// Counter that drops every measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCounter;

impl Counter for NoopCounter {
    fn add(&self, _value: u64, _attributes: &AttributeSet) {}
}

/// Self-telemetry configuration handed to components.
#[derive(Clone, Default)]
pub struct TelemetrySettings {
    /// Highest level of instruments the component may record.
    pub metrics_level: Level,
    pub leveled_meter_provider: Option<LeveledMeterProvider>,
}

impl fmt::Debug for TelemetrySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetrySettings")
            .field("metrics_level", &self.metrics_level)
            .field(
                "leveled_meter_provider",
                &self.leveled_meter_provider.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

impl TelemetrySettings {
    /// Settings that never record anything.
    #[must_use]
    pub fn nop() -> Self {
        Self {
            metrics_level: Level::None,
            leveled_meter_provider: None,
        }
    }

    /// Settings that send every level up to `metrics_level` to `provider`.
    #[must_use]
    pub fn with_provider(metrics_level: Level, provider: Arc<dyn MeterProvider>) -> Self {
        Self {
            metrics_level,
            leveled_meter_provider: Some(Arc::new(move |_level: Level| Some(Arc::clone(&provider)))),
        }
    }

    /// Meter for instruments of `level`, if that level is enabled and a
    /// provider is available for it.
    #[must_use]
    pub fn leveled_meter(&self, level: Level, scope: &str) -> Option<Arc<dyn Meter>> {
        if level == Level::None || self.metrics_level < level {
            return None;
        }
        let leveled = self.leveled_meter_provider.as_ref()?;
        let provider = leveled(level)?;
        Some(provider.meter(scope))
    }
}

/// Snapshot of one cumulative monotonic sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumSnapshot {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub is_monotonic: bool,
    pub data_points: Vec<SumDataPoint>,
}

impl SumSnapshot {
    /// Value recorded for exactly this attribute set.
    #[must_use]
    pub fn value_for(&self, attributes: &AttributeSet) -> Option<u64> {
        self.data_points
            .iter()
            .find(|dp| &dp.attributes == attributes)
            .map(|dp| dp.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumDataPoint {
    pub attributes: AttributeSet,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSnapshot {
    pub scope: String,
    pub metrics: Vec<SumSnapshot>,
}

impl ScopeSnapshot {
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<&SumSnapshot> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

/// Meter provider that aggregates in memory.
///
/// Cloning shares the underlying storage, so a test can keep one handle and
/// give another to the component under test.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMeterProvider {
    meters: Arc<Mutex<Vec<Arc<InMemoryMeter>>>>,
}

impl InMemoryMeterProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative state of every instrument that has recorded at least one
    /// measurement, grouped by scope in registration order.
    #[must_use]
    pub fn collect(&self) -> Vec<ScopeSnapshot> {
        let meters = self
            .meters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        meters
            .iter()
            .map(|meter| ScopeSnapshot {
                scope: meter.scope.clone(),
                metrics: meter.collect(),
            })
            .filter(|scope| !scope.metrics.is_empty())
            .collect()
    }
}

impl MeterProvider for InMemoryMeterProvider {
    fn meter(&self, scope: &str) -> Arc<dyn Meter> {
        let mut meters = self.meters.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = meters.iter().find(|m| m.scope == scope) {
            return Arc::clone(existing) as Arc<dyn Meter>;
        }
        let meter = Arc::new(InMemoryMeter {
            scope: scope.to_string(),
            counters: Mutex::new(Vec::new()),
        });
        meters.push(Arc::clone(&meter));
        meter
    }
}

#[derive(Debug)]
struct InMemoryMeter {
    scope: String,
    counters: Mutex<Vec<Arc<InMemoryCounter>>>,
}

impl InMemoryMeter {
    fn collect(&self) -> Vec<SumSnapshot> {
        let counters = self
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        counters
            .iter()
            .map(|counter| counter.snapshot())
            .filter(|snapshot| !snapshot.data_points.is_empty())
            .collect()
    }
}

impl Meter for InMemoryMeter {
    fn u64_counter(&self, descriptor: InstrumentDescriptor) -> Arc<dyn Counter> {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        // Registering the same name twice yields the same instrument.
        if let Some(existing) = counters.iter().find(|c| c.descriptor.name == descriptor.name) {
            return Arc::clone(existing) as Arc<dyn Counter>;
        }
        let counter = Arc::new(InMemoryCounter {
            descriptor,
            points: RwLock::new(BTreeMap::new()),
        });
        counters.push(Arc::clone(&counter));
        counter
    }
}

#[derive(Debug)]
struct InMemoryCounter {
    descriptor: InstrumentDescriptor,
    points: RwLock<BTreeMap<AttributeSet, AtomicU64>>,
}

impl InMemoryCounter {
    fn snapshot(&self) -> SumSnapshot {
        let points = self.points.read().unwrap_or_else(PoisonError::into_inner);
        SumSnapshot {
            name: self.descriptor.name.clone(),
            description: self.descriptor.description.clone(),
            unit: self.descriptor.unit.clone(),
            is_monotonic: true,
            data_points: points
                .iter()
                .map(|(attributes, value)| SumDataPoint {
                    attributes: attributes.clone(),
                    value: value.load(Ordering::Relaxed),
                })
                .collect(),
        }
    }
}

impl Counter for InMemoryCounter {
    fn add(&self, value: u64, attributes: &AttributeSet) {
        {
            let points = self.points.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(point) = points.get(attributes) {
                point.fetch_add(value, Ordering::Relaxed);
                return;
            }
        }
        let mut points = self.points.write().unwrap_or_else(PoisonError::into_inner);
        points
            .entry(attributes.clone())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn processor_attrs(id: &str) -> AttributeSet {
        AttributeSet::new([("processor", id)])
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::None < Level::Basic);
        assert!(Level::Basic < Level::Normal);
        assert!(Level::Normal < Level::Detailed);
        assert_eq!(Level::default(), Level::Basic);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("none".parse::<Level>().unwrap(), Level::None);
        assert_eq!(" Basic ".parse::<Level>().unwrap(), Level::Basic);
        assert_eq!("DETAILED".parse::<Level>().unwrap(), Level::Detailed);
        assert_eq!(
            "verbose".parse::<Level>(),
            Err(ParseLevelError("verbose".to_string()))
        );
    }

    #[test]
    fn test_level_serde() {
        let level: Level = serde_json::from_str("\"normal\"").unwrap();
        assert_eq!(level, Level::Normal);
        assert_eq!(serde_json::to_string(&Level::Detailed).unwrap(), "\"detailed\"");
        assert!(serde_json::from_str::<Level>("\"loud\"").is_err());
    }

    #[test]
    fn test_attribute_set_is_sorted_and_deduplicated() {
        let a = AttributeSet::new([("b", "2"), ("a", "1"), ("b", "3")]);
        let b = AttributeSet::new([("a", "1"), ("b", "3")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("b"), Some("3"));
        let keys: Vec<&str> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_leveled_meter_respects_level() {
        let provider = InMemoryMeterProvider::new();
        let settings = TelemetrySettings::with_provider(Level::Basic, Arc::new(provider));
        assert!(settings.leveled_meter(Level::Basic, "scope").is_some());
        assert!(settings.leveled_meter(Level::Normal, "scope").is_none());
        assert!(settings.leveled_meter(Level::None, "scope").is_none());
    }

    #[test]
    fn test_leveled_meter_without_provider() {
        let settings = TelemetrySettings {
            metrics_level: Level::Detailed,
            leveled_meter_provider: None,
        };
        assert!(settings.leveled_meter(Level::Basic, "scope").is_none());
        assert!(TelemetrySettings::nop()
            .leveled_meter(Level::Basic, "scope")
            .is_none());
    }

    #[test]
    fn test_leveled_provider_may_decline() {
        let provider = InMemoryMeterProvider::new();
        let settings = TelemetrySettings {
            metrics_level: Level::Detailed,
            leveled_meter_provider: Some(Arc::new(move |level: Level| {
                if level >= Level::Normal {
                    Some(Arc::new(provider.clone()) as Arc<dyn MeterProvider>)
                } else {
                    None
                }
            })),
        };
        assert!(settings.leveled_meter(Level::Basic, "scope").is_none());
        assert!(settings.leveled_meter(Level::Normal, "scope").is_some());
    }

    #[test]
    fn test_in_memory_counter_accumulates() {
        let provider = InMemoryMeterProvider::new();
        let counter = provider.meter("scope").u64_counter(InstrumentDescriptor::new(
            "items",
            "Number of items.",
            "{items}",
        ));

        counter.add(3, &processor_attrs("a"));
        counter.add(4, &processor_attrs("a"));
        counter.add(1, &processor_attrs("b"));

        let scopes = provider.collect();
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].scope, "scope");
        let items = scopes[0].metric("items").unwrap();
        assert!(items.is_monotonic);
        assert_eq!(items.unit, "{items}");
        assert_eq!(items.value_for(&processor_attrs("a")), Some(7));
        assert_eq!(items.value_for(&processor_attrs("b")), Some(1));
        assert_eq!(items.value_for(&processor_attrs("c")), None);
    }

    #[test]
    fn test_collect_skips_unused_instruments() {
        let provider = InMemoryMeterProvider::new();
        let meter = provider.meter("scope");
        let _unused = meter.u64_counter(InstrumentDescriptor::new("unused", "", ""));
        assert!(provider.collect().is_empty());

        let used = meter.u64_counter(InstrumentDescriptor::new("used", "", ""));
        used.add(0, &AttributeSet::default());
        let scopes = provider.collect();
        assert_eq!(scopes[0].metrics.len(), 1);
        assert_eq!(scopes[0].metrics[0].name, "used");
    }

    #[test]
    fn test_same_scope_and_name_share_state() {
        let provider = InMemoryMeterProvider::new();
        let first = provider
            .meter("scope")
            .u64_counter(InstrumentDescriptor::new("items", "", ""));
        let second = provider
            .meter("scope")
            .u64_counter(InstrumentDescriptor::new("items", "", ""));
        first.add(1, &AttributeSet::default());
        second.add(2, &AttributeSet::default());

        let scopes = provider.collect();
        assert_eq!(scopes.len(), 1);
        assert_eq!(
            scopes[0].metrics[0].value_for(&AttributeSet::default()),
            Some(3)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds() {
        let provider = InMemoryMeterProvider::new();
        let counter = provider
            .meter("scope")
            .u64_counter(InstrumentDescriptor::new("items", "", ""));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                for _ in 0..1000 {
                    counter.add(1, &processor_attrs("p"));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let scopes = provider.collect();
        assert_eq!(
            scopes[0].metrics[0].value_for(&processor_attrs("p")),
            Some(8000)
        );
    }
}
