//! Manager 运行指标收集模块
//!
//! 基于 RunOnceReport 与 Measurement 收集和统计传感器调度的运行指标。

use std::collections::HashMap;

use contracts::{Measurement, RunOnceReport};
use metrics::{counter, gauge, histogram};

/// 从 RunOnceReport 记录指标
///
/// 每次 `run_once` 结束时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_run_once;
///
/// let report = manager.run_once(now, false);
/// record_run_once(&report, elapsed_ms);
/// ```
pub fn record_run_once(report: &RunOnceReport, duration_ms: f64) {
    counter!("sensorsim_run_once_total").increment(1);

    if report.updated > 0 {
        counter!("sensorsim_updates_total").increment(report.updated as u64);
    }
    if report.failed > 0 {
        counter!("sensorsim_update_failures_total").increment(report.failed as u64);
    }
    gauge!("sensorsim_sensors_skipped_current").set(report.skipped as f64);

    histogram!("sensorsim_run_once_duration_ms").record(duration_ms);
}

/// 记录单个传感器更新失败
pub fn record_update_failure(sensor_name: &str, kind: &str) {
    counter!(
        "sensorsim_sensor_update_failures_total",
        "sensor" => sensor_name.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录已注册传感器数量
pub fn record_registered_sensors(count: usize) {
    gauge!("sensorsim_registered_sensors").set(count as f64);
}

/// 记录传感器注册被拒绝
pub fn record_registration_rejected() {
    counter!("sensorsim_registrations_rejected_total").increment(1);
}

/// 记录发布的测量值
pub fn record_measurement(measurement: &Measurement) {
    counter!(
        "sensorsim_measurements_total",
        "topic" => measurement.topic.clone()
    )
    .increment(1);

    gauge!(
        "sensorsim_measurement_value",
        "topic" => measurement.topic.clone()
    )
    .set(measurement.value);
}

/// 运行指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct RunStatsAggregator {
    /// 调度轮数
    pub total_ticks: u64,

    /// 成功更新总数
    pub total_updated: u64,

    /// 失败更新总数
    pub total_failed: u64,

    /// 跳过总数
    pub total_skipped: u64,

    /// 每轮耗时统计 (ms)
    pub duration_stats: RunningStats,

    /// 每轮更新数统计
    pub updates_per_tick: RunningStats,

    /// 各 topic 测量值统计
    pub value_stats: HashMap<String, RunningStats>,

    /// 各 topic 噪声 (value - raw_value) 统计
    pub noise_stats: HashMap<String, RunningStats>,
}

impl RunStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一轮调度结果
    pub fn update(&mut self, report: &RunOnceReport, duration_ms: f64) {
        self.total_ticks += 1;
        self.total_updated += report.updated as u64;
        self.total_failed += report.failed as u64;
        self.total_skipped += report.skipped as u64;

        self.duration_stats.push(duration_ms);
        self.updates_per_tick.push(report.updated as f64);
    }

    /// 累加一个测量值
    pub fn record_measurement(&mut self, measurement: &Measurement) {
        self.value_stats
            .entry(measurement.topic.clone())
            .or_default()
            .push(measurement.value);
        self.noise_stats
            .entry(measurement.topic.clone())
            .or_default()
            .push(measurement.value - measurement.raw_value);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> RunSummary {
        let attempted = self.total_updated + self.total_failed;
        RunSummary {
            total_ticks: self.total_ticks,
            total_updated: self.total_updated,
            total_failed: self.total_failed,
            total_skipped: self.total_skipped,
            failure_rate: if attempted > 0 {
                self.total_failed as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            run_once_ms: StatsSummary::from(&self.duration_stats),
            updates_per_tick: StatsSummary::from(&self.updates_per_tick),
            topics: self
                .value_stats
                .iter()
                .map(|(topic, values)| {
                    let noise = self
                        .noise_stats
                        .get(topic)
                        .map(StatsSummary::from)
                        .unwrap_or_default();
                    (topic.clone(), TopicSummary {
                        values: StatsSummary::from(values),
                        noise,
                    })
                })
                .collect(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 运行摘要
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total_ticks: u64,
    pub total_updated: u64,
    pub total_failed: u64,
    pub total_skipped: u64,
    pub failure_rate: f64,
    pub run_once_ms: StatsSummary,
    pub updates_per_tick: StatsSummary,
    pub topics: HashMap<String, TopicSummary>,
}

/// 单个 topic 的测量摘要
#[derive(Debug, Clone, Default)]
pub struct TopicSummary {
    pub values: StatsSummary,
    pub noise: StatsSummary,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Simulation Run Summary ===")?;
        writeln!(f, "Ticks: {}", self.total_ticks)?;
        writeln!(f, "Sensor updates: {}", self.total_updated)?;
        writeln!(
            f,
            "Failed updates: {} ({:.2}%)",
            self.total_failed, self.failure_rate
        )?;
        writeln!(f, "Skipped (not due): {}", self.total_skipped)?;
        writeln!(f, "run_once (ms): {}", self.run_once_ms)?;
        writeln!(f, "Updates per tick: {}", self.updates_per_tick)?;

        if !self.topics.is_empty() {
            let mut topics: Vec<_> = self.topics.iter().collect();
            topics.sort_by(|a, b| a.0.cmp(b.0));
            writeln!(f, "Topics:")?;
            for (topic, summary) in topics {
                writeln!(f, "  {topic}")?;
                writeln!(f, "    value: {}", summary.values)?;
                writeln!(f, "    noise: {}", summary.noise)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SensorId, SensorKind};
    use std::time::Duration;

    fn measurement(topic: &str, value: f64, raw_value: f64) -> Measurement {
        Measurement {
            sensor_id: SensorId::new(1),
            name: "alt".to_string(),
            topic: topic.to_string(),
            kind: SensorKind::Altimeter,
            timestamp: Duration::ZERO,
            value,
            raw_value,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 8);
        assert!((stats.mean() - 5.0).abs() < 1e-10);
        assert!((stats.min() - 2.0).abs() < 1e-10);
        assert!((stats.max() - 9.0).abs() < 1e-10);
        assert!((stats.variance() - 32.0 / 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = RunStatsAggregator::new();
        aggregator.update(
            &RunOnceReport {
                updated: 3,
                failed: 1,
                skipped: 2,
            },
            0.4,
        );
        aggregator.update(
            &RunOnceReport {
                updated: 1,
                failed: 0,
                skipped: 5,
            },
            0.2,
        );
        aggregator.record_measurement(&measurement("/alt/altimeter", 10.5, 10.0));
        aggregator.record_measurement(&measurement("/alt/altimeter", 9.5, 10.0));

        assert_eq!(aggregator.total_ticks, 2);
        assert_eq!(aggregator.total_updated, 4);
        assert_eq!(aggregator.total_failed, 1);
        assert_eq!(aggregator.total_skipped, 7);

        let summary = aggregator.summary();
        assert!((summary.failure_rate - 20.0).abs() < 1e-10);
        let topic = &summary.topics["/alt/altimeter"];
        assert_eq!(topic.values.count, 2);
        assert!((topic.noise.mean).abs() < 1e-10);

        aggregator.reset();
        assert_eq!(aggregator.total_ticks, 0);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = RunStatsAggregator::new();
        aggregator.update(
            &RunOnceReport {
                updated: 2,
                failed: 2,
                skipped: 0,
            },
            1.0,
        );
        aggregator.record_measurement(&measurement("/baro/air_pressure", 101_325.0, 101_325.0));

        let output = aggregator.summary().to_string();
        assert!(output.contains("Ticks: 1"));
        assert!(output.contains("50.00%"));
        assert!(output.contains("/baro/air_pressure"));
    }

    #[test]
    fn test_record_without_recorder() {
        // no global recorder installed: calls are no-ops
        record_run_once(&RunOnceReport::default(), 0.1);
        record_registered_sensors(3);
        record_update_failure("alt", "altimeter");
        record_registration_rejected();
        record_measurement(&measurement("/x", 1.0, 1.0));
    }
}
