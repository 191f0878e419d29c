//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> Manager -> 传感器 -> 噪声 的端到端测试
//! - 可复现性与噪声统计

#[cfg(test)]
mod contract_tests {
    use contracts::{NoiseType, SensorIdAllocator, NO_SENSOR};

    #[test]
    fn test_noise_type_codes_are_stable() {
        assert_eq!(NoiseType::None.code(), 0);
        assert_eq!(NoiseType::Custom.code(), 1);
        assert_eq!(NoiseType::Gaussian.code(), 2);
        assert_eq!(NoiseType::GaussianQuantized.code(), 3);
    }

    #[test]
    fn test_allocator_never_issues_sentinel() {
        let mut ids = SensorIdAllocator::new();
        for _ in 0..100 {
            assert_ne!(ids.allocate(), NO_SENSOR);
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        DiagnosticLevel, Measurement, MemorySink, NoiseDescriptor, SensorDescriptor, SensorKind,
        SimulationConfig,
    };
    use manager::Manager;
    use noise::NoiseModel;
    use observability::RunStatsAggregator;
    use sensor_factory::{AltimeterSensor, Sensor};
    use tokio::sync::mpsc;

    const SCENARIO: &str = r#"
[simulation]
seed = 1234
step_ms = 10
duration_s = 1.0

[[sensors]]
name = "alt"
type = "altimeter"
update_rate = 10.0
[sensors.noise]
type = "gaussian"
stddev = 0.2
bias_mean = 0.5
[sensors.attributes]
altitude_offset = "120.0"
altitude_amplitude = "5.0"
altitude_frequency = "0.5"

[[sensors]]
name = "baro"
type = "air_pressure"
update_rate = 50.0
topic = "weather/pressure"
[sensors.noise]
type = "gaussian_quantized"
stddev = 3.0
precision = 10.0

[[sensors]]
name = "front_camera"
type = "camera"
update_rate = 30.0
"#;

    type Published = Arc<Mutex<Vec<Measurement>>>;

    /// Build a manager from a config and attach one collecting publisher
    fn build(config: &SimulationConfig, sink: Arc<MemorySink>) -> (Manager, Published) {
        let mut manager = match config.simulation.seed {
            Some(seed) => Manager::with_seed(seed, sink),
            None => Manager::new(sink),
        };
        assert!(manager.init());
        for descriptor in &config.sensors {
            manager.create_from_descriptor(descriptor);
        }

        let published: Published = Arc::new(Mutex::new(Vec::new()));
        let collector = published.clone();
        let publisher: contracts::MeasurementCallback =
            Arc::new(move |m| collector.lock().unwrap().push(m));
        for sensor in manager.iter_mut() {
            sensor.base_mut().set_publisher(publisher.clone());
        }
        (manager, published)
    }

    fn run(manager: &mut Manager, config: &SimulationConfig, force: bool) {
        for now in config.simulation.ticks() {
            manager.run_once(now, force);
        }
    }

    fn scenario() -> SimulationConfig {
        ConfigLoader::load_from_str(SCENARIO, ConfigFormat::Toml).unwrap()
    }

    /// Config -> Manager -> sensors -> publisher
    #[test]
    fn test_e2e_scenario() {
        let config = scenario();
        let sink = Arc::new(MemorySink::new());
        let (mut manager, published) = build(&config, sink.clone());

        // camera needs a rendering backend and is rejected, the rest registers
        assert_eq!(manager.len(), 2);
        assert!(sink.contains("front_camera"));
        assert!(sink.count_at_least(DiagnosticLevel::Error) >= 1);

        run(&mut manager, &config, false);

        let published = published.lock().unwrap();
        let mut per_topic: HashMap<&str, usize> = HashMap::new();
        for m in published.iter() {
            *per_topic.entry(m.topic.as_str()).or_default() += 1;
        }
        // 101 ticks over [0, 1 s]: 10 Hz -> 11 updates, 50 Hz -> 51 updates
        assert_eq!(per_topic["/alt/altimeter"], 11);
        assert_eq!(per_topic["/weather/pressure"], 51);

        // timestamps of one sensor strictly increase
        let alt: Vec<_> = published
            .iter()
            .filter(|m| m.name == "alt")
            .map(|m| m.timestamp)
            .collect();
        assert!(alt.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(alt[0], Duration::ZERO);
    }

    #[test]
    fn test_quantized_pressure_on_precision_grid() {
        let config = scenario();
        let (mut manager, published) = build(&config, Arc::new(MemorySink::new()));
        run(&mut manager, &config, false);

        for m in published.lock().unwrap().iter().filter(|m| m.name == "baro") {
            let steps = m.value / 10.0;
            assert!((steps - steps.round()).abs() < 1e-9, "{} not on grid", m.value);
        }
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let config = scenario();
        let values = |config: &SimulationConfig| {
            let (mut manager, published) = build(config, Arc::new(MemorySink::new()));
            run(&mut manager, config, false);
            let values: Vec<f64> = published.lock().unwrap().iter().map(|m| m.value).collect();
            values
        };

        let first = values(&config);
        let second = values(&config);
        assert_eq!(first, second);

        let mut reseeded = config.clone();
        reseeded.simulation.seed = Some(4321);
        assert_ne!(first, values(&reseeded));
    }

    #[test]
    fn test_gaussian_statistics_through_sensor() {
        let config = SimulationConfig {
            simulation: contracts::SimulationSettings {
                seed: Some(99),
                step_ms: 1,
                duration_s: 2.0,
            },
            sensors: vec![SensorDescriptor::new("alt", SensorKind::Altimeter)
                .with_noise(NoiseDescriptor::gaussian(0.0, 1.0, 0.0, 0.0))],
        };
        let (mut manager, published) = build(&config, Arc::new(MemorySink::new()));
        run(&mut manager, &config, true);

        let mut stats = RunStatsAggregator::new();
        for m in published.lock().unwrap().iter() {
            stats.record_measurement(m);
        }
        let noise = &stats.summary().topics["/alt/altimeter"].noise;

        let n = noise.count as f64;
        assert_eq!(noise.count, 2001);
        assert!(noise.mean.abs() < 5.0 / n.sqrt(), "mean {}", noise.mean);
        assert!((noise.std_dev - 1.0).abs() < 0.1, "std {}", noise.std_dev);
    }

    #[test]
    fn test_custom_noise_on_registered_sensor() {
        let sink = Arc::new(MemorySink::new());
        let mut manager = Manager::with_seed(5, sink);
        let descriptor = SensorDescriptor::new("alt", SensorKind::Altimeter)
            .with_attribute("altitude_offset", 10.0);
        let id = manager.create_from_descriptor(&descriptor);
        assert!(id.is_valid());

        {
            let sensor = manager.sensor_mut(id).unwrap();
            let mut model = NoiseModel::custom();
            model.set_custom_callback(|value, _dt| value * 2.0).unwrap();
            sensor.base_mut().set_noise(Some(model));
        }

        manager.run_once(Duration::from_millis(100), true);
        let reading = manager
            .sensor_as::<AltimeterSensor>(id)
            .and_then(AltimeterSensor::last_reading)
            .unwrap();
        assert!((reading.vertical_position - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_removed_sensor_no_longer_updates() {
        let config = scenario();
        let (mut manager, published) = build(&config, Arc::new(MemorySink::new()));
        let ids = manager.ids();

        manager.run_once(Duration::ZERO, true);
        assert!(manager.remove(ids[0]));
        assert!(!manager.remove(ids[0]));
        let report = manager.run_once(Duration::from_secs(1), true);

        assert_eq!(report.updated, 1);
        assert_eq!(published.lock().unwrap().len(), 3);
        assert!(manager.sensor(ids[0]).is_none());
    }

    #[test]
    fn test_bad_noise_type_reported_and_skipped() {
        let sink = Arc::new(MemorySink::new());
        let mut manager = Manager::with_seed(1, sink.clone());
        let descriptor = SensorDescriptor::new("alt", SensorKind::Altimeter).with_noise(NoiseDescriptor {
            noise_type: "pink".to_string(),
            ..NoiseDescriptor::default()
        });

        assert!(!manager.create_from_descriptor(&descriptor).is_valid());
        assert!(manager.is_empty());
        assert!(sink.contains("pink"));
    }

    /// Measurements handed across a channel, the way the CLI runner consumes them
    #[tokio::test]
    async fn test_publisher_over_channel() {
        let config = scenario();
        let mut manager = Manager::with_seed(7, Arc::new(MemorySink::new()));
        for descriptor in &config.sensors {
            manager.create_from_descriptor(descriptor);
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let publisher: contracts::MeasurementCallback = Arc::new(move |m| {
            let _ = tx.send(m);
        });
        for sensor in manager.iter_mut() {
            sensor.base_mut().set_publisher(publisher.clone());
        }
        drop(publisher);

        let mut received = 0;
        for now in config.simulation.ticks().take(10) {
            let report = manager.run_once(now, false);
            for _ in 0..report.updated {
                let m = rx.recv().await.unwrap();
                assert!(m.sensor_id.is_valid());
                received += 1;
            }
        }
        // alt at t=0 only, baro at t=0 and t=20,40,60,80 ms
        assert_eq!(received, 1 + 5);
    }
}
