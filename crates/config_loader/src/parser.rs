//! Simulation document parsing
//!
//! A document is first read into a generic tree, then `[simulation]` and each
//! `[[sensors]]` entry are deserialized on their own so a failure names the
//! section it came from (`[simulation]`, `sensors[2] ("baro")`).

use std::fmt;

use contracts::{ContractError, SensorDescriptor, SimulationConfig, SimulationSettings};
use serde::de::DeserializeOwned;

/// Document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => f.write_str("TOML"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// Parse a simulation document
pub(crate) fn parse(
    content: &str,
    format: ConfigFormat,
) -> Result<SimulationConfig, ContractError> {
    match format {
        ConfigFormat::Toml => {
            let mut root: toml::Table = toml::from_str(content).map_err(|e| {
                let line = e
                    .span()
                    .map(|span| line_of(content, span.start))
                    .unwrap_or(1);
                ContractError::ConfigParse {
                    message: format!("TOML syntax error at line {line}: {}", e.message()),
                    source: Some(Box::new(e)),
                }
            })?;
            assemble(root.remove("simulation"), root.remove("sensors"), format)
        }
        ConfigFormat::Json => {
            let mut root: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
                    message: format!(
                        "JSON syntax error at line {}, column {}: {e}",
                        e.line(),
                        e.column()
                    ),
                    source: Some(Box::new(e)),
                })?;
            assemble(root.remove("simulation"), root.remove("sensors"), format)
        }
    }
}

/// 1-based line holding byte `offset`
fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// A node of a parsed document tree
trait Node: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    fn into_section<T: DeserializeOwned>(self) -> Result<T, Self::Error>;

    /// Array elements, or the node itself when it is not an array
    fn into_items(self) -> Result<Vec<Self>, Self>;

    /// The `name` key, when the node is a table with a string name
    fn name(&self) -> Option<&str>;
}

impl Node for toml::Value {
    type Error = toml::de::Error;

    fn into_section<T: DeserializeOwned>(self) -> Result<T, Self::Error> {
        self.try_into()
    }

    fn into_items(self) -> Result<Vec<Self>, Self> {
        match self {
            toml::Value::Array(items) => Ok(items),
            other => Err(other),
        }
    }

    fn name(&self) -> Option<&str> {
        self.get("name").and_then(toml::Value::as_str)
    }
}

impl Node for serde_json::Value {
    type Error = serde_json::Error;

    fn into_section<T: DeserializeOwned>(self) -> Result<T, Self::Error> {
        serde_json::from_value(self)
    }

    fn into_items(self) -> Result<Vec<Self>, Self> {
        match self {
            serde_json::Value::Array(items) => Ok(items),
            other => Err(other),
        }
    }

    fn name(&self) -> Option<&str> {
        self.get("name").and_then(serde_json::Value::as_str)
    }
}

fn assemble<N: Node>(
    simulation: Option<N>,
    sensors: Option<N>,
    format: ConfigFormat,
) -> Result<SimulationConfig, ContractError> {
    let simulation = match simulation {
        Some(node) => section::<SimulationSettings, _>(node, "[simulation]", format)?,
        None => SimulationSettings::default(),
    };

    let sensors = match sensors.map(N::into_items) {
        None => Vec::new(),
        Some(Ok(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let label = match item.name() {
                    Some(name) => format!("sensors[{index}] ({name:?})"),
                    None => format!("sensors[{index}]"),
                };
                section::<SensorDescriptor, _>(item, &label, format)
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(Err(node)) => section::<Vec<SensorDescriptor>, _>(node, "sensors", format)?,
    };

    Ok(SimulationConfig {
        simulation,
        sensors,
    })
}

fn section<T: DeserializeOwned, N: Node>(
    node: N,
    label: &str,
    format: ConfigFormat,
) -> Result<T, ContractError> {
    node.into_section().map_err(|e| ContractError::ConfigParse {
        message: format!("{format} error in {label}: {e}"),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SensorKind;

    fn parse_err(content: &str, format: ConfigFormat) -> String {
        match parse(content, format) {
            Err(err @ ContractError::ConfigParse { .. }) => err.to_string(),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[simulation]
seed = 42
step_ms = 5

[[sensors]]
name = "alt"
type = "altimeter"
update_rate = 50.0
[sensors.noise]
type = "gaussian"
stddev = 0.1
[sensors.attributes]
vertical_reference = "10.0"
"#;
        let result = parse(content, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.simulation.step_ms, 5);
        assert_eq!(config.simulation.duration_s, 1.0);
        assert_eq!(config.sensors.len(), 1);
        assert_eq!(config.sensors[0].kind, SensorKind::Altimeter);
        let noise = config.sensors[0].noise.as_ref().unwrap();
        assert_eq!(noise.noise_type, "gaussian");
        assert_eq!(noise.stddev, 0.1);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "simulation": { "duration_s": 0.5 },
            "sensors": [{
                "name": "baro",
                "type": "air_pressure",
                "topic": "/weather/baro",
                "noise": { "type": "gaussian_quantized", "stddev": 1.0, "precision": 10.0 }
            }]
        }"#;
        let result = parse(content, ConfigFormat::Json);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.simulation.step_ms, 10);
        assert_eq!(config.sensors[0].topic.as_deref(), Some("/weather/baro"));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse("", ConfigFormat::Toml).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_toml_syntax_error_reports_line() {
        let content = "[simulation]\nseed = 1\nstep_ms = = 5\n";
        let message = parse_err(content, ConfigFormat::Toml);
        assert!(message.contains("TOML syntax error at line 3"), "{message}");
    }

    #[test]
    fn test_json_syntax_error_reports_line() {
        let content = "{\n  \"simulation\": {\n    \"seed\": ,\n  }\n}";
        let message = parse_err(content, ConfigFormat::Json);
        assert!(message.contains("JSON syntax error at line 3"), "{message}");
    }

    #[test]
    fn test_unknown_sensor_kind_names_the_sensor() {
        let content = r#"
[[sensors]]
name = "alt"
type = "altimeter"

[[sensors]]
name = "thermo"
type = "thermometer"
"#;
        let message = parse_err(content, ConfigFormat::Toml);
        assert!(message.contains("sensors[1] (\"thermo\")"), "{message}");
        assert!(message.contains("thermometer"), "{message}");
    }

    #[test]
    fn test_unnamed_sensor_is_labelled_by_index() {
        let content = r#"{ "sensors": [{ "type": "altimeter" }] }"#;
        let message = parse_err(content, ConfigFormat::Json);
        assert!(message.contains("JSON error in sensors[0]:"), "{message}");
    }

    #[test]
    fn test_bad_simulation_section_is_named() {
        let content = "[simulation]\nstep_ms = \"fast\"\n";
        let message = parse_err(content, ConfigFormat::Toml);
        assert!(message.contains("TOML error in [simulation]"), "{message}");
    }

    #[test]
    fn test_sensors_not_an_array() {
        let content = r#"{ "sensors": { "name": "alt" } }"#;
        let message = parse_err(content, ConfigFormat::Json);
        assert!(message.contains("JSON error in sensors:"), "{message}");
    }

    #[test]
    fn test_line_of() {
        let content = "a\nb\nc";
        assert_eq!(line_of(content, 0), 1);
        assert_eq!(line_of(content, 2), 2);
        assert_eq!(line_of(content, 4), 3);
        assert_eq!(line_of(content, 99), 3);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
        assert_eq!(ConfigFormat::Json.to_string(), "JSON");
    }
}
