//! 配置校验模块
//!
//! 校验规则：
//! - 字段级规则 (validator derive)：step_ms >= 1, update_rate >= 0, stddev >= 0, name 非空
//! - 传感器名称唯一
//! - 显式 topic 唯一
//! - noise type 可由描述创建 (none / gaussian / gaussian_quantized)
//! - 数值字段有限

use std::collections::HashSet;

use contracts::{ContractError, NoiseType, SimulationConfig};
use validator::Validate;

/// 校验 SimulationConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &SimulationConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_clock(config)?;
    validate_sensor_names(config)?;
    validate_topics(config)?;
    validate_noise(config)?;
    Ok(())
}

/// 字段级规则
fn validate_fields(config: &SimulationConfig) -> Result<(), ContractError> {
    config
        .validate()
        .map_err(|e| ContractError::config_validation("simulation document", e.to_string()))
}

/// 校验时钟配置
fn validate_clock(config: &SimulationConfig) -> Result<(), ContractError> {
    let duration_s = config.simulation.duration_s;
    if !duration_s.is_finite() || duration_s < 0.0 {
        return Err(ContractError::config_validation(
            "simulation.duration_s",
            format!("duration_s must be finite and >= 0, got {duration_s}"),
        ));
    }
    if config.simulation.step_ms == 0 {
        return Err(ContractError::config_validation(
            "simulation.step_ms",
            "step_ms must be > 0",
        ));
    }
    Ok(())
}

/// 校验传感器名称唯一性
fn validate_sensor_names(config: &SimulationConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sensor in &config.sensors {
        if !seen.insert(sensor.name.trim()) {
            return Err(ContractError::config_validation(
                format!("sensors[name={}]", sensor.name),
                "duplicate sensor name",
            ));
        }
        if !sensor.update_rate.is_finite() {
            return Err(ContractError::config_validation(
                format!("sensors[{}].update_rate", sensor.name),
                "update_rate must be finite",
            ));
        }
    }
    Ok(())
}

/// 校验显式 topic 唯一性
fn validate_topics(config: &SimulationConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for sensor in &config.sensors {
        let Some(topic) = sensor.topic.as_deref() else {
            continue;
        };
        if !seen.insert(topic.trim()) {
            return Err(ContractError::config_validation(
                format!("sensors[{}].topic", sensor.name),
                format!("duplicate topic '{topic}'"),
            ));
        }
    }
    Ok(())
}

/// 校验 noise 配置
fn validate_noise(config: &SimulationConfig) -> Result<(), ContractError> {
    for sensor in &config.sensors {
        let Some(noise) = &sensor.noise else {
            continue;
        };
        let field = format!("sensors[{}].noise", sensor.name);

        match noise.parsed_type() {
            Ok(NoiseType::Custom) => {
                return Err(ContractError::config_validation(
                    format!("{field}.type"),
                    "custom noise cannot be declared in a config file",
                ));
            }
            Ok(_) => {}
            Err(e) => {
                return Err(ContractError::config_validation(
                    format!("{field}.type"),
                    e.to_string(),
                ));
            }
        }

        let values = [
            ("mean", noise.mean),
            ("stddev", noise.stddev),
            ("bias_mean", noise.bias_mean),
            ("bias_stddev", noise.bias_stddev),
            ("precision", noise.precision),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ContractError::config_validation(
                format!("{field}.{name}"),
                format!("{name} must be finite, got {value}"),
            ));
        }
    }
    Ok(())
}
