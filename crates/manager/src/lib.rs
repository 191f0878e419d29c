//! # Manager
//!
//! 传感器注册表与调度器。
//!
//! 负责：
//! - 分配 `SensorId` 并持有所有传感器
//! - 按 update rate 门控的 `run_once` 调度
//! - 查找、类型化访问与移除
//!
//! ## 使用示例
//!
//! ```
//! use std::time::Duration;
//!
//! use contracts::{SensorDescriptor, SensorKind, TracingSink};
//! use manager::Manager;
//!
//! let mut manager = Manager::with_seed(1, TracingSink::shared());
//! let id = manager.create_from_descriptor(
//!     &SensorDescriptor::new("baro", SensorKind::AirPressure).with_update_rate(10.0),
//! );
//! assert!(id.is_valid());
//!
//! let report = manager.run_once(Duration::ZERO, false);
//! assert_eq!(report.updated, 1);
//! ```

mod error;
mod manager;

pub use error::{ManagerError, Result};
pub use manager::{is_due, Manager};

// Re-export contracts types
pub use contracts::{RunOnceReport, SensorId, SimTime, NO_SENSOR};
