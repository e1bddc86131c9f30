// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/config.rs - 风险配置
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RiskConfigError {
  #[error("I/O error: {0}")]
  IoError(std::io::Error),
  #[error("配置解析错误: {0}")]
  ParseError(serde_json::Error),
}

impl From<std::io::Error> for RiskConfigError {
  fn from(err: std::io::Error) -> Self {
    RiskConfigError::IoError(err)
  }
}

impl From<serde_json::Error> for RiskConfigError {
  fn from(err: serde_json::Error) -> Self {
    RiskConfigError::ParseError(err)
  }
}

/// 风险配置：类别权重、建议文本与阈值。
///
/// 配置是运维侧的输入，调整权重表不需要重新部署解码器。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
  /// 建议文本的置信度门槛。
  #[serde(default = "default_threshold")]
  pub threshold: f32,
  /// 严重度下限，空检测集的严重度即为该值。
  #[serde(default)]
  pub floor: f32,
  /// 权重表中不存在的类别使用的权重。
  #[serde(default = "default_weight")]
  pub default_weight: f32,
  /// 类别 -> 风险权重。
  #[serde(default)]
  pub weights: HashMap<String, f32>,
  /// 类别 -> 建议文本。
  #[serde(default)]
  pub advisories: HashMap<String, String>,
}

fn default_threshold() -> f32 {
  0.5
}

fn default_weight() -> f32 {
  1.0
}

impl Default for RiskConfig {
  fn default() -> Self {
    let weights = HashMap::from([
      ("fire".to_string(), 10.0),
      ("smoke".to_string(), 6.0),
      ("spark".to_string(), 4.0),
      ("person".to_string(), 1.0),
    ]);
    let advisories = HashMap::from([
      (
        "fire".to_string(),
        "检测到明火，请立即上报并撤离现场".to_string(),
      ),
      (
        "smoke".to_string(),
        "检测到烟雾，请确认火源并保持观察".to_string(),
      ),
      (
        "spark".to_string(),
        "检测到火花，请检查周边可燃物".to_string(),
      ),
    ]);

    RiskConfig {
      threshold: default_threshold(),
      floor: 0.0,
      default_weight: default_weight(),
      weights,
      advisories,
    }
  }
}

impl RiskConfig {
  /// 从 JSON 文件加载配置。负权重会破坏严重度的单调性，加载时归零。
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RiskConfigError> {
    let path = path.as_ref();
    info!("加载风险配置: {}", path.display());
    let text = std::fs::read_to_string(path)?;
    let mut config: RiskConfig = serde_json::from_str(&text)?;
    config.sanitize();
    Ok(config)
  }

  fn sanitize(&mut self) {
    if self.default_weight < 0.0 {
      warn!("默认权重为负（{}），归零", self.default_weight);
      self.default_weight = 0.0;
    }
    for (label, weight) in self.weights.iter_mut() {
      if *weight < 0.0 {
        warn!("类别 '{}' 的权重为负（{}），归零", label, weight);
        *weight = 0.0;
      }
    }
  }

  /// 某一类别的风险权重。
  pub fn weight(&self, label: &str) -> f32 {
    self.weights.get(label).copied().unwrap_or(self.default_weight)
  }

  /// 某一类别的建议文本。
  pub fn advisory(&self, label: &str) -> Option<&str> {
    self.advisories.get(label).map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_with_defaults() {
    let config: RiskConfig =
      serde_json::from_str(r#"{ "weights": { "fire": 8.0 } }"#).unwrap();
    assert_eq!(config.threshold, 0.5);
    assert_eq!(config.floor, 0.0);
    assert_eq!(config.weight("fire"), 8.0);
    assert_eq!(config.weight("unknown"), 1.0);
    assert!(config.advisory("fire").is_none());
  }

  #[test]
  fn negative_weights_are_clamped() {
    let mut config: RiskConfig =
      serde_json::from_str(r#"{ "default_weight": -1.0, "weights": { "fire": -3.0 } }"#).unwrap();
    config.sanitize();
    assert_eq!(config.weight("fire"), 0.0);
    assert_eq!(config.weight("unknown"), 0.0);
  }

  #[test]
  fn default_table_covers_fire() {
    let config = RiskConfig::default();
    assert!(config.weight("fire") > config.weight("person"));
    assert!(config.advisory("fire").is_some());
  }
}
