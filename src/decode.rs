// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/decode.rs - 结果解码器
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

use thiserror::Error;
use tracing::warn;

use crate::config::RiskConfig;
use crate::engine::RawDetection;

#[derive(Error, Debug)]
pub enum DecodeError {
  /// 单个检测项无法解析。调用方丢弃该项并继续处理其余项。
  #[error("检测项格式错误: {0}")]
  MalformedDetection(String),
}

/// 结构化边界框，左上角坐标加宽高。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
}

/// 一个已识别的目标/危险源实例。
#[derive(Debug, Clone)]
pub struct Detection {
  pub label: String,
  pub confidence: f32,
  pub bounding_box: BoundingBox,
}

/// 单次推理的完整结果，返回后不可变，会话不保留。
#[derive(Debug, Clone)]
pub struct InferenceResult {
  /// 检测项，保持引擎输出顺序，不保证有序。
  pub detections: Box<[Detection]>,
  /// 由检测集派生的风险指标。
  pub severity_score: f32,
  /// 推荐动作文本，无显著检测时为空字符串。
  pub advisory: String,
}

/// 把引擎的原始输出规整为类型化的 [`InferenceResult`]。
///
/// 严重度是解码后检测集的确定性纯函数：各项 权重 × 置信度 之和，
/// 不低于配置的下限。建议文本取超过置信度门槛、排名最高且在
/// 建议表中有条目的类别。
pub struct ResultDecoder {
  config: RiskConfig,
}

impl ResultDecoder {
  pub fn new(config: RiskConfig) -> Self {
    ResultDecoder { config }
  }

  pub fn decode(&self, raw: &[RawDetection]) -> InferenceResult {
    let mut detections = Vec::with_capacity(raw.len());
    for entry in raw {
      match parse_detection(entry) {
        Ok(detection) => detections.push(detection),
        // 单个坏条目不影响整体结果
        Err(e) => warn!("丢弃检测项 '{}': {}", entry.label, e),
      }
    }

    let severity_score = self.severity(&detections);
    let advisory = self.advisory(&detections);

    InferenceResult {
      detections: detections.into_boxed_slice(),
      severity_score,
      advisory,
    }
  }

  fn severity(&self, detections: &[Detection]) -> f32 {
    let sum: f32 = detections
      .iter()
      .map(|d| self.config.weight(&d.label) * d.confidence)
      .sum();
    sum.max(self.config.floor)
  }

  fn advisory(&self, detections: &[Detection]) -> String {
    let mut ranked: Vec<&Detection> = detections
      .iter()
      .filter(|d| d.confidence >= self.config.threshold)
      .collect();
    ranked.sort_by(|a, b| {
      let score_a = self.config.weight(&a.label) * a.confidence;
      let score_b = self.config.weight(&b.label) * b.confidence;
      score_b.total_cmp(&score_a)
    });

    for detection in ranked {
      if let Some(text) = self.config.advisory(&detection.label) {
        return text.to_string();
      }
    }
    String::new()
  }
}

/// 解析单个原始检测项。
fn parse_detection(raw: &RawDetection) -> Result<Detection, DecodeError> {
  if raw.label.is_empty() {
    return Err(DecodeError::MalformedDetection("类别名为空".to_string()));
  }
  if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
    return Err(DecodeError::MalformedDetection(format!(
      "置信度超出 [0, 1]: {}",
      raw.confidence
    )));
  }

  let [x, y, width, height]: [f32; 4] = serde_json::from_str(&raw.bbox)
    .map_err(|e| DecodeError::MalformedDetection(format!("边界框 '{}': {}", raw.bbox, e)))?;
  if ![x, y, width, height].iter().all(|v| v.is_finite()) || width < 0.0 || height < 0.0 {
    return Err(DecodeError::MalformedDetection(format!(
      "边界框数值无效: {}",
      raw.bbox
    )));
  }

  Ok(Detection {
    label: raw.label.clone(),
    confidence: raw.confidence,
    bounding_box: BoundingBox {
      x,
      y,
      width,
      height,
    },
  })
}
