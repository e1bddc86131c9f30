// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/engine.rs - 推理引擎接口
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

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 引擎返回的原始检测项（线格式）。
///
/// `bbox` 是序列化的四元数组字符串 `"[x, y, w, h]"`，
/// 由 [`crate::decode::ResultDecoder`] 解析为结构化边界框。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
  pub label: String,
  pub confidence: f32,
  #[serde(rename = "box")]
  pub bbox: String,
}

#[derive(Error, Debug)]
pub enum EngineError {
  /// 模型资产无法加载（路径无效、格式不支持等）。
  #[error("模型加载失败: {0}")]
  LoadFailure(String),
  /// 单次推理失败，引擎仍可继续服务。
  #[error("推理调用失败: {0}")]
  InferFailure(String),
  /// 引擎不可恢复故障，之后的调用都不会成功。
  #[error("引擎故障，无法继续服务: {0}")]
  Fatal(String),
}

impl EngineError {
  /// 该错误之后引擎是否已无法服务任何调用。
  pub fn is_fatal(&self) -> bool {
    matches!(self, EngineError::Fatal(_))
  }
}

/// 推理引擎能力：加载模型与执行推理。
///
/// 每个目标平台/后端实现一个变体；会话管理只依赖此接口，
/// 不依赖任何具体平台绑定。`path` 与 `image_ref` 的解析
/// （文件存在性、模型格式）均由引擎自行负责。
#[allow(async_fn_in_trait)]
pub trait InferenceEngine {
  async fn load_model(&mut self, path: &str) -> Result<(), EngineError>;
  async fn infer(&mut self, image_ref: &str) -> Result<Vec<RawDetection>, EngineError>;
}

mod replay;
pub use self::replay::ReplayEngine;
