// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/engine/replay.rs - 回放引擎
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
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  engine::{EngineError, InferenceEngine, RawDetection},
};

#[derive(Error, Debug)]
pub enum ReplayEngineError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
}

/// 回放引擎：从 JSON 清单回放预先录制的推理结果。
///
/// “模型”是一个清单文件，内容为 图像标识 -> 原始检测项列表 的映射。
/// 没有平台绑定时，用它把会话与解码流水线完整跑通。
pub struct ReplayEngine {
  base: PathBuf,
  manifest: Option<HashMap<String, Vec<RawDetection>>>,
}

impl FromUrl for ReplayEngine {
  type Error = ReplayEngineError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ReplayEngineError::SchemaMismatch);
    }

    let path = url.path();
    let base = if path.is_empty() {
      PathBuf::from(".")
    } else {
      PathBuf::from(path)
    };

    Ok(ReplayEngine {
      base,
      manifest: None,
    })
  }
}

impl FromUrlWithScheme for ReplayEngine {
  const SCHEME: &'static str = "replay";
}

impl ReplayEngine {
  /// 以 `base` 为根目录创建引擎，相对的清单路径基于该目录解析。
  pub fn new(base: impl Into<PathBuf>) -> Self {
    ReplayEngine {
      base: base.into(),
      manifest: None,
    }
  }
}

impl InferenceEngine for ReplayEngine {
  async fn load_model(&mut self, path: &str) -> Result<(), EngineError> {
    let full = self.base.join(path);
    info!("加载回放清单: {}", full.display());

    let text = std::fs::read_to_string(&full)
      .map_err(|e| EngineError::LoadFailure(format!("{}: {}", full.display(), e)))?;
    let manifest: HashMap<String, Vec<RawDetection>> = serde_json::from_str(&text)
      .map_err(|e| EngineError::LoadFailure(format!("{}: {}", full.display(), e)))?;

    debug!("清单包含 {} 个图像条目", manifest.len());
    self.manifest = Some(manifest);
    Ok(())
  }

  async fn infer(&mut self, image_ref: &str) -> Result<Vec<RawDetection>, EngineError> {
    let manifest = self
      .manifest
      .as_ref()
      .ok_or_else(|| EngineError::InferFailure("清单未加载".to_string()))?;

    manifest
      .get(image_ref)
      .cloned()
      .ok_or_else(|| EngineError::InferFailure(format!("清单中没有图像: {}", image_ref)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write_manifest(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("liaowang-replay-tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
  }

  #[tokio::test]
  async fn load_and_replay() {
    let path = write_manifest(
      "basic.json",
      r#"{ "img-1": [ { "label": "fire", "confidence": 0.92, "box": "[10,20,30,40]" } ] }"#,
    );

    let mut engine = ReplayEngine::new(path.parent().unwrap());
    engine.load_model("basic.json").await.unwrap();

    let raw = engine.infer("img-1").await.unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].label, "fire");
    assert_eq!(raw[0].bbox, "[10,20,30,40]");
  }

  #[tokio::test]
  async fn missing_manifest_is_load_failure() {
    let mut engine = ReplayEngine::new("/nonexistent");
    let err = engine.load_model("nothing.json").await.unwrap_err();
    assert!(matches!(err, EngineError::LoadFailure(_)));
    assert!(!err.is_fatal());
  }

  #[tokio::test]
  async fn unknown_image_is_recoverable() {
    let path = write_manifest("empty.json", "{}");
    let mut engine = ReplayEngine::new(path.parent().unwrap());
    engine.load_model("empty.json").await.unwrap();

    let err = engine.infer("missing").await.unwrap_err();
    assert!(matches!(err, EngineError::InferFailure(_)));
  }

  #[test]
  fn from_url_rejects_wrong_scheme() {
    let url = Url::parse("file:///tmp").unwrap();
    assert!(matches!(
      ReplayEngine::from_url(&url),
      Err(ReplayEngineError::SchemaMismatch)
    ));
  }
}
