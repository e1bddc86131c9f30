// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/session.rs - 推理会话管理
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
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::decode::{InferenceResult, ResultDecoder};
use crate::engine::{EngineError, InferenceEngine};

/// 模型句柄的生命周期状态。
///
/// `Unloaded → Loading → Ready | Failed`，回边只有
/// `Ready → Loading`（换模型重载）与 `Failed → Loading`（重试）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
  Unloaded,
  Loading,
  Ready,
  Failed,
}

/// 已加载模型的句柄，只由所属会话的加载操作改变。
#[derive(Debug, Clone)]
pub struct ModelHandle {
  state: ModelState,
  path: Option<String>,
  last_error: Option<String>,
}

impl ModelHandle {
  fn new() -> Self {
    ModelHandle {
      state: ModelState::Unloaded,
      path: None,
      last_error: None,
    }
  }

  pub fn state(&self) -> ModelState {
    self.state
  }

  /// 当前（或正在加载的）模型资产标识。
  pub fn path(&self) -> Option<&str> {
    self.path.as_deref()
  }

  /// 最近一次失败的描述。
  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }
}

#[derive(Error, Debug)]
pub enum SessionError {
  /// 前置条件不满足：模型不在 Ready 状态。调用方错误，不会自动重试。
  #[error("模型未就绪，当前状态: {0:?}")]
  ModelNotReady(ModelState),
  /// 单次推理失败，会话保持 Ready，可以重试同一调用。
  #[error("推理失败: {0}")]
  EngineFailure(String),
  /// 引擎不可恢复故障，会话转入 Failed，需要重新加载模型。
  #[error("引擎不可恢复故障: {0}")]
  EngineFault(String),
}

struct Inner<E> {
  engine: E,
  handle: ModelHandle,
}

/// 推理会话：独占一个模型句柄，串行化加载与推理。
///
/// 加载与推理共用一把公平锁（tokio 的互斥锁按 FIFO 排队），
/// 同一时刻至多一个操作在引擎上执行；等待中的调用方协作式挂起，
/// 排队中的请求随 future 一起丢弃即取消，对会话无副作用。
/// 重载请求同样排队，先于它到达的推理调用先跑完。
pub struct InferenceSession<E> {
  inner: Mutex<Inner<E>>,
  decoder: ResultDecoder,
}

impl<E: InferenceEngine> InferenceSession<E> {
  pub fn new(engine: E, decoder: ResultDecoder) -> Self {
    InferenceSession {
      inner: Mutex::new(Inner {
        engine,
        handle: ModelHandle::new(),
      }),
      decoder,
    }
  }

  /// 加载（或重载）模型。
  ///
  /// 到达 Ready 返回 `true`；任何失败都返回 `false` 并记入
  /// `last_error`，不会向上抛错。
  pub async fn load_model(&self, path: &str) -> bool {
    let mut inner = self.inner.lock().await;

    if path.is_empty() {
      warn!("模型路径为空，拒绝加载");
      inner.handle.state = ModelState::Failed;
      inner.handle.last_error = Some("模型路径为空".to_string());
      return false;
    }

    info!("加载模型: {}", path);
    inner.handle.state = ModelState::Loading;
    inner.handle.path = Some(path.to_string());

    match inner.engine.load_model(path).await {
      Ok(()) => {
        inner.handle.state = ModelState::Ready;
        inner.handle.last_error = None;
        info!("模型就绪: {}", path);
        true
      }
      Err(e) => {
        warn!("模型加载失败: {}", e);
        inner.handle.state = ModelState::Failed;
        inner.handle.last_error = Some(e.to_string());
        false
      }
    }
  }

  /// 对一张图像执行推理，结果经解码器规整后返回。
  pub async fn run_inference(&self, image_ref: &str) -> Result<InferenceResult, SessionError> {
    let mut inner = self.inner.lock().await;

    if inner.handle.state != ModelState::Ready {
      return Err(SessionError::ModelNotReady(inner.handle.state));
    }

    debug!("推理图像: {}", image_ref);
    match inner.engine.infer(image_ref).await {
      Ok(raw) => {
        let result = self.decoder.decode(&raw);
        debug!(
          "推理完成: {} 个检测项，严重度 {:.2}",
          result.detections.len(),
          result.severity_score
        );
        Ok(result)
      }
      Err(EngineError::Fatal(msg)) => {
        error!("引擎不可恢复故障: {}", msg);
        inner.handle.state = ModelState::Failed;
        inner.handle.last_error = Some(msg.clone());
        Err(SessionError::EngineFault(msg))
      }
      // 单次失败不卸载模型
      Err(e) => Err(SessionError::EngineFailure(e.to_string())),
    }
  }

  /// 当前状态快照。
  pub async fn state(&self) -> ModelState {
    self.inner.lock().await.handle.state
  }

  /// 模型句柄快照。
  pub async fn handle(&self) -> ModelHandle {
    self.inner.lock().await.handle.clone()
  }
}
