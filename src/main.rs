// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use liaowang::{
  FromUrl,
  config::RiskConfig,
  decode::ResultDecoder,
  engine::ReplayEngine,
  session::InferenceSession,
};

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("引擎: {}", args.engine);
  info!("模型资产: {}", args.model);
  info!("图像数量: {}", args.images.len());

  let config = match &args.risk {
    Some(path) => RiskConfig::from_path(path)?,
    None => RiskConfig::default(),
  };

  let engine = ReplayEngine::from_url(&args.engine)?;
  let session = InferenceSession::new(engine, ResultDecoder::new(config));

  info!("正在加载模型...");
  if !session.load_model(&args.model).await {
    let handle = session.handle().await;
    anyhow::bail!(
      "模型加载失败: {}",
      handle.last_error().unwrap_or("未知错误")
    );
  }
  info!("模型就绪");

  for image_ref in &args.images {
    info!("推理图像: {}", image_ref);
    let now = std::time::Instant::now();
    let result = match session.run_inference(image_ref).await {
      Ok(result) => result,
      Err(e) => {
        warn!("图像 {} 推理失败: {}", image_ref, e);
        continue;
      }
    };
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    info!(
      "检测到 {} 个对象，严重度 {:.2}",
      result.detections.len(),
      result.severity_score
    );
    for det in result.detections.iter() {
      info!(
        "  - {}: {:.2}% at ({:.0}, {:.0}, {:.0}x{:.0})",
        det.label,
        det.confidence * 100.0,
        det.bounding_box.x,
        det.bounding_box.y,
        det.bounding_box.width,
        det.bounding_box.height
      );
    }
    if !result.advisory.is_empty() {
      warn!("建议: {}", result.advisory);
    }
  }

  Ok(())
}
