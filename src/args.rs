// 该文件是 Liaowang （瞭望） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// Liaowang 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 推理引擎 URI
  /// 支持方案:
  /// - replay://<目录>  从 JSON 清单回放录制结果
  #[arg(long, value_name = "ENGINE")]
  pub engine: Url,

  /// 模型资产标识，由引擎解析
  #[arg(long, value_name = "MODEL")]
  pub model: String,

  /// 待分析的图像标识，可重复
  #[arg(long = "image", value_name = "IMAGE", required = true)]
  pub images: Vec<String>,

  /// 风险配置文件路径（JSON），缺省使用内置表
  #[arg(long, value_name = "FILE")]
  pub risk: Option<PathBuf>,
}
