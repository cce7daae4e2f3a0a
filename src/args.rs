// 该文件是 Fengyan （烽烟） 项目的一部分。
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

use fengyan::{
  pipeline::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD, PipelineConfig},
  remap::AspectRatio,
};

/// Fengyan 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型地址，如 replay:///path/to/output.json
  #[arg(long, value_name = "MODEL")]
  pub model: Url,

  /// 类别文件，每行一个类别名称
  #[arg(long, value_name = "FILE")]
  pub labels: PathBuf,

  /// 输入来源，如 image:///path/to/frame.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Option<Url>,

  /// 输出路径，如 image:///path/to/out.png 或 log://
  #[arg(long, value_name = "OUTPUT", default_value = "log://")]
  pub output: Url,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_name = "THRESHOLD")]
  pub confidence: f32,

  /// NMS IoU 阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD, value_name = "THRESHOLD")]
  pub iou_threshold: f32,

  /// 显示宽度，默认取输入图像宽度，无输入图像时为 640
  #[arg(long, value_name = "PIXELS")]
  pub display_width: Option<u32>,

  /// 显示高度，默认取输入图像高度，无输入图像时为 360
  #[arg(long, value_name = "PIXELS")]
  pub display_height: Option<u32>,

  /// 采集画面宽高比
  #[arg(long, default_value = "16:9", value_name = "W:H")]
  pub aspect: AspectRatio,

  /// 连续处理的帧数，不指定时只处理一帧
  #[arg(long, value_name = "COUNT")]
  pub frames: Option<usize>,
}

impl Args {
  pub fn pipeline_config(&self) -> PipelineConfig {
    PipelineConfig::default()
      .confidence_threshold(self.confidence)
      .iou_threshold(self.iou_threshold)
      .aspect(self.aspect)
  }
}
