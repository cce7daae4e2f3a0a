// 该文件是 Fengyan （烽烟） 项目的一部分。
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

use anyhow::{Context, Result};
use clap::Parser;
use image::RgbImage;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fengyan::{
  FromUrl,
  input::{ImageFileInput, ImageFrame},
  label::LabelTable,
  model::ReplayModelBuilder,
  output::OutputWrapper,
  pipeline::{DEFAULT_INPUT_SIZE, Pipeline},
  task::{ContinuousTask, OneShotTask, Task},
};

const INPUT_SIZE: u32 = DEFAULT_INPUT_SIZE;
// 没有输入图像时使用的 16:9 画面
const FALLBACK_DISPLAY: (u32, u32) = (640, 360);

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = args::Args::parse();

  info!("模型地址: {}", args.model);
  info!("类别文件: {}", args.labels.display());
  info!("输出路径: {}", args.output);

  let labels: LabelTable = std::fs::read_to_string(&args.labels)
    .with_context(|| format!("无法读取类别文件: {}", args.labels.display()))?
    .parse()?;
  info!("加载 {} 个类别", labels.len());

  let model = ReplayModelBuilder::from_url(&args.model)?.build::<ImageFrame<INPUT_SIZE>>()?;
  let input = args
    .input
    .as_ref()
    .map(ImageFileInput::from_url)
    .transpose()?;

  let surface = input
    .as_ref()
    .and_then(ImageFileInput::dimensions)
    .unwrap_or(FALLBACK_DISPLAY);
  let display_width = args.display_width.unwrap_or(surface.0);
  let display_height = args.display_height.unwrap_or(surface.1);

  let pipeline = Pipeline::new(
    args.pipeline_config(),
    labels,
    display_width,
    display_height,
  )?;
  let output = OutputWrapper::from_url(&args.output)?;

  let frames: Box<dyn Iterator<Item = ImageFrame<INPUT_SIZE>>> = match input {
    Some(input) => Box::new(input.into_frames::<INPUT_SIZE>()),
    None => Box::new(std::iter::repeat_with(move || {
      ImageFrame::<INPUT_SIZE>::from(RgbImage::new(display_width, display_height))
    })),
  };

  match args.frames {
    Some(n) => ContinuousTask::default()
      .with_frame_number(Some(n))
      .run_task(frames, model, &pipeline, output),
    None => OneShotTask.run_task(frames, model, &pipeline, output),
  }
}
