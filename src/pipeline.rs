// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/pipeline.rs - 单帧后处理流水线：解码 -> NMS -> 坐标映射
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

use std::sync::{Arc, Mutex, PoisonError};

use ndarray::ArrayView3;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  label::LabelTable,
  model::{DecodeError, DetectResult, Decoder},
  nms::Suppressor,
  remap::{AspectRatio, DisplayGeometry, RemapError, Remapper},
};

pub const DEFAULT_INPUT_SIZE: u32 = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;

#[derive(Error, Debug, PartialEq)]
pub enum PipelineError {
  #[error("解码错误: {0}")]
  Decode(#[from] DecodeError),
  #[error("坐标映射错误: {0}")]
  Remap(#[from] RemapError),
  #[error("阈值无效: {name} = {value}")]
  InvalidThreshold { name: &'static str, value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
  pub input_size: u32,
  pub confidence_threshold: f32,
  pub iou_threshold: f32,
  pub aspect: AspectRatio,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      input_size: DEFAULT_INPUT_SIZE,
      confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
      iou_threshold: DEFAULT_IOU_THRESHOLD,
      aspect: AspectRatio::default(),
    }
  }
}

impl PipelineConfig {
  pub fn input_size(mut self, input_size: u32) -> Self {
    self.input_size = input_size;
    self
  }

  pub fn confidence_threshold(mut self, threshold: f32) -> Self {
    self.confidence_threshold = threshold;
    self
  }

  pub fn iou_threshold(mut self, threshold: f32) -> Self {
    self.iou_threshold = threshold;
    self
  }

  pub fn aspect(mut self, aspect: AspectRatio) -> Self {
    self.aspect = aspect;
    self
  }

  fn validate(&self) -> Result<(), PipelineError> {
    for (name, value) in [
      ("confidence_threshold", self.confidence_threshold),
      ("iou_threshold", self.iou_threshold),
    ] {
      if !(0.0..=1.0).contains(&value) {
        return Err(PipelineError::InvalidThreshold { name, value });
      }
    }
    if self.input_size == 0 {
      return Err(RemapError::InvalidInputSize(self.input_size).into());
    }
    Ok(())
  }
}

pub struct Pipeline {
  labels: LabelTable,
  decoder: Decoder,
  suppressor: Suppressor,
  remapper: Remapper,
}

impl Pipeline {
  pub fn new(
    config: PipelineConfig,
    labels: LabelTable,
    display_width: u32,
    display_height: u32,
  ) -> Result<Self, PipelineError> {
    config.validate()?;

    let geometry = DisplayGeometry::new(display_width, display_height, config.input_size)
      .with_aspect(config.aspect);

    info!(
      "流水线配置: 输入 {}, 置信度阈值 {}, IoU 阈值 {}, 显示 {}x{}, 类别数 {}",
      config.input_size,
      config.confidence_threshold,
      config.iou_threshold,
      display_width,
      display_height,
      labels.len()
    );

    Ok(Self {
      decoder: Decoder::new(config.input_size, config.confidence_threshold),
      suppressor: Suppressor::new(config.iou_threshold),
      remapper: Remapper::new(geometry)?,
      labels,
    })
  }

  pub fn labels(&self) -> &LabelTable {
    &self.labels
  }

  pub fn remapper(&self) -> &Remapper {
    &self.remapper
  }

  /// 处理一帧的原始输出张量，返回显示坐标下的检测结果
  pub fn process(&self, tensor: ArrayView3<f32>) -> Result<DetectResult, PipelineError> {
    let now = std::time::Instant::now();
    let anchor_count = tensor.shape().get(2).copied().unwrap_or(0);

    let candidates = self
      .decoder
      .decode(tensor, anchor_count, self.labels.len())?;
    let candidate_count = candidates.len();
    let mut items = self.suppressor.suppress(candidates);
    self.remapper.remap(&mut items);

    debug!(
      "后处理完成: 锚点 {}, 候选 {}, 保留 {}, 耗时 {:.2?}",
      anchor_count,
      candidate_count,
      items.len(),
      now.elapsed()
    );

    Ok(DetectResult::from(items))
  }
}

/// 单写单读的检测结果交接槽，推理线程发布，显示线程读取最新一帧
#[derive(Debug, Clone, Default)]
pub struct OverlaySlot {
  latest: Arc<Mutex<Arc<DetectResult>>>,
}

impl OverlaySlot {
  pub fn new() -> Self {
    Self::default()
  }

  /// 用新一帧的结果替换旧结果
  pub fn publish(&self, result: DetectResult) {
    let result = Arc::new(result);
    let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
    *latest = result;
  }

  pub fn latest(&self) -> Arc<DetectResult> {
    self
      .latest
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::Array3;

  fn labels() -> LabelTable {
    "fire\nsmoke".parse().unwrap()
  }

  #[test]
  fn rejects_out_of_range_thresholds() {
    let config = PipelineConfig::default().iou_threshold(1.5);
    assert!(matches!(
      Pipeline::new(config, labels(), 640, 360),
      Err(PipelineError::InvalidThreshold {
        name: "iou_threshold",
        ..
      })
    ));
  }

  #[test]
  fn empty_frame_is_not_an_error() {
    let pipeline = Pipeline::new(PipelineConfig::default(), labels(), 640, 360).unwrap();
    let tensor = Array3::<f32>::zeros((1, 6, 8));
    let result = pipeline.process(tensor.view()).unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn wrong_label_count_fails_frame() {
    let pipeline = Pipeline::new(PipelineConfig::default(), labels(), 640, 360).unwrap();
    let tensor = Array3::<f32>::from_elem((1, 7, 4), 0.9);
    assert!(matches!(
      pipeline.process(tensor.view()),
      Err(PipelineError::Decode(DecodeError::ShapeMismatch { .. }))
    ));
  }

  #[test]
  fn slot_hands_over_latest_result() {
    let slot = OverlaySlot::new();
    assert!(slot.latest().is_empty());

    let reader = slot.clone();
    let writer = std::thread::spawn(move || {
      slot.publish(DetectResult::from(vec![crate::model::Detection {
        class_id: 0,
        confidence: 0.9,
        bbox: crate::geometry::Rect::new(1.0, 2.0, 3.0, 4.0),
      }]));
    });
    writer.join().unwrap();

    assert_eq!(reader.latest().len(), 1);
  }
}
