// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/model/decode.rs - 原始输出张量解码
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

use ndarray::{ArrayView1, ArrayView3};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
  geometry::Rect,
  model::Detection,
  tensor::{BOX_ATTRIBUTES, RawOutput},
};

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
  #[error("类别表为空")]
  EmptyLabels,
  #[error("张量形状不匹配: 期望 [1, {expected_attributes}, {expected_anchors}], 实际 {actual:?}")]
  ShapeMismatch {
    expected_attributes: usize,
    expected_anchors: usize,
    actual: Vec<usize>,
  },
}

#[derive(Debug, Clone)]
pub struct Decoder {
  input_size: f32,
  confidence_threshold: f32,
}

impl Decoder {
  pub fn new(input_size: u32, confidence_threshold: f32) -> Self {
    Self {
      input_size: input_size as f32,
      confidence_threshold,
    }
  }

  pub fn confidence_threshold(&self) -> f32 {
    self.confidence_threshold
  }

  /// 将 [1][属性][锚点] 的原始张量解码为候选检测，按锚点顺序输出
  ///
  /// 形状不符时整帧失败，不做部分解码。
  pub fn decode(
    &self,
    tensor: ArrayView3<f32>,
    anchor_count: usize,
    label_count: usize,
  ) -> Result<Vec<Detection>, DecodeError> {
    let raw = RawOutput::new(tensor, anchor_count, label_count)?;
    let anchors = raw.anchors();
    let bound = self.input_size - 1.0;

    let mut items = Vec::new();
    for (anchor_idx, row) in anchors.outer_iter().enumerate() {
      let (class_id, confidence) = best_class(row.slice(ndarray::s![BOX_ATTRIBUTES..]));
      trace!(
        "锚点 {}: 类别 {}, 置信度 {}",
        anchor_idx, class_id, confidence
      );

      if confidence <= self.confidence_threshold {
        continue;
      }

      let bbox = Rect::from_center_clamped(row[0], row[1], row[2], row[3], bound);
      items.push(Detection {
        class_id,
        confidence,
        bbox,
      });
    }

    debug!("解码得到 {} 个候选框", items.len());
    Ok(items)
  }
}

/// 取最大得分类别，得分相同时保留较小的类别索引
fn best_class(scores: ArrayView1<f32>) -> (usize, f32) {
  scores
    .iter()
    .enumerate()
    .fold((0, f32::NEG_INFINITY), |(best_id, best), (id, &score)| {
      if score > best { (id, score) } else { (best_id, best) }
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::Array3;

  /// 按锚点列出 [cx, cy, w, h, score...]，生成 [1][属性][锚点] 张量
  fn tensor_from_anchors(anchors: &[Vec<f32>]) -> Array3<f32> {
    let attributes = anchors[0].len();
    Array3::from_shape_fn((1, attributes, anchors.len()), |(_, a, i)| {
      anchors[i][a]
    })
  }

  #[test]
  fn single_anchor_above_threshold() {
    let tensor = tensor_from_anchors(&[
      vec![100.0, 100.0, 20.0, 20.0, 0.1, 0.2, 0.05, 0.1, 0.0],
      vec![200.0, 200.0, 20.0, 20.0, 0.1, 0.2, 0.05, 0.9, 0.0],
      vec![300.0, 300.0, 20.0, 20.0, 0.3, 0.1, 0.2, 0.1, 0.35],
    ]);
    let decoder = Decoder::new(640, 0.4);
    let items = decoder.decode(tensor.view(), 3, 5).unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].class_id, 3);
    assert_eq!(items[0].confidence, 0.9);
    assert_eq!(items[0].bbox, Rect::new(190.0, 190.0, 210.0, 210.0));
  }

  #[test]
  fn confidence_is_exact_max_score() {
    let base = vec![50.0, 50.0, 10.0, 10.0, 0.2, 0.7, 0.3];
    let mut changed = base.clone();
    changed[4] = 0.69;
    changed[6] = 0.0;

    let decoder = Decoder::new(640, 0.4);
    let a = decoder
      .decode(tensor_from_anchors(&[base]).view(), 1, 3)
      .unwrap();
    let b = decoder
      .decode(tensor_from_anchors(&[changed]).view(), 1, 3)
      .unwrap();

    assert_eq!(a.len(), 1);
    assert_eq!(a[0].class_id, 1);
    assert_eq!(a[0].confidence, 0.7);
    assert_eq!(a[0].class_id, b[0].class_id);
    assert_eq!(a[0].confidence, b[0].confidence);
  }

  #[test]
  fn ties_keep_lowest_class_index() {
    let tensor = tensor_from_anchors(&[vec![50.0, 50.0, 10.0, 10.0, 0.1, 0.8, 0.8, 0.8]]);
    let items = Decoder::new(640, 0.4)
      .decode(tensor.view(), 1, 4)
      .unwrap();
    assert_eq!(items[0].class_id, 1);
  }

  #[test]
  fn score_at_threshold_is_dropped() {
    let tensor = tensor_from_anchors(&[vec![50.0, 50.0, 10.0, 10.0, 0.4]]);
    let items = Decoder::new(640, 0.4)
      .decode(tensor.view(), 1, 1)
      .unwrap();
    assert!(items.is_empty());
  }

  #[test]
  fn boxes_are_clamped_to_input() {
    let tensor = tensor_from_anchors(&[vec![5.0, 635.0, 30.0, 30.0, 0.9]]);
    let items = Decoder::new(640, 0.4)
      .decode(tensor.view(), 1, 1)
      .unwrap();
    assert_eq!(items[0].bbox, Rect::new(0.0, 620.0, 20.0, 639.0));
  }

  #[test]
  fn shape_mismatch_is_rejected() {
    let tensor = tensor_from_anchors(&[vec![50.0, 50.0, 10.0, 10.0, 0.9, 0.1]]);
    let decoder = Decoder::new(640, 0.4);

    assert!(matches!(
      decoder.decode(tensor.view(), 1, 3),
      Err(DecodeError::ShapeMismatch { .. })
    ));
    assert!(matches!(
      decoder.decode(tensor.view(), 2, 2),
      Err(DecodeError::ShapeMismatch { .. })
    ));
    assert_eq!(
      decoder.decode(tensor.view(), 1, 0),
      Err(DecodeError::EmptyLabels)
    );
  }

  #[test]
  fn batch_axis_must_be_one() {
    let tensor = Array3::<f32>::zeros((2, 5, 3));
    let decoder = Decoder::new(640, 0.4);
    assert!(decoder.decode(tensor.view(), 3, 1).is_err());
  }
}
