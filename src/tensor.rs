// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/tensor.rs - 模型原始输出张量
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

use ndarray::{ArrayView2, ArrayView3, Axis};
use tracing::error;

use crate::model::DecodeError;

/// 每个锚点前 4 个属性为 cx, cy, w, h
pub const BOX_ATTRIBUTES: usize = 4;

/// 已校验形状的 [1][4 + 类别数][锚点数] 输出
#[derive(Debug, Clone, Copy)]
pub struct RawOutput<'a> {
  // [属性][锚点]
  view: ArrayView2<'a, f32>,
  label_count: usize,
}

impl<'a> RawOutput<'a> {
  /// 形状必须恰好为 [1, 4 + label_count, anchor_count]
  pub fn new(
    tensor: ArrayView3<'a, f32>,
    anchor_count: usize,
    label_count: usize,
  ) -> Result<Self, DecodeError> {
    if label_count == 0 {
      error!("类别表为空，无法解码");
      return Err(DecodeError::EmptyLabels);
    }

    let expected_attributes = BOX_ATTRIBUTES + label_count;
    if tensor.shape() != [1, expected_attributes, anchor_count] {
      error!(
        "张量形状不匹配: 期望 [1, {}, {}], 实际 {:?}",
        expected_attributes,
        anchor_count,
        tensor.shape()
      );
      return Err(DecodeError::ShapeMismatch {
        expected_attributes,
        expected_anchors: anchor_count,
        actual: tensor.shape().to_vec(),
      });
    }

    Ok(Self {
      view: tensor.index_axis_move(Axis(0), 0),
      label_count,
    })
  }

  pub fn anchor_count(&self) -> usize {
    self.view.ncols()
  }

  pub fn label_count(&self) -> usize {
    self.label_count
  }

  /// 转置为 [锚点][属性]，不复制数据
  pub fn anchors(&self) -> ArrayView2<'a, f32> {
    self.view.reversed_axes()
  }
}
