// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/remap.rs - 模型输入坐标到显示坐标的映射
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

use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::model::Detection;

#[derive(Error, Debug, PartialEq)]
pub enum RemapError {
  #[error("显示尺寸无效: {0}x{1}")]
  InvalidDisplay(u32, u32),
  #[error("模型输入尺寸无效: {0}")]
  InvalidInputSize(u32),
  #[error("宽高比无效: {0}")]
  InvalidAspect(String),
}

/// 采集画面的宽高比，默认 16:9
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
  pub width: f32,
  pub height: f32,
}

impl AspectRatio {
  pub const WIDESCREEN: AspectRatio = AspectRatio {
    width: 16.0,
    height: 9.0,
  };

  pub fn new(width: f32, height: f32) -> Result<Self, RemapError> {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
      return Err(RemapError::InvalidAspect(format!("{}:{}", width, height)));
    }
    Ok(Self { width, height })
  }

  /// 高 / 宽
  pub fn inverse(&self) -> f32 {
    self.height / self.width
  }
}

impl Default for AspectRatio {
  fn default() -> Self {
    Self::WIDESCREEN
  }
}

impl FromStr for AspectRatio {
  type Err = RemapError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (w, h) = s
      .split_once(':')
      .ok_or_else(|| RemapError::InvalidAspect(s.to_string()))?;
    let w = w
      .trim()
      .parse::<f32>()
      .map_err(|_| RemapError::InvalidAspect(s.to_string()))?;
    let h = h
      .trim()
      .parse::<f32>()
      .map_err(|_| RemapError::InvalidAspect(s.to_string()))?;
    AspectRatio::new(w, h)
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
  pub width: u32,
  pub height: u32,
  pub input_size: u32,
  pub aspect: AspectRatio,
}

impl DisplayGeometry {
  pub fn new(width: u32, height: u32, input_size: u32) -> Self {
    Self {
      width,
      height,
      input_size,
      aspect: AspectRatio::default(),
    }
  }

  pub fn with_aspect(mut self, aspect: AspectRatio) -> Self {
    self.aspect = aspect;
    self
  }
}

#[derive(Debug, Clone, Copy)]
pub struct Remapper {
  scale_x: f32,
  scale_y: f32,
  offset_y: f32,
}

impl Remapper {
  pub fn new(geometry: DisplayGeometry) -> Result<Self, RemapError> {
    if geometry.width == 0 || geometry.height == 0 {
      return Err(RemapError::InvalidDisplay(geometry.width, geometry.height));
    }
    if geometry.input_size == 0 {
      return Err(RemapError::InvalidInputSize(geometry.input_size));
    }

    let width = geometry.width as f32;
    let scale_x = width / geometry.input_size as f32;
    let scale_y = scale_x * geometry.aspect.inverse();
    // 按假定宽高比渲染时的理论高度，与实际高度之差的一半即为上下留边
    let rendered_height = width * geometry.aspect.inverse();
    let offset_y = (rendered_height - geometry.height as f32) / 2.0;

    debug!(
      "坐标映射: scale_x={}, scale_y={}, offset_y={}",
      scale_x, scale_y, offset_y
    );

    Ok(Self {
      scale_x,
      scale_y,
      offset_y,
    })
  }

  pub fn scale_x(&self) -> f32 {
    self.scale_x
  }

  pub fn scale_y(&self) -> f32 {
    self.scale_y
  }

  pub fn offset_y(&self) -> f32 {
    self.offset_y
  }

  /// 原地将检测框从模型输入坐标改写为显示坐标
  pub fn remap(&self, detections: &mut [Detection]) {
    for detection in detections.iter_mut() {
      let bbox = &mut detection.bbox;
      bbox.left *= self.scale_x;
      bbox.right *= self.scale_x;
      bbox.top = bbox.top * self.scale_y - self.offset_y;
      bbox.bottom = bbox.bottom * self.scale_y - self.offset_y;
    }
  }
}
