// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/output/draw.rs - 检测结果叠加绘制
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

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_hollow_rect_mut, draw_text_mut},
  rect::Rect,
};
use thiserror::Error;
use tracing::warn;

use crate::{
  label::LabelTable,
  model::{DetectResult, Detection},
};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 24.0;
const LABEL_OFFSET_X: i32 = 10;
const BOX_THICKNESS: u32 = 4;
const TEXT_COLOR: [u8; 3] = [255, 255, 255];
// 前三个类别使用固定颜色：红、绿、蓝
const CLASS_COLORS: [[u8; 3]; 3] = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("字体文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体文件无效: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

pub struct Draw {
  font: Option<FontArc>,
  font_size: f32,
  thickness: u32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      font: None,
      font_size: LABEL_FONT_SIZE,
      thickness: BOX_THICKNESS,
    }
  }
}

impl Draw {
  /// 加载字体以绘制类别文本；未加载字体时只绘制边框
  pub fn with_font_file(mut self, path: &str) -> Result<Self, DrawError> {
    let data = std::fs::read(path)?;
    self.font = Some(FontArc::try_from_vec(data)?);
    Ok(self)
  }

  pub fn font_size(mut self, font_size: f32) -> Self {
    self.font_size = font_size;
    self
  }

  fn class_color(class_id: usize) -> Rgb<u8> {
    match CLASS_COLORS.get(class_id) {
      Some(color) => Rgb(*color),
      None => {
        let hue = ((class_id * 47) % 360) as f32;
        hsv_to_rgb(hue, 0.8, 0.9)
      }
    }
  }

  fn draw_detection(&self, image: &mut RgbImage, detection: &Detection, caption: &str) {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let bbox = &detection.bbox;

    // 映射后的坐标可能落在画面外，先裁剪
    let x_min = bbox.left.clamp(0.0, w - 1.0).floor() as i32;
    let y_min = bbox.top.clamp(0.0, h - 1.0).floor() as i32;
    let x_max = bbox.right.clamp(0.0, w - 1.0).ceil() as i32;
    let y_max = bbox.bottom.clamp(0.0, h - 1.0).ceil() as i32;

    if x_min >= x_max || y_min >= y_max {
      warn!("检测框在画面外，跳过绘制: {:?}", bbox);
      return;
    }

    let color = Self::class_color(detection.class_id);
    for t in 0..self.thickness as i32 {
      let width = x_max - x_min + 1 - 2 * t;
      let height = y_max - y_min + 1 - 2 * t;
      if width <= 0 || height <= 0 {
        break;
      }
      let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, color);
    }

    if let Some(font) = &self.font {
      draw_text_mut(
        image,
        Rgb(TEXT_COLOR),
        x_min + LABEL_OFFSET_X,
        y_min + self.thickness as i32,
        PxScale::from(self.font_size),
        font,
        caption,
      );
    }
  }

  pub fn draw_detections(&self, image: &mut RgbImage, result: &DetectResult, labels: &LabelTable) {
    if image.width() == 0 || image.height() == 0 {
      warn!("空画面，跳过绘制");
      return;
    }
    for detection in result.iter() {
      self.draw_detection(image, detection, &labels.caption(detection));
    }
  }
}

/// 可转换为 RGB 图像以便叠加绘制的帧
pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

impl ToRgbImage for RgbImage {
  fn to_rgb_image(&self) -> RgbImage {
    self.clone()
  }
}

#[cfg(feature = "read_image_file")]
impl<const S: u32> ToRgbImage for crate::input::ImageFrame<S> {
  fn to_rgb_image(&self) -> RgbImage {
    self.image.clone()
  }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb<u8> {
  let c = v * s;
  let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
  let m = v - c;

  let (r, g, b) = if h < 60.0 {
    (c, x, 0.0)
  } else if h < 120.0 {
    (x, c, 0.0)
  } else if h < 180.0 {
    (0.0, c, x)
  } else if h < 240.0 {
    (0.0, x, c)
  } else if h < 300.0 {
    (x, 0.0, c)
  } else {
    (c, 0.0, x)
  };

  Rgb([
    ((r + m) * 255.0) as u8,
    ((g + m) * 255.0) as u8,
    ((b + m) * 255.0) as u8,
  ])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry;

  fn result() -> DetectResult {
    DetectResult::from(vec![Detection {
      class_id: 0,
      confidence: 0.9,
      bbox: geometry::Rect::new(2.0, 3.0, 12.0, 13.0),
    }])
  }

  #[test]
  fn draws_box_in_class_color() {
    let labels: LabelTable = "fire\nsmoke".parse().unwrap();
    let mut image = RgbImage::new(20, 20);
    Draw::default().draw_detections(&mut image, &result(), &labels);

    assert_eq!(*image.get_pixel(2, 3), Rgb([255, 0, 0]));
    assert_eq!(*image.get_pixel(12, 13), Rgb([255, 0, 0]));
    // 框内部不填充
    assert_eq!(*image.get_pixel(7, 8), Rgb([0, 0, 0]));
  }

  #[test]
  fn box_outside_image_is_skipped() {
    let labels: LabelTable = "fire".parse().unwrap();
    let mut image = RgbImage::new(10, 10);
    let result = DetectResult::from(vec![Detection {
      class_id: 0,
      confidence: 0.9,
      bbox: geometry::Rect::new(20.0, 20.0, 30.0, 30.0),
    }]);
    Draw::default().draw_detections(&mut image, &result, &labels);
    assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
  }

  #[test]
  fn empty_image_is_left_alone() {
    let labels: LabelTable = "fire".parse().unwrap();
    for (w, h) in [(0, 0), (0, 10), (10, 0)] {
      let mut image = RgbImage::new(w, h);
      Draw::default().draw_detections(&mut image, &result(), &labels);
      assert_eq!(image.dimensions(), (w, h));
    }
  }
}
