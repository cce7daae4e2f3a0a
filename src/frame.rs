// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/frame.rs - 归一化 NCHW 帧定义
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

const RGB_CHANNELS: usize = 3;
const PIXEL_SCALE: f32 = 255.0;

/// 模型输入帧：S×S，RGB 三个平面依次排列，像素值线性缩放到 [0, 1]
#[derive(Debug, Clone)]
pub struct NormalizedFrame<const S: u32> {
  data: Box<[f32]>,
}

impl<const S: u32> NormalizedFrame<S> {
  const PLANE: usize = S as usize * S as usize;

  pub fn size(&self) -> usize {
    S as usize
  }

  pub fn as_nchw(&self) -> &[f32] {
    &self.data
  }
}

impl<const S: u32> From<&image::RgbImage> for NormalizedFrame<S> {
  fn from(image: &image::RgbImage) -> Self {
    let resized;
    let image = if image.dimensions() == (S, S) {
      image
    } else {
      resized = image::imageops::resize(image, S, S, image::imageops::FilterType::Triangle);
      &resized
    };

    // NHWC 交错字节 -> NCHW 平面
    let mut data = vec![0f32; RGB_CHANNELS * Self::PLANE].into_boxed_slice();
    for (idx, rgb) in image.as_raw().chunks_exact(RGB_CHANNELS).enumerate() {
      for (c, &value) in rgb.iter().enumerate() {
        data[c * Self::PLANE + idx] = value as f32 / PIXEL_SCALE;
      }
    }
    Self { data }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  #[test]
  fn splits_channels_into_planes() {
    // 2x2: 红、绿、蓝、白
    let mut image = RgbImage::new(2, 2);
    image.put_pixel(0, 0, Rgb([255, 0, 0]));
    image.put_pixel(1, 0, Rgb([0, 255, 0]));
    image.put_pixel(0, 1, Rgb([0, 0, 255]));
    image.put_pixel(1, 1, Rgb([255, 255, 255]));
    let frame = NormalizedFrame::<2>::from(&image);

    let data = frame.as_nchw();
    assert_eq!(data.len(), 12);
    assert_eq!(&data[0..4], &[1.0f32, 0.0, 0.0, 1.0]);
    assert_eq!(&data[4..8], &[0.0f32, 1.0, 0.0, 1.0]);
    assert_eq!(&data[8..12], &[0.0f32, 0.0, 1.0, 1.0]);
  }

  #[test]
  fn resizes_image_to_input_size() {
    let image = RgbImage::from_pixel(8, 4, Rgb([51, 102, 255]));
    let frame = NormalizedFrame::<4>::from(&image);
    assert_eq!(frame.size(), 4);

    let data = frame.as_nchw();
    assert!(data[0..16].iter().all(|&v| (v - 0.2).abs() < 5e-3));
    assert!(data[16..32].iter().all(|&v| (v - 0.4).abs() < 5e-3));
    assert!(data[32..48].iter().all(|&v| (v - 1.0).abs() < 5e-3));
  }
}
