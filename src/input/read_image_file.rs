// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::NormalizedFrame};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI scheme mismatch")]
  SchemeMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 原始画面及其缩放后的模型输入
#[derive(Debug, Clone)]
pub struct ImageFrame<const S: u32> {
  pub image: RgbImage,
  pub normalized: NormalizedFrame<S>,
}

impl<const S: u32> From<RgbImage> for ImageFrame<S> {
  fn from(image: RgbImage) -> Self {
    let normalized = NormalizedFrame::from(&image);
    Self { image, normalized }
  }
}

pub struct ImageFileInput {
  image: Option<RgbImage>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemeMismatch);
    }

    let path = url.path();
    let image = ImageReader::open(path)?.decode()?.to_rgb8();
    info!("读取图像 {}: {}x{}", path, image.width(), image.height());

    Ok(ImageFileInput { image: Some(image) })
  }
}

impl ImageFileInput {
  pub fn dimensions(&self) -> Option<(u32, u32)> {
    self.image.as_ref().map(RgbImage::dimensions)
  }

  pub fn into_frames<const S: u32>(self) -> ImageFileFrames<S> {
    ImageFileFrames { inner: self }
  }
}

pub struct ImageFileFrames<const S: u32> {
  inner: ImageFileInput,
}

impl<const S: u32> Iterator for ImageFileFrames<S> {
  type Item = ImageFrame<S>;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.image.take().map(ImageFrame::from)
  }
}
