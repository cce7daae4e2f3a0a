// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/output.rs - 输出定义
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

use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, label::LabelTable, model::DetectResult};

/// 渲染端：绘制矩形与 "类别, NN%" 文本
pub trait Render<Frame>: Sized {
  type Error;
  fn render_result(
    &self,
    frame: &Frame,
    result: &DetectResult,
    labels: &LabelTable,
  ) -> Result<(), Self::Error>;
}

mod log_output;
pub use self::log_output::{LogOutput, Record};

#[cfg(feature = "save_image_file")]
pub mod draw;

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "save_image_file")]
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

impl From<std::convert::Infallible> for OutputError {
  fn from(err: std::convert::Infallible) -> Self {
    match err {}
  }
}

pub enum OutputWrapper {
  #[cfg(feature = "save_image_file")]
  SaveImageFileOutput(SaveImageFileOutput),
  LogOutput(LogOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "save_image_file")]
      SaveImageFileOutput::SCHEME => {
        let output = SaveImageFileOutput::from_url(url)?;
        Ok(OutputWrapper::SaveImageFileOutput(output))
      }
      LogOutput::SCHEME => {
        let output = LogOutput::from_url(url)?;
        Ok(OutputWrapper::LogOutput(output))
      }
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

#[cfg(feature = "save_image_file")]
impl<Frame: draw::ToRgbImage> Render<Frame> for OutputWrapper {
  type Error = OutputError;

  fn render_result(
    &self,
    frame: &Frame,
    result: &DetectResult,
    labels: &LabelTable,
  ) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::SaveImageFileOutput(output) => output
        .render_result(frame, result, labels)
        .map_err(OutputError::from),
      OutputWrapper::LogOutput(output) => output
        .render_result(frame, result, labels)
        .map_err(OutputError::from),
    }
  }
}

#[cfg(not(feature = "save_image_file"))]
impl<Frame> Render<Frame> for OutputWrapper {
  type Error = OutputError;

  fn render_result(
    &self,
    frame: &Frame,
    result: &DetectResult,
    labels: &LabelTable,
  ) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::LogOutput(output) => output
        .render_result(frame, result, labels)
        .map_err(OutputError::from),
    }
  }
}
