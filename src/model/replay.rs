// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/model/replay.rs - 回放模型：从 JSON 文件读取固定的原始输出张量
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

use std::marker::PhantomData;

use ndarray::Array3;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, model::Model};

#[derive(Error, Debug)]
pub enum ReplayModelError {
  #[error("张量文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("张量文件解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
  #[error("张量维度不一致: {0}")]
  RaggedTensor(String),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
}

/// 不执行推理，对每一帧都返回同一个预先录制的输出张量
pub struct ReplayModel<Frame> {
  output: Array3<f32>,
  _phantom: PhantomData<Frame>,
}

pub struct ReplayModelBuilder {
  tensor_path: String,
}

impl FromUrlWithScheme for ReplayModelBuilder {
  const SCHEME: &'static str = "replay";
}

impl FromUrl for ReplayModelBuilder {
  type Error = ReplayModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ReplayModelError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    Ok(ReplayModelBuilder {
      tensor_path: url.path().to_string(),
    })
  }
}

impl ReplayModelBuilder {
  pub fn build<Frame>(self) -> Result<ReplayModel<Frame>, ReplayModelError> {
    info!("加载张量文件: {}", self.tensor_path);
    let text = std::fs::read_to_string(&self.tensor_path)?;
    let output = parse_tensor(&text)?;
    debug!("张量形状: {:?}", output.shape());

    Ok(ReplayModel {
      output,
      _phantom: PhantomData,
    })
  }
}

/// 解析形如 [[[f32; 锚点数]; 属性数]; 批次] 的嵌套数组
pub fn parse_tensor(text: &str) -> Result<Array3<f32>, ReplayModelError> {
  let nested: Vec<Vec<Vec<f32>>> = serde_json::from_str(text)?;

  let batch = nested.len();
  let attributes = nested.first().map_or(0, Vec::len);
  let anchors = nested
    .first()
    .and_then(|b| b.first())
    .map_or(0, Vec::len);

  let mut flat = Vec::with_capacity(batch * attributes * anchors);
  for (b, plane) in nested.into_iter().enumerate() {
    if plane.len() != attributes {
      return Err(ReplayModelError::RaggedTensor(format!(
        "批次 {} 的属性数为 {}, 期望 {}",
        b,
        plane.len(),
        attributes
      )));
    }
    for (a, row) in plane.into_iter().enumerate() {
      if row.len() != anchors {
        return Err(ReplayModelError::RaggedTensor(format!(
          "批次 {} 属性 {} 的锚点数为 {}, 期望 {}",
          b,
          a,
          row.len(),
          anchors
        )));
      }
      flat.extend(row);
    }
  }

  Array3::from_shape_vec((batch, attributes, anchors), flat)
    .map_err(|e| ReplayModelError::RaggedTensor(e.to_string()))
}

impl<Frame> Model for ReplayModel<Frame> {
  type Input = Frame;
  type Error = ReplayModelError;

  fn infer(&self, _input: &Self::Input) -> Result<Array3<f32>, Self::Error> {
    debug!("回放预先录制的输出张量");
    Ok(self.output.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn parses_nested_tensor() {
    let tensor = parse_tensor("[[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]]").unwrap();
    assert_eq!(tensor.shape(), &[1, 3, 2]);
    assert_eq!(tensor[[0, 2, 1]], 6.0);
  }

  #[test]
  fn rejects_ragged_tensor() {
    let err = parse_tensor("[[[1.0, 2.0], [3.0]]]").unwrap_err();
    assert!(matches!(err, ReplayModelError::RaggedTensor(_)));
  }

  #[test]
  fn rejects_wrong_scheme() {
    let url = Url::parse("image:///tmp/tensor.json").unwrap();
    assert!(ReplayModelBuilder::from_url(&url).is_err());
  }

  #[test]
  fn replays_tensor_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[[[100.0], [100.0], [50.0], [50.0], [0.9]]]").unwrap();

    let url = Url::from_file_path(file.path()).unwrap();
    let url = Url::parse(&url.as_str().replacen("file", "replay", 1)).unwrap();
    let model: ReplayModel<()> = ReplayModelBuilder::from_url(&url).unwrap().build().unwrap();

    let output = model.infer(&()).unwrap();
    assert_eq!(output.shape(), &[1, 5, 1]);
    assert_eq!(output[[0, 4, 0]], 0.9);
  }
}
