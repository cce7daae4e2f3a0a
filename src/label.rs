// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/label.rs - 类别表
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

use crate::model::Detection;

#[derive(Error, Debug, PartialEq)]
pub enum LabelError {
  #[error("类别表为空")]
  Empty,
}

/// 有序类别名称表，下标与张量中的类别得分一一对应
///
/// 构造时拒绝空表，持有 `LabelTable` 即保证至少一个类别。
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
  labels: Box<[String]>,
}

impl LabelTable {
  pub fn new(labels: Vec<String>) -> Result<Self, LabelError> {
    if labels.is_empty() {
      return Err(LabelError::Empty);
    }
    Ok(Self {
      labels: labels.into_boxed_slice(),
    })
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn get(&self, class_id: usize) -> Option<&str> {
    self.labels.get(class_id).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.labels.iter().map(String::as_str)
  }

  /// 叠加显示用的文本，如 "fire, 87%"
  pub fn caption(&self, detection: &Detection) -> String {
    let name = self.get(detection.class_id).unwrap_or("unknown");
    format!("{}, {}%", name, (detection.confidence * 100.0).round() as i32)
  }
}

/// 每行一个类别名称，忽略空行
impl FromStr for LabelTable {
  type Err = LabelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let labels = s
      .lines()
      .map(str::trim_end)
      .filter(|line| !line.is_empty())
      .map(str::to_string)
      .collect();
    LabelTable::new(labels)
  }
}
