// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/output/log_output.rs - 以日志形式输出检测结果
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

use std::convert::Infallible;

use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  label::LabelTable,
  model::{DetectResult, Detection},
  output::{OutputError, Render},
};

/// 以文本行记录检测结果：`类别, 置信度, left, top, right, bottom`
pub struct Record {
  pub label_with_name: bool,
}

impl Record {
  pub fn format_line(&self, detection: &Detection, labels: &LabelTable) -> String {
    let name = match labels.get(detection.class_id) {
      Some(name) if self.label_with_name => name.to_string(),
      _ => detection.class_id.to_string(),
    };
    let bbox = &detection.bbox;
    format!(
      "{}, {:.4}, {:.1}, {:.1}, {:.1}, {:.1}",
      name, detection.confidence, bbox.left, bbox.top, bbox.right, bbox.bottom
    )
  }

  pub fn format(&self, result: &DetectResult, labels: &LabelTable) -> String {
    result
      .iter()
      .map(|detection| self.format_line(detection, labels))
      .collect::<Vec<_>>()
      .join("\n")
  }
}

/// `log://`，可选 `?record=id` 以类别索引代替名称
pub struct LogOutput {
  record: Record,
}

impl FromUrlWithScheme for LogOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogOutput {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch);
    }

    let label_with_name = !url.query_pairs().any(|(k, v)| k == "record" && v == "id");
    Ok(LogOutput {
      record: Record { label_with_name },
    })
  }
}

impl<Frame> Render<Frame> for LogOutput {
  type Error = Infallible;

  fn render_result(
    &self,
    _frame: &Frame,
    result: &DetectResult,
    labels: &LabelTable,
  ) -> Result<(), Self::Error> {
    info!("检测到 {} 个目标", result.len());
    for detection in result.iter() {
      info!("  - {}", self.record.format_line(detection, labels));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Rect;

  fn result() -> DetectResult {
    DetectResult::from(vec![Detection {
      class_id: 0,
      confidence: 0.9,
      bbox: Rect::new(2.0, 3.0, 12.0, 13.0),
    }])
  }

  #[test]
  fn record_lines() {
    let labels: LabelTable = "fire\nsmoke".parse().unwrap();
    let by_name = Record {
      label_with_name: true,
    };
    let by_id = Record {
      label_with_name: false,
    };
    assert_eq!(
      by_name.format(&result(), &labels),
      "fire, 0.9000, 2.0, 3.0, 12.0, 13.0"
    );
    assert_eq!(
      by_id.format(&result(), &labels),
      "0, 0.9000, 2.0, 3.0, 12.0, 13.0"
    );
  }

  #[test]
  fn record_query_selects_ids() {
    let output = LogOutput::from_url(&Url::parse("log://?record=id").unwrap()).unwrap();
    assert!(!output.record.label_with_name);
    let output = LogOutput::from_url(&Url::parse("log://").unwrap()).unwrap();
    assert!(output.record.label_with_name);
  }

  #[test]
  fn renders_any_frame() {
    let labels: LabelTable = "fire".parse().unwrap();
    let output = LogOutput::from_url(&Url::parse("log://").unwrap()).unwrap();
    assert!(output.render_result(&(), &result(), &labels).is_ok());
  }
}
