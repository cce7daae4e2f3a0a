// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/nms.rs - 按类别的非极大值抑制
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

use std::collections::BTreeMap;

use tracing::debug;

use crate::{geometry::iou, model::Detection};

#[derive(Debug, Clone, Copy)]
pub struct Suppressor {
  iou_threshold: f32,
}

impl Suppressor {
  pub fn new(iou_threshold: f32) -> Self {
    Self { iou_threshold }
  }

  pub fn iou_threshold(&self) -> f32 {
    self.iou_threshold
  }

  /// 各类别独立做贪心 NMS
  ///
  /// 输出先按类别索引排序，同一类别内按保留顺序（置信度降序）排列。
  /// 置信度相同的检测保留先出现的一个。
  pub fn suppress(&self, detections: Vec<Detection>) -> Vec<Detection> {
    let total = detections.len();

    // 一次性按类别分桶，BTreeMap 保证类别顺序确定
    let mut buckets: BTreeMap<usize, Vec<Detection>> = BTreeMap::new();
    for detection in detections {
      buckets
        .entry(detection.class_id)
        .or_default()
        .push(detection);
    }

    let mut kept = Vec::with_capacity(total);
    for (class_id, bucket) in buckets {
      let before = kept.len();
      self.suppress_class(bucket, &mut kept);
      debug!(
        "类别 {}: 保留 {} 个检测框",
        class_id,
        kept.len() - before
      );
    }

    debug!("NMS 完成: {} -> {}", total, kept.len());
    kept
  }

  fn suppress_class(&self, mut bucket: Vec<Detection>, kept: &mut Vec<Detection>) {
    // 稳定排序，相同置信度保持插入顺序
    bucket.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut alive = vec![true; bucket.len()];
    for i in 0..bucket.len() {
      if !alive[i] {
        continue;
      }
      for j in (i + 1)..bucket.len() {
        if alive[j] && iou(&bucket[i].bbox, &bucket[j].bbox) >= self.iou_threshold {
          alive[j] = false;
        }
      }
    }

    kept.extend(
      bucket
        .into_iter()
        .zip(alive)
        .filter_map(|(detection, alive)| alive.then_some(detection)),
    );
  }
}
