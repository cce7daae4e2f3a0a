// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/geometry.rs - 矩形与重叠计算
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

/// 轴对齐矩形，坐标为 [left, top, right, bottom]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
  pub left: f32,
  pub top: f32,
  pub right: f32,
  pub bottom: f32,
}

impl Rect {
  pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
    Self {
      left,
      top,
      right,
      bottom,
    }
  }

  /// 由中心点与宽高构造矩形，并裁剪到 [0, bound] 范围内
  pub fn from_center_clamped(cx: f32, cy: f32, w: f32, h: f32, bound: f32) -> Self {
    let left = (cx - w / 2.0).max(0.0);
    let top = (cy - h / 2.0).max(0.0);
    let right = (cx + w / 2.0).min(bound);
    let bottom = (cy + h / 2.0).min(bound);
    // 锚点完全落在范围外时，保证 left <= right, top <= bottom
    Self {
      left: left.min(right.max(0.0)),
      top: top.min(bottom.max(0.0)),
      right: right.max(left.min(bound)),
      bottom: bottom.max(top.min(bound)),
    }
  }

  pub fn width(&self) -> f32 {
    self.right - self.left
  }

  pub fn height(&self) -> f32 {
    self.bottom - self.top
  }

  pub fn center_x(&self) -> f32 {
    (self.left + self.right) / 2.0
  }

  pub fn center_y(&self) -> f32 {
    (self.top + self.bottom) / 2.0
  }

  pub fn area(&self) -> f32 {
    self.width() * self.height()
  }
}

/// 两个以中心和长度表示的一维区间的有符号重叠长度，<= 0 表示不重叠
pub fn overlap_1d(center1: f32, width1: f32, center2: f32, width2: f32) -> f32 {
  let left = (center1 - width1 / 2.0).max(center2 - width2 / 2.0);
  let right = (center1 + width1 / 2.0).min(center2 + width2 / 2.0);
  right - left
}

/// 两矩形交集面积
pub fn intersection(a: &Rect, b: &Rect) -> f32 {
  let w = overlap_1d(a.center_x(), a.width(), b.center_x(), b.width());
  let h = overlap_1d(a.center_y(), a.height(), b.center_y(), b.height());
  if w < 0.0 || h < 0.0 {
    return 0.0;
  }
  w * h
}

/// 两矩形并集面积
pub fn union(a: &Rect, b: &Rect) -> f32 {
  a.area() + b.area() - intersection(a, b)
}

/// 交并比，并集为 0 的退化矩形视为不重叠
pub fn iou(a: &Rect, b: &Rect) -> f32 {
  let inter = intersection(a, b);
  let union = a.area() + b.area() - inter;
  if union > 0.0 {
    (inter / union).clamp(0.0, 1.0)
  } else {
    0.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const EPS: f32 = 1e-6;

  #[test]
  fn overlap_1d_is_signed() {
    assert_eq!(overlap_1d(10.0, 10.0, 14.0, 10.0), 6.0);
    assert_eq!(overlap_1d(10.0, 10.0, 20.0, 10.0), 0.0);
    assert!(overlap_1d(10.0, 2.0, 20.0, 2.0) < 0.0);
  }

  #[test]
  fn iou_of_self_is_one() {
    let a = Rect::new(10.0, 20.0, 60.0, 90.0);
    assert!((iou(&a, &a) - 1.0).abs() < EPS);
  }

  #[test]
  fn iou_is_symmetric_and_bounded() {
    let boxes = [
      Rect::new(0.0, 0.0, 10.0, 10.0),
      Rect::new(5.0, 5.0, 15.0, 15.0),
      Rect::new(2.0, 3.0, 4.0, 30.0),
      Rect::new(-5.0, 1.0, 7.5, 2.0),
      Rect::new(100.0, 100.0, 120.0, 130.0),
    ];
    for a in &boxes {
      for b in &boxes {
        let ab = iou(a, b);
        let ba = iou(b, a);
        assert!((ab - ba).abs() < EPS, "{a:?} {b:?}");
        assert!((0.0..=1.0).contains(&ab));
      }
    }
  }

  #[test]
  fn partial_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 15.0, 15.0);
    assert!((intersection(&a, &b) - 25.0).abs() < EPS);
    assert!((union(&a, &b) - 175.0).abs() < EPS);
    assert!((iou(&a, &b) - 25.0 / 175.0).abs() < EPS);
  }

  #[test]
  fn disjoint_boxes_do_not_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(20.0, 0.0, 30.0, 10.0);
    let c = Rect::new(0.0, 40.0, 10.0, 50.0);
    assert_eq!(intersection(&a, &b), 0.0);
    assert_eq!(iou(&a, &b), 0.0);
    assert_eq!(intersection(&a, &c), 0.0);
    assert_eq!(iou(&a, &c), 0.0);
  }

  #[test]
  fn degenerate_boxes_have_zero_iou() {
    let point = Rect::new(5.0, 5.0, 5.0, 5.0);
    assert_eq!(iou(&point, &point), 0.0);
    let line = Rect::new(0.0, 5.0, 10.0, 5.0);
    assert_eq!(iou(&line, &line), 0.0);
  }

  #[test]
  fn from_center_clamps_to_bounds() {
    let r = Rect::from_center_clamped(10.0, 630.0, 40.0, 40.0, 639.0);
    assert_eq!(r, Rect::new(0.0, 610.0, 30.0, 639.0));
    assert!(r.left <= r.right && r.top <= r.bottom);
  }

  #[test]
  fn from_center_outside_keeps_ordering() {
    let r = Rect::from_center_clamped(-100.0, 800.0, 10.0, 10.0, 639.0);
    assert!(r.left <= r.right);
    assert!(r.top <= r.bottom);
  }
}
