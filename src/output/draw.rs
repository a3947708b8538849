// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
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

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::model::{DetectItem, DetectResult};

const BOX_LINE_WIDTH: u32 = 2;

// 与检测器绘图配色一致，按类别循环取色
const PALETTE: [[u8; 3]; 20] = [
  [0xFF, 0x38, 0x38],
  [0xFF, 0x9D, 0x97],
  [0xFF, 0x70, 0x1F],
  [0xFF, 0xB2, 0x1D],
  [0xCF, 0xD2, 0x31],
  [0x48, 0xF9, 0x0A],
  [0x92, 0xCC, 0x17],
  [0x3D, 0xDB, 0x86],
  [0x1A, 0x93, 0x34],
  [0x00, 0xD4, 0xBB],
  [0x2C, 0x99, 0xA8],
  [0x00, 0xC2, 0xFF],
  [0x34, 0x45, 0x93],
  [0x64, 0x73, 0xFF],
  [0x00, 0x18, 0xEC],
  [0x84, 0x38, 0xFF],
  [0x52, 0x00, 0x85],
  [0xCB, 0x38, 0xFF],
  [0xFF, 0x95, 0xC8],
  [0xFF, 0x37, 0xC7],
];

/// 只绘制边框，不绘制类别与分数
#[derive(Debug, Clone)]
pub struct Draw {
  line_width: u32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      line_width: BOX_LINE_WIDTH,
    }
  }
}

impl Draw {
  pub fn color_of(class_id: u32) -> Rgb<u8> {
    Rgb(PALETTE[class_id as usize % PALETTE.len()])
  }

  // bbox 为归一化坐标 [x_min, y_min, x_max, y_max]，线宽向框内延伸
  fn draw_bbox(&self, image: &mut RgbImage, item: &DetectItem) {
    let (w, h) = (image.width() as f32, image.height() as f32);
    if w < 1.0 || h < 1.0 {
      return;
    }

    let x_min = ((item.bbox[0] * w).floor() as i32).clamp(0, w as i32 - 1);
    let y_min = ((item.bbox[1] * h).floor() as i32).clamp(0, h as i32 - 1);
    let x_max = ((item.bbox[2] * w).ceil() as i32).clamp(0, w as i32 - 1);
    let y_max = ((item.bbox[3] * h).ceil() as i32).clamp(0, h as i32 - 1);

    let color = Self::color_of(item.class_id);
    for t in 0..self.line_width as i32 {
      let width = x_max - x_min - 2 * t + 1;
      let height = y_max - y_min - 2 * t + 1;
      if width <= 0 || height <= 0 {
        break;
      }
      let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, color);
    }
  }

  pub fn draw_detections_on_image(&self, image: &mut RgbImage, result: &DetectResult) {
    for item in result.items.iter() {
      self.draw_bbox(image, item);
    }
  }

  /// 在输入图像的副本上绘制检测框
  pub fn draw_detection(&self, frame: &RgbImage, result: &DetectResult) -> RgbImage {
    let mut image = frame.clone();
    self.draw_detections_on_image(&mut image, result);
    image
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn result_with(bbox: [f32; 4]) -> DetectResult {
    vec![DetectItem {
      class_id: 0,
      score: 0.9,
      bbox,
    }]
    .into()
  }

  #[test]
  fn draws_two_pixel_border_only() {
    let frame = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
    let image = Draw::default().draw_detection(&frame, &result_with([0.1, 0.1, 0.5, 0.5]));

    let color = Draw::color_of(0);
    assert_eq!(*image.get_pixel(10, 10), color);
    assert_eq!(*image.get_pixel(11, 30), color);
    assert_eq!(*image.get_pixel(50, 30), color);
    assert_eq!(*image.get_pixel(49, 30), color);
    // 第三圈与框内保持原样
    assert_eq!(*image.get_pixel(12, 30), Rgb([0, 0, 0]));
    assert_eq!(*image.get_pixel(30, 30), Rgb([0, 0, 0]));
    // 原图不被修改
    assert_eq!(*frame.get_pixel(10, 10), Rgb([0, 0, 0]));
  }

  #[test]
  fn keeps_dimensions_and_clamps_out_of_range_boxes() {
    let frame = RgbImage::new(37, 21);
    let image = Draw::default().draw_detection(&frame, &result_with([-0.5, -0.5, 1.5, 1.5]));
    assert_eq!(image.dimensions(), (37, 21));
    assert_eq!(*image.get_pixel(0, 0), Draw::color_of(0));
    assert_eq!(*image.get_pixel(36, 20), Draw::color_of(0));
  }

  #[test]
  fn degenerate_box_draws_nothing_harmful() {
    let frame = RgbImage::new(10, 10);
    let image = Draw::default().draw_detection(&frame, &result_with([0.5, 0.5, 0.5, 0.5]));
    assert_eq!(image.dimensions(), (10, 10));
  }

  #[test]
  fn palette_wraps_by_class() {
    assert_eq!(Draw::color_of(0), Rgb([0xFF, 0x38, 0x38]));
    assert_eq!(Draw::color_of(20), Draw::color_of(0));
  }
}
