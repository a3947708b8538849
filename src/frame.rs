// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/frame.rs - 信箱缩放与 NCHW 帧定义
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

use image::{Rgb, RgbImage, imageops::FilterType};

const RGB_CHANNELS: usize = 3;
const LETTERBOX_FILL: u8 = 114;

/// 信箱缩放参数：保持长宽比缩放到正方形输入，并在两侧居中填充
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
  pub scale: f32,
  pub pad_x: f32,
  pub pad_y: f32,
  pub src_width: u32,
  pub src_height: u32,
  pub target: u32,
}

impl Letterbox {
  pub fn fit(src_width: u32, src_height: u32, target: u32) -> Self {
    let scale = (target as f32 / src_height.max(1) as f32).min(target as f32 / src_width.max(1) as f32);
    let (new_w, new_h) = Self::scaled_size(src_width, src_height, scale, target);

    // 与训练时的填充方式一致：(pad - 0.1) 后取整
    let pad_x = ((target - new_w) as f32 / 2.0 - 0.1).round().max(0.0);
    let pad_y = ((target - new_h) as f32 / 2.0 - 0.1).round().max(0.0);

    Self {
      scale,
      pad_x,
      pad_y,
      src_width,
      src_height,
      target,
    }
  }

  fn scaled_size(src_width: u32, src_height: u32, scale: f32, target: u32) -> (u32, u32) {
    let w = ((src_width as f32 * scale).round() as u32).clamp(1, target);
    let h = ((src_height as f32 * scale).round() as u32).clamp(1, target);
    (w, h)
  }

  /// 缩放后（不含填充）的图像尺寸
  pub fn inner_size(&self) -> (u32, u32) {
    Self::scaled_size(self.src_width, self.src_height, self.scale, self.target)
  }

  /// 将信箱坐标映射回原图坐标，并限制在原图范围内
  pub fn restore(&self, x: f32, y: f32) -> (f32, f32) {
    let x = ((x - self.pad_x) / self.scale).clamp(0.0, self.src_width as f32);
    let y = ((y - self.pad_y) / self.scale).clamp(0.0, self.src_height as f32);
    (x, y)
  }
}

/// 归一化到 [0, 1] 的 RGB NCHW 浮点帧（批大小为 1）
#[derive(Debug, Clone)]
pub struct RgbNchwFrame {
  data: Box<[f32]>,
  height: usize,
  width: usize,
}

impl RgbNchwFrame {
  pub fn with_shape(height: usize, width: usize) -> Self {
    let data = vec![0f32; RGB_CHANNELS * height * width].into_boxed_slice();
    Self {
      data,
      height,
      width,
    }
  }

  /// 对图像做信箱缩放并转为 NCHW 帧
  pub fn letterbox(image: &RgbImage, target: u32) -> (Self, Letterbox) {
    let letterbox = Letterbox::fit(image.width(), image.height(), target);
    let (new_w, new_h) = letterbox.inner_size();

    let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(target, target, Rgb([LETTERBOX_FILL; 3]));
    image::imageops::replace(
      &mut canvas,
      &resized,
      letterbox.pad_x as i64,
      letterbox.pad_y as i64,
    );

    (Self::from(&canvas), letterbox)
  }

  pub fn shape(&self) -> [usize; 4] {
    [1, RGB_CHANNELS, self.height, self.width]
  }

  pub fn as_nchw(&self) -> &[f32] {
    &self.data
  }
}

impl AsMut<[f32]> for RgbNchwFrame {
  fn as_mut(&mut self) -> &mut [f32] {
    &mut self.data
  }
}

impl From<&RgbImage> for RgbNchwFrame {
  fn from(image: &RgbImage) -> Self {
    let (width, height) = image.dimensions();
    let mut frame = RgbNchwFrame::with_shape(height as usize, width as usize);
    let plane = frame.height * frame.width;
    let slice = frame.as_mut();

    for (x, y, pixel) in image.enumerate_pixels() {
      let idx = y as usize * width as usize + x as usize;
      for c in 0..RGB_CHANNELS {
        slice[c * plane + idx] = pixel[c] as f32 / 255.0;
      }
    }
    frame
  }
}
