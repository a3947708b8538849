// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/analyzer.rs - 双阈值计数分析
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

use image::RgbImage;
use tracing::{debug, info};

use crate::{
  model::{DetectResult, Model},
  output::draw::Draw,
};

/// 宽松阈值：计入把握较低的检测，同时用于可视化
pub const LOW_CONFIDENCE: f32 = 0.30;
/// 严格阈值：只计入高把握的检测
pub const HIGH_CONFIDENCE: f32 = 0.80;

pub const EMPTY_INPUT_MESSAGE: &str = "Please upload an image first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
  pub high: usize,
  pub low: usize,
}

#[derive(Debug, Clone)]
pub struct Analysis {
  /// 标注后的图像，与输入尺寸相同；无输入时为空
  pub image: Option<RgbImage>,
  pub summary: String,
  pub counts: Option<CountRange>,
}

impl Analysis {
  pub fn empty() -> Self {
    Self {
      image: None,
      summary: EMPTY_INPUT_MESSAGE.to_string(),
      counts: None,
    }
  }
}

pub fn summary_text(high: usize, low: usize) -> String {
  format!(
    "Confidence Range: There are {high} - {low} Chicks in the above image.\n\n\
     This means the model is highly confident (>80%) about {high} chicks, \
     but detects up to {low} chicks if we include detections it is less certain about (>30%)."
  )
}

pub struct Analyzer<M> {
  model: M,
  draw: Draw,
}

impl<M> Analyzer<M>
where
  M: Model<Input = RgbImage, Output = DetectResult>,
{
  pub fn new(model: M) -> Self {
    Self {
      model,
      draw: Draw::default(),
    }
  }

  pub fn model(&self) -> &M {
    &self.model
  }

  /// 分析一张图像。
  ///
  /// 两个阈值各自独立推理一次，高阈值计数不是对低阈值结果的再过滤；
  /// 两次推理可能因检测器在不同阈值下的行为而不构成子集关系。
  pub fn analyze(&self, image: Option<&RgbImage>) -> Result<Analysis, M::Error> {
    let Some(image) = image else {
      debug!("未提供图像");
      return Ok(Analysis::empty());
    };

    let now = std::time::Instant::now();
    let low_result = self.model.infer(image, LOW_CONFIDENCE)?;
    let low = low_result.len();
    let annotated = self.draw.draw_detection(image, &low_result);

    let high_result = self.model.infer(image, HIGH_CONFIDENCE)?;
    let high = high_result.len();
    info!(
      "分析完成 {}x{}: 高置信 {} 个, 低置信 {} 个, 耗时: {:.2?}",
      image.width(),
      image.height(),
      high,
      low,
      now.elapsed()
    );

    Ok(Analysis {
      image: Some(annotated),
      summary: summary_text(high, low),
      counts: Some(CountRange { high, low }),
    })
  }
}
