// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// tests/common/mod.rs - 测试用脚本化模型
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

#![allow(dead_code)]

use std::sync::Mutex;

use chick_counter::model::{DetectItem, DetectResult, Model};
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("scripted detector failure")]
pub struct ScriptedError;

/// 按置信度阈值返回预设结果的模型，并记录每次调用的阈值
pub struct ScriptedModel {
  passes: Vec<(f32, Vec<DetectItem>)>,
  fail: bool,
  pub calls: Mutex<Vec<f32>>,
}

impl ScriptedModel {
  pub fn new() -> Self {
    Self {
      passes: Vec::new(),
      fail: false,
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn failing() -> Self {
    Self {
      fail: true,
      ..Self::new()
    }
  }

  pub fn on_pass(mut self, confidence: f32, items: Vec<DetectItem>) -> Self {
    self.passes.push((confidence, items));
    self
  }

  pub fn calls(&self) -> Vec<f32> {
    self.calls.lock().unwrap().clone()
  }
}

impl Model for ScriptedModel {
  type Input = RgbImage;
  type Output = DetectResult;
  type Error = ScriptedError;

  fn infer(&self, _input: &Self::Input, confidence: f32) -> Result<Self::Output, Self::Error> {
    self.calls.lock().unwrap().push(confidence);
    if self.fail {
      return Err(ScriptedError);
    }
    let items = self
      .passes
      .iter()
      .find(|(c, _)| (*c - confidence).abs() < f32::EPSILON)
      .map(|(_, items)| items.clone())
      .unwrap_or_default();
    Ok(items.into())
  }
}

/// 在 [0, 1] 坐标内横向排开 n 个互不重叠的小框
pub fn boxes(n: usize, score: f32, row: f32) -> Vec<DetectItem> {
  (0..n)
    .map(|i| {
      let x = (i as f32 + 1.0) / 16.0;
      DetectItem {
        class_id: 0,
        score,
        bbox: [x, row, x + 1.0 / 32.0, row + 1.0 / 32.0],
      }
    })
    .collect()
}
