// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/task.rs - 任务定义
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
use tracing::info;

use crate::{
  analyzer::{Analysis, Analyzer},
  model::{DetectResult, Model},
  output::Render,
};

pub trait Task<I, A, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, analyzer: &A, output: O) -> Result<Self::Output, Self::Error>;
}

/// 取输入的第一帧，分析并渲染一次
pub struct OneShotTask;

impl<ME, RE, I, M, O> Task<I, Analyzer<M>, O> for OneShotTask
where
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = RgbImage>,
  M: Model<Input = RgbImage, Output = DetectResult, Error = ME>,
  O: Render<RgbImage, Analysis, Error = RE>,
{
  type Output = Analysis;
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: I,
    analyzer: &Analyzer<M>,
    output: O,
  ) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始分析...");
    let now = std::time::Instant::now();
    let analysis = analyzer.analyze(Some(&frame))?;
    info!("分析完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&frame, &analysis)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(analysis)
  }
}
