// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/bin/oneshot.rs - 单张图像计数
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use chick_counter::{
  FromUrl,
  analyzer::Analyzer,
  input::InputWrapper,
  model::YoloV8Builder,
  output::OutputWrapper,
  task::{OneShotTask, Task},
};
use tracing::info;

/// 单张图像计数参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型路径
  #[arg(long, value_name = "MODEL", default_value = "onnx:yolov8m_production_ready.onnx")]
  pub model: Url,
  /// 输入图像（image:///path/to/chicks.jpg）
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出图像，分析文本写入同名 .txt（image:///path/to/out.png）
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let builder = YoloV8Builder::from_url(&args.model)?;
  let model_path = builder.model_path().to_string();
  let model = builder
    .build()
    .with_context(|| format!("FATAL ERROR: 无法加载模型 '{}'", model_path))?;

  let input = InputWrapper::from_url(&args.input)?;
  let output = OutputWrapper::from_url(&args.output)?;
  let analyzer = Analyzer::new(model);

  let analysis = OneShotTask.run_task(input, &analyzer, output)?;
  println!("{}", analysis.summary);

  Ok(())
}
