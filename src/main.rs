// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/main.rs - 网页演示主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use chick_counter::{FromUrl, analyzer::Analyzer, model::YoloV8Builder, web};

#[actix_web::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("监听地址: {}", args.bind);

  // 模型加载失败直接退出，不启动网页服务
  let builder = YoloV8Builder::from_url(&args.model)?;
  let model_path = builder.model_path().to_string();
  let model = builder
    .intra_threads(args.threads)
    .build()
    .with_context(|| format!("FATAL ERROR: 无法加载模型 '{}'", model_path))?;

  let analyzer = Analyzer::new(model);
  web::serve(analyzer, &args.bind)
    .await
    .with_context(|| format!("网页服务异常退出: {}", args.bind))?;

  Ok(())
}
