// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use clap::Parser;
use url::Url;

/// 雏鸡计数网页演示
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX 模型路径（onnx:相对路径 或 onnx:///绝对路径）
  #[arg(long, value_name = "MODEL", default_value = "onnx:yolov8m_production_ready.onnx")]
  pub model: Url,

  /// 网页服务监听地址
  #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:7860")]
  pub bind: String,

  /// ONNX Runtime 算子内线程数
  #[arg(long, value_name = "COUNT", default_value = "4")]
  pub threads: usize,
}
