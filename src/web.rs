// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/web.rs - 网页界面
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

use actix_web::{
  App, HttpResponse, HttpServer, ResponseError, http::StatusCode, web,
};
use image::RgbImage;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
  analyzer::Analyzer,
  input::InputError,
  model::{DetectResult, Model},
};

pub mod api;
pub mod page;

#[derive(Error, Debug)]
pub enum WebError {
  #[error("表单数据错误: {0}")]
  Multipart(String),
  #[error("上传文件超过 {0} 字节")]
  PayloadTooLarge(usize),
  #[error("图像无法解码: {0}")]
  Decode(#[from] InputError),
  #[error("推理失败: {0}")]
  Inference(String),
  #[error("图像编码失败: {0}")]
  Encode(#[from] image::ImageError),
  #[error("后台任务失败")]
  Blocking,
}

impl ResponseError for WebError {
  fn status_code(&self) -> StatusCode {
    match self {
      WebError::Multipart(_) | WebError::Decode(_) => StatusCode::BAD_REQUEST,
      WebError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
      WebError::Inference(_) | WebError::Encode(_) | WebError::Blocking => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    warn!("请求失败: {}", self);
    HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
  }
}

pub fn configure<M>(cfg: &mut web::ServiceConfig)
where
  M: Model<Input = RgbImage, Output = DetectResult> + Send + Sync + 'static,
  M::Error: std::fmt::Display,
{
  cfg
    .route("/", web::get().to(page::index))
    .service(web::scope("/api").route("/analyze", web::post().to(api::analyze::<M>)));
}

/// 启动网页服务，阻塞直到服务退出
pub async fn serve<M>(analyzer: Analyzer<M>, bind: &str) -> std::io::Result<()>
where
  M: Model<Input = RgbImage, Output = DetectResult> + Send + Sync + 'static,
  M::Error: std::fmt::Display,
{
  let analyzer = web::Data::new(analyzer);
  let server = HttpServer::new(move || {
    App::new()
      .app_data(analyzer.clone())
      .configure(configure::<M>)
  })
  .bind(bind)?;

  info!("网页界面已就绪: http://{}", bind);
  server.run().await
}
