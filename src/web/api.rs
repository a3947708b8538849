// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/web/api.rs - 分析接口
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

use std::io::Cursor;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use base64::{Engine, engine::general_purpose::STANDARD};
use futures::{StreamExt, TryStreamExt};
use image::{ImageFormat, RgbImage};
use serde::Serialize;
use tracing::debug;

use crate::{
  analyzer::{Analysis, Analyzer},
  input::decode_image,
  model::{DetectResult, Model},
  web::WebError,
};

pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
pub const IMAGE_FIELD: &str = "image";

#[derive(Serialize, Debug)]
pub struct AnalyzeResponse {
  /// `data:image/png;base64,...`
  pub image: Option<String>,
  pub summary: String,
  pub high: Option<usize>,
  pub low: Option<usize>,
}

impl TryFrom<Analysis> for AnalyzeResponse {
  type Error = WebError;

  fn try_from(analysis: Analysis) -> Result<Self, Self::Error> {
    let image = analysis.image.as_ref().map(png_data_uri).transpose()?;
    Ok(Self {
      image,
      summary: analysis.summary,
      high: analysis.counts.map(|c| c.high),
      low: analysis.counts.map(|c| c.low),
    })
  }
}

fn png_data_uri(image: &RgbImage) -> Result<String, image::ImageError> {
  let mut buffer = Vec::new();
  image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
  Ok(format!("data:image/png;base64,{}", STANDARD.encode(&buffer)))
}

// 只收集名为 image 的文件字段，其余字段读完丢弃
async fn read_image_field(payload: &mut Multipart) -> Result<Option<Vec<u8>>, WebError> {
  let mut upload = None;
  while let Some(mut field) = payload
    .try_next()
    .await
    .map_err(|e| WebError::Multipart(e.to_string()))?
  {
    let is_image = field.content_disposition().and_then(|cd| cd.get_name()) == Some(IMAGE_FIELD);

    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
      let chunk = chunk.map_err(|e| WebError::Multipart(e.to_string()))?;
      if !is_image {
        continue;
      }
      if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
        return Err(WebError::PayloadTooLarge(MAX_UPLOAD_BYTES));
      }
      data.extend_from_slice(&chunk);
    }

    if is_image && !data.is_empty() {
      debug!("收到上传图像: {} 字节", data.len());
      upload = Some(data);
    }
  }
  Ok(upload)
}

pub async fn analyze<M>(
  analyzer: web::Data<Analyzer<M>>,
  mut payload: Multipart,
) -> Result<HttpResponse, WebError>
where
  M: Model<Input = RgbImage, Output = DetectResult> + Send + Sync + 'static,
  M::Error: std::fmt::Display,
{
  let upload = read_image_field(&mut payload).await?;
  let analyzer = analyzer.into_inner();

  // 解码与推理都在阻塞线程池中执行
  let analysis = web::block(move || -> Result<Analysis, WebError> {
    let image = upload.as_deref().map(decode_image).transpose()?;
    analyzer
      .analyze(image.as_ref())
      .map_err(|e| WebError::Inference(e.to_string()))
  })
  .await
  .map_err(|_| WebError::Blocking)??;

  let response = AnalyzeResponse::try_from(analysis)?;
  Ok(HttpResponse::Ok().json(response))
}
