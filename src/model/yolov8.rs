// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// src/model/yolov8.rs - YOLOv8 ONNX 模型
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

use std::{path::Path, sync::Mutex};

use image::RgbImage;
use ndarray::{ArrayView2, Axis};
use ort::{
  inputs,
  session::{Session, builder::GraphOptimizationLevel},
  value::Tensor,
};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{Letterbox, RgbNchwFrame},
  model::{DetectItem, DetectResult, Model, nms::non_max_suppression},
  url_file_path,
};

const YOLOV8_INPUT_SIZE: u32 = 640;
const YOLOV8_INPUT_NAME: &str = "images";
const YOLOV8_BOX_DIMS: usize = 4;
const YOLOV8_IOU_THRESH: f32 = 0.7;
const YOLOV8_MAX_DET: usize = 300;
const YOLOV8_INTRA_THREADS: usize = 4;

pub struct YoloV8 {
  session: Mutex<Session>,
  input_size: u32,
  iou_threshold: f32,
  max_det: usize,
}

#[derive(Error, Debug)]
pub enum YoloV8Error {
  #[error("模型文件不存在: '{0}'，请确认训练好的模型文件位于该路径")]
  ModelNotFound(String),
  #[error("模型无效: '{0}', 错误: {1}")]
  ModelInvalid(String, ort::Error),
  #[error("ONNX Runtime 错误: {0}")]
  OrtError(#[from] ort::Error),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("模型输出形状不符合预期: {0:?}")]
  UnexpectedOutputShape(Vec<i64>),
  #[error("输出张量重塑失败: {0}")]
  ShapeError(#[from] ndarray::ShapeError),
  #[error("推理会话锁已失效")]
  SessionPoisoned,
}

pub struct YoloV8Builder {
  model_path: String,
  intra_threads: usize,
  iou_threshold: f32,
  max_det: usize,
}

impl FromUrlWithScheme for YoloV8Builder {
  const SCHEME: &'static str = "onnx";
}

impl FromUrl for YoloV8Builder {
  type Error = YoloV8Error;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(YoloV8Error::ModelPathError(format!(
        "模型路径必须使用 {} 方案, 实际为 {}",
        Self::SCHEME,
        url.scheme()
      )));
    }
    let path = url_file_path(url)
      .map_err(|e| YoloV8Error::ModelPathError(format!("模型路径解码失败 {}: {}", url, e)))?;
    if path.is_empty() {
      return Err(YoloV8Error::ModelPathError(format!("模型路径为空: {}", url)));
    }

    Ok(YoloV8Builder::new(path))
  }
}

impl YoloV8Builder {
  pub fn new(model_path: impl Into<String>) -> Self {
    Self {
      model_path: model_path.into(),
      intra_threads: YOLOV8_INTRA_THREADS,
      iou_threshold: YOLOV8_IOU_THRESH,
      max_det: YOLOV8_MAX_DET,
    }
  }

  pub fn model_path(&self) -> &str {
    &self.model_path
  }

  pub fn intra_threads(mut self, threads: usize) -> Self {
    self.intra_threads = threads.max(1);
    self
  }

  pub fn build(self) -> Result<YoloV8, YoloV8Error> {
    if !Path::new(&self.model_path).is_file() {
      error!("模型文件不存在: '{}'", self.model_path);
      return Err(YoloV8Error::ModelNotFound(self.model_path));
    }

    info!("加载模型文件: {}", self.model_path);
    let session = load_session(&self.model_path, self.intra_threads).map_err(|e| {
      error!("模型加载失败: {}", e);
      YoloV8Error::ModelInvalid(self.model_path.clone(), e)
    })?;
    info!("模型加载完成");

    Ok(YoloV8 {
      session: Mutex::new(session),
      input_size: YOLOV8_INPUT_SIZE,
      iou_threshold: self.iou_threshold,
      max_det: self.max_det,
    })
  }
}

fn load_session(model_path: &str, intra_threads: usize) -> Result<Session, ort::Error> {
  let session = Session::builder()?
    .with_optimization_level(GraphOptimizationLevel::Level3)?
    .with_intra_threads(intra_threads)?
    .commit_from_file(model_path)?;
  Ok(session)
}

impl Model for YoloV8 {
  type Input = RgbImage;
  type Output = DetectResult;
  type Error = YoloV8Error;

  fn infer(&self, input: &Self::Input, confidence: f32) -> Result<Self::Output, Self::Error> {
    let (frame, letterbox) = RgbNchwFrame::letterbox(input, self.input_size);
    let input_tensor = Tensor::from_array((frame.shape(), frame.as_nchw().to_vec()))?;

    let mut session = self
      .session
      .lock()
      .map_err(|_| YoloV8Error::SessionPoisoned)?;

    debug!("执行模型推理, 置信度阈值: {}", confidence);
    let outputs = session.run(inputs![YOLOV8_INPUT_NAME => input_tensor])?;
    let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
    debug!("模型输出形状: {:?}", shape.to_vec());

    // [1, 4 + 类别数, 锚点数]
    if shape.len() != 3 || shape[0] != 1 || shape[1] <= YOLOV8_BOX_DIMS as i64 {
      return Err(YoloV8Error::UnexpectedOutputShape(shape.to_vec()));
    }
    let output = ArrayView2::from_shape((shape[1] as usize, shape[2] as usize), data)?;

    let result = decode_predictions(
      output,
      &letterbox,
      confidence,
      self.iou_threshold,
      self.max_det,
    );
    debug!("检测到 {} 个物体", result.len());
    Ok(result)
  }
}

/// 解码形如 [4 + 类别数, 锚点数] 的原始输出，坐标映射回原图并归一化
pub fn decode_predictions(
  output: ArrayView2<f32>,
  letterbox: &Letterbox,
  confidence: f32,
  iou_threshold: f32,
  max_det: usize,
) -> DetectResult {
  let (src_w, src_h) = (letterbox.src_width as f32, letterbox.src_height as f32);
  let mut candidates = Vec::new();

  for anchor in output.axis_iter(Axis(1)) {
    let (class_id, score) = anchor
      .iter()
      .skip(YOLOV8_BOX_DIMS)
      .copied()
      .enumerate()
      .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
      .unwrap_or((0, 0.0));

    if score < confidence {
      continue;
    }

    let (cx, cy, w, h) = (anchor[0], anchor[1], anchor[2], anchor[3]);
    let (x_min, y_min) = letterbox.restore(cx - w / 2.0, cy - h / 2.0);
    let (x_max, y_max) = letterbox.restore(cx + w / 2.0, cy + h / 2.0);

    candidates.push(DetectItem {
      class_id: class_id as u32,
      score,
      bbox: [x_min / src_w, y_min / src_h, x_max / src_w, y_max / src_h],
    });
  }

  non_max_suppression(candidates, iou_threshold, max_det).into()
}
