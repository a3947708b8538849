// 该文件是 Chick Counter （雏鸡计数） 项目的一部分。
// tests/analyzer.rs - 分析器测试
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

mod common;

use chick_counter::{
  analyzer::{Analyzer, CountRange, EMPTY_INPUT_MESSAGE, HIGH_CONFIDENCE, LOW_CONFIDENCE},
  input::ImageFileInput,
  output::{SaveImageFileOutput, draw::Draw},
  task::{OneShotTask, Task},
};
use common::{ScriptedModel, boxes};
use image::{Rgb, RgbImage};

#[test]
fn absent_image_returns_upload_prompt_without_inference() {
  let analyzer = Analyzer::new(ScriptedModel::new());
  let analysis = analyzer.analyze(None).unwrap();

  assert!(analysis.image.is_none());
  assert!(analysis.counts.is_none());
  assert_eq!(analysis.summary, EMPTY_INPUT_MESSAGE);
  assert!(analyzer.model().calls().is_empty());
}

#[test]
fn five_confident_of_eight_candidates() {
  let model = ScriptedModel::new()
    .on_pass(LOW_CONFIDENCE, boxes(8, 0.5, 0.125))
    .on_pass(HIGH_CONFIDENCE, boxes(5, 0.9, 0.625));
  let analyzer = Analyzer::new(model);
  let image = RgbImage::new(200, 100);

  let analysis = analyzer.analyze(Some(&image)).unwrap();

  assert_eq!(analysis.counts, Some(CountRange { high: 5, low: 8 }));
  assert_eq!(
    analysis.summary,
    "Confidence Range: There are 5 - 8 Chicks in the above image.\n\n\
     This means the model is highly confident (>80%) about 5 chicks, but detects up to 8 chicks \
     if we include detections it is less certain about (>30%)."
  );
}

#[test]
fn runs_two_independent_passes_low_first() {
  let analyzer = Analyzer::new(ScriptedModel::new());
  analyzer.analyze(Some(&RgbImage::new(16, 16))).unwrap();
  assert_eq!(analyzer.model().calls(), vec![LOW_CONFIDENCE, HIGH_CONFIDENCE]);
}

#[test]
fn counts_are_reported_as_observed_even_when_not_monotonic() {
  // 两次推理相互独立，高阈值结果可能多于低阈值结果
  let model = ScriptedModel::new()
    .on_pass(LOW_CONFIDENCE, boxes(2, 0.5, 0.125))
    .on_pass(HIGH_CONFIDENCE, boxes(3, 0.9, 0.625));
  let analyzer = Analyzer::new(model);

  let analysis = analyzer.analyze(Some(&RgbImage::new(64, 64))).unwrap();
  assert_eq!(analysis.counts, Some(CountRange { high: 3, low: 2 }));
  assert!(analysis.summary.starts_with("Confidence Range: There are 3 - 2 Chicks"));
}

#[test]
fn annotated_image_keeps_dimensions_and_shows_low_pass_only() {
  let model = ScriptedModel::new()
    .on_pass(LOW_CONFIDENCE, boxes(1, 0.5, 0.125))
    .on_pass(HIGH_CONFIDENCE, boxes(1, 0.9, 0.625));
  let analyzer = Analyzer::new(model);
  let image = RgbImage::from_pixel(300, 200, Rgb([0, 0, 0]));

  let analysis = analyzer.analyze(Some(&image)).unwrap();
  let annotated = analysis.image.unwrap();
  assert_eq!(annotated.dimensions(), image.dimensions());

  // 低阈值框左上角 (1/16, 1/8) -> (18, 25)
  assert_eq!(*annotated.get_pixel(18, 25), Draw::color_of(0));
  // 高阈值框 (1/16, 5/8) -> (18, 125) 不绘制
  assert_eq!(*annotated.get_pixel(18, 125), Rgb([0, 0, 0]));
  // 输入图像不被修改
  assert_eq!(*image.get_pixel(18, 25), Rgb([0, 0, 0]));
}

#[test]
fn inference_failure_propagates() {
  let analyzer = Analyzer::new(ScriptedModel::failing());
  assert!(analyzer.analyze(Some(&RgbImage::new(8, 8))).is_err());
  // 第一次推理失败即停止
  assert_eq!(analyzer.model().calls(), vec![LOW_CONFIDENCE]);
}

#[test]
fn one_shot_task_writes_annotated_image_and_summary() {
  let dir = std::env::temp_dir().join(format!("chick-counter-task-{}", std::process::id()));
  let _ = std::fs::remove_dir_all(&dir);

  let model = ScriptedModel::new()
    .on_pass(LOW_CONFIDENCE, boxes(8, 0.5, 0.125))
    .on_pass(HIGH_CONFIDENCE, boxes(5, 0.9, 0.625));
  let analyzer = Analyzer::new(model);
  let input = ImageFileInput::from(RgbImage::new(40, 30));
  let output = SaveImageFileOutput::new(dir.join("annotated.png"));

  let analysis = OneShotTask.run_task(input, &analyzer, output).unwrap();
  assert_eq!(analysis.counts, Some(CountRange { high: 5, low: 8 }));

  let saved = image::open(dir.join("annotated.png")).unwrap();
  assert_eq!((saved.width(), saved.height()), (40, 30));
  let summary = std::fs::read_to_string(dir.join("annotated.txt")).unwrap();
  assert_eq!(summary, analysis.summary);
  let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn one_shot_task_without_frames_fails() {
  let analyzer = Analyzer::new(ScriptedModel::new());
  let mut input = ImageFileInput::from(RgbImage::new(4, 4));
  input.next();
  let output = SaveImageFileOutput::new(std::env::temp_dir().join("chick-counter-unused.png"));
  assert!(OneShotTask.run_task(input, &analyzer, output).is_err());
}
