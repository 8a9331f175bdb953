use thiserror::Error;

use crate::devices::camera::Frame;
use crate::tracking::geometry::LandmarkSet;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("landmark model unavailable: {0}")]
    Unavailable(String),
    #[error("landmark inference failed: {0}")]
    Inference(String),
}

/// 人脸关键点检测器，视为黑盒。
///
/// 只支持单张人脸；`Ok(None)` 表示画面里没有人脸，是正常结果而不是错误。
pub trait LandmarkDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, DetectError>;

    fn name(&self) -> &str;
}

/// 直接返回回放帧里已录制的关键点
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordedDetector;

impl LandmarkDetector for RecordedDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, DetectError> {
        Ok(frame.recorded_landmarks.clone())
    }

    fn name(&self) -> &str {
        "recorded"
    }
}
