//! 采集源抽象
//!
//! 真实摄像头后端（平台相关的设备选择、权限）不在本 crate 内实现，
//! 只要实现 [`FrameSource`] 即可接入帧循环。内置的 [`ReplayCapture`]
//! 回放外部录制的 JSON lines 采集日志，用于无头运行和测试。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::tracking::geometry::LandmarkSet;

#[derive(Debug, Clone)]
pub struct Frame {
    pub sequence: u64,
    /// 单调时钟秒数，流水线的全部计时都以此为准
    pub timestamp: f64,
    pub width: u32,
    pub height: u32,
    /// 原始像素（RGB8，行优先），是实时 `FrameSource` 交给检测器的输入；
    /// 回放帧不带图像，保持为空
    pub pixels: Vec<u8>,
    /// 回放帧携带的已录制关键点；实时帧为 `None`
    pub recorded_landmarks: Option<LandmarkSet>,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot open capture device {device}: {reason}")]
    Open { device: String, reason: String },
    #[error("no frame available")]
    NoFrame,
    #[error("capture stream ended")]
    EndOfStream,
    #[error("malformed frame record at line {line}: {message}")]
    Malformed { line: u64, message: String },
    #[error("capture io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// 单帧级别、重试即可恢复的错误
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoFrame | Self::Malformed { .. })
    }
}

pub trait FrameSource {
    /// 读取下一帧，可能阻塞
    fn read(&mut self) -> Result<Frame, CaptureError>;

    fn resolution(&self) -> (u32, u32);

    /// 释放设备；之后的 `read` 返回 `EndOfStream`
    fn release(&mut self);

    fn describe(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct CaptureRecord {
    /// 录制时间戳（秒）；缺省时按帧间隔推算
    #[serde(default)]
    t: Option<f64>,
    #[serde(default)]
    landmarks: Option<LandmarkSet>,
}

pub struct ReplayCapture<R> {
    reader: Option<R>,
    label: String,
    width: u32,
    height: u32,
    frame_interval: f64,
    line: u64,
    sequence: u64,
}

impl ReplayCapture<BufReader<File>> {
    pub fn open(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        frame_interval: f64,
    ) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CaptureError::Open {
            device: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut capture = Self::from_reader(BufReader::new(file), width, height, frame_interval);
        capture.label = format!("replay:{}", path.display());
        Ok(capture)
    }
}

impl<R: BufRead> ReplayCapture<R> {
    pub fn from_reader(reader: R, width: u32, height: u32, frame_interval: f64) -> Self {
        Self {
            reader: Some(reader),
            label: "replay:<reader>".to_string(),
            width,
            height,
            frame_interval,
            line: 0,
            sequence: 0,
        }
    }

    fn next_record(&mut self) -> Result<CaptureRecord, CaptureError> {
        let reader = self.reader.as_mut().ok_or(CaptureError::EndOfStream)?;
        let mut buf = String::new();
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                return Err(CaptureError::EndOfStream);
            }
            self.line += 1;
            let trimmed = buf.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return serde_json::from_str(trimmed).map_err(|e| CaptureError::Malformed {
                line: self.line,
                message: e.to_string(),
            });
        }
    }
}

impl<R: BufRead> FrameSource for ReplayCapture<R> {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        let record = self.next_record()?;
        let sequence = self.sequence;
        self.sequence += 1;
        Ok(Frame {
            sequence,
            timestamp: record
                .t
                .unwrap_or(sequence as f64 * self.frame_interval),
            width: self.width,
            height: self.height,
            pixels: Vec::new(),
            recorded_landmarks: record.landmarks,
        })
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        self.reader = None;
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn capture(text: &str) -> ReplayCapture<Cursor<Vec<u8>>> {
        ReplayCapture::from_reader(Cursor::new(text.as_bytes().to_vec()), 640, 480, 0.5)
    }

    #[test]
    fn reads_records_in_order() {
        let mut cap = capture("{\"t\": 1.25, \"landmarks\": [[0.1, 0.2]]}\n{\"landmarks\": null}\n");
        let first = cap.read().expect("first frame");
        assert_eq!(first.sequence, 0);
        assert_eq!(first.timestamp, 1.25);
        assert!(first.pixels.is_empty());
        assert_eq!(first.recorded_landmarks.map(|l| l.len()), Some(1));

        let second = cap.read().expect("second frame");
        assert_eq!(second.timestamp, 0.5);
        assert!(second.recorded_landmarks.is_none());

        assert!(matches!(cap.read(), Err(CaptureError::EndOfStream)));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let mut cap = capture("\n# recorded at 30fps\n{}\n");
        let frame = cap.read().expect("frame");
        assert_eq!(frame.sequence, 0);
        assert_eq!((frame.width, frame.height), (640, 480));
    }

    #[test]
    fn malformed_line_is_recoverable() {
        let mut cap = capture("not json\n{\"t\": 2.0}\n");
        let err = cap.read().expect_err("malformed");
        assert!(err.is_recoverable());
        assert!(matches!(err, CaptureError::Malformed { line: 1, .. }));
        assert_eq!(cap.read().expect("next frame").timestamp, 2.0);
    }

    #[test]
    fn release_ends_stream() {
        let mut cap = capture("{}\n{}\n");
        cap.release();
        assert!(matches!(cap.read(), Err(CaptureError::EndOfStream)));
    }

    #[test]
    fn missing_file_fails_to_open() {
        let result = ReplayCapture::open("/nonexistent/capture.jsonl", 640, 480, 0.033);
        assert!(matches!(result, Err(CaptureError::Open { .. })));
    }
}
