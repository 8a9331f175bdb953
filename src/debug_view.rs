//! 调试视图
//!
//! 只观察、不回写流水线。渲染端可以通过返回 [`ViewControl::Quit`]
//! 表示用户按下了退出键。

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, info, trace, warn};

use crate::tracking::geometry::{LandmarkSet, PixelPoint};
use crate::tracking::pipeline::FrameReport;

pub const QUIT_KEY: char = 'q';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewControl {
    Continue,
    Quit,
}

pub struct DebugSnapshot<'a> {
    pub sequence: u64,
    pub frame_size: (u32, u32),
    pub landmarks: Option<&'a LandmarkSet>,
    pub report: &'a FrameReport,
    pub fps: f64,
}

impl DebugSnapshot<'_> {
    /// 需要在画面上标注的关键点（像素坐标）
    pub fn highlighted_points(&self) -> Vec<PixelPoint> {
        self.landmarks
            .map(|set| set.tracked_pixels(self.frame_size.0, self.frame_size.1))
            .unwrap_or_default()
    }

    pub fn status_text(&self) -> &'static str {
        if self.report.paused {
            "COMMANDS PAUSED"
        } else {
            "COMMANDS ACTIVE"
        }
    }
}

pub trait DebugView {
    fn render(&mut self, snapshot: &DebugSnapshot<'_>) -> ViewControl;

    fn close(&mut self) {}
}

/// 在后台线程里逐行读取按键，每行取首字符（小写）送进通道。
///
/// 读取会阻塞，所以放在独立线程；输入结束或通道关闭后线程退出。
pub fn spawn_key_reader<R>(reader: R) -> Receiver<char>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("debug-view-keys".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else { break };
                let Some(key) = line.trim().chars().next() else {
                    continue;
                };
                if tx.send(key.to_ascii_lowercase()).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Failed to start key reader, quit key disabled");
    }
    rx
}

/// 以结构化日志输出每帧状态，替代图形窗口；按键通道收到退出键时请求退出
#[derive(Debug, Default)]
pub struct TracingDebugView {
    frames: u64,
    keys: Option<Receiver<char>>,
}

impl TracingDebugView {
    pub fn with_keys(keys: Receiver<char>) -> Self {
        Self {
            frames: 0,
            keys: Some(keys),
        }
    }

    /// 从终端读取退出键（输入 `q` 后回车）
    pub fn with_stdin() -> Self {
        Self::with_keys(spawn_key_reader(io::BufReader::new(io::stdin())))
    }

    fn quit_requested(&mut self) -> bool {
        let Some(keys) = self.keys.as_ref() else {
            return false;
        };
        let mut disconnected = false;
        let quit = loop {
            match keys.try_recv() {
                Ok(key) if key == QUIT_KEY => break true,
                Ok(_) => {}
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break false;
                }
            }
        };
        if disconnected {
            self.keys = None;
        }
        quit
    }
}

impl DebugView for TracingDebugView {
    fn render(&mut self, snapshot: &DebugSnapshot<'_>) -> ViewControl {
        self.frames += 1;
        let r = snapshot.report;
        debug!(
            frame = snapshot.sequence,
            dir = %r.direction,
            stable = r.stability,
            x = r.smoothed.x,
            y = r.smoothed.y,
            ear = r.ear,
            status = snapshot.status_text(),
            long_blink_pct = r.long_blink_progress.map(|p| (p * 100.0).round()),
            fps = snapshot.fps,
            "Debug frame"
        );
        trace!(points = ?snapshot.highlighted_points(), "Tracked landmarks");
        if self.quit_requested() {
            info!(key = %QUIT_KEY, "Quit key pressed");
            return ViewControl::Quit;
        }
        ViewControl::Continue
    }

    fn close(&mut self) {
        debug!(frames = self.frames, "Debug view closed");
    }
}

/// 由相邻两帧的时间差计算瞬时帧率
#[derive(Debug, Default)]
pub struct FpsMeter {
    last: Option<f64>,
}

impl FpsMeter {
    pub fn tick(&mut self, now: f64) -> f64 {
        let fps = match self.last {
            Some(prev) => 1.0 / (now - prev + 1e-6),
            None => 0.0,
        };
        self.last = Some(now);
        fps
    }
}
