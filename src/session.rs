//! 帧循环
//!
//! 单线程协作式循环：读帧 → 检测关键点 → 流水线 → 调试视图 → 睡到下一帧。
//! 退出信号在睡眠点被观察到，下一轮开头跳出循环；清理在所有退出路径上执行。

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::constants::FRAME_RETRY_DELAY_MS;
use crate::debug_view::{DebugSnapshot, DebugView, FpsMeter, ViewControl};
use crate::devices::camera::{CaptureError, FrameSource};
use crate::devices::detector::{DetectError, LandmarkDetector};
use crate::devices::injector::{dispatch, InputInjector};
use crate::tracking::geometry::measure;
use crate::tracking::pipeline::{process_frame, FrameReport, PipelineSettings, PipelineState};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error("frame processing panicked: {0}")]
    Panicked(String),
}

impl FrameError {
    /// 采集端的单帧问题（无帧、坏记录）属于常态，其余按异常记录
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Capture(e) => e.is_recoverable(),
            Self::Detect(_) | Self::Panicked(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    EndOfStream,
    QuitKey,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub failed_frames: u64,
    pub events: u64,
    pub paused: bool,
    pub exit: ExitReason,
}

enum Step {
    Processed,
    EndOfStream,
    Quit,
}

pub struct Session {
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkDetector>,
    injector: Box<dyn InputInjector>,
    view: Option<Box<dyn DebugView>>,
    settings: PipelineSettings,
    state: PipelineState,
    frame_interval: Duration,
    fps: FpsMeter,
    events: u64,
    cleaned_up: bool,
}

impl Session {
    /// `fps_limit` 为 0 时不做节流
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn LandmarkDetector>,
        injector: Box<dyn InputInjector>,
        view: Option<Box<dyn DebugView>>,
        settings: PipelineSettings,
        fps_limit: u32,
    ) -> Self {
        let frame_interval = if fps_limit > 0 {
            Duration::from_secs_f64(1.0 / f64::from(fps_limit))
        } else {
            Duration::ZERO
        };
        let state = PipelineState::new(&settings);
        Self {
            source,
            detector,
            injector,
            view,
            settings,
            state,
            frame_interval,
            fps: FpsMeter::default(),
            events: 0,
            cleaned_up: false,
        }
    }

    /// 运行直到数据流结束、按下退出键或收到 Ctrl-C / SIGTERM
    pub async fn run(self) -> SessionSummary {
        self.run_until(shutdown_signal()).await
    }

    pub async fn run_until<F>(mut self, shutdown: F) -> SessionSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            source = %self.source.describe(),
            detector = self.detector.name(),
            injector = self.injector.name(),
            "Frame loop started"
        );

        let mut frames = 0_u64;
        let mut failed_frames = 0_u64;
        let mut interrupted = false;

        let exit = loop {
            if interrupted {
                break ExitReason::Interrupted;
            }

            let started = Instant::now();
            let delay = match self.step_guarded() {
                Ok(Step::Processed) => {
                    frames += 1;
                    self.frame_interval.saturating_sub(started.elapsed())
                }
                Ok(Step::EndOfStream) => break ExitReason::EndOfStream,
                Ok(Step::Quit) => break ExitReason::QuitKey,
                Err(e) => {
                    failed_frames += 1;
                    if e.is_transient() {
                        warn!(error = %e, "Frame skipped");
                    } else {
                        error!(error = %e, "Frame failed, retrying");
                    }
                    Duration::from_millis(FRAME_RETRY_DELAY_MS)
                }
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => interrupted = true,
                _ = tokio::time::sleep(delay) => {}
            }
        };

        self.cleanup();
        let summary = SessionSummary {
            frames,
            failed_frames,
            events: self.events,
            paused: self.state.paused,
            exit,
        };
        info!(?summary, "Frame loop finished");
        summary
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    fn step_guarded(&mut self) -> Result<Step, FrameError> {
        match catch_unwind(AssertUnwindSafe(|| self.step())) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(FrameError::Panicked(message))
            }
        }
    }

    fn step(&mut self) -> Result<Step, FrameError> {
        let frame = match self.source.read() {
            Ok(frame) => frame,
            Err(CaptureError::EndOfStream) => return Ok(Step::EndOfStream),
            Err(e) => return Err(e.into()),
        };

        let landmarks = self.detector.detect(&frame)?;
        let measurement = measure(landmarks.as_ref(), frame.width, frame.height);
        if let (Some(set), None) = (&landmarks, &measurement) {
            warn!(points = set.len(), "Incomplete landmark set, treating as no face");
        }

        let report = process_frame(&mut self.state, &self.settings, measurement, frame.timestamp);
        self.dispatch_events(&report);

        let fps = self.fps.tick(frame.timestamp);
        if let Some(view) = self.view.as_mut() {
            let snapshot = DebugSnapshot {
                sequence: frame.sequence,
                frame_size: (frame.width, frame.height),
                landmarks: landmarks.as_ref(),
                report: &report,
                fps,
            };
            if view.render(&snapshot) == ViewControl::Quit {
                return Ok(Step::Quit);
            }
        }
        Ok(Step::Processed)
    }

    fn dispatch_events(&mut self, report: &FrameReport) {
        for event in &report.events {
            self.events += 1;
            if let Err(e) = dispatch(self.injector.as_mut(), event) {
                error!(error = %e, ?event, "Input injection failed");
            }
        }
    }

    fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        self.source.release();
        if let Some(view) = self.view.as_mut() {
            view.close();
        }
        info!("Capture released");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler, only Ctrl-C is honored");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown signal received");
}
