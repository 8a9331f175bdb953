//! 启动装配：校验配置、打开采集源、选择注入后端，组装 [`Session`]
//!
//! 这里的错误都是致命的，`main` 打印错误和处理建议后以非零码退出。

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::debug_view::{DebugView, TracingDebugView, QUIT_KEY};
use crate::devices::camera::{CaptureError, FrameSource, ReplayCapture};
use crate::devices::detector::RecordedDetector;
use crate::devices::injector::{DryRunInjector, InjectError, InputInjector};
use crate::devices::screen::{self, DisplayInfo};
use crate::session::Session;
use crate::tracking::pipeline::PipelineSettings;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no frame source for camera {index}: no live camera backend is built in")]
    NoSource { index: u32 },
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Injector(#[from] InjectError),
}

impl StartupError {
    /// 面向用户的处理建议
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Config(_) => "Fix the EYE_* environment variable named above and restart.",
            Self::NoSource { .. } => {
                "Set EYE_REPLAY_PATH to a recorded capture log (JSON lines with t and landmarks)."
            }
            Self::Capture(_) => {
                "Check that the capture path exists and is readable, or that no other \
                 application is holding the camera."
            }
            Self::Injector(_) => {
                "Grant input control permission (accessibility / uinput) to this process, \
                 or set EYE_DRY_RUN=true to run without moving the pointer."
            }
        }
    }
}

pub fn build_session(config: &Config) -> Result<Session, StartupError> {
    config.validate()?;

    let source = open_source(config)?;
    let (width, height) = source.resolution();
    info!(source = %source.describe(), width, height, "Frame source opened");

    let mut injector = select_injector(config)?;

    let display = screen::probe(injector.as_ref());
    let screen_width = match display {
        Some(DisplayInfo {
            width_px,
            height_px,
            physical_mm,
        }) => {
            match physical_mm {
                Some((w_mm, h_mm)) => info!(width_px, height_px, w_mm, h_mm, "Display detected"),
                None => info!(width_px, height_px, "Display detected, physical size unknown"),
            }
            width_px
        }
        None => {
            warn!(
                fallback = config.tracking.screen_width,
                "Display size unavailable, using configured screen width"
            );
            config.tracking.screen_width
        }
    };

    if config.output.center_on_start {
        if let Some(d) = display {
            let (x, y) = (half(d.width_px), half(d.height_px));
            match injector.move_absolute(x, y) {
                Ok(()) => info!(x, y, "Pointer centered"),
                Err(e) => warn!(error = %e, "Failed to center pointer"),
            }
        }
    }

    let settings = PipelineSettings::from_config(config, screen_width);
    info!(
        step_px = settings.step_px,
        left = settings.thresholds.left,
        right = settings.thresholds.right,
        mode = ?settings.mode,
        "Pipeline configured"
    );

    let view: Option<Box<dyn DebugView>> = if config.output.debug_view {
        info!(quit_key = %QUIT_KEY, "Debug view enabled, type the quit key and Enter to stop");
        Some(Box::new(TracingDebugView::with_stdin()))
    } else {
        None
    };

    Ok(Session::new(
        source,
        Box::new(RecordedDetector),
        injector,
        view,
        settings,
        config.camera.fps_limit,
    ))
}

fn open_source(config: &Config) -> Result<Box<dyn FrameSource>, StartupError> {
    let camera = &config.camera;
    let Some(path) = camera.replay_path.as_deref() else {
        return Err(StartupError::NoSource {
            index: camera.index,
        });
    };
    let interval = if camera.fps_limit > 0 {
        1.0 / f64::from(camera.fps_limit)
    } else {
        1.0 / 30.0
    };
    let capture = ReplayCapture::open(path, camera.width, camera.height, interval)?;
    Ok(Box::new(capture))
}

fn select_injector(config: &Config) -> Result<Box<dyn InputInjector>, StartupError> {
    if config.output.dry_run {
        info!("Dry run enabled, input events are logged only");
        return Ok(Box::new(DryRunInjector::new(None)));
    }

    desktop_injector()
}

#[cfg(feature = "desktop")]
fn desktop_injector() -> Result<Box<dyn InputInjector>, StartupError> {
    let injector = crate::devices::injector::EnigoInjector::new()?;
    info!("Desktop input backend ready");
    Ok(Box::new(injector))
}

#[cfg(not(feature = "desktop"))]
fn desktop_injector() -> Result<Box<dyn InputInjector>, StartupError> {
    warn!("Built without the desktop feature, falling back to dry run");
    Ok(Box::new(DryRunInjector::new(None)))
}

fn half(px: u32) -> i32 {
    i32::try_from(px / 2).unwrap_or(i32::MAX)
}
