use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{
    DEFAULT_DEAD_ZONE, DEFAULT_MOVE_PERCENT, DEFAULT_SCREEN_WIDTH, DEFAULT_SMOOTH_WINDOW,
    DEFAULT_STABLE_FRAMES,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub camera: CameraConfig,
    pub tracking: TrackingConfig,
    pub blink: BlinkConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// 实时摄像头编号；内置只有回放源，此值留给外部实现的实时 `FrameSource`，
    /// 目前只出现在缺少采集源的启动错误里
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// 0 表示不限帧率
    pub fps_limit: u32,
    /// 回放用的采集日志（JSON lines）
    pub replay_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TrackingConfig {
    pub smooth_window: usize,
    pub stable_frames: u32,
    pub dead_zone: f64,
    pub move_percent: f64,
    /// 查询不到显示器时的屏幕宽度
    pub screen_width: u32,
    pub move_cooldown_secs: f64,
    pub use_arrow_keys: bool,
}

#[derive(Debug, Clone)]
pub struct BlinkConfig {
    pub click_threshold: f64,
    pub click_cooldown_secs: f64,
    pub long_threshold: f64,
    pub long_duration_secs: f64,
    pub toggle_cooldown_secs: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            click_threshold: 0.19,
            click_cooldown_secs: 0.6,
            long_threshold: 0.19,
            long_duration_secs: 1.0,
            toggle_cooldown_secs: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub debug_view: bool,
    pub dry_run: bool,
    pub center_on_start: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value}")]
    OutOfRange {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            camera: CameraConfig {
                index: env_or_parse("EYE_CAM_INDEX", 0_u32),
                width: env_or_parse("EYE_CAM_WIDTH", 640_u32),
                height: env_or_parse("EYE_CAM_HEIGHT", 480_u32),
                fps_limit: env_or_parse("EYE_FPS_LIMIT", 30_u32),
                replay_path: env::var("EYE_REPLAY_PATH")
                    .ok()
                    .filter(|p| !p.trim().is_empty()),
            },
            tracking: TrackingConfig {
                smooth_window: env_or_parse("EYE_SMOOTH_WINDOW", DEFAULT_SMOOTH_WINDOW),
                stable_frames: env_or_parse("EYE_STABLE_FRAMES", DEFAULT_STABLE_FRAMES),
                dead_zone: env_or_parse("EYE_DEAD_ZONE", DEFAULT_DEAD_ZONE),
                move_percent: env_or_parse("EYE_MOVE_PERCENT", DEFAULT_MOVE_PERCENT),
                screen_width: env_or_parse("EYE_SCREEN_WIDTH", DEFAULT_SCREEN_WIDTH),
                move_cooldown_secs: env_or_parse("EYE_MOVE_COOLDOWN_SECS", 0.7_f64),
                use_arrow_keys: env_or_bool("EYE_USE_ARROW_KEYS", false),
            },
            blink: BlinkConfig {
                click_threshold: env_or_parse("EYE_BLINK_THRESHOLD", 0.19_f64),
                click_cooldown_secs: env_or_parse("EYE_BLINK_COOLDOWN_SECS", 0.6_f64),
                long_threshold: env_or_parse("EYE_LONG_BLINK_THRESHOLD", 0.19_f64),
                long_duration_secs: env_or_parse("EYE_LONG_BLINK_SECS", 1.0_f64),
                toggle_cooldown_secs: env_or_parse("EYE_TOGGLE_COOLDOWN_SECS", 2.0_f64),
            },
            output: OutputConfig {
                debug_view: env_or_bool("EYE_DEBUG_VIEW", true),
                dry_run: env_or_bool("EYE_DRY_RUN", false),
                center_on_start: env_or_bool("EYE_CENTER_ON_START", true),
            },
        }
    }

    /// 启动前校验；任何一项不合法都视为致命错误
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tracking;
        let b = &self.blink;
        let c = &self.camera;

        check(c.width > 0, "EYE_CAM_WIDTH", "> 0", c.width)?;
        check(c.height > 0, "EYE_CAM_HEIGHT", "> 0", c.height)?;
        check(t.smooth_window >= 1, "EYE_SMOOTH_WINDOW", ">= 1", t.smooth_window)?;
        check(t.stable_frames >= 1, "EYE_STABLE_FRAMES", ">= 1", t.stable_frames)?;
        check(
            (0.0..1.0).contains(&t.dead_zone),
            "EYE_DEAD_ZONE",
            "in [0, 1)",
            t.dead_zone,
        )?;
        check(
            t.move_percent > 0.0 && t.move_percent <= 1.0,
            "EYE_MOVE_PERCENT",
            "in (0, 1]",
            t.move_percent,
        )?;
        check(t.screen_width > 0, "EYE_SCREEN_WIDTH", "> 0", t.screen_width)?;
        check(
            non_negative(t.move_cooldown_secs),
            "EYE_MOVE_COOLDOWN_SECS",
            ">= 0",
            t.move_cooldown_secs,
        )?;
        check(
            b.click_threshold > 0.0,
            "EYE_BLINK_THRESHOLD",
            "> 0",
            b.click_threshold,
        )?;
        check(
            non_negative(b.click_cooldown_secs),
            "EYE_BLINK_COOLDOWN_SECS",
            ">= 0",
            b.click_cooldown_secs,
        )?;
        check(
            b.long_threshold > 0.0,
            "EYE_LONG_BLINK_THRESHOLD",
            "> 0",
            b.long_threshold,
        )?;
        check(
            b.long_duration_secs > 0.0 && b.long_duration_secs.is_finite(),
            "EYE_LONG_BLINK_SECS",
            "> 0",
            b.long_duration_secs,
        )?;
        check(
            non_negative(b.toggle_cooldown_secs),
            "EYE_TOGGLE_COOLDOWN_SECS",
            ">= 0",
            b.toggle_cooldown_secs,
        )?;
        Ok(())
    }
}

fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

fn check<T: ToString>(
    ok: bool,
    key: &'static str,
    expected: &'static str,
    value: T,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            key,
            expected,
            value: value.to_string(),
        })
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(key, value = %raw, "Failed to parse env var, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// 进程内读写环境变量的测试需要串行执行
#[cfg(test)]
pub(crate) fn env_lock() -> &'static std::sync::Mutex<()> {
    static LOCK: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    LOCK.get_or_init(|| std::sync::Mutex::new(()))
}
