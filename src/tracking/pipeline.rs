//! 单帧决策流水线
//!
//! 帧循环持有 [`PipelineState`]，每帧以 `&mut` 传给 [`process_frame`]。
//! 顺序：平滑 → 分类 → 稳定计数 → 眨眼状态机（可能清零计数）→ 移动发射。

use tracing::info;

use crate::config::{BlinkConfig, Config};
use crate::tracking::blink::BlinkMachine;
use crate::tracking::direction::{Direction, DirectionThresholds};
use crate::tracking::emitter::{MovementEmitter, MovementMode};
use crate::tracking::geometry::{IrisRatio, Measurement};
use crate::tracking::smoothing::RatioSmoother;
use crate::tracking::stability::StabilityCounter;
use crate::tracking::ControlEvent;

/// 启动时确定、运行期间不变的参数
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub smooth_window: usize,
    pub stable_frames: u32,
    pub thresholds: DirectionThresholds,
    pub move_cooldown_secs: f64,
    pub step_px: i32,
    pub mode: MovementMode,
    pub blink: BlinkConfig,
}

impl PipelineSettings {
    /// `screen_width_px` 为实际查询到的屏幕宽度（查询不到时用配置值）
    pub fn from_config(config: &Config, screen_width_px: u32) -> Self {
        let t = &config.tracking;
        Self {
            smooth_window: t.smooth_window,
            stable_frames: t.stable_frames,
            thresholds: DirectionThresholds::from_dead_zone(t.dead_zone),
            move_cooldown_secs: t.move_cooldown_secs,
            step_px: MovementEmitter::step_from_screen(screen_width_px, t.move_percent),
            mode: if t.use_arrow_keys {
                MovementMode::ArrowKeys
            } else {
                MovementMode::Relative
            },
            blink: config.blink.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineState {
    pub smoother: RatioSmoother,
    pub stability: StabilityCounter,
    pub emitter: MovementEmitter,
    pub blink: BlinkMachine,
    pub paused: bool,
}

impl PipelineState {
    pub fn new(settings: &PipelineSettings) -> Self {
        Self {
            smoother: RatioSmoother::new(settings.smooth_window),
            stability: StabilityCounter::new(settings.stable_frames),
            emitter: MovementEmitter::new(
                settings.move_cooldown_secs,
                settings.step_px,
                settings.mode,
            ),
            blink: BlinkMachine::new(settings.blink.clone()),
            paused: false,
        }
    }
}

/// 单帧处理结果，供调试视图展示并由帧循环分发事件
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub timestamp: f64,
    pub face_detected: bool,
    pub direction: Direction,
    pub stability: u32,
    pub smoothed: IrisRatio,
    pub ear: f64,
    pub paused: bool,
    pub long_blink_progress: Option<f64>,
    pub events: Vec<ControlEvent>,
}

/// 处理一帧。
///
/// `measurement` 为 `None` 表示本帧没有可用人脸：方向按中心处理，EAR 记为 0，
/// 眨眼状态机本帧不求值（不会误触发点击，也不打断闭眼计时）。
pub fn process_frame(
    state: &mut PipelineState,
    settings: &PipelineSettings,
    measurement: Option<Measurement>,
    now: f64,
) -> FrameReport {
    let mut events = Vec::new();

    let (smoothed, direction) = match measurement {
        Some(m) => {
            let smoothed = state.smoother.push(m.iris_ratio);
            (smoothed, settings.thresholds.classify(smoothed.x))
        }
        None => (state.smoother.estimate(), Direction::Center),
    };

    state.stability.observe(direction);

    let ear = measurement.map_or(0.0, |m| m.ear);
    if measurement.is_some() {
        let outcome = state.blink.update(ear, now);
        if outcome.click {
            info!(ear, "Blink detected, clicking");
            events.push(ControlEvent::Click);
            state.emitter.hold_off(now);
            state.stability.reset();
        }
        if outcome.toggle_pause {
            state.paused = !state.paused;
            info!(
                paused = state.paused,
                "Long blink, commands {}",
                if state.paused { "paused" } else { "resumed" }
            );
            events.push(ControlEvent::PauseToggled {
                paused: state.paused,
            });
        }
    }

    let stability_before_emit = state.stability.count();
    if let Some(event) = state
        .emitter
        .try_emit(&mut state.stability, state.paused, now)
    {
        info!(
            %direction,
            stable = stability_before_emit,
            "Emitting movement"
        );
        events.push(event);
    }

    FrameReport {
        timestamp: now,
        face_detected: measurement.is_some(),
        direction,
        stability: state.stability.count(),
        smoothed,
        ear,
        paused: state.paused,
        long_blink_progress: state.blink.long_blink_progress(now),
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 30.0;

    fn settings() -> PipelineSettings {
        PipelineSettings {
            smooth_window: 3,
            stable_frames: 2,
            thresholds: DirectionThresholds::from_dead_zone(0.16),
            move_cooldown_secs: 0.7,
            step_px: 96,
            mode: MovementMode::Relative,
            blink: BlinkConfig::default(),
        }
    }

    fn open_eyes(x: f64) -> Option<Measurement> {
        Some(Measurement {
            iris_ratio: IrisRatio::new(x, 0.5),
            ear: 0.30,
        })
    }

    #[test]
    fn held_left_ratio_emits_one_right_move() {
        let s = settings();
        let mut state = PipelineState::new(&s);
        let mut emitted_at = Vec::new();
        for frame in 0..(s.stable_frames + 2) {
            let report = process_frame(&mut state, &s, open_eyes(0.0), 10.0 + f64::from(frame) * DT);
            if report
                .events
                .iter()
                .any(|e| matches!(e, ControlEvent::Move { direction: Direction::Right, dx: 96 }))
            {
                emitted_at.push(frame);
            }
        }
        assert_eq!(emitted_at, vec![s.stable_frames - 1]);
    }

    #[test]
    fn one_frame_blink_clicks_and_resets_stability() {
        let s = settings();
        let mut state = PipelineState::new(&s);
        process_frame(&mut state, &s, open_eyes(0.5), 0.0);
        let blink = Some(Measurement {
            iris_ratio: IrisRatio::new(0.5, 0.5),
            ear: 0.10,
        });
        let report = process_frame(&mut state, &s, blink, DT);
        assert_eq!(report.events, vec![ControlEvent::Click]);
        assert_eq!(report.stability, 0);

        let report = process_frame(&mut state, &s, open_eyes(0.5), 2.0 * DT);
        assert!(report.events.is_empty());
    }

    #[test]
    fn paused_pipeline_suppresses_movement_only() {
        let s = settings();
        let mut state = PipelineState::new(&s);
        state.paused = true;
        let mut events = Vec::new();
        for frame in 0..10 {
            let report = process_frame(&mut state, &s, open_eyes(1.0), f64::from(frame));
            events.extend(report.events);
        }
        assert!(events.is_empty());

        let blink = Some(Measurement {
            iris_ratio: IrisRatio::new(1.0, 0.5),
            ear: 0.05,
        });
        let report = process_frame(&mut state, &s, blink, 20.0);
        assert_eq!(report.events, vec![ControlEvent::Click]);
    }

    #[test]
    fn missing_face_is_centered_and_skips_blinks() {
        let s = settings();
        let mut state = PipelineState::new(&s);
        let report = process_frame(&mut state, &s, None, 1.0);
        assert!(!report.face_detected);
        assert_eq!(report.direction, Direction::Center);
        assert_eq!(report.ear, 0.0);
        assert_eq!(report.smoothed, IrisRatio::new(0.5, 0.5));
        assert!(report.events.is_empty());
        assert!(state.smoother.is_empty());
    }

    #[test]
    fn long_blink_toggles_pause() {
        let s = settings();
        let mut state = PipelineState::new(&s);
        let closed = Some(Measurement {
            iris_ratio: IrisRatio::new(0.5, 0.5),
            ear: 0.05,
        });
        let mut toggles = Vec::new();
        let mut t = 0.0;
        while t <= 1.2 {
            let report = process_frame(&mut state, &s, closed, t);
            toggles.extend(
                report
                    .events
                    .into_iter()
                    .filter(|e| matches!(e, ControlEvent::PauseToggled { .. })),
            );
            t += DT;
        }
        assert_eq!(toggles, vec![ControlEvent::PauseToggled { paused: true }]);
        assert!(state.paused);
    }

    #[test]
    fn settings_follow_config() {
        let mut config = {
            let _guard = crate::config::env_lock().lock().expect("env lock");
            Config::from_env()
        };
        config.tracking.use_arrow_keys = true;
        config.tracking.move_percent = 0.05;
        config.tracking.dead_zone = 0.2;
        let s = PipelineSettings::from_config(&config, 2000);
        assert_eq!(s.step_px, 100);
        assert_eq!(s.mode, MovementMode::ArrowKeys);
        assert!((s.thresholds.left - 0.4).abs() < 1e-12);
    }
}
