//! 眨眼状态机
//!
//! 每帧用同一个 EAR 值驱动两个互相独立的子状态机：
//! - 短眨眼：EAR 低于阈值且不在冷却中 → 点击
//! - 长眨眼：持续闭眼超过设定时长 → 切换暂停 / 恢复
//!
//! 长眨眼触发一次后进入锁存状态，必须睁眼再闭眼才能再次计时，
//! 所以一次连续闭眼最多只切换一次。

use tracing::debug;

use crate::config::BlinkConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Closure {
    Open,
    Closed { since: f64 },
    /// 本次闭眼已经触发过切换，等待睁眼
    Latched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlinkOutcome {
    pub click: bool,
    pub toggle_pause: bool,
}

#[derive(Debug, Clone)]
pub struct BlinkMachine {
    config: BlinkConfig,
    click_ready_after: Option<f64>,
    closure: Closure,
    last_toggle: Option<f64>,
}

impl BlinkMachine {
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config,
            click_ready_after: None,
            closure: Closure::Open,
            last_toggle: None,
        }
    }

    /// 两个子状态机都会被求值，互不短路；暂停状态不影响这里
    pub fn update(&mut self, ear: f64, now: f64) -> BlinkOutcome {
        let click = self.update_click(ear, now);
        let toggle_pause = self.update_long_blink(ear, now);
        BlinkOutcome {
            click,
            toggle_pause,
        }
    }

    /// 正在计时的长眨眼进度 (0.0 - 1.0)；睁眼或已锁存时为 `None`
    pub fn long_blink_progress(&self, now: f64) -> Option<f64> {
        match self.closure {
            Closure::Closed { since } => {
                if self.config.long_duration_secs <= 0.0 {
                    return Some(1.0);
                }
                Some(((now - since) / self.config.long_duration_secs).clamp(0.0, 1.0))
            }
            Closure::Open | Closure::Latched => None,
        }
    }

    pub fn is_tracking_closure(&self) -> bool {
        matches!(self.closure, Closure::Closed { .. })
    }

    fn update_click(&mut self, ear: f64, now: f64) -> bool {
        if ear >= self.config.click_threshold {
            return false;
        }
        let ready = self.click_ready_after.map_or(true, |until| now > until);
        if ready {
            self.click_ready_after = Some(now + self.config.click_cooldown_secs);
        }
        ready
    }

    fn update_long_blink(&mut self, ear: f64, now: f64) -> bool {
        if ear >= self.config.long_threshold {
            self.closure = Closure::Open;
            return false;
        }

        match self.closure {
            Closure::Open => {
                debug!(ear, "Eyes closed, timing long blink");
                self.closure = Closure::Closed { since: now };
                false
            }
            Closure::Closed { since } => {
                let held = now - since >= self.config.long_duration_secs;
                let cooled = self
                    .last_toggle
                    .map_or(true, |last| now > last + self.config.toggle_cooldown_secs);
                if held && cooled {
                    self.last_toggle = Some(now);
                    self.closure = Closure::Latched;
                    true
                } else {
                    false
                }
            }
            Closure::Latched => false,
        }
    }
}
