//! 移动指令的发射与限速

use crate::tracking::direction::Direction;
use crate::tracking::stability::StabilityCounter;
use crate::tracking::ControlEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    /// 相对移动鼠标
    #[default]
    Relative,
    /// 按左右方向键
    ArrowKeys,
}

#[derive(Debug, Clone)]
pub struct MovementEmitter {
    cooldown_secs: f64,
    step_px: i32,
    mode: MovementMode,
    last_emit: Option<f64>,
}

impl MovementEmitter {
    pub fn new(cooldown_secs: f64, step_px: i32, mode: MovementMode) -> Self {
        Self {
            cooldown_secs,
            step_px,
            mode,
            last_emit: None,
        }
    }

    /// 单次移动的像素数，启动时按屏幕宽度计算一次
    pub fn step_from_screen(width_px: u32, move_percent: f64) -> i32 {
        ((f64::from(width_px) * move_percent).round() as i32).max(1)
    }

    pub fn cooled_down(&self, now: f64) -> bool {
        self.last_emit
            .map_or(true, |last| now - last > self.cooldown_secs)
    }

    /// 满足全部条件时发射一次移动：非中心、已确认、冷却已过、未暂停。
    /// 发射后记录时间并把稳定计数清零。
    pub fn try_emit(
        &mut self,
        stability: &mut StabilityCounter,
        paused: bool,
        now: f64,
    ) -> Option<ControlEvent> {
        if paused || !stability.is_confirmed() || !self.cooled_down(now) {
            return None;
        }
        let event = self.event_for(stability.label())?;
        self.last_emit = Some(now);
        stability.reset();
        Some(event)
    }

    /// 点击后压住移动，避免眨眼的同时触发位移
    pub fn hold_off(&mut self, now: f64) {
        self.last_emit = Some(now);
    }

    pub fn displacement(&self, direction: Direction) -> i32 {
        direction.sign() * self.step_px
    }

    pub fn last_emit(&self) -> Option<f64> {
        self.last_emit
    }

    fn event_for(&self, direction: Direction) -> Option<ControlEvent> {
        match self.mode {
            MovementMode::Relative => match direction {
                Direction::Center => None,
                Direction::Left | Direction::Right => Some(ControlEvent::Move {
                    direction,
                    dx: self.displacement(direction),
                }),
            },
            MovementMode::ArrowKeys => direction.arrow_key().map(|key| ControlEvent::Key { key }),
        }
    }
}
