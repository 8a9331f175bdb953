//! 输入注入端
//!
//! 桌面后端基于 enigo（`desktop` feature）；dry-run 后端只记录和打日志，
//! 用于测试和不希望真的移动鼠标的回放。

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::info;

use crate::tracking::direction::ArrowKey;
use crate::tracking::ControlEvent;

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("input backend unavailable: {0}")]
    Unavailable(String),
    #[error("input injection failed: {0}")]
    Failed(String),
}

pub trait InputInjector {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InjectError>;

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), InjectError>;

    fn click(&mut self) -> Result<(), InjectError>;

    fn press_key(&mut self, key: ArrowKey) -> Result<(), InjectError>;

    /// 主显示器像素尺寸；后端查询不到时返回 `None`
    fn display_size(&self) -> Option<(u32, u32)>;

    fn name(&self) -> &str;
}

/// 把流水线事件翻译成注入调用；暂停切换只是状态变化，不产生输入
pub fn dispatch(injector: &mut dyn InputInjector, event: &ControlEvent) -> Result<(), InjectError> {
    match *event {
        ControlEvent::Move { dx, .. } => injector.move_relative(dx, 0),
        ControlEvent::Key { key } => injector.press_key(key),
        ControlEvent::Click => injector.click(),
        ControlEvent::PauseToggled { .. } => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedAction {
    MoveRelative { dx: i32, dy: i32 },
    MoveAbsolute { x: i32, y: i32 },
    Click,
    Key(ArrowKey),
}

/// 可共享的动作记录，测试里在会话结束后检查
pub type ActionLog = Arc<Mutex<Vec<InjectedAction>>>;

#[derive(Debug, Default)]
pub struct DryRunInjector {
    log: ActionLog,
    display: Option<(u32, u32)>,
}

impl DryRunInjector {
    pub fn new(display: Option<(u32, u32)>) -> Self {
        Self {
            log: ActionLog::default(),
            display,
        }
    }

    pub fn log(&self) -> ActionLog {
        Arc::clone(&self.log)
    }

    fn record(&mut self, action: InjectedAction) -> Result<(), InjectError> {
        info!(?action, "Dry run: input not injected");
        self.log
            .lock()
            .map_err(|e| InjectError::Failed(e.to_string()))?
            .push(action);
        Ok(())
    }
}

impl InputInjector for DryRunInjector {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InjectError> {
        self.record(InjectedAction::MoveRelative { dx, dy })
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), InjectError> {
        self.record(InjectedAction::MoveAbsolute { x, y })
    }

    fn click(&mut self) -> Result<(), InjectError> {
        self.record(InjectedAction::Click)
    }

    fn press_key(&mut self, key: ArrowKey) -> Result<(), InjectError> {
        self.record(InjectedAction::Key(key))
    }

    fn display_size(&self) -> Option<(u32, u32)> {
        self.display
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

#[cfg(feature = "desktop")]
pub use desktop::EnigoInjector;

#[cfg(feature = "desktop")]
mod desktop {
    use enigo::{Button, Coordinate, Direction as Press, Enigo, Key, Keyboard, Mouse, Settings};

    use super::{InjectError, InputInjector};
    use crate::tracking::direction::ArrowKey;

    pub struct EnigoInjector {
        enigo: Enigo,
    }

    impl EnigoInjector {
        pub fn new() -> Result<Self, InjectError> {
            Enigo::new(&Settings::default())
                .map(|enigo| Self { enigo })
                .map_err(|e| InjectError::Unavailable(e.to_string()))
        }
    }

    fn failed(e: enigo::InputError) -> InjectError {
        InjectError::Failed(e.to_string())
    }

    impl InputInjector for EnigoInjector {
        fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InjectError> {
            self.enigo.move_mouse(dx, dy, Coordinate::Rel).map_err(failed)
        }

        fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), InjectError> {
            self.enigo.move_mouse(x, y, Coordinate::Abs).map_err(failed)
        }

        fn click(&mut self) -> Result<(), InjectError> {
            self.enigo.button(Button::Left, Press::Click).map_err(failed)
        }

        fn press_key(&mut self, key: ArrowKey) -> Result<(), InjectError> {
            let key = match key {
                ArrowKey::Left => Key::LeftArrow,
                ArrowKey::Right => Key::RightArrow,
            };
            self.enigo.key(key, Press::Click).map_err(failed)
        }

        fn display_size(&self) -> Option<(u32, u32)> {
            let (w, h) = self.enigo.main_display().ok()?;
            Some((u32::try_from(w).ok()?, u32::try_from(h).ok()?))
        }

        fn name(&self) -> &str {
            "enigo"
        }
    }
}
