pub mod blink;
pub mod direction;
pub mod emitter;
pub mod geometry;
pub mod pipeline;
pub mod smoothing;
pub mod stability;

use serde::Serialize;

use direction::{ArrowKey, Direction};

/// 一帧处理后需要交给输入注入端执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlEvent {
    Move { direction: Direction, dx: i32 },
    Key { key: ArrowKey },
    Click,
    PauseToggled { paused: bool },
}
