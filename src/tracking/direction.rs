//! 水平方向分类
//!
//! 摄像头画面是镜像的：虹膜比例低于左阈值（偏向画面左侧）表示用户想往右，
//! 高于右阈值表示想往左。这个映射就是用户看到的控制语义，不要“修正”它。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::NEUTRAL_RATIO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    #[default]
    Center,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// 水平位移的符号：左 -1，中 0，右 +1
    pub fn sign(&self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Center => 0,
            Self::Right => 1,
        }
    }

    pub fn arrow_key(&self) -> Option<ArrowKey> {
        match self {
            Self::Left => Some(ArrowKey::Left),
            Self::Center => None,
            Self::Right => Some(ArrowKey::Right),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 方向键模式下注入的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowKey {
    Left,
    Right,
}

/// 由中心死区宽度得到的左右阈值，区间为 `[0.5 - w/2, 0.5 + w/2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionThresholds {
    pub left: f64,
    pub right: f64,
}

impl DirectionThresholds {
    pub fn from_dead_zone(width: f64) -> Self {
        let half = width / 2.0;
        Self {
            left: NEUTRAL_RATIO - half,
            right: NEUTRAL_RATIO + half,
        }
    }

    /// 纯函数：阈值本身归入中心区，NaN 也归入中心区
    pub fn classify(&self, ratio: f64) -> Direction {
        if ratio < self.left {
            Direction::Right
        } else if ratio > self.right {
            Direction::Left
        } else {
            Direction::Center
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_centered_on_half() {
        let t = DirectionThresholds::from_dead_zone(0.2);
        assert!((t.left - 0.4).abs() < 1e-12);
        assert!((t.right - 0.6).abs() < 1e-12);
    }

    #[test]
    fn mapping_is_mirrored() {
        let t = DirectionThresholds::from_dead_zone(0.2);
        assert_eq!(t.classify(0.0), Direction::Right);
        assert_eq!(t.classify(1.0), Direction::Left);
        assert_eq!(t.classify(0.5), Direction::Center);
    }

    #[test]
    fn boundaries_belong_to_center() {
        let t = DirectionThresholds { left: 0.4, right: 0.6 };
        assert_eq!(t.classify(0.4), Direction::Center);
        assert_eq!(t.classify(0.6), Direction::Center);
        assert_eq!(t.classify(f64::NAN), Direction::Center);
    }

    #[test]
    fn keys_and_signs_follow_direction() {
        assert_eq!(Direction::Left.sign(), -1);
        assert_eq!(Direction::Right.arrow_key(), Some(ArrowKey::Right));
        assert_eq!(Direction::Center.arrow_key(), None);
        assert_eq!(Direction::Center.to_string(), "center");
    }
}
