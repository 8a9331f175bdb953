use crate::tracking::direction::Direction;

/// 方向去抖：同一标签连续出现 `required` 帧才算确认
#[derive(Debug, Clone)]
pub struct StabilityCounter {
    label: Direction,
    count: u32,
    required: u32,
}

impl StabilityCounter {
    pub fn new(required: u32) -> Self {
        Self {
            label: Direction::Center,
            count: 0,
            required: required.max(1),
        }
    }

    /// 记录一帧分类结果，返回更新后的计数。
    /// 标签不变则累加；标签变化时计数置 1 并切换候选标签。
    pub fn observe(&mut self, label: Direction) -> u32 {
        if label == self.label {
            self.count = self.count.saturating_add(1);
        } else {
            self.label = label;
            self.count = 1;
        }
        self.count
    }

    pub fn is_confirmed(&self) -> bool {
        self.count >= self.required
    }

    /// 发射或眨眼之后清零，下一次同向发射需要重新积累
    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn label(&self) -> Direction {
        self.label
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_identical_labels() {
        let mut s = StabilityCounter::new(2);
        assert_eq!(s.observe(Direction::Right), 1);
        assert!(!s.is_confirmed());
        assert_eq!(s.observe(Direction::Right), 2);
        assert!(s.is_confirmed());
    }

    #[test]
    fn label_change_resets_to_one() {
        let mut s = StabilityCounter::new(3);
        s.observe(Direction::Left);
        s.observe(Direction::Left);
        assert_eq!(s.observe(Direction::Right), 1);
        assert_eq!(s.label(), Direction::Right);
    }

    #[test]
    fn initial_center_frames_count_up_from_zero() {
        let mut s = StabilityCounter::new(2);
        assert_eq!(s.count(), 0);
        assert_eq!(s.observe(Direction::Center), 1);
    }

    #[test]
    fn reset_keeps_label_and_clears_count() {
        let mut s = StabilityCounter::new(2);
        s.observe(Direction::Left);
        s.observe(Direction::Left);
        s.reset();
        assert_eq!(s.count(), 0);
        assert_eq!(s.label(), Direction::Left);
        assert_eq!(s.observe(Direction::Left), 1);
    }
}
