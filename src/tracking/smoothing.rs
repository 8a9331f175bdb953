//! 虹膜比例的中值平滑
//!
//! 用中值而不是均值，单帧的关键点抖动或误检不会把输出拉偏。

use std::collections::VecDeque;

use crate::constants::NEUTRAL_RATIO;
use crate::tracking::geometry::IrisRatio;

/// 固定容量的 FIFO 窗口，满了之后淘汰最旧的样本
#[derive(Debug, Clone)]
pub struct MedianWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl MedianWindow {
    /// 容量为 0 时按 1 处理
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f64) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// 窗口内现有样本的中值；偶数个样本取中间两个的均值
    pub fn median(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// 水平、垂直两个分量各自一个窗口
#[derive(Debug, Clone)]
pub struct RatioSmoother {
    x: MedianWindow,
    y: MedianWindow,
}

impl RatioSmoother {
    pub fn new(capacity: usize) -> Self {
        Self {
            x: MedianWindow::new(capacity),
            y: MedianWindow::new(capacity),
        }
    }

    pub fn push(&mut self, sample: IrisRatio) -> IrisRatio {
        self.x.push(sample.x);
        self.y.push(sample.y);
        self.estimate()
    }

    /// 当前平滑估计；还没有任何样本时返回中性点 (0.5, 0.5)
    pub fn estimate(&self) -> IrisRatio {
        IrisRatio::new(
            self.x.median().unwrap_or(NEUTRAL_RATIO),
            self.y.median().unwrap_or(NEUTRAL_RATIO),
        )
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
