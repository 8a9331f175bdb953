//! 关键点几何适配
//!
//! 把检测器输出的归一化关键点换算到像素坐标，并导出每帧的两个信号：
//! - 虹膜比例：虹膜中心在眼眶包围盒内的相对位置（双眼平均）
//! - EAR：眼睑垂直距离 / 眼角水平距离（双眼平均）
//!
//! 所有除法都带零分母保护，退化几何返回 0 而不是报错。

use serde::{Deserialize, Serialize};

use crate::constants::{
    GEOMETRY_EPSILON, LEFT_EYE_CORNERS, LEFT_IRIS, LEFT_LID_BOTTOM, LEFT_LID_TOP,
    MIN_LANDMARK_COUNT, RIGHT_EYE_CORNERS, RIGHT_IRIS, RIGHT_LID_BOTTOM, RIGHT_LID_TOP,
    TRACKED_LANDMARKS,
};

/// 归一化坐标点，x / y 约在 [0,1]；序列化为 `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 换算到像素坐标（向零截断）
    pub fn to_pixel(self, width: u32, height: u32) -> PixelPoint {
        PixelPoint {
            x: (self.x * f64::from(width)) as i32,
            y: (self.y * f64::from(height)) as i32,
        }
    }
}

impl From<[f64; 2]> for NormalizedPoint {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<NormalizedPoint> for [f64; 2] {
    fn from(value: NormalizedPoint) -> Self {
        [value.x, value.y]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    /// 相对 `origin` 的位移；先转 f64 再相减，饱和到边界的坐标也不会溢出
    pub fn offset_from(&self, origin: &PixelPoint) -> (f64, f64) {
        (
            f64::from(self.x) - f64::from(origin.x),
            f64::from(self.y) - f64::from(origin.y),
        )
    }

    pub fn distance(&self, other: &PixelPoint) -> f64 {
        let (dx, dy) = self.offset_from(other);
        dx.hypot(dy)
    }
}

/// 单张人脸的关键点集合，由检测器每帧重新生成
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<NormalizedPoint>,
}

impl LandmarkSet {
    pub fn new(points: Vec<NormalizedPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 是否覆盖流水线需要的全部语义点。检测退化时点数可能不足。
    pub fn is_complete(&self) -> bool {
        self.points.len() >= MIN_LANDMARK_COUNT
    }

    pub fn get(&self, index: usize) -> Option<NormalizedPoint> {
        self.points.get(index).copied()
    }

    /// 调试视图需要标注的像素点；集合不完整时返回空
    pub fn tracked_pixels(&self, width: u32, height: u32) -> Vec<PixelPoint> {
        if !self.is_complete() {
            return Vec::new();
        }
        TRACKED_LANDMARKS
            .iter()
            .filter_map(|&idx| self.get(idx))
            .map(|p| p.to_pixel(width, height))
            .collect()
    }
}

/// 虹膜在眼眶内的相对位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IrisRatio {
    pub x: f64,
    pub y: f64,
}

impl IrisRatio {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 单帧测量结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub iris_ratio: IrisRatio,
    pub ear: f64,
}

#[derive(Debug, Clone, Copy)]
struct EyePoints {
    outer_corner: PixelPoint,
    inner_corner: PixelPoint,
    iris: PixelPoint,
    lid_top: PixelPoint,
    lid_bottom: PixelPoint,
}

impl EyePoints {
    fn collect(
        set: &LandmarkSet,
        corners: [usize; 2],
        iris: usize,
        top: usize,
        bottom: usize,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let px = |idx: usize| set.get(idx).map(|p| p.to_pixel(width, height));
        Some(Self {
            outer_corner: px(corners[0])?,
            inner_corner: px(corners[1])?,
            iris: px(iris)?,
            lid_top: px(top)?,
            lid_bottom: px(bottom)?,
        })
    }

    fn iris_ratio(&self) -> IrisRatio {
        let (width, _) = self.inner_corner.offset_from(&self.outer_corner);
        let (_, height) = self.lid_bottom.offset_from(&self.lid_top);
        let (iris_dx, _) = self.iris.offset_from(&self.outer_corner);
        let (_, iris_dy) = self.iris.offset_from(&self.lid_top);
        IrisRatio {
            x: guarded_ratio(iris_dx, width),
            y: guarded_ratio(iris_dy, height),
        }
    }

    fn ear(&self) -> f64 {
        let horizontal = self.outer_corner.distance(&self.inner_corner);
        let vertical = self.lid_top.distance(&self.lid_bottom);
        guarded_ratio(vertical, horizontal)
    }
}

/// 零分母返回 0，否则分母加上 epsilon 后相除
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / (denominator + GEOMETRY_EPSILON)
    }
}

/// 从关键点集合计算本帧测量值。
///
/// 返回 `None` 表示“未检测到人脸”：集合缺失或点数不足都按此处理，
/// 调用方应将本帧视为居中、睁眼状态。
pub fn measure(landmarks: Option<&LandmarkSet>, width: u32, height: u32) -> Option<Measurement> {
    let set = landmarks.filter(|s| s.is_complete())?;

    let left = EyePoints::collect(
        set,
        LEFT_EYE_CORNERS,
        LEFT_IRIS,
        LEFT_LID_TOP,
        LEFT_LID_BOTTOM,
        width,
        height,
    )?;
    let right = EyePoints::collect(
        set,
        RIGHT_EYE_CORNERS,
        RIGHT_IRIS,
        RIGHT_LID_TOP,
        RIGHT_LID_BOTTOM,
        width,
        height,
    )?;

    let l = left.iris_ratio();
    let r = right.iris_ratio();
    let iris_ratio = IrisRatio::new((l.x + r.x) / 2.0, (l.y + r.y) / 2.0);
    let ear = (left.ear() + right.ear()) / 2.0;

    Some(Measurement { iris_ratio, ear })
}
