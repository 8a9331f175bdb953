#![allow(dead_code)]

use std::io::Write;

use gaze_pointer::config::BlinkConfig;
use gaze_pointer::constants::{
    LEFT_EYE_CORNERS, LEFT_IRIS, LEFT_LID_BOTTOM, LEFT_LID_TOP, MIN_LANDMARK_COUNT,
    RIGHT_EYE_CORNERS, RIGHT_IRIS, RIGHT_LID_BOTTOM, RIGHT_LID_TOP,
};
use gaze_pointer::tracking::direction::DirectionThresholds;
use gaze_pointer::tracking::emitter::MovementMode;
use gaze_pointer::tracking::geometry::{LandmarkSet, NormalizedPoint};
use gaze_pointer::tracking::pipeline::PipelineSettings;
use tempfile::NamedTempFile;

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;
pub const STEP_PX: i32 = 96;

pub const OPEN_LIDS: f64 = 0.05;
pub const CLOSED_LIDS: f64 = 0.005;

/// 双眼对称的合成人脸；`iris_x` 为虹膜在眼眶内的水平比例
pub fn face(iris_x: f64, lid_gap: f64) -> LandmarkSet {
    let mut points = vec![NormalizedPoint::new(0.5, 0.5); MIN_LANDMARK_COUNT];
    for (corners, iris, top, bottom, x0) in [
        (LEFT_EYE_CORNERS, LEFT_IRIS, LEFT_LID_TOP, LEFT_LID_BOTTOM, 0.30),
        (RIGHT_EYE_CORNERS, RIGHT_IRIS, RIGHT_LID_TOP, RIGHT_LID_BOTTOM, 0.60),
    ] {
        points[corners[0]] = NormalizedPoint::new(x0, 0.5);
        points[corners[1]] = NormalizedPoint::new(x0 + 0.1, 0.5);
        points[iris] = NormalizedPoint::new(x0 + 0.1 * iris_x, 0.5);
        points[top] = NormalizedPoint::new(x0 + 0.05, 0.5 - lid_gap / 2.0);
        points[bottom] = NormalizedPoint::new(x0 + 0.05, 0.5 + lid_gap / 2.0);
    }
    LandmarkSet::new(points)
}

/// 采集日志里的一行
pub enum Record {
    Face { t: f64, iris_x: f64, lid_gap: f64 },
    NoFace { t: f64 },
}

pub fn write_capture(records: &[Record]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    writeln!(file, "# synthetic capture").expect("write header");
    for record in records {
        let line = match *record {
            Record::Face { t, iris_x, lid_gap } => serde_json::json!({
                "t": t,
                "landmarks": face(iris_x, lid_gap),
            }),
            Record::NoFace { t } => serde_json::json!({ "t": t, "landmarks": null }),
        };
        writeln!(file, "{line}").expect("write record");
    }
    file.flush().expect("flush");
    file
}

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        smooth_window: 3,
        stable_frames: 2,
        thresholds: DirectionThresholds::from_dead_zone(0.16),
        move_cooldown_secs: 0.7,
        step_px: STEP_PX,
        mode: MovementMode::Relative,
        blink: BlinkConfig {
            // 较长的点击冷却让长闭眼期间不再重复点击，断言更确定
            click_cooldown_secs: 5.0,
            ..BlinkConfig::default()
        },
    }
}
