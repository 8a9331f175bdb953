/// 左眼外眼角 / 内眼角（FaceMesh 索引）
pub const LEFT_EYE_CORNERS: [usize; 2] = [33, 133];

/// 右眼内眼角 / 外眼角
pub const RIGHT_EYE_CORNERS: [usize; 2] = [362, 263];

/// 左虹膜中心（需要 refine_landmarks 模型输出）
pub const LEFT_IRIS: usize = 468;

/// 右虹膜中心
pub const RIGHT_IRIS: usize = 473;

/// 左眼上 / 下眼睑
pub const LEFT_LID_TOP: usize = 159;
pub const LEFT_LID_BOTTOM: usize = 145;

/// 右眼上 / 下眼睑
pub const RIGHT_LID_TOP: usize = 386;
pub const RIGHT_LID_BOTTOM: usize = 374;

/// 流水线读取的全部关键点索引，调试视图会标出这些点
pub const TRACKED_LANDMARKS: [usize; 10] = [
    LEFT_EYE_CORNERS[0],
    LEFT_EYE_CORNERS[1],
    RIGHT_EYE_CORNERS[0],
    RIGHT_EYE_CORNERS[1],
    LEFT_IRIS,
    RIGHT_IRIS,
    LEFT_LID_TOP,
    LEFT_LID_BOTTOM,
    RIGHT_LID_TOP,
    RIGHT_LID_BOTTOM,
];

/// 关键点集合的最小长度；少于此值视为本帧未检测到人脸
pub const MIN_LANDMARK_COUNT: usize = RIGHT_IRIS + 1;

/// 几何计算中分母的下限补偿
pub const GEOMETRY_EPSILON: f64 = 1e-6;

/// 平滑窗口为空时使用的中性虹膜比例
pub const NEUTRAL_RATIO: f64 = 0.5;

/// 读帧 / 检测失败后的重试间隔（毫秒）
pub const FRAME_RETRY_DELAY_MS: u64 = 100;

/// 默认平滑窗口大小
pub const DEFAULT_SMOOTH_WINDOW: usize = 3;

/// 默认方向确认所需的连续帧数
pub const DEFAULT_STABLE_FRAMES: u32 = 2;

/// 默认中心死区宽度（以 0.5 为中心）
pub const DEFAULT_DEAD_ZONE: f64 = 0.16;

/// 默认单次移动距离（屏幕宽度的比例）
pub const DEFAULT_MOVE_PERCENT: f64 = 0.05;

/// 无法查询显示器时使用的屏幕宽度
pub const DEFAULT_SCREEN_WIDTH: u32 = 1920;
