//! 显示器尺寸探测（尽力而为）
//!
//! 像素尺寸来自输入注入后端；物理尺寸只用于启动日志，在 Linux 上从
//! DRM 连接器的 EDID 读取。任何一步失败都返回 `None`，不影响流水线。

use std::fs;
use std::path::Path;

use crate::devices::injector::InputInjector;

const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
const DRM_SYSFS: &str = "/sys/class/drm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    pub width_px: u32,
    pub height_px: u32,
    /// 物理宽高（毫米）
    pub physical_mm: Option<(u32, u32)>,
}

pub fn probe(injector: &dyn InputInjector) -> Option<DisplayInfo> {
    let (width_px, height_px) = injector.display_size()?;
    Some(DisplayInfo {
        width_px,
        height_px,
        physical_mm: physical_size_mm(),
    })
}

/// 第一个已连接显示器的物理尺寸
pub fn physical_size_mm() -> Option<(u32, u32)> {
    let root = Path::new(DRM_SYSFS);
    let entries = fs::read_dir(root).ok()?;
    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            fs::read_to_string(entry.path().join("status"))
                .map(|s| s.trim() == "connected")
                .unwrap_or(false)
        })
        .find_map(|entry| {
            let edid = fs::read(entry.path().join("edid")).ok()?;
            parse_edid_size(&edid)
        })
}

/// EDID 基本块第 21、22 字节为最大图像尺寸（厘米）；0 表示未知
pub fn parse_edid_size(edid: &[u8]) -> Option<(u32, u32)> {
    if edid.len() < 128 || edid[..8] != EDID_HEADER {
        return None;
    }
    let (w_cm, h_cm) = (u32::from(edid[21]), u32::from(edid[22]));
    if w_cm == 0 || h_cm == 0 {
        return None;
    }
    Some((w_cm * 10, h_cm * 10))
}
