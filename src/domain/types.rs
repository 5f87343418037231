// ==========================================
// 兼容性矩阵导入系统 - 领域类型定义
// ==========================================
// 职责: 工作表类别 / 管道变体 / 记录类型等封闭枚举
// 序列化格式: snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工作表类别 (Sheet Kind) - 通用兼容性管道
// ==========================================
// 封闭枚举: 未识别的工作表直接跳过，不扩展
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    OsWindows,          // 软件 × Windows 版本
    OsMacos,            // 软件 × macOS 版本
    LightroomBridge,    // Lightroom 导出桥接
    HostAppBridge,      // 宿主应用桥接（插件实例）
    DeviceRawConverter, // RAW 转换器（PureRAW）
    PluginCollection,   // Nik 插件 × 宿主应用
    PluginOsMac,        // Nik 插件 × macOS
    PluginOsWin,        // Nik 插件 × Windows
}

impl SheetKind {
    /// 全部类别（按声明顺序）
    pub const ALL: [SheetKind; 8] = [
        SheetKind::OsWindows,
        SheetKind::OsMacos,
        SheetKind::LightroomBridge,
        SheetKind::HostAppBridge,
        SheetKind::DeviceRawConverter,
        SheetKind::PluginCollection,
        SheetKind::PluginOsMac,
        SheetKind::PluginOsWin,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SheetKind::OsWindows => "os_windows",
            SheetKind::OsMacos => "os_macos",
            SheetKind::LightroomBridge => "lightroom_bridge",
            SheetKind::HostAppBridge => "host_app_bridge",
            SheetKind::DeviceRawConverter => "device_raw_converter",
            SheetKind::PluginCollection => "plugin_collection",
            SheetKind::PluginOsMac => "plugin_os_mac",
            SheetKind::PluginOsWin => "plugin_os_win",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ==========================================
// 降噪管道工作表类别 (Denoising Sheet Kind)
// ==========================================
// 按精确表名定位；缺表只产出 0 条记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenoisingSheetKind {
    Technologies, // 软件版本 × 降噪技术
    Requirements, // 硬件/传感器/格式 × 降噪技术
}

impl DenoisingSheetKind {
    pub const ALL: [DenoisingSheetKind; 2] =
        [DenoisingSheetKind::Technologies, DenoisingSheetKind::Requirements];

    /// 期望的精确工作表名
    pub fn sheet_name(&self) -> &'static str {
        match self {
            DenoisingSheetKind::Technologies => "Denoising Technologies",
            DenoisingSheetKind::Requirements => "Denoising Requirements",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DenoisingSheetKind::Technologies => "denoising_technologies",
            DenoisingSheetKind::Requirements => "denoising_requirements",
        }
    }

    /// 精确表名匹配（仅去首尾空白）
    pub fn from_sheet_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|k| k.sheet_name() == name)
    }
}

impl fmt::Display for DenoisingSheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ==========================================
// 管道变体 (Pipeline Variant)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    Compatibility, // 通用形态: software × feature × target
    Denoising,     // 能力形态: name × denoising_tech
}

impl PipelineVariant {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineVariant::Compatibility => "compatibility",
            PipelineVariant::Denoising => "denoising",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "compatibility" => Some(PipelineVariant::Compatibility),
            "denoising" => Some(PipelineVariant::Denoising),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ==========================================
// 记录类型 (Record Type) - 能力形态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Software,
    Capability,
}

impl RecordType {
    pub fn code(&self) -> &'static str {
        match self {
            RecordType::Software => "software",
            RecordType::Capability => "capability",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "software" => Some(RecordType::Software),
            "capability" => Some(RecordType::Capability),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
