//! # Config 模块
//!
//! 宿主配置，集中管理导航与返回信号的配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use nav_runtime::{EasingFunction, PlatformMode, TransitionStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::outlet::OutletOptions;

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// 导航配置
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// 返回信号配置
    #[serde(default)]
    pub back_button: BackButtonConfig,
}

/// 导航配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// `default` 动画的回退值
    #[serde(default)]
    pub default_animation: TransitionStyle,

    /// 平台风格（决定 default 最终落到 edge-slide 还是 fade-scale）
    #[serde(default)]
    pub mode: PlatformMode,

    /// 是否从右到左布局
    #[serde(default)]
    pub rtl: bool,

    /// 覆盖所有过渡的时长（秒）
    #[serde(default)]
    pub duration: Option<f32>,

    /// 覆盖所有过渡的缓动
    #[serde(default)]
    pub easing: Option<EasingFunction>,
}

/// 返回信号配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackButtonConfig {
    /// 启动时是否启用
    #[serde(default = "default_back_button_enabled")]
    pub enabled: bool,

    /// 节流窗口（毫秒）
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_animation: TransitionStyle::Default,
            mode: PlatformMode::default(),
            rtl: false,
            duration: None,
            easing: None,
        }
    }
}

impl Default for BackButtonConfig {
    fn default() -> Self {
        Self {
            enabled: default_back_button_enabled(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

// 默认值函数
fn default_back_button_enabled() -> bool {
    true
}

fn default_throttle_ms() -> u64 {
    500
}

impl NavigationConfig {
    /// 转换为渲染层参数
    pub fn outlet_options(&self) -> OutletOptions {
        OutletOptions {
            mode: self.mode,
            is_rtl: self.rtl,
            duration: self.duration,
            easing: self.easing,
        }
    }
}

impl HostConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match Self::from_json_str(&content) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    tracing::warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 从 JSON 文本解析
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(duration) = self.navigation.duration
            && (!duration.is_finite() || duration <= 0.0)
        {
            return Err(ConfigError::ValidationFailed(format!(
                "过渡时长必须是大于 0 的有限值，当前为 {duration}"
            )));
        }

        // 贝塞尔曲线的 x 必须单调，控制点 x 限定在 [0, 1]
        if let Some(EasingFunction::CubicBezier { x1, y1, x2, y2 }) = self.navigation.easing {
            let x_in_range = |x: f32| (0.0..=1.0).contains(&x);
            if !x_in_range(x1) || !x_in_range(x2) || !y1.is_finite() || !y2.is_finite() {
                return Err(ConfigError::ValidationFailed(format!(
                    "贝塞尔曲线控制点无效: ({x1}, {y1}, {x2}, {y2})"
                )));
            }
        }

        if self.back_button.throttle_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "返回信号节流窗口必须大于 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 解析失败
    #[error("配置解析失败: {0}")]
    ParseFailed(String),
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
