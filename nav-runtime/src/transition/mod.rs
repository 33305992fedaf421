//! # Transition 模块
//!
//! 页面过渡的选择与构建。
//!
//! ## 核心组件
//!
//! - [`TransitionStyle`]：过渡动画名称（`edge-slide` / `fade-scale` / `fade` / `hard-slide` / 自定义）
//! - [`TransitionOptions`]：单次过渡的参数，由渲染层填写
//! - [`BuilderRegistry`]：动画名 → 构建函数
//! - [`resolve_transition`]：选择动画名与方向并调用构建函数
//!
//! ## 使用流程
//!
//! ```text
//! Navigator.push()  → 写入 SelectionState
//! 渲染层            → 调用已注册的过渡钩子(TransitionOptions)
//!   → select_style() → BuilderRegistry.build() → AnimationPlan
//!   → 时间轴播放器播放 AnimationPlan.root
//! ```

pub mod builders;
mod registry;
mod selector;

pub use builders::{BuilderFn, defaults};
pub use registry::BuilderRegistry;
pub use selector::{SelectionState, resolve_default, resolve_transition, select_style};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationNode, EasingFunction};
use crate::element::ElementRef;

/// 过渡方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavDirection {
    /// 前进（新页面进入）
    Forward,
    /// 返回（当前页面被移除）
    Back,
}

/// 平台风格
///
/// 决定 `default` 动画最终落到哪个变体。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformMode {
    /// iOS 风格：默认边缘滑动
    Ios,
    /// Material 风格：默认上浮淡入
    #[default]
    Md,
}

/// 过渡动画名称
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransitionStyle {
    /// 使用控制器默认值，再退回平台默认值
    #[default]
    Default,
    /// 水平边缘滑动，带工具栏编排
    EdgeSlide,
    /// 垂直上浮淡入
    FadeScale,
    /// 纯透明度淡入淡出
    Fade,
    /// 两个页面整页水平滑动
    HardSlide,
    /// 通过注册表添加的自定义变体
    Custom(String),
}

impl TransitionStyle {
    /// 属性与配置中使用的名称
    pub fn as_str(&self) -> &str {
        match self {
            TransitionStyle::Default => "default",
            TransitionStyle::EdgeSlide => "edge-slide",
            TransitionStyle::FadeScale => "fade-scale",
            TransitionStyle::Fade => "fade",
            TransitionStyle::HardSlide => "hard-slide",
            TransitionStyle::Custom(name) => name,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, TransitionStyle::Default)
    }
}

impl From<&str> for TransitionStyle {
    /// 名称大小写不敏感；兼容旧名称 `push` / `modal` / `safepush`
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "default" => TransitionStyle::Default,
            "edge-slide" | "push" => TransitionStyle::EdgeSlide,
            "fade-scale" | "modal" => TransitionStyle::FadeScale,
            "fade" => TransitionStyle::Fade,
            "hard-slide" | "safepush" => TransitionStyle::HardSlide,
            _ => TransitionStyle::Custom(name.trim().to_string()),
        }
    }
}

impl From<String> for TransitionStyle {
    fn from(name: String) -> Self {
        TransitionStyle::from(name.as_str())
    }
}

impl From<TransitionStyle> for String {
    fn from(style: TransitionStyle) -> Self {
        style.as_str().to_string()
    }
}

impl FromStr for TransitionStyle {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TransitionStyle::from(s))
    }
}

impl fmt::Display for TransitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次过渡的参数
///
/// 由渲染层为每次过渡创建，过渡结束即丢弃。
#[derive(Debug, Clone)]
pub struct TransitionOptions {
    /// 过渡方向
    pub direction: NavDirection,
    /// 进入的元素
    pub entering: ElementRef,
    /// 离开的元素（栈中没有上一页时为 None）
    pub leaving: Option<ElementRef>,
    /// 渲染层的容器元素
    pub base: Option<ElementRef>,
    /// 调用方指定的时长（秒），None 或非正数表示使用构建函数默认值
    pub duration: Option<f32>,
    /// 调用方指定的缓动
    pub easing: Option<EasingFunction>,
    /// 平台风格
    pub mode: PlatformMode,
    /// 是否从右到左布局
    pub is_rtl: bool,
}

impl TransitionOptions {
    pub fn new(direction: NavDirection, entering: ElementRef) -> Self {
        Self {
            direction,
            entering,
            leaving: None,
            base: None,
            duration: None,
            easing: None,
            mode: PlatformMode::default(),
            is_rtl: false,
        }
    }

    pub fn with_leaving(mut self, leaving: ElementRef) -> Self {
        self.leaving = Some(leaving);
        self
    }

    pub fn with_base(mut self, base: ElementRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_mode(mut self, mode: PlatformMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_rtl(mut self, is_rtl: bool) -> Self {
        self.is_rtl = is_rtl;
        self
    }

    pub fn is_back(&self) -> bool {
        self.direction == NavDirection::Back
    }

    /// 获取时长，未指定（或非正数）时使用提供的默认值
    pub fn duration_or(&self, default: f32) -> f32 {
        self.duration.filter(|d| *d > 0.0).unwrap_or(default)
    }

    /// 获取缓动，未指定时使用提供的默认值
    pub fn easing_or(&self, default: EasingFunction) -> EasingFunction {
        self.easing.unwrap_or(default)
    }
}

/// 过渡钩子的产物：最终选中的动画名、方向和动画树
#[derive(Debug, Clone, Serialize)]
pub struct AnimationPlan {
    pub style: TransitionStyle,
    pub direction: NavDirection,
    pub root: AnimationNode,
}
