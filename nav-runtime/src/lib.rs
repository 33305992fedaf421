//! # Nav Runtime
//!
//! 页面导航栈控制器与方向性过渡动画引擎。
//!
//! ## 架构概述
//!
//! `nav-runtime` 是纯逻辑核心，不依赖任何 IO 或播放器。
//! 它通过 [`RenderLayer`] 与渲染层通信：
//!
//! ```text
//! 调用方                Navigator                    RenderLayer
//!   │ push/pop ─────────►│                              │
//!   │                    │── NavRequest ───────────────►│ 修改视图栈
//!   │                    │◄── hook(TransitionOptions) ──│
//!   │                    │── AnimationPlan ────────────►│ 播放动画树
//! ```
//!
//! ## 核心类型
//!
//! - [`Navigator`]：导航栈控制器
//! - [`ViewStack`]：视图栈（由渲染层持有）
//! - [`AnimationNode`]：可组合的动画树
//! - [`BuilderRegistry`]：动画名 → 构建函数
//! - [`Element`]：视图背后的可视元素
//!
//! ## 使用示例
//!
//! ```ignore
//! use nav_runtime::{Navigator, PushOptions, TransitionStyle};
//!
//! let mut nav = Navigator::new(outlet);
//! nav.push("/detail", PushOptions::new().with_animation(TransitionStyle::EdgeSlide))?;
//! nav.pop(None, None)?;           // 镜像 edge-slide 返回
//! nav.close_current_nav_flow(None)?;
//! ```
//!
//! ## 模块结构
//!
//! - [`element`]：元素树与页面模板
//! - [`animation`]：动画树与缓动函数
//! - [`transition`]：四种构建函数、注册表、动画选择
//! - [`view`]：视图与视图栈
//! - [`navigator`]：控制器与渲染层接口
//! - [`error`]：错误类型定义

pub mod animation;
pub mod element;
pub mod error;
pub mod navigator;
pub mod transition;
pub mod view;

// 重导出核心类型
pub use animation::{AnimProperty, AnimValue, AnimationNode, EasingFunction, Keyframe, StyleProperty};
pub use element::{Element, ElementId, ElementKind, ElementRef, PageTemplate, attrs, classes, page_container};
pub use error::{NavError, NavResult};
pub use navigator::{NavAnimationHook, NavIntent, NavRequest, Navigator, PushOptions, RenderLayer};
pub use transition::{
    AnimationPlan, BuilderFn, BuilderRegistry, NavDirection, PlatformMode, SelectionState, TransitionOptions,
    TransitionStyle,
};
pub use view::{View, ViewStack};
