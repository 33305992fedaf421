//! # Transition Selector
//!
//! 为一次过渡选出动画名，并把选择结果记录到元素属性上。
//!
//! ## 属性读写约定
//!
//! | 方向 | 读取 | 写入 |
//! |------|------|------|
//! | 前进 | `SelectionState.requested` | 进入页 `animation-enter`，离开页 `animation-leave` |
//! | 返回 | 离开页 `animation-enter`，其次进入页 `animation-leave` | 离开页 `animation-leave` |
//!
//! 返回时不改写进入页的 `animation-enter`：它记录的是该页当初如何到达，
//! 之后它自己被移除时还要读取。

use serde::{Deserialize, Serialize};

use crate::element::{ElementRef, attrs};

use super::{AnimationPlan, BuilderRegistry, PlatformMode, TransitionOptions, TransitionStyle};

/// 动画选择状态
///
/// 每个导航控制器持有一份，与过渡钩子共享。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    /// 下一次前进过渡请求的动画名
    pub requested: TransitionStyle,
    /// 请求为 `default` 时使用的控制器默认值
    pub default: TransitionStyle,
    /// 下一次前进过渡是否开启新流程（只消费一次）
    pub start_new_flow: bool,
}

impl SelectionState {
    pub fn new(default: TransitionStyle) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }
}

/// 把 `default` 解析为具体变体
///
/// 先使用控制器默认值；仍是 `default` 时按平台选择：iOS 为 edge-slide，其余为 fade-scale。
pub fn resolve_default(
    style: TransitionStyle,
    default: &TransitionStyle,
    mode: PlatformMode,
) -> TransitionStyle {
    let style = if style.is_default() { default.clone() } else { style };
    if !style.is_default() {
        return style;
    }
    match mode {
        PlatformMode::Ios => TransitionStyle::EdgeSlide,
        PlatformMode::Md => TransitionStyle::FadeScale,
    }
}

fn recorded_style(element: &ElementRef, attr: &str) -> Option<TransitionStyle> {
    element
        .attribute(attr)
        .map(TransitionStyle::from)
        .filter(|s| !s.is_default())
}

/// 选出本次过渡的动画名并写入元素属性
///
/// 返回值已经解析掉 `default`，写入属性的也是解析后的名称，
/// 之后的返回过渡不受控制器默认值变化的影响。
pub fn select_style(state: &mut SelectionState, opts: &TransitionOptions) -> TransitionStyle {
    if opts.is_back() {
        let recorded = opts
            .leaving
            .as_ref()
            .and_then(|l| recorded_style(l, attrs::ANIMATION_ENTER))
            .or_else(|| recorded_style(&opts.entering, attrs::ANIMATION_LEAVE))
            .unwrap_or_default();
        let style = resolve_default(recorded, &state.default, opts.mode);

        if let Some(leaving) = &opts.leaving {
            leaving.set_attribute(attrs::ANIMATION_LEAVE, style.as_str());
        }
        tracing::debug!(style = %style, "返回过渡镜像进入时的动画");
        return style;
    }

    if state.start_new_flow {
        opts.entering.set_attribute(attrs::NEW_NAV_FLOW, "true");
        state.start_new_flow = false;
    }

    let style = resolve_default(state.requested.clone(), &state.default, opts.mode);
    opts.entering.set_attribute(attrs::ANIMATION_ENTER, style.as_str());
    if let Some(leaving) = &opts.leaving {
        leaving.set_attribute(attrs::ANIMATION_LEAVE, style.as_str());
    }
    style
}

/// 过渡钩子的完整流程：选择动画名，再分派到构建函数
pub fn resolve_transition(
    state: &mut SelectionState,
    registry: &BuilderRegistry,
    opts: &TransitionOptions,
) -> AnimationPlan {
    let selected = select_style(state, opts);
    let (style, root) = registry.build(&selected, opts);
    AnimationPlan {
        style,
        direction: opts.direction,
        root,
    }
}
