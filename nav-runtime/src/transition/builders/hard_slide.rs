//! # Hard Slide
//!
//! 两个页面同时整页水平滑动，没有工具栏编排。

use crate::animation::{AnimProperty, AnimValue, AnimationNode, EasingFunction};
use crate::element::{classes, page_container};
use crate::transition::TransitionOptions;

use super::defaults;

/// 构建 hard-slide 动画树
pub fn hard_slide(opts: &TransitionOptions) -> AnimationNode {
    let entering = page_container(&opts.entering);
    let (leave_to, enter_from) = if opts.is_back() {
        (100.0, -100.0)
    } else {
        (-100.0, 100.0)
    };
    let leave_to = AnimValue::Percent(leave_to).mirror_if(opts.is_rtl);
    let enter_from = AnimValue::Percent(enter_from).mirror_if(opts.is_rtl);

    let mut root = AnimationNode::new("hard-slide")
        .with_target(&entering)
        .with_duration(opts.duration_or(defaults::HARD_SLIDE_DURATION))
        .with_easing(opts.easing_or(EasingFunction::DECELERATE))
        .before_remove_class(classes::PAGE_INVISIBLE);

    if let Some(leaving) = &opts.leaving {
        root = root.with_child(
            AnimationNode::new("leaving-page")
                .with_target(&page_container(leaving))
                .from_to(AnimProperty::TranslateX, AnimValue::Percent(0.0), leave_to, true),
        );
    }

    root.with_child(
        AnimationNode::new("entering-page")
            .with_target(&entering)
            .from_to(AnimProperty::TranslateX, enter_from, AnimValue::Percent(0.0), true),
    )
}
