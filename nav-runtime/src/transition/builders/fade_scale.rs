//! # Fade Scale
//!
//! 垂直上浮淡入。返回时进入页保持不动，只有离开页下沉并淡出。

use crate::animation::{AnimProperty, AnimValue, AnimationNode, EasingFunction};
use crate::element::{classes, page_container};
use crate::transition::TransitionOptions;

use super::defaults;

/// 构建 fade-scale 动画树
pub fn fade_scale(opts: &TransitionOptions) -> AnimationNode {
    let entering = page_container(&opts.entering);
    let offset = AnimValue::Px(defaults::FADE_SCALE_OFFSET_PX);

    let root = AnimationNode::new("fade-scale")
        .with_target(&entering)
        .before_remove_class(classes::PAGE_INVISIBLE);

    if opts.is_back() {
        let root = root
            .with_duration(opts.duration_or(defaults::FADE_SCALE_BACK_DURATION))
            .with_easing(opts.easing_or(EasingFunction::ACCELERATE));

        let Some(leaving) = &opts.leaving else {
            return root;
        };
        let leaving = page_container(leaving);
        root.with_child(
            AnimationNode::new("leaving-page")
                .with_target(&leaving)
                .from_to(AnimProperty::TranslateY, AnimValue::Px(0.0), offset, true)
                .from_to(AnimProperty::Opacity, AnimValue::Scalar(1.0), AnimValue::Scalar(0.0), true),
        )
    } else {
        root.with_duration(opts.duration_or(defaults::FADE_SCALE_FORWARD_DURATION))
            .with_easing(opts.easing_or(EasingFunction::DECELERATE))
            .from_to(AnimProperty::TranslateY, offset, AnimValue::Px(0.0), true)
            .from_to(AnimProperty::Opacity, AnimValue::Scalar(0.01), AnimValue::Scalar(1.0), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::NavDirection;
    use crate::transition::builders::test_support::{back, detail_page, forward};

    #[test]
    fn test_forward_rises_and_fades_in() {
        let entering = detail_page();
        let leaving = detail_page();
        let tree = fade_scale(&forward(&entering, &leaving));

        assert_eq!(tree.duration(), Some(0.28));
        assert_eq!(tree.easing(), Some(EasingFunction::DECELERATE));
        assert_eq!(tree.targets()[0].id(), entering.id());
        assert_eq!(tree.keyframes().len(), 2);
        assert_eq!(tree.keyframes()[0].from, AnimValue::Px(40.0));
        assert_eq!(tree.keyframes()[1].from, AnimValue::Scalar(0.01));

        // 前进时离开页不动
        let animated = tree.animated_elements();
        assert_eq!(animated.len(), 1);
        assert!(animated.contains(&entering.id()));
    }

    #[test]
    fn test_back_only_animates_leaving_page() {
        let entering = detail_page();
        let leaving = detail_page();
        let tree = fade_scale(&back(&entering, &leaving));

        assert_eq!(tree.duration(), Some(0.2));
        assert_eq!(tree.easing(), Some(EasingFunction::ACCELERATE));
        assert!(tree.keyframes().is_empty());

        let animated = tree.animated_elements();
        assert_eq!(animated.len(), 1);
        assert!(animated.contains(&leaving.id()));

        let node = tree.find("leaving-page").unwrap();
        assert_eq!(node.keyframes()[0].to, AnimValue::Px(40.0));
        assert_eq!(node.keyframes()[1].to, AnimValue::Scalar(0.0));
    }

    #[test]
    fn test_back_without_leaving_is_empty() {
        let entering = detail_page();
        let tree = fade_scale(&TransitionOptions::new(NavDirection::Back, entering));
        assert!(tree.children().is_empty());
        assert!(tree.animated_elements().is_empty());
    }

    #[test]
    fn test_removes_invisible_class_on_both_directions() {
        let entering = detail_page();
        let leaving = detail_page();
        for opts in [forward(&entering, &leaving), back(&entering, &leaving)] {
            let tree = fade_scale(&opts);
            assert_eq!(tree.before_remove_classes(), [classes::PAGE_INVISIBLE.to_string()]);
            assert!(tree.is_clean_on_finish());
        }
    }

    #[test]
    fn test_caller_overrides_timing() {
        let entering = detail_page();
        let leaving = detail_page();
        let tree = fade_scale(
            &back(&entering, &leaving)
                .with_duration(0.6)
                .with_easing(EasingFunction::EaseOut),
        );
        assert_eq!(tree.duration(), Some(0.6));
        assert_eq!(tree.easing(), Some(EasingFunction::EaseOut));
    }
}
