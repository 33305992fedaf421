//! # Fade
//!
//! 纯透明度过渡。与 fade-scale 结构相同，但没有位移。

use crate::animation::{AnimProperty, AnimValue, AnimationNode, EasingFunction};
use crate::element::{classes, page_container};
use crate::transition::TransitionOptions;

use super::defaults;

/// 构建 fade 动画树
pub fn fade(opts: &TransitionOptions) -> AnimationNode {
    let entering = page_container(&opts.entering);

    let root = AnimationNode::new("fade")
        .with_target(&entering)
        .before_remove_class(classes::PAGE_INVISIBLE);

    if !opts.is_back() {
        return root
            .with_duration(opts.duration_or(defaults::FADE_FORWARD_DURATION))
            .with_easing(opts.easing_or(EasingFunction::DECELERATE))
            .from_to(AnimProperty::Opacity, AnimValue::Scalar(0.01), AnimValue::Scalar(1.0), true);
    }

    let root = root
        .with_duration(opts.duration_or(defaults::FADE_BACK_DURATION))
        .with_easing(opts.easing_or(EasingFunction::ACCELERATE));
    match &opts.leaving {
        Some(leaving) => root.with_child(
            AnimationNode::new("leaving-page")
                .with_target(&page_container(leaving))
                .from_to(AnimProperty::Opacity, AnimValue::Scalar(1.0), AnimValue::Scalar(0.0), true),
        ),
        None => root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind};
    use crate::transition::NavDirection;
    use crate::transition::builders::test_support::{back, detail_page, forward};

    #[test]
    fn test_forward_fades_in_entering() {
        let entering = detail_page();
        let leaving = detail_page();
        let tree = fade(&forward(&entering, &leaving));

        assert_eq!(tree.duration(), Some(0.4));
        assert_eq!(tree.keyframes_for(AnimProperty::TranslateX).len(), 0);
        assert_eq!(tree.keyframes_for(AnimProperty::TranslateY).len(), 0);
        assert_eq!(tree.keyframes_for(AnimProperty::Opacity).len(), 1);
        assert!(tree.animated_elements().contains(&entering.id()));
        assert!(!tree.animated_elements().contains(&leaving.id()));
    }

    #[test]
    fn test_back_only_animates_leaving_page() {
        let entering = detail_page();
        let leaving = detail_page();
        let tree = fade(&back(&entering, &leaving));

        assert_eq!(tree.duration(), Some(0.3));
        assert_eq!(tree.easing(), Some(EasingFunction::ACCELERATE));
        let animated = tree.animated_elements();
        assert_eq!(animated.len(), 1);
        assert!(animated.contains(&leaving.id()));
        assert!(tree.is_clean_on_finish());
    }

    #[test]
    fn test_wrapped_page_resolves_container() {
        let inner = Element::leaf(ElementKind::Tabs);
        let host = Element::builder(ElementKind::Generic("app-tabs".to_string()))
            .child(inner.clone())
            .build();
        let tree = fade(&TransitionOptions::new(NavDirection::Forward, host));
        assert_eq!(tree.targets()[0].id(), inner.id());
    }
}
