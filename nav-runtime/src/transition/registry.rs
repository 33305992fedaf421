//! # Builder Registry
//!
//! 动画名 → 构建函数。新增变体通过注册完成，不需要修改分派代码。

use std::collections::HashMap;

use crate::animation::AnimationNode;

use super::builders::{self, BuilderFn};
use super::{TransitionOptions, TransitionStyle};

/// 构建函数注册表
#[derive(Debug, Clone)]
pub struct BuilderRegistry {
    builders: HashMap<TransitionStyle, BuilderFn>,
}

impl BuilderRegistry {
    /// 空注册表
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// 注册四个内置构建函数
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(TransitionStyle::EdgeSlide, builders::edge_slide);
        registry.register(TransitionStyle::FadeScale, builders::fade_scale);
        registry.register(TransitionStyle::Fade, builders::fade);
        registry.register(TransitionStyle::HardSlide, builders::hard_slide);
        registry
    }

    /// 注册或覆盖一个构建函数
    ///
    /// `Default` 不是具体变体，注册时会被忽略。
    pub fn register(&mut self, style: impl Into<TransitionStyle>, builder: BuilderFn) {
        let style = style.into();
        if style.is_default() {
            tracing::warn!("default 不能注册构建函数，已忽略");
            return;
        }
        self.builders.insert(style, builder);
    }

    pub fn get(&self, style: &TransitionStyle) -> Option<BuilderFn> {
        self.builders.get(style).copied()
    }

    pub fn contains(&self, style: &TransitionStyle) -> bool {
        self.builders.contains_key(style)
    }

    /// 已注册的动画名（按名称排序）
    pub fn styles(&self) -> Vec<TransitionStyle> {
        let mut styles: Vec<_> = self.builders.keys().cloned().collect();
        styles.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        styles
    }

    /// 分派到对应的构建函数
    ///
    /// 未注册的动画名降级为 fade-scale。返回实际使用的动画名和动画树。
    pub fn build(&self, style: &TransitionStyle, opts: &TransitionOptions) -> (TransitionStyle, AnimationNode) {
        if let Some(builder) = self.get(style) {
            return (style.clone(), builder(opts));
        }

        tracing::warn!(name = %style, "未注册的过渡动画，降级为 fade-scale");
        let fallback = TransitionStyle::FadeScale;
        let builder = self.get(&fallback).unwrap_or(builders::fade_scale as BuilderFn);
        (fallback, builder(opts))
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationNode;
    use crate::element::{Element, ElementKind};
    use crate::transition::NavDirection;

    fn opts() -> TransitionOptions {
        TransitionOptions::new(NavDirection::Forward, Element::leaf(ElementKind::Content))
    }

    fn zoom(opts: &TransitionOptions) -> AnimationNode {
        AnimationNode::new("zoom").with_target(&opts.entering)
    }

    #[test]
    fn test_defaults_registered() {
        let registry = BuilderRegistry::default();
        for style in [
            TransitionStyle::EdgeSlide,
            TransitionStyle::FadeScale,
            TransitionStyle::Fade,
            TransitionStyle::HardSlide,
        ] {
            assert!(registry.contains(&style));
        }
        assert_eq!(registry.styles().len(), 4);
    }

    #[test]
    fn test_dispatch_by_style() {
        let registry = BuilderRegistry::with_defaults();
        let (style, tree) = registry.build(&TransitionStyle::HardSlide, &opts());
        assert_eq!(style, TransitionStyle::HardSlide);
        assert_eq!(tree.label(), "hard-slide");
    }

    #[test]
    fn test_register_custom_variant() {
        let mut registry = BuilderRegistry::with_defaults();
        registry.register("zoom", zoom);

        let (style, tree) = registry.build(&TransitionStyle::from("zoom"), &opts());
        assert_eq!(style, TransitionStyle::Custom("zoom".to_string()));
        assert_eq!(tree.label(), "zoom");
    }

    #[test]
    fn test_register_overrides_builtin() {
        let mut registry = BuilderRegistry::with_defaults();
        registry.register(TransitionStyle::Fade, zoom);
        let (_, tree) = registry.build(&TransitionStyle::Fade, &opts());
        assert_eq!(tree.label(), "zoom");
    }

    #[test]
    fn test_unknown_style_falls_back_to_fade_scale() {
        let registry = BuilderRegistry::with_defaults();
        let (style, tree) = registry.build(&TransitionStyle::from("spin"), &opts());
        assert_eq!(style, TransitionStyle::FadeScale);
        assert_eq!(tree.label(), "fade-scale");
    }

    #[test]
    fn test_empty_registry_still_falls_back() {
        let registry = BuilderRegistry::empty();
        let (style, tree) = registry.build(&TransitionStyle::EdgeSlide, &opts());
        assert_eq!(style, TransitionStyle::FadeScale);
        assert_eq!(tree.label(), "fade-scale");
    }

    #[test]
    fn test_default_cannot_be_registered() {
        let mut registry = BuilderRegistry::empty();
        registry.register(TransitionStyle::Default, zoom);
        assert!(!registry.contains(&TransitionStyle::Default));
    }
}
