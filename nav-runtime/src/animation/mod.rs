//! # Animation 模块
//!
//! 可组合的动画树，描述一次页面过渡"要做什么"，不负责播放。
//!
//! ## 核心概念
//!
//! - [`AnimationNode`]：动画单元，绑定若干元素，声明时长、缓动、关键帧、
//!   播放前后的类名/样式变更，以及在父时间轴内播放的子节点
//! - [`Keyframe`]：单个属性从 `from` 到 `to` 的变化（`fromTo`）
//! - [`AnimValue`]：带单位的值（百分比 / 像素 / 纯数值）
//!
//! 子节点未设置时长或缓动时继承父节点。播放由宿主层的时间轴播放器完成。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let node = AnimationNode::new("entering-content")
//!     .with_target(&content)
//!     .from_to(AnimProperty::TranslateX, AnimValue::Percent(99.5), AnimValue::Percent(0.0), true);
//! let root = AnimationNode::new("root").with_duration(0.5).with_child(node);
//! ```

mod easing;

pub use easing::EasingFunction;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};

use crate::element::{ElementId, ElementRef};

/// 可动画属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimProperty {
    TranslateX,
    TranslateY,
    Opacity,
}

impl AnimProperty {
    /// 属性所属的样式分组
    pub fn style(&self) -> StyleProperty {
        match self {
            AnimProperty::TranslateX | AnimProperty::TranslateY => StyleProperty::Transform,
            AnimProperty::Opacity => StyleProperty::Opacity,
        }
    }
}

/// 内联样式分组（清除样式时使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleProperty {
    Transform,
    Opacity,
}

/// 带单位的动画值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum AnimValue {
    /// 相对自身尺寸的百分比
    Percent(f32),
    /// 像素
    Px(f32),
    /// 无单位数值（透明度）
    Scalar(f32),
}

impl AnimValue {
    /// 数值部分
    pub fn amount(&self) -> f32 {
        match self {
            AnimValue::Percent(v) | AnimValue::Px(v) | AnimValue::Scalar(v) => *v,
        }
    }

    /// 符号取反（从右到左布局的镜像）
    pub fn mirrored(self) -> Self {
        match self {
            AnimValue::Percent(v) => AnimValue::Percent(-v),
            AnimValue::Px(v) => AnimValue::Px(-v),
            AnimValue::Scalar(v) => AnimValue::Scalar(-v),
        }
    }

    /// `mirror` 为真时取反
    pub fn mirror_if(self, mirror: bool) -> Self {
        if mirror { self.mirrored() } else { self }
    }

    /// 同单位线性插值；单位不同时在终点处跳变
    pub fn lerp(&self, to: &AnimValue, progress: f32) -> AnimValue {
        match (self, to) {
            (AnimValue::Percent(a), AnimValue::Percent(b)) => AnimValue::Percent(a + (b - a) * progress),
            (AnimValue::Px(a), AnimValue::Px(b)) => AnimValue::Px(a + (b - a) * progress),
            (AnimValue::Scalar(a), AnimValue::Scalar(b)) => AnimValue::Scalar(a + (b - a) * progress),
            _ => {
                if progress >= 1.0 {
                    *to
                } else {
                    *self
                }
            }
        }
    }
}

/// 单个属性的关键帧过渡
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Keyframe {
    pub property: AnimProperty,
    pub from: AnimValue,
    pub to: AnimValue,
    /// 播放结束后是否清除该属性的内联样式
    pub clear_on_finish: bool,
}

fn serialize_targets<S: Serializer>(targets: &[ElementRef], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(targets.iter().map(|t| t.label()))
}

/// 动画节点
#[derive(Debug, Clone, Serialize)]
pub struct AnimationNode {
    label: &'static str,
    #[serde(serialize_with = "serialize_targets")]
    targets: Vec<ElementRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    easing: Option<EasingFunction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    keyframes: Vec<Keyframe>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    before_remove_classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    before_clear_styles: Vec<StyleProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    after_clear_styles: Vec<StyleProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<AnimationNode>,
}

impl AnimationNode {
    /// 创建空节点
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            targets: Vec::new(),
            duration: None,
            easing: None,
            keyframes: Vec::new(),
            before_remove_classes: Vec::new(),
            before_clear_styles: Vec::new(),
            after_clear_styles: Vec::new(),
            children: Vec::new(),
        }
    }

    // ========== 构建 ==========

    /// 绑定一个元素
    pub fn with_target(mut self, element: &ElementRef) -> Self {
        self.targets.push(element.clone());
        self
    }

    /// 绑定一个可能不存在的元素（不存在时忽略）
    pub fn with_optional_target(self, element: Option<&ElementRef>) -> Self {
        match element {
            Some(el) => self.with_target(el),
            None => self,
        }
    }

    /// 绑定多个元素
    pub fn with_targets<'a>(mut self, elements: impl IntoIterator<Item = &'a ElementRef>) -> Self {
        self.targets.extend(elements.into_iter().cloned());
        self
    }

    /// 设置时长（秒）
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds.max(0.0));
        self
    }

    /// 设置缓动函数
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }

    /// 添加关键帧过渡
    pub fn from_to(mut self, property: AnimProperty, from: AnimValue, to: AnimValue, clear_on_finish: bool) -> Self {
        self.keyframes.push(Keyframe {
            property,
            from,
            to,
            clear_on_finish,
        });
        self
    }

    /// 播放前移除的类名
    pub fn before_remove_class(mut self, class: &str) -> Self {
        self.before_remove_classes.push(class.to_string());
        self
    }

    /// 播放前清除的内联样式
    pub fn before_clear_styles(mut self, styles: &[StyleProperty]) -> Self {
        self.before_clear_styles.extend_from_slice(styles);
        self
    }

    /// 播放后清除的内联样式
    pub fn after_clear_styles(mut self, styles: &[StyleProperty]) -> Self {
        self.after_clear_styles.extend_from_slice(styles);
        self
    }

    /// 添加子节点
    pub fn with_child(mut self, child: AnimationNode) -> Self {
        self.children.push(child);
        self
    }

    /// 子节点绑定了元素时才添加
    ///
    /// 对应元素不存在时整段子动画被省略，而不是报错。
    pub fn with_child_if_targeted(self, child: AnimationNode) -> Self {
        if child.has_targets() {
            self.with_child(child)
        } else {
            self
        }
    }

    // ========== 访问 ==========

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn targets(&self) -> &[ElementRef] {
        &self.targets
    }

    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn duration(&self) -> Option<f32> {
        self.duration
    }

    pub fn easing(&self) -> Option<EasingFunction> {
        self.easing
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn before_remove_classes(&self) -> &[String] {
        &self.before_remove_classes
    }

    pub fn before_clear_style_list(&self) -> &[StyleProperty] {
        &self.before_clear_styles
    }

    pub fn after_clear_style_list(&self) -> &[StyleProperty] {
        &self.after_clear_styles
    }

    pub fn children(&self) -> &[AnimationNode] {
        &self.children
    }

    // ========== 遍历与检查 ==========

    /// 先序遍历整棵树
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a AnimationNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// 节点总数
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// 按标签查找第一个节点
    pub fn find(&self, label: &str) -> Option<&AnimationNode> {
        if self.label == label {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(label))
    }

    /// 按标签查找所有节点
    pub fn find_all(&self, label: &str) -> Vec<&AnimationNode> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if node.label == label {
                out.push(node);
            }
        });
        out
    }

    /// 树中实际有关键帧作用的元素
    pub fn animated_elements(&self) -> BTreeSet<ElementId> {
        let mut out = BTreeSet::new();
        self.walk(&mut |node| {
            if !node.keyframes.is_empty() {
                out.extend(node.targets.iter().map(|t| t.id()));
            }
        });
        out
    }

    /// 所有某属性的关键帧，附带所在节点的标签
    pub fn keyframes_for(&self, property: AnimProperty) -> Vec<(&'static str, Keyframe)> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            out.extend(
                node.keyframes
                    .iter()
                    .filter(|k| k.property == property)
                    .map(|k| (node.label, *k)),
            );
        });
        out
    }

    /// 播放结束后是否不留下任何内联样式
    ///
    /// 每个关键帧要么自身标记清除，要么其样式分组出现在同节点的播放后清除列表中。
    pub fn is_clean_on_finish(&self) -> bool {
        let mut clean = true;
        self.walk(&mut |node| {
            for k in &node.keyframes {
                if !k.clear_on_finish && !node.after_clear_styles.contains(&k.property.style()) {
                    clean = false;
                }
            }
        });
        clean
    }
}
