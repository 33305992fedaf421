//! # Edge Slide
//!
//! 水平边缘滑动过渡。
//!
//! 进入页内容从尾侧边缘滑入（返回时从首侧）；工具栏的标题、按钮组、其他条目
//! 分别淡入并滑动；返回按钮文字单独滑入；前进时工具栏背景在内容之后淡入。
//! 离开页的同名区域播放相反的动画。从右到左布局时所有水平偏移取反。

use crate::animation::{AnimProperty, AnimValue, AnimationNode, EasingFunction, StyleProperty};
use crate::element::{ElementKind, ElementRef, classes};
use crate::transition::TransitionOptions;

use super::{defaults, header_and_footer_parts, header_toolbars};

const ZERO: AnimValue = AnimValue::Percent(0.0);

/// 由方向和布局决定的水平偏移
#[derive(Debug, Clone, Copy)]
struct Offsets {
    rtl: bool,
    off_trailing: AnimValue,
    off_leading: AnimValue,
}

impl Offsets {
    fn new(rtl: bool) -> Self {
        Self {
            rtl,
            off_trailing: AnimValue::Percent(defaults::OFF_TRAILING_PERCENT).mirror_if(rtl),
            off_leading: AnimValue::Percent(defaults::OFF_LEADING_PERCENT).mirror_if(rtl),
        }
    }

    /// 整页宽度移出（返回方向离开页）
    fn full_width(&self) -> AnimValue {
        AnimValue::Percent(100.0).mirror_if(self.rtl)
    }

    fn px(&self, value: f32) -> AnimValue {
        AnimValue::Px(value).mirror_if(self.rtl)
    }
}

/// 工具栏内可独立动画的区域
struct ToolbarParts {
    title: Option<ElementRef>,
    buttons: Vec<ElementRef>,
    items: Vec<ElementRef>,
    background: Option<ElementRef>,
    back_button: Option<ElementRef>,
}

impl ToolbarParts {
    fn of(toolbar: &ElementRef) -> Self {
        let title = toolbar.find_descendant(|e| *e.kind() == ElementKind::Title);
        let buttons =
            toolbar.find_descendants(|e| *e.kind() == ElementKind::Buttons || e.is_menu_toggle());
        let items = toolbar
            .children()
            .iter()
            .filter(|c| {
                !matches!(c.kind(), ElementKind::Title | ElementKind::Buttons) && !c.is_menu_toggle()
            })
            .cloned()
            .collect();
        let background = toolbar.find_in_shadow(&ElementKind::ToolbarBackground);
        let back_button = toolbar.find_descendant(|e| *e.kind() == ElementKind::BackButton);

        Self {
            title,
            buttons,
            items,
            background,
            back_button,
        }
    }

    fn back_button_text(&self) -> Option<ElementRef> {
        self.back_button
            .as_ref()
            .and_then(|b| b.find_in_shadow(&ElementKind::ButtonText))
    }
}

fn fade(node: AnimationNode, from: f32, to: f32) -> AnimationNode {
    node.from_to(AnimProperty::Opacity, AnimValue::Scalar(from), AnimValue::Scalar(to), true)
}

fn slide(node: AnimationNode, from: AnimValue, to: AnimValue) -> AnimationNode {
    node.from_to(AnimProperty::TranslateX, from, to, true)
}

/// 构建 edge-slide 动画树
pub fn edge_slide(opts: &TransitionOptions) -> AnimationNode {
    let offsets = Offsets::new(opts.is_rtl);
    let back = opts.is_back();
    let entering = &opts.entering;

    let mut root = AnimationNode::new("edge-slide")
        .with_target(entering)
        .with_duration(opts.duration_or(defaults::EDGE_SLIDE_DURATION))
        .with_easing(opts.easing_or(EasingFunction::DECELERATE))
        .before_remove_class(classes::PAGE_INVISIBLE);

    if let (Some(_), Some(base)) = (&opts.leaving, &opts.base) {
        root = root.with_child(AnimationNode::new("nav-decor").with_target(base));
    }

    root = root.with_child_if_targeted(entering_content(entering, back, &offsets));
    for toolbar in header_toolbars(entering) {
        root = root.with_child(entering_toolbar(&toolbar, back, &offsets));
    }

    if let Some(leaving) = &opts.leaving {
        root = root.with_child_if_targeted(leaving_content(leaving, back, &offsets));
        for toolbar in header_toolbars(leaving) {
            root = root.with_child(leaving_toolbar(&toolbar, back, &offsets));
        }
    }

    root
}

fn entering_content(entering: &ElementRef, back: bool, offsets: &Offsets) -> AnimationNode {
    let content = entering.child_of_kind(&ElementKind::Content);
    let parts = header_and_footer_parts(entering);
    let has_structure =
        content.is_some() || !parts.is_empty() || !header_toolbars(entering).is_empty();

    let node = AnimationNode::new("entering-content");
    let node = if has_structure {
        node.with_optional_target(content.as_ref()).with_targets(&parts)
    } else {
        // 没有可识别的结构，整体移动最外层页面容器
        tracing::debug!(entering = %entering.label(), "页面没有可识别的结构，整体滑动页面容器");
        let page = entering
            .children()
            .iter()
            .find(|c| c.is_page_like())
            .cloned()
            .unwrap_or_else(|| entering.clone());
        node.with_target(&page)
    };

    let node = node.before_clear_styles(&[StyleProperty::Opacity]);
    if back {
        fade(slide(node, offsets.off_leading, ZERO), 0.8, 1.0)
    } else {
        slide(node, offsets.off_trailing, ZERO)
    }
}

fn entering_toolbar(toolbar: &ElementRef, back: bool, offsets: &Offsets) -> AnimationNode {
    let parts = ToolbarParts::of(toolbar);

    let mut title = fade(
        AnimationNode::new("entering-title").with_optional_target(parts.title.as_ref()),
        0.01,
        1.0,
    );
    let buttons = fade(
        AnimationNode::new("entering-toolbar-buttons").with_targets(&parts.buttons),
        0.01,
        1.0,
    );
    let mut items = fade(
        AnimationNode::new("entering-toolbar-items").with_targets(&parts.items),
        0.01,
        1.0,
    );
    let mut background = AnimationNode::new("entering-toolbar-background")
        .with_optional_target(parts.background.as_ref());
    let back_button = fade(
        AnimationNode::new("entering-back-button").with_optional_target(parts.back_button.as_ref()),
        0.01,
        1.0,
    );

    if back {
        title = slide(title, offsets.off_leading, ZERO);
        items = slide(items, offsets.off_leading, ZERO);
    } else {
        title = slide(title, offsets.off_trailing, ZERO);
        items = slide(items, offsets.off_trailing, ZERO);
        background = fade(background.before_clear_styles(&[StyleProperty::Opacity]), 0.01, 1.0);
    }

    let mut node = AnimationNode::new("entering-toolbar")
        .with_target(toolbar)
        .with_child_if_targeted(title)
        .with_child_if_targeted(buttons)
        .with_child_if_targeted(items)
        .with_child_if_targeted(background)
        .with_child_if_targeted(back_button);

    if !back {
        let text = AnimationNode::new("entering-back-button-text")
            .with_optional_target(parts.back_button_text().as_ref());
        node = node.with_child_if_targeted(slide(
            text,
            offsets.px(defaults::BACK_TEXT_ENTER_PX),
            AnimValue::Px(0.0),
        ));
    }

    node
}

fn leaving_content(leaving: &ElementRef, back: bool, offsets: &Offsets) -> AnimationNode {
    let content = leaving.child_of_kind(&ElementKind::Content);
    let parts = header_and_footer_parts(leaving);

    let node = AnimationNode::new("leaving-content")
        .with_optional_target(content.as_ref())
        .with_targets(&parts);

    if back {
        slide(
            node.before_clear_styles(&[StyleProperty::Opacity]),
            ZERO,
            offsets.full_width(),
        )
    } else {
        fade(slide(node, ZERO, offsets.off_leading), 1.0, 0.8)
    }
}

fn leaving_toolbar(toolbar: &ElementRef, back: bool, offsets: &Offsets) -> AnimationNode {
    let parts = ToolbarParts::of(toolbar);

    let mut title = fade(
        AnimationNode::new("leaving-title").with_optional_target(parts.title.as_ref()),
        0.99,
        0.0,
    );
    let mut buttons = fade(
        AnimationNode::new("leaving-toolbar-buttons").with_targets(&parts.buttons),
        0.99,
        0.0,
    );
    let mut items = fade(
        AnimationNode::new("leaving-toolbar-items").with_targets(&parts.items),
        0.99,
        0.0,
    );
    let mut background = AnimationNode::new("leaving-toolbar-background")
        .with_optional_target(parts.background.as_ref());
    let mut back_button = fade(
        AnimationNode::new("leaving-back-button").with_optional_target(parts.back_button.as_ref()),
        0.99,
        0.0,
    );
    let mut back_text = None;

    if back {
        title = slide(title, ZERO, offsets.full_width());
        items = slide(items, ZERO, offsets.full_width());
        background = fade(background.before_clear_styles(&[StyleProperty::Opacity]), 1.0, 0.01);
        back_text = Some(slide(
            AnimationNode::new("leaving-back-button-text")
                .with_optional_target(parts.back_button_text().as_ref()),
            AnimValue::Px(0.0),
            offsets.px(defaults::BACK_TEXT_LEAVE_PX),
        ));
    } else {
        title = slide(title, ZERO, offsets.off_leading)
            .after_clear_styles(&[StyleProperty::Transform, StyleProperty::Opacity]);
        items = slide(items, ZERO, offsets.off_leading)
            .after_clear_styles(&[StyleProperty::Transform, StyleProperty::Opacity]);
        back_button = back_button.after_clear_styles(&[StyleProperty::Opacity]);
        buttons = buttons.after_clear_styles(&[StyleProperty::Opacity]);
    }

    let mut node = AnimationNode::new("leaving-toolbar")
        .with_target(toolbar)
        .with_child_if_targeted(title)
        .with_child_if_targeted(buttons)
        .with_child_if_targeted(items)
        .with_child_if_targeted(back_button)
        .with_child_if_targeted(background);
    if let Some(text) = back_text {
        node = node.with_child_if_targeted(text);
    }
    node
}
