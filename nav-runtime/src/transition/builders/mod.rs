//! # Builders 模块
//!
//! 四种页面过渡动画的构建函数。
//!
//! 每个构建函数都是纯函数 `(&TransitionOptions) -> AnimationNode`：
//!
//! | 名称 | 函数 | 说明 |
//! |------|------|------|
//! | `edge-slide` | [`edge_slide`] | 水平边缘滑动，内容区与工具栏各部分分别编排 |
//! | `fade-scale` | [`fade_scale`] | 前进时上浮淡入；返回时只有离开页下沉淡出 |
//! | `fade` | [`fade`] | 前进时淡入；返回时只有离开页淡出 |
//! | `hard-slide` | [`hard_slide`] | 两个页面同时整页水平滑动 |
//!
//! ## 共同约定
//!
//! - 根节点覆盖整个过渡时长
//! - 对应元素不存在时省略该段子动画，不报错
//! - 所有关键帧播放后清除内联样式，不在元素上留下残余的位移或透明度

mod edge_slide;
mod fade;
mod fade_scale;
mod hard_slide;

pub use edge_slide::edge_slide;
pub use fade::fade;
pub use fade_scale::fade_scale;
pub use hard_slide::hard_slide;

use crate::animation::AnimationNode;
use crate::element::{ElementKind, ElementRef};

use super::TransitionOptions;

/// 构建函数签名
pub type BuilderFn = fn(&TransitionOptions) -> AnimationNode;

/// 各构建函数的默认参数
///
/// 时长单位为秒。任何需要默认时长的地方都应使用这些常量。
pub mod defaults {
    /// edge-slide 时长
    pub const EDGE_SLIDE_DURATION: f32 = 0.5;
    /// fade-scale 前进时长
    pub const FADE_SCALE_FORWARD_DURATION: f32 = 0.28;
    /// fade-scale 返回时长
    pub const FADE_SCALE_BACK_DURATION: f32 = 0.2;
    /// fade 前进时长
    pub const FADE_FORWARD_DURATION: f32 = 0.4;
    /// fade 返回时长
    pub const FADE_BACK_DURATION: f32 = 0.3;
    /// hard-slide 时长
    pub const HARD_SLIDE_DURATION: f32 = 0.5;

    /// edge-slide 进入页从尾侧边缘滑入的起点（百分比）
    pub const OFF_TRAILING_PERCENT: f32 = 99.5;
    /// edge-slide 被覆盖页向首侧退让的距离（百分比）
    pub const OFF_LEADING_PERCENT: f32 = -33.0;
    /// edge-slide 返回按钮文字滑入距离（像素）
    pub const BACK_TEXT_ENTER_PX: f32 = 100.0;
    /// edge-slide 返回按钮文字滑出距离（像素）
    pub const BACK_TEXT_LEAVE_PX: f32 = 124.0;
    /// fade-scale 垂直位移（像素）
    pub const FADE_SCALE_OFFSET_PX: f32 = 40.0;
}

/// 页眉中工具栏以外的元素，加上页脚中的所有元素
fn header_and_footer_parts(page: &ElementRef) -> Vec<ElementRef> {
    let mut parts = Vec::new();
    for header in page.children_of_kind(&ElementKind::Header) {
        parts.extend(
            header
                .children()
                .iter()
                .filter(|c| *c.kind() != ElementKind::Toolbar)
                .cloned(),
        );
    }
    for footer in page.children_of_kind(&ElementKind::Footer) {
        parts.extend(footer.children().iter().cloned());
    }
    parts
}

/// 页眉中的所有工具栏
fn header_toolbars(page: &ElementRef) -> Vec<ElementRef> {
    page.children_of_kind(&ElementKind::Header)
        .iter()
        .flat_map(|header| header.children_of_kind(&ElementKind::Toolbar))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::element::{ElementRef, PageTemplate};
    use crate::transition::{NavDirection, TransitionOptions};

    pub fn detail_page() -> ElementRef {
        PageTemplate::detail("Detail")
            .with_buttons()
            .with_toolbar_item("segment")
            .with_header_extra("searchbar")
            .with_footer()
            .build()
    }

    pub fn forward(entering: &ElementRef, leaving: &ElementRef) -> TransitionOptions {
        TransitionOptions::new(NavDirection::Forward, entering.clone()).with_leaving(leaving.clone())
    }

    pub fn back(entering: &ElementRef, leaving: &ElementRef) -> TransitionOptions {
        TransitionOptions::new(NavDirection::Back, entering.clone()).with_leaving(leaving.clone())
    }
}
