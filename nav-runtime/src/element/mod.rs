//! # Element 模块
//!
//! 视图背后的可视元素树模型。
//!
//! ## 设计说明
//!
//! - 元素树由渲染层创建，核心只通过结构查询读取它
//! - 类名、属性、内联样式使用内部可变性，元素以 `Rc` 共享（单线程）
//! - 属性是跨过渡的唯一"记忆"：`animation-enter` / `animation-leave` / `new-nav-flow`
//!
//! ## 结构约定
//!
//! ```text
//! Page（带 nav-page 类）
//!   ├── Header
//!   │     └── Toolbar ── Title / Buttons / BackButton / 其他条目
//!   │           └── (shadow) ToolbarBackground
//!   ├── Content
//!   └── Footer
//! ```

mod template;

pub use template::PageTemplate;

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::animation::{AnimProperty, AnimValue, StyleProperty};

/// 元素属性名
pub mod attrs {
    /// 视图进入时使用的动画名
    pub const ANIMATION_ENTER: &str = "animation-enter";
    /// 视图离开时使用的动画名（供之后的返回过渡镜像）
    pub const ANIMATION_LEAVE: &str = "animation-leave";
    /// 标记一个逻辑流程的第一个视图
    pub const NEW_NAV_FLOW: &str = "new-nav-flow";
    /// 菜单开关按钮
    pub const MENU_TOGGLE: &str = "menu-toggle";
}

/// 元素类名
pub mod classes {
    /// 页面容器
    pub const PAGE: &str = "nav-page";
    /// 过渡开始前页面保持不可见
    pub const PAGE_INVISIBLE: &str = "nav-page-invisible";
    /// 过渡结束后离开的页面被隐藏
    pub const PAGE_HIDDEN: &str = "nav-page-hidden";
}

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// 元素 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 元素类型
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 嵌套导航容器
    Nav,
    /// 标签页容器
    Tabs,
    /// 内容区
    Content,
    /// 页眉
    Header,
    /// 页脚
    Footer,
    /// 工具栏
    Toolbar,
    /// 工具栏标题
    Title,
    /// 工具栏按钮组
    Buttons,
    /// 返回按钮
    BackButton,
    /// 工具栏背景（位于工具栏的 shadow 树中）
    ToolbarBackground,
    /// 按钮文字（位于返回按钮的 shadow 树中）
    ButtonText,
    /// 其他任意元素（页面宿主组件、搜索栏等）
    Generic(String),
}

impl ElementKind {
    /// 元素标签名
    pub fn tag(&self) -> &str {
        match self {
            ElementKind::Nav => "nav",
            ElementKind::Tabs => "tabs",
            ElementKind::Content => "content",
            ElementKind::Header => "header",
            ElementKind::Footer => "footer",
            ElementKind::Toolbar => "toolbar",
            ElementKind::Title => "title",
            ElementKind::Buttons => "buttons",
            ElementKind::BackButton => "back-button",
            ElementKind::ToolbarBackground => "toolbar-background",
            ElementKind::ButtonText => "button-text",
            ElementKind::Generic(tag) => tag,
        }
    }
}

/// 共享的元素引用
pub type ElementRef = Rc<Element>;

/// 可视元素
///
/// 子元素在构建后不可变；类名、属性和内联样式可在过渡期间修改。
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    classes: RefCell<BTreeSet<String>>,
    attributes: RefCell<BTreeMap<String, String>>,
    styles: RefCell<BTreeMap<AnimProperty, AnimValue>>,
    children: Vec<ElementRef>,
    shadow: Vec<ElementRef>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("classes", &self.classes.borrow())
            .field("attributes", &self.attributes.borrow())
            .field("children", &self.children.len())
            .finish()
    }
}

impl Element {
    /// 开始构建一个元素
    pub fn builder(kind: ElementKind) -> ElementBuilder {
        ElementBuilder {
            kind,
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            shadow: Vec::new(),
        }
    }

    /// 构建一个没有子元素的元素
    pub fn leaf(kind: ElementKind) -> ElementRef {
        Self::builder(kind).build()
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// 调试标签，如 `toolbar#12`
    pub fn label(&self) -> String {
        format!("{}{}", self.kind.tag(), self.id)
    }

    pub fn children(&self) -> &[ElementRef] {
        &self.children
    }

    pub fn shadow_children(&self) -> &[ElementRef] {
        &self.shadow
    }

    // ========== 类名 ==========

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    pub fn add_class(&self, class: &str) {
        self.classes.borrow_mut().insert(class.to_string());
    }

    pub fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().remove(class);
    }

    // ========== 属性 ==========

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.borrow().contains_key(name)
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.attributes.borrow_mut().remove(name);
    }

    // ========== 内联样式 ==========

    /// 读取内联样式值
    pub fn style(&self, property: AnimProperty) -> Option<AnimValue> {
        self.styles.borrow().get(&property).copied()
    }

    pub fn set_style(&self, property: AnimProperty, value: AnimValue) {
        self.styles.borrow_mut().insert(property, value);
    }

    /// 清除一个样式分组（`Transform` 同时清除所有位移）
    pub fn clear_style(&self, style: StyleProperty) {
        self.styles
            .borrow_mut()
            .retain(|property, _| property.style() != style);
    }

    /// 是否没有任何内联样式
    pub fn is_style_free(&self) -> bool {
        self.styles.borrow().is_empty()
    }

    // ========== 结构查询 ==========

    /// 第一个指定类型的直接子元素
    pub fn child_of_kind(&self, kind: &ElementKind) -> Option<ElementRef> {
        self.children.iter().find(|c| c.kind == *kind).cloned()
    }

    /// 所有指定类型的直接子元素
    pub fn children_of_kind(&self, kind: &ElementKind) -> Vec<ElementRef> {
        self.children
            .iter()
            .filter(|c| c.kind == *kind)
            .cloned()
            .collect()
    }

    /// 深度优先查找第一个满足条件的后代（不含自身，不进入 shadow 树）
    pub fn find_descendant(&self, pred: impl Fn(&Element) -> bool + Copy) -> Option<ElementRef> {
        for child in &self.children {
            if pred(child) {
                return Some(child.clone());
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    /// 深度优先收集所有满足条件的后代（文档顺序）
    pub fn find_descendants(&self, pred: impl Fn(&Element) -> bool + Copy) -> Vec<ElementRef> {
        let mut out = Vec::new();
        self.collect_descendants(pred, &mut out);
        out
    }

    fn collect_descendants(&self, pred: impl Fn(&Element) -> bool + Copy, out: &mut Vec<ElementRef>) {
        for child in &self.children {
            if pred(child) {
                out.push(child.clone());
            }
            child.collect_descendants(pred, out);
        }
    }

    /// 先在 shadow 树中查找，没有 shadow 树时退回到普通子树
    pub fn find_in_shadow(&self, kind: &ElementKind) -> Option<ElementRef> {
        if self.shadow.is_empty() {
            return self.find_descendant(|e| e.kind == *kind);
        }
        for root in &self.shadow {
            if root.kind == *kind {
                return Some(root.clone());
            }
            if let Some(found) = root.find_descendant(|e| e.kind == *kind) {
                return Some(found);
            }
        }
        None
    }

    /// 是否是页面级容器（页面类、嵌套导航或标签页）
    pub fn is_page_like(&self) -> bool {
        self.has_class(classes::PAGE) || matches!(self.kind, ElementKind::Nav | ElementKind::Tabs)
    }

    /// 按名称判断是否是菜单开关
    pub fn is_menu_toggle(&self) -> bool {
        self.has_attribute(attrs::MENU_TOGGLE)
    }
}

/// 解析页面容器
///
/// 自身带页面类时返回自身；否则返回第一个页面级直接子元素；都没有时返回自身。
pub fn page_container(element: &ElementRef) -> ElementRef {
    if element.has_class(classes::PAGE) {
        return element.clone();
    }
    element
        .children
        .iter()
        .find(|c| c.is_page_like())
        .cloned()
        .unwrap_or_else(|| element.clone())
}

/// 元素构建器
#[derive(Debug)]
pub struct ElementBuilder {
    kind: ElementKind,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    children: Vec<ElementRef>,
    shadow: Vec<ElementRef>,
}

impl ElementBuilder {
    pub fn class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn child(mut self, child: ElementRef) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementRef>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn shadow_child(mut self, child: ElementRef) -> Self {
        self.shadow.push(child);
        self
    }

    pub fn build(self) -> ElementRef {
        Rc::new(Element {
            id: ElementId::next(),
            kind: self.kind,
            classes: RefCell::new(self.classes),
            attributes: RefCell::new(self.attributes),
            styles: RefCell::new(BTreeMap::new()),
            children: self.children,
            shadow: self.shadow,
        })
    }
}
