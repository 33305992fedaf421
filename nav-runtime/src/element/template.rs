//! # Page Template
//!
//! 声明式描述一个标准页面，并构建对应的元素树。

use serde::{Deserialize, Serialize};

use super::{Element, ElementKind, ElementRef, attrs, classes};

/// 页面模板
///
/// 路由表、场景文件和测试都用它生成页面元素树。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTemplate {
    /// 页面宿主组件的标签名
    #[serde(default = "default_tag")]
    pub tag: String,
    /// 工具栏标题（None 表示没有标题）
    #[serde(default)]
    pub title: Option<String>,
    /// 工具栏是否带返回按钮
    #[serde(default)]
    pub back_button: bool,
    /// 工具栏是否带按钮组
    #[serde(default)]
    pub buttons: bool,
    /// 工具栏是否带菜单开关
    #[serde(default)]
    pub menu_toggle: bool,
    /// 工具栏中的其他条目（标签名）
    #[serde(default)]
    pub toolbar_items: Vec<String>,
    /// 页眉中工具栏以外的元素（标签名）
    #[serde(default)]
    pub header_extras: Vec<String>,
    /// 是否有内容区
    #[serde(default = "default_true")]
    pub content: bool,
    /// 是否有页脚
    #[serde(default)]
    pub footer: bool,
}

fn default_tag() -> String {
    "page".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            title: None,
            back_button: false,
            buttons: false,
            menu_toggle: false,
            toolbar_items: Vec::new(),
            header_extras: Vec::new(),
            content: true,
            footer: false,
        }
    }
}

impl PageTemplate {
    /// 只有内容区的页面
    pub fn content_only() -> Self {
        Self::default()
    }

    /// 带标题工具栏的页面
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// 带标题和返回按钮的详情页
    pub fn detail(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            back_button: true,
            ..Self::default()
        }
    }

    /// 没有内容区、页眉、页脚的空页面
    pub fn bare() -> Self {
        Self {
            content: false,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_buttons(mut self) -> Self {
        self.buttons = true;
        self
    }

    pub fn with_menu_toggle(mut self) -> Self {
        self.menu_toggle = true;
        self
    }

    pub fn with_toolbar_item(mut self, tag: impl Into<String>) -> Self {
        self.toolbar_items.push(tag.into());
        self
    }

    pub fn with_header_extra(mut self, tag: impl Into<String>) -> Self {
        self.header_extras.push(tag.into());
        self
    }

    pub fn with_footer(mut self) -> Self {
        self.footer = true;
        self
    }

    fn has_toolbar(&self) -> bool {
        self.title.is_some()
            || self.back_button
            || self.buttons
            || self.menu_toggle
            || !self.toolbar_items.is_empty()
    }

    /// 构建页面元素树
    pub fn build(&self) -> ElementRef {
        let mut page = Element::builder(ElementKind::Generic(self.tag.clone())).class(classes::PAGE);

        if self.has_toolbar() || !self.header_extras.is_empty() {
            let mut header = Element::builder(ElementKind::Header);
            if self.has_toolbar() {
                header = header.child(self.build_toolbar());
            }
            for extra in &self.header_extras {
                header = header.child(Element::leaf(ElementKind::Generic(extra.clone())));
            }
            page = page.child(header.build());
        }

        if self.content {
            page = page.child(Element::leaf(ElementKind::Content));
        }

        if self.footer {
            let footer = Element::builder(ElementKind::Footer)
                .child(Element::leaf(ElementKind::Toolbar))
                .build();
            page = page.child(footer);
        }

        page.build()
    }

    fn build_toolbar(&self) -> ElementRef {
        let mut toolbar = Element::builder(ElementKind::Toolbar)
            .shadow_child(Element::leaf(ElementKind::ToolbarBackground));

        if self.back_button {
            let back = Element::builder(ElementKind::BackButton)
                .shadow_child(Element::leaf(ElementKind::ButtonText))
                .build();
            // 返回按钮放在按钮组里，与常见布局一致
            let group = Element::builder(ElementKind::Buttons).child(back).build();
            toolbar = toolbar.child(group);
        }
        if self.buttons {
            toolbar = toolbar.child(Element::leaf(ElementKind::Buttons));
        }
        if self.menu_toggle {
            toolbar = toolbar.child(
                Element::builder(ElementKind::Generic("menu-button".to_string()))
                    .attribute(attrs::MENU_TOGGLE, "true")
                    .build(),
            );
        }
        if let Some(title) = &self.title {
            toolbar = toolbar.child(
                Element::builder(ElementKind::Title)
                    .attribute("text", title.clone())
                    .build(),
            );
        }
        for item in &self.toolbar_items {
            toolbar = toolbar.child(Element::leaf(ElementKind::Generic(item.clone())));
        }

        toolbar.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_page_structure() {
        let page = PageTemplate::detail("Settings").build();
        assert!(page.has_class(classes::PAGE));

        let header = page.child_of_kind(&ElementKind::Header).unwrap();
        let toolbar = header.child_of_kind(&ElementKind::Toolbar).unwrap();
        assert!(toolbar.child_of_kind(&ElementKind::Title).is_some());
        assert!(
            toolbar
                .find_descendant(|e| *e.kind() == ElementKind::BackButton)
                .is_some()
        );
        assert!(toolbar.find_in_shadow(&ElementKind::ToolbarBackground).is_some());
        assert!(page.child_of_kind(&ElementKind::Content).is_some());
    }

    #[test]
    fn test_content_only_page_has_no_header() {
        let page = PageTemplate::content_only().build();
        assert!(page.child_of_kind(&ElementKind::Header).is_none());
        assert!(page.child_of_kind(&ElementKind::Content).is_some());
    }

    #[test]
    fn test_bare_page_has_no_children() {
        let page = PageTemplate::bare().build();
        assert!(page.children().is_empty());
    }

    #[test]
    fn test_template_deserialize_defaults() {
        let t: PageTemplate = serde_json::from_str(r#"{ "title": "Home" }"#).unwrap();
        assert_eq!(t.tag, "page");
        assert_eq!(t.title.as_deref(), Some("Home"));
        assert!(t.content);
        assert!(!t.footer);
    }
}
