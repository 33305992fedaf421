//! # View 模块
//!
//! 视图与视图栈。
//!
//! 视图栈由渲染层持有和修改，导航控制器只通过这里的只读访问器查询它。
//! 下标 0 为根视图，插入顺序即导航顺序。

use serde_json::Value;

use crate::element::{ElementRef, attrs};

/// 一个可导航的位置
#[derive(Debug, Clone)]
pub struct View {
    /// 位置标识
    pub url: String,
    /// 导航时携带的参数（对核心不透明）
    pub params: Option<Value>,
    /// 背后的可视元素
    pub element: ElementRef,
}

impl View {
    pub fn new(url: impl Into<String>, element: ElementRef) -> Self {
        Self {
            url: url.into(),
            params: None,
            element,
        }
    }

    pub fn with_params(mut self, params: Option<Value>) -> Self {
        self.params = params;
        self
    }

    /// 是否是一个流程的第一个视图
    pub fn is_flow_start(&self) -> bool {
        self.element.has_attribute(attrs::NEW_NAV_FLOW)
    }
}

/// 视图栈
#[derive(Debug, Clone, Default)]
pub struct ViewStack {
    views: Vec<View>,
}

impl ViewStack {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 只读访问 ==========

    /// 当前的视图序列（根在前）
    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// 栈顶视图
    pub fn top(&self) -> Option<&View> {
        self.views.last()
    }

    /// 根视图
    pub fn root(&self) -> Option<&View> {
        self.views.first()
    }

    /// 栈顶下面一层的 URL；深度不超过 1 时为 None
    pub fn previous_url(&self) -> Option<&str> {
        let len = self.views.len();
        if len < 2 {
            return None;
        }
        Some(self.views[len - 2].url.as_str())
    }

    /// 根视图的 URL
    pub fn root_url(&self) -> Option<&str> {
        self.root().map(|v| v.url.as_str())
    }

    /// 从栈顶向下，第一个带流程标记的视图下标
    pub fn index_of_top_flow_marker(&self) -> Option<usize> {
        self.views.iter().rposition(View::is_flow_start)
    }

    /// URL 在栈中的位置（从栈顶向下找）
    pub fn position_of(&self, url: &str) -> Option<usize> {
        self.views.iter().rposition(|v| v.url == url)
    }

    /// 所有 URL（根在前）
    pub fn urls(&self) -> Vec<&str> {
        self.views.iter().map(|v| v.url.as_str()).collect()
    }

    // ========== 修改（仅渲染层） ==========

    /// 压入新视图
    pub fn push(&mut self, view: View) {
        self.views.push(view);
    }

    /// 截断到 `index`（保留该下标），返回被移除的视图（栈顶在前）
    pub fn truncate_to(&mut self, index: usize) -> Vec<View> {
        if index + 1 >= self.views.len() {
            return Vec::new();
        }
        let mut removed = self.views.split_off(index + 1);
        removed.reverse();
        removed
    }

    /// 用单个视图替换整个栈，返回原来的视图
    pub fn reset(&mut self, view: View) -> Vec<View> {
        std::mem::replace(&mut self.views, vec![view])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::PageTemplate;

    fn view(url: &str) -> View {
        View::new(url, PageTemplate::content_only().build())
    }

    fn stack(urls: &[&str]) -> ViewStack {
        let mut stack = ViewStack::new();
        for url in urls {
            stack.push(view(url));
        }
        stack
    }

    #[test]
    fn test_previous_and_root_url() {
        let empty = ViewStack::new();
        assert_eq!(empty.previous_url(), None);
        assert_eq!(empty.root_url(), None);

        let single = stack(&["/home"]);
        assert_eq!(single.previous_url(), None);
        assert_eq!(single.root_url(), Some("/home"));

        let deep = stack(&["/home", "/list", "/detail"]);
        assert_eq!(deep.previous_url(), Some("/list"));
        assert_eq!(deep.root_url(), Some("/home"));
        assert_eq!(deep.top().map(|v| v.url.as_str()), Some("/detail"));
    }

    #[test]
    fn test_index_of_top_flow_marker() {
        let s = stack(&["/home", "/a", "/b", "/c"]);
        assert_eq!(s.index_of_top_flow_marker(), None);

        s.views()[1].element.set_attribute(attrs::NEW_NAV_FLOW, "true");
        assert_eq!(s.index_of_top_flow_marker(), Some(1));

        // 多个标记时取最靠近栈顶的
        s.views()[2].element.set_attribute(attrs::NEW_NAV_FLOW, "true");
        assert_eq!(s.index_of_top_flow_marker(), Some(2));
    }

    #[test]
    fn test_truncate_returns_removed_top_first() {
        let mut s = stack(&["/home", "/a", "/b", "/c"]);
        let removed = s.truncate_to(1);
        let urls: Vec<_> = removed.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(urls, ["/c", "/b"]);
        assert_eq!(s.urls(), ["/home", "/a"]);

        // 截断到栈顶是空操作
        assert!(s.truncate_to(1).is_empty());
        assert!(s.truncate_to(9).is_empty());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_reset_replaces_everything() {
        let mut s = stack(&["/home", "/a"]);
        let old = s.reset(view("/login"));
        assert_eq!(old.len(), 2);
        assert_eq!(s.urls(), ["/login"]);
    }

    #[test]
    fn test_position_of_searches_from_top() {
        let s = stack(&["/home", "/a", "/home"]);
        assert_eq!(s.position_of("/home"), Some(2));
        assert_eq!(s.position_of("/missing"), None);
    }
}
