//! # Outlet 模块
//!
//! 参考渲染层：持有视图栈，按导航请求修改它，并播放过渡动画。
//!
//! ## 栈语义
//!
//! | 意图 | 目标已在栈中 | 目标不在栈中 |
//! |------|--------------|--------------|
//! | Forward | 截断到目标 | 压入新视图 |
//! | Back | 截断到目标 | 用新视图替换整个栈 |
//! | Root | 用新视图替换整个栈（无动画） | 同左 |
//!
//! 目标就是栈顶时为空操作（Root 只在栈深度为 1 时如此）。开始新的过渡前会先结束仍在播放的过渡。

use std::collections::BTreeMap;

use nav_runtime::{
    AnimationPlan, EasingFunction, Element, ElementKind, ElementRef, NavAnimationHook, NavDirection,
    NavError, NavIntent, NavRequest, NavResult, PageTemplate, PlatformMode, RenderLayer,
    TransitionOptions, View, ViewStack, classes,
};
use serde_json::Value;

use crate::player::TimelinePlayer;

/// 页面工厂：为 URL 创建页面元素
pub trait PageFactory {
    fn create(&mut self, url: &str, params: Option<&Value>) -> NavResult<ElementRef>;
}

/// 路由表：URL → 页面模板
///
/// 匹配时忽略 `?` 之后的查询串。
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, PageTemplate>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, url: impl Into<String>, template: PageTemplate) -> Self {
        self.insert(url, template);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, template: PageTemplate) {
        self.routes.insert(url.into(), template);
    }

    pub fn get(&self, url: &str) -> Option<&PageTemplate> {
        let path = url.split('?').next().unwrap_or(url);
        self.routes.get(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl FromIterator<(String, PageTemplate)> for RouteTable {
    fn from_iter<I: IntoIterator<Item = (String, PageTemplate)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

impl PageFactory for RouteTable {
    fn create(&mut self, url: &str, _params: Option<&Value>) -> NavResult<ElementRef> {
        self.get(url)
            .map(PageTemplate::build)
            .ok_or_else(|| NavError::RouteNotFound {
                url: url.to_string(),
            })
    }
}

/// 渲染层填入过渡参数的环境信息
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutletOptions {
    pub mode: PlatformMode,
    pub is_rtl: bool,
    pub duration: Option<f32>,
    pub easing: Option<EasingFunction>,
}

/// 正在播放的过渡
#[derive(Debug)]
struct ActiveTransition {
    player: TimelinePlayer,
    leaving: ElementRef,
}

/// 参考渲染层
pub struct StackOutlet<F: PageFactory = RouteTable> {
    stack: ViewStack,
    factory: F,
    options: OutletOptions,
    base: ElementRef,
    hook: Option<NavAnimationHook>,
    active: Option<ActiveTransition>,
    plans: Vec<AnimationPlan>,
}

impl<F: PageFactory> StackOutlet<F> {
    pub fn new(factory: F, options: OutletOptions) -> Self {
        Self {
            stack: ViewStack::new(),
            factory,
            options,
            base: Element::leaf(ElementKind::Nav),
            hook: None,
            active: None,
            plans: Vec::new(),
        }
    }

    /// 容器元素
    pub fn base(&self) -> &ElementRef {
        &self.base
    }

    pub fn options(&self) -> &OutletOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: OutletOptions) {
        self.options = options;
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// 是否已注册过渡钩子
    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// 已播放（或正在播放）的动画计划
    pub fn plans(&self) -> &[AnimationPlan] {
        &self.plans
    }

    pub fn last_plan(&self) -> Option<&AnimationPlan> {
        self.plans.last()
    }

    pub fn take_plans(&mut self) -> Vec<AnimationPlan> {
        std::mem::take(&mut self.plans)
    }

    /// 推进正在播放的过渡
    ///
    /// # 返回
    /// - `true`: 仍有过渡在播放
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(active) = &mut self.active else {
            return false;
        };
        if active.player.update(dt) {
            return true;
        }
        self.complete_transition();
        false
    }

    /// 立即结束正在播放的过渡
    pub fn finish_transition(&mut self) {
        if let Some(active) = &mut self.active {
            active.player.finish();
            self.complete_transition();
        }
    }

    fn complete_transition(&mut self) {
        if let Some(active) = self.active.take() {
            active.leaving.add_class(classes::PAGE_HIDDEN);
            tracing::debug!(leaving = %active.leaving.label(), "过渡完成");
        }
    }

    fn create_page(&mut self, url: &str, params: Option<&Value>) -> NavResult<ElementRef> {
        let element = self.factory.create(url, params)?;
        element.add_class(classes::PAGE);
        element.add_class(classes::PAGE_INVISIBLE);
        Ok(element)
    }

    fn show(element: &ElementRef) {
        element.remove_class(classes::PAGE_INVISIBLE);
        element.remove_class(classes::PAGE_HIDDEN);
    }

    /// 计算请求对应的栈变化，返回 (进入元素, 离开元素)
    fn apply(&mut self, request: NavRequest) -> NavResult<(ElementRef, Option<ElementRef>)> {
        let leaving = self.stack.top().map(|v| v.element.clone());

        match request.intent {
            NavIntent::Root => {
                let element = self.create_page(&request.url, request.params.as_ref())?;
                self.stack
                    .reset(View::new(&request.url, element.clone()).with_params(request.params));
                Ok((element, leaving))
            }
            NavIntent::Forward | NavIntent::Back => {
                if let Some(index) = self.stack.position_of(&request.url) {
                    self.stack.truncate_to(index);
                    let entering = self.stack.views()[index].element.clone();
                    return Ok((entering, leaving));
                }

                let element = self.create_page(&request.url, request.params.as_ref())?;
                let view = View::new(&request.url, element.clone()).with_params(request.params);
                if request.intent == NavIntent::Forward {
                    self.stack.push(view);
                } else {
                    tracing::debug!(url = %request.url, "返回目标不在栈中，替换整个栈");
                    self.stack.reset(view);
                }
                Ok((element, leaving))
            }
        }
    }

    fn transition_options(
        &self,
        direction: NavDirection,
        entering: ElementRef,
        leaving: ElementRef,
    ) -> TransitionOptions {
        let mut opts = TransitionOptions::new(direction, entering)
            .with_leaving(leaving)
            .with_base(self.base.clone())
            .with_mode(self.options.mode)
            .with_rtl(self.options.is_rtl);
        opts.duration = self.options.duration;
        opts.easing = self.options.easing;
        opts
    }
}

impl<F: PageFactory> RenderLayer for StackOutlet<F> {
    fn configure_nav_animation(&mut self, hook: NavAnimationHook) {
        if self.hook.is_some() {
            tracing::debug!("覆盖已注册的过渡钩子");
        }
        self.hook = Some(hook);
    }

    fn navigate(&mut self, request: NavRequest) -> NavResult<bool> {
        self.finish_transition();

        let at_top = self.stack.top().is_some_and(|v| v.url == request.url);
        if at_top && (request.intent != NavIntent::Root || self.stack.len() == 1) {
            tracing::debug!(url = %request.url, "目标已是栈顶，忽略");
            return Ok(false);
        }

        let intent = request.intent;
        let url = request.url.clone();
        let (entering, leaving) = self.apply(request)?;
        tracing::info!(url = %url, intent = ?intent, depth = self.stack.len(), "导航");

        let direction = match intent {
            NavIntent::Forward => Some(NavDirection::Forward),
            NavIntent::Back => Some(NavDirection::Back),
            NavIntent::Root => None,
        };

        match (direction, leaving, self.hook.clone()) {
            (Some(direction), Some(leaving), Some(hook)) => {
                let opts = self.transition_options(direction, entering.clone(), leaving.clone());
                let plan = hook(&opts);
                tracing::debug!(style = %plan.style, direction = ?plan.direction, "播放过渡");

                let player = TimelinePlayer::play(&plan.root);
                // 动画树不负责显示进入页时，由渲染层兜底
                Self::show(&entering);
                self.plans.push(plan);
                self.active = Some(ActiveTransition { player, leaving });
                if self.active.as_ref().is_some_and(|a| a.player.is_finished()) {
                    self.complete_transition();
                }
            }
            (_, leaving, _) => {
                Self::show(&entering);
                if let Some(leaving) = leaving
                    && leaving.id() != entering.id()
                {
                    leaving.add_class(classes::PAGE_HIDDEN);
                }
            }
        }

        Ok(true)
    }

    fn view_stack(&self) -> &ViewStack {
        &self.stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> RouteTable {
        RouteTable::new()
            .with_route("/home", PageTemplate::titled("Home"))
            .with_route("/a", PageTemplate::detail("A"))
            .with_route("/b", PageTemplate::detail("B"))
            .with_route("/c", PageTemplate::detail("C"))
    }

    fn request(url: &str, intent: NavIntent) -> NavRequest {
        NavRequest {
            url: url.to_string(),
            intent,
            params: None,
        }
    }

    fn outlet() -> StackOutlet {
        let mut outlet = StackOutlet::new(routes(), OutletOptions::default());
        outlet.navigate(request("/home", NavIntent::Root)).unwrap();
        outlet
    }

    fn urls(outlet: &StackOutlet) -> Vec<&str> {
        outlet.view_stack().urls()
    }

    #[test]
    fn test_route_table_ignores_query() {
        let table = routes();
        assert!(table.get("/a?id=3").is_some());
        assert!(table.get("/z").is_none());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_forward_appends_and_truncates_to_existing() {
        let mut outlet = outlet();
        outlet.navigate(request("/a", NavIntent::Forward)).unwrap();
        outlet.navigate(request("/b", NavIntent::Forward)).unwrap();
        assert_eq!(urls(&outlet), ["/home", "/a", "/b"]);

        outlet.navigate(request("/a", NavIntent::Forward)).unwrap();
        assert_eq!(urls(&outlet), ["/home", "/a"]);
    }

    #[test]
    fn test_back_to_unknown_url_resets_stack() {
        let mut outlet = outlet();
        outlet.navigate(request("/a", NavIntent::Forward)).unwrap();
        outlet.navigate(request("/c", NavIntent::Back)).unwrap();
        assert_eq!(urls(&outlet), ["/c"]);
    }

    #[test]
    fn test_navigate_to_top_is_noop() {
        let mut outlet = outlet();
        assert!(!outlet.navigate(request("/home", NavIntent::Forward)).unwrap());
        assert!(!outlet.navigate(request("/home", NavIntent::Root)).unwrap());
        assert_eq!(urls(&outlet), ["/home"]);
    }

    #[test]
    fn test_unknown_route_is_error_and_stack_unchanged() {
        let mut outlet = outlet();
        let err = outlet.navigate(request("/nowhere", NavIntent::Forward)).unwrap_err();
        assert_eq!(
            err,
            NavError::RouteNotFound {
                url: "/nowhere".to_string()
            }
        );
        assert_eq!(urls(&outlet), ["/home"]);
    }

    #[test]
    fn test_without_hook_pages_switch_instantly() {
        let mut outlet = outlet();
        outlet.navigate(request("/a", NavIntent::Forward)).unwrap();

        let views = outlet.view_stack().views();
        assert!(!views[1].element.has_class(classes::PAGE_INVISIBLE));
        assert!(views[0].element.has_class(classes::PAGE_HIDDEN));
        assert!(!outlet.is_animating());
        assert!(outlet.plans().is_empty());
    }

    #[test]
    fn test_root_on_top_url_still_collapses_stack() {
        let mut outlet = outlet();
        outlet.navigate(request("/a", NavIntent::Forward)).unwrap();
        assert!(outlet.navigate(request("/a", NavIntent::Root)).unwrap());
        assert_eq!(urls(&outlet), ["/a"]);
    }

    #[test]
    fn test_root_keeps_params() {
        let mut outlet = outlet();
        outlet
            .navigate(NavRequest {
                url: "/a".to_string(),
                intent: NavIntent::Root,
                params: Some(serde_json::json!({"id": 1})),
            })
            .unwrap();
        assert_eq!(
            outlet.view_stack().views()[0].params,
            Some(serde_json::json!({"id": 1}))
        );
    }
}
