//! # Back Button 模块
//!
//! 返回信号（硬件返回键 / 浏览器后退）到导航控制器的桥接。
//!
//! ## 处理流程
//!
//! ```text
//! 信号 → 未启用过？丢弃
//!      → 节流（窗口内只放行第一个）
//!      → 过滤条件
//!      → 浮层守卫（浮层消费信号时不导航）
//!      → 当前视图的覆盖处理器，没有则 Navigator.pop()
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use nav_runtime::{NavResult, Navigator, RenderLayer};

use crate::config::BackButtonConfig;

/// 默认节流窗口
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);

/// 浮层守卫
///
/// 有可关闭的浮层时消费返回信号。浮层的检测与关闭由实现方负责。
pub trait OverlayGuard {
    /// 返回 `true` 表示信号已被浮层消费
    fn intercept(&mut self) -> bool;
}

/// 没有浮层
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlay;

impl OverlayGuard for NoOverlay {
    fn intercept(&mut self) -> bool {
        false
    }
}

impl<F: FnMut() -> bool> OverlayGuard for F {
    fn intercept(&mut self) -> bool {
        self()
    }
}

/// 过滤条件
pub type BackCondition = Box<dyn Fn() -> bool>;

/// 视图覆盖处理器
pub type BackHandler = Box<dyn FnMut()>;

/// 一次信号的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    /// 从未启用，信号未被订阅
    Inactive,
    /// 节流窗口内被丢弃
    Throttled,
    /// 过滤条件不满足
    Filtered,
    /// 被浮层消费
    Overlay,
    /// 交给当前视图的覆盖处理器
    ViewOverride { url: String },
    /// 执行了 pop，附带是否真的发生了导航
    Popped(bool),
}

/// 返回信号处理器
pub struct BackButton<G: OverlayGuard = NoOverlay> {
    initialized: bool,
    condition: BackCondition,
    throttle: Duration,
    last_accepted: Option<Instant>,
    guard: G,
    overrides: HashMap<String, BackHandler>,
}

impl BackButton<NoOverlay> {
    pub fn new() -> Self {
        Self::with_guard(NoOverlay)
    }

    /// 按配置创建，`enabled` 时立即启用
    pub fn from_config(config: &BackButtonConfig) -> Self {
        let mut button = Self::new().with_throttle(Duration::from_millis(config.throttle_ms));
        if config.enabled {
            button.enable(None);
        }
        button
    }
}

impl Default for BackButton<NoOverlay> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: OverlayGuard> BackButton<G> {
    pub fn with_guard(guard: G) -> Self {
        Self {
            initialized: false,
            condition: Box::new(|| true),
            throttle: DEFAULT_THROTTLE,
            last_accepted: None,
            guard,
            overrides: HashMap::new(),
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    // ========== 启用 / 禁用 ==========

    /// 启用，可附带过滤条件（None 表示总是放行）
    pub fn enable(&mut self, condition: Option<BackCondition>) {
        self.ensure_initialized();
        self.condition = condition.unwrap_or_else(|| Box::new(|| true));
    }

    /// 禁用：之后的信号都被过滤
    pub fn disable(&mut self) {
        self.ensure_initialized();
        self.condition = Box::new(|| false);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn ensure_initialized(&mut self) {
        if !self.initialized {
            self.initialized = true;
            tracing::debug!(throttle_ms = self.throttle.as_millis() as u64, "返回信号已订阅");
        }
    }

    // ========== 视图覆盖 ==========

    /// 为某个 URL 的视图注册覆盖处理器
    pub fn set_view_override(&mut self, url: impl Into<String>, handler: BackHandler) {
        self.overrides.insert(url.into(), handler);
    }

    pub fn clear_view_override(&mut self, url: &str) {
        self.overrides.remove(url);
    }

    pub fn guard_mut(&mut self) -> &mut G {
        &mut self.guard
    }

    // ========== 信号处理 ==========

    /// 处理一次返回信号（使用当前时间）
    pub fn signal<L: RenderLayer>(&mut self, navigator: &mut Navigator<L>) -> NavResult<BackOutcome> {
        self.signal_at(navigator, Instant::now())
    }

    /// 处理一次返回信号
    pub fn signal_at<L: RenderLayer>(
        &mut self,
        navigator: &mut Navigator<L>,
        now: Instant,
    ) -> NavResult<BackOutcome> {
        if !self.initialized {
            return Ok(BackOutcome::Inactive);
        }

        if let Some(last) = self.last_accepted
            && now.saturating_duration_since(last) < self.throttle
        {
            tracing::debug!("返回信号被节流");
            return Ok(BackOutcome::Throttled);
        }
        self.last_accepted = Some(now);

        if !(self.condition)() {
            return Ok(BackOutcome::Filtered);
        }

        tracing::info!("返回信号触发");

        if self.guard.intercept() {
            return Ok(BackOutcome::Overlay);
        }

        let active_url = navigator.views().last().map(|v| v.url.clone());
        if let Some(url) = active_url
            && let Some(handler) = self.overrides.get_mut(&url)
        {
            handler();
            return Ok(BackOutcome::ViewOverride { url });
        }

        navigator.pop(None, None).map(BackOutcome::Popped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use nav_runtime::{PageTemplate, PushOptions};

    use crate::outlet::{OutletOptions, RouteTable, StackOutlet};

    fn navigator() -> Navigator<StackOutlet> {
        let routes = RouteTable::new()
            .with_route("/home", PageTemplate::titled("Home"))
            .with_route("/a", PageTemplate::detail("A"))
            .with_route("/b", PageTemplate::detail("B"));
        let mut nav = Navigator::new(StackOutlet::new(routes, OutletOptions::default()));
        nav.set_root("/home", None).unwrap();
        nav.push("/a", PushOptions::new()).unwrap();
        nav.push("/b", PushOptions::new()).unwrap();
        nav
    }

    fn depth(nav: &Navigator<StackOutlet>) -> usize {
        nav.views().len()
    }

    #[test]
    fn test_inactive_until_enabled() {
        let mut nav = navigator();
        let mut button = BackButton::new();
        assert_eq!(button.signal(&mut nav).unwrap(), BackOutcome::Inactive);
        assert_eq!(depth(&nav), 3);
    }

    #[test]
    fn test_signal_pops() {
        let mut nav = navigator();
        let mut button = BackButton::new();
        button.enable(None);

        assert_eq!(button.signal(&mut nav).unwrap(), BackOutcome::Popped(true));
        assert_eq!(depth(&nav), 2);
    }

    #[test]
    fn test_throttle_is_leading_edge() {
        let mut nav = navigator();
        let mut button = BackButton::new();
        button.enable(None);
        let t0 = Instant::now();

        assert_eq!(button.signal_at(&mut nav, t0).unwrap(), BackOutcome::Popped(true));
        assert_eq!(
            button
                .signal_at(&mut nav, t0 + Duration::from_millis(100))
                .unwrap(),
            BackOutcome::Throttled
        );
        assert_eq!(
            button
                .signal_at(&mut nav, t0 + Duration::from_millis(499))
                .unwrap(),
            BackOutcome::Throttled
        );
        assert_eq!(depth(&nav), 2);

        assert_eq!(
            button
                .signal_at(&mut nav, t0 + Duration::from_millis(500))
                .unwrap(),
            BackOutcome::Popped(true)
        );
        assert_eq!(depth(&nav), 1);
    }

    #[test]
    fn test_pop_at_root_reports_noop() {
        let mut nav = navigator();
        nav.pop_to_root().unwrap();
        let mut button = BackButton::new();
        button.enable(None);
        assert_eq!(button.signal(&mut nav).unwrap(), BackOutcome::Popped(false));
    }

    #[test]
    fn test_disable_filters_signals() {
        let mut nav = navigator();
        let mut button = BackButton::new();
        button.disable();
        assert!(button.is_initialized());
        assert_eq!(button.signal(&mut nav).unwrap(), BackOutcome::Filtered);
        assert_eq!(depth(&nav), 3);
    }

    #[test]
    fn test_filter_runs_after_throttle() {
        let mut nav = navigator();
        let allow = Rc::new(Cell::new(false));
        let mut button = BackButton::new();
        let flag = Rc::clone(&allow);
        button.enable(Some(Box::new(move || flag.get())));
        let t0 = Instant::now();

        // 被过滤的信号同样占用节流窗口
        assert_eq!(button.signal_at(&mut nav, t0).unwrap(), BackOutcome::Filtered);
        allow.set(true);
        assert_eq!(
            button
                .signal_at(&mut nav, t0 + Duration::from_millis(200))
                .unwrap(),
            BackOutcome::Throttled
        );
        assert_eq!(
            button
                .signal_at(&mut nav, t0 + Duration::from_millis(600))
                .unwrap(),
            BackOutcome::Popped(true)
        );
    }

    #[test]
    fn test_overlay_consumes_signal() {
        let mut nav = navigator();
        let presented = Rc::new(Cell::new(true));
        let overlay = Rc::clone(&presented);
        let mut button = BackButton::with_guard(move || overlay.replace(false));
        button.enable(None);
        let t0 = Instant::now();

        assert_eq!(button.signal_at(&mut nav, t0).unwrap(), BackOutcome::Overlay);
        assert_eq!(depth(&nav), 3);
        assert_eq!(
            button.signal_at(&mut nav, t0 + DEFAULT_THROTTLE).unwrap(),
            BackOutcome::Popped(true)
        );
    }

    #[test]
    fn test_view_override_preferred_over_pop() {
        let mut nav = navigator();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut button = BackButton::new();
        button.enable(None);
        button.set_view_override("/b", Box::new(move || counter.set(counter.get() + 1)));
        let t0 = Instant::now();

        assert_eq!(
            button.signal_at(&mut nav, t0).unwrap(),
            BackOutcome::ViewOverride {
                url: "/b".to_string()
            }
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(depth(&nav), 3);

        button.clear_view_override("/b");
        assert_eq!(
            button.signal_at(&mut nav, t0 + DEFAULT_THROTTLE).unwrap(),
            BackOutcome::Popped(true)
        );
    }

    #[test]
    fn test_from_config() {
        let config = BackButtonConfig {
            enabled: false,
            throttle_ms: 100,
        };
        let button = BackButton::from_config(&config);
        assert!(!button.is_initialized());
        assert_eq!(button.throttle, Duration::from_millis(100));

        let button = BackButton::from_config(&BackButtonConfig::default());
        assert!(button.is_initialized());
    }
}
