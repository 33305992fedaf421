//! # Navigator 模块
//!
//! 导航栈控制器：对外提供 push / pop / popToRoot / setRoot / closeCurrentNavFlow。
//!
//! ## 职责划分
//!
//! - 控制器只记录"下一次过渡用什么动画"，并请求渲染层导航
//! - 渲染层持有视图栈，决定栈如何变化，并在过渡时调用已注册的过渡钩子
//! - 过渡钩子读取 [`SelectionState`]，选出动画并构建动画树
//!
//! ```text
//! Navigator.push(url)
//!   → SelectionState.requested = animation
//!   → RenderLayer.navigate(Forward url)
//!       → hook(TransitionOptions) → AnimationPlan
//! ```
//!
//! 栈深度相关的情况（没有上一页、已在根页面）返回 `Ok(false)`；
//! 渲染层的错误原样传播。

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NavResult;
use crate::transition::{
    AnimationPlan, BuilderFn, BuilderRegistry, SelectionState, TransitionOptions, TransitionStyle,
    resolve_transition,
};
use crate::view::{View, ViewStack};

/// 过渡钩子
///
/// 渲染层在每次前进或返回过渡时调用一次。
pub type NavAnimationHook = Rc<dyn Fn(&TransitionOptions) -> AnimationPlan>;

/// 导航意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavIntent {
    /// 前进
    Forward,
    /// 返回
    Back,
    /// 替换整个栈
    Root,
}

/// 发给渲染层的导航请求
#[derive(Debug, Clone, PartialEq)]
pub struct NavRequest {
    pub url: String,
    pub intent: NavIntent,
    pub params: Option<Value>,
}

/// 渲染层接口
///
/// 渲染层持有视图栈；控制器只通过 [`view_stack`](RenderLayer::view_stack) 读取它。
pub trait RenderLayer {
    /// 注册过渡钩子（覆盖之前注册的钩子）
    fn configure_nav_animation(&mut self, hook: NavAnimationHook);

    /// 执行导航
    ///
    /// 返回 `Ok(true)` 表示发生了导航，`Ok(false)` 表示空操作。
    fn navigate(&mut self, request: NavRequest) -> NavResult<bool>;

    /// 当前视图栈
    fn view_stack(&self) -> &ViewStack;
}

/// push 的可选参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushOptions {
    pub params: Option<Value>,
    pub animation: TransitionStyle,
    pub starts_new_flow: bool,
}

impl PushOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_animation(mut self, animation: impl Into<TransitionStyle>) -> Self {
        self.animation = animation.into();
        self
    }

    /// 目标视图开启一个新流程
    pub fn new_flow(mut self) -> Self {
        self.starts_new_flow = true;
        self
    }
}

/// 导航栈控制器
pub struct Navigator<L: RenderLayer> {
    layer: L,
    selection: Rc<RefCell<SelectionState>>,
    registry: Rc<RefCell<BuilderRegistry>>,
    hook_configured: bool,
    params: Option<Value>,
}

impl<L: RenderLayer> Navigator<L> {
    pub fn new(layer: L) -> Self {
        Self::with_registry(layer, BuilderRegistry::with_defaults())
    }

    pub fn with_registry(layer: L, registry: BuilderRegistry) -> Self {
        Self {
            layer,
            selection: Rc::new(RefCell::new(SelectionState::default())),
            registry: Rc::new(RefCell::new(registry)),
            hook_configured: false,
            params: None,
        }
    }

    // ========== 导航操作 ==========

    /// 前进到 `url`
    ///
    /// 第一次调用时向渲染层注册过渡钩子，之后不再重复注册。
    /// 新流程标记后写覆盖先写：只有下一次前进过渡会消费它。
    pub fn push(&mut self, url: &str, options: PushOptions) -> NavResult<bool> {
        self.ensure_hook();

        {
            let mut selection = self.selection.borrow_mut();
            selection.requested = options.animation;
            if selection.start_new_flow && !options.starts_new_flow {
                tracing::debug!(url = %url, "未消费的新流程标记被覆盖");
            }
            selection.start_new_flow = options.starts_new_flow;
        }
        self.params = options.params.clone();

        self.layer.navigate(NavRequest {
            url: url.to_string(),
            intent: NavIntent::Forward,
            params: options.params,
        })
    }

    /// 返回到 `url`；未指定时返回到上一页
    ///
    /// 没有上一页时不修改栈，返回 `Ok(false)`。
    pub fn pop(&mut self, url: Option<&str>, params: Option<Value>) -> NavResult<bool> {
        self.params = params.clone();

        let target = match url {
            Some(url) => url.to_string(),
            None => match self.layer.view_stack().previous_url() {
                Some(url) => url.to_string(),
                None => {
                    tracing::debug!("没有上一页，pop 为空操作");
                    return Ok(false);
                }
            },
        };

        self.layer.navigate(NavRequest {
            url: target,
            intent: NavIntent::Back,
            params,
        })
    }

    /// 返回到根页面；已在根页面时为空操作
    pub fn pop_to_root(&mut self) -> NavResult<bool> {
        let Some(root) = self.layer.view_stack().root_url().map(str::to_string) else {
            tracing::debug!("视图栈为空，popToRoot 为空操作");
            return Ok(false);
        };

        self.layer.navigate(NavRequest {
            url: root,
            intent: NavIntent::Back,
            params: self.params.clone(),
        })
    }

    /// 用 `url` 替换整个栈
    pub fn set_root(&mut self, url: &str, params: Option<Value>) -> NavResult<bool> {
        self.params = params.clone();
        self.layer.navigate(NavRequest {
            url: url.to_string(),
            intent: NavIntent::Root,
            params,
        })
    }

    /// 一步关闭当前流程
    ///
    /// 返回到最靠近栈顶的流程起点的下一层；没有流程起点
    /// （或起点就是根页面）时退回到 [`pop_to_root`](Self::pop_to_root)。
    pub fn close_current_nav_flow(&mut self, params: Option<Value>) -> NavResult<bool> {
        let stack = self.layer.view_stack();
        let target = stack
            .index_of_top_flow_marker()
            .filter(|_| stack.len() > 1)
            .and_then(|marker| marker.checked_sub(1))
            .map(|below| stack.views()[below].url.clone());

        match target {
            Some(url) => self.pop(Some(&url), params),
            None => {
                tracing::debug!("没有可关闭的流程，退回到根页面");
                self.pop_to_root()
            }
        }
    }

    // ========== 配置 ==========

    /// 设置 `default` 动画的回退值
    pub fn set_default_animation(&mut self, animation: impl Into<TransitionStyle>) {
        self.selection.borrow_mut().default = animation.into();
    }

    /// 注册或覆盖一个过渡动画构建函数
    pub fn register_animation(&mut self, style: impl Into<TransitionStyle>, builder: BuilderFn) {
        self.registry.borrow_mut().register(style, builder);
    }

    // ========== 查询 ==========

    /// 最近一次导航携带的参数
    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    /// 当前视图序列
    pub fn views(&self) -> &[View] {
        self.layer.view_stack().views()
    }

    /// 当前动画选择状态
    pub fn selection(&self) -> Ref<'_, SelectionState> {
        self.selection.borrow()
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn layer_mut(&mut self) -> &mut L {
        &mut self.layer
    }

    pub fn into_layer(self) -> L {
        self.layer
    }

    fn ensure_hook(&mut self) {
        if self.hook_configured {
            return;
        }
        self.hook_configured = true;

        let selection = Rc::clone(&self.selection);
        let registry = Rc::clone(&self.registry);
        let hook: NavAnimationHook = Rc::new(move |opts: &TransitionOptions| {
            resolve_transition(&mut selection.borrow_mut(), &registry.borrow(), opts)
        });
        self.layer.configure_nav_animation(hook);
        tracing::debug!("过渡钩子已注册");
    }
}
