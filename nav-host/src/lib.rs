//! # Nav Host
//!
//! `nav-runtime` 的参考宿主：渲染层、动画播放、返回信号、配置与场景执行。
//!
//! ## 组成
//!
//! ```text
//! Navigator (nav-runtime)
//!     │ NavRequest / AnimationPlan
//!     ▼
//! StackOutlet ── PageFactory(RouteTable) 生成页面元素
//!     │
//!     ▼
//! TimelinePlayer ── 把动画树写入元素样式
//! ```
//!
//! - [`outlet`]：[`StackOutlet`]，实现 `RenderLayer`
//! - [`player`]：[`TimelinePlayer`]，按时间推进动画树
//! - [`back_button`]：返回信号节流与分发
//! - [`config`]：宿主配置（JSON）
//! - [`environment`]：启动前的环境选择
//! - [`scenario`]：JSON 描述的导航场景

pub mod back_button;
pub mod config;
pub mod environment;
pub mod outlet;
pub mod player;
pub mod scenario;

pub use back_button::{BackButton, BackOutcome, NoOverlay, OverlayGuard};
pub use config::{BackButtonConfig, ConfigError, HostConfig, NavigationConfig};
pub use environment::{Environment, EnvironmentError};
pub use outlet::{OutletOptions, PageFactory, RouteTable, StackOutlet};
pub use player::{PlaybackState, TimelinePlayer, Track};
pub use scenario::{Scenario, ScenarioError, ScenarioReport, ScenarioRunner, Step, StepReport, run_file};
