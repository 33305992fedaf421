//! # Scenario 模块
//!
//! 导航场景：用 JSON 描述路由表和一串导航操作，逐步执行并记录结果。
//!
//! ## 文件格式
//!
//! ```json
//! {
//!   "routes": {
//!     "/home": { "title": "Home" },
//!     "/detail": { "title": "Detail", "back_button": true }
//!   },
//!   "steps": [
//!     { "op": "set_root", "url": "/home" },
//!     { "op": "push", "url": "/detail", "animation": "edge-slide" },
//!     { "op": "advance", "seconds": 0.5 },
//!     { "op": "back_signal" },
//!     { "op": "expect_stack", "urls": ["/home"] },
//!     { "op": "expect_animation", "style": "edge-slide", "direction": "back" }
//!   ]
//! }
//! ```
//!
//! `expect_*` 步骤不满足时整个场景失败。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use nav_runtime::{
    AnimationPlan, NavDirection, NavError, Navigator, PageTemplate, PushOptions, RenderLayer,
    TransitionStyle,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::back_button::{BackButton, BackOutcome};
use crate::config::HostConfig;
use crate::outlet::{RouteTable, StackOutlet};

/// 场景错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    /// 场景文件读取失败
    #[error("场景文件 '{path}' 读取失败: {message}")]
    Io { path: String, message: String },

    /// 场景文件解析失败
    #[error("场景解析失败: {0}")]
    Parse(String),

    /// 导航失败
    #[error("第 {step} 步导航失败: {source}")]
    Navigation {
        step: usize,
        #[source]
        source: NavError,
    },

    /// 断言失败
    #[error("第 {step} 步断言失败: {message}")]
    Expectation { step: usize, message: String },

    /// 步骤参数无效
    #[error("第 {step} 步参数无效: {message}")]
    InvalidStep { step: usize, message: String },
}

/// 场景
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// 场景名（可选，默认取文件名）
    #[serde(default)]
    pub name: Option<String>,

    /// 路由表
    pub routes: BTreeMap<String, PageTemplate>,

    /// 步骤
    pub steps: Vec<Step>,
}

/// 场景步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Push {
        url: String,
        #[serde(default)]
        params: Option<Value>,
        #[serde(default)]
        animation: TransitionStyle,
        #[serde(default)]
        new_flow: bool,
    },
    Pop {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        params: Option<Value>,
    },
    PopToRoot,
    SetRoot {
        url: String,
        #[serde(default)]
        params: Option<Value>,
    },
    CloseFlow {
        #[serde(default)]
        params: Option<Value>,
    },
    SetDefaultAnimation {
        animation: TransitionStyle,
    },
    /// 一次返回信号（经过节流和覆盖处理）
    BackSignal,
    /// 推进时间（秒）：播放过渡，并推动返回信号的节流时钟
    Advance {
        seconds: f32,
    },
    ExpectStack {
        urls: Vec<String>,
    },
    ExpectAnimation {
        style: TransitionStyle,
        #[serde(default)]
        direction: Option<NavDirection>,
    },
}

impl Step {
    /// 步骤名
    pub fn op(&self) -> &'static str {
        match self {
            Step::Push { .. } => "push",
            Step::Pop { .. } => "pop",
            Step::PopToRoot => "pop_to_root",
            Step::SetRoot { .. } => "set_root",
            Step::CloseFlow { .. } => "close_flow",
            Step::SetDefaultAnimation { .. } => "set_default_animation",
            Step::BackSignal => "back_signal",
            Step::Advance { .. } => "advance",
            Step::ExpectStack { .. } => "expect_stack",
            Step::ExpectAnimation { .. } => "expect_animation",
        }
    }
}

impl Scenario {
    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ScenarioError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut scenario = Self::from_json_str(&content)?;
        if scenario.name.is_none() {
            scenario.name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        }
        Ok(scenario)
    }

    /// 从 JSON 文本解析
    pub fn from_json_str(content: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(content).map_err(|e| ScenarioError::Parse(e.to_string()))
    }

    pub fn route_table(&self) -> RouteTable {
        self.routes
            .iter()
            .map(|(url, template)| (url.clone(), template.clone()))
            .collect()
    }
}

/// 单步执行结果
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    /// 导航类步骤是否真的发生了导航
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigated: Option<bool>,
    /// 返回信号的处理结果
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_outcome: Option<String>,
    /// 本步执行后的栈
    pub stack: Vec<String>,
    /// 本步触发的过渡
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<AnimationPlan>,
}

/// 场景执行报告
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: Option<String>,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    /// 最终的栈
    pub fn final_stack(&self) -> &[String] {
        self.steps.last().map(|s| s.stack.as_slice()).unwrap_or(&[])
    }

    /// 所有过渡
    pub fn plans(&self) -> impl Iterator<Item = &AnimationPlan> {
        self.steps.iter().filter_map(|s| s.plan.as_ref())
    }
}

/// 场景执行器
pub struct ScenarioRunner {
    navigator: Navigator<StackOutlet>,
    back_button: BackButton,
    clock: Instant,
    elapsed: Duration,
}

impl ScenarioRunner {
    pub fn new(scenario: &Scenario, config: &HostConfig) -> Self {
        let outlet = StackOutlet::new(scenario.route_table(), config.navigation.outlet_options());
        let mut navigator = Navigator::new(outlet);
        navigator.set_default_animation(config.navigation.default_animation.clone());

        Self {
            navigator,
            back_button: BackButton::from_config(&config.back_button),
            clock: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn navigator(&self) -> &Navigator<StackOutlet> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator<StackOutlet> {
        &mut self.navigator
    }

    pub fn back_button_mut(&mut self) -> &mut BackButton {
        &mut self.back_button
    }

    /// 执行整个场景
    pub fn run(mut self, scenario: &Scenario) -> Result<ScenarioReport, ScenarioError> {
        let mut steps = Vec::with_capacity(scenario.steps.len());
        for (index, step) in scenario.steps.iter().enumerate() {
            let report = self.execute(index + 1, step)?;
            steps.push(report);
        }

        // 收尾：让最后一个过渡播放完
        self.navigator.layer_mut().finish_transition();

        Ok(ScenarioReport {
            name: scenario.name.clone(),
            steps,
        })
    }

    /// 执行单个步骤（`index` 从 1 开始，用于报错）
    pub fn execute(&mut self, index: usize, step: &Step) -> Result<StepReport, ScenarioError> {
        let plans_before = self.navigator.layer().plans().len();
        let mut navigated = None;
        let mut back_outcome = None;
        let nav_err = |source| ScenarioError::Navigation { step: index, source };

        match step {
            Step::Push {
                url,
                params,
                animation,
                new_flow,
            } => {
                let mut options = PushOptions::new().with_animation(animation.clone());
                options.params = params.clone();
                options.starts_new_flow = *new_flow;
                navigated = Some(self.navigator.push(url, options).map_err(nav_err)?);
            }
            Step::Pop { url, params } => {
                navigated = Some(
                    self.navigator
                        .pop(url.as_deref(), params.clone())
                        .map_err(nav_err)?,
                );
            }
            Step::PopToRoot => {
                navigated = Some(self.navigator.pop_to_root().map_err(nav_err)?);
            }
            Step::SetRoot { url, params } => {
                navigated = Some(self.navigator.set_root(url, params.clone()).map_err(nav_err)?);
            }
            Step::CloseFlow { params } => {
                navigated = Some(
                    self.navigator
                        .close_current_nav_flow(params.clone())
                        .map_err(nav_err)?,
                );
            }
            Step::SetDefaultAnimation { animation } => {
                self.navigator.set_default_animation(animation.clone());
            }
            Step::BackSignal => {
                let Some(now) = self.clock.checked_add(self.elapsed) else {
                    return Err(ScenarioError::InvalidStep {
                        step: index,
                        message: "虚拟时钟溢出".to_string(),
                    });
                };
                let outcome = self
                    .back_button
                    .signal_at(&mut self.navigator, now)
                    .map_err(nav_err)?;
                if let BackOutcome::Popped(moved) = outcome {
                    navigated = Some(moved);
                }
                back_outcome = Some(format!("{outcome:?}"));
            }
            Step::Advance { seconds } => {
                let seconds = seconds.max(0.0);
                // 推进后的虚拟时钟必须仍可表示
                let elapsed = Duration::try_from_secs_f32(seconds)
                    .ok()
                    .and_then(|dt| self.elapsed.checked_add(dt))
                    .filter(|total| self.clock.checked_add(*total).is_some())
                    .ok_or_else(|| ScenarioError::InvalidStep {
                        step: index,
                        message: format!("推进时长 {seconds} 秒超出范围"),
                    })?;
                self.navigator.layer_mut().update(seconds);
                self.elapsed = elapsed;
            }
            Step::ExpectStack { urls } => {
                let actual = self.stack();
                if actual != *urls {
                    return Err(ScenarioError::Expectation {
                        step: index,
                        message: format!("期望栈 {urls:?}，实际 {actual:?}"),
                    });
                }
            }
            Step::ExpectAnimation { style, direction } => {
                self.expect_animation(index, style, *direction)?;
            }
        }

        let plans = self.navigator.layer().plans();
        let plan = (plans.len() > plans_before)
            .then(|| plans.last().cloned())
            .flatten();
        tracing::debug!(step = index, op = step.op(), "场景步骤完成");

        Ok(StepReport {
            index,
            op: step.op(),
            navigated,
            back_outcome,
            stack: self.stack(),
            plan,
        })
    }

    fn stack(&self) -> Vec<String> {
        self.navigator
            .layer()
            .view_stack()
            .urls()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn expect_animation(
        &self,
        index: usize,
        style: &TransitionStyle,
        direction: Option<NavDirection>,
    ) -> Result<(), ScenarioError> {
        let Some(plan) = self.navigator.layer().last_plan() else {
            return Err(ScenarioError::Expectation {
                step: index,
                message: "还没有发生过渡".to_string(),
            });
        };
        if plan.style != *style {
            return Err(ScenarioError::Expectation {
                step: index,
                message: format!("期望动画 {style}，实际 {}", plan.style),
            });
        }
        if let Some(direction) = direction
            && plan.direction != direction
        {
            return Err(ScenarioError::Expectation {
                step: index,
                message: format!("期望方向 {direction:?}，实际 {:?}", plan.direction),
            });
        }
        Ok(())
    }
}

/// 加载并执行一个场景文件
pub fn run_file(path: impl AsRef<Path>, config: &HostConfig) -> Result<ScenarioReport, ScenarioError> {
    let scenario = Scenario::load(path)?;
    ScenarioRunner::new(&scenario, config).run(&scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"{
        "routes": {
            "/home": { "title": "Home" },
            "/a": { "title": "A", "back_button": true },
            "/b": { "title": "B", "back_button": true }
        },
        "steps": [
            { "op": "set_root", "url": "/home" },
            { "op": "push", "url": "/a", "animation": "edge-slide", "new_flow": true },
            { "op": "push", "url": "/b", "animation": "fade" },
            { "op": "expect_stack", "urls": ["/home", "/a", "/b"] },
            { "op": "expect_animation", "style": "fade", "direction": "forward" },
            { "op": "pop" },
            { "op": "expect_animation", "style": "fade", "direction": "back" },
            { "op": "pop" },
            { "op": "expect_animation", "style": "edge-slide", "direction": "back" },
            { "op": "expect_stack", "urls": ["/home"] }
        ]
    }"#;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_json_str(BASIC).unwrap();
        assert_eq!(scenario.routes.len(), 3);
        assert_eq!(scenario.steps.len(), 10);
        assert_eq!(
            scenario.steps[1],
            Step::Push {
                url: "/a".to_string(),
                params: None,
                animation: TransitionStyle::EdgeSlide,
                new_flow: true,
            }
        );
        assert_eq!(scenario.steps[5], Step::Pop { url: None, params: None });
    }

    #[test]
    fn test_run_basic() {
        let scenario = Scenario::from_json_str(BASIC).unwrap();
        let report = ScenarioRunner::new(&scenario, &HostConfig::default())
            .run(&scenario)
            .unwrap();

        assert_eq!(report.final_stack(), ["/home".to_string()]);
        assert_eq!(report.plans().count(), 4);
        assert_eq!(report.steps[0].navigated, Some(true));
        assert!(report.steps[0].plan.is_none());
    }

    #[test]
    fn test_failed_expectation_reports_step() {
        let scenario = Scenario::from_json_str(
            r#"{
                "routes": { "/home": {} },
                "steps": [
                    { "op": "set_root", "url": "/home" },
                    { "op": "expect_stack", "urls": ["/elsewhere"] }
                ]
            }"#,
        )
        .unwrap();
        let err = ScenarioRunner::new(&scenario, &HostConfig::default())
            .run(&scenario)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Expectation { step: 2, .. }));
    }

    #[test]
    fn test_unknown_route_is_navigation_error() {
        let scenario = Scenario::from_json_str(
            r#"{ "routes": {}, "steps": [ { "op": "set_root", "url": "/home" } ] }"#,
        )
        .unwrap();
        let err = ScenarioRunner::new(&scenario, &HostConfig::default())
            .run(&scenario)
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioError::Navigation {
                step: 1,
                source: NavError::RouteNotFound {
                    url: "/home".to_string()
                }
            }
        );
    }

    #[test]
    fn test_back_signals_use_virtual_clock() {
        let scenario = Scenario::from_json_str(
            r#"{
                "routes": { "/home": {}, "/a": {}, "/b": {} },
                "steps": [
                    { "op": "set_root", "url": "/home" },
                    { "op": "push", "url": "/a" },
                    { "op": "push", "url": "/b" },
                    { "op": "back_signal" },
                    { "op": "back_signal" },
                    { "op": "expect_stack", "urls": ["/home", "/a"] },
                    { "op": "advance", "seconds": 0.5 },
                    { "op": "back_signal" },
                    { "op": "expect_stack", "urls": ["/home"] }
                ]
            }"#,
        )
        .unwrap();
        let report = ScenarioRunner::new(&scenario, &HostConfig::default())
            .run(&scenario)
            .unwrap();
        assert_eq!(report.steps[3].back_outcome.as_deref(), Some("Popped(true)"));
        assert_eq!(report.steps[4].back_outcome.as_deref(), Some("Throttled"));
    }

    #[test]
    fn test_advance_rejects_oversized_duration() {
        for seconds in ["1e20", "1e39"] {
            let scenario = Scenario::from_json_str(&format!(
                r#"{{
                    "routes": {{ "/home": {{}} }},
                    "steps": [
                        {{ "op": "set_root", "url": "/home" }},
                        {{ "op": "advance", "seconds": {seconds} }},
                        {{ "op": "back_signal" }}
                    ]
                }}"#
            ))
            .unwrap();
            let err = ScenarioRunner::new(&scenario, &HostConfig::default())
                .run(&scenario)
                .unwrap_err();
            assert!(
                matches!(err, ScenarioError::InvalidStep { step: 2, .. }),
                "{seconds}: {err}"
            );
        }
    }

    #[test]
    fn test_config_default_animation_applies() {
        let scenario = Scenario::from_json_str(
            r#"{
                "routes": { "/home": {}, "/a": {} },
                "steps": [
                    { "op": "set_root", "url": "/home" },
                    { "op": "push", "url": "/a" },
                    { "op": "expect_animation", "style": "hard-slide" }
                ]
            }"#,
        )
        .unwrap();
        let mut config = HostConfig::default();
        config.navigation.default_animation = TransitionStyle::HardSlide;
        assert!(ScenarioRunner::new(&scenario, &config).run(&scenario).is_ok());
    }

    #[test]
    fn test_load_uses_file_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkout-flow.json");
        fs::write(&path, BASIC).unwrap();

        let report = run_file(&path, &HostConfig::default()).unwrap();
        assert_eq!(report.name.as_deref(), Some("checkout-flow"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Scenario::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
    }
}
