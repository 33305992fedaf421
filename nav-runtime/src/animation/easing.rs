//! # Easing 模块
//!
//! 缓动函数库，用于动画的时间插值。
//!
//! 除常用曲线外支持任意三次贝塞尔曲线，页面过渡使用的两条曲线以常量给出：
//! [`EasingFunction::DECELERATE`] 与 [`EasingFunction::ACCELERATE`]。

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 缓入（先慢后快）
    EaseIn,
    /// 缓出（先快后慢）
    EaseOut,
    /// 缓入缓出（两头慢中间快）
    #[default]
    EaseInOut,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 正弦缓入缓出
    EaseInOutSine,
    /// 三次贝塞尔曲线（控制点 (x1, y1)、(x2, y2)，x 取值 [0, 1]）
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl EasingFunction {
    /// 减速曲线 `cubic-bezier(0.36, 0.66, 0.04, 1)`：页面进入
    pub const DECELERATE: Self = Self::CubicBezier {
        x1: 0.36,
        y1: 0.66,
        x2: 0.04,
        y2: 1.0,
    };

    /// 加速曲线 `cubic-bezier(0.47, 0, 0.745, 0.715)`：页面退出
    pub const ACCELERATE: Self = Self::CubicBezier {
        x1: 0.47,
        y1: 0.0,
        x2: 0.745,
        y2: 0.715,
    };

    /// 创建三次贝塞尔缓动，x 控制点会被限制在 [0, 1]
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::CubicBezier {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值（贝塞尔曲线可能略超出 0.0 - 1.0）
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => ease_in(t),
            EasingFunction::EaseOut => ease_out(t),
            EasingFunction::EaseInOut => ease_in_out(t),
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            EasingFunction::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
        }
    }
}

/// 缓入（Cubic）
fn ease_in(t: f32) -> f32 {
    t * t * t
}

/// 缓出（Cubic）
fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// 缓入缓出（Cubic）
fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// 在进度 `progress` 处求贝塞尔曲线的 y 值
///
/// 先用 Newton-Raphson 迭代求出 x(t) = progress 对应的参数 t，再计算 y(t)。
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let mut t = progress;
    for _ in 0..8 {
        let x = bezier(x1, x2, t) - progress;
        if x.abs() < 1e-6 {
            break;
        }
        let dx = bezier_derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    bezier(y1, y2, t)
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
fn bezier(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

fn bezier_derivative(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}
