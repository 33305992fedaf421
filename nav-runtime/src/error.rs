//! # Error 模块
//!
//! 定义 nav-runtime 中使用的错误类型。
//!
//! 栈深度相关的情况（没有上一页、已在根页面）不是错误，
//! 由导航操作返回 `Ok(false)` 表示。

use thiserror::Error;

/// 导航错误
///
/// 只来自渲染层，核心原样向调用方传播。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    /// 路由未找到
    #[error("路由 '{url}' 未找到")]
    RouteNotFound { url: String },

    /// 视图栈为空
    #[error("视图栈为空，无法执行此操作")]
    EmptyStack,

    /// 渲染层内部错误
    #[error("渲染层错误: {message}")]
    Render { message: String },
}

/// Result 类型别名
pub type NavResult<T> = Result<T, NavError>;
