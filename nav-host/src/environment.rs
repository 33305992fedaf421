//! # Environment 模块
//!
//! 启动前的环境配置选择。
//!
//! 环境文件是一个 JSON 对象：`default` 为公共配置，其他键为具名环境。
//!
//! ```json
//! {
//!   "default": { "api": "https://api.example.com", "debug": false },
//!   "staging": { "api": "https://staging.example.com" }
//! }
//! ```
//!
//! ## 选择规则
//!
//! 1. 显式指定的环境名
//! 2. 只有一个具名环境时自动选择它
//! 3. 没有具名环境时只使用 `default`
//! 4. 多个具名环境且未指定时返回 [`EnvironmentError::SelectionRequired`]
//!
//! 选中的环境浅合并到 `default` 之上。

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

/// 公共配置的键名
pub const DEFAULT_KEY: &str = "default";

/// 环境错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvironmentError {
    /// 环境文件读取失败
    #[error("环境文件 '{path}' 读取失败: {message}")]
    NotFound { path: String, message: String },

    /// 环境文件为空或格式无效
    #[error("环境文件为空或无效: {message}")]
    Invalid { message: String },

    /// 存在多个环境，需要指定
    #[error("存在多个环境，需要指定其一: {}", .available.join(", "))]
    SelectionRequired { available: Vec<String> },

    /// 指定的环境不存在
    #[error("环境 '{name}' 不存在")]
    UnknownEnvironment { name: String },
}

#[derive(Debug, Clone)]
enum Source {
    Path(PathBuf),
    Json(String),
}

/// 环境配置
#[derive(Debug, Clone)]
pub struct Environment {
    source: Source,
    selection: Option<String>,
    selected: Option<String>,
    config: Map<String, Value>,
    ready: bool,
}

impl Environment {
    /// 从文件读取环境
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::with_source(Source::Path(path.as_ref().to_path_buf()))
    }

    /// 从 JSON 文本读取环境
    pub fn from_json(content: impl Into<String>) -> Self {
        Self::with_source(Source::Json(content.into()))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            selection: None,
            selected: None,
            config: Map::new(),
            ready: false,
        }
    }

    /// 指定要使用的环境
    pub fn with_selection(mut self, name: impl Into<String>) -> Self {
        self.selection = Some(name.into());
        self
    }

    /// 解析并选择环境
    ///
    /// 成功后再次调用直接返回已合并的配置。
    pub fn ready(&mut self) -> Result<&Map<String, Value>, EnvironmentError> {
        if self.ready {
            return Ok(&self.config);
        }

        let document = self.read_document()?;
        let (name, config) = select(&document, self.selection.as_deref())?;
        tracing::info!(environment = %name, "应用环境配置");

        self.selected = Some(name);
        self.config = config;
        self.ready = true;
        Ok(&self.config)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// 选中的环境名
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// 合并后的配置
    ///
    /// 未就绪时记录错误并返回空配置。
    pub fn config(&self) -> &Map<String, Value> {
        if !self.ready {
            tracing::error!("环境配置尚未就绪，请先调用 ready()");
        }
        &self.config
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config().get(key)
    }

    fn read_document(&self) -> Result<Map<String, Value>, EnvironmentError> {
        let content = match &self.source {
            Source::Json(content) => content.clone(),
            Source::Path(path) => fs::read_to_string(path).map_err(|e| EnvironmentError::NotFound {
                path: path.display().to_string(),
                message: e.to_string(),
            })?,
        };

        let value: Value = serde_json::from_str(&content).map_err(|e| EnvironmentError::Invalid {
            message: e.to_string(),
        })?;
        match value {
            Value::Object(map) if !map.is_empty() => Ok(map),
            _ => Err(EnvironmentError::Invalid {
                message: "顶层必须是非空对象".to_string(),
            }),
        }
    }
}

fn as_object(name: &str, value: Option<&Value>) -> Result<Map<String, Value>, EnvironmentError> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(EnvironmentError::Invalid {
            message: format!("环境 '{name}' 必须是对象"),
        }),
    }
}

/// 选出环境并合并到 `default` 之上
fn select(
    document: &Map<String, Value>,
    selection: Option<&str>,
) -> Result<(String, Map<String, Value>), EnvironmentError> {
    let mut config = as_object(DEFAULT_KEY, document.get(DEFAULT_KEY))?;
    let named: Vec<String> = document
        .keys()
        .filter(|k| k.as_str() != DEFAULT_KEY)
        .cloned()
        .collect();

    let name = match selection {
        Some(name) if name == DEFAULT_KEY => return Ok((DEFAULT_KEY.to_string(), config)),
        Some(name) if document.contains_key(name) => name.to_string(),
        Some(name) => {
            return Err(EnvironmentError::UnknownEnvironment {
                name: name.to_string(),
            });
        }
        None if named.is_empty() => return Ok((DEFAULT_KEY.to_string(), config)),
        None if named.len() == 1 => named[0].clone(),
        None => return Err(EnvironmentError::SelectionRequired { available: named }),
    };

    config.extend(as_object(&name, document.get(&name))?);
    Ok((name, config))
}
