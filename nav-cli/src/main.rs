//! # Nav CLI
//!
//! 在终端中执行导航场景，打印每一步的视图栈和过渡动画。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p nav-cli -- run scenarios/checkout.json
//! cargo run -p nav-cli -- run scenarios/checkout.json --mode ios --rtl --json
//! cargo run -p nav-cli -- env environments.json --name staging
//! cargo run -p nav-cli -- styles
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use nav_host::{Environment, HostConfig, Scenario, ScenarioReport, ScenarioRunner};
use nav_runtime::{AnimationNode, BuilderRegistry, PlatformMode, TransitionStyle};
use tracing::Level;

#[derive(Parser)]
#[command(name = "nav")]
#[command(about = "导航场景执行工具 - 打印视图栈与过渡动画")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行场景文件
    Run {
        /// 场景文件（JSON）
        scenario: PathBuf,

        /// 宿主配置文件（默认：config.json，不存在时使用默认配置）
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// 平台风格（覆盖配置）
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// 从右到左布局（覆盖配置）
        #[arg(long)]
        rtl: bool,

        /// 默认动画名（覆盖配置）
        #[arg(long)]
        default_animation: Option<String>,

        /// 环境文件：启动前选择环境，选中的环境名和合并后的配置输出到 stderr
        #[arg(long)]
        environments: Option<PathBuf>,

        /// 环境名（多个具名环境时必须指定）
        #[arg(long, requires = "environments")]
        env: Option<String>,

        /// 以 JSON 输出完整报告（含动画树）
        #[arg(long)]
        json: bool,
    },

    /// 选择环境并打印合并后的配置
    Env {
        /// 环境文件（JSON）
        file: PathBuf,

        /// 环境名
        #[arg(short, long)]
        name: Option<String>,
    },

    /// 列出已注册的过渡动画
    Styles,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Ios,
    Md,
}

impl From<ModeArg> for PlatformMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ios => PlatformMode::Ios,
            ModeArg::Md => PlatformMode::Md,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            mode,
            rtl,
            default_animation,
            environments,
            env,
            json,
        } => {
            if let Some(path) = environments {
                let mut environment = Environment::from_path(path);
                if let Some(name) = env {
                    environment = environment.with_selection(name);
                }
                environment.ready().context("环境配置失败")?;
                eprintln!("{}", environment_summary(&environment)?);
            }

            let mut config = HostConfig::load(&config);
            if let Some(mode) = mode {
                config.navigation.mode = mode.into();
            }
            if rtl {
                config.navigation.rtl = true;
            }
            if let Some(name) = default_animation {
                config.navigation.default_animation = TransitionStyle::from(name.as_str());
            }
            config.validate().context("配置无效")?;

            let scenario = Scenario::load(&scenario).context("加载场景失败")?;
            let report = ScenarioRunner::new(&scenario, &config)
                .run(&scenario)
                .context("场景执行失败")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Env { file, name } => {
            let mut environment = Environment::from_path(file);
            if let Some(name) = name {
                environment = environment.with_selection(name);
            }
            let config = environment.ready().context("环境配置失败")?.clone();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Styles => {
            for style in BuilderRegistry::with_defaults().styles() {
                println!("{style}");
            }
        }
    }

    Ok(())
}

/// 选中的环境名及合并后的配置
fn environment_summary(environment: &Environment) -> anyhow::Result<String> {
    Ok(format!(
        "环境: {}\n{}",
        environment.selected().unwrap_or(nav_host::environment::DEFAULT_KEY),
        serde_json::to_string_pretty(environment.config())?
    ))
}

fn print_report(report: &ScenarioReport) {
    if let Some(name) = &report.name {
        println!("场景: {name}");
    }

    for step in &report.steps {
        let mut line = format!("{:>3}. {:<22} [{}]", step.index, step.op, step.stack.join(" > "));
        if let Some(outcome) = &step.back_outcome {
            line.push_str(&format!("  返回信号: {outcome}"));
        }
        if step.navigated == Some(false) {
            line.push_str("  (未导航)");
        }
        println!("{line}");

        if let Some(plan) = &step.plan {
            println!(
                "       {} {:?}, {} 个节点, {:.2}s",
                plan.style,
                plan.direction,
                plan.root.node_count(),
                plan.root.duration().unwrap_or_default()
            );
            print_tree(&plan.root, 2);
        }
    }
}

fn print_tree(node: &AnimationNode, depth: usize) {
    for child in node.children() {
        let properties: Vec<String> = child
            .keyframes()
            .iter()
            .map(|k| format!("{:?}", k.property))
            .collect();
        println!(
            "{:indent$}- {} x{} {}",
            "",
            child.label(),
            child.targets().len(),
            properties.join(","),
            indent = depth * 4
        );
        print_tree(child, depth + 1);
    }
}
