//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 nav-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `scenario-check`: 检查场景文件（解析、执行、断言、动画名）
//! - `plan-dump`: 导出场景中每次过渡的动画树

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use nav_host::{HostConfig, Scenario, ScenarioRunner, Step};
use nav_runtime::BuilderRegistry;
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    let status = cmd.status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "nav-runtime", "--all-features", "--html"]);
            run(
                "cargo llvm-cov -p nav-runtime --all-features --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除 tool crates（xtask/nav-cli）以免稀释信号
            let mut cov = Command::new("cargo");
            cov.args([
                "llvm-cov",
                "--workspace",
                "--exclude",
                "xtask",
                "--exclude",
                "nav-cli",
                "--all-features",
                "--html",
            ]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --exclude nav-cli --all-features --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "scenario-check" => {
            let path = args.next();
            scenario_check(path.as_deref())?;
        }
        "plan-dump" => {
            let Some(path) = args.next() else {
                anyhow::bail!("用法: cargo xtask plan-dump <scenario.json>");
            };
            plan_dump(Path::new(&path))?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 nav-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  scenario-check  检查场景文件
  plan-dump       导出场景的动画树（JSON）

SCENARIO-CHECK:
  cargo xtask scenario-check [path]

  不带参数：检查 scenarios/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - 场景文件格式
    - 执行失败（未知路由）与断言失败
    - 未注册的动画名（会降级为 fade-scale）
    - 从未访问的路由

ALIASES (in .cargo/config.toml):
  cargo check-all      -> cargo xtask check-all
  cargo cov-runtime    -> cargo xtask cov-runtime
  cargo cov-workspace  -> cargo xtask cov-workspace
  cargo scenario-check -> cargo xtask scenario-check
"#
    );
}

//=============================================================================
// scenario-check 命令实现
//=============================================================================

/// 默认场景目录（相对于 workspace root）
const SCENARIOS_DIR: &str = "scenarios";

/// 场景检查结果
#[derive(Default)]
struct ScenarioCheckResult {
    scenarios_checked: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
}

fn scenario_check(path: Option<&str>) -> anyhow::Result<()> {
    let root = PathBuf::from(path.unwrap_or(SCENARIOS_DIR));
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
            root.display()
        );
    }

    let files = collect_scenario_files(&root)?;
    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let registry = BuilderRegistry::with_defaults();
    let mut result = ScenarioCheckResult::default();
    for file in &files {
        check_scenario_file(file, &registry, &mut result);
    }

    print_check_result(&result);

    if !result.errors.is_empty() {
        anyhow::bail!("场景检查发现错误");
    }
    Ok(())
}

/// 收集场景文件（单个文件或目录下所有 .json）
fn collect_scenario_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn check_scenario_file(file: &Path, registry: &BuilderRegistry, result: &mut ScenarioCheckResult) {
    let id = file.display().to_string();
    result.scenarios_checked += 1;

    let scenario = match Scenario::load(file) {
        Ok(s) => s,
        Err(e) => {
            result.errors.push(format!("{id}: {e}"));
            return;
        }
    };

    // 动画名与路由的静态检查
    let mut visited = BTreeSet::new();
    for step in &scenario.steps {
        match step {
            Step::Push { url, animation, .. } => {
                visited.insert(url.clone());
                if !animation.is_default() && !registry.contains(animation) {
                    result
                        .warnings
                        .push(format!("{id}: 未注册的动画 '{animation}'，将降级为 fade-scale"));
                }
            }
            Step::SetRoot { url, .. } => {
                visited.insert(url.clone());
            }
            Step::Pop { url: Some(url), .. } => {
                visited.insert(url.clone());
            }
            Step::SetDefaultAnimation { animation }
                if !animation.is_default() && !registry.contains(animation) =>
            {
                result
                    .warnings
                    .push(format!("{id}: 未注册的默认动画 '{animation}'"));
            }
            _ => {}
        }
    }
    for url in scenario.routes.keys().filter(|url| !visited.contains(*url)) {
        result.warnings.push(format!("{id}: 路由 '{url}' 从未被访问"));
    }

    if let Err(e) = ScenarioRunner::new(&scenario, &HostConfig::default()).run(&scenario) {
        result.errors.push(format!("{id}: {e}"));
    }
}

fn print_check_result(result: &ScenarioCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个场景", result.scenarios_checked);
    eprintln!();

    for error in &result.errors {
        eprintln!("[ERROR] {error}");
    }
    for warning in &result.warnings {
        eprintln!("[WARN] {warning}");
    }

    eprintln!();
    if !result.errors.is_empty() {
        eprintln!("❌ {} 个错误, {} 个警告", result.errors.len(), result.warnings.len());
    } else if !result.warnings.is_empty() {
        eprintln!("⚠️  0 个错误, {} 个警告", result.warnings.len());
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}

//=============================================================================
// plan-dump 命令实现
//=============================================================================

fn plan_dump(path: &Path) -> anyhow::Result<()> {
    let scenario = Scenario::load(path)?;
    let report = ScenarioRunner::new(&scenario, &HostConfig::default()).run(&scenario)?;
    let plans: Vec<_> = report.plans().collect();
    println!("{}", serde_json::to_string_pretty(&plans)?);
    Ok(())
}
