use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use edit_overlay::io::{
    BaseReader, ChangesWriter, JsonBaseReader, JsonChangesWriter, JsonScriptReader, ScriptReader,
};
use edit_overlay::utils::truncate_for_display;
use edit_overlay::{EditorConfig, GridEditor, SUPPORTED_EXTENSIONS};

#[derive(Parser)]
#[command(name = "edit_overlay")]
#[command(about = "在只读表格数据上重放编辑，输出待定变更")]
#[command(version)]
struct Cli {
    /// 基础数据集JSON文件路径（对象数组）
    #[arg(short, long)]
    base: PathBuf,

    /// 标识字段名（优先于配置文件）
    #[arg(long)]
    id_field: Option<String>,

    /// 编辑器配置JSON文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 编辑脚本JSON文件
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// 输出变更JSON文件路径（不指定则打印到标准输出）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 显示投影视图
    #[arg(long)]
    view: bool,

    /// 显示变更统计信息
    #[arg(long)]
    stats: bool,

    /// 静默模式(仅输出错误)
    #[arg(long)]
    quiet: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);
    validate_input(&cli.base)?;

    let config = load_config(&cli)?;
    let rows = JsonBaseReader
        .read(&cli.base)
        .with_context(|| format!("读取基础数据失败: {:?}", cli.base))?;
    let mut editor = GridEditor::new(rows, config).context("构建编辑器失败")?;

    if let Some(script_path) = &cli.script {
        handle_script(&cli, &mut editor, script_path)?;
    }

    if cli.view {
        print_view(&editor)?;
    }

    if cli.stats {
        println!("{}", editor.stats());
        for entry in editor.history().iter() {
            println!("  {}", entry.describe());
        }
    }

    handle_output(&cli, &editor)
}

/// 初始化日志（RUST_LOG 优先）
fn init_logging(cli: &Cli) {
    let default_filter = if cli.verbose { "edit_overlay=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 验证输入文件
fn validate_input(input: &Path) -> Result<()> {
    if !input.exists() {
        bail!("输入文件不存在: {:?}", input);
    }

    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    if !SUPPORTED_EXTENSIONS.iter().any(|&ext| Some(ext) == extension.as_deref()) {
        bail!("输入文件必须是JSON文件");
    }

    Ok(())
}

/// 加载配置：配置文件 + 命令行覆盖
fn load_config(cli: &Cli) -> Result<EditorConfig> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::from_json_file(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?,
        None => EditorConfig::default(),
    };

    if let Some(field) = &cli.id_field {
        config.identity_field = field.clone();
    }

    Ok(config)
}

/// 重放编辑脚本
fn handle_script(cli: &Cli, editor: &mut GridEditor, script_path: &Path) -> Result<()> {
    if !script_path.exists() {
        bail!("编辑脚本不存在: {:?}", script_path);
    }

    let script = JsonScriptReader
        .read(script_path)
        .with_context(|| format!("解析编辑脚本失败: {:?}", script_path))?;

    if !cli.quiet {
        println!("准备重放 {} 个编辑步骤", script.len());
    }

    let report = script.run(editor).context("重放编辑脚本失败")?;

    if !cli.quiet {
        println!(
            "重放完成: {} 步, 变化条目 {} 次, 当前待定修改 {} 处",
            report.steps,
            report.affected,
            editor.change_count()
        );
    }

    Ok(())
}

/// 打印投影视图
fn print_view(editor: &GridEditor) -> Result<()> {
    println!("\n投影视图:");
    for projected in editor.project() {
        let row_json = serde_json::to_string(projected.row).context("序列化行失败")?;
        println!(
            "{} [{}] {}",
            projected.state.marker(),
            projected.id,
            truncate_for_display(&row_json, 80)
        );
    }
    println!();
    Ok(())
}

/// 输出变更快照
fn handle_output(cli: &Cli, editor: &GridEditor) -> Result<()> {
    let snapshot = editor.get_changes();

    match &cli.output {
        Some(path) => {
            JsonChangesWriter
                .write(&snapshot, path)
                .with_context(|| format!("写入变更文件失败: {:?}", path))?;
            if !cli.quiet {
                println!("变更已写入: {:?}", path);
            }
        }
        None if !cli.quiet => {
            let json = serde_json::to_string_pretty(&snapshot).context("序列化变更失败")?;
            println!("{}", json);
        }
        None => {}
    }

    Ok(())
}
