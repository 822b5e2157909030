//! # host-cli
//!
//! `stage-script` 的命令行宿主：解析、检查、重导出舞台变换脚本文件。
//!
//! 核心库只收集诊断；本宿主负责把诊断经 `tracing` 输出，
//! 并以退出码向调用方报告检查结果。

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use stage_script::{
    Diagnostic, DiagnosticLevel, ExportConfig, build_animation_sequence, export_script, reconcile,
};

/// 画布/分辨率尺寸（`宽x高`）
#[derive(Debug, Clone, Copy)]
struct Size {
    width: f64,
    height: f64,
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("期望 `宽x高` 格式，得到 {s:?}"))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("宽度无效: {w:?}"))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("高度无效: {h:?}"))?;
    Ok(Size { width, height })
}

#[derive(Parser)]
#[command(name = "stage-script", about = "舞台变换脚本工具", version)]
struct Cli {
    /// 工作画布尺寸
    #[arg(long, global = true, default_value = "1600x900", value_parser = parse_size)]
    canvas: Size,

    /// 脚本逻辑分辨率
    #[arg(long, global = true, default_value = "2560x1440", value_parser = parse_size)]
    base: Size,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// 解析脚本并打印指令序列
    Parse {
        /// 脚本文件路径
        file: PathBuf,

        /// 以 JSON 输出指令序列
        #[arg(long)]
        json: bool,
    },

    /// 解析并整理，报告逐实体最终状态；有警告时退出码非零
    Check {
        /// 脚本文件路径
        file: PathBuf,
    },

    /// 重新导出脚本（统一所有 setTransform 的时长）
    Export {
        /// 脚本文件路径
        file: PathBuf,

        /// 导出的统一动画时长（毫秒）
        #[arg(long, default_value_t = 500)]
        duration: u32,

        /// 默认缓动名（供脚本中空 `-ease=` 的指令使用）
        #[arg(long)]
        ease: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let (canvas, base) = (cli.canvas, cli.base);
    // 脚本逻辑坐标 → 工作坐标的换算因子
    let (scale_x, scale_y) = (canvas.width / base.width, canvas.height / base.height);

    match cli.command {
        Cmd::Parse { file, json } => {
            let text = read_script(&file)?;
            let mut parser = stage_script::Parser::new();
            let commands = parser.parse(&text, scale_x, scale_y);
            emit_diagnostics(parser.diagnostics());

            if json {
                println!("{}", serde_json::to_string_pretty(&commands)?);
            } else {
                for (index, command) in commands.iter().enumerate() {
                    println!("{:>4}  {command:?}", index + 1);
                }
            }
            info!("解析出 {} 条指令", commands.len());
        }

        Cmd::Check { file } => {
            let text = read_script(&file)?;
            let mut parser = stage_script::Parser::new();
            let commands = parser.parse(&text, scale_x, scale_y);
            emit_diagnostics(parser.diagnostics());

            let result = reconcile(&commands);
            emit_diagnostics(&result.diagnostics);

            let mut targets: Vec<_> = result.final_states.iter().collect();
            targets.sort_by(|a, b| a.0.cmp(b.0));
            for (target, state) in targets {
                println!(
                    "{target}: position=({:.2}, {:.2}) scale=({:.2}, {:.2}) rotation={:.4} 滤镜 {} 项",
                    state.position.x,
                    state.position.y,
                    state.scale.x,
                    state.scale.y,
                    state.rotation,
                    state.filters.len(),
                );
            }

            let segments = build_animation_sequence(&commands);
            info!("{} 个实体，{} 个动画段", result.final_states.len(), segments.len());

            let warnings = parser
                .diagnostics()
                .iter()
                .chain(&result.diagnostics)
                .filter(|d| d.level >= DiagnosticLevel::Warn)
                .count();
            if warnings > 0 {
                bail!("发现 {warnings} 个警告");
            }
        }

        Cmd::Export { file, duration, ease } => {
            let text = read_script(&file)?;
            let mut parser = stage_script::Parser::new();
            let commands = parser.parse(&text, scale_x, scale_y);
            emit_diagnostics(parser.diagnostics());

            let mut config = ExportConfig::new(
                duration,
                canvas.width,
                canvas.height,
                base.width,
                base.height,
            )?;
            if let Some(ease) = ease {
                config = config.with_default_easing(ease);
            }

            println!("{}", export_script(&commands, &config));
        }
    }

    Ok(())
}

fn read_script(file: &PathBuf) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("读取脚本失败: {}", file.display()))
}

fn emit_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        match diag.level {
            DiagnosticLevel::Info => info!("{diag}"),
            _ => warn!("{diag}"),
        }
    }
}
