// apps/cm_cli/src/commands/mod.rs

//! 子命令实现

pub mod info;
pub mod intersect;
pub mod measure;

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// 把 JSON 结果写到文件或标准输出
pub fn write_json(value: &serde_json::Value, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("创建输出文件失败: {}", path.display()))?;
            let mut writer = std::io::BufWriter::new(file);
            serde_json::to_writer(&mut writer, value)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, value)?;
            writeln!(handle)?;
        }
    }
    Ok(())
}
