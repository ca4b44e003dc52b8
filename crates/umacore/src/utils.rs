use std::{
    io::Write,
    sync::{Mutex, OnceLock}
};

use anyhow::{Result, anyhow};
use comfy_table::Table;
use flexi_logger::{DeferredNow, Duplicate, FileSpec, LoggerHandle, style};
use log::Record;
use serde::Serialize;

/// 日志句柄，丢弃后日志停止
pub static LOGGER: OnceLock<Mutex<LoggerHandle>> = OnceLock::new();

pub fn log_format(w: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> Result<(), std::io::Error> {
    let level = record.level();
    write!(
        w,
        "{} {}",
        style(level).paint(level.to_string()[..1].to_string()),
        style(level).paint(record.args().to_string())
    )
}

pub fn init_logger(app: &str, spec: &str) -> Result<()> {
    let handle = flexi_logger::Logger::try_with_str(spec)?
        .format_for_stderr(log_format)
        .log_to_file(FileSpec::default().directory("logs").basename(app))
        .duplicate_to_stderr(Duplicate::All)
        .start()?;
    LOGGER
        .set(Mutex::new(handle))
        .map_err(|_| anyhow!("Logger init failed"))?;
    Ok(())
}

/// 把一组可序列化的行渲染成表格，表头取第一行的字段名
pub fn make_table<T: Serialize>(data: &[T]) -> Result<Table> {
    let mut table = Table::new();
    table.set_truncation_indicator("...");
    let mut has_headers = false;
    for row in data {
        let row = serde_json::to_value(row)?;
        let fields = row
            .as_object()
            .ok_or_else(|| anyhow!("表格行必须是结构体: {row}"))?;
        if !has_headers {
            table.set_header(fields.keys());
            has_headers = true;
        }
        table.add_row(fields.values().map(cell_text));
    }
    Ok(table)
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        score: f64
    }

    #[test]
    fn test_make_table() -> Result<()> {
        let rows = [Row { name: "Option 1", score: 1.5 }, Row { name: "Option 2", score: -4.0 }];
        let text = make_table(&rows)?.to_string();
        println!("{text}");
        assert!(text.contains("Option 2"));
        assert!(text.contains("-4.0"));
        Ok(())
    }

    #[test]
    fn test_make_table_rejects_scalars() {
        assert!(make_table(&[1, 2, 3]).is_err());
    }
}
