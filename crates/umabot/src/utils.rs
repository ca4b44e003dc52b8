use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;

/// 等待回车，出错退出前让用户看到信息
pub fn pause() -> Result<()> {
    print!("{}", "按回车键继续...".yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

/// 配置文件不在当前目录时给出提示
pub fn check_working_dir(config_path: &str) -> Result<bool> {
    if fs_err::exists(config_path)? {
        return Ok(true);
    }
    println!(
        "{}",
        format!("当前目录下没有 {config_path}，使用默认配置。请在程序所在目录运行").yellow()
    );
    Ok(false)
}
