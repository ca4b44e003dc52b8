use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver}
};

use anyhow::{Result, anyhow};
use colored::Colorize;
use log::{info, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::protocol::TurnStatus;

pub fn format_err<E: Debug>(text: String, cause: E) -> anyhow::Error {
    anyhow!("{} ->\n{cause:?}", text.red())
}

/// 监听回合文件目录
pub struct TurnFileWatcher {
    pub watcher: RecommendedWatcher,
    pub rx: Receiver<notify::Result<Event>>,
    pub dir: PathBuf,
    /// 文件内容缓存, 用于判断是否修改
    pub contents: String
}

impl TurnFileWatcher {
    pub fn init(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !fs_err::exists(&dir)? {
            warn!("回合文件目录 {} 不存在，已创建", dir.display());
            fs_err::create_dir_all(&dir)?;
        }
        info!("{}", format!("开始监听 {}", dir.display()).green());
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(Self {
            watcher,
            rx,
            dir,
            contents: String::new()
        })
    }

    /// 捕获指定文件修改时的内容
    fn do_poll(&mut self, full_path: &Path) -> Result<String> {
        loop {
            let event = self.rx.recv()??;
            let touched = event.paths.iter().any(|p| p.file_name() == full_path.file_name());
            if touched && matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) && full_path.exists() {
                return Ok(fs_err::read_to_string(full_path)?);
            }
        }
    }

    /// 等待直到指定文件内容改变
    pub fn watch(&mut self, filename: &str) -> Result<String> {
        let full_path = self.dir.join(filename);
        // 初始化时尝试直接读取文件内容
        if self.contents.is_empty() && full_path.exists() {
            let contents = fs_err::read_to_string(&full_path)
                .map_err(|e| format_err(format!("读取 {filename} 出错"), e))?;
            self.contents = contents.clone();
            return Ok(contents);
        }
        loop {
            let contents = self
                .do_poll(&full_path)
                .map_err(|e| format_err(format!("监听 {filename} 出错"), e))?;
            // 写入过程中可能读到空文件
            if !contents.trim().is_empty() && contents != self.contents {
                self.contents = contents.clone();
                return Ok(contents);
            }
        }
    }
}

/// 解析回合文件并提供详细错误信息
pub fn parse_turn(contents: &str) -> Result<TurnStatus> {
    serde_json::from_str(contents).map_err(|e| format_err("回合数据格式错误".to_string(), e))
}
