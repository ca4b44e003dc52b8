//! umabot - 育成训练和事件选项推荐
//!
//! author: curran
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{info, warn};
use text_to_ascii_art::to_art;
use umacore::{
    event::{EventChoice, EventQuery, ScoringContext, select_choice},
    gamedata::BotConfig,
    training::{TrainingDecision, TrainingPolicy},
    utils::{init_logger, make_table}
};

use crate::{
    protocol::{
        TurnStatus,
        turnfile::{TurnFileWatcher, parse_turn},
        umasearch::HttpEventSource
    },
    utils::{check_working_dir, pause}
};

pub mod protocol;
pub mod utils;

/// 回合文件名
const TURN_FILE: &str = "thisTurn.json";

#[derive(Parser, Debug)]
#[command(name = "umabot")]
#[command(about = "育成训练和事件选项推荐")]
struct Args {
    /// 配置文件路径
    #[arg(long, default_value = "bot_config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 查询事件并推荐选项
    Event {
        /// 事件名
        name: String
    },
    /// 读取一个回合文件并给出推荐
    Train {
        /// 回合文件路径
        file: String
    },
    /// 监听回合文件，每次变化时给出推荐
    Watch
}

/// 一次运行共用的配置和组件
struct Bot {
    config: BotConfig,
    policy: TrainingPolicy,
    source: HttpEventSource
}

impl Bot {
    fn new(config: BotConfig) -> Result<Self> {
        let policy = TrainingPolicy::new(&config);
        let source = HttpEventSource::new(&config.event)?;
        Ok(Self { config, policy, source })
    }

    fn choose_event(&self, name: &str, ctx: &ScoringContext) -> EventChoice {
        let query = EventQuery::with_config(name, &self.config.event);
        select_choice(&self.source, &query, ctx, &self.config.scoring)
    }

    fn print_choice(&self, name: &str, choice: &EventChoice) -> Result<()> {
        if choice.is_informed() {
            println!("{}", make_table(&choice.options)?);
        }
        println!(
            "{}",
            format!("事件 '{name}': 选择第 {} 个选项 (共 {} 个)", choice.index, choice.total).bright_green()
        );
        Ok(())
    }

    fn run_turn(&self, status: &TurnStatus) -> Result<()> {
        let turn = status.turn_state();
        info!("{} 体力 {}%", turn.year, turn.energy);

        if let Some(name) = status.event() {
            if self.config.use_optimal_event_choices {
                let ctx = ScoringContext::for_turn(&self.config, &turn);
                let choice = self.choose_event(name, &ctx);
                self.print_choice(name, &choice)?;
            } else {
                println!("{}", format!("事件 '{name}': 未启用选项推荐，选择第 1 个选项").yellow());
            }
        }

        if status.trainings.is_empty() {
            return Ok(());
        }
        match self.policy.decide(&status.trainings, &turn) {
            TrainingDecision::Train(train) => println!("{}", format!("推荐: 训练 {train}").bright_green()),
            TrainingDecision::Rest => println!("{}", "推荐: 休息".magenta())
        }
        Ok(())
    }
}

fn load_config(path: &str) -> Result<BotConfig> {
    if check_working_dir(path)? {
        BotConfig::load(path)
    } else {
        Ok(BotConfig::default())
    }
}

/// 实际的主函数
fn main_guard() -> Result<()> {
    let args = Args::parse();
    if let Ok(art) = to_art("UMABOT 0.1".to_string(), "small", 0, 1, 0) {
        println!("{art}");
    }
    // 1. 先读取配置文件
    let config = load_config(&args.config)?;
    // 2. 根据配置初始化日志
    init_logger("umabot", &config.log_level)?;
    let bot = Bot::new(config)?;

    match args.command {
        Command::Event { name } => {
            let choice = bot.choose_event(&name, &ScoringContext::from_config(&bot.config));
            bot.print_choice(&name, &choice)?;
        }
        Command::Train { file } => {
            let contents = fs_err::read_to_string(&file)?;
            let status = parse_turn(&contents)?;
            bot.run_turn(&status)?;
        }
        Command::Watch => {
            let mut watcher = TurnFileWatcher::init(&bot.config.turn_dir)?;
            loop {
                let contents = watcher.watch(TURN_FILE)?;
                match parse_turn(&contents) {
                    Ok(status) => {
                        if let Err(e) = bot.run_turn(&status) {
                            warn!("处理回合出错: {e:?}");
                        }
                    }
                    Err(e) => println!("{}", format!("解析回合信息出错: {e}").red())
                }
                println!("----------");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    if let Err(e) = main_guard() {
        println!("{}", "umabot 出现错误，即将退出:".red());
        println!("{}", "-----------------------------------".red());
        println!("{}", format!("{e:?}").red());
        pause()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = Args::parse_from(["umabot", "event", "Dance Lesson"]);
        assert_eq!(args.config, "bot_config.toml");
        assert!(matches!(args.command, Command::Event { name } if name == "Dance Lesson"));

        let args = Args::parse_from(["umabot", "--config", "my.toml", "train", "turn/thisTurn.json"]);
        assert_eq!(args.config, "my.toml");
        assert!(matches!(args.command, Command::Train { .. }));
    }
}
