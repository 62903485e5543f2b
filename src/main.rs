use anyhow::{Context, Result};
use log::{info, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use supports_query::{tokenize, QueryConfig, SupportsCondition};

const HELP: &str = "\
命令:
  cond <condition>   解析 @supports 条件并显示 AST
  check <feature>    检查特性能否通过当前条件 (true / false / undetermined)
  tokens <condition> 显示条件的 token 序列
  help               显示帮助
  quit | exit        退出";

/// 交互命令
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Cond(&'a str),
    Check(&'a str),
    Tokens(&'a str),
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name {
        "" => Command::Empty,
        "cond" => Command::Cond(arg),
        "check" => Command::Check(arg),
        "tokens" => Command::Tokens(arg),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(name),
    }
}

/// 加载配置，失败时使用默认配置
fn load_config() -> QueryConfig {
    match QueryConfig::from_json_file(QueryConfig::DEFAULT_FILE) {
        Ok(config) => {
            info!("loaded {}", QueryConfig::DEFAULT_FILE);
            config
        }
        Err(e) => {
            warn!("{}, using default config", e);
            QueryConfig::default()
        }
    }
}

struct Session {
    config: QueryConfig,
    condition: Option<SupportsCondition>,
}

impl Session {
    /// 执行一条命令，返回 `false` 表示退出
    fn handle(&mut self, command: Command<'_>) -> Result<bool> {
        match command {
            Command::Empty => {}
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(false),
            Command::Unknown(name) => println!("未知命令 '{}'，输入 help 查看帮助", name),
            Command::Cond(condition) => match SupportsCondition::with_config(condition, &self.config) {
                Ok(parsed) => {
                    let json = serde_json::to_string_pretty(parsed.ast())
                        .context("failed to serialize AST")?;
                    println!("✓ 解析成功\n{}", json);
                    self.condition = Some(parsed);
                }
                Err(e) => println!("✗ 解析失败: {}", e),
            },
            Command::Check(feature) => match &self.condition {
                None => println!("尚未设置条件，请先使用 cond <condition>"),
                Some(condition) => match condition.check_property(feature) {
                    Ok(Some(answer)) => println!("{}", answer),
                    Ok(None) => println!("undetermined"),
                    Err(e) => println!("✗ 查询失败: {}", e),
                },
            },
            Command::Tokens(condition) => {
                for token in tokenize(condition) {
                    let kind = match token.feature() {
                        Some(feature) => format!("{:?}", feature.kind),
                        None => format!("{:?}", token.kind),
                    };
                    println!(
                        "{:>4}..{:<4} {:<12} {}",
                        token.span.start, token.span.end, kind, token.raw
                    );
                }
            }
        }
        Ok(true)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config();
    let history_file = config.history_file.clone();

    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    if let Some(path) = &history_file {
        if let Err(e) = editor.load_history(path) {
            info!("no history loaded from {}: {}", path.display(), e);
        }
    }

    println!("--- @supports 条件查询 ---");
    println!("{}", HELP);

    let mut session = Session {
        config,
        condition: None,
    };

    loop {
        let line = match editor.readline("supports> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        };
        if !line.trim().is_empty() {
            editor
                .add_history_entry(line.as_str())
                .context("failed to record history")?;
        }
        if !session.handle(parse_command(&line))? {
            break;
        }
    }

    if let Some(path) = &history_file {
        editor
            .save_history(path)
            .with_context(|| format!("failed to save history to {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("cond (display: grid) and (gap: 1rem)"),
            Command::Cond("(display: grid) and (gap: 1rem)")
        );
        assert_eq!(parse_command("  check   display: grid "), Command::Check("display: grid"));
        assert_eq!(parse_command("tokens (a:1)"), Command::Tokens("(a:1)"));
        assert_eq!(parse_command("exit"), Command::Quit);
        assert_eq!(parse_command("help"), Command::Help);
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(parse_command("eval x"), Command::Unknown("eval"));
    }

    #[test]
    fn test_session_keeps_last_condition() {
        let mut session = Session {
            config: QueryConfig::default(),
            condition: None,
        };
        assert!(session.handle(Command::Check("display: grid")).unwrap());
        assert!(session.handle(Command::Cond("(display: grid)")).unwrap());
        assert!(session.condition.is_some());

        // 解析失败不会覆盖已有条件
        assert!(session.handle(Command::Cond("(a) )")).unwrap());
        assert_eq!(
            session.condition.as_ref().map(|c| c.check_property("display:grid").unwrap()),
            Some(Some(true))
        );
        assert!(session.handle(Command::Tokens("(a:1) and selector(p)")).unwrap());
        assert!(!session.handle(Command::Quit).unwrap());
    }
}
