//! Parsing of REPL input lines.
//!
//! Pure functions only, so every command shape is covered by unit tests.

use crate::pool::Namespace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Watch(Namespace),
    Unwatch(Namespace),
    Status,
    Pool,
    Help,
    Quit,
}

/// Parse one input line.
///
/// # Returns
///
/// `Err` with a user-facing message when the line is not a command
pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("empty command".to_string());
    };
    let argument = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments for '{}'", verb));
    }

    let namespace = |verb: &str| {
        argument
            .ok_or_else(|| format!("usage: {} <namespace>", verb))
            .and_then(|value| Namespace::new(value).map_err(|e| e.to_string()))
    };

    match (verb, argument) {
        ("watch", _) => namespace(verb).map(ReplCommand::Watch),
        ("unwatch", _) => namespace(verb).map(ReplCommand::Unwatch),
        ("status", None) => Ok(ReplCommand::Status),
        ("pool", None) => Ok(ReplCommand::Pool),
        ("help", None) => Ok(ReplCommand::Help),
        ("quit" | "exit", None) => Ok(ReplCommand::Quit),
        ("status" | "pool" | "help" | "quit" | "exit", Some(_)) => {
            Err(format!("'{}' takes no arguments", verb))
        }
        _ => Err(format!("unknown command '{}' (try 'help')", verb)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_with_namespace() {
        // テスト項目: watch コマンドが namespace 付きで解析される
        // given (前提条件):
        let line = "watch coin-toss";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(ReplCommand::Watch(Namespace::new("coin-toss").unwrap()))
        );
    }

    #[test]
    fn test_parse_unwatch_without_namespace() {
        // テスト項目: namespace のない unwatch は使い方を返す
        // given (前提条件):
        let line = "unwatch";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(result, Err("usage: unwatch <namespace>".to_string()));
    }

    #[test]
    fn test_parse_argumentless_commands() {
        // テスト項目: 引数なしコマンドが解析される
        // given (前提条件):
        let lines = ["status", "pool", "help", "quit", "exit"];

        // when (操作):
        let results: Vec<_> = lines.iter().map(|line| parse_command(line)).collect();

        // then (期待する結果):
        assert_eq!(
            results,
            vec![
                Ok(ReplCommand::Status),
                Ok(ReplCommand::Pool),
                Ok(ReplCommand::Help),
                Ok(ReplCommand::Quit),
                Ok(ReplCommand::Quit),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_extra_arguments() {
        // テスト項目: 未知のコマンドや余分な引数はエラーになる
        // given (前提条件):
        let unknown = "bet 100";
        let extra = "watch slot dice";
        let status_arg = "status now";

        // when (操作):
        let results = [
            parse_command(unknown),
            parse_command(extra),
            parse_command(status_arg),
        ];

        // then (期待する結果):
        assert!(results.iter().all(|result| result.is_err()));
    }
}
