//! # Command モジュール
//!
//! パイロットが返す自由文の行動を、決まった語彙のコマンドに解釈します。
//!
//! 解釈は優先順位付きのルール表（述語とコンストラクタの組）を先頭から評価し、
//! 最初に一致したルールを採用します。「turn」と「move」の両方を含むような
//! 曖昧な文でも、必ず表の順序で決まります。

use std::fmt;

use crate::scenario::RulesConfig;

/// 解釈済みの行動
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TurnLeft(f64),
    TurnRight(f64),
    MoveForward(f64),
    MoveBackward(f64),
    Fire,
    Unparsed,
}

impl Command {
    pub fn outcome(&self) -> TurnOutcome {
        TurnOutcome {
            fired: matches!(self, Command::Fire),
            parsed: !matches!(self, Command::Unparsed),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::TurnLeft(d) => write!(f, "turn left {} deg", d),
            Command::TurnRight(d) => write!(f, "turn right {} deg", d),
            Command::MoveForward(m) => write!(f, "move forward {} m", m),
            Command::MoveBackward(m) => write!(f, "move backward {} m", m),
            Command::Fire => f.write_str("fire"),
            Command::Unparsed => f.write_str("unparsed"),
        }
    }
}

/// コマンド適用の副作用フラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    pub fired: bool,
    pub parsed: bool,
}

/// 数値の種類（既定値と上限の選択に使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Magnitude {
    Turn,
    Move,
    None,
}

/// 解釈ルール: 小文字化した行動文に対する述語と、コマンドの生成
struct Rule {
    matches: fn(&str) -> bool,
    magnitude: Magnitude,
    build: fn(f64) -> Command,
}

const RULES: &[Rule] = &[
    Rule {
        matches: |t| t.contains("turn") && t.contains("left"),
        magnitude: Magnitude::Turn,
        build: Command::TurnLeft,
    },
    Rule {
        matches: |t| t.contains("turn") && t.contains("right"),
        magnitude: Magnitude::Turn,
        build: Command::TurnRight,
    },
    Rule {
        matches: |t| t.contains("move") && t.contains("forward"),
        magnitude: Magnitude::Move,
        build: Command::MoveForward,
    },
    Rule {
        matches: |t| t.contains("move") && t.contains("back"),
        magnitude: Magnitude::Move,
        build: Command::MoveBackward,
    },
    Rule {
        matches: |t| t.contains("fire"),
        magnitude: Magnitude::None,
        build: |_| Command::Fire,
    },
];

/// 行動文から最初の10進整数を取り出す
///
/// 符号や小数点は見ません（"-30" は 30、"12.5" は 12）。
pub fn first_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<f64>().ok()
}

/// 自由文の行動をコマンドに解釈
///
/// 失敗はなく、語彙外の文は常に `Command::Unparsed` になります。
pub fn interpret(action: &str, rules: &RulesConfig) -> Command {
    let text = action.to_lowercase();
    let number = first_number(&text);

    RULES
        .iter()
        .find(|rule| (rule.matches)(&text))
        .map(|rule| {
            let magnitude = match rule.magnitude {
                Magnitude::Turn => number.unwrap_or(rules.default_turn_deg).min(rules.turn_cap_deg),
                Magnitude::Move => number.unwrap_or(rules.default_move_m).min(rules.move_cap_m),
                Magnitude::None => 0.0,
            };
            (rule.build)(magnitude)
        })
        .unwrap_or(Command::Unparsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RulesConfig {
        RulesConfig::default()
    }

    #[test]
    fn test_basic_vocabulary() {
        assert_eq!(interpret("Turn left 30 degrees", &rules()), Command::TurnLeft(30.0));
        assert_eq!(interpret("TURN RIGHT 10", &rules()), Command::TurnRight(10.0));
        assert_eq!(interpret("Move forward 20 m", &rules()), Command::MoveForward(20.0));
        assert_eq!(interpret("move backward 5 m", &rules()), Command::MoveBackward(5.0));
        assert_eq!(interpret("move back", &rules()), Command::MoveBackward(50.0));
        assert_eq!(interpret("Fire!", &rules()), Command::Fire);
    }

    #[test]
    fn test_caps_apply_to_requested_magnitudes() {
        for requested in [0u32, 1, 44, 45, 46, 50, 51, 500, 100000] {
            let turn = interpret(&format!("turn left {}", requested), &rules());
            assert_eq!(turn, Command::TurnLeft((requested as f64).min(45.0)));
            let mv = interpret(&format!("move forward {} m", requested), &rules());
            assert_eq!(mv, Command::MoveForward((requested as f64).min(50.0)));
        }
    }

    #[test]
    fn test_missing_magnitude_defaults() {
        assert_eq!(interpret("move forward", &rules()), Command::MoveForward(50.0));
        assert_eq!(interpret("turn right", &rules()), Command::TurnRight(45.0));
    }

    #[test]
    fn test_first_number_wins() {
        assert_eq!(interpret("move forward 20 m then 40 m", &rules()), Command::MoveForward(20.0));
        assert_eq!(first_number("I will turn right by -30.5 degrees"), Some(30.0));
        assert_eq!(first_number("no digits here"), None);
    }

    #[test]
    fn test_priority_order_first_match_wins() {
        // turn+left は move+forward より優先
        assert_eq!(
            interpret("Move forward after we turn left 10", &rules()),
            Command::TurnLeft(10.0)
        );
        // turn+left は turn+right より優先
        assert_eq!(
            interpret("turn right, no wait, left 20", &rules()),
            Command::TurnLeft(20.0)
        );
        // move+forward は fire より優先
        assert_eq!(interpret("move forward 10 and fire", &rules()), Command::MoveForward(10.0));
        // "feedback" の "back" でも move+back に一致する
        assert_eq!(interpret("move, feedback 3", &rules()), Command::MoveBackward(3.0));
    }

    #[test]
    fn test_unparsed_text() {
        let command = interpret("I stay still and wait for the enemy.", &rules());
        assert_eq!(command, Command::Unparsed);
        assert_eq!(command.outcome(), TurnOutcome { fired: false, parsed: false });
        assert_eq!(interpret("", &rules()), Command::Unparsed);
        // 動詞だけで方向が無い
        assert_eq!(interpret("turn 30", &rules()), Command::Unparsed);
    }

    #[test]
    fn test_outcome_flags() {
        assert_eq!(Command::Fire.outcome(), TurnOutcome { fired: true, parsed: true });
        assert_eq!(Command::MoveForward(1.0).outcome(), TurnOutcome { fired: false, parsed: true });
    }

    #[test]
    fn test_custom_caps_from_rules() {
        let custom = RulesConfig {
            move_cap_m: 25.0,
            turn_cap_deg: 15.0,
            default_turn_deg: 10.0,
            ..RulesConfig::default()
        };
        assert_eq!(interpret("move forward 40", &custom), Command::MoveForward(25.0));
        assert_eq!(interpret("turn left", &custom), Command::TurnLeft(10.0));
    }
}
