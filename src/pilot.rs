//! # Pilot モジュール
//!
//! 行動文を供給する外部エージェントの実装を提供します。
//!
//! - `ScriptedPilot`: 事前に用意した行動を順に返す（リプレイ・テスト用）
//! - `ConsolePilot`: 観測を表示して標準入力から1行読む（対話プレイ用）
//!
//! 行動スクリプトは1行1行動で、`blue:` または `red:` の接頭辞で陣営を指定します。
//! 空行と `#` で始まる行は無視します。
//!
//! ```text
//! # 青は南へ前進、赤は旋回してから射撃
//! blue: move forward 50 m
//! red: turn right 10 degrees
//! red: fire
//! ```

use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::models::{common::Side, traits::IPilot};

/// パイロットのエラー
///
/// 試合ループはこれを解釈不能の行動として扱い、試合は継続します。
#[derive(Debug, Error)]
pub enum PilotError {
    #[error("{0} パイロットの行動が尽きました")]
    Exhausted(Side),
    #[error("パイロット入出力エラー: {0}")]
    Io(#[from] io::Error),
    #[error("行動スクリプト {line} 行目: {message}")]
    Script { line: usize, message: String },
}

/// 用意された行動を先頭から返すパイロット
#[derive(Debug, Clone, Default)]
pub struct ScriptedPilot {
    actions: VecDeque<String>,
    debriefs: VecDeque<String>,
}

impl ScriptedPilot {
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            debriefs: VecDeque::new(),
        }
    }

    /// 試合後の報告文を設定
    pub fn with_debrief(mut self, text: impl Into<String>) -> Self {
        self.debriefs.push_back(text.into());
        self
    }

    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

impl IPilot for ScriptedPilot {
    fn next_action(&mut self, side: Side, _context: &str) -> Result<String, PilotError> {
        let action = self.actions.pop_front().ok_or(PilotError::Exhausted(side))?;
        debug!(side = %side, action = %action, remaining = self.actions.len(), "SCRIPTED_ACTION");
        Ok(action)
    }

    fn debrief(&mut self, _side: Side, _context: &str) -> Result<String, PilotError> {
        Ok(self.debriefs.pop_front().unwrap_or_default())
    }
}

/// 行動スクリプトを解析して陣営ごとのパイロットに分ける
pub fn parse_action_script(contents: &str) -> Result<(ScriptedPilot, ScriptedPilot), PilotError> {
    let mut blue = Vec::new();
    let mut red = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (prefix, action) = line.split_once(':').ok_or_else(|| PilotError::Script {
            line: index + 1,
            message: format!("陣営の接頭辞がありません: {}", line),
        })?;

        let side: Side = prefix.parse().map_err(|message| PilotError::Script {
            line: index + 1,
            message,
        })?;

        let action = action.trim().to_string();
        match side {
            Side::Blue => blue.push(action),
            Side::Red => red.push(action),
        }
    }

    Ok((ScriptedPilot::new(blue), ScriptedPilot::new(red)))
}

/// 行動スクリプトファイルを読み込む
pub fn load_action_script<P: AsRef<Path>>(path: P) -> Result<(ScriptedPilot, ScriptedPilot), PilotError> {
    let contents = fs::read_to_string(path)?;
    parse_action_script(&contents)
}

/// 1陣営分の行動ファイルを読み込む（接頭辞なし、1行1行動）
pub fn load_side_script<P: AsRef<Path>>(path: P) -> Result<ScriptedPilot, PilotError> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_side_script(&contents))
}

pub fn parse_side_script(contents: &str) -> ScriptedPilot {
    ScriptedPilot::new(
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#')),
    )
}

/// 1行ずつ入力を返す読み取り元
///
/// `io::Stdin` は呼び出しごとにロックするため、両陣営が同時に標準入力を使えます。
pub trait LineSource {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl LineSource for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]>> LineSource for io::Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// 標準入出力で人間が操縦するパイロット
///
/// 観測ストリームのうち前回表示以降に増えた部分だけを表示します。
pub struct ConsolePilot<R, W> {
    input: R,
    output: W,
    shown: usize,
}

impl ConsolePilot<io::Stdin, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: LineSource, W: Write> ConsolePilot<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            shown: 0,
        }
    }

    fn prompt(&mut self, side: Side, context: &str) -> Result<String, PilotError> {
        let unseen = context.get(self.shown..).unwrap_or(context);
        write!(self.output, "{}", unseen)?;
        write!(self.output, "\n[{}] > ", side)?;
        self.output.flush()?;
        self.shown = context.len();

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PilotError::Exhausted(side));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: LineSource, W: Write> IPilot for ConsolePilot<R, W> {
    fn next_action(&mut self, side: Side, context: &str) -> Result<String, PilotError> {
        self.prompt(side, context)
    }

    fn debrief(&mut self, side: Side, context: &str) -> Result<String, PilotError> {
        self.prompt(side, context)
    }
}
