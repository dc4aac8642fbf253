use std::io;

use crate::models::{common::Side, world::World};
use crate::pilot::PilotError;
use crate::simulation::{MatchSummary, TurnReport};

/// 行動を決める外部エージェント（パイロット）のインターフェース
///
/// エンジンは自由文の行動を受け取るだけで、生成方法には関与しません。
pub trait IPilot {
    /// 自陣営の観測ストリーム全体を受け取り、次の行動文を返す
    fn next_action(&mut self, side: Side, context: &str) -> Result<String, PilotError>;

    /// 試合終了後の報告。既定では何も返さない
    fn debrief(&mut self, _side: Side, _context: &str) -> Result<String, PilotError> {
        Ok(String::new())
    }
}

/// ターン解決後に呼ばれる記録系コラボレータのインターフェース
///
/// 盤面の構築や判定とは切り離され、試合ループからのみ呼び出されます。
pub trait IRecorder {
    /// 試合開始時（初期観測の生成後）
    fn on_match_start(&mut self, world: &World) -> io::Result<()>;

    /// 1ターン解決ごと
    fn on_turn(&mut self, report: &TurnReport, world: &World) -> io::Result<()>;

    /// 試合終了時
    fn on_match_end(&mut self, summary: &MatchSummary) -> io::Result<()>;
}
