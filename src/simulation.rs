//! # Simulation モジュール
//!
//! 戦車戦シミュレーションの中核となるターン制御エンジンを提供します。
//!
//! 1ターンは必ず次の順序で完結し、途中で中断されることはありません。
//!
//! 1. **行動解釈**: 自由文の行動をコマンドに変換
//! 2. **運動/射撃**: 移動・旋回を適用、射撃なら相手に対する命中判定
//! 3. **終了判定**: 命中なら射手の勝利、盤面外なら相手の勝利
//! 4. **観測**: 継続する場合のみ、行動した戦車の観測を再計算して隠蔽フラグを更新
//!
//! ターンは青→赤の順に厳密に交互で、`max_turn_pairs` に達すると勝敗なし（`Ongoing`）で終わります。
//! 同じシードと同じ行動列からは常に同じ試合が再現されます。
//!
//! ## 使用例
//!
//! ```rust
//! use tanksim::models::Side;
//! use tanksim::scenario::ScenarioConfig;
//! use tanksim::simulation::{MatchStatus, SimulationEngine};
//!
//! let scenario = ScenarioConfig::default();
//! let mut engine = SimulationEngine::new(&scenario, 0);
//! let report = engine.take_turn(Side::Blue, "move forward 50 m").unwrap();
//! assert_eq!(report.status, MatchStatus::Ongoing);
//! ```

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    command::{Command, TurnOutcome, interpret},
    common::Side,
    engagement::{BoardStatus, FireResult, check_board_limits, check_fire_hit},
    sensor::{Observation, observe},
    traits::{IPilot, IRecorder},
    world::World,
};
use crate::scenario::{BriefingConfig, RulesConfig, ScenarioConfig};

/// 解釈できなかった行動に対する訂正文
pub const CORRECTION_NOTICE: &str =
    "Sorry, that action was not understood. Please choose from the list of possible actions above.\n";

const WINNER_DEBRIEF: &str = "Congratulations on your victory! Please tell your Captain how and why you won the battle. Limit your response to 5 sentences.\n";
const LOSER_DEBRIEF: &str =
    "Too bad! Please tell your Captain how and why you lost the battle. Limit your response to 5 sentences.\n";

/// 試合の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Ongoing,
    BlueVictory,
    RedVictory,
}

impl MatchStatus {
    pub fn victory(side: Side) -> Self {
        match side {
            Side::Blue => MatchStatus::BlueVictory,
            Side::Red => MatchStatus::RedVictory,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            MatchStatus::Ongoing => None,
            MatchStatus::BlueVictory => Some(Side::Blue),
            MatchStatus::RedVictory => Some(Side::Red),
        }
    }

    pub fn is_terminal(self) -> bool {
        self != MatchStatus::Ongoing
    }

    /// 外部に返す状態トークン
    pub fn token(self) -> &'static str {
        match self {
            MatchStatus::Ongoing => "Continue",
            MatchStatus::BlueVictory => "Blue victory!",
            MatchStatus::RedVictory => "Red victory!",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// 1ターンの解決結果
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// このターン終了後の通算ステップ数（1始まり）
    pub step: u64,
    pub side: Side,
    pub action: String,
    pub command: Command,
    pub outcome: TurnOutcome,
    pub fire: Option<FireResult>,
    pub drowned: bool,
    pub status: MatchStatus,
    /// 継続した場合の観測
    pub observation: Option<Observation>,
    /// このターンで行動側のストリームに追加された文章
    pub transcript: String,
}

/// 試合全体の結果
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub status: MatchStatus,
    pub steps: u64,
    pub blue_stream: String,
    pub red_stream: String,
}

/// シミュレーションエラー
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("試合は既に終了しています: {0}")]
    MatchOver(MatchStatus),
    #[error("手番ではありません: {got} が行動しようとしましたが手番は {expected} です")]
    OutOfTurn { expected: Side, got: Side },
    #[error("記録エラー: {0}")]
    Recorder(#[from] std::io::Error),
}

pub struct SimulationEngine {
    pub world: World,
    pub rules: RulesConfig,
    pub step_count: u64,
    pub status: MatchStatus,
    pub max_turn_pairs: u32,
    pub max_action_chars: usize,
    pub verbose_level: u8,
    next_side: Side,
    blue_stream: String,
    red_stream: String,
}

impl SimulationEngine {
    /// シナリオから盤面を構築し、両陣営の初期ストリームを作成
    ///
    /// 林の配置には `sim.seed` で初期化した乱数源を使います。
    pub fn new(scenario: &ScenarioConfig, verbose_level: u8) -> Self {
        let mut rng = StdRng::seed_from_u64(scenario.sim.seed);
        let world = World::new(scenario, &mut rng);
        Self::with_world(world, scenario, verbose_level)
    }

    /// 構築済みの盤面でエンジンを作成
    pub fn with_world(world: World, scenario: &ScenarioConfig, verbose_level: u8) -> Self {
        let mut engine = Self {
            world,
            rules: scenario.rules.clone(),
            step_count: 0,
            status: MatchStatus::Ongoing,
            max_turn_pairs: scenario.sim.max_turn_pairs,
            max_action_chars: scenario.sim.max_action_chars,
            verbose_level,
            next_side: Side::Blue,
            blue_stream: String::new(),
            red_stream: String::new(),
        };
        engine.initialize(&scenario.briefing);
        engine
    }

    fn initialize(&mut self, briefing: &BriefingConfig) {
        for side in [Side::Blue, Side::Red] {
            let orders = match side {
                Side::Blue => briefing.blue_orders.as_deref(),
                Side::Red => briefing.red_orders.as_deref(),
            };
            let mut stream = briefing.intro.clone();
            match orders {
                Some(orders) => {
                    stream.push_str("You hear your Captain's voice coming through the radio: \n");
                    stream.push_str(orders);
                    stream.push_str("...\n\nYour Captain's voice fades into static.\n");
                    stream.push_str("Your must consider your Captain's orders and take one of the following possible actions. ");
                }
                None => stream.push_str("You must take one of the following possible actions. "),
            }
            stream.push_str(&format!(
                "You can turn left or right up to {} degrees, move forward or backward up to {} m, or fire your turret.\n",
                self.rules.turn_cap_deg, self.rules.move_cap_m
            ));
            let observation = self.observe_for(side);
            stream.push_str(&observation.to_string());
            *self.stream_mut(side) = stream;
        }

        if self.verbose_level > 0 {
            info!(
                groves = self.world.groves.len(),
                blue_x = self.world.blue.position.x,
                blue_y = self.world.blue.position.y,
                red_x = self.world.red.position.x,
                red_y = self.world.red.position.y,
                "MATCH_INITIALIZED: 盤面を初期化しました"
            );
        }
    }

    /// 陣営ごとの観測ストリーム（パイロットに渡す文脈）
    pub fn stream(&self, side: Side) -> &str {
        match side {
            Side::Blue => &self.blue_stream,
            Side::Red => &self.red_stream,
        }
    }

    fn stream_mut(&mut self, side: Side) -> &mut String {
        match side {
            Side::Blue => &mut self.blue_stream,
            Side::Red => &mut self.red_stream,
        }
    }

    /// 次に行動する陣営
    pub fn next_side(&self) -> Side {
        self.next_side
    }

    /// 観測を計算し、観測者の隠蔽フラグを更新
    fn observe_for(&mut self, side: Side) -> Observation {
        let observation = {
            let viewer = self.world.tank(side);
            let target = self.world.tank(side.opponent());
            observe(viewer, target, &self.world, &self.rules)
        };
        self.world.tank_mut(side).hidden = observation.concealed;
        observation
    }

    /// 1ターンを解決
    ///
    /// # 引数
    ///
    /// * `side` - 行動する陣営（手番と一致しなければエラー）
    /// * `action` - パイロットが返した行動文
    ///
    /// # 戻り値
    ///
    /// ターンの解決結果。試合終了後の呼び出しはエラー
    pub fn take_turn(&mut self, side: Side, action: &str) -> Result<TurnReport, SimulationError> {
        if self.status.is_terminal() {
            return Err(SimulationError::MatchOver(self.status));
        }
        if side != self.next_side {
            return Err(SimulationError::OutOfTurn {
                expected: self.next_side,
                got: side,
            });
        }

        let command = interpret(action, &self.rules);
        let outcome = command.outcome();
        let mut transcript = format!("\n{}\n", action);
        let mut fire = None;
        let mut drowned = false;
        let mut observation = None;

        let (actor, opponent) = self.world.tank_and_opponent(side);
        actor.apply(&command);

        if outcome.fired {
            let result = check_fire_hit(actor, opponent, &self.rules);
            transcript.push_str(result.message());
            transcript.push('\n');
            if result.is_hit() {
                self.status = MatchStatus::victory(side);
            }
            fire = Some(result);
        }

        if !self.status.is_terminal()
            && check_board_limits(self.world.tank(side), &self.world.bounds) == BoardStatus::Drowned
        {
            let tank = self.world.tank(side);
            warn!(
                side = %side,
                x = tank.position.x,
                y = tank.position.y,
                "TANK_DROWNED: 戦車が盤面外の川に入りました"
            );
            transcript.push_str(BoardStatus::DROWNED_MESSAGE);
            transcript.push('\n');
            drowned = true;
            self.status = MatchStatus::victory(side.opponent());
        }

        if !self.status.is_terminal() {
            if !outcome.parsed {
                warn!(side = %side, action = %action, "ACTION_UNPARSED: 行動を解釈できませんでした");
                transcript.push_str(CORRECTION_NOTICE);
            }
            let obs = self.observe_for(side);
            transcript.push_str(&obs.to_string());
            observation = Some(obs);
        }

        self.stream_mut(side).push_str(&transcript);
        self.step_count += 1;
        self.next_side = side.opponent();

        let tank = self.world.tank(side);
        info!(
            step = self.step_count,
            side = %side,
            command = %command,
            x = tank.position.x,
            y = tank.position.y,
            heading = tank.heading,
            hidden = tank.hidden,
            status = %self.status,
            "TURN_RESOLVED: ターンを解決しました"
        );

        Ok(TurnReport {
            step: self.step_count,
            side,
            action: action.to_string(),
            command,
            outcome,
            fire,
            drowned,
            status: self.status,
            observation,
            transcript,
        })
    }

    /// パイロット出力を `max_action_chars` 文字に切り詰める
    fn clip(&self, text: &str) -> String {
        text.chars().take(self.max_action_chars).collect()
    }

    /// 試合を最後まで実行
    ///
    /// パイロットのエラーは空の行動（解釈不能）として扱い、試合を継続します。
    pub fn run_match(
        &mut self,
        blue: &mut dyn IPilot,
        red: &mut dyn IPilot,
        recorders: &mut [&mut dyn IRecorder],
    ) -> Result<MatchSummary, SimulationError> {
        info!(max_turn_pairs = self.max_turn_pairs, "=== 試合開始 ===");

        for recorder in recorders.iter_mut() {
            recorder.on_match_start(&self.world)?;
        }

        'pairs: for pair in 0..self.max_turn_pairs {
            if self.verbose_level > 0 {
                info!("ターン {} / {} を開始", pair + 1, self.max_turn_pairs);
            }

            for side in [Side::Blue, Side::Red] {
                let pilot: &mut dyn IPilot = match side {
                    Side::Blue => &mut *blue,
                    Side::Red => &mut *red,
                };
                let raw = match pilot.next_action(side, self.stream(side)) {
                    Ok(action) => action,
                    Err(e) => {
                        warn!(side = %side, error = %e, "PILOT_FAILED: パイロットが行動を返しませんでした");
                        String::new()
                    }
                };
                let action = self.clip(&raw);

                let report = self.take_turn(side, &action)?;
                for recorder in recorders.iter_mut() {
                    recorder.on_turn(&report, &self.world)?;
                }

                if report.status.is_terminal() {
                    break 'pairs;
                }
            }
        }

        if let Some(winner) = self.status.winner() {
            self.debrief(winner, blue, red);
        }

        info!(
            status = %self.status,
            steps = self.step_count,
            "MATCH_FINISHED: 試合が終了しました"
        );

        let summary = MatchSummary {
            status: self.status,
            steps: self.step_count,
            blue_stream: self.blue_stream.clone(),
            red_stream: self.red_stream.clone(),
        };

        for recorder in recorders.iter_mut() {
            recorder.on_match_end(&summary)?;
        }

        Ok(summary)
    }

    /// 勝敗を両陣営に通知し、試合後の報告を求める
    fn debrief(&mut self, winner: Side, blue: &mut dyn IPilot, red: &mut dyn IPilot) {
        let token = self.status.token();
        for side in [Side::Blue, Side::Red] {
            let stream = self.stream_mut(side);
            stream.push_str(&format!("\n{}\n", token));
            stream.push_str(if side == winner { WINNER_DEBRIEF } else { LOSER_DEBRIEF });
        }

        for side in [Side::Blue, Side::Red] {
            let pilot: &mut dyn IPilot = match side {
                Side::Blue => &mut *blue,
                Side::Red => &mut *red,
            };
            match pilot.debrief(side, self.stream(side)) {
                Ok(reply) if !reply.is_empty() => {
                    let reply = self.clip(&reply);
                    debug!(side = %side, reply = %reply, "DEBRIEF");
                    let stream = self.stream_mut(side);
                    stream.push_str(&reply);
                    stream.push('\n');
                }
                Ok(_) => {}
                Err(e) => warn!(side = %side, error = %e, "試合後の報告を取得できませんでした"),
            }
        }
    }
}
