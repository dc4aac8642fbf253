use crate::models::{
    command::Command,
    common::{Position2D, Side},
};
use crate::scenario::TankConfig;

/// 戦車エージェントの状態
///
/// 位置と方位は運動モデル（`apply`）だけが変更し、
/// `hidden` は直近の観測結果で更新されます。
#[derive(Debug, Clone, PartialEq)]
pub struct TankState {
    pub side: Side,
    /// 盤面上の位置（メートル）
    pub position: Position2D,
    /// 方位（度、0=北、90=東）。保存時には正規化しない
    pub heading: f64,
    /// 視程（メートル）
    pub viewing_radius: f64,
    /// 視野の半角（度）
    pub viewing_half_width: f64,
    /// 直近の観測で林の中にいたかどうか
    pub hidden: bool,
}

impl TankState {
    pub fn new(side: Side, position: Position2D, heading: f64) -> Self {
        Self {
            side,
            position,
            heading,
            viewing_radius: 500.0,
            viewing_half_width: 90.0,
            hidden: false,
        }
    }

    pub fn from_config(side: Side, config: &TankConfig) -> Self {
        Self {
            side,
            position: config.position,
            heading: config.heading_deg,
            viewing_radius: config.viewing_radius_m,
            viewing_half_width: config.viewing_half_width_deg,
            hidden: false,
        }
    }

    /// コマンドを運動として適用
    ///
    /// 射撃と解釈不能は位置・方位を変えません。
    pub fn apply(&mut self, command: &Command) {
        match *command {
            Command::TurnLeft(deg) => self.heading -= deg,
            Command::TurnRight(deg) => self.heading += deg,
            Command::MoveForward(m) => self.position = self.position.advanced(self.heading, m),
            Command::MoveBackward(m) => {
                self.position = self.position.advanced(self.heading + 180.0, m)
            }
            Command::Fire | Command::Unparsed => {}
        }
    }
}
