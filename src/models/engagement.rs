use std::fmt;

use tracing::info;

use crate::models::{
    common::{Bounds, angle},
    tank::TankState,
};
use crate::scenario::RulesConfig;

/// 射撃の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireResult {
    /// 命中（射手の勝利）
    Hit,
    /// 照準は合っているが射程外
    FallsShort,
    Miss,
}

impl FireResult {
    pub fn is_hit(self) -> bool {
        self == FireResult::Hit
    }

    pub fn message(self) -> &'static str {
        match self {
            FireResult::Hit => "Your shot strikes the enemy tank! You win!",
            FireResult::FallsShort => {
                "Your shot whizzes towards the enemy tank, but falls short and hits the ground. You need to get closer."
            }
            FireResult::Miss => "Your shot whizzes through the air, missing the enemy tank.",
        }
    }
}

impl fmt::Display for FireResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// 盤面境界に対する状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    OnBoard,
    /// 境界の外（川）に出た
    Drowned,
}

impl BoardStatus {
    pub const DROWNED_MESSAGE: &'static str =
        "You have crossed into the river and sink in the murky depths. You lose!";
}

/// 射撃の命中判定
///
/// 距離[m] × 角度差[deg] が `fire_product_limit` 以下で照準が合っているとみなし、
/// さらに距離が `fire_range_m` 以下なら命中です。遠距離ほど角度の許容が狭くなります。
/// 角度差は観測と同じく既定では折り返しません。
pub fn check_fire_hit(shooter: &TankState, target: &TankState, rules: &RulesConfig) -> FireResult {
    let distance = shooter.position.distance(&target.position);
    let bearing = shooter.position.bearing_to(&target.position);
    let angle_diff = angle::heading_difference(shooter.heading, bearing, rules.wrap_angle_difference);
    let on_line = distance * angle_diff <= rules.fire_product_limit;

    let result = if on_line && distance <= rules.fire_range_m {
        FireResult::Hit
    } else if on_line {
        FireResult::FallsShort
    } else {
        FireResult::Miss
    };

    info!(
        shooter = %shooter.side,
        target = %target.side,
        distance,
        angle_diff,
        result = ?result,
        "SHOT_FIRED: 射撃を判定しました"
    );

    result
}

/// 盤面境界の判定（境界線上は盤面内）
pub fn check_board_limits(tank: &TankState, bounds: &Bounds) -> BoardStatus {
    if bounds.contains(&tank.position) {
        BoardStatus::OnBoard
    } else {
        BoardStatus::Drowned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::{Position2D, Side};

    fn shooter_at_origin() -> TankState {
        TankState::new(Side::Blue, Position2D::new(0.0, 0.0), 0.0)
    }

    #[test]
    fn test_direct_hit_in_range() {
        let target = TankState::new(Side::Red, Position2D::new(0.0, 300.0), 180.0);
        assert_eq!(check_fire_hit(&shooter_at_origin(), &target, &RulesConfig::default()), FireResult::Hit);
    }

    #[test]
    fn test_on_line_but_beyond_range_falls_short() {
        let target = TankState::new(Side::Red, Position2D::new(0.0, 450.0), 180.0);
        let result = check_fire_hit(&shooter_at_origin(), &target, &RulesConfig::default());
        assert_eq!(result, FireResult::FallsShort);
        assert!(!result.is_hit());
    }

    #[test]
    fn test_angular_product_couples_range_and_aim() {
        let rules = RulesConfig::default();
        // 100m 先、約 5.7 度ずれ: 積は約 570 で命中
        let near = TankState::new(Side::Red, Position2D::new(10.0, 100.0), 0.0);
        assert_eq!(check_fire_hit(&shooter_at_origin(), &near, &rules), FireResult::Hit);
        // 同じずれでも 300m 先では積が 1000 を超えて外れる
        let far = TankState::new(Side::Red, Position2D::new(30.0, 300.0), 0.0);
        assert_eq!(check_fire_hit(&shooter_at_origin(), &far, &rules), FireResult::Miss);
    }

    #[test]
    fn test_target_behind_is_a_miss() {
        let target = TankState::new(Side::Red, Position2D::new(0.0, -50.0), 0.0);
        assert_eq!(check_fire_hit(&shooter_at_origin(), &target, &RulesConfig::default()), FireResult::Miss);
    }

    #[test]
    fn test_result_messages() {
        assert_eq!(FireResult::Hit.to_string(), "Your shot strikes the enemy tank! You win!");
        assert!(FireResult::FallsShort.message().contains("falls short"));
        assert!(FireResult::Miss.message().contains("missing the enemy tank"));
    }

    #[test]
    fn test_board_limits_strictly_outside() {
        let bounds = Bounds::centered(500.0);
        let mut tank = TankState::new(Side::Blue, Position2D::new(500.0, 500.0), 0.0);
        assert_eq!(check_board_limits(&tank, &bounds), BoardStatus::OnBoard);
        tank.position.x = 500.5;
        assert_eq!(check_board_limits(&tank, &bounds), BoardStatus::Drowned);
        tank.position = Position2D::new(0.0, -501.0);
        assert_eq!(check_board_limits(&tank, &bounds), BoardStatus::Drowned);
    }
}
