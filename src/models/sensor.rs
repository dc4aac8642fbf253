//! # Sensor モジュール
//!
//! 戦車の観測（川・敵戦車・林）を計算し、パイロットに渡す文章を生成します。
//!
//! 方位は羅針盤式（0=北、90=東）で、相対方向は自車の方位を基準にします。
//! 視野判定の角度差は従来どおり折り返さない絶対差を使い、
//! `RulesConfig::wrap_angle_difference` が true のときだけ 180 度以内に折り返します。
//!
//! 林の中にいるかどうかは視野と無関係に判定します。視野内の林に限って判定する方式とは異なり、
//! 林の中心が背後にあっても隠れている扱いです。

use std::fmt;

use crate::models::{
    common::{Position2D, angle},
    tank::TankState,
    world::World,
};
use crate::scenario::RulesConfig;

/// 自車方位を基準にした相対方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDirection {
    Ahead,
    Behind,
    /// 右へ N 度
    Right(u32),
    /// 左へ N 度
    Left(u32),
}

/// 相対方位（度）を方向に変換
///
/// [0,360) に正規化した値で、[0,2) と (358,360) は前方、[2,178] は右、
/// (178,182] は後方、(182,358] は左です。
pub fn relative_direction(bearing_deg: f64) -> RelativeDirection {
    let dir = angle::normalize_360(bearing_deg);
    if dir > 358.0 || dir < 2.0 {
        RelativeDirection::Ahead
    } else if dir > 182.0 {
        RelativeDirection::Left((360.0 - dir) as u32)
    } else if dir > 178.0 {
        RelativeDirection::Behind
    } else {
        RelativeDirection::Right(dir as u32)
    }
}

impl fmt::Display for RelativeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeDirection::Ahead => f.write_str("in front of you"),
            RelativeDirection::Behind => f.write_str("behind you"),
            RelativeDirection::Right(n) => write!(f, "at {} degrees to your right", n),
            RelativeDirection::Left(n) => write!(f, "at {} degrees to your left", n),
        }
    }
}

/// 盤面の辺（川）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiverEdge {
    South,
    North,
    West,
    East,
}

/// 距離と相対方向の組
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub distance: f64,
    pub direction: RelativeDirection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiverSighting {
    pub edge: RiverEdge,
    pub distance: f64,
    pub direction: RelativeDirection,
}

/// 林の観測結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroveSighting {
    /// 観測者がこの林の中にいる
    Inside { index: usize },
    /// 視野内に見えている
    Seen { index: usize, sighting: Sighting },
}

/// 1回分の観測結果
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub rivers: Vec<RiverSighting>,
    /// 見えている場合のみ Some
    pub enemy: Option<Sighting>,
    pub groves: Vec<GroveSighting>,
    /// 観測者がいずれかの林の中にいるか
    pub concealed: bool,
}

/// 観測者から見た点の距離・方位・角度差
fn sight_line(viewer: &TankState, point: &Position2D, wrap: bool) -> (f64, f64, f64) {
    let distance = viewer.position.distance(point);
    let bearing = viewer.position.bearing_to(point);
    let diff = angle::heading_difference(viewer.heading, bearing, wrap);
    (distance, bearing, diff)
}

/// 観測を計算
///
/// 戦車の状態は変更しません。`concealed` を `viewer.hidden` に反映するのは呼び出し側です。
///
/// # 引数
///
/// * `viewer` - 観測する戦車
/// * `target` - 相手の戦車（`hidden` が true なら常に見えない）
/// * `world` - 盤面（境界と林）
/// * `rules` - 境界マージンと角度差の扱い
pub fn observe(viewer: &TankState, target: &TankState, world: &World, rules: &RulesConfig) -> Observation {
    let wrap = rules.wrap_angle_difference;
    let report_range = viewer.viewing_radius - rules.boundary_margin_m;
    let heading = viewer.heading;
    let pos = viewer.position;
    let bounds = &world.bounds;

    // 川は視野に関係なく距離だけで報告する
    let rivers = [
        (RiverEdge::South, (pos.y - bounds.ymin).abs(), 180.0 - heading),
        (RiverEdge::North, (pos.y - bounds.ymax).abs(), -heading),
        (RiverEdge::West, (pos.x - bounds.xmin).abs(), -heading - 90.0),
        (RiverEdge::East, (pos.x - bounds.xmax).abs(), -heading + 90.0),
    ]
    .into_iter()
    .filter(|(_, distance, _)| *distance <= report_range)
    .map(|(edge, distance, bearing)| RiverSighting {
        edge,
        distance,
        direction: relative_direction(bearing),
    })
    .collect();

    let (distance, bearing, diff) = sight_line(viewer, &target.position, wrap);
    let enemy = (distance <= viewer.viewing_radius
        && diff <= viewer.viewing_half_width
        && !target.hidden)
        .then(|| Sighting {
            distance,
            direction: relative_direction(bearing - heading),
        });

    let mut concealed = false;
    let mut groves = Vec::new();
    for (index, grove) in world.groves.iter().enumerate() {
        let (distance, bearing, diff) = sight_line(viewer, &grove.center, wrap);
        if distance <= grove.radius {
            concealed = true;
            groves.push(GroveSighting::Inside { index });
        } else if distance - grove.radius <= viewer.viewing_radius && diff <= viewer.viewing_half_width {
            groves.push(GroveSighting::Seen {
                index,
                sighting: Sighting {
                    distance,
                    direction: relative_direction(bearing - heading),
                },
            });
        }
    }

    Observation {
        rivers,
        enemy,
        groves,
        concealed,
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\nHere is the current battlefield status. ")?;
        for river in &self.rivers {
            write!(
                f,
                "There is an impassible river {} m away, {}. ",
                river.distance.trunc() as i64,
                river.direction
            )?;
        }
        match &self.enemy {
            Some(enemy) => write!(
                f,
                "You see the enemy tank {} m away, {}! ",
                enemy.distance.trunc() as i64,
                enemy.direction
            )?,
            None => f.write_str("You don't see the enemy tank. ")?,
        }
        for grove in &self.groves {
            match grove {
                GroveSighting::Inside { .. } => {
                    f.write_str("You are currently hidden inside a dense grove of trees. ")?
                }
                GroveSighting::Seen { sighting, .. } => write!(
                    f,
                    "You see a dense grove of trees {} m away, {}. ",
                    sighting.distance.trunc() as i64,
                    sighting.direction
                )?,
            }
        }
        f.write_str("You see nothing else in the fog.\nPlease take one of the above possible actions now.\n")
    }
}
