use rand::Rng;

use crate::models::{
    common::{Bounds, Side},
    grove::{Grove, place_groves},
    tank::TankState,
};
use crate::scenario::ScenarioConfig;

/// 盤面: 境界、林、両陣営の戦車
///
/// 構築は副作用を持たず、乱数源は呼び出し側が渡します。
#[derive(Debug, Clone)]
pub struct World {
    pub bounds: Bounds,
    pub groves: Vec<Grove>,
    pub blue: TankState,
    pub red: TankState,
}

impl World {
    pub fn new<R: Rng + ?Sized>(scenario: &ScenarioConfig, rng: &mut R) -> Self {
        Self {
            bounds: scenario.world.bounds(),
            groves: place_groves(&scenario.world, rng),
            blue: TankState::from_config(Side::Blue, &scenario.tanks.blue),
            red: TankState::from_config(Side::Red, &scenario.tanks.red),
        }
    }

    /// 任意の構成から直接作成（テスト・リプレイ用）
    pub fn from_parts(bounds: Bounds, groves: Vec<Grove>, blue: TankState, red: TankState) -> Self {
        Self { bounds, groves, blue, red }
    }

    pub fn tank(&self, side: Side) -> &TankState {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }

    pub fn tank_mut(&mut self, side: Side) -> &mut TankState {
        match side {
            Side::Blue => &mut self.blue,
            Side::Red => &mut self.red,
        }
    }

    /// 指定陣営の戦車と相手の戦車を同時に借用
    pub fn tank_and_opponent(&mut self, side: Side) -> (&mut TankState, &TankState) {
        match side {
            Side::Blue => (&mut self.blue, &self.red),
            Side::Red => (&mut self.red, &self.blue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Position2D;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_world_from_default_scenario() {
        let scenario = ScenarioConfig::default();
        let world = World::new(&scenario, &mut StdRng::seed_from_u64(0));

        assert_eq!(world.bounds, Bounds::centered(500.0));
        assert_eq!(world.groves.len(), 6);
        assert_eq!(world.blue.position, Position2D::new(0.0, 490.0));
        assert_eq!(world.blue.heading, 180.0);
        assert_eq!(world.red.position, Position2D::new(0.0, -490.0));
        assert_eq!(world.tank(Side::Red).side, Side::Red);
    }

    #[test]
    fn test_tank_and_opponent_split_borrow() {
        let scenario = ScenarioConfig::default();
        let mut world = World::new(&scenario, &mut StdRng::seed_from_u64(0));
        let (actor, opponent) = world.tank_and_opponent(Side::Red);
        actor.heading = 10.0;
        assert_eq!(opponent.side, Side::Blue);
        assert_eq!(world.red.heading, 10.0);
    }
}
