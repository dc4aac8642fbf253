use rand::Rng;
use tracing::debug;

use crate::models::common::Position2D;
use crate::scenario::WorldConfig;

/// 林（隠蔽領域）
///
/// 円形の領域で、中に入った戦車は距離や方位に関係なく見えなくなります。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grove {
    pub center: Position2D,
    pub radius: f64,
}

impl Grove {
    pub fn new(center: Position2D, radius: f64) -> Self {
        Self { center, radius }
    }

    /// 位置が林の中（境界を含む）かどうか
    pub fn contains(&self, position: &Position2D) -> bool {
        self.center.distance(position) <= self.radius
    }
}

/// 設定に従って林を配置
///
/// 固定配置が指定されていればそれを使い、乱数は消費しません。
/// それ以外は盤面半幅 × `placement_fraction` の範囲に中心を一様に置き、
/// 半径を [radius_min, radius_max) から一様に選びます。
pub fn place_groves<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Vec<Grove> {
    let groves = &config.groves;

    if !groves.fixed.is_empty() {
        return groves
            .fixed
            .iter()
            .map(|g| Grove::new(g.center, g.radius_m))
            .collect();
    }

    let reach = groves.placement_fraction * config.half_extent_m;
    let radius_span = groves.radius_max_m - groves.radius_min_m;

    (0..groves.count)
        .map(|index| {
            let center = Position2D::new(
                rng.r#gen::<f64>() * 2.0 * reach - reach,
                rng.r#gen::<f64>() * 2.0 * reach - reach,
            );
            let radius = rng.r#gen::<f64>() * radius_span + groves.radius_min_m;
            debug!(
                grove_index = index,
                center_x = center.x,
                center_y = center.y,
                radius,
                "GROVE_PLACED: 林を配置しました"
            );
            Grove::new(center, radius)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::FixedGrove;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_placement_stays_in_reach() {
        let config = WorldConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let groves = place_groves(&config, &mut rng);

        assert_eq!(groves.len(), 6);
        for grove in &groves {
            assert!(grove.center.x.abs() <= 400.0);
            assert!(grove.center.y.abs() <= 400.0);
            assert!(grove.radius >= 50.0 && grove.radius < 100.0);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let config = WorldConfig::default();
        let a = place_groves(&config, &mut StdRng::seed_from_u64(9));
        let b = place_groves(&config, &mut StdRng::seed_from_u64(9));
        let c = place_groves(&config, &mut StdRng::seed_from_u64(10));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fixed_layout_overrides_random() {
        let mut config = WorldConfig::default();
        config.groves.fixed = vec![FixedGrove {
            center: Position2D::new(0.0, 0.0),
            radius_m: 50.0,
        }];
        let groves = place_groves(&config, &mut StdRng::seed_from_u64(1));
        assert_eq!(groves, vec![Grove::new(Position2D::new(0.0, 0.0), 50.0)]);
    }

    #[test]
    fn test_contains_includes_edge() {
        let grove = Grove::new(Position2D::new(0.0, 0.0), 50.0);
        assert!(grove.contains(&Position2D::new(0.0, 50.0)));
        assert!(!grove.contains(&Position2D::new(0.0, 50.1)));
    }
}
