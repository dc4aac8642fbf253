use std::fmt;

use serde::{Deserialize, Serialize};

/// 盤面上の2次元位置（メートル）
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Position2D {
    pub x: f64, // m
    pub y: f64, // m
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// ユークリッド距離
    pub fn distance(&self, other: &Position2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// 自位置から `other` への方位（度、0=北(+y)、90=東(+x)）
    ///
    /// 範囲は [-90, 270)。正規化は方向文字列の生成時にのみ行います。
    pub fn bearing_to(&self, other: &Position2D) -> f64 {
        90.0 - (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// 方位 `heading_deg` へ `distance` だけ進んだ位置
    pub fn advanced(&self, heading_deg: f64, distance: f64) -> Self {
        let rad = heading_deg.to_radians();
        Self::new(self.x + distance * rad.sin(), self.y + distance * rad.cos())
    }
}

/// 陣営
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    /// 相手陣営
    pub fn opponent(self) -> Self {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Blue => "blue",
            Side::Red => "red",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blue" => Ok(Side::Blue),
            "red" => Ok(Side::Red),
            _ => Err(format!("無効な陣営: {}. 利用可能: blue, red", s)),
        }
    }
}

/// 盤面の矩形境界（閉区間）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    /// 原点中心、半幅 `half_extent` の正方形
    pub fn centered(half_extent: f64) -> Self {
        Self {
            xmin: -half_extent,
            xmax: half_extent,
            ymin: -half_extent,
            ymax: half_extent,
        }
    }

    /// 境界上を含めて盤面内かどうか
    pub fn contains(&self, position: &Position2D) -> bool {
        position.x >= self.xmin
            && position.x <= self.xmax
            && position.y >= self.ymin
            && position.y <= self.ymax
    }
}

/// 角度ユーティリティ
pub mod angle {
    /// [0, 360) に正規化
    pub fn normalize_360(angle_deg: f64) -> f64 {
        let normalized = angle_deg.rem_euclid(360.0);
        // rem_euclid は -1e-15 のような値で 360.0 を返すことがある
        if normalized >= 360.0 { 0.0 } else { normalized }
    }

    /// 機首方位と目標方位の角度差
    ///
    /// `wrap` が false の場合は絶対差をそのまま返すため 180 度を超えることがあります。
    pub fn heading_difference(heading_deg: f64, bearing_deg: f64, wrap: bool) -> f64 {
        let diff = (heading_deg - bearing_deg).abs();
        if wrap {
            let d = normalize_360(diff);
            if d > 180.0 { 360.0 - d } else { d }
        } else {
            diff
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_bearing_compass_convention() {
        let origin = Position2D::new(0.0, 0.0);
        assert_approx_eq!(origin.bearing_to(&Position2D::new(0.0, 100.0)), 0.0);
        assert_approx_eq!(origin.bearing_to(&Position2D::new(100.0, 0.0)), 90.0);
        assert_approx_eq!(origin.bearing_to(&Position2D::new(0.0, -100.0)), 180.0);
        assert_approx_eq!(origin.bearing_to(&Position2D::new(-100.0, 0.0)), -90.0);
    }

    #[test]
    fn test_advanced_follows_heading() {
        let p = Position2D::new(10.0, 10.0).advanced(90.0, 25.0);
        assert_approx_eq!(p.x, 35.0);
        assert_approx_eq!(p.y, 10.0);
    }

    #[test]
    fn test_bounds_are_closed() {
        let bounds = Bounds::centered(500.0);
        assert!(bounds.contains(&Position2D::new(500.0, -500.0)));
        assert!(!bounds.contains(&Position2D::new(500.001, 0.0)));
    }

    #[test]
    fn test_heading_difference_unwrapped_vs_wrapped() {
        assert_approx_eq!(angle::heading_difference(350.0, 10.0, false), 340.0);
        assert_approx_eq!(angle::heading_difference(350.0, 10.0, true), 20.0);
        assert_approx_eq!(angle::heading_difference(-720.0, 0.0, true), 0.0);
    }

    #[test]
    fn test_side_parse_and_opponent() {
        assert_eq!("Blue".parse::<Side>(), Ok(Side::Blue));
        assert!("green".parse::<Side>().is_err());
        assert_eq!(Side::Red.opponent(), Side::Blue);
    }
}
