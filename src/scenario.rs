use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::common::{Bounds, Position2D};

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: "default".to_string(),
            description: "River-bounded plain with scattered groves".to_string(),
        }
    }
}

/// シミュレーション設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 林配置の乱数シード
    pub seed: u64,
    /// 最大ターンペア数（青→赤で1ペア）
    pub max_turn_pairs: u32,
    /// パイロット出力をエンジンに渡す前に切り詰める文字数
    pub max_action_chars: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_turn_pairs: 50,
            max_action_chars: 100,
        }
    }
}

/// 林（隠蔽領域）の配置設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GroveConfig {
    pub count: usize,
    pub radius_min_m: f64,
    pub radius_max_m: f64,
    /// 盤面半幅に対する配置範囲の割合
    pub placement_fraction: f64,
    /// 固定配置（指定時はランダム配置を行わない）
    pub fixed: Vec<FixedGrove>,
}

impl Default for GroveConfig {
    fn default() -> Self {
        Self {
            count: 6,
            radius_min_m: 50.0,
            radius_max_m: 100.0,
            placement_fraction: 0.8,
            fixed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FixedGrove {
    pub center: Position2D,
    pub radius_m: f64,
}

/// 世界設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    /// 盤面の半幅（原点中心の正方形）
    pub half_extent_m: f64,
    pub groves: GroveConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            half_extent_m: 500.0,
            groves: GroveConfig::default(),
        }
    }
}

impl WorldConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::centered(self.half_extent_m)
    }
}

/// 戦車1両の初期設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TankConfig {
    pub position: Position2D,
    pub heading_deg: f64,
    #[serde(default = "default_viewing_radius")]
    pub viewing_radius_m: f64,
    #[serde(default = "default_viewing_half_width")]
    pub viewing_half_width_deg: f64,
}

fn default_viewing_radius() -> f64 {
    500.0
}

fn default_viewing_half_width() -> f64 {
    90.0
}

impl TankConfig {
    pub fn blue_default() -> Self {
        Self {
            position: Position2D::new(0.0, 490.0),
            heading_deg: 180.0,
            viewing_radius_m: default_viewing_radius(),
            viewing_half_width_deg: default_viewing_half_width(),
        }
    }

    pub fn red_default() -> Self {
        Self {
            position: Position2D::new(0.0, -490.0),
            heading_deg: 0.0,
            viewing_radius_m: default_viewing_radius(),
            viewing_half_width_deg: default_viewing_half_width(),
        }
    }
}

/// 両陣営の戦車設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TanksConfig {
    #[serde(default = "TankConfig::blue_default")]
    pub blue: TankConfig,
    #[serde(default = "TankConfig::red_default")]
    pub red: TankConfig,
}

impl Default for TanksConfig {
    fn default() -> Self {
        Self {
            blue: TankConfig::blue_default(),
            red: TankConfig::red_default(),
        }
    }
}

/// 行動解釈・交戦判定のルール定数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    pub move_cap_m: f64,
    pub turn_cap_deg: f64,
    /// 数値が無い移動コマンドの既定値
    pub default_move_m: f64,
    /// 数値が無い旋回コマンドの既定値
    pub default_turn_deg: f64,
    /// 川の報告距離は viewing_radius からこの値を引いたもの
    pub boundary_margin_m: f64,
    /// 命中判定: 距離[m] × 角度差[deg] の上限
    pub fire_product_limit: f64,
    /// 命中判定: 最大射程[m]
    pub fire_range_m: f64,
    /// 角度差を 180 度以内に折り返すか（false で従来挙動）
    pub wrap_angle_difference: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            move_cap_m: 50.0,
            turn_cap_deg: 45.0,
            default_move_m: 50.0,
            default_turn_deg: 45.0,
            boundary_margin_m: 10.0,
            fire_product_limit: 1000.0,
            fire_range_m: 400.0,
            wrap_angle_difference: false,
        }
    }
}

/// パイロットに渡す初期ブリーフィング
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BriefingConfig {
    pub intro: String,
    pub blue_orders: Option<String>,
    pub red_orders: Option<String>,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            intro: "You are the pilot of a tank that is about to engage in combat with an adversary tank. \
                    The battlefield is a flat plain encircled by an impassable river. \
                    You know the other tank is at the other end of the battlefield but cannot see where it is because of fog. \
                    Somewhere near the middle, there are small groves of trees with thick underbrush where a tank would be able to hide.\n"
                .to_string(),
            blue_orders: None,
            red_orders: None,
        }
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    pub world: WorldConfig,
    pub tanks: TanksConfig,
    pub rules: RulesConfig,
    pub briefing: BriefingConfig,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::Io(path.to_path_buf(), e))?;

        let config = Self::from_yaml_str(&contents)
            .map_err(|e| match e {
                ScenarioError::Parse(_, err) => ScenarioError::Parse(path.to_path_buf(), err),
                other => other,
            })?;

        Ok(config)
    }

    /// YAML文字列から読み込み（空文字列は既定シナリオ）
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = if contents.trim().is_empty() {
            ScenarioConfig::default()
        } else {
            serde_yaml::from_str(contents)
                .map_err(|e| ScenarioError::Parse(PathBuf::from("<inline>"), e))?
        };

        config.validate()?;
        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.sim.max_turn_pairs == 0 {
            return Err(ScenarioError::Validation("max_turn_pairs must be positive".to_string()));
        }
        if self.sim.max_action_chars == 0 {
            return Err(ScenarioError::Validation("max_action_chars must be positive".to_string()));
        }

        if self.world.half_extent_m <= 0.0 {
            return Err(ScenarioError::Validation("half_extent_m must be positive".to_string()));
        }

        let groves = &self.world.groves;
        if groves.radius_min_m <= 0.0 || groves.radius_max_m < groves.radius_min_m {
            return Err(ScenarioError::Validation(format!(
                "Invalid grove radius range [{}, {}]",
                groves.radius_min_m, groves.radius_max_m
            )));
        }
        if groves.placement_fraction <= 0.0 || groves.placement_fraction > 1.0 {
            return Err(ScenarioError::Validation(
                "placement_fraction must be in (0, 1]".to_string(),
            ));
        }
        if let Some(bad) = groves.fixed.iter().find(|g| g.radius_m <= 0.0) {
            return Err(ScenarioError::Validation(format!(
                "Fixed grove at ({}, {}) has non-positive radius",
                bad.center.x, bad.center.y
            )));
        }

        let rules = &self.rules;
        if rules.move_cap_m <= 0.0 || rules.turn_cap_deg <= 0.0 {
            return Err(ScenarioError::Validation("movement and turn caps must be positive".to_string()));
        }
        if rules.default_move_m < 0.0 || rules.default_turn_deg < 0.0 {
            return Err(ScenarioError::Validation("default magnitudes must not be negative".to_string()));
        }
        if rules.fire_product_limit < 0.0 || rules.fire_range_m <= 0.0 {
            return Err(ScenarioError::Validation("Invalid fire limits".to_string()));
        }

        let bounds = self.world.bounds();
        for (side, tank) in [("blue", &self.tanks.blue), ("red", &self.tanks.red)] {
            if !bounds.contains(&tank.position) {
                return Err(ScenarioError::Validation(format!(
                    "{} tank starts outside the board", side
                )));
            }
            if tank.viewing_radius_m <= 0.0 || tank.viewing_half_width_deg <= 0.0 {
                return Err(ScenarioError::Validation(format!(
                    "{} tank sensor parameters must be positive", side
                )));
            }
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("最大ターンペア数: {}", self.sim.max_turn_pairs);
        println!("シード値: {}", self.sim.seed);
        println!();

        println!("=== 盤面 ===");
        println!("半幅: {:.0}m", self.world.half_extent_m);
        let groves = &self.world.groves;
        if groves.fixed.is_empty() {
            println!(
                "林: {}箇所 (半径 {:.0}-{:.0}m, ランダム配置)",
                groves.count, groves.radius_min_m, groves.radius_max_m
            );
        } else {
            println!("林: {}箇所 (固定配置)", groves.fixed.len());
        }
        println!();

        println!("=== 戦車 ===");
        for (side, tank) in [("blue", &self.tanks.blue), ("red", &self.tanks.red)] {
            println!(
                "  {}: ({:.0}, {:.0}) 方位 {:.0}度, 視程 {:.0}m, 視野半角 {:.0}度",
                side,
                tank.position.x,
                tank.position.y,
                tank.heading_deg,
                tank.viewing_radius_m,
                tank.viewing_half_width_deg
            );
        }
    }
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] serde_yaml::Error),
    #[error("設定検証エラー: {0}")]
    Validation(String),
}
