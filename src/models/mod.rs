// 基本的なデータ型と幾何ユーティリティ
pub mod common;

// パイロット・記録系のインターフェース（trait）定義
pub mod traits;

// 盤面と戦車
pub mod tank;
pub mod grove;
pub mod world;

// ターン解決の各段階
pub mod command;
pub mod sensor;
pub mod engagement;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use tank::TankState;
pub use grove::{Grove, place_groves};
pub use world::World;
pub use command::{Command, TurnOutcome, interpret};
pub use sensor::{Observation, RelativeDirection, RiverEdge, Sighting, observe};
pub use engagement::{BoardStatus, FireResult, check_board_limits, check_fire_hit};
