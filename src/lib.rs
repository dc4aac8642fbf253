//! # tanksim
//!
//! 2両の戦車が霧の中で戦うターン制シミュレーション。
//!
//! 行動は各陣営のパイロットが自由文で返し、エンジンがそれを解釈して運動・射撃・観測を解決します。
//! 盤面は乱数シードと行動列だけで決まり、同じ入力からは同じ試合が再現されます。

pub mod logging;
pub mod models;
pub mod pilot;
pub mod recorder;
pub mod scenario;
pub mod simulation;
