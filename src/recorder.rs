//! # Recorder モジュール
//!
//! 試合ループから呼ばれる記録系コラボレータを提供します。
//! エンジン本体は入出力を持たず、記録はすべてここで行います。
//!
//! - `TranscriptRecorder`: ターンごとの記録と最終ストリームをテキストで書き出す
//! - `SnapshotRecorder`: 両戦車の姿勢を構造化ログとして出力する

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::models::{common::Side, engagement::BoardStatus, traits::IRecorder, world::World};
use crate::simulation::{CORRECTION_NOTICE, MatchSummary, TurnReport};

const RULE: &str = "========================================";

/// テキスト形式の試合記録
pub struct TranscriptRecorder<W: Write> {
    writer: W,
}

impl TranscriptRecorder<BufWriter<File>> {
    /// ファイルを作成して記録先とする
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TranscriptRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> IRecorder for TranscriptRecorder<W> {
    fn on_match_start(&mut self, world: &World) -> io::Result<()> {
        writeln!(self.writer, "{}", RULE)?;
        writeln!(
            self.writer,
            "battlefield x:[{}, {}] y:[{}, {}], groves: {}",
            world.bounds.xmin,
            world.bounds.xmax,
            world.bounds.ymin,
            world.bounds.ymax,
            world.groves.len()
        )?;
        for (index, grove) in world.groves.iter().enumerate() {
            writeln!(
                self.writer,
                "  grove {}: center ({:.1}, {:.1}) radius {:.1}",
                index, grove.center.x, grove.center.y, grove.radius
            )?;
        }
        writeln!(self.writer, "{}", RULE)
    }

    fn on_turn(&mut self, report: &TurnReport, _world: &World) -> io::Result<()> {
        writeln!(self.writer, "[step {}] {}", report.step, report.side)?;
        writeln!(self.writer, "action: {}", report.action)?;
        writeln!(self.writer, "command: {}", report.command)?;
        if let Some(fire) = report.fire {
            writeln!(self.writer, "fire: {}", fire)?;
        }
        if report.drowned {
            writeln!(self.writer, "drowned: {}", BoardStatus::DROWNED_MESSAGE)?;
        }
        if !report.outcome.parsed && !report.status.is_terminal() {
            write!(self.writer, "notice: {}", CORRECTION_NOTICE)?;
        }
        if let Some(observation) = &report.observation {
            writeln!(self.writer, "observation:{}", observation)?;
        }
        writeln!(self.writer, "status: {}", report.status)?;
        writeln!(self.writer)
    }

    fn on_match_end(&mut self, summary: &MatchSummary) -> io::Result<()> {
        writeln!(self.writer, "{}", RULE)?;
        writeln!(self.writer, "result: {} after {} steps", summary.status, summary.steps)?;
        for (side, stream) in [(Side::Blue, &summary.blue_stream), (Side::Red, &summary.red_stream)] {
            writeln!(self.writer, "{}", RULE)?;
            writeln!(self.writer, "{} stream", side)?;
            writeln!(self.writer, "{}", RULE)?;
            writeln!(self.writer, "{}", stream)?;
        }
        self.writer.flush()
    }
}

/// 両戦車の姿勢をターンごとに構造化ログへ出力
#[derive(Debug, Default)]
pub struct SnapshotRecorder {
    pub snapshots: u64,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IRecorder for SnapshotRecorder {
    fn on_match_start(&mut self, world: &World) -> io::Result<()> {
        self.log(0, world);
        Ok(())
    }

    fn on_turn(&mut self, report: &TurnReport, world: &World) -> io::Result<()> {
        self.log(report.step, world);
        Ok(())
    }

    fn on_match_end(&mut self, _summary: &MatchSummary) -> io::Result<()> {
        Ok(())
    }
}

impl SnapshotRecorder {
    fn log(&mut self, step: u64, world: &World) {
        let (blue, red) = (&world.blue, &world.red);
        info!(
            step,
            blue_x = blue.position.x,
            blue_y = blue.position.y,
            blue_heading = blue.heading,
            blue_hidden = blue.hidden,
            red_x = red.position.x,
            red_y = red.position.y,
            red_heading = red.heading,
            red_hidden = red.hidden,
            "SNAPSHOT"
        );
        self.snapshots += 1;
    }
}
