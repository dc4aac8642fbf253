use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

use tanksim::logging::{self, LogConfig, LogOutput};
use tanksim::models::traits::{IPilot, IRecorder};
use tanksim::pilot::{ConsolePilot, ScriptedPilot, load_action_script, load_side_script};
use tanksim::recorder::{SnapshotRecorder, TranscriptRecorder};
use tanksim::scenario::ScenarioConfig;
use tanksim::simulation::{MatchStatus, SimulationEngine};

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("tanksim")
        .version("0.1.0")
        .about("戦車戦シミュレーション (Tank Battle Simulation)")
        .long_about("霧に覆われた川に囲まれた平原で、2両の戦車が交互に行動するターン制シミュレーション\n\
                     行動は自由文で与え、シードと行動列が同じなら試合は完全に再現されます。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help("実行するシナリオファイル(.yaml)のパスを指定します。\n\
                           指定しない場合、組み込みの既定シナリオを使います。"),
        )
        .arg(
            Arg::new("actions")
                .short('a')
                .long("actions")
                .value_name("FILE")
                .help("両陣営の行動スクリプト (blue:/red: 接頭辞付き)")
                .conflicts_with_all(["blue", "red"]),
        )
        .arg(
            Arg::new("blue")
                .long("blue")
                .value_name("FILE")
                .help("青陣営の行動ファイル (1行1行動)"),
        )
        .arg(
            Arg::new("red")
                .long("red")
                .value_name("FILE")
                .help("赤陣営の行動ファイル (1行1行動)"),
        )
        .arg(
            Arg::new("interactive")
                .long("interactive")
                .action(ArgAction::SetTrue)
                .help("行動ファイルのない陣営を標準入力から操縦"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("乱数シードを上書き"),
        )
        .arg(
            Arg::new("turns")
                .long("turns")
                .value_name("N")
                .value_parser(clap::value_parser!(u32))
                .help("最大ターン数（青赤1組で1ターン）を上書き"),
        )
        .arg(
            Arg::new("transcript")
                .short('o')
                .long("transcript")
                .value_name("FILE")
                .help("試合記録の出力先"),
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("OUTPUT")
                .default_value("console")
                .help("ログ出力先 (console, file, both)"),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .default_value("logs")
                .help("ログファイルのディレクトリ"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)"),
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");

    let _guard = match init_logging(&matches, verbose_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            std::process::exit(1);
        }
    };

    let has_pilots = ["actions", "blue", "red"]
        .iter()
        .any(|id| matches.contains_id(id))
        || matches.get_flag("interactive");

    if !matches.get_flag("info") && !has_pilots {
        show_default_help();
        return;
    }

    match run(&matches, verbose_level) {
        Ok(_) => {
            if verbose_level > 0 {
                println!("試合が正常に終了しました。");
            }
        }
        Err(e) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(
    matches: &ArgMatches,
    verbose_level: u8,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, Box<dyn std::error::Error>> {
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| logging::parse_log_level(s))
        .unwrap_or_else(|| logging::level_for_verbosity(verbose_level));

    let output: LogOutput = matches
        .get_one::<String>("log-output")
        .map(|s| s.parse::<LogOutput>())
        .transpose()?
        .unwrap_or(LogOutput::Console);

    let config = LogConfig {
        level,
        output,
        log_dir: matches
            .get_one::<String>("log-dir")
            .cloned()
            .unwrap_or_else(|| "logs".to_string()),
        ..LogConfig::default()
    };

    logging::init_logging(config)
}

/// シナリオの読み込み、パイロットの準備、試合の実行
fn run(matches: &ArgMatches, verbose_level: u8) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = match matches.get_one::<String>("scenario") {
        Some(path) => {
            let scenario = ScenarioConfig::from_file(path)?;
            if verbose_level > 0 {
                println!("シナリオファイル読み込み完了: {}", path);
            }
            scenario
        }
        None => ScenarioConfig::default(),
    };

    if let Some(seed) = matches.get_one::<u64>("seed") {
        scenario.sim.seed = *seed;
    }
    if let Some(turns) = matches.get_one::<u32>("turns") {
        scenario.sim.max_turn_pairs = *turns;
    }
    scenario.validate()?;

    // 情報表示のみの場合
    if matches.get_flag("info") {
        scenario.print_summary();
        return Ok(());
    }

    let (blue_script, red_script) = load_pilots(matches)?;
    let interactive = matches.get_flag("interactive");
    let mut blue = choose_pilot(blue_script, interactive);
    let mut red = choose_pilot(red_script, interactive);

    if verbose_level > 0 {
        scenario.print_summary();
        println!();
    }

    let mut engine = SimulationEngine::new(&scenario, verbose_level);

    let mut snapshot = SnapshotRecorder::new();
    let mut transcript = matches
        .get_one::<String>("transcript")
        .map(TranscriptRecorder::create)
        .transpose()?;

    let mut recorders: Vec<&mut dyn IRecorder> = Vec::new();
    recorders.push(&mut snapshot);
    if let Some(transcript) = transcript.as_mut() {
        recorders.push(transcript);
    }

    let summary = engine.run_match(blue.as_mut(), red.as_mut(), &mut recorders)?;

    info!(snapshots = snapshot.snapshots, "記録を出力しました");

    println!("=== 試合結果 ===");
    match summary.status {
        MatchStatus::Ongoing => println!("引き分け（{} ステップで上限に到達）", summary.steps),
        status => println!("{} ({} ステップ)", status, summary.steps),
    }
    if let Some(path) = matches.get_one::<String>("transcript") {
        println!("試合記録: {}", path);
    }

    Ok(())
}

/// 行動ファイルから陣営ごとのスクリプトを読み込む
fn load_pilots(
    matches: &ArgMatches,
) -> Result<(Option<ScriptedPilot>, Option<ScriptedPilot>), Box<dyn std::error::Error>> {
    if let Some(path) = matches.get_one::<String>("actions") {
        let (blue, red) = load_action_script(path)?;
        return Ok((Some(blue), Some(red)));
    }

    let blue = matches.get_one::<String>("blue").map(load_side_script).transpose()?;
    let red = matches.get_one::<String>("red").map(load_side_script).transpose()?;
    Ok((blue, red))
}

/// スクリプトがなければ対話パイロット（またはすぐに尽きる空のスクリプト）を使う
fn choose_pilot(script: Option<ScriptedPilot>, interactive: bool) -> Box<dyn IPilot> {
    match script {
        Some(script) => Box::new(script),
        None if interactive => Box::new(ConsolePilot::stdio()),
        None => Box::new(ScriptedPilot::default()),
    }
}

/// デフォルトヘルプとシナリオ一覧を表示
fn show_default_help() {
    println!("使用方法:");
    println!("  tanksim [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>    シナリオファイルを指定（省略時は既定シナリオ）");
    println!("  -a, --actions <FILE>     両陣営の行動スクリプト");
    println!("      --blue <FILE>        青陣営の行動ファイル");
    println!("      --red <FILE>         赤陣営の行動ファイル");
    println!("      --interactive        行動ファイルのない陣営を標準入力から操縦");
    println!("      --seed <N>           乱数シードを上書き");
    println!("      --turns <N>          最大ターン数を上書き");
    println!("  -o, --transcript <FILE>  試合記録の出力先");
    println!("  -i, --info               シナリオ情報のみ表示");
    println!("  -v, --verbose            詳細出力 (複数指定で詳細レベル上昇)");
    println!("  -h, --help               このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/default.yaml        - 既定の盤面（ランダムな林 6 か所）");
    println!("  scenarios/fixed_groves.yaml   - 林の位置を固定した検証用盤面");
    println!();
    println!("例:");
    println!("  tanksim -a scripts/opening.txt -o transcript.txt");
    println!("  tanksim -s scenarios/fixed_groves.yaml --red scripts/red.txt --interactive");
    println!("  tanksim -s scenarios/default.yaml -i");
}
