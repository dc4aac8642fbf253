use tanksim::models::Side;
use tanksim::pilot::{ScriptedPilot, load_action_script};
use tanksim::recorder::TranscriptRecorder;
use tanksim::scenario::ScenarioConfig;
use tanksim::simulation::{MatchStatus, SimulationEngine};

fn bundled(path: &str) -> String {
    format!("{}/{}", env!("CARGO_MANIFEST_DIR"), path)
}

fn play(scenario: &ScenarioConfig, mut blue: ScriptedPilot, mut red: ScriptedPilot) -> (MatchStatus, String) {
    let mut engine = SimulationEngine::new(scenario, 0);
    let mut transcript = TranscriptRecorder::new(Vec::new());
    let summary = engine
        .run_match(&mut blue, &mut red, &mut [&mut transcript])
        .expect("match runs");
    let text = String::from_utf8(transcript.into_inner()).expect("utf-8 transcript");
    (summary.status, text)
}

#[test]
fn bundled_scenarios_load() {
    let default = ScenarioConfig::from_file(bundled("scenarios/default.yaml")).unwrap();
    assert_eq!(default.sim.max_turn_pairs, 50);
    assert_eq!(default.world.groves.count, 6);

    let fixed = ScenarioConfig::from_file(bundled("scenarios/fixed_groves.yaml")).unwrap();
    assert_eq!(fixed.world.groves.fixed.len(), 2);
    assert!(fixed.rules.wrap_angle_difference);
}

#[test]
fn same_seed_and_script_replay_identically() {
    let scenario = ScenarioConfig::from_file(bundled("scenarios/default.yaml")).unwrap();
    let (blue_a, red_a) = load_action_script(bundled("scripts/opening.txt")).unwrap();
    let (blue_b, red_b) = load_action_script(bundled("scripts/opening.txt")).unwrap();

    let (status_a, text_a) = play(&scenario, blue_a, red_a);
    let (status_b, text_b) = play(&scenario, blue_b, red_b);

    assert_eq!(status_a, status_b);
    assert_eq!(text_a, text_b);
}

#[test]
fn opening_script_ends_in_a_draw() {
    let scenario = ScenarioConfig::from_file(bundled("scenarios/default.yaml")).unwrap();
    let (blue, red) = load_action_script(bundled("scripts/opening.txt")).unwrap();

    let (status, text) = play(&scenario, blue, red);

    assert_eq!(status, MatchStatus::Ongoing);
    assert!(text.contains("result: Continue after 100 steps"));
    assert!(text.contains("falls short"));
}

#[test]
fn different_seeds_move_the_groves() {
    let mut scenario = ScenarioConfig::default();
    scenario.sim.seed = 1;
    let first = SimulationEngine::new(&scenario, 0).world.groves;
    scenario.sim.seed = 2;
    let second = SimulationEngine::new(&scenario, 0).world.groves;

    assert_eq!(first.len(), second.len());
    assert_ne!(first, second);
}

#[test]
fn close_range_shot_wins_on_the_first_turn() {
    let yaml = r#"
tanks:
  blue:
    position: { x: 0.0, y: 100.0 }
    heading_deg: 180.0
  red:
    position: { x: 0.0, y: -100.0 }
    heading_deg: 0.0
"#;
    let scenario = ScenarioConfig::from_yaml_str(yaml).unwrap();
    let (status, text) = play(
        &scenario,
        ScriptedPilot::new(["Fire!"]),
        ScriptedPilot::new(["fire"]),
    );

    assert_eq!(status, MatchStatus::BlueVictory);
    assert!(text.contains("result: Blue victory! after 1 steps"));
    assert_eq!(text.matches("[step ").count(), 1);
}

#[test]
fn advancing_into_a_fixed_grove_hides_the_tank() {
    let scenario = ScenarioConfig::from_file(bundled("scenarios/fixed_groves.yaml")).unwrap();
    let mut engine = SimulationEngine::new(&scenario, 0);
    assert!(engine.stream(Side::Blue).contains("Hold the northern grove"));

    for _ in 0..6 {
        engine.take_turn(Side::Blue, "move forward 50").unwrap();
        engine.take_turn(Side::Red, "turn left 0").unwrap();
    }

    assert!(engine.world.blue.hidden);
    let stream = engine.stream(Side::Blue);
    let last_turn = &stream[stream.rfind("\nmove forward 50\n").unwrap()..];
    assert!(last_turn.contains("You are currently hidden inside a dense grove of trees. "));
}
