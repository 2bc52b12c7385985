use std::time::Duration;

use gauntlet_core::{DeathCause, Event, PairId, Playfield, TelemetryKind, Variant};
use gauntlet_session::{Effects, Phase, Session, SessionConfig, TickInput, TickReport};
use gauntlet_system_difficulty::DifficultyTuning;
use gauntlet_world::{pool::PoolConfig, query};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Default)]
struct Recorder {
    flaps: u32,
    scores: Vec<(u32, u32)>,
    collisions: u32,
    spawned: Vec<Variant>,
    game_over: Option<u32>,
}

impl Effects for Recorder {
    fn flapped(&mut self) {
        self.flaps += 1;
    }

    fn scored(&mut self, points: u32, multiplier: u32) {
        self.scores.push((points, multiplier));
    }

    fn collided(&mut self) {
        self.collisions += 1;
    }

    fn pair_spawned(&mut self, variant: Variant) {
        self.spawned.push(variant);
    }

    fn game_over(&mut self, score: u32) {
        self.game_over = Some(score);
    }
}

/// Flaps whenever the player sinks below `y = 320`, hovering around the middle.
fn hover<E: Effects>(session: &mut Session<E>) -> TickReport {
    let player = query::player(session.world());
    let flap = session.phase() == Phase::Ready
        || (player.position.y > 320.0 && player.velocity_y >= 0.0);
    session.tick(FRAME, TickInput { flap })
}

fn hover_until<E: Effects>(
    session: &mut Session<E>,
    max_ticks: usize,
    mut done: impl FnMut(&Session<E>, &TickReport) -> bool,
) -> TickReport {
    for _ in 0..max_ticks {
        let report = hover(session);
        if done(session, &report) {
            return report;
        }
    }
    panic!("condition not reached within {max_ticks} ticks");
}

fn centered_gap_config() -> SessionConfig {
    SessionConfig {
        playfield: Playfield {
            gap_min_y: 200.0,
            gap_max_y: 401.0,
            ..Playfield::default()
        },
        difficulty: DifficultyTuning {
            base_gap: 200.0,
            min_gap: 200.0,
            ..DifficultyTuning::default()
        },
        ..SessionConfig::default()
    }
}

fn low_gap_config() -> SessionConfig {
    SessionConfig {
        playfield: Playfield {
            gap_min_y: 100.0,
            gap_max_y: 200.0,
            ..Playfield::default()
        },
        ..SessionConfig::default()
    }
}

#[test]
fn nothing_spawns_before_the_first_flap() {
    let mut session = Session::new(&SessionConfig::default());
    for _ in 0..300 {
        let report = session.tick(FRAME, TickInput::default());
        assert_eq!(report.phase, Phase::Ready);
        assert!(report.spawned.is_empty());
    }
    assert_eq!(query::active_pair_count(session.world()), 0);
    assert_eq!(query::player(session.world()).position.y, 300.0);
}

#[test]
fn first_spawn_follows_the_interval_once_playing() {
    let mut session = Session::new(&SessionConfig::default());
    let first = hover(&mut session);
    assert_eq!(first.phase, Phase::Playing);

    let mut ticks = 1;
    let report = hover_until(&mut session, 200, |_, report| {
        ticks += 1;
        !report.spawned.is_empty()
    });

    assert_eq!(report.spawned, vec![PairId::new(0)]);
    assert_eq!(ticks, 94, "1500ms at 16ms frames");
    assert_eq!(session.telemetry().len(), 1);
    assert_eq!(session.telemetry()[0].kind, TelemetryKind::Spawn);
}

#[test]
fn passing_a_pair_scores_once() {
    let mut session = Session::with_effects(&centered_gap_config(), Recorder::default());

    let report = hover_until(&mut session, 500, |_, report| report.pass.is_some());

    let award = report.pass.expect("pass");
    assert!(award.centered);
    assert_eq!(award.points, 1);
    assert_eq!(session.score().score(), 1);
    assert_eq!(session.effects().scores, vec![(1, 1)]);
    assert_eq!(session.phase(), Phase::Playing);
    assert!(session
        .telemetry()
        .iter()
        .any(|record| record.kind == TelemetryKind::Pass));
}

#[test]
fn collision_ends_the_run_and_halts_obstacles() {
    let mut session = Session::with_effects(&low_gap_config(), Recorder::default());

    let report = hover_until(&mut session, 600, |session, _| {
        session.phase() == Phase::GameOver
    });

    assert!(report.collided);
    assert_eq!(report.died, Some(DeathCause::Obstacle));
    assert!(report.events.contains(&Event::ObstaclesStopped));
    assert_eq!(session.effects().collisions, 1);
    assert_eq!(session.effects().game_over, Some(0));
    assert_eq!(
        session.telemetry().last().map(|record| record.kind),
        Some(TelemetryKind::Collision)
    );

    let frozen = query::pair_view(session.world()).into_vec();
    assert!(frozen.iter().all(|pair| pair.velocity_x == 0.0));
    for _ in 0..200 {
        let report = session.tick(FRAME, TickInput { flap: true });
        assert_eq!(report.phase, Phase::GameOver);
        assert!(report.spawned.is_empty());
    }
    assert_eq!(query::pair_view(session.world()).into_vec(), frozen);
}

#[test]
fn falling_to_the_floor_ends_the_run() {
    let mut session = Session::with_effects(&SessionConfig::default(), Recorder::default());
    let _ = session.tick(FRAME, TickInput { flap: true });

    let mut died = None;
    for _ in 0..120 {
        let report = session.tick(FRAME, TickInput::default());
        if report.died.is_some() {
            died = report.died;
            break;
        }
    }

    assert_eq!(died, Some(DeathCause::Ground));
    assert_eq!(session.phase(), Phase::GameOver);
    assert_eq!(session.effects().flaps, 1);
    assert_eq!(session.effects().game_over, Some(0));
    assert_eq!(session.effects().collisions, 0);
}

#[test]
fn double_spawn_reports_both_pairs() {
    let mut session = Session::with_effects(&SessionConfig::default(), Recorder::default());

    let pair = session.force_spawn(Some(Variant::Double));

    assert_eq!(pair, Some(PairId::new(0)));
    assert_eq!(query::active_pair_count(session.world()), 2);
    assert_eq!(
        session.effects().spawned,
        vec![Variant::Double, Variant::Static]
    );
    assert_eq!(session.telemetry().len(), 2);
}

#[test]
fn capped_pool_rejects_spawns_without_panicking() {
    let config = SessionConfig {
        pool: PoolConfig {
            initial_slots: 2,
            max_slots: Some(2),
        },
        ..SessionConfig::default()
    };
    let mut session = Session::new(&config);

    assert!(session.force_spawn(None).is_some());
    assert_eq!(session.force_spawn(None), None);
    assert_eq!(query::active_pair_count(session.world()), 1);
    assert_eq!(query::pool(session.world()).capacity(), 2);
}

#[test]
fn zero_max_slots_lets_the_pool_grow_without_limit() {
    let config = SessionConfig::from_toml_str("[pool]\ninitial_slots = 2\nmax_slots = 0\n")
        .expect("config parses");
    assert_eq!(config.pool.max_slots, None);

    let mut session = Session::new(&config);
    for _ in 0..3 {
        assert!(session.force_spawn(Some(Variant::Static)).is_some());
    }
    assert_eq!(query::active_pair_count(session.world()), 3);
    assert_eq!(query::pool(session.world()).capacity(), 6);

    let capped = SessionConfig::from_toml_str("[pool]\ninitial_slots = 4\n")
        .expect("config parses");
    assert_eq!(capped.pool.max_slots, Some(64));
}

#[test]
fn pass_and_hit_in_one_tick_keeps_the_point() {
    let mut session = Session::with_effects(&low_gap_config(), Recorder::default());
    assert!(session.force_spawn(Some(Variant::Static)).is_some());

    let report = session.tick(Duration::from_millis(3_650), TickInput::default());

    assert!(report.pass.is_some());
    assert!(report.collided);
    assert_eq!(report.died, Some(DeathCause::Obstacle));
    assert_eq!(session.phase(), Phase::GameOver);
    assert_eq!(session.score().score(), 1);
    assert_eq!(session.effects().game_over, Some(1));
}

#[test]
fn stop_freezes_pairs_and_blocks_spawning() {
    let mut session = Session::new(&SessionConfig::default());
    let _ = hover(&mut session);
    let _ = session.force_spawn(Some(Variant::Static));
    session.stop();

    let before = query::pair_view(session.world()).into_vec();
    for _ in 0..200 {
        let report = hover(&mut session);
        assert!(report.spawned.is_empty());
    }
    let after = query::pair_view(session.world()).into_vec();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].x, after[0].x);
    assert_eq!(after[0].velocity_x, 0.0);
}

#[test]
fn reset_returns_everything_to_the_pool() {
    let mut session = Session::new(&SessionConfig::default());
    let _ = hover(&mut session);
    for _ in 0..3 {
        let _ = session.force_spawn(Some(Variant::Static));
    }
    assert_eq!(query::active_pair_count(session.world()), 3);

    session.reset();

    let world = session.world();
    assert_eq!(query::active_pair_count(world), 0);
    assert_eq!(query::next_pair_id(world), PairId::new(0));
    assert_eq!(query::pool(world).active_count(), 0);
    assert_eq!(
        query::pool(world).free_count(),
        query::pool(world).capacity()
    );
    assert_eq!(session.phase(), Phase::Ready);
    assert_eq!(session.score().score(), 0);
    assert_eq!(session.telemetry().len(), 3, "telemetry survives reset");

    session.clear_telemetry();
    assert!(session.telemetry().is_empty());
}

#[test]
fn equal_seeds_replay_identical_telemetry() {
    let run = |seed: u64| {
        let config = SessionConfig {
            seed,
            ..SessionConfig::default()
        };
        let mut session = Session::new(&config);
        for _ in 0..600 {
            let _ = hover(&mut session);
        }
        (session.telemetry(), session.telemetry_sink().digest())
    };

    let (first_records, first_digest) = run(42);
    let (second_records, second_digest) = run(42);
    assert!(!first_records.is_empty());
    assert_eq!(first_records, second_records);
    assert_eq!(first_digest, second_digest);
}

#[test]
fn config_sections_fall_back_to_defaults() {
    let config = SessionConfig::from_toml_str(
        r#"
        seed = 99

        [spawning]
        interval_ms = 900

        [[difficulty.unlocks]]
        variant = "double"
        score = 3

        [[difficulty.unlocks]]
        variant = "spiky"
        score = 4
        "#,
    )
    .expect("config parses");

    assert_eq!(config.seed, 99);
    assert_eq!(config.spawning.interval_ms, 900);
    assert_eq!(config.playfield, Playfield::default());
    assert_eq!(config.difficulty.base_gap, 180.0);
    assert_eq!(config.difficulty.unlocks.len(), 2);
    assert_eq!(config.difficulty.unlocks[0].variant, Variant::Double);
    assert_eq!(config.difficulty.unlocks[1].variant, Variant::Static);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let error = SessionConfig::load("does/not/exist.toml").expect_err("missing file");
    assert!(matches!(error, gauntlet_session::ConfigError::Io { .. }));
    assert!(SessionConfig::from_toml_str("seed = \"nope\"").is_err());
}

#[test]
fn sample_config_matches_the_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/gauntlet.toml");
    let loaded = SessionConfig::load(path).expect("sample config loads");
    let expected = SessionConfig {
        seed: 24_301,
        ..SessionConfig::default()
    };
    assert_eq!(loaded, expected);
}
