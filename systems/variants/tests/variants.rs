use std::time::Duration;

use gauntlet_core::{Command, Event, PairId, Playfield, Tint, Variant};
use gauntlet_system_difficulty::DifficultyCurve;
use gauntlet_system_spawning::{Config, Spawning};
use gauntlet_system_variants::{VariantTuning, Variants};
use gauntlet_world::{self as world, query, World};

struct Harness {
    world: World,
    spawning: Spawning,
    variants: Variants,
}

impl Harness {
    fn new() -> Self {
        let playfield = Playfield::default();
        Self {
            world: World::new(),
            spawning: Spawning::new(
                Config::new(Duration::from_millis(1_500), 21, playfield),
                DifficultyCurve::default(),
            ),
            variants: Variants::new(VariantTuning::default(), playfield, 22),
        }
    }

    fn force(&mut self, variant: Variant) -> Vec<Event> {
        let mut commands = Vec::new();
        self.spawning.force_spawn(0, Some(variant), &mut commands);
        self.pump(commands)
    }

    fn pump(&mut self, mut commands: Vec<Command>) -> Vec<Event> {
        let mut log = Vec::new();
        while !commands.is_empty() {
            let mut generated = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut generated);
            }
            self.variants.handle(&generated, &mut commands);
            log.extend(generated);
        }
        log
    }

    fn tick(&mut self, dt: Duration) -> Vec<Event> {
        self.pump(vec![Command::Tick { dt }])
    }
}

#[test]
fn double_variant_adds_two_pairs() {
    let mut harness = Harness::new();
    let before = query::active_pair_count(&harness.world);

    let events = harness.force(Variant::Double);

    assert_eq!(query::active_pair_count(&harness.world), before + 2);
    let spawned: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::PairSpawned { request, .. } => Some(*request),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 2);
    assert_eq!(spawned[0].variant, Variant::Double);
    assert_eq!(spawned[1].variant, Variant::Static);
    assert_eq!(spawned[1].speed, spawned[0].speed);
    assert!(spawned[1].x > spawned[0].x);
}

#[test]
fn oscillation_moves_both_halves_and_keeps_the_gap() {
    let mut harness = Harness::new();
    let _ = harness.force(Variant::Oscillating);
    let initial = query::pair_view(&harness.world).into_vec()[0];
    assert!(initial.oscillating);

    let _ = harness.tick(Duration::from_millis(900));
    let moved = query::pair_view(&harness.world).into_vec()[0];
    assert!((moved.top_y - initial.top_y).abs() > 1.0, "pair should bob");
    assert!((moved.bottom_y - moved.top_y - initial.gap).abs() < 1e-3);

    let _ = harness.tick(Duration::from_millis(2_700));
    let returned = query::pair_view(&harness.world).into_vec()[0];
    assert!(
        (returned.top_y - initial.top_y).abs() < 1e-2,
        "yoyo returns after two legs"
    );
}

#[test]
fn decorated_variant_tints_both_halves() {
    let mut harness = Harness::new();
    let _ = harness.force(Variant::Decorated);
    let pair = query::pair_view(&harness.world).into_vec()[0];
    let expected = Tint::from_rgb(0xff, 0x8a, 0x3d);
    assert_eq!(pair.tint, Some(expected));

    let pool = query::pool(&harness.world);
    for slot in [pair.top_slot, pair.bottom_slot] {
        assert_eq!(pool.slot(slot).and_then(|slot| slot.tint()), Some(expected));
    }
    assert!(!pair.oscillating, "tint does not change motion");
}

#[test]
fn behavior_for_missing_pair_is_ignored() {
    let mut harness = Harness::new();
    let events = harness.pump(vec![
        Command::TintPair {
            pair: PairId::new(99),
            tint: Tint::from_rgb(1, 2, 3),
        },
        Command::MarkPairScored {
            pair: PairId::new(99),
        },
    ]);
    assert!(events.is_empty());
    assert_eq!(query::active_pair_count(&harness.world), 0);
}
