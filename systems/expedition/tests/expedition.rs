use atron_mining_core::{AtronKind, Command, Coordinate, Direction, Event, Icon};
use atron_mining_system_dispatch::DispatchConfig;
use atron_mining_system_expedition::{Expedition, ExpeditionConfig};
use atron_mining_world::{GenerationConfig, MapData};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

fn occupied_tiles(expedition: &Expedition) -> usize {
    expedition
        .map()
        .tiles()
        .filter(|tile| tile.surface().is_atron())
        .count()
}

fn deployed_atrons(expedition: &Expedition) -> usize {
    let drones = expedition
        .overlord()
        .drones()
        .filter(|drone| drone.is_deployed())
        .count();
    drones + usize::from(expedition.player().is_deployed())
}

#[test]
fn overlord_scouts_mines_and_banks_a_deposit() {
    let map = MapData::parse("######\n#_  3#\n#    #\n######").expect("valid map");
    let mut expedition = Expedition::new(
        map,
        ExpeditionConfig {
            tick_budget: 100,
            refined_quota: 100,
            dispatch: DispatchConfig {
                scouts: 1,
                miners: 1,
                scout_sorties: 1,
            },
        },
    )
    .expect("valid config");

    let first = expedition.advance();
    assert!(matches!(first.command, Command::Deploy { .. }));

    let mut commands = vec![first.command];
    while !expedition.is_finished() {
        commands.push(expedition.advance().command);
    }

    assert_eq!(expedition.refined().get(), 3);
    assert!(expedition.map().minerals().is_empty());
    assert_eq!(
        expedition.map().tile(Coordinate::new(4, 1)).expect("on map").surface(),
        Icon::Empty
    );
    let deploys = commands
        .iter()
        .filter(|command| matches!(command, Command::Deploy { .. }))
        .count();
    assert_eq!(deploys, 2);
    assert!(expedition.overlord().tasked().is_empty());
    assert_eq!(expedition.tick(), 100);
}

#[test]
fn one_command_per_tick_and_one_atron_per_tile() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let config = GenerationConfig::random(&mut rng);
    let map = MapData::from_scratch(&config, &mut rng).expect("valid config");
    let mut expedition = Expedition::new(map, ExpeditionConfig::default()).expect("valid config");

    let mut previous_ticks = expedition.ticks().get();
    while !expedition.is_finished() {
        let report = expedition.advance();
        let deployed = report
            .events
            .iter()
            .filter(|event| matches!(event, Event::AtronDeployed { .. }))
            .count();
        assert!(deployed <= 1);
        assert_eq!(occupied_tiles(&expedition), deployed_atrons(&expedition));
        assert_eq!(expedition.ticks().get(), previous_ticks - 1);
        previous_ticks = expedition.ticks().get();
    }

    assert!(expedition.refined().get() <= 100);
    assert!(expedition
        .overlord()
        .drones()
        .filter(|drone| drone.kind() == AtronKind::Scout)
        .all(|scout| scout.payload().get() == 0));
}

#[test]
fn quota_ends_the_expedition_early() {
    let map = MapData::parse("#####\n#_2 #\n#####").expect("valid map");
    let mut expedition = Expedition::new(
        map,
        ExpeditionConfig {
            tick_budget: 50,
            refined_quota: 2,
            dispatch: DispatchConfig {
                scouts: 0,
                miners: 0,
                scout_sorties: 0,
            },
        },
    )
    .expect("valid config");
    let _ = expedition.start().expect("free landing zone");

    let _ = expedition.submit_input_token("e");
    let _ = expedition.submit_input_token("E");
    assert_eq!(expedition.player().payload().get(), 2);
    assert_eq!(expedition.extract_player().expect("on landing zone"), 2);

    assert!(expedition.is_finished());
    assert_eq!(expedition.tick(), 2);
}

#[test]
fn input_before_landing_does_not_carry_over() {
    let map = MapData::parse("#####\n#_  #\n#####").expect("valid map");
    let mut expedition = Expedition::new(
        map,
        ExpeditionConfig {
            tick_budget: 10,
            refined_quota: 10,
            dispatch: DispatchConfig {
                scouts: 0,
                miners: 0,
                scout_sorties: 0,
            },
        },
    )
    .expect("valid config");

    let _ = expedition.submit_input(Direction::East);
    assert!(!expedition.player().is_deployed());

    let _ = expedition.start().expect("free landing zone");
    let _ = expedition.advance();
    assert_eq!(
        expedition.player().coordinate(),
        Some(expedition.map().landing_zone())
    );
}
