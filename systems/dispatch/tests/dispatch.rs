use atron_mining_core::{AtronId, AtronKind, Command, Coordinate, DroneState, Event};
use atron_mining_system_dispatch::{DispatchConfig, Overlord};
use atron_mining_world::{Atron, MapData};

const OVERLORD: AtronId = AtronId::new(0);

fn overlord(config: DispatchConfig) -> Overlord {
    Overlord::new(OVERLORD, config).expect("valid roster")
}

fn first_of(overlord: &Overlord, kind: AtronKind) -> AtronId {
    overlord
        .drones()
        .find(|drone| drone.kind() == kind)
        .map(Atron::id)
        .expect("roster has the kind")
}

fn reveal_all(map: &mut MapData) {
    for y in 0..map.height() {
        for x in 0..map.width() {
            map.reveal(Coordinate::new(x, y)).expect("on map");
        }
    }
}

#[test]
fn scout_goes_out_first_on_an_unexplored_map() {
    let map = MapData::parse("######\n#_   #\n#  3 #\n######").expect("valid map");
    let mut overlord = overlord(DispatchConfig::default());

    let command = overlord.handle(&[], &map);

    let scout = first_of(&overlord, AtronKind::Scout);
    assert_eq!(command, Command::Deploy { atron: scout });
}

#[test]
fn discovered_deposit_gets_a_miner_with_a_path() {
    let mut map = MapData::parse("######\n#_   #\n#  3 #\n######").expect("valid map");
    reveal_all(&mut map);
    let mut overlord = overlord(DispatchConfig::default());
    let deposit = Coordinate::new(3, 2);

    let command = overlord.handle(&[], &map);

    let miner = first_of(&overlord, AtronKind::Miner);
    assert_eq!(command, Command::Deploy { atron: miner });
    assert_eq!(overlord.tasked().get(&deposit), Some(&miner));
    let drone = overlord.drone(miner).expect("in roster");
    assert_eq!(drone.path().first(), Some(&map.landing_zone()));
    assert_eq!(drone.path().last(), Some(&deposit));
    assert_eq!(drone.state(), Some(DroneState::Traveling));
}

#[test]
fn deposits_behind_unexplored_ground_are_parked() {
    let mut map = MapData::parse("######\n#_   #\n#  3 #\n######").expect("valid map");
    let deposit = Coordinate::new(3, 2);
    map.reveal(deposit).expect("on map");
    let mut overlord = overlord(DispatchConfig::default());

    let command = overlord.handle(&[], &map);

    assert!(overlord.unreachable().contains(&deposit));
    assert_eq!(
        command,
        Command::Deploy {
            atron: first_of(&overlord, AtronKind::Scout)
        }
    );

    reveal_all(&mut map);
    let command = overlord.handle(&[], &map);
    assert_eq!(
        command,
        Command::Deploy {
            atron: first_of(&overlord, AtronKind::Miner)
        }
    );
    assert!(overlord.unreachable().is_empty());
}

#[test]
fn idle_drone_on_landing_zone_is_recalled() {
    let mut map = MapData::parse("#####\n#~_~#\n#####").expect("valid map");
    let mut overlord = overlord(DispatchConfig::default());
    let scout = first_of(&overlord, AtronKind::Scout);
    let mut events = Vec::new();

    let drone = overlord.drone_mut(scout).expect("in roster");
    map.deploy_atron(drone, &mut events).expect("free landing zone");
    map.tick(overlord.deployed_drones_mut(), &mut events);

    assert_eq!(
        overlord.drone(scout).and_then(Atron::state),
        Some(DroneState::Waiting)
    );
    assert_eq!(overlord.handle(&events, &map), Command::Return { atron: scout });
}

#[test]
fn occupied_landing_zone_means_idle() {
    let mut map = MapData::parse("######\n#_   #\n#  3 #\n######").expect("valid map");
    let mut player = Atron::new(AtronId::new(99), AtronKind::Player).expect("default stats");
    map.deploy_atron(&mut player, &mut Vec::new()).expect("free landing zone");
    reveal_all(&mut map);
    let mut overlord = overlord(DispatchConfig::default());

    assert_eq!(overlord.handle(&[], &map), Command::Idle);
    assert!(overlord.untasked().contains(&Coordinate::new(3, 2)));
}

#[test]
fn scouts_stop_after_their_sorties() {
    let map = MapData::parse("######\n#_   #\n#    #\n######").expect("valid map");
    let mut overlord = overlord(DispatchConfig {
        scouts: 1,
        miners: 1,
        scout_sorties: 1,
    });
    let scout = first_of(&overlord, AtronKind::Scout);

    let deployed = Event::AtronDeployed {
        atron: scout,
        at: map.landing_zone(),
    };
    let extracted = Event::AtronExtracted {
        atron: scout,
        payload: 0,
    };

    assert_eq!(overlord.handle(&[deployed, extracted], &map), Command::Idle);
    assert_eq!(overlord.sorties(), 1);
}

#[test]
fn extracted_miner_hands_back_a_live_deposit() {
    let mut map = MapData::parse("######\n#_   #\n#  3 #\n######").expect("valid map");
    reveal_all(&mut map);
    let mut overlord = overlord(DispatchConfig::default());
    let deposit = Coordinate::new(3, 2);
    let Command::Deploy { atron: miner } = overlord.handle(&[], &map) else {
        panic!("expected a deploy command");
    };

    overlord.observe(&[Event::AtronExtracted {
        atron: miner,
        payload: 10,
    }]);

    assert!(overlord.tasked().is_empty());
    assert!(overlord.untasked().contains(&deposit));
}
