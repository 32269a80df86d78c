use atron_mining_core::{Coordinate, Counter, Direction};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Mutation {
    Set(i64),
    Count(i64),
    Reset,
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        (-1_000i64..1_000).prop_map(Mutation::Set),
        (-1_000i64..1_000).prop_map(Mutation::Count),
        Just(Mutation::Reset),
    ]
}

fn cardinal() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::CARDINALS.to_vec())
}

proptest! {
    #[test]
    fn counter_value_stays_within_bounds(
        start in 0i64..100,
        headroom in 0i64..100,
        mutations in prop::collection::vec(mutation(), 0..64),
    ) {
        let max = start + headroom;
        let mut counter = Counter::new(start, max).expect("valid bounds");
        for mutation in mutations {
            match mutation {
                Mutation::Set(value) => counter.set(value),
                Mutation::Count(delta) => counter.count(delta),
                Mutation::Reset => counter.reset(),
            }
            prop_assert!(counter.get() >= 0);
            prop_assert!(counter.get() <= max);
        }
        counter.reset();
        prop_assert_eq!(counter.get(), start);
    }

    #[test]
    fn opposite_translation_returns_home(
        x in -1_000i32..1_000,
        y in -1_000i32..1_000,
        direction in cardinal(),
    ) {
        let origin = Coordinate::new(x, y);
        let there = origin.translate_one(direction);
        prop_assert_eq!(there.translate_one(direction.opposite()), origin);
        prop_assert_eq!(origin.manhattan_distance(there), 1);
    }
}
