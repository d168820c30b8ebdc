//! Property tests for the drip simulation.

use iv_drips_core::simulation::{advance, tick, DripState, SpeedMode};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn speed_mode() -> impl Strategy<Value = SpeedMode> {
    prop_oneof![Just(SpeedMode::Live), Just(SpeedMode::Demonstration)]
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn volume_strictly_decreases_until_exactly_zero(
        rate in 36u32..2_000,
        total in 1u32..3_000,
        mode in speed_mode(),
    ) {
        let mut states = vec![DripState::new(1, rate as f64, total as f64, None)];
        // At 100x, 36 ml/h drains 1 ml per tick, so 3000 ticks empties any bag here
        for _ in 0..20_000 {
            let before = states[0].current_volume;
            states = tick(&states, mode);
            let after = states[0].current_volume;

            if before > 0.0 {
                prop_assert!(after < before);
            } else {
                prop_assert_eq!(after, 0.0);
            }
            if after == 0.0 {
                break;
            }
        }

        if mode == SpeedMode::Demonstration {
            prop_assert_eq!(states[0].current_volume, 0.0);
            let again = tick(&states, mode);
            prop_assert_eq!(&again, &states);
        }
    }

    #[test]
    fn derived_fields_track_volume(
        rate in 1u32..2_000,
        total in 1u32..3_000,
        start_fraction in 0.0f64..=1.0,
        ticks in 0usize..500,
        mode in speed_mode(),
    ) {
        let start = total as f64 * start_fraction;
        let mut states = vec![DripState::new(7, rate as f64, total as f64, Some(start))];
        for _ in 0..ticks {
            states = tick(&states, mode);
        }
        let s = &states[0];

        prop_assert!(s.current_volume >= 0.0 && s.current_volume <= s.total_volume);
        prop_assert!(s.drip_level >= 0.0 && s.drip_level <= 100.0);
        prop_assert!((s.drip_level - 100.0 * s.current_volume / s.total_volume).abs() < 1e-9);

        prop_assert!(s.time_remaining >= 0.0);
        prop_assert_eq!(s.time_remaining == 0.0, s.current_volume == 0.0);
        if s.current_volume > 0.0 {
            prop_assert!((s.time_remaining - s.current_volume / s.rate * 60.0).abs() < 1e-9);
        }
    }

    #[test]
    fn advance_never_fails_on_hostile_parameters(
        rate in prop::num::f64::ANY,
        total in prop::num::f64::ANY,
        current in prop::option::of(prop::num::f64::ANY),
        elapsed in prop::num::f64::ANY,
        multiplier in prop::num::f64::ANY,
    ) {
        let state = DripState::new(1, rate, total, current);
        let next = advance(&[state], elapsed, multiplier);

        let s = &next[0];
        prop_assert!(s.rate > 0.0 && s.rate.is_finite());
        prop_assert!(s.total_volume > 0.0 && s.total_volume.is_finite());
        prop_assert!(s.current_volume >= 0.0 && s.current_volume <= s.total_volume);
        prop_assert!(s.drip_level >= 0.0 && s.drip_level <= 100.0);
    }
}
