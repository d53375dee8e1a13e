use barrier_race::economy::{card_set_bonus, CardCounts};
use barrier_race::ledger::{Ledger, PlayerPosition};
use barrier_race::path::{parse_path, SiteKind};
use barrier_race::turn_scheduler::next_player;
use proptest::prelude::*;

fn site_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("::-".to_owned()),
        (prop::sample::select(vec!["Mo", "V1", "V2", "Do", "Ri"]), 1..10usize)
            .prop_map(|(code, capacity)| format!("{code}{capacity}")),
    ]
}

proptest! {
    #[test]
    fn card_bonus_ignores_kind_order(mut counts in prop::array::uniform5(0..8u32)) {
        let bonus = card_set_bonus(&CardCounts::from_counts(counts));
        counts.reverse();
        prop_assert_eq!(bonus, card_set_bonus(&CardCounts::from_counts(counts)));
        counts.rotate_left(2);
        prop_assert_eq!(bonus, card_set_bonus(&CardCounts::from_counts(counts)));
    }

    #[test]
    fn path_survives_reserialization(
        inner in prop::collection::vec(site_token(), 0..12),
        players in 1..10usize,
    ) {
        let text = format!("{};::-{}::-", inner.len() + 2, inner.concat());
        let path = parse_path(&text, players).unwrap();
        prop_assert_eq!(path.len(), inner.len() + 2);
        prop_assert_eq!(path.to_string(), text);
        for site in path.sites().iter().filter(|s| s.kind == SiteKind::Barrier) {
            prop_assert_eq!(site.capacity, players);
        }
        prop_assert_eq!(parse_path(&path.to_string(), players).unwrap(), path);
    }

    #[test]
    fn next_player_is_behind_everybody(
        positions in prop::collection::vec((0..6usize, 0..4usize), 1..8),
    ) {
        let ledger = Ledger::from_positions(
            positions.iter().map(|&(site, rank)| PlayerPosition { site, rank }).collect(),
        );
        let chosen = next_player(&ledger).unwrap();
        let (site, rank) = positions[chosen];
        for &(other_site, other_rank) in &positions {
            prop_assert!(site <= other_site);
            if other_site == site {
                prop_assert!(rank >= other_rank);
            }
        }
    }
}
