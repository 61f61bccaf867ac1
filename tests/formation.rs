use league_lens::error::LensError;
use league_lens::formation::{build, roster_lines};
use league_lens::state::LineupPlayer;

fn player(number: u32, grid: &str) -> LineupPlayer {
    LineupPlayer {
        name: format!("Player {number}"),
        number: Some(number),
        grid: Some(grid.to_string()),
    }
}

fn four_four_two() -> Vec<LineupPlayer> {
    [
        "1:1", "2:1", "2:2", "2:3", "2:4", "3:1", "3:2", "3:3", "3:4", "4:1", "4:2",
    ]
    .iter()
    .enumerate()
    .map(|(i, grid)| player(i as u32 + 1, grid))
    .collect()
}

#[test]
fn four_four_two_renders_forwards_first() {
    let grid = build(Some("4-4-2"), &four_four_two()).expect("valid lineup");
    assert_eq!(grid.formation.as_deref(), Some("4-4-2"));
    assert_eq!(grid.rows.len(), 4);

    let columns: Vec<u8> = grid.rows.iter().map(|r| r.column).collect();
    assert_eq!(columns, vec![4, 3, 2, 1]);

    let spans: Vec<usize> = grid.rows.iter().map(|r| r.slots.len()).collect();
    assert_eq!(spans, vec![2, 4, 4, 1]);
    assert!(grid.rows.iter().all(|r| r.slots.iter().all(Option::is_some)));
    assert_eq!(grid.player_count(), 11);
}

#[test]
fn slots_follow_row_order_within_a_band() {
    let grid = build(None, &four_four_two()).expect("valid lineup");
    let forwards: Vec<Option<u32>> = grid.rows[0]
        .slots
        .iter()
        .map(|s| s.as_ref().and_then(|s| s.number))
        .collect();
    assert_eq!(forwards, vec![Some(10), Some(11)]);
    assert_eq!(grid.rows[3].slots[0].as_ref().map(|s| s.name.as_str()), Some("Player 1"));
}

#[test]
fn max_row_defines_span() {
    let players = vec![player(1, "1:1"), player(9, "2:3")];
    let grid = build(None, &players).expect("valid lineup");
    let top = &grid.rows[0];
    assert_eq!(top.column, 2);
    assert_eq!(top.slots.len(), 3);
    assert!(top.slots[0].is_none());
    assert!(top.slots[1].is_none());
    assert_eq!(top.slots[2].as_ref().and_then(|s| s.number), Some(9));
}

#[test]
fn column_without_players_has_no_slots() {
    let players = vec![player(1, "1:1"), player(9, "3:1")];
    let grid = build(None, &players).expect("valid lineup");
    let spans: Vec<(u8, usize)> = grid.rows.iter().map(|r| (r.column, r.slots.len())).collect();
    assert_eq!(spans, vec![(3, 1), (2, 0), (1, 1)]);
}

#[test]
fn formation_string_does_not_drive_layout() {
    let grid = build(Some("3-5-2"), &four_four_two()).expect("valid lineup");
    let spans: Vec<usize> = grid.rows.iter().map(|r| r.slots.len()).collect();
    assert_eq!(spans, vec![2, 4, 4, 1]);
}

#[test]
fn malformed_grid_position_rejects_lineup() {
    let mut players = four_four_two();
    players[5].grid = Some("3-1".to_string());
    match build(None, &players) {
        Err(LensError::InvalidGridPosition { player, raw }) => {
            assert_eq!(player, "Player 6");
            assert_eq!(raw, "3-1");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    players[5].grid = None;
    assert!(matches!(
        build(None, &players),
        Err(LensError::InvalidGridPosition { .. })
    ));
}

#[test]
fn empty_lineup_is_empty_grid() {
    let grid = build(Some(""), &[]).expect("empty lineup");
    assert!(grid.rows.is_empty());
    assert!(grid.formation.is_none());
}

#[test]
fn roster_lists_name_and_number() {
    let mut players = vec![player(7, "3:1")];
    players.push(LineupPlayer {
        name: "Unnumbered".to_string(),
        number: None,
        grid: None,
    });
    assert_eq!(
        roster_lines(&players),
        vec!["Player 7 (7)".to_string(), "Unnumbered (-)".to_string()]
    );
}
