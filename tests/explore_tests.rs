//! Integration tests for the explore cascade and ambush locking.

use delve::{
    DataProvider, DungeonMap, Fog, ImmediatePresenter, Item, Join, JsonDataProvider, Position,
    PresentationRequest, QueuedPresenter, Terrain, Unit, UnitDetails,
};
use std::collections::HashSet;

fn potion() -> Item {
    let data = JsonDataProvider::builtin().unwrap();
    Item::from_details(data.item("potion").unwrap())
}

fn rat() -> Unit {
    Unit::new(&UnitDetails::new("rat", 5, 4, 1))
}

fn wall_states(map: &DungeonMap) -> Vec<(Position, Terrain, Fog)> {
    map.grid()
        .tiles()
        .filter(|tile| tile.is_wall())
        .map(|tile| (tile.position(), tile.terrain(), tile.fog()))
        .collect()
}

#[test]
fn test_explore_reveals_target_and_four_neighbours() {
    let mut map = DungeonMap::new(10, 8);
    let walls_before = wall_states(&map);
    let join = Join::new();
    let mut presenter = QueuedPresenter::new();

    let revealed = map.explore_at(2, 2, &mut presenter, &join);

    let expected: HashSet<Position> = [(2, 2), (2, 1), (2, 3), (1, 2), (3, 2)]
        .into_iter()
        .map(|(x, y)| Position::new(x, y))
        .collect();
    assert_eq!(revealed.iter().copied().collect::<HashSet<_>>(), expected);
    assert_eq!(
        map.revealed_tiles()
            .iter()
            .filter(|tile| !tile.is_wall())
            .count(),
        5
    );
    assert_eq!(wall_states(&map), walls_before);

    // One reveal request per tile, joined before the cascade counts as done
    assert_eq!(join.pending(), 5);
    let requested: HashSet<Position> = presenter
        .history()
        .iter()
        .filter_map(|request| match request {
            PresentationRequest::Reveal(position) => Some(*position),
            _ => None,
        })
        .collect();
    assert_eq!(requested, expected);
    presenter.flush();
    assert!(join.is_complete());
}

#[test]
fn test_explore_skips_locked_neighbours() {
    let mut map = DungeonMap::new(10, 8);
    map.grid_mut().get_mut(5, 3).unwrap().place_enemy(rat()).unwrap();
    map.grid_mut().get_mut(5, 4).unwrap().place_item(potion()).unwrap();

    // Reveals the rat but not the potion below it
    map.explore_at(5, 2, &mut ImmediatePresenter, &Join::new());
    let potion_tile = map.tile(5, 4).unwrap();
    assert!(potion_tile.is_hidden());
    assert!(potion_tile.is_locked());

    let revealed = map.explore_at(4, 4, &mut ImmediatePresenter, &Join::new());
    assert!(!revealed.contains(&Position::new(5, 4)));
    assert!(map.tile(5, 4).unwrap().is_hidden());
}

#[test]
fn test_items_revealed_with_their_guard_are_locked() {
    let mut map = DungeonMap::new(10, 8);
    map.grid_mut().get_mut(3, 2).unwrap().place_enemy(rat()).unwrap();
    map.grid_mut().get_mut(2, 2).unwrap().place_item(potion()).unwrap();

    map.explore_at(2, 2, &mut ImmediatePresenter, &Join::new());

    assert!(map.tile(2, 2).unwrap().is_revealed());
    assert!(map.tile(2, 2).unwrap().is_locked());
    assert!(!map.can_interact_at(2, 2));
    assert!(map.can_attack_at(3, 2));
}

#[test]
fn test_reexploring_is_a_no_op_for_revealed_tiles() {
    let mut map = DungeonMap::new(10, 8);
    map.explore_at(4, 3, &mut ImmediatePresenter, &Join::new());

    let join = Join::new();
    let mut presenter = QueuedPresenter::new();
    let revealed = map.explore_at(4, 3, &mut presenter, &join);

    assert!(revealed.is_empty());
    assert!(presenter.history().is_empty());
    assert!(join.is_complete());
}

#[test]
fn test_explore_out_of_bounds_does_nothing() {
    let mut map = DungeonMap::new(10, 8);
    let before = map.clone();
    assert!(map
        .explore_at(-3, 12, &mut ImmediatePresenter, &Join::new())
        .is_empty());
    assert_eq!(map, before);
}

#[test]
fn test_dead_enemies_release_locks() {
    let mut map = DungeonMap::new(10, 8);
    map.grid_mut().get_mut(3, 3).unwrap().place_enemy(rat()).unwrap();
    map.grid_mut().get_mut(4, 4).unwrap().place_enemy(rat()).unwrap();
    map.grid_mut().get_mut(3, 4).unwrap().place_item(potion()).unwrap();

    map.explore_at(3, 3, &mut ImmediatePresenter, &Join::new());
    map.explore_at(4, 3, &mut ImmediatePresenter, &Join::new());
    assert!(map.tile(4, 4).unwrap().is_revealed());
    assert!(map.tile(3, 4).unwrap().is_locked());

    // Two guards: killing one is not enough
    map.damage_enemy_at(3, 3, 99).unwrap();
    assert!(map.validate_locks().is_empty());
    assert!(map.tile(3, 4).unwrap().is_locked());

    map.damage_enemy_at(4, 4, 99).unwrap();
    assert_eq!(map.validate_locks(), vec![Position::new(3, 4)]);
    assert!(map.can_interact_at(3, 4));
}
