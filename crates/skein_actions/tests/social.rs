use skein_actions::{
    install, spawn_player, Bag, CreateGroup, CreateTrade, Direction, Item, ItemEdit, JoinGroup,
    LeaveGroup, RespondJoin, SetTradeItem, SetTradeMoney, ShakeTrade, Stake, Stats,
};
use skein_core::ecs::EntityId;
use skein_core::grid::spawn_map;
use skein_core::sim::{FixedRoll, GameState, RecordingLogger};

struct Trinket(&'static str);

impl Item for Trinket {
    fn name(&self) -> &str {
        self.0
    }

    fn weight(&self) -> u32 {
        5
    }
}

fn town(names: &[&str]) -> (GameState, Vec<EntityId>, RecordingLogger) {
    let recorder = RecordingLogger::new();
    let mut state = GameState::new(FixedRoll(0.0));
    state.add_logger(recorder.clone());
    let map = spawn_map(&mut state.world, 10, 10, "town").unwrap();
    let stats = Stats {
        constitution: 10.0,
        dexterity: 10.0,
        ..Stats::default()
    };
    let ids = names
        .iter()
        .enumerate()
        .map(|(i, name)| spawn_player(&mut state, name, stats, map, i as i32, 0).unwrap())
        .collect();
    (state, ids, recorder)
}

#[test]
fn join_request_waits_for_the_owner() {
    let (mut state, ids, recorder) = town(&["ann", "bob"]);
    let (ann, bob) = (ids[0], ids[1]);

    state.submit(CreateGroup::new(ann, "red")).unwrap();
    state.submit(JoinGroup::new(bob, "red")).unwrap();
    for _ in 0..3 {
        state.advance().unwrap();
    }
    assert_eq!(state.pending(), 1);
    assert_eq!(state.group_of(bob), None);

    state.submit(RespondJoin::new(ann, "red", "bob", true)).unwrap();
    state.advance().unwrap();
    state.advance().unwrap();

    assert_eq!(state.pending(), 0);
    assert_eq!(state.group("red").unwrap().members, vec![ann, bob]);
    assert!(state.same_group(ann, bob));
    assert!(recorder.contains("joined group [red]"));
}

#[test]
fn owner_leaving_hands_over_the_group() {
    let (mut state, ids, recorder) = town(&["ann", "bob", "cid"]);
    state.create_group(ids[0], "red").unwrap();
    state.join_group(ids[1], "red").unwrap();
    state.join_group(ids[2], "red").unwrap();

    state.submit(LeaveGroup::new(ids[0])).unwrap();
    state.advance().unwrap();
    assert_eq!(state.group("red").unwrap().owner, ids[1]);
    assert!(recorder.contains("is now bob"));

    state.submit(LeaveGroup::new(ids[1])).unwrap();
    state.submit(LeaveGroup::new(ids[2])).unwrap();
    state.advance().unwrap();
    assert!(state.group("red").is_none());
}

#[test]
fn trade_swaps_money_and_items() {
    let (mut state, ids, recorder) = town(&["ann", "bob"]);
    let (ann, bob) = (ids[0], ids[1]);
    state.world.fetch::<Bag>(ann).unwrap().add_money(500);
    let ring = install(&mut state, bob, Trinket("ring")).unwrap().unwrap();

    let trade = CreateTrade::new(ann, bob, Stake::default(), Stake::default());
    let ticket = trade.ticket;
    state.submit(trade).unwrap();
    state
        .submit(SetTradeMoney::new(ann, ticket, 120, Direction::Give))
        .unwrap();
    state
        .submit(SetTradeItem::new(bob, ticket, ring, ItemEdit::Add, Direction::Give))
        .unwrap();
    state.submit(ShakeTrade::new(ann, ticket)).unwrap();
    state.advance().unwrap();
    assert_eq!(state.pending(), 1);

    state.submit(ShakeTrade::new(bob, ticket)).unwrap();
    state.advance().unwrap();
    state.advance().unwrap();

    assert_eq!(state.pending(), 0);
    let ann_bag = state.world.get::<Bag>(ann).unwrap();
    let bob_bag = state.world.get::<Bag>(bob).unwrap();
    assert_eq!(ann_bag.money(), 380);
    assert_eq!(bob_bag.money(), 120);
    assert!(ann_bag.has_item(ring));
    assert!(!bob_bag.has_item(ring));
    assert_eq!(bob_bag.load(), 0);
    assert!(recorder.contains("completed"));
}

#[test]
fn trade_fails_when_an_item_is_gone() {
    let (mut state, ids, recorder) = town(&["ann", "bob"]);
    let (ann, bob) = (ids[0], ids[1]);
    let ring = install(&mut state, bob, Trinket("ring")).unwrap().unwrap();

    let mut wanted = Stake::default();
    wanted.items.insert(ring);
    let trade = CreateTrade::new(ann, bob, Stake::default(), wanted);
    let ticket = trade.ticket;
    state.submit(trade).unwrap();
    state.submit(ShakeTrade::new(ann, ticket)).unwrap();
    state.submit(ShakeTrade::new(bob, ticket)).unwrap();
    skein_actions::uninstall(&mut state, bob, ring).unwrap();
    state.advance().unwrap();
    state.advance().unwrap();

    assert_eq!(state.pending(), 0);
    assert!(!state.world.get::<Bag>(ann).unwrap().has_item(ring));
    assert!(recorder.contains("bob does not have"));
}
