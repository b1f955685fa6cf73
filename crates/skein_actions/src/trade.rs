//! Trade tickets
//!
//! `CreateTrade` opens a ticket between two units and stays queued until
//! both parties have shaken on it (or it is cancelled). While it waits,
//! the other trade effects locate it by ticket id through the scheduler
//! and edit its terms or flags in place. Once both have shaken, the ticket
//! checks that each side can pay and then swaps money and items.

use crate::items::{transfer, Bag, ItemId};
use skein_core::combat::Board;
use skein_core::ecs::EntityId;
use skein_core::sim::{Effect, GameState, SimError, Step};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(Uuid);

impl TicketId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Money and items one side hands over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stake {
    pub money: i64,
    pub items: BTreeSet<ItemId>,
}

/// Which side of the deal an edit applies to, from the editor's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// What the editing party hands over.
    Give,
    /// What the editing party gets.
    Receive,
}

pub struct CreateTrade {
    pub ticket: TicketId,
    pub emitter: EntityId,
    pub target: EntityId,
    /// Paid by the emitter.
    pub cost: Stake,
    /// Paid by the target.
    pub gain: Stake,
    pub shaken_by_emitter: bool,
    pub shaken_by_target: bool,
    pub cancelled: bool,
}

impl CreateTrade {
    pub fn new(emitter: EntityId, target: EntityId, cost: Stake, gain: Stake) -> Self {
        Self {
            ticket: TicketId::new(),
            emitter,
            target,
            cost,
            gain,
            shaken_by_emitter: false,
            shaken_by_target: false,
            cancelled: false,
        }
    }

    pub fn is_party(&self, unit: EntityId) -> bool {
        unit == self.emitter || unit == self.target
    }

    /// The stake `editor` is editing in `direction`, or `None` for outsiders.
    pub fn stake_mut(&mut self, editor: EntityId, direction: Direction) -> Option<&mut Stake> {
        match (editor == self.emitter, editor == self.target, direction) {
            (true, _, Direction::Give) | (false, true, Direction::Receive) => Some(&mut self.cost),
            (true, _, Direction::Receive) | (false, true, Direction::Give) => Some(&mut self.gain),
            _ => None,
        }
    }

    fn fail(&self, state: &mut GameState, reason: String) -> Step {
        state.log_units(
            format!("trade [{}] failed: {reason}", self.ticket),
            &[self.emitter, self.target],
            false,
        );
        Step::Done
    }

    /// First reason the exchange cannot happen, if any.
    fn check(&self, state: &mut GameState) -> Result<Option<String>, SimError> {
        for (payer, stake) in [(self.emitter, &self.cost), (self.target, &self.gain)] {
            let name = state.name_of(payer);
            let bag = state.world.fetch::<Bag>(payer)?;
            if bag.money() < stake.money {
                return Ok(Some(format!("{name} does not have enough money")));
            }
            if let Some(missing) = stake.items.iter().find(|&&id| !bag.has_item(id)) {
                return Ok(Some(format!("{name} does not have {missing}")));
            }
        }
        Ok(None)
    }
}

impl Effect for CreateTrade {
    fn name(&self) -> &'static str {
        "trade"
    }

    fn on_start(&mut self, state: &mut GameState) -> Result<(), SimError> {
        if !state.world.fetch::<Board>(self.target)?.alive {
            self.shaken_by_target = true;
        }
        state.log_units(
            format!("trade [{}] opened", self.ticket),
            &[self.emitter, self.target],
            false,
        );
        Ok(())
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        if self.cancelled {
            return Ok(Step::Done);
        }
        if !(self.shaken_by_emitter && self.shaken_by_target) {
            return Ok(Step::Pending);
        }
        if let Some(reason) = self.check(state)? {
            return Ok(self.fail(state, reason));
        }

        let net = self.gain.money - self.cost.money;
        state.world.fetch::<Bag>(self.emitter)?.add_money(net);
        state.world.fetch::<Bag>(self.target)?.add_money(-net);

        for &id in &self.cost.items {
            transfer(state, self.emitter, self.target, id)?;
        }
        for &id in &self.gain.items {
            transfer(state, self.target, self.emitter, id)?;
        }

        state.log_units(
            format!("trade [{}] completed", self.ticket),
            &[self.emitter, self.target],
            true,
        );
        Ok(Step::Done)
    }
}

fn unknown_ticket(state: &mut GameState, emitter: EntityId, ticket: TicketId) -> Step {
    state.log_units(format!("no open trade [{ticket}]"), &[emitter], false);
    Step::Done
}

/// Confirm a trade.
pub struct ShakeTrade {
    pub emitter: EntityId,
    pub ticket: TicketId,
}

impl ShakeTrade {
    pub fn new(emitter: EntityId, ticket: TicketId) -> Self {
        Self { emitter, ticket }
    }
}

impl Effect for ShakeTrade {
    fn name(&self) -> &'static str {
        "shake_trade"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let (emitter, ticket) = (self.emitter, self.ticket);
        let Some(trade) = state.find_effect_mut::<CreateTrade>(|trade| trade.ticket == ticket) else {
            return Ok(unknown_ticket(state, emitter, ticket));
        };
        let side = if emitter == trade.emitter {
            trade.shaken_by_emitter = true;
            "creator"
        } else if emitter == trade.target {
            trade.shaken_by_target = true;
            "counterparty"
        } else {
            return Ok(unknown_ticket(state, emitter, ticket));
        };
        let parties = [trade.emitter, trade.target];
        state.log_units(format!("trade [{ticket}] confirmed by the {side}"), &parties, false);
        Ok(Step::Done)
    }
}

/// Call off a trade.
pub struct CancelTrade {
    pub emitter: EntityId,
    pub ticket: TicketId,
}

impl CancelTrade {
    pub fn new(emitter: EntityId, ticket: TicketId) -> Self {
        Self { emitter, ticket }
    }
}

impl Effect for CancelTrade {
    fn name(&self) -> &'static str {
        "cancel_trade"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let (emitter, ticket) = (self.emitter, self.ticket);
        let Some(trade) = state.find_effect_mut::<CreateTrade>(|trade| {
            trade.ticket == ticket && trade.is_party(emitter)
        }) else {
            return Ok(unknown_ticket(state, emitter, ticket));
        };
        trade.cancelled = true;
        let parties = [trade.emitter, trade.target];
        state.log_units(format!("trade [{ticket}] cancelled"), &parties, false);
        Ok(Step::Done)
    }
}

/// Set the money on one side of a trade.
pub struct SetTradeMoney {
    pub emitter: EntityId,
    pub ticket: TicketId,
    pub money: i64,
    pub direction: Direction,
}

impl SetTradeMoney {
    pub fn new(emitter: EntityId, ticket: TicketId, money: i64, direction: Direction) -> Self {
        Self {
            emitter,
            ticket,
            money,
            direction,
        }
    }
}

impl Effect for SetTradeMoney {
    fn name(&self) -> &'static str {
        "set_trade_money"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let (emitter, ticket) = (self.emitter, self.ticket);
        let stake = state
            .find_effect_mut::<CreateTrade>(|trade| trade.ticket == ticket)
            .and_then(|trade| trade.stake_mut(emitter, self.direction));
        let Some(stake) = stake else {
            return Ok(unknown_ticket(state, emitter, ticket));
        };
        stake.money = self.money.max(0);
        let money = stake.money;
        state.log_units(format!("trade [{ticket}] money set to {money}"), &[emitter], false);
        Ok(Step::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemEdit {
    Add,
    Remove,
}

/// Add an item to, or remove it from, one side of a trade.
pub struct SetTradeItem {
    pub emitter: EntityId,
    pub ticket: TicketId,
    pub item: ItemId,
    pub edit: ItemEdit,
    pub direction: Direction,
}

impl SetTradeItem {
    pub fn new(
        emitter: EntityId,
        ticket: TicketId,
        item: ItemId,
        edit: ItemEdit,
        direction: Direction,
    ) -> Self {
        Self {
            emitter,
            ticket,
            item,
            edit,
            direction,
        }
    }
}

impl Effect for SetTradeItem {
    fn name(&self) -> &'static str {
        "set_trade_item"
    }

    fn on_step(&mut self, state: &mut GameState) -> Result<Step, SimError> {
        let (emitter, ticket, item) = (self.emitter, self.ticket, self.item);
        let stake = state
            .find_effect_mut::<CreateTrade>(|trade| trade.ticket == ticket)
            .and_then(|trade| trade.stake_mut(emitter, self.direction));
        let Some(stake) = stake else {
            return Ok(unknown_ticket(state, emitter, ticket));
        };
        let message = match self.edit {
            ItemEdit::Add => {
                stake.items.insert(item);
                format!("trade [{ticket}] added {item}")
            }
            ItemEdit::Remove => {
                stake.items.remove(&item);
                format!("trade [{ticket}] removed {item}")
            }
        };
        state.log_units(message, &[emitter], false);
        Ok(Step::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_core::ecs::{Component, EntityClass};
    use skein_core::sim::{FixedRoll, RecordingLogger};
    use skein_core::unit::Unit;
    use std::sync::Arc;

    fn setup() -> (GameState, EntityId, EntityId, RecordingLogger) {
        let class = Arc::new(EntityClass::new(
            "merchant",
            &[Unit::INFO, Board::INFO, Bag::INFO],
        ));
        let recorder = RecordingLogger::new();
        let mut state = GameState::new(FixedRoll(0.0));
        state.add_logger(recorder.clone());
        let a = state.spawn_unit(&class, "ann").unwrap();
        let b = state.spawn_unit(&class, "bob").unwrap();
        state.world.fetch::<Bag>(a).unwrap().add_money(100);
        state.world.fetch::<Bag>(b).unwrap().add_money(20);
        (state, a, b, recorder)
    }

    fn money(state: &GameState, unit: EntityId) -> i64 {
        state.world.get::<Bag>(unit).unwrap().money()
    }

    #[test]
    fn stake_selection_follows_the_editor() {
        let mut trade = CreateTrade::new(
            EntityId::from_bits(1),
            EntityId::from_bits(2),
            Stake::default(),
            Stake::default(),
        );
        let (a, b, c) = (trade.emitter, trade.target, EntityId::from_bits(3));
        trade.stake_mut(a, Direction::Give).unwrap().money = 1;
        trade.stake_mut(b, Direction::Give).unwrap().money = 2;
        assert_eq!((trade.cost.money, trade.gain.money), (1, 2));
        trade.stake_mut(a, Direction::Receive).unwrap().money = 3;
        trade.stake_mut(b, Direction::Receive).unwrap().money = 4;
        assert_eq!((trade.cost.money, trade.gain.money), (4, 3));
        assert!(trade.stake_mut(c, Direction::Give).is_none());
    }

    #[test]
    fn cancelled_trade_moves_nothing() {
        let (mut state, a, b, recorder) = setup();
        let trade = CreateTrade::new(
            a,
            b,
            Stake {
                money: 30,
                ..Stake::default()
            },
            Stake::default(),
        );
        let ticket = trade.ticket;
        state.submit(trade).unwrap();
        state.submit(CancelTrade::new(b, ticket)).unwrap();
        state.advance().unwrap();
        state.advance().unwrap();

        assert_eq!(state.pending(), 0);
        assert_eq!((money(&state, a), money(&state, b)), (100, 20));
        assert!(recorder.contains("cancelled"));
    }

    #[test]
    fn outsiders_cannot_shake() {
        let (mut state, a, b, recorder) = setup();
        let class = Arc::new(EntityClass::new("outsider", &[Unit::INFO]));
        let c = state.spawn_unit(&class, "cid").unwrap();
        let trade = CreateTrade::new(a, b, Stake::default(), Stake::default());
        let ticket = trade.ticket;
        state.submit(trade).unwrap();
        state.submit(ShakeTrade::new(c, ticket)).unwrap();
        state.advance().unwrap();

        let open = state.find_effect::<CreateTrade>(|t| t.ticket == ticket).unwrap();
        assert!(!open.shaken_by_emitter && !open.shaken_by_target);
        assert!(recorder.contains("no open trade"));
    }

    #[test]
    fn insufficient_money_fails_the_trade() {
        let (mut state, a, b, recorder) = setup();
        let trade = CreateTrade::new(
            a,
            b,
            Stake::default(),
            Stake {
                money: 50,
                ..Stake::default()
            },
        );
        let ticket = trade.ticket;
        state.submit(trade).unwrap();
        state.submit(ShakeTrade::new(a, ticket)).unwrap();
        state.submit(ShakeTrade::new(b, ticket)).unwrap();
        state.advance().unwrap();
        state.advance().unwrap();

        assert_eq!(state.pending(), 0);
        assert_eq!((money(&state, a), money(&state, b)), (100, 20));
        assert!(recorder.contains("bob does not have enough money"));
    }

    #[test]
    fn dead_counterparty_counts_as_shaken() {
        let (mut state, a, b, _) = setup();
        state.world.fetch::<Board>(b).unwrap().alive = false;
        let trade = CreateTrade::new(
            a,
            b,
            Stake::default(),
            Stake {
                money: 20,
                ..Stake::default()
            },
        );
        let ticket = trade.ticket;
        state.submit(trade).unwrap();
        state.submit(ShakeTrade::new(a, ticket)).unwrap();
        state.advance().unwrap();
        state.advance().unwrap();

        assert_eq!((money(&state, a), money(&state, b)), (120, 0));
    }
}
