//! Skein gameplay actions
//!
//! Effects built on top of the simulation kernel:
//! - Movement and the basic attack
//! - Group create / join / respond / leave
//! - Items, bags and activation
//! - Skills and casting
//! - Trade tickets

pub mod attack;
pub mod group;
pub mod items;
pub mod movement;
pub mod player;
pub mod skills;
pub mod trade;

pub use attack::NormalAttack;
pub use group::{CreateGroup, JoinAnswer, JoinGroup, LeaveGroup, RespondJoin};
pub use items::{install, uninstall, Activate, Bag, Deactivate, Item, ItemId};
pub use movement::{move_by, MoveTo};
pub use player::{spawn_player, Stats, PLAYER_CLASS};
pub use skills::{Cast, Caster, Skill};
pub use trade::{
    CancelTrade, CreateTrade, Direction, ItemEdit, SetTradeItem, SetTradeMoney, ShakeTrade, Stake,
    TicketId,
};
