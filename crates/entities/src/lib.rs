#![doc = include_str!("../README.md")]

mod accounts;
mod catalog;
mod commerce;
mod community;
mod marketplace;

use bazaar_orm::schema::{Alias, ColumnDef, Expr};

pub use self::accounts::{User, UserProfile};
pub use self::catalog::{Category, Plugin, PluginCard, Version};
pub use self::commerce::{Earning, Order, OrderSummary, Payment, Payout, PendingEarning};
pub use self::community::{Comment, Vote};
pub use self::marketplace::Marketplace;

// Column definition helpers shared by the entity schemas.

fn column(name: &'static str) -> ColumnDef {
    ColumnDef::new(Alias::new(name))
}

fn id(name: &'static str) -> ColumnDef {
    let mut def = column(name);
    def.integer().not_null().primary_key().auto_increment();
    def
}

fn created_at(name: &'static str) -> ColumnDef {
    let mut def = column(name);
    def.timestamp().not_null().default(Expr::current_timestamp());
    def
}
