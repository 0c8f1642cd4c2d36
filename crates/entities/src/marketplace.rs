//! # Marketplace context
//!
//! Every repository, opened once at start-up over one shared connection and
//! passed to the handlers that need it.

use std::sync::Arc;

use anyhow::{Context, Result};
use bazaar::Backend;
use bazaar_orm::{
    Condition, Connection, Connector, Entity, FetchValue, Fields, FromRow, Mode, Query,
    Repository, WhereClause,
};
use bazaar_store::{ConnectOptions, SqliteStore};

use crate::{
    Category, Comment, Earning, Order, OrderSummary, Payment, Payout, PendingEarning, Plugin,
    User, Version, Vote,
};

/// One repository per marketplace table.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub struct Marketplace {
    pub users: Repository<User>,
    pub categories: Repository<Category>,
    pub plugins: Repository<Plugin>,
    pub versions: Repository<Version>,
    pub comments: Repository<Comment>,
    pub votes: Repository<Vote>,
    pub orders: Repository<Order>,
    pub payments: Repository<Payment>,
    pub earnings: Repository<Earning>,
    pub payouts: Repository<Payout>,
}

impl Marketplace {
    /// Open every repository on `conn`, creating missing tables.
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index cannot be created.
    pub async fn open(conn: Arc<dyn Connection>) -> Result<Self> {
        let market = Self {
            users: Repository::open(Arc::clone(&conn)).await?,
            categories: Repository::open(Arc::clone(&conn)).await?,
            plugins: Repository::open(Arc::clone(&conn)).await?,
            versions: Repository::open(Arc::clone(&conn)).await?,
            comments: Repository::open(Arc::clone(&conn)).await?,
            votes: Repository::open(Arc::clone(&conn)).await?,
            orders: Repository::open(Arc::clone(&conn)).await?,
            payments: Repository::open(Arc::clone(&conn)).await?,
            earnings: Repository::open(Arc::clone(&conn)).await?,
            payouts: Repository::open(conn).await?,
        };
        tracing::info!("marketplace repositories opened");
        Ok(market)
    }

    /// Connect to the database named by `SQL_DATABASE` and open every
    /// repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be loaded, the database cannot
    /// be opened, or a table cannot be created.
    pub async fn connect() -> Result<Self> {
        let store = SqliteStore::connect().await.context("connecting marketplace store")?;
        Self::open(Arc::new(store)).await
    }

    /// Connect with explicit options and open every repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or a table cannot be
    /// created.
    pub async fn connect_with(options: ConnectOptions) -> Result<Self> {
        let store =
            SqliteStore::connect_with(options).await.context("connecting marketplace store")?;
        Self::open(Arc::new(store)).await
    }

    /// Record `user_id`'s vote for `plugin_id` and bump the plugin's vote
    /// counter. Returns `false` if the user had already voted.
    ///
    /// The unique (plugin, user) index decides between concurrent votes: only
    /// the call whose insert lands bumps the counter. The vote and the
    /// counter are written by separate statements, so if the increment fails
    /// the vote stays recorded and the counter is one short.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub async fn vote(&self, plugin_id: i64, user_id: i64) -> Result<bool> {
        let vote = Fields::new().set(Vote::PLUGIN_ID, plugin_id).set(Vote::USER_ID, user_id);
        if self.votes.insert_or_ignore(&vote).await? == 0 {
            return Ok(false);
        }
        self.plugins
            .increment(Plugin::VOTES, 1, &Condition::eq(Plugin::ID, plugin_id).into(), Connector::And)
            .await?;

        tracing::info!(plugin_id, user_id, "vote recorded");
        Ok(true)
    }

    /// Post a comment and bump the plugin's comment counter.
    ///
    /// Not atomic: a failed increment leaves the comment posted.
    ///
    /// # Errors
    ///
    /// Returns an error if either statement fails.
    pub async fn comment(&self, plugin_id: i64, user_id: i64, body: &str) -> Result<()> {
        let comment = Fields::new()
            .set(Comment::PLUGIN_ID, plugin_id)
            .set(Comment::USER_ID, user_id)
            .set(Comment::BODY, body);
        self.comments.insert(&comment).await?;
        self.plugins
            .increment(Plugin::COMMENTS, 1, &Condition::eq(Plugin::ID, plugin_id).into(), Connector::And)
            .await?;

        tracing::info!(plugin_id, user_id, "comment posted");
        Ok(())
    }

    /// Hide a comment and decrement its plugin's comment counter. Returns
    /// `false` if the comment does not exist or is already hidden.
    ///
    /// Only the call that hides the comment decrements. Not atomic, like
    /// [`Marketplace::comment`].
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub async fn remove_comment(&self, comment_id: i64) -> Result<bool> {
        let by_id = WhereClause::from(Condition::eq(Comment::ID, comment_id));
        let query = Query::new().columns(&[Comment::PLUGIN_ID]).filter(by_id.clone());
        let Some(row) = self.comments.first(&query).await? else {
            return Ok(false);
        };
        let plugin_id = i64::fetch(&row, Comment::PLUGIN_ID)?;

        let visible = by_id.and(Condition::ne(Comment::STATUS, Comment::STATUS_DELETED));
        if self.comments.delete(&visible, Connector::And).await? == 0 {
            return Ok(false);
        }
        self.plugins
            .decrement(Plugin::COMMENTS, 1, &Condition::eq(Plugin::ID, plugin_id).into(), Connector::And)
            .await?;
        Ok(true)
    }

    /// Mark a pending order paid and credit the plugin's author with the
    /// amount net of `fee_rate` (a fraction, `0.1` for ten percent). Returns
    /// `false` if the order does not exist or is not pending.
    ///
    /// Only the call that moves the order out of `pending` credits the
    /// author. The order update and the earning insert are separate
    /// statements: if the insert fails the order reads as paid with no
    /// earning.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub async fn settle_order(&self, order_id: i64, fee_rate: f64) -> Result<bool> {
        let by_id = WhereClause::from(Condition::eq(Order::ID, order_id));
        let query = Query::new().columns(Order::min_columns()).filter(by_id.clone());
        let Some(row) = self.orders.first(&query).await? else {
            return Ok(false);
        };
        let order = OrderSummary::from_row(&row)?;
        if order.status != Order::STATUS_PENDING {
            return Ok(false);
        }

        // sales of since-deleted plugins still pay their author
        let query = Query::new()
            .columns(&[Plugin::AUTHOR_ID])
            .filter(Condition::eq(Plugin::ID, order.plugin_id));
        let plugin = self
            .plugins
            .with_deleted()
            .first(&query)
            .await?
            .with_context(|| format!("order {order_id} references missing plugin {}", order.plugin_id))?;
        let author_id = i64::fetch(&plugin, Plugin::AUTHOR_ID)?;

        // a concurrent settlement may have claimed the order since it was read
        let pending = by_id.and(Condition::eq(Order::STATUS, Order::STATUS_PENDING));
        let paid = Fields::new().set(Order::STATUS, Order::STATUS_PAID);
        if self.orders.update(&paid, &pending, Connector::And).await? == 0 {
            return Ok(false);
        }

        let fee = cents(order.amount * fee_rate);
        let earning = Fields::new()
            .set(Earning::AUTHOR_ID, author_id)
            .set(Earning::ORDER_ID, order_id)
            .set(Earning::AMOUNT, cents(order.amount - fee))
            .set(Earning::FEE, fee);
        self.earnings.insert_or_ignore(&earning).await?;

        tracing::info!(order_id, author_id, amount = order.amount, fee, "order settled");
        Ok(true)
    }

    /// Gather an author's pending earnings into a payout to `destination`.
    /// Returns the payout amount, or `None` when nothing is pending.
    ///
    /// Each earning is claimed by moving it out of `pending`, so concurrent
    /// requests never pay the same earning twice. The claims and the payout
    /// insert are separate statements: if the insert fails the claimed
    /// earnings read as paid with no payout.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails or an earning does not decode.
    pub async fn request_payout(&self, author_id: i64, destination: &str) -> Result<Option<f64>> {
        let pending = WhereClause::from(Condition::eq(Earning::AUTHOR_ID, author_id))
            .and(Condition::eq(Earning::STATUS, Earning::STATUS_PENDING));
        let query = Query::new().columns(Earning::min_columns()).filter(pending);
        let earnings: Vec<PendingEarning> =
            self.earnings.for_mode(Mode::Internal).get_as(&query).await?;

        let paid = Fields::new().set(Earning::STATUS, Earning::STATUS_PAID);
        let mut claimed = Vec::with_capacity(earnings.len());
        for earning in &earnings {
            let unclaimed = WhereClause::from(Condition::eq(Earning::ID, earning.id))
                .and(Condition::eq(Earning::STATUS, Earning::STATUS_PENDING));
            if self.earnings.update(&paid, &unclaimed, Connector::And).await? > 0 {
                claimed.push(earning.amount);
            }
        }
        if claimed.is_empty() {
            return Ok(None);
        }

        let amount = cents(claimed.iter().sum());
        let payout = Fields::new()
            .set(Payout::AUTHOR_ID, author_id)
            .set(Payout::AMOUNT, amount)
            .set(Payout::DESTINATION_ACCOUNT, destination);
        self.payouts.insert(&payout).await?;

        tracing::info!(author_id, amount, earnings = claimed.len(), "payout requested");
        Ok(Some(amount))
    }
}

// round to whole cents
fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert!((cents(9.99 * 0.15) - 1.5).abs() < f64::EPSILON);
        assert!((cents(9.99 - 1.5) - 8.49).abs() < f64::EPSILON);
        assert!((cents(0.0) - 0.0).abs() < f64::EPSILON);
    }
}
