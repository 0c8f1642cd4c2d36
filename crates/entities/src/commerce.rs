//! Sales and the money that follows them: orders, payments, author earnings
//! and payouts.
//!
//! Account numbers are stored in full but only ever listed masked: the
//! default and safe projections carry the `masked_*` column, and only
//! `all_columns` names the raw one.

use bazaar_orm::schema::{Alias, Index, IndexCreateStatement, Table, TableCreateStatement};
use bazaar_orm::{CompileError, Entity, Select, Value, record};

use crate::{column, created_at, id};

/// `'****'` followed by the last four characters of `column`.
fn masked(table: &str, column: &str, alias: &str) -> String {
    format!("'****' || substr({table}.{column}, -4) AS {alias}")
}

/// A purchase of a plugin.
pub struct Order;

#[allow(missing_docs)]
impl Order {
    pub const ID: &'static str = "id";
    pub const USER_ID: &'static str = "user_id";
    pub const PLUGIN_ID: &'static str = "plugin_id";
    pub const AMOUNT: &'static str = "amount";
    pub const STATUS: &'static str = "status";
    pub const CREATED_AT: &'static str = "created_at";
    /// Human-readable status, derived from `status`.
    pub const STATUS_TEXT: &'static str = "status_text";

    pub const STATUS_PENDING: &'static str = "pending";
    pub const STATUS_PAID: &'static str = "paid";
    pub const STATUS_FAILED: &'static str = "failed";
    pub const STATUS_REFUNDED: &'static str = "refunded";
}

impl Entity for Order {
    const TABLE: &'static str = "orders";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::USER_ID).integer().not_null())
            .col(column(Self::PLUGIN_ID).integer().not_null())
            .col(column(Self::AMOUNT).double().not_null())
            .col(column(Self::STATUS).string().not_null().default(Self::STATUS_PENDING))
            .col(created_at(Self::CREATED_AT))
            .to_owned()
    }

    fn indexes() -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .if_not_exists()
                .name("idx_orders_user")
                .table(Alias::new(Self::TABLE))
                .col(Alias::new(Self::USER_ID))
                .to_owned(),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &[
            Self::ID,
            Self::USER_ID,
            Self::PLUGIN_ID,
            Self::AMOUNT,
            Self::STATUS,
            Self::STATUS_TEXT,
            Self::CREATED_AT,
        ]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::USER_ID, Self::PLUGIN_ID, Self::AMOUNT, Self::STATUS, Self::STATUS_TEXT]
    }

    fn select_sql(select: &Select<'_>, values: &mut Vec<Value>) -> Result<String, CompileError> {
        let source = format!(
            "(SELECT {table}.*, CASE {table}.{status} \
             WHEN '{pending}' THEN 'Awaiting payment' \
             WHEN '{paid}' THEN 'Paid' \
             WHEN '{failed}' THEN 'Payment failed' \
             WHEN '{refunded}' THEN 'Refunded' \
             ELSE {table}.{status} END AS {status_text} FROM {source}) AS {table}",
            table = Self::TABLE,
            status = Self::STATUS,
            pending = Self::STATUS_PENDING,
            paid = Self::STATUS_PAID,
            failed = Self::STATUS_FAILED,
            refunded = Self::STATUS_REFUNDED,
            status_text = Self::STATUS_TEXT,
            source = select.source,
        );
        select.to_sql_from(&source, values)
    }
}

record! {
    /// An order with its derived status, decoded from
    /// [`Order::min_columns`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct OrderSummary {
        pub id: i64,
        pub user_id: i64,
        pub plugin_id: i64,
        pub amount: f64,
        pub status: String,
        pub status_text: String,
    }
}

/// A payment attempt against an order.
pub struct Payment;

#[allow(missing_docs)]
impl Payment {
    pub const ID: &'static str = "id";
    pub const ORDER_ID: &'static str = "order_id";
    pub const PROVIDER: &'static str = "provider";
    pub const ACCOUNT_NUMBER: &'static str = "account_number";
    pub const AMOUNT: &'static str = "amount";
    pub const STATUS: &'static str = "status";
    pub const CREATED_AT: &'static str = "created_at";
    /// `account_number` with all but the last four characters hidden.
    pub const MASKED_ACCOUNT: &'static str = "masked_account";
}

impl Entity for Payment {
    const TABLE: &'static str = "payments";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::ORDER_ID).integer().not_null())
            .col(column(Self::PROVIDER).string().not_null())
            .col(column(Self::ACCOUNT_NUMBER).string())
            .col(column(Self::AMOUNT).double().not_null())
            .col(column(Self::STATUS).string().not_null())
            .col(created_at(Self::CREATED_AT))
            .to_owned()
    }

    fn columns() -> &'static [&'static str] {
        Self::safe_columns()
    }

    fn safe_columns() -> &'static [&'static str] {
        &[
            Self::ID,
            Self::ORDER_ID,
            Self::PROVIDER,
            Self::MASKED_ACCOUNT,
            Self::AMOUNT,
            Self::STATUS,
            Self::CREATED_AT,
        ]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::ORDER_ID, Self::AMOUNT, Self::STATUS]
    }

    fn all_columns() -> &'static [&'static str] {
        &[
            Self::ID,
            Self::ORDER_ID,
            Self::PROVIDER,
            Self::ACCOUNT_NUMBER,
            Self::MASKED_ACCOUNT,
            Self::AMOUNT,
            Self::STATUS,
            Self::CREATED_AT,
        ]
    }

    fn select_sql(select: &Select<'_>, values: &mut Vec<Value>) -> Result<String, CompileError> {
        let source = format!(
            "(SELECT {table}.*, {masked} FROM {source}) AS {table}",
            table = Self::TABLE,
            masked = masked(Self::TABLE, Self::ACCOUNT_NUMBER, Self::MASKED_ACCOUNT),
            source = select.source,
        );
        select.to_sql_from(&source, values)
    }
}

/// An author's share of a paid order, net of the marketplace fee.
pub struct Earning;

#[allow(missing_docs)]
impl Earning {
    pub const ID: &'static str = "id";
    pub const AUTHOR_ID: &'static str = "author_id";
    pub const ORDER_ID: &'static str = "order_id";
    pub const AMOUNT: &'static str = "amount";
    pub const FEE: &'static str = "fee";
    pub const STATUS: &'static str = "status";
    pub const CREATED_AT: &'static str = "created_at";

    /// Not yet included in a payout.
    pub const STATUS_PENDING: &'static str = "pending";
    pub const STATUS_PAID: &'static str = "paid";
}

impl Entity for Earning {
    const TABLE: &'static str = "earnings";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::AUTHOR_ID).integer().not_null())
            .col(column(Self::ORDER_ID).integer().not_null().unique_key())
            .col(column(Self::AMOUNT).double().not_null())
            .col(column(Self::FEE).double().not_null().default(0.0))
            .col(column(Self::STATUS).string().not_null().default(Self::STATUS_PENDING))
            .col(created_at(Self::CREATED_AT))
            .to_owned()
    }

    fn indexes() -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .if_not_exists()
                .name("idx_earnings_author_status")
                .table(Alias::new(Self::TABLE))
                .col(Alias::new(Self::AUTHOR_ID))
                .col(Alias::new(Self::STATUS))
                .to_owned(),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &[Self::ID, Self::AUTHOR_ID, Self::ORDER_ID, Self::AMOUNT, Self::FEE, Self::STATUS, Self::CREATED_AT]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::AMOUNT]
    }
}

record! {
    /// An earning awaiting payout, decoded from [`Earning::min_columns`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct PendingEarning {
        pub id: i64,
        pub amount: f64,
    }
}

/// A transfer of accumulated earnings to an author.
pub struct Payout;

#[allow(missing_docs)]
impl Payout {
    pub const ID: &'static str = "id";
    pub const AUTHOR_ID: &'static str = "author_id";
    pub const AMOUNT: &'static str = "amount";
    pub const DESTINATION_ACCOUNT: &'static str = "destination_account";
    pub const STATUS: &'static str = "status";
    pub const CREATED_AT: &'static str = "created_at";
    pub const PAID_AT: &'static str = "paid_at";
    /// `destination_account` with all but the last four characters hidden.
    pub const MASKED_DESTINATION: &'static str = "masked_destination";

    pub const STATUS_REQUESTED: &'static str = "requested";
    pub const STATUS_PAID: &'static str = "paid";
}

impl Entity for Payout {
    const TABLE: &'static str = "payouts";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::AUTHOR_ID).integer().not_null())
            .col(column(Self::AMOUNT).double().not_null())
            .col(column(Self::DESTINATION_ACCOUNT).string().not_null())
            .col(column(Self::STATUS).string().not_null().default(Self::STATUS_REQUESTED))
            .col(created_at(Self::CREATED_AT))
            .col(column(Self::PAID_AT).timestamp())
            .to_owned()
    }

    fn columns() -> &'static [&'static str] {
        Self::safe_columns()
    }

    fn safe_columns() -> &'static [&'static str] {
        &[
            Self::ID,
            Self::AUTHOR_ID,
            Self::AMOUNT,
            Self::MASKED_DESTINATION,
            Self::STATUS,
            Self::CREATED_AT,
            Self::PAID_AT,
        ]
    }

    fn all_columns() -> &'static [&'static str] {
        &[
            Self::ID,
            Self::AUTHOR_ID,
            Self::AMOUNT,
            Self::DESTINATION_ACCOUNT,
            Self::MASKED_DESTINATION,
            Self::STATUS,
            Self::CREATED_AT,
            Self::PAID_AT,
        ]
    }

    fn select_sql(select: &Select<'_>, values: &mut Vec<Value>) -> Result<String, CompileError> {
        let source = format!(
            "(SELECT {table}.*, {masked} FROM {source}) AS {table}",
            table = Self::TABLE,
            masked = masked(Self::TABLE, Self::DESTINATION_ACCOUNT, Self::MASKED_DESTINATION),
            source = select.source,
        );
        select.to_sql_from(&source, values)
    }
}
