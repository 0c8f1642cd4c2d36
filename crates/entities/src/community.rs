//! Reviews and votes left on plugins.

use bazaar_orm::schema::{Alias, Index, IndexCreateStatement, Table, TableCreateStatement};
use bazaar_orm::{CompileError, Entity, Select, SoftDelete, Value};

use crate::{User, column, created_at, id};

/// A comment on a plugin. Hidden rather than removed on delete; listings
/// join the author's username.
pub struct Comment;

#[allow(missing_docs)]
impl Comment {
    pub const ID: &'static str = "id";
    pub const PLUGIN_ID: &'static str = "plugin_id";
    pub const USER_ID: &'static str = "user_id";
    pub const BODY: &'static str = "body";
    pub const STATUS: &'static str = "status";
    pub const CREATED_AT: &'static str = "created_at";
    /// Joined from `users.username`.
    pub const AUTHOR_USERNAME: &'static str = "author_username";

    pub const STATUS_VISIBLE: &'static str = "visible";
    pub const STATUS_DELETED: &'static str = "deleted";
}

impl Entity for Comment {
    const TABLE: &'static str = "comments";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::PLUGIN_ID).integer().not_null())
            .col(column(Self::USER_ID).integer().not_null())
            .col(column(Self::BODY).text().not_null())
            .col(column(Self::STATUS).string().not_null().default(Self::STATUS_VISIBLE))
            .col(created_at(Self::CREATED_AT))
            .to_owned()
    }

    fn indexes() -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .if_not_exists()
                .name("idx_comments_plugin")
                .table(Alias::new(Self::TABLE))
                .col(Alias::new(Self::PLUGIN_ID))
                .to_owned(),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &[
            Self::ID,
            Self::PLUGIN_ID,
            Self::USER_ID,
            Self::BODY,
            Self::STATUS,
            Self::CREATED_AT,
            Self::AUTHOR_USERNAME,
        ]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::BODY, Self::AUTHOR_USERNAME, Self::CREATED_AT]
    }

    fn soft_delete() -> Option<SoftDelete> {
        Some(SoftDelete {
            column: Self::STATUS,
            value: Value::from(Self::STATUS_DELETED),
        })
    }

    fn select_sql(select: &Select<'_>, values: &mut Vec<Value>) -> Result<String, CompileError> {
        let source = format!(
            "(SELECT {table}.*, {users}.{username} AS {author} FROM {source} \
             LEFT JOIN {users} ON {users}.{id} = {table}.{user_id}) AS {table}",
            table = Self::TABLE,
            users = User::TABLE,
            username = User::USERNAME,
            author = Self::AUTHOR_USERNAME,
            source = select.source,
            id = User::ID,
            user_id = Self::USER_ID,
        );
        select.to_sql_from(&source, values)
    }
}

/// One user's vote for a plugin. A user votes at most once per plugin; the
/// unique index makes repeated `insert_or_ignore` calls no-ops.
pub struct Vote;

#[allow(missing_docs)]
impl Vote {
    pub const ID: &'static str = "id";
    pub const PLUGIN_ID: &'static str = "plugin_id";
    pub const USER_ID: &'static str = "user_id";
    pub const CREATED_AT: &'static str = "created_at";
}

impl Entity for Vote {
    const TABLE: &'static str = "votes";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::PLUGIN_ID).integer().not_null())
            .col(column(Self::USER_ID).integer().not_null())
            .col(created_at(Self::CREATED_AT))
            .to_owned()
    }

    fn indexes() -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_votes_plugin_user")
                .table(Alias::new(Self::TABLE))
                .col(Alias::new(Self::PLUGIN_ID))
                .col(Alias::new(Self::USER_ID))
                .to_owned(),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &[Self::ID, Self::PLUGIN_ID, Self::USER_ID, Self::CREATED_AT]
    }
}
