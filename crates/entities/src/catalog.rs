//! The plugin catalogue: categories, plugins and their released versions.

use bazaar_orm::schema::{Alias, Index, IndexCreateStatement, Table, TableCreateStatement};
use bazaar_orm::{CompileError, Entity, Select, SoftDelete, Value, record};

use crate::{User, column, created_at, id};

/// Catalogue sections plugins are filed under.
pub struct Category;

#[allow(missing_docs)]
impl Category {
    pub const ID: &'static str = "id";
    pub const NAME: &'static str = "name";
    pub const SLUG: &'static str = "slug";
    pub const DESCRIPTION: &'static str = "description";
}

impl Entity for Category {
    const TABLE: &'static str = "categories";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::NAME).string().not_null())
            .col(column(Self::SLUG).string().not_null().unique_key())
            .col(column(Self::DESCRIPTION).text())
            .to_owned()
    }

    fn columns() -> &'static [&'static str] {
        &[Self::ID, Self::NAME, Self::SLUG, Self::DESCRIPTION]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::NAME, Self::SLUG]
    }
}

/// A listed plugin.
///
/// Deleting a plugin sets its status to [`Plugin::STATUS_DELETED`] so that
/// orders and earnings keep their reference. Listings join the author's
/// username as `author_name`.
pub struct Plugin;

#[allow(missing_docs)]
impl Plugin {
    pub const ID: &'static str = "id";
    pub const AUTHOR_ID: &'static str = "author_id";
    pub const CATEGORY_ID: &'static str = "category_id";
    pub const NAME: &'static str = "name";
    pub const SLUG: &'static str = "slug";
    pub const DESCRIPTION: &'static str = "description";
    pub const PRICE: &'static str = "price";
    pub const DOWNLOADS: &'static str = "downloads";
    pub const VOTES: &'static str = "votes";
    pub const COMMENTS: &'static str = "comments";
    pub const STATUS: &'static str = "status";
    pub const CREATED_AT: &'static str = "created_at";
    /// Joined from `users.username`.
    pub const AUTHOR_NAME: &'static str = "author_name";

    pub const STATUS_PENDING: &'static str = "pending";
    pub const STATUS_PUBLISHED: &'static str = "published";
    pub const STATUS_REJECTED: &'static str = "rejected";
    pub const STATUS_DELETED: &'static str = "deleted";
}

impl Entity for Plugin {
    const TABLE: &'static str = "plugins";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::AUTHOR_ID).integer().not_null())
            .col(column(Self::CATEGORY_ID).integer())
            .col(column(Self::NAME).string().not_null())
            .col(column(Self::SLUG).string().not_null().unique_key())
            .col(column(Self::DESCRIPTION).text())
            .col(column(Self::PRICE).double().not_null().default(0.0))
            .col(column(Self::DOWNLOADS).integer().not_null().default(0))
            .col(column(Self::VOTES).integer().not_null().default(0))
            .col(column(Self::COMMENTS).integer().not_null().default(0))
            .col(column(Self::STATUS).string().not_null().default(Self::STATUS_PENDING))
            .col(created_at(Self::CREATED_AT))
            .to_owned()
    }

    fn indexes() -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .if_not_exists()
                .name("idx_plugins_author")
                .table(Alias::new(Self::TABLE))
                .col(Alias::new(Self::AUTHOR_ID))
                .to_owned(),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &[
            Self::ID,
            Self::AUTHOR_ID,
            Self::CATEGORY_ID,
            Self::NAME,
            Self::SLUG,
            Self::DESCRIPTION,
            Self::PRICE,
            Self::DOWNLOADS,
            Self::VOTES,
            Self::COMMENTS,
            Self::STATUS,
            Self::CREATED_AT,
            Self::AUTHOR_NAME,
        ]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::NAME, Self::SLUG, Self::PRICE, Self::DOWNLOADS, Self::VOTES, Self::AUTHOR_NAME]
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
             LEFT JOIN {users} ON {users}.{user_id} = {table}.{author_id}) AS {table}",
            table = Self::TABLE,
            users = User::TABLE,
            username = User::USERNAME,
            author = Self::AUTHOR_NAME,
            source = select.source,
            user_id = User::ID,
            author_id = Self::AUTHOR_ID,
        );
        select.to_sql_from(&source, values)
    }
}

record! {
    /// A plugin as listed in the storefront, decoded from
    /// [`Plugin::min_columns`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct PluginCard {
        pub id: i64,
        pub name: String,
        pub slug: String,
        pub price: f64,
        pub downloads: i64,
        pub votes: i64,
        pub author_name: Option<String>,
    }
}

/// A released archive of a plugin.
pub struct Version;

#[allow(missing_docs)]
impl Version {
    pub const ID: &'static str = "id";
    pub const PLUGIN_ID: &'static str = "plugin_id";
    pub const VERSION: &'static str = "version";
    pub const CHANGELOG: &'static str = "changelog";
    pub const ARCHIVE_PATH: &'static str = "archive_path";
    pub const CREATED_AT: &'static str = "created_at";
}

impl Entity for Version {
    const TABLE: &'static str = "versions";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::PLUGIN_ID).integer().not_null())
            .col(column(Self::VERSION).string().not_null())
            .col(column(Self::CHANGELOG).text())
            .col(column(Self::ARCHIVE_PATH).string().not_null())
            .col(created_at(Self::CREATED_AT))
            .to_owned()
    }

    fn indexes() -> Vec<IndexCreateStatement> {
        vec![
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_versions_plugin_version")
                .table(Alias::new(Self::TABLE))
                .col(Alias::new(Self::PLUGIN_ID))
                .col(Alias::new(Self::VERSION))
                .to_owned(),
        ]
    }

    fn columns() -> &'static [&'static str] {
        &[Self::ID, Self::PLUGIN_ID, Self::VERSION, Self::CHANGELOG, Self::ARCHIVE_PATH, Self::CREATED_AT]
    }

    fn safe_columns() -> &'static [&'static str] {
        &[Self::ID, Self::PLUGIN_ID, Self::VERSION, Self::CHANGELOG, Self::CREATED_AT]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::VERSION, Self::CREATED_AT]
    }
}
