//! Marketplace accounts.

use bazaar_orm::schema::{Alias, Table, TableCreateStatement};
use bazaar_orm::{Entity, record};
use chrono::{DateTime, Utc};

use crate::{column, created_at, id};

/// Buyers, plugin authors and administrators.
pub struct User;

#[allow(missing_docs)]
impl User {
    pub const ID: &'static str = "id";
    pub const USERNAME: &'static str = "username";
    pub const EMAIL: &'static str = "email";
    pub const PASSWORD_HASH: &'static str = "password_hash";
    pub const ROLE: &'static str = "role";
    pub const CREATED_AT: &'static str = "created_at";

    /// Default role for new accounts.
    pub const ROLE_USER: &'static str = "user";
    pub const ROLE_ADMIN: &'static str = "admin";
}

impl Entity for User {
    const TABLE: &'static str = "users";

    fn schema() -> TableCreateStatement {
        Table::create()
            .table(Alias::new(Self::TABLE))
            .if_not_exists()
            .col(id(Self::ID))
            .col(column(Self::USERNAME).string().not_null().unique_key())
            .col(column(Self::EMAIL).string().not_null().unique_key())
            .col(column(Self::PASSWORD_HASH).string().not_null())
            .col(column(Self::ROLE).string().not_null().default(Self::ROLE_USER))
            .col(created_at(Self::CREATED_AT))
            .to_owned()
    }

    fn columns() -> &'static [&'static str] {
        Self::safe_columns()
    }

    fn safe_columns() -> &'static [&'static str] {
        &[Self::ID, Self::USERNAME, Self::EMAIL, Self::ROLE, Self::CREATED_AT]
    }

    fn min_columns() -> &'static [&'static str] {
        &[Self::ID, Self::USERNAME]
    }

    fn all_columns() -> &'static [&'static str] {
        &[Self::ID, Self::USERNAME, Self::EMAIL, Self::PASSWORD_HASH, Self::ROLE, Self::CREATED_AT]
    }
}

record! {
    /// A user as shown to other users, decoded from [`User::safe_columns`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct UserProfile {
        pub id: i64,
        pub username: String,
        pub email: String,
        pub role: String,
        pub created_at: DateTime<Utc>,
    }
}
