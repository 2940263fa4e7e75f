//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, Inquiry, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `users` table, in the order [`from_row`] expects them.
const COLUMNS: &str = "\
    id, first_name, last_name, \
    email, password_hash, \
    role, phone, \
    created_at";

/// Restores a [`User`] from the provided [`Row`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        phone: row.get("phone"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<'e, C> Database<Select<By<Option<User>, &'e user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let email: &user::Email = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE email = $1::VARCHAR \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&email])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Option<read::user::Overview>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<Vec<read::property::search::PropertyWithImages>, user::Id>,
            >,
            Ok = Vec<read::property::search::PropertyWithImages>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Inquiry>, user::Id>>,
            Ok = Vec<Inquiry>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::user::Overview>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::user::Overview>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let Some(user) = self
            .execute(Select(By::<Option<User>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };
        let properties = self
            .execute(Select(By::<
                Vec<read::property::search::PropertyWithImages>,
                _,
            >::new(id)))
            .await
            .map_err(tracerr::wrap!())?;
        let inquiries = self
            .execute(Select(By::<Vec<Inquiry>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::user::Overview {
            profile: user.into(),
            properties,
            inquiries,
        }))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            first_name,
            last_name,
            email,
            password_hash,
            role,
            phone,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, first_name, last_name, \
                email, password_hash, \
                role, phone, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, \
                $6::INT2, $7::VARCHAR, \
                $8::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &first_name,
                &last_name,
                &email,
                &password_hash,
                &role,
                &phone,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
