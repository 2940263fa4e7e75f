//! [`Inquiry`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{inquiry, property, user, Inquiry},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Restores an [`Inquiry`] from the provided [`Row`].
fn from_row(row: &Row) -> Inquiry {
    Inquiry {
        id: row.get("id"),
        message: row.get("message"),
        status: row.get("status"),
        user_id: row.get("user_id"),
        property_id: row.get("property_id"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Inquiry>, inquiry::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Inquiry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Inquiry>, inquiry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: inquiry::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, message, status, user_id, property_id, created_at \
            FROM inquiries \
            WHERE id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Inquiry>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Inquiry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Inquiry>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, message, status, user_id, property_id, created_at \
            FROM inquiries \
            WHERE property_id = $1::UUID \
            ORDER BY created_at DESC, id";
        Ok(self
            .query(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Inquiry>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Inquiry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Inquiry>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, message, status, user_id, property_id, created_at \
            FROM inquiries \
            WHERE user_id = $1::UUID \
            ORDER BY created_at DESC, id";
        Ok(self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Inquiry>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Inquiry>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(inquiry): Insert<Inquiry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(inquiry)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Inquiry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(inquiry): Update<Inquiry>,
    ) -> Result<Self::Ok, Self::Err> {
        let Inquiry {
            id,
            message,
            status,
            user_id,
            property_id,
            created_at,
        } = inquiry;

        const SQL: &str = "\
            INSERT INTO inquiries (\
                id, message, status, user_id, property_id, created_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, \
                $3::INT2, \
                $4::UUID, $5::UUID, \
                $6::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET message = EXCLUDED.message, \
                status = EXCLUDED.status, \
                user_id = EXCLUDED.user_id, \
                property_id = EXCLUDED.property_id, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[&id, &message, &status, &user_id, &property_id, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<Inquiry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(inquiry): Delete<Inquiry>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            DELETE FROM inquiries \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&inquiry.id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
