//! [`Image`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, Image},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Restores an [`Image`] from the provided [`Row`].
fn from_row(row: &Row) -> Image {
    Image {
        id: row.get("id"),
        url: row.get("url"),
        object_id: row.get("object_id"),
        kind: row.get("kind"),
        property_id: row.get("property_id"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Vec<Image>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Image>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, url, object_id, kind, property_id, created_at \
            FROM images \
            WHERE property_id = $1::UUID \
            ORDER BY kind, created_at";
        Ok(self
            .query(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C, IDs> Database<Select<By<HashMap<property::Id, Vec<Image>>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Vec<Image>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Vec<Image>>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, url, object_id, kind, property_id, created_at \
            FROM images \
            WHERE property_id = ANY($1::UUID[]) \
            ORDER BY kind, created_at";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .fold(HashMap::new(), |mut grouped, row| {
                let image = from_row(row);
                grouped
                    .entry(image.property_id)
                    .or_insert_with(Vec::new)
                    .push(image);
                grouped
            }))
    }
}

impl<C> Database<Insert<Image>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<Image>,
    ) -> Result<Self::Ok, Self::Err> {
        let Image {
            id,
            url,
            object_id,
            kind,
            property_id,
            created_at,
        } = image;

        const SQL: &str = "\
            INSERT INTO images (\
                id, url, object_id, kind, property_id, created_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, \
                $4::INT2, \
                $5::UUID, \
                $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &url, &object_id, &kind, &property_id, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
