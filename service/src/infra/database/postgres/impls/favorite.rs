//! [`Favorite`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{favorite, property, user, Favorite, Image},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Restores a [`Favorite`] from the provided [`Row`], reading the aliased
/// `favorite_id` and `favorited_at` columns.
fn from_aliased_row(row: &Row) -> Favorite {
    Favorite {
        id: row.get("favorite_id"),
        user_id: row.get("favorited_by"),
        property_id: row.get("property_id"),
        created_at: row.get("favorited_at"),
    }
}

impl<C> Database<Select<By<Option<Favorite>, favorite::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Favorite>, favorite::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: favorite::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, property_id, created_at \
            FROM favorites \
            WHERE id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                row.map(|row| Favorite {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    property_id: row.get("property_id"),
                    created_at: row.get("created_at"),
                })
            })
    }
}

impl<C> Database<Select<By<Option<Favorite>, (user::Id, property::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Favorite>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Favorite>, (user::Id, property::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, property_id) = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, property_id, created_at \
            FROM favorites \
            WHERE user_id = $1::UUID \
              AND property_id = $2::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&user_id, &property_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                row.map(|row| Favorite {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    property_id: row.get("property_id"),
                    created_at: row.get("created_at"),
                })
            })
    }
}

impl<C> Database<Select<By<Vec<read::favorite::Saved>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Vec<Image>>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Vec<Image>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<read::favorite::Saved>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::favorite::Saved>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT f.id AS favorite_id, \
                   f.user_id AS favorited_by, \
                   f.created_at AS favorited_at, \
                   p.id, p.title, p.description, p.price, \
                   p.address, p.address_line1, p.address_line2, \
                   p.city, p.county, \
                   p.kind, p.status, \
                   p.num_bedrooms, p.num_bathrooms, \
                   p.square_meters, p.year_built, \
                   p.latitude, p.longitude, \
                   p.features, \
                   p.user_id, p.created_at, \
                   p.id AS property_id \
            FROM favorites AS f \
            JOIN properties AS p ON p.id = f.property_id \
            WHERE f.user_id = $1::UUID \
            ORDER BY f.created_at DESC, f.id";
        let rows = self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?;

        let saved = rows
            .iter()
            .map(|row| (from_aliased_row(row), super::property::from_row(row)))
            .collect::<Vec<_>>();

        let ids = saved.iter().map(|(_, p)| p.id).collect::<Vec<_>>();
        let mut images = self
            .execute(Select(By::new(ids)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(saved
            .into_iter()
            .map(|(favorite, property)| read::favorite::Saved {
                favorite,
                property: read::property::search::PropertyWithImages {
                    images: images.remove(&property.id).unwrap_or_default(),
                    property,
                },
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<read::favorite::Saved>, favorite::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Vec<Image>>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Vec<Image>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<read::favorite::Saved>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::favorite::Saved>, favorite::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: favorite::Id = by.into_inner();

        const SQL: &str = "\
            SELECT f.id AS favorite_id, \
                   f.user_id AS favorited_by, \
                   f.created_at AS favorited_at, \
                   p.id, p.title, p.description, p.price, \
                   p.address, p.address_line1, p.address_line2, \
                   p.city, p.county, \
                   p.kind, p.status, \
                   p.num_bedrooms, p.num_bathrooms, \
                   p.square_meters, p.year_built, \
                   p.latitude, p.longitude, \
                   p.features, \
                   p.user_id, p.created_at, \
                   p.id AS property_id \
            FROM favorites AS f \
            JOIN properties AS p ON p.id = f.property_id \
            WHERE f.id = $1::UUID \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let favorite = from_aliased_row(&row);
        let property = super::property::from_row(&row);
        let mut images = self
            .execute(Select(By::new(vec![property.id])))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::favorite::Saved {
            favorite,
            property: read::property::search::PropertyWithImages {
                images: images.remove(&property.id).unwrap_or_default(),
                property,
            },
        }))
    }
}

impl<C> Database<Insert<Favorite>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(favorite): Insert<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        let Favorite {
            id,
            user_id,
            property_id,
            created_at,
        } = favorite;

        const SQL: &str = "\
            INSERT INTO favorites (id, user_id, property_id, created_at) \
            VALUES ($1::UUID, $2::UUID, $3::UUID, $4::TIMESTAMPTZ)";
        self.exec(SQL, &[&id, &user_id, &property_id, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<Favorite>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(favorite): Delete<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            DELETE FROM favorites \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&favorite.id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
