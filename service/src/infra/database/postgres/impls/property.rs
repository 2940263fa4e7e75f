//! [`Property`]-related [`Database`] implementations.

use std::collections::{BTreeMap, HashMap};

use common::{
    operations::{By, Delete, Insert, Select, Update},
    Price,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, user, Image, Property},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `properties` table, in the order [`from_row`] expects them.
const COLUMNS: &str = "\
    id, title, description, price, \
    address, address_line1, address_line2, city, county, \
    kind, status, \
    num_bedrooms, num_bathrooms, square_meters, year_built, \
    latitude, longitude, \
    features, \
    user_id, created_at";

/// Restores a [`Property`] from the provided [`Row`].
pub(super) fn from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        price: row.get("price"),
        address: row.get("address"),
        address_line1: row.get("address_line1"),
        address_line2: row.get("address_line2"),
        city: row.get("city"),
        county: row.get("county"),
        kind: row.get("kind"),
        status: row.get("status"),
        num_bedrooms: u16::try_from(row.get::<_, i32>("num_bedrooms"))
            .expect("`num_bedrooms` overflow"),
        num_bathrooms: u16::try_from(row.get::<_, i32>("num_bathrooms"))
            .expect("`num_bathrooms` overflow"),
        square_meters: property::SquareMeters::new(
            u32::try_from(row.get::<_, i32>("square_meters"))
                .expect("`square_meters` overflow"),
        )
        .expect("`square_meters` is positive"),
        year_built: property::YearBuilt::new(row.get("year_built"))
            .expect("`year_built` in range"),
        latitude: property::Latitude::new(row.get("latitude"))
            .expect("`latitude` in range"),
        longitude: property::Longitude::new(row.get("longitude"))
            .expect("`longitude` in range"),
        features: serde_json::from_value::<BTreeMap<String, bool>>(
            row.get("features"),
        )
        .map(property::Features::from)
        .expect("`features` is a JSONB mapping of booleans"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            title,
            description,
            price,
            address,
            address_line1,
            address_line2,
            city,
            county,
            kind,
            status,
            num_bedrooms,
            num_bathrooms,
            square_meters,
            year_built,
            latitude,
            longitude,
            features,
            user_id,
            created_at,
        } = property;

        let num_bedrooms = i32::from(num_bedrooms);
        let num_bathrooms = i32::from(num_bathrooms);
        let square_meters = i32::try_from(u32::from(square_meters))
            .expect("`square_meters` overflow");
        let year_built = i32::from(year_built);
        let latitude = f64::from(latitude);
        let longitude = f64::from(longitude);
        let features = serde_json::to_value(&features)
            .expect("`Features` always serialize");

        const SQL: &str = "\
            INSERT INTO properties (\
                id, title, description, price, \
                address, address_line1, address_line2, city, county, \
                kind, status, \
                num_bedrooms, num_bathrooms, square_meters, year_built, \
                latitude, longitude, \
                features, \
                user_id, created_at\
            ) \
            VALUES (\
                $1::UUID, \
                $2::VARCHAR, $3::VARCHAR, $4::NUMERIC, \
                $5::VARCHAR, \
                $6::VARCHAR, \
                $7::VARCHAR, \
                $8::VARCHAR, \
                $9::VARCHAR, \
                $10::INT2, $11::INT2, \
                $12::INT4, $13::INT4, $14::INT4, $15::INT4, \
                $16::FLOAT8, $17::FLOAT8, \
                $18::JSONB, \
                $19::UUID, $20::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                price = EXCLUDED.price, \
                address = EXCLUDED.address, \
                address_line1 = EXCLUDED.address_line1, \
                address_line2 = EXCLUDED.address_line2, \
                city = EXCLUDED.city, \
                county = EXCLUDED.county, \
                kind = EXCLUDED.kind, \
                status = EXCLUDED.status, \
                num_bedrooms = EXCLUDED.num_bedrooms, \
                num_bathrooms = EXCLUDED.num_bathrooms, \
                square_meters = EXCLUDED.square_meters, \
                year_built = EXCLUDED.year_built, \
                latitude = EXCLUDED.latitude, \
                longitude = EXCLUDED.longitude, \
                features = EXCLUDED.features, \
                user_id = EXCLUDED.user_id, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &price,
                &address,
                &address_line1,
                &address_line2,
                &city,
                &county,
                &kind,
                &status,
                &num_bedrooms,
                &num_bathrooms,
                &square_meters,
                &year_built,
                &latitude,
                &longitude,
                &features,
                &user_id,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(property): Delete<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        // `images`, `favorites` and `inquiries` rows referencing the
        // `Property` are removed by `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM properties \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&property.id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<
                Option<read::property::search::PropertyWithImages>,
                property::Id,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
    Self: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Image>, property::Id>>,
            Ok = Vec<Image>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::property::search::PropertyWithImages>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::property::search::PropertyWithImages>, property::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let Some(property) = self
            .execute(Select(By::<Option<Property>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };
        let images = self
            .execute(Select(By::<Vec<Image>, _>::new(id)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::property::search::PropertyWithImages {
            property,
            images,
        }))
    }
}

impl<C>
    Database<
        Select<By<Vec<read::property::search::PropertyWithImages>, user::Id>>,
    > for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Vec<Image>>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Vec<Image>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<read::property::search::PropertyWithImages>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<read::property::search::PropertyWithImages>, user::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE user_id = $1::UUID \
             ORDER BY created_at DESC, id",
        );
        let properties = self
            .query(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect::<Vec<_>>();

        let ids = properties.iter().map(|p| p.id).collect::<Vec<_>>();
        let mut images = self
            .execute(Select(By::new(ids)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(properties
            .into_iter()
            .map(|property| read::property::search::PropertyWithImages {
                images: images.remove(&property.id).unwrap_or_default(),
                property,
            })
            .collect())
    }
}

/// Parameters of a [`read::property::search::Filter`], lowered to the column
/// types of the `properties` table.
#[derive(Debug)]
struct SearchParams {
    /// `ILIKE` pattern matched against the `address` column.
    location_pattern: Option<String>,

    /// [`Kind`] of the [`Property`].
    ///
    /// [`Kind`]: property::Kind
    kind: Option<property::Kind>,

    /// [`Status`] of the [`Property`].
    ///
    /// [`Status`]: property::Status
    status: Option<property::Status>,

    /// Minimum asking [`Price`], inclusive.
    price_min: Option<Price>,

    /// Maximum asking [`Price`], inclusive.
    price_max: Option<Price>,

    /// Exact number of bedrooms.
    num_bedrooms: Option<i32>,

    /// Exact number of bathrooms.
    num_bathrooms: Option<i32>,

    /// Minimum interior area, inclusive.
    square_meters: Option<i32>,

    /// Exact year of construction.
    year_built: Option<i32>,

    /// Search center latitude/longitude and radius, in kilometers.
    geo: Option<(f64, f64, f64)>,
}

impl SearchParams {
    /// Lowers the provided [`Filter`] for binding.
    ///
    /// [`Filter`]: read::property::search::Filter
    fn from_filter(filter: read::property::search::Filter) -> Self {
        let read::property::search::Filter {
            location,
            kind,
            status,
            price_min,
            price_max,
            num_bedrooms,
            num_bathrooms,
            square_meters,
            year_built,
            geo,
        } = filter;

        Self {
            // Geospatial filtering takes precedence over substring matching.
            location_pattern: geo
                .is_none()
                .then_some(location)
                .flatten()
                .map(|l| format!("%{l}%")),
            kind,
            status,
            price_min,
            price_max,
            num_bedrooms: num_bedrooms.map(i32::from),
            num_bathrooms: num_bathrooms.map(i32::from),
            square_meters: square_meters
                .map(|a| i32::try_from(u32::from(a)).unwrap_or(i32::MAX)),
            year_built: year_built.map(i32::from),
            geo: geo.map(|g| {
                (f64::from(g.latitude), f64::from(g.longitude), g.radius_km)
            }),
        }
    }

    /// Assembles the `WHERE` clause tail along with the parameters it binds,
    /// in binding order.
    fn conditions(&self) -> (String, Vec<&(dyn ToSql + Sync)>) {
        let mut ps: Vec<&(dyn ToSql + Sync)> = Vec::new();

        let location_idx = self.location_pattern.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let kind_idx = self.kind.as_ref().map(|k| {
            ps.push(k);
            ps.len()
        });
        let status_idx = self.status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });
        let price_min_idx = self.price_min.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let price_max_idx = self.price_max.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let num_bedrooms_idx = self.num_bedrooms.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });
        let num_bathrooms_idx = self.num_bathrooms.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });
        let square_meters_idx = self.square_meters.as_ref().map(|a| {
            ps.push(a);
            ps.len()
        });
        let year_built_idx = self.year_built.as_ref().map(|y| {
            ps.push(y);
            ps.len()
        });
        let geo_idx = self.geo.as_ref().map(|(lat, lng, radius)| {
            ps.push(lat);
            ps.push(lng);
            ps.push(radius);
            (ps.len() - 2, ps.len() - 1, ps.len())
        });

        let conditions = format!(
            "{location}{kind}{status}\
             {price_min}{price_max}\
             {num_bedrooms}{num_bathrooms}{square_meters}{year_built}\
             {geo}",
            location = location_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(" AND address ILIKE ${idx}::VARCHAR"))
            }),
            kind = kind_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(" AND kind = ${idx}::INT2"))
            }),
            status = status_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(" AND status = ${idx}::INT2"))
            }),
            price_min = price_min_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(" AND price >= ${idx}::NUMERIC"))
            }),
            price_max = price_max_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(" AND price <= ${idx}::NUMERIC"))
            }),
            num_bedrooms =
                num_bedrooms_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(" AND num_bedrooms = ${idx}::INT4"))
                }),
            num_bathrooms =
                num_bathrooms_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(" AND num_bathrooms = ${idx}::INT4"))
                }),
            square_meters =
                square_meters_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(" AND square_meters >= ${idx}::INT4"))
                }),
            year_built =
                year_built_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(" AND year_built = ${idx}::INT4"))
                }),
            geo = geo_idx.into_iter().format_with(
                "",
                |(lat, lng, radius), f| {
                    // Haversine great-circle distance, in kilometers.
                    f(&format_args!(
                        " AND 6371.0 * ACOS(LEAST(1.0, \
                           COS(RADIANS(${lat}::FLOAT8)) \
                           * COS(RADIANS(latitude)) \
                           * COS(RADIANS(longitude) \
                                 - RADIANS(${lng}::FLOAT8)) \
                           + SIN(RADIANS(${lat}::FLOAT8)) \
                           * SIN(RADIANS(latitude)))) \
                           <= ${radius}::FLOAT8"
                    ))
                },
            ),
        );

        (conditions, ps)
    }
}

impl<C>
    Database<
        Select<
            By<read::property::search::Page, read::property::search::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Vec<Image>>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Vec<Image>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::property::search::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::search::Page, read::property::search::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::search::Selector { filter, pagination } =
            by.into_inner();

        let params = SearchParams::from_filter(filter);
        let (conditions, mut ps) = params.conditions();

        let count_sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM properties \
             WHERE true{conditions}",
        );
        let total = self
            .query_opt(&count_sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .expect("always exists")
            .get::<_, i64>(0)
            .into();

        let limit = i64::from(pagination.limit());
        let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);
        ps.push(&limit);
        let limit_idx = ps.len();
        ps.push(&offset);
        let offset_idx = ps.len();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE true{conditions} \
             ORDER BY created_at DESC, id \
             LIMIT ${limit_idx}::INT8 OFFSET ${offset_idx}::INT8",
        );
        let properties = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect::<Vec<_>>();

        let ids = properties.iter().map(|p| p.id).collect::<Vec<_>>();
        let mut images = self
            .execute(Select(By::new(ids)))
            .await
            .map_err(tracerr::wrap!())?;

        let items = properties
            .into_iter()
            .map(|property| read::property::search::PropertyWithImages {
                images: images.remove(&property.id).unwrap_or_default(),
                property,
            })
            .collect();

        Ok(read::property::search::Page { items, total })
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::property,
        read::property::search::{Filter, Geo},
    };

    use super::SearchParams;

    #[test]
    fn price_bounds_join_the_predicate_independently() {
        let params = SearchParams::from_filter(Filter {
            price_min: "100000".parse().ok(),
            price_max: "250000".parse().ok(),
            ..Filter::default()
        });

        let (conditions, ps) = params.conditions();
        assert_eq!(
            conditions,
            " AND price >= $1::NUMERIC AND price <= $2::NUMERIC",
        );
        assert_eq!(ps.len(), 2);

        let params = SearchParams::from_filter(Filter {
            price_max: "250000".parse().ok(),
            ..Filter::default()
        });

        let (conditions, ps) = params.conditions();
        assert_eq!(conditions, " AND price <= $1::NUMERIC");
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn interior_area_is_a_lower_bound_only() {
        let params = SearchParams::from_filter(Filter {
            square_meters: property::SquareMeters::new(120),
            ..Filter::default()
        });

        let (conditions, ps) = params.conditions();
        assert_eq!(conditions, " AND square_meters >= $1::INT4");
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn geo_replaces_location_matching() {
        let params = SearchParams::from_filter(Filter {
            location: Some("London".to_owned()),
            geo: Some(Geo {
                latitude: property::Latitude::new(51.5).unwrap(),
                longitude: property::Longitude::new(-0.12).unwrap(),
                radius_km: 5.0,
            }),
            ..Filter::default()
        });

        let (conditions, ps) = params.conditions();
        assert!(!conditions.contains("ILIKE"), "location must be suppressed");
        assert!(conditions.contains("ACOS"));
        assert_eq!(ps.len(), 3);
    }

    #[test]
    fn location_matches_address_substring_without_geo() {
        let params = SearchParams::from_filter(Filter {
            location: Some("London".to_owned()),
            ..Filter::default()
        });

        let (conditions, ps) = params.conditions();
        assert_eq!(conditions, " AND address ILIKE $1::VARCHAR");
        assert_eq!(
            params.location_pattern.as_deref(),
            Some("%London%"),
            "substring match must be anchored on both sides",
        );
        assert_eq!(ps.len(), 1);
    }
}
