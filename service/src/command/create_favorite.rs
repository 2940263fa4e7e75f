//! [`Command`] for saving a [`Property`] as a [`Favorite`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{favorite, property, user, Favorite, Property, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for saving a [`Property`] as a [`Favorite`].
#[derive(Clone, Copy, Debug)]
pub struct CreateFavorite {
    /// ID of the [`User`] saving the [`Property`].
    pub user_id: user::Id,

    /// ID of the [`Property`] to save.
    pub property_id: property::Id,
}

/// Name of the `favorites` table constraint allowing a single [`Favorite`]
/// per `(user_id, property_id)` pair.
const UNIQUE_CONSTRAINT: &str = "favorites_user_id_property_id_key";

impl<Db, S> Command<CreateFavorite> for Service<Db, S>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Favorite>, (user::Id, property::Id)>>,
            Ok = Option<Favorite>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Favorite>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Favorite;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateFavorite {
            user_id,
            property_id,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<User>, _>::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        );
        drop(
            self.database()
                .execute(Select(By::<Option<Property>, _>::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?,
        );

        let existing = self
            .database()
            .execute(Select(By::<Option<Favorite>, _>::new((
                user_id,
                property_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::AlreadyExists {
                user_id,
                property_id,
            }));
        }

        let favorite = Favorite {
            id: favorite::Id::new(),
            user_id,
            property_id,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        // A concurrent duplicate slips past the check above and trips the
        // unique constraint instead.
        tx.execute(Insert(favorite.clone()))
            .await
            .map_err(|e| {
                if e.as_ref().is_unique_violation(Some(UNIQUE_CONSTRAINT)) {
                    tracerr::new!(E::AlreadyExists {
                        user_id,
                        property_id,
                    })
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(favorite)
    }
}

/// Error of [`CreateFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`User`] saved this [`Property`] already.
    #[display(
        "`User(id: {user_id})` saved `Property(id: {property_id})` already"
    )]
    AlreadyExists {
        /// ID of the saving [`User`].
        user_id: user::Id,

        /// ID of the saved [`Property`].
        property_id: property::Id,
    },
}

#[cfg(test)]
mod spec {
    use std::sync::{Arc, Mutex};

    use common::{
        operations::{By, Commit, Insert, Select, Transact},
        DateTime, Handler, Price,
    };
    use rust_decimal::Decimal;
    use tracerr::Traced;

    use crate::{
        domain::{property, user, Favorite, Property, User},
        infra::database,
        Config, Service,
    };

    use super::{CreateFavorite, ExecutionError};

    #[derive(Clone, Debug, Default)]
    struct FakeDb(Arc<Mutex<FakeDbState>>);

    #[derive(Debug, Default)]
    struct FakeDbState {
        users: Vec<User>,
        properties: Vec<Property>,
        favorites: Vec<Favorite>,
        fail_inserts: bool,
    }

    impl Handler<Select<By<Option<User>, user::Id>>> for FakeDb {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<User>, user::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .lock()
                .unwrap()
                .users
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }
    }

    impl Handler<Select<By<Option<Property>, property::Id>>> for FakeDb {
        type Ok = Option<Property>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Property>, property::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self
                .0
                .lock()
                .unwrap()
                .properties
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }
    }

    impl Handler<Select<By<Option<Favorite>, (user::Id, property::Id)>>>
        for FakeDb
    {
        type Ok = Option<Favorite>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<
                By<Option<Favorite>, (user::Id, property::Id)>,
            >,
        ) -> Result<Self::Ok, Self::Err> {
            let (user_id, property_id) = by.into_inner();
            Ok(self
                .0
                .lock()
                .unwrap()
                .favorites
                .iter()
                .find(|f| {
                    f.user_id == user_id && f.property_id == property_id
                })
                .cloned())
        }
    }

    impl Handler<Transact> for FakeDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Handler<Insert<Favorite>> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Insert(f): Insert<Favorite>,
        ) -> Result<Self::Ok, Self::Err> {
            let mut state = self.0.lock().unwrap();
            if state.fail_inserts {
                return Err(tracerr::new!(database::Error::from(
                    database::postgres::Error::from(
                        database::postgres::connection::PoolError::Closed,
                    ),
                )));
            }
            state.favorites.push(f);
            Ok(())
        }
    }

    impl Handler<Commit> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
            Ok(())
        }
    }

    fn service(db: FakeDb) -> Service<FakeDb, ()> {
        let secret = b"test-secret";
        Service::new(
            Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    secret,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    secret,
                ),
            },
            db,
            (),
        )
    }

    fn seeded() -> (FakeDb, user::Id, property::Id) {
        let db = FakeDb::default();
        let user = User {
            id: user::Id::new(),
            first_name: user::FirstName::new("Nia").unwrap(),
            last_name: user::LastName::new("Kelly").unwrap(),
            email: user::Email::new("nia@example.com").unwrap(),
            password_hash: user::PasswordHash::new(
                &user::Password::new("password123").unwrap(),
            ),
            role: user::Role::Buyer,
            phone: None,
            created_at: DateTime::now().coerce(),
        };
        let property = Property {
            id: property::Id::new(),
            title: property::Title::new("Cottage in Kerry").unwrap(),
            description: property::Description::new("Stone walls").unwrap(),
            price: Price::new(Decimal::from(210_000)).unwrap(),
            address: property::Address::from_parts(
                &property::AddressLine1::new("1 Main St").unwrap(),
                &property::AddressLine2::new("Dingle").unwrap(),
                &property::City::new("Tralee").unwrap(),
                &property::County::new("Kerry").unwrap(),
            ),
            address_line1: property::AddressLine1::new("1 Main St").unwrap(),
            address_line2: property::AddressLine2::new("Dingle").unwrap(),
            city: property::City::new("Tralee").unwrap(),
            county: property::County::new("Kerry").unwrap(),
            kind: property::Kind::House,
            status: property::Status::Available,
            num_bedrooms: 3,
            num_bathrooms: 1,
            square_meters: property::SquareMeters::new(95).unwrap(),
            year_built: property::YearBuilt::new(1955).unwrap(),
            latitude: property::Latitude::new(52.14).unwrap(),
            longitude: property::Longitude::new(-10.27).unwrap(),
            features: property::Features::default(),
            user_id: user.id,
            created_at: DateTime::now().coerce(),
        };
        let (user_id, property_id) = (user.id, property.id);

        let mut state = db.0.lock().unwrap();
        state.users.push(user);
        state.properties.push(property);
        drop(state);

        (db, user_id, property_id)
    }

    #[tokio::test]
    async fn saves_a_property_once() {
        let (db, user_id, property_id) = seeded();
        let svc = service(db.clone());

        let favorite = svc
            .execute(CreateFavorite {
                user_id,
                property_id,
            })
            .await
            .unwrap();

        assert_eq!(favorite.user_id, user_id);
        assert_eq!(favorite.property_id, property_id);
        assert_eq!(db.0.lock().unwrap().favorites.len(), 1);
    }

    #[tokio::test]
    async fn rejects_saving_the_same_property_twice() {
        let (db, user_id, property_id) = seeded();
        let svc = service(db.clone());

        svc.execute(CreateFavorite {
            user_id,
            property_id,
        })
        .await
        .map(drop)
        .unwrap();
        let err = svc
            .execute(CreateFavorite {
                user_id,
                property_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyExists { .. },
        ));
        assert_eq!(db.0.lock().unwrap().favorites.len(), 1);
    }

    #[tokio::test]
    async fn insert_failure_is_not_reported_as_duplicate() {
        let (db, user_id, property_id) = seeded();
        db.0.lock().unwrap().fail_inserts = true;
        let svc = service(db.clone());

        let err = svc
            .execute(CreateFavorite {
                user_id,
                property_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert!(db.0.lock().unwrap().favorites.is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_property() {
        let (db, user_id, _) = seeded();
        let svc = service(db);

        let err = svc
            .execute(CreateFavorite {
                user_id,
                property_id: property::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(_),
        ));
    }
}
