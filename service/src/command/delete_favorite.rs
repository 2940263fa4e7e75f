//! [`Command`] for removing a [`Favorite`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{favorite, user, Favorite},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a [`Favorite`].
///
/// Only the [`User`] who saved the [`Favorite`] may remove it.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug)]
pub struct DeleteFavorite {
    /// ID of the [`Favorite`] to remove.
    pub favorite_id: favorite::Id,

    /// ID of the [`User`] removing the [`Favorite`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,
}

impl<Db, S> Command<DeleteFavorite> for Service<Db, S>
where
    Db: Database<
            Select<By<Option<Favorite>, favorite::Id>>,
            Ok = Option<Favorite>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Delete<Favorite>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteFavorite {
            favorite_id,
            user_id,
        } = cmd;

        let favorite = self
            .database()
            .execute(Select(By::new(favorite_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::FavoriteNotExists(favorite_id))
            .map_err(tracerr::wrap!())?;
        if favorite.user_id != user_id {
            return Err(tracerr::new!(E::NotOwner(user_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(favorite))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`DeleteFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Favorite`] with the provided ID does not exist.
    #[display("`Favorite(id: {_0})` does not exist")]
    #[from(ignore)]
    FavoriteNotExists(#[error(not(source))] favorite::Id),

    /// Performing [`User`] did not save the [`Favorite`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` does not own the `Favorite`")]
    #[from(ignore)]
    NotOwner(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::sync::{Arc, Mutex};

    use common::{
        operations::{By, Commit, Delete, Select, Transact},
        DateTime, Handler,
    };
    use tracerr::Traced;

    use crate::{
        domain::{favorite, property, user, Favorite},
        infra::database,
        Config, Service,
    };

    use super::{DeleteFavorite, ExecutionError};

    #[derive(Clone, Debug, Default)]
    struct FakeDb(Arc<Mutex<Vec<Favorite>>>);

    impl Handler<Select<By<Option<Favorite>, favorite::Id>>> for FakeDb {
        type Ok = Option<Favorite>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<Favorite>, favorite::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id = by.into_inner();
            Ok(self.0.lock().unwrap().iter().find(|f| f.id == id).cloned())
        }
    }

    impl Handler<Transact> for FakeDb {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Handler<Delete<Favorite>> for FakeDb {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Delete(f): Delete<Favorite>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.lock().unwrap().retain(|x| x.id != f.id);
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

    #[tokio::test]
    async fn owner_removes_own_favorite() {
        let owner = user::Id::new();
        let favorite = Favorite {
            id: favorite::Id::new(),
            user_id: owner,
            property_id: property::Id::new(),
            created_at: DateTime::now().coerce(),
        };
        let db = FakeDb::default();
        db.0.lock().unwrap().push(favorite.clone());
        let svc = service(db.clone());

        svc.execute(DeleteFavorite {
            favorite_id: favorite.id,
            user_id: owner,
        })
        .await
        .unwrap();

        assert!(db.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_removal_by_another_user() {
        let favorite = Favorite {
            id: favorite::Id::new(),
            user_id: user::Id::new(),
            property_id: property::Id::new(),
            created_at: DateTime::now().coerce(),
        };
        let db = FakeDb::default();
        db.0.lock().unwrap().push(favorite.clone());
        let svc = service(db.clone());

        let err = svc
            .execute(DeleteFavorite {
                favorite_id: favorite.id,
                user_id: user::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotOwner(_)));
        assert_eq!(db.0.lock().unwrap().len(), 1);
    }
}
