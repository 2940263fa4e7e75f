//! [`Command`] for delisting a [`Property`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, user, Image, Property},
    infra::{database, Database, ObjectStore},
    Service,
};

use super::Command;

/// [`Command`] for delisting a [`Property`].
///
/// Removes the [`Property`] with its [`Image`] rows, then deletes the stored
/// objects from the [`ObjectStore`]. A failed object deletion leaves an
/// orphan in the store, which is logged rather than surfaced: the listing
/// itself is gone by then.
#[derive(Clone, Copy, Debug)]
pub struct DeleteProperty {
    /// ID of the [`Property`] to delist.
    pub property_id: property::Id,

    /// ID of the [`User`] performing the delisting.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,
}

impl<Db, S> Command<DeleteProperty> for Service<Db, S>
where
    S: ObjectStore,
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Image>, property::Id>>,
            Ok = Vec<Image>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Delete<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty {
            property_id,
            user_id,
        } = cmd;

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        if property.user_id != user_id {
            return Err(tracerr::new!(E::NotOwner(user_id)));
        }

        let images = self
            .database()
            .execute(Select(By::<Vec<Image>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(property))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        for img in &images {
            if let Err(e) = self.image_store().delete(&img.object_id).await {
                tracing::warn!(
                    object_id = %img.object_id,
                    "failed to delete stored image object: {e}",
                );
            }
        }

        Ok(())
    }
}

/// Error of [`DeleteProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// Performing [`User`] did not list the [`Property`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` does not own the `Property`")]
    #[from(ignore)]
    NotOwner(#[error(not(source))] user::Id),
}
