//! [`Command`] for editing an existing [`Property`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    Price,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::property::{Description, Features, Status, Title};
use crate::{
    domain::{property, user, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing an existing [`Property`].
///
/// Absent fields keep their current values. Only the [`User`] who listed the
/// [`Property`] may edit it.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// ID of the [`Property`] to edit.
    pub property_id: property::Id,

    /// ID of the [`User`] performing the edit.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// New [`Title`], if changed.
    pub title: Option<property::Title>,

    /// New [`Description`], if changed.
    pub description: Option<property::Description>,

    /// New asking [`Price`], if changed.
    pub price: Option<Price>,

    /// New [`Status`], if changed.
    pub status: Option<property::Status>,

    /// New number of bedrooms, if changed.
    pub num_bedrooms: Option<property::NumBedrooms>,

    /// New number of bathrooms, if changed.
    pub num_bathrooms: Option<property::NumBathrooms>,

    /// New raw [`Features`], if changed.
    pub features: Option<property::FeaturesInput>,
}

impl<Db, S> Command<UpdateProperty> for Service<Db, S>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty {
            property_id,
            user_id,
            title,
            description,
            price,
            status,
            num_bedrooms,
            num_bathrooms,
            features,
        } = cmd;

        let mut property = self
            .database()
            .execute(Select(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        if property.user_id != user_id {
            return Err(tracerr::new!(E::NotOwner(user_id)));
        }

        if let Some(title) = title {
            property.title = title;
        }
        if let Some(description) = description {
            property.description = description;
        }
        if let Some(price) = price {
            property.price = price;
        }
        if let Some(status) = status {
            property.status = status;
        }
        if let Some(num_bedrooms) = num_bedrooms {
            property.num_bedrooms = num_bedrooms;
        }
        if let Some(num_bathrooms) = num_bathrooms {
            property.num_bathrooms = num_bathrooms;
        }
        if let Some(features) = features {
            property.features = property::Features::normalize(features)
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// `features` field cannot be normalized.
    #[display("{_0}")]
    InvalidFeatures(property::InvalidFeatures),

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
