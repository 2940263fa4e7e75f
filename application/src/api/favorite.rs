//! [`Favorite`]-related API definitions.
//!
//! [`Favorite`]: domain::Favorite

use axum::{extract::Path, Extension, Json};
use http::StatusCode;
use serde::Serialize;
use service::{
    command::{self, Command as _},
    domain::{self, property},
    query, read, Query as _,
};
use uuid::Uuid;

use crate::{api, context::Auth, define_error, AsError, Error, Service};

/// Saved [`Property`] of a `User`, as serialized in API responses.
///
/// [`Property`]: domain::Property
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Saved {
    /// Unique identifier of the [`Favorite`] itself.
    ///
    /// [`Favorite`]: domain::Favorite
    pub id: Uuid,

    /// When the [`Property`] was saved, as an RFC 3339 string.
    ///
    /// [`Property`]: domain::Property
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: domain::favorite::CreationDateTime,

    /// Saved [`Property`] itself, with its images.
    ///
    /// [`Property`]: domain::Property
    pub property: api::property::Property,
}

impl From<read::favorite::Saved> for Saved {
    fn from(saved: read::favorite::Saved) -> Self {
        Self {
            id: saved.favorite.id.into(),
            created_at: saved.favorite.created_at,
            property: saved.property.into(),
        }
    }
}

/// [`Favorite`] as serialized in API responses.
///
/// [`Favorite`]: domain::Favorite
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    /// Unique identifier of the [`Favorite`].
    ///
    /// [`Favorite`]: domain::Favorite
    pub id: Uuid,

    /// ID of the `User` who saved the [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub user_id: Uuid,

    /// ID of the saved [`Property`].
    ///
    /// [`Property`]: domain::Property
    pub property_id: Uuid,

    /// When the [`Property`] was saved, as an RFC 3339 string.
    ///
    /// [`Property`]: domain::Property
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: domain::favorite::CreationDateTime,
}

impl From<domain::Favorite> for Favorite {
    fn from(favorite: domain::Favorite) -> Self {
        Self {
            id: favorite.id.into(),
            user_id: favorite.user_id.into(),
            property_id: favorite.property_id.into(),
            created_at: favorite.created_at,
        }
    }
}

/// `POST /api/v1/favorites/:id` handler saving a [`Property`] for the
/// authenticated `User`.
///
/// [`Property`]: domain::Property
pub async fn create(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(property_id): Path<property::Id>,
) -> Result<(StatusCode, Json<Favorite>), Error> {
    service
        .execute(command::CreateFavorite {
            user_id: auth.user_id,
            property_id,
        })
        .await
        .map(|favorite| (StatusCode::CREATED, Json(favorite.into())))
        .map_err(AsError::into_error)
}

/// `GET /api/v1/favorites` handler listing the authenticated `User`'s saved
/// [`Property`]s, newest first.
///
/// [`Property`]: domain::Property
pub async fn of_user(
    Extension(service): Extension<Service>,
    auth: Auth,
) -> Result<Json<Vec<Saved>>, Error> {
    service
        .execute(query::favorites::OfUser::by(auth.user_id))
        .await
        .map(|saved| Json(saved.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

/// `GET /api/v1/favorites/:id` handler returning a single [`Favorite`] with
/// the saved [`Property`].
///
/// [`Favorite`]: domain::Favorite
/// [`Property`]: domain::Property
pub async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<domain::favorite::Id>,
) -> Result<Json<Saved>, Error> {
    service
        .execute(query::favorite::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|saved| Json(saved.into()))
        .ok_or_else(|| api::NotFoundError::Favorite.into())
}

/// `DELETE /api/v1/favorites/:id` handler removing a [`Favorite`] of the
/// authenticated `User`.
///
/// [`Favorite`]: domain::Favorite
pub async fn remove(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<domain::favorite::Id>,
) -> Result<StatusCode, Error> {
    service
        .execute(command::DeleteFavorite {
            favorite_id: id,
            user_id: auth.user_id,
        })
        .await
        .map(|()| StatusCode::OK)
        .map_err(AsError::into_error)
}

impl AsError for command::create_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_favorite::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::UserNotExists(_) => Some(api::NotFoundError::User.into()),
            E::PropertyNotExists(_) => {
                Some(api::NotFoundError::Property.into())
            }
            E::AlreadyExists { .. } => {
                Some(FavoriteError::AlreadyExists.into())
            }
        }
    }
}

impl AsError for command::delete_favorite::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_favorite::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::FavoriteNotExists(_) => {
                Some(api::NotFoundError::Favorite.into())
            }
            E::NotOwner(_) => Some(api::PrivilegeError::Owner.into()),
        }
    }
}

define_error! {
    enum FavoriteError {
        #[code = "ALREADY_FAVORITE"]
        #[status = BAD_REQUEST]
        #[message = "`Property` is saved already"]
        AlreadyExists,
    }
}
