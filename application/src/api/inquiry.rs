//! [`Inquiry`]-related API definitions.
//!
//! [`Inquiry`]: domain::Inquiry

use axum::{extract::Path, Extension, Json};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, inquiry, property},
    query, Query as _,
};
use uuid::Uuid;

use crate::{api, context::Auth, define_error, AsError, Error, Service};

/// [`Inquiry`] as serialized in API responses.
///
/// [`Inquiry`]: domain::Inquiry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    /// Unique identifier of the [`Inquiry`].
    ///
    /// [`Inquiry`]: domain::Inquiry
    pub id: Uuid,

    /// Message of the [`Inquiry`].
    ///
    /// [`Inquiry`]: domain::Inquiry
    pub message: String,

    /// Status of the [`Inquiry`].
    ///
    /// [`Inquiry`]: domain::Inquiry
    pub status: String,

    /// ID of the `User` who sent the [`Inquiry`].
    ///
    /// [`Inquiry`]: domain::Inquiry
    pub user_id: Uuid,

    /// ID of the `Property` the [`Inquiry`] is about.
    ///
    /// [`Inquiry`]: domain::Inquiry
    pub property_id: Uuid,

    /// When the [`Inquiry`] was sent, as an RFC 3339 string.
    ///
    /// [`Inquiry`]: domain::Inquiry
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: inquiry::CreationDateTime,
}

impl From<domain::Inquiry> for Inquiry {
    fn from(inquiry: domain::Inquiry) -> Self {
        Self {
            id: inquiry.id.into(),
            message: inquiry.message.to_string(),
            status: inquiry.status.to_string(),
            user_id: inquiry.user_id.into(),
            property_id: inquiry.property_id.into(),
            created_at: inquiry.created_at,
        }
    }
}

/// Body of an [`Inquiry`] creation request.
///
/// [`Inquiry`]: domain::Inquiry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Message to send to the `Property` owner.
    pub message: String,
}

/// `POST /api/v1/properties/:id/inquiries` handler sending an [`Inquiry`]
/// about a `Property`.
///
/// [`Inquiry`]: domain::Inquiry
pub async fn create(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(property_id): Path<property::Id>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Inquiry>), Error> {
    let message = req
        .message
        .parse()
        .map_err(|e| Error::invalid_field("message", &e))?;

    service
        .execute(command::CreateInquiry {
            user_id: auth.user_id,
            property_id,
            message,
        })
        .await
        .map(|inquiry| (StatusCode::CREATED, Json(inquiry.into())))
        .map_err(AsError::into_error)
}

/// `GET /api/v1/properties/:id/inquiries` handler listing the [`Inquiry`]s
/// about a `Property`, newest first.
///
/// Only the owner of the `Property` may read its [`Inquiry`]s.
///
/// [`Inquiry`]: domain::Inquiry
pub async fn of_property(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(property_id): Path<property::Id>,
) -> Result<Json<Vec<Inquiry>>, Error> {
    let found = service
        .execute(query::property::ById::by(property_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(api::NotFoundError::Property))?;
    if found.property.user_id != auth.user_id {
        return Err(api::PrivilegeError::Owner.into());
    }

    service
        .execute(query::inquiries::OfProperty::by(property_id))
        .await
        .map(|inquiries| {
            Json(inquiries.into_iter().map(Into::into).collect())
        })
        .map_err(AsError::into_error)
}

/// Body of an [`Inquiry`] update request.
///
/// [`Inquiry`]: domain::Inquiry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// New message of the [`Inquiry`].
    ///
    /// [`Inquiry`]: domain::Inquiry
    pub message: String,
}

/// `PUT /api/v1/inquiries/:id` handler editing the message of an
/// [`Inquiry`].
///
/// Only the `User` who sent the [`Inquiry`] may edit it.
///
/// [`Inquiry`]: domain::Inquiry
pub async fn update(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<inquiry::Id>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Inquiry>, Error> {
    let message = inquiry::Message::new(req.message)
        .ok_or_else(|| {
            Error::invalid_field("message", &"must be 1..=1000 characters")
        })?;

    service
        .execute(command::UpdateInquiry {
            inquiry_id: id,
            user_id: auth.user_id,
            message,
        })
        .await
        .map(|inquiry| Json(inquiry.into()))
        .map_err(AsError::into_error)
}

/// `DELETE /api/v1/inquiries/:id` handler removing an [`Inquiry`].
///
/// Only the `User` who sent the [`Inquiry`] may remove it.
///
/// [`Inquiry`]: domain::Inquiry
pub async fn remove(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<inquiry::Id>,
) -> Result<StatusCode, Error> {
    service
        .execute(command::DeleteInquiry {
            inquiry_id: id,
            user_id: auth.user_id,
        })
        .await
        .map(|()| StatusCode::OK)
        .map_err(AsError::into_error)
}

impl AsError for command::create_inquiry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_inquiry::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::UserNotExists(_) => Some(api::NotFoundError::User.into()),
            E::PropertyNotExists(_) => {
                Some(api::NotFoundError::Property.into())
            }
        }
    }
}

impl AsError for command::update_inquiry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_inquiry::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InquiryNotExists(_) => Some(api::NotFoundError::Inquiry.into()),
            E::NotSender(_) => Some(SenderError::NotSender.into()),
        }
    }
}

impl AsError for command::delete_inquiry::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_inquiry::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::InquiryNotExists(_) => Some(api::NotFoundError::Inquiry.into()),
            E::NotOwner(_) => Some(SenderError::NotSender.into()),
        }
    }
}

define_error! {
    enum SenderError {
        #[code = "NOT_SENDER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be the sender of the `Inquiry`"]
        NotSender,
    }
}
