//! [`User`]-related API definitions.
//!
//! [`User`]: domain::User

use axum::{extract::Path, Extension, Json};
use http::StatusCode;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, user},
    query, read, Query as _,
};
use uuid::Uuid;

use crate::{api, define_error, AsError, Error, Service};

/// [`User`] of the system, as serialized in API responses.
///
/// Never carries the password credential.
///
/// [`User`]: domain::User
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier of the [`User`].
    ///
    /// [`User`]: domain::User
    pub id: Uuid,

    /// First name of the [`User`].
    ///
    /// [`User`]: domain::User
    pub first_name: String,

    /// Last name of the [`User`].
    ///
    /// [`User`]: domain::User
    pub last_name: String,

    /// Email address of the [`User`].
    ///
    /// [`User`]: domain::User
    pub email: String,

    /// Role of the [`User`].
    ///
    /// [`User`]: domain::User
    pub role: String,

    /// Phone number of the [`User`], if provided.
    ///
    /// [`User`]: domain::User
    pub phone: Option<String>,

    /// When the [`User`] was created, as an RFC 3339 string.
    ///
    /// [`User`]: domain::User
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: user::CreationDateTime,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self::from(read::user::Profile::from(user))
    }
}

impl From<read::user::Profile> for User {
    fn from(profile: read::user::Profile) -> Self {
        let read::user::Profile {
            id,
            first_name,
            last_name,
            email,
            role,
            phone,
            created_at,
        } = profile;

        Self {
            id: id.into(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            phone: phone.map(|p| p.to_string()),
            created_at,
        }
    }
}

/// Body of a signup request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// First name of the new [`User`].
    ///
    /// [`User`]: domain::User
    pub first_name: String,

    /// Last name of the new [`User`].
    ///
    /// [`User`]: domain::User
    pub last_name: String,

    /// Email address of the new [`User`].
    ///
    /// [`User`]: domain::User
    pub email: String,

    /// Password of the new [`User`].
    ///
    /// [`User`]: domain::User
    pub password: String,

    /// Role of the new [`User`].
    ///
    /// [`User`]: domain::User
    pub role: String,

    /// Phone number of the new [`User`], if any.
    ///
    /// [`User`]: domain::User
    pub phone: Option<String>,
}

/// `POST /api/v1/signup` handler registering a new [`User`].
///
/// [`User`]: domain::User
pub async fn signup(
    Extension(service): Extension<Service>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>), Error> {
    let SignupRequest {
        first_name,
        last_name,
        email,
        password,
        role,
        phone,
    } = req;

    let cmd = command::CreateUser {
        first_name: first_name
            .parse()
            .map_err(|e| Error::invalid_field("firstName", &e))?,
        last_name: last_name
            .parse()
            .map_err(|e| Error::invalid_field("lastName", &e))?,
        email: email
            .parse()
            .map_err(|e| Error::invalid_field("email", &e))?,
        password: SecretBox::new(Box::new(
            password
                .parse::<user::Password>()
                .map_err(|e| Error::invalid_field("password", &e))?,
        )),
        role: role.parse().map_err(|e| Error::invalid_field("role", &e))?,
        phone: phone
            .map(|p| p.parse::<user::Phone>())
            .transpose()
            .map_err(|e| Error::invalid_field("phone", &e))?,
    };

    service
        .execute(cmd)
        .await
        .map(|user| (StatusCode::CREATED, Json(user.into())))
        .map_err(AsError::into_error)
}

/// Body of a login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address of the [`User`] logging in.
    ///
    /// [`User`]: domain::User
    pub email: String,

    /// Password of the [`User`] logging in.
    ///
    /// [`User`]: domain::User
    pub password: String,
}

/// Body of a successful login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued bearer token.
    pub token: String,

    /// Authenticated [`User`].
    ///
    /// [`User`]: domain::User
    pub user: User,

    /// When the issued token expires, as an RFC 3339 string.
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub expires_at: user::session::ExpirationDateTime,
}

/// `POST /api/v1/login` handler issuing a new session token.
pub async fn login(
    Extension(service): Extension<Service>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Error> {
    let LoginRequest { email, password } = req;

    let cmd = command::CreateUserSession {
        email: email
            .parse()
            .map_err(|e| Error::invalid_field("email", &e))?,
        password: SecretBox::new(Box::new(user::Password::from(password))),
    };

    service
        .execute(cmd)
        .await
        .map(|out| {
            Json(LoginResponse {
                token: out.token.to_string(),
                user: out.user.into(),
                expires_at: out.expires_at,
            })
        })
        .map_err(AsError::into_error)
}

/// Body of a successful profile response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// [`User`] itself.
    ///
    /// [`User`]: domain::User
    #[serde(flatten)]
    pub user: User,

    /// Properties listed by the [`User`], newest first.
    ///
    /// [`User`]: domain::User
    pub properties: Vec<api::property::Property>,

    /// Inquiries sent by the [`User`], newest first.
    ///
    /// [`User`]: domain::User
    pub inquiries: Vec<api::inquiry::Inquiry>,
}

impl From<read::user::Overview> for ProfileResponse {
    fn from(overview: read::user::Overview) -> Self {
        let read::user::Overview {
            profile,
            properties,
            inquiries,
        } = overview;

        Self {
            user: profile.into(),
            properties: properties.into_iter().map(Into::into).collect(),
            inquiries: inquiries.into_iter().map(Into::into).collect(),
        }
    }
}

/// `GET /api/v1/user/:id` handler returning a [`User`]'s public profile along
/// with the listed properties and sent inquiries.
///
/// [`User`]: domain::User
pub async fn profile(
    Extension(service): Extension<Service>,
    Path(id): Path<user::Id>,
) -> Result<Json<ProfileResponse>, Error> {
    service
        .execute(query::user::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|overview| Json(overview.into()))
        .ok_or_else(|| api::NotFoundError::User.into())
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_user::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::EmailOccupied(_) => Some(CredentialsError::EmailOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_user_session::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::JsonWebTokenEncodeError(_) => None,
            E::UserNotExists(_) | E::WrongPassword => {
                Some(CredentialsError::WrongCredentials.into())
            }
        }
    }
}

define_error! {
    enum CredentialsError {
        #[code = "EMAIL_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "`User` with such email is registered already"]
        EmailOccupied,

        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Wrong email or password"]
        WrongCredentials,
    }
}
