//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// User session, as encoded into an access [`Token`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`Email`] of the [`User`] this [`Session`] belongs to.
    ///
    /// [`Email`]: user::Email
    pub email: user::Email,

    /// [`Role`] of the [`User`] this [`Session`] belongs to.
    ///
    /// [`Role`]: user::Role
    #[serde(with = "role")]
    pub role: user::Role,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Serialization of a [`user::Role`] claim as its string representation.
mod role {
    use serde::{de::Error as _, Deserialize as _, Deserializer, Serializer};

    use crate::domain::user;

    /// Serializes the [`user::Role`] as a string.
    pub(super) fn serialize<S>(
        role: &user::Role,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&role.to_string())
    }

    /// Deserializes a [`user::Role`] from its string representation.
    pub(super) fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<user::Role, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(D::Error::custom)
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
