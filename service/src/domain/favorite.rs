//! [`Favorite`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{property, user};

/// Bookmark of a [`Property`] saved by a [`User`].
///
/// A [`User`] may save any [`Property`] at most once.
///
/// [`Property`]: super::Property
/// [`User`]: super::User
#[derive(Clone, Debug)]
pub struct Favorite {
    /// ID of this [`Favorite`].
    pub id: Id,

    /// ID of the [`User`] who saved the [`Favorite`].
    ///
    /// [`User`]: super::User
    pub user_id: user::Id,

    /// ID of the saved [`Property`].
    ///
    /// [`Property`]: super::Property
    pub property_id: property::Id,

    /// [`DateTime`] when this [`Favorite`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Favorite`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// [`DateTime`] when a [`Favorite`] was created.
pub type CreationDateTime = DateTimeOf<(Favorite, unit::Creation)>;
