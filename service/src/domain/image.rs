//! [`Image`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::property;

/// Image attached to a [`Property`].
///
/// [`Property`]: super::Property
#[derive(Clone, Debug)]
pub struct Image {
    /// ID of this [`Image`].
    pub id: Id,

    /// Public [`Url`] this [`Image`] is served from.
    pub url: Url,

    /// Identifier of this [`Image`] in the remote object store.
    pub object_id: ObjectId,

    /// [`Kind`] of this [`Image`].
    pub kind: Kind,

    /// ID of the [`Property`] this [`Image`] belongs to.
    ///
    /// [`Property`]: super::Property
    pub property_id: property::Id,

    /// [`DateTime`] when this [`Image`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Image`].
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

/// Public URL an [`Image`] is served from.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Url(String);

impl Url {
    /// Creates a new [`Url`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`Url`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`Url`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        (url.starts_with("http://") || url.starts_with("https://"))
            && url.len() <= 2048
    }
}

impl FromStr for Url {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Url`")
    }
}

/// Identifier of an [`Image`] in the remote object store, used to delete the
/// stored object when the [`Image`] is removed.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates a new [`ObjectId`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`ObjectId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`ObjectId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        !id.is_empty() && id.len() <= 512
    }
}

impl FromStr for ObjectId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ObjectId`")
    }
}

define_kind! {
    #[doc = "Kind of an [`Image`]."]
    enum Kind {
        #[doc = "Main image shown on listing cards."]
        Main = 1,

        #[doc = "Regular gallery image."]
        Gallery = 2,

        #[doc = "Floor plan of the premises."]
        Floorplan = 3,
    }
}

/// Maximum number of [`Image`]s a single [`Property`] may carry.
///
/// [`Property`]: super::Property
pub const MAX_PER_PROPERTY: usize = 10;

/// [`DateTime`] when an [`Image`] was created.
pub type CreationDateTime = DateTimeOf<(Image, unit::Creation)>;
