//! [`Inquiry`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{property, user};

/// Message sent by a [`User`] to the owner of a [`Property`].
///
/// [`Property`]: super::Property
/// [`User`]: super::User
#[derive(Clone, Debug)]
pub struct Inquiry {
    /// ID of this [`Inquiry`].
    pub id: Id,

    /// [`Message`] of this [`Inquiry`].
    pub message: Message,

    /// [`Status`] of this [`Inquiry`].
    pub status: Status,

    /// ID of the [`User`] who sent this [`Inquiry`].
    ///
    /// [`User`]: super::User
    pub user_id: user::Id,

    /// ID of the [`Property`] this [`Inquiry`] is about.
    ///
    /// [`Property`]: super::Property
    pub property_id: property::Id,

    /// [`DateTime`] when this [`Inquiry`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Inquiry`].
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

/// Message of an [`Inquiry`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Message(String);

impl Message {
    /// Maximum length of a [`Message`], in bytes.
    pub const MAX_LEN: usize = 1000;

    /// Creates a new [`Message`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `text` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Creates a new [`Message`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Message`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.len() <= Self::MAX_LEN
    }
}

impl FromStr for Message {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Message`")
    }
}

define_kind! {
    #[doc = "Status of an [`Inquiry`]."]
    enum Status {
        #[doc = "Not yet read by the owner."]
        Unread = 1,

        #[doc = "Read by the owner."]
        Read = 2,
    }
}

/// [`DateTime`] when an [`Inquiry`] was created.
pub type CreationDateTime = DateTimeOf<(Inquiry, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Message;

    #[test]
    fn message_length_bounds() {
        assert!(Message::new("").is_none());
        assert!(Message::new("   ").is_none());
        assert!(Message::new("a").is_some());
        assert!(Message::new("a".repeat(1000)).is_some());
        assert!(Message::new("a".repeat(1001)).is_none());
    }
}
