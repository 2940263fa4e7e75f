//! [`User`]-related read definitions.

#[cfg(doc)]
use common::DateTime;

use crate::{
    domain::{user, Inquiry, User},
    read,
};

/// Public profile of a [`User`], without its credentials.
#[derive(Clone, Debug)]
pub struct Profile {
    /// ID of the [`User`].
    pub id: user::Id,

    /// [`FirstName`] of the [`User`].
    ///
    /// [`FirstName`]: user::FirstName
    pub first_name: user::FirstName,

    /// [`LastName`] of the [`User`].
    ///
    /// [`LastName`]: user::LastName
    pub last_name: user::LastName,

    /// [`Email`] of the [`User`].
    ///
    /// [`Email`]: user::Email
    pub email: user::Email,

    /// [`Role`] of the [`User`].
    ///
    /// [`Role`]: user::Role
    pub role: user::Role,

    /// [`Phone`] of the [`User`].
    ///
    /// [`Phone`]: user::Phone
    pub phone: Option<user::Phone>,

    /// [`DateTime`] when the [`User`] was created.
    pub created_at: user::CreationDateTime,
}

/// [`Profile`] of a [`User`] along with everything the [`User`] owns.
#[derive(Clone, Debug)]
pub struct Overview {
    /// [`Profile`] itself.
    pub profile: Profile,

    /// Properties listed by the [`User`], with their images, newest first.
    pub properties: Vec<read::property::search::PropertyWithImages>,

    /// [`Inquiry`]s sent by the [`User`], newest first.
    pub inquiries: Vec<Inquiry>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        let User {
            id,
            first_name,
            last_name,
            email,
            password_hash: _,
            role,
            phone,
            created_at,
        } = user;

        Self {
            id,
            first_name,
            last_name,
            email,
            role,
            phone,
            created_at,
        }
    }
}
