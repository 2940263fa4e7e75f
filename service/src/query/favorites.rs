//! [`Query`] collection related to [`Favorite`]s.
//!
//! [`Favorite`]: crate::domain::Favorite

use common::operations::By;

use crate::{domain::user, read};
#[cfg(doc)]
use crate::{domain::Favorite, Query};

use super::DatabaseQuery;

/// Queries the [`Favorite`]s of a [`User`], newest first, with the saved
/// properties included.
///
/// [`User`]: crate::domain::User
pub type OfUser = DatabaseQuery<By<Vec<read::favorite::Saved>, user::Id>>;
