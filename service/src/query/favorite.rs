//! [`Query`] collection related to a single [`Favorite`].
//!
//! [`Favorite`]: crate::domain::Favorite

use common::operations::By;

use crate::{domain::favorite, read};
#[cfg(doc)]
use crate::{domain::Favorite, Query};

use super::DatabaseQuery;

/// Queries a [`Favorite`] with its saved property by its [`favorite::Id`].
pub type ById =
    DatabaseQuery<By<Option<read::favorite::Saved>, favorite::Id>>;
