//! [`Query`] collection related to [`User`]s.
//!
//! [`User`]: crate::domain::User

use common::operations::By;

use crate::{domain::user, read};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries a [`read::user::Overview`] by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<read::user::Overview>, user::Id>>;
