//! [`Query`] collection related to a single [`Property`].
//!
//! [`Property`]: crate::domain::Property

use common::operations::By;

use crate::{domain::property, read};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries a [`Property`] with its images by its [`property::Id`].
pub type ById = DatabaseQuery<
    By<Option<read::property::search::PropertyWithImages>, property::Id>,
>;
