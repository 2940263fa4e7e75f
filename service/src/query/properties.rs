//! [`Query`] collection related to multiple [`Property`]s.
//!
//! [`Property`]: crate::domain::Property

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries a [`Page`] of [`Property`]s matching a [`Selector`].
///
/// [`Page`]: read::property::search::Page
/// [`Selector`]: read::property::search::Selector
pub type Search = DatabaseQuery<
    By<read::property::search::Page, read::property::search::Selector>,
>;
