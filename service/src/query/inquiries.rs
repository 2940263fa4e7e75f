//! [`Query`] collection related to [`Inquiry`]s.
//!
//! [`Inquiry`]: crate::domain::Inquiry

use common::operations::By;

use crate::domain::{property, Inquiry};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the [`Inquiry`]s sent for a [`Property`], newest first.
///
/// [`Property`]: crate::domain::Property
pub type OfProperty = DatabaseQuery<By<Vec<Inquiry>, property::Id>>;
