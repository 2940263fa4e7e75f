//! [`Favorite`]-related read definitions.
//!
//! [`Favorite`]: crate::domain::Favorite

use crate::{domain::Favorite, read};

/// [`Favorite`] along with the saved [`Property`].
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct Saved {
    /// The [`Favorite`] itself.
    pub favorite: Favorite,

    /// Saved [`Property`] with its images.
    pub property: read::property::search::PropertyWithImages,
}
