//! [`Handler`] abstraction.

use std::future::Future;

/// Handler executing some operation described by its `Args`.
///
/// Commands, queries and database operations are all expressed through this
/// single trait, so callers depend on the operation type rather than on a
/// concrete implementation.
pub trait Handler<Args = ()> {
    /// Type the [`Handler`] resolves with on success.
    type Ok;

    /// Type of the [`Handler`]'s error.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
