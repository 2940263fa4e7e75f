//! [`Command`] for withdrawing an [`Inquiry`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{inquiry, user, Inquiry},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for withdrawing an [`Inquiry`].
///
/// Only the [`User`] who sent the [`Inquiry`] may withdraw it.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug)]
pub struct DeleteInquiry {
    /// ID of the [`Inquiry`] to withdraw.
    pub inquiry_id: inquiry::Id,

    /// ID of the [`User`] withdrawing the [`Inquiry`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,
}

impl<Db, S> Command<DeleteInquiry> for Service<Db, S>
where
    Db: Database<
            Select<By<Option<Inquiry>, inquiry::Id>>,
            Ok = Option<Inquiry>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Delete<Inquiry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteInquiry,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteInquiry {
            inquiry_id,
            user_id,
        } = cmd;

        let inquiry = self
            .database()
            .execute(Select(By::new(inquiry_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::InquiryNotExists(inquiry_id))
            .map_err(tracerr::wrap!())?;
        if inquiry.user_id != user_id {
            return Err(tracerr::new!(E::NotOwner(user_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(inquiry))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`DeleteInquiry`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Inquiry`] with the provided ID does not exist.
    #[display("`Inquiry(id: {_0})` does not exist")]
    #[from(ignore)]
    InquiryNotExists(#[error(not(source))] inquiry::Id),

    /// Performing [`User`] did not send the [`Inquiry`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` does not own the `Inquiry`")]
    #[from(ignore)]
    NotOwner(#[error(not(source))] user::Id),
}
