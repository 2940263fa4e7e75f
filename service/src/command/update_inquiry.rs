//! [`Command`] for editing the [`Message`] of an [`Inquiry`].
//!
//! [`Message`]: inquiry::Message

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{inquiry, user, Inquiry},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing the [`Message`] of an [`Inquiry`].
///
/// The [`Message`] is the only mutable field of an [`Inquiry`], and only the
/// [`User`] who sent it may edit it.
///
/// [`Message`]: inquiry::Message
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct UpdateInquiry {
    /// ID of the [`Inquiry`] to edit.
    pub inquiry_id: inquiry::Id,

    /// ID of the [`User`] performing the edit.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// New [`Message`] of the [`Inquiry`].
    ///
    /// [`Message`]: inquiry::Message
    pub message: inquiry::Message,
}

impl<Db, S> Command<UpdateInquiry> for Service<Db, S>
where
    Db: Database<
            Select<By<Option<Inquiry>, inquiry::Id>>,
            Ok = Option<Inquiry>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Update<Inquiry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Inquiry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateInquiry,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateInquiry {
            inquiry_id,
            user_id,
            message,
        } = cmd;

        let mut inquiry = self
            .database()
            .execute(Select(By::<Option<Inquiry>, _>::new(inquiry_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::InquiryNotExists(inquiry_id))
            .map_err(tracerr::wrap!())?;
        if inquiry.user_id != user_id {
            return Err(tracerr::new!(E::NotSender(user_id)));
        }

        inquiry.message = message;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Update(inquiry.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(inquiry)
    }
}

/// Error of [`UpdateInquiry`] [`Command`] execution.
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
    #[display("`User(id: {_0})` did not send the `Inquiry`")]
    #[from(ignore)]
    NotSender(#[error(not(source))] user::Id),
}
