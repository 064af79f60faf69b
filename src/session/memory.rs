//! Thread-safe in-memory [`SessionWriter`] for local development and tests.

// self
use crate::{
	_prelude::*,
	flows::SignupRequest,
	session::{SessionFuture, SessionRecord, SessionWriter},
};

type SessionLog = Arc<RwLock<Vec<SessionRecord>>>;

/// Session writer that keeps every written record in process.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(SessionLog);
impl MemorySessionStore {
	/// Every record written so far, oldest first.
	pub fn records(&self) -> Vec<SessionRecord> {
		self.0.read().clone()
	}

	/// The most recently written record.
	pub fn last(&self) -> Option<SessionRecord> {
		self.0.read().last().cloned()
	}

	/// Number of writes observed.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when nothing has been written.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl SessionWriter for MemorySessionStore {
	fn set_user_session<'a>(
		&'a self,
		_request: &'a SignupRequest,
		record: SessionRecord,
	) -> SessionFuture<'a, ()> {
		let log = self.0.clone();

		Box::pin(async move {
			log.write().push(record);

			Ok(())
		})
	}
}
