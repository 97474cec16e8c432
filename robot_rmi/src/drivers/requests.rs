use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::packets::ID_SPACE;
use crate::ArmError;

pub(crate) type Delivery = Result<String, ArmError>;

/// In-flight requests keyed by wire id, each waiting on its own
/// single-slot channel.
///
/// Ids come from a wrapping counter over the controller's id space and
/// skip any id that is still registered.
#[derive(Debug, Default)]
pub(crate) struct RequestTable {
    pending: HashMap<u32, oneshot::Sender<Delivery>>,
    next_id: u32,
}

impl RequestTable {
    pub(crate) fn register(&mut self) -> Result<(u32, oneshot::Receiver<Delivery>), ArmError> {
        let id = self.allocate_id().ok_or_else(|| {
            ArmError::FailedToSend(format!("all {} request ids are in flight", ID_SPACE))
        })?;
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        Ok((id, rx))
    }

    fn allocate_id(&mut self) -> Option<u32> {
        for _ in 0..ID_SPACE {
            let id = self.next_id;
            self.next_id = (self.next_id + 1) % ID_SPACE;
            if !self.pending.contains_key(&id) {
                return Some(id);
            }
        }
        None
    }

    /// Hands `message` to whoever registered `id`. Returns false when
    /// nobody did (timed out already, or a spurious frame).
    pub(crate) fn deliver(&mut self, id: u32, message: String) -> bool {
        match self.pending.remove(&id) {
            Some(tx) => {
                let _ = tx.send(Ok(message));
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: u32) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Completes every pending request with `err` and empties the table.
    pub(crate) fn fail_all(&mut self, err: &ArmError) -> usize {
        let count = self.pending.len();
        for (_, tx) in self.pending.drain() {
            let _ = tx.send(Err(err.clone()));
        }
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Table shared between callers and the read loop. The lock is never
/// held across an await, so a plain mutex is enough and it can be taken
/// from `Drop`.
pub(crate) type SharedRequests = Arc<Mutex<RequestTable>>;

pub(crate) fn lock(requests: &SharedRequests) -> MutexGuard<'_, RequestTable> {
    requests.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns one id in the table while its caller waits. Dropping it removes
/// the id, so a caller that gives up early (cancelled future, outer
/// timeout, `select!`) does not leak it.
pub(crate) struct Registration {
    id: u32,
    requests: SharedRequests,
    armed: bool,
}

impl Registration {
    pub(crate) fn new(requests: &SharedRequests) -> Result<(Self, oneshot::Receiver<Delivery>), ArmError> {
        let (id, rx) = lock(requests).register()?;
        let registration = Self {
            id,
            requests: requests.clone(),
            armed: true,
        };
        Ok((registration, rx))
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    /// The read loop already took the id out of the table.
    pub(crate) fn completed(mut self) {
        self.armed = false;
    }

    /// Removes the id now. Returns false when the read loop got there first.
    pub(crate) fn release(mut self) -> bool {
        self.armed = false;
        let removed = lock(&self.requests).remove(self.id);
        removed
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.armed {
            lock(&self.requests).remove(self.id);
        }
    }
}
