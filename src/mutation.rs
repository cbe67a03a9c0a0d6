//! Create-doctor mutation.
//!
//! Encapsulates the side effect of persisting a new doctor together with its
//! interaction with the shared [`DoctorCache`]. The write runs on a worker
//! thread so the UI loop never blocks; the dialog polls the mutation each
//! tick and observes one of four states. The worker itself marks the cache
//! stale after a successful write, so invalidation is guaranteed to happen
//! after the insert and still happens if the dialog was closed before the
//! result arrived.

use crate::cache::DoctorCache;
use crate::db::Client;
use crate::models::Doctor;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Observable state of a create-doctor request.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationState {
    /// No request has been dispatched.
    Idle,
    /// A request is in flight; submit stays disabled.
    Pending,
    /// The doctor was persisted; holds the row the database returned.
    Success(Doctor),
    /// The request failed; holds the reason for inline display.
    Error(String),
}

/// Tracks a single create-doctor request at a time.
pub struct CreateDoctorMutation {
    state: MutationState,
    receiver: Option<Receiver<Result<Doctor, String>>>,
    cache: DoctorCache,
}

impl CreateDoctorMutation {
    pub fn new(cache: DoctorCache) -> Self {
        Self {
            state: MutationState::Idle,
            receiver: None,
            cache,
        }
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, MutationState::Pending)
    }

    /// Dispatches the draft snapshot to a worker thread.
    ///
    /// A submit while a request is already pending is ignored; the dialog
    /// additionally disables its submit control, so at most one request is
    /// attributable to a given submit action. Field edits made after
    /// dispatch cannot affect the snapshot already sent.
    pub fn submit(&mut self, client: Arc<Client>, draft: Doctor) {
        if self.is_pending() {
            return;
        }

        let (sender, receiver) = channel();
        let cache = self.cache.clone();
        thread::spawn(move || {
            let result = client.create_doctor(&draft).map_err(|e| e.to_string());
            if result.is_ok() {
                // Happens-after the insert, and independent of whether the
                // dialog still exists to receive the outcome.
                cache.invalidate();
            }
            let _ = sender.send(result);
        });

        self.receiver = Some(receiver);
        self.state = MutationState::Pending;
    }

    /// Polls the worker; called from the UI tick.
    ///
    /// Transitions Pending into Success or Error once the worker reports.
    pub fn poll(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };

        match receiver.try_recv() {
            Ok(Ok(doctor)) => {
                self.state = MutationState::Success(doctor);
                self.receiver = None;
            }
            Ok(Err(message)) => {
                self.state = MutationState::Error(message);
                self.receiver = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.state = MutationState::Error(String::from("create request was aborted"));
                self.receiver = None;
            }
        }
    }

    /// Returns to `Idle`, e.g. after the dialog consumed a terminal state.
    pub fn reset(&mut self) {
        self.state = MutationState::Idle;
        self.receiver = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_client() -> Arc<Client> {
        let path = std::env::temp_dir().join(format!(
            "dentoria-mutation-test-{}-{}.db",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_file(&path);
        Arc::new(Client::open(path.to_str().unwrap()).unwrap())
    }

    fn draft(email: &str) -> Doctor {
        Doctor {
            id: 0,
            name: "Dr. Jane Roe".into(),
            email: email.into(),
            phone: "(555) 123-4567".into(),
            speciality: "Orthodontics".into(),
            gender: Gender::Male,
            is_active: true,
            image_url: String::new(),
            created_at: String::new(),
        }
    }

    fn poll_until_settled(mutation: &mut CreateDoctorMutation) {
        for _ in 0..200 {
            mutation.poll();
            if !mutation.is_pending() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("mutation never settled");
    }

    #[test]
    fn success_invalidates_cache_and_reports_row() {
        let client = temp_client();
        let cache = DoctorCache::new();
        cache.store(Vec::new());
        assert!(!cache.needs_fetch());

        let mut mutation = CreateDoctorMutation::new(cache.clone());
        mutation.submit(Arc::clone(&client), draft("jane@example.com"));
        assert!(mutation.is_pending());

        poll_until_settled(&mut mutation);
        match mutation.state() {
            MutationState::Success(doctor) => {
                assert!(doctor.id > 0);
                assert_eq!(doctor.email, "jane@example.com");
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert!(cache.needs_fetch());
        client.close();
    }

    #[test]
    fn duplicate_email_surfaces_error_without_invalidation() {
        let client = temp_client();
        client.create_doctor(&draft("dup@example.com")).unwrap();

        let cache = DoctorCache::new();
        cache.store(Vec::new());

        let mut mutation = CreateDoctorMutation::new(cache.clone());
        mutation.submit(Arc::clone(&client), draft("dup@example.com"));
        poll_until_settled(&mut mutation);

        match mutation.state() {
            MutationState::Error(message) => assert!(message.contains("already exists")),
            other => panic!("expected error, got {other:?}"),
        }
        assert!(!cache.needs_fetch());
        client.close();
    }

    #[test]
    fn submit_while_pending_is_ignored() {
        let client = temp_client();
        let cache = DoctorCache::new();
        let mut mutation = CreateDoctorMutation::new(cache);

        mutation.submit(Arc::clone(&client), draft("one@example.com"));
        mutation.submit(Arc::clone(&client), draft("two@example.com"));
        poll_until_settled(&mut mutation);

        // Only the first snapshot was dispatched.
        let doctors = client.all_doctors().unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].email, "one@example.com");
        client.close();
    }

    #[test]
    fn late_success_after_drop_still_invalidates() {
        let client = temp_client();
        let cache = DoctorCache::new();
        cache.store(Vec::new());

        let mut mutation = CreateDoctorMutation::new(cache.clone());
        mutation.submit(Arc::clone(&client), draft("late@example.com"));
        drop(mutation);

        for _ in 0..200 {
            if cache.needs_fetch() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(cache.needs_fetch());
        assert_eq!(client.all_doctors().unwrap().len(), 1);
        client.close();
    }

    #[test]
    fn reset_returns_to_idle() {
        let client = temp_client();
        let cache = DoctorCache::new();
        let mut mutation = CreateDoctorMutation::new(cache);
        mutation.submit(Arc::clone(&client), draft("idle@example.com"));
        poll_until_settled(&mut mutation);
        mutation.reset();
        assert_eq!(*mutation.state(), MutationState::Idle);
        client.close();
    }
}
