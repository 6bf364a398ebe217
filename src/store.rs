//! The collection store: canonical in-memory state and its mutation rules
//!
//! The store is the sole writer of [`CollectionState`]. Every user intent
//! either changes the view state synchronously or issues exactly one API
//! call and applies its outcome under a deterministic rule. Failures are
//! converted into the `error_message` field; they never propagate to
//! consumers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::Error;
use crate::profile::{ProfileDraft, ProfileId, UserProfile};

/// The canonical view state, exposed to consumers as snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    /// Ordered collection of profiles, unique by id. Insertion order for
    /// created records, otherwise the order of the last full fetch.
    pub items: Vec<UserProfile>,

    /// True only while a full fetch is in flight
    pub is_loading: bool,

    /// Human-readable summary of the most recent failed operation,
    /// cleared by the next successful operation
    pub error_message: Option<String>,

    /// The profile currently being edited, or `None` for create mode
    pub editing_target: Option<UserProfile>,

    /// Whether the create/edit form is presented
    pub form_visible: bool,
}

impl CollectionState {
    fn initial() -> Self {
        Self {
            items: Vec::new(),
            is_loading: true,
            error_message: None,
            editing_target: None,
            form_visible: false,
        }
    }
}

/// Handle returned by [`CollectionStore::subscribe`], used to unsubscribe
pub type SubscriptionId = u64;

type Subscriber = Box<dyn Fn(&CollectionState) + Send + Sync>;

/// Bookkeeping for operations currently awaiting a server response
#[derive(Debug, Default)]
struct InFlight {
    load: bool,
    create: bool,
    entities: HashSet<ProfileId>,
}

/// Owner of the canonical collection state
///
/// All mutation goes through the intent methods below. Consumers observe
/// changes through [`subscribe`](Self::subscribe) and read state through
/// [`snapshot`](Self::snapshot); they never hold a mutable alias.
pub struct CollectionStore {
    api: ApiClient,
    state: RwLock<CollectionState>,
    in_flight: Mutex<InFlight>,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
}

impl CollectionStore {
    /// Create a new store around an API client, in the initial loading state
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: RwLock::new(CollectionState::initial()),
            in_flight: Mutex::new(InFlight::default()),
            subscribers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Return a clone of the current state
    pub fn snapshot(&self) -> CollectionState {
        read_lock(&self.state).clone()
    }

    /// Register a callback invoked after every state change
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CollectionState) + Send + Sync + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        write_lock(&self.subscribers).push((id, Box::new(callback)));
        id
    }

    /// Remove a previously registered callback
    pub fn unsubscribe(&self, id: SubscriptionId) {
        write_lock(&self.subscribers).retain(|(sub, _)| *sub != id);
    }

    /// Fetch the full collection and replace `items` with the result
    ///
    /// Raises `is_loading` for the duration of the call and lowers it on
    /// completion, success or failure. Ignored while a load is already in
    /// flight. No automatic retry; see
    /// [`retry_initial_load`](Self::retry_initial_load).
    pub async fn load_initial(&self) {
        {
            let mut ops = mutex_lock(&self.in_flight);
            if ops.load {
                debug!("load rejected: already in flight");
                return;
            }
            ops.load = true;
        }

        self.mutate(|state| state.is_loading = true);

        let result = self.api.list_all().await;
        mutex_lock(&self.in_flight).load = false;

        self.mutate(|state| {
            match result {
                Ok(items) => {
                    debug!(count = items.len(), "collection fetched");
                    state.items = items;
                    state.error_message = None;
                }
                Err(err) => {
                    warn!("fetch failed: {}", err);
                    state.error_message = Some(format!("Failed to fetch profiles: {}", err));
                }
            }
            state.is_loading = false;
        });
    }

    /// Re-run the full fetch after a failed load
    pub async fn retry_initial_load(&self) {
        self.load_initial().await;
    }

    /// Open the form in create mode
    pub fn begin_create(&self) {
        self.mutate(|state| {
            state.editing_target = None;
            state.form_visible = true;
        });
    }

    /// Open the form in edit mode for `profile`
    ///
    /// A no-op while an update or delete for the same profile is awaiting
    /// its response.
    pub fn begin_edit(&self, profile: &UserProfile) {
        if mutex_lock(&self.in_flight).entities.contains(&profile.id) {
            debug!(id = profile.id, "edit rejected: operation in flight");
            return;
        }
        self.mutate(|state| {
            state.editing_target = Some(profile.clone());
            state.form_visible = true;
        });
    }

    /// Close the form without touching `items` or `error_message`
    pub fn cancel_form(&self) {
        self.mutate(|state| {
            state.editing_target = None;
            state.form_visible = false;
        });
    }

    /// Submit a new profile
    ///
    /// On success the returned record is appended and the form closes; on
    /// failure the form stays open and `error_message` is set. Rejected
    /// while the initial load or a prior create is outstanding.
    pub async fn request_create(&self, draft: ProfileDraft) {
        if self.loading() {
            debug!("create rejected: collection not loaded yet");
            return;
        }
        {
            let mut ops = mutex_lock(&self.in_flight);
            if ops.create {
                debug!("create rejected: already in flight");
                return;
            }
            ops.create = true;
        }

        let result = self.api.create(&draft).await;
        mutex_lock(&self.in_flight).create = false;

        self.mutate(|state| match result {
            Ok(profile) => {
                debug!(id = profile.id, "profile created");
                state.items.push(profile);
                state.form_visible = false;
                state.error_message = None;
            }
            Err(err) => {
                warn!("create failed: {}", err);
                state.error_message = Some(format!("Failed to create profile: {}", err));
            }
        });
    }

    /// Submit changed fields for the profile identified by `id`
    ///
    /// On success the matching element is replaced in place, order
    /// unchanged, and the form closes. A response whose id matches no
    /// current element is discarded and reported as a consistency failure
    /// rather than inserted. Rejected while the initial load or another
    /// operation on the same profile is outstanding.
    pub async fn request_update(&self, id: ProfileId, draft: ProfileDraft) {
        if self.loading() {
            debug!(id, "update rejected: collection not loaded yet");
            return;
        }
        if !self.begin_entity_op(id) {
            debug!(id, "update rejected: operation in flight");
            return;
        }

        let result = self.api.update(id, &draft).await;
        self.end_entity_op(id);

        self.mutate(|state| match result {
            Ok(profile) => {
                match state.items.iter_mut().find(|item| item.id == profile.id) {
                    Some(slot) => {
                        debug!(id, "profile updated");
                        *slot = profile;
                        state.editing_target = None;
                        state.form_visible = false;
                        state.error_message = None;
                    }
                    None => {
                        // The record vanished locally while the call was in
                        // flight; inserting it here would resurrect it.
                        warn!(id, "update response matches no local record, discarding");
                        let err = Error::consistency(format!(
                            "profile {} is no longer in the local collection",
                            id
                        ));
                        state.error_message =
                            Some(format!("Failed to update profile: {}", err));
                    }
                }
            }
            Err(err) => {
                warn!(id, "update failed: {}", err);
                state.error_message = Some(format!("Failed to update profile: {}", err));
            }
        });
    }

    /// Delete the profile identified by `id`
    ///
    /// On success the matching element is removed; if it was being edited
    /// the form closes as well. Rejected while the initial load or another
    /// operation on the same profile is outstanding.
    pub async fn request_delete(&self, id: ProfileId) {
        if self.loading() {
            debug!(id, "delete rejected: collection not loaded yet");
            return;
        }
        if !self.begin_entity_op(id) {
            debug!(id, "delete rejected: operation in flight");
            return;
        }

        let result = self.api.remove(id).await;
        self.end_entity_op(id);

        self.mutate(|state| match result {
            Ok(()) => {
                debug!(id, "profile deleted");
                state.items.retain(|item| item.id != id);
                if state.editing_target.as_ref().map(|item| item.id) == Some(id) {
                    state.editing_target = None;
                    state.form_visible = false;
                }
                state.error_message = None;
            }
            Err(err) => {
                warn!(id, "delete failed: {}", err);
                state.error_message = Some(format!("Failed to delete profile: {}", err));
            }
        });
    }

    fn loading(&self) -> bool {
        read_lock(&self.state).is_loading
    }

    /// Claim the per-entity slot; false if an operation for `id` is pending
    fn begin_entity_op(&self, id: ProfileId) -> bool {
        mutex_lock(&self.in_flight).entities.insert(id)
    }

    fn end_entity_op(&self, id: ProfileId) {
        mutex_lock(&self.in_flight).entities.remove(&id);
    }

    /// Apply a change to the state and notify subscribers with a snapshot
    fn mutate(&self, apply: impl FnOnce(&mut CollectionState)) {
        let snapshot = {
            let mut state = write_lock(&self.state);
            apply(&mut state);
            state.clone()
        };
        for (_, callback) in read_lock(&self.subscribers).iter() {
            callback(&snapshot);
        }
    }
}

// Lock helpers that recover the inner value if a panicking subscriber
// poisoned a lock.

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn mutex_lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
