//! In-memory state of the video collection.
//!
//! `VideoCollection` owns the list, the form draft, the recorded error and
//! the cache. Every mutation runs in two phases so a UI can keep its event
//! loop free while the request is out:
//!
//! 1. `begin_*` validates the draft, claims the id in the in-flight tracker
//!    and returns a `Mutation` describing the request.
//! 2. `Mutation::run` performs the request against a `VideoService`.
//! 3. `apply_outcome` folds the result back in, releases the id and
//!    rewrites the cache on success.
//!
//! The async helpers (`load`, `add_video`, ...) chain the phases for callers
//! that can simply await.

use tracing::{debug, error, info, warn};

use crate::api::{ApiError, Operation, VideoService};
use crate::cache::{CacheManager, KeyValueStore};
use crate::inflight::{Busy, InFlightTracker};
use crate::models::{NewVideo, Video, VideoDraft};
use crate::reconcile::reconcile_detailed;

/// Load state of the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Ready,
    /// Remote fetch failed; the list shown came from the cache
    ErrorWithCachedData,
    /// Remote fetch failed and there was nothing to fall back on
    ErrorEmpty,
}

/// A request produced by a `begin_*` call, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create { local_id: String, video: NewVideo },
    Update { id: String, video: Video },
    Delete { id: String },
}

impl Mutation {
    /// The id this mutation holds in the in-flight tracker
    pub fn id(&self) -> &str {
        match self {
            Mutation::Create { local_id, .. } => local_id,
            Mutation::Update { id, .. } | Mutation::Delete { id } => id,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Create { .. } => Operation::Create,
            Mutation::Update { .. } => Operation::Update,
            Mutation::Delete { .. } => Operation::Delete,
        }
    }

    /// Send the request and package the server's answer.
    pub async fn run<A: VideoService>(self, api: &A) -> MutationOutcome {
        match self {
            Mutation::Create { local_id, video } => {
                let result = api.create_video(&video).await;
                MutationOutcome::Created { local_id, result }
            }
            Mutation::Update { id, video } => {
                let result = api.update_video(&id, &video).await;
                MutationOutcome::Updated { id, result }
            }
            Mutation::Delete { id } => {
                let result = api.delete_video(&id).await;
                MutationOutcome::Deleted { id, result }
            }
        }
    }
}

/// Server answer to a `Mutation`
#[derive(Debug)]
pub enum MutationOutcome {
    Created {
        local_id: String,
        result: Result<Video, ApiError>,
    },
    Updated {
        id: String,
        result: Result<Video, ApiError>,
    },
    Deleted {
        id: String,
        result: Result<(), ApiError>,
    },
}

pub struct VideoCollection<S> {
    videos: Vec<Video>,
    state: ViewState,
    error: Option<String>,
    draft: VideoDraft,
    editing: Option<Video>,
    cache: CacheManager<S>,
    in_flight: InFlightTracker,
    disposed: bool,
}

impl<S: KeyValueStore> VideoCollection<S> {
    pub fn new(store: S) -> Self {
        Self {
            videos: Vec::new(),
            state: ViewState::Loading,
            error: None,
            draft: VideoDraft::default(),
            editing: None,
            cache: CacheManager::new(store),
            in_flight: InFlightTracker::new(),
            disposed: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Last recorded error message, until dismissed or a reload succeeds
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> &VideoDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut VideoDraft {
        &mut self.draft
    }

    /// The video being edited, if the form is in edit mode
    pub fn editing(&self) -> Option<&Video> {
        self.editing.as_ref()
    }

    pub fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }

    pub fn cache(&self) -> &CacheManager<S> {
        &self.cache
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn find(&self, id: &str) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == id)
    }

    /// Id for the next locally created video: one past the largest numeric id.
    /// Ids that are not numbers, or have no successor in `u64`, are ignored.
    pub fn next_id(&self) -> String {
        self.videos
            .iter()
            .filter_map(|v| v.numeric_id()?.checked_add(1))
            .max()
            .unwrap_or(1)
            .to_string()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Enter the loading state ahead of a fetch
    pub fn begin_load(&mut self) {
        if self.disposed {
            return;
        }
        self.state = ViewState::Loading;
        self.error = None;
    }

    /// Fold a remote fetch result into the collection.
    ///
    /// Success merges with the cache and writes the merged list back.
    /// Failure falls back to the cache without writing anything.
    pub fn apply_fetch(&mut self, result: Result<Vec<Video>, ApiError>) {
        if self.disposed {
            debug!("Ignoring fetch result after dispose");
            return;
        }

        match result {
            Ok(remote) => {
                let remote_count = remote.len();
                let merged = reconcile_detailed(remote, self.cache.cached_videos());
                if !merged.cache_only_ids.is_empty() {
                    info!(
                        ids = ?merged.cache_only_ids,
                        "Keeping cached videos the server did not return"
                    );
                }
                info!(
                    remote = remote_count,
                    total = merged.videos.len(),
                    "Collection loaded"
                );
                self.videos = merged.videos;
                self.persist();
                self.state = ViewState::Ready;
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed, falling back to cache");
                let cached = self.cache.cached_videos();
                if !cached.is_empty() {
                    self.videos = cached;
                }
                self.error = Some(e.user_message(Operation::Fetch));
                self.state = if self.videos.is_empty() {
                    ViewState::ErrorEmpty
                } else {
                    ViewState::ErrorWithCachedData
                };
            }
        }
    }

    // =========================================================================
    // Mutations: begin
    // =========================================================================

    /// Submit the form: update when editing, create otherwise.
    pub fn begin_submit(&mut self) -> Result<Option<Mutation>, Busy> {
        if self.editing.is_some() {
            self.begin_update()
        } else {
            self.begin_add()
        }
    }

    /// Start creating a video from the draft. `Ok(None)` when the draft is incomplete.
    pub fn begin_add(&mut self) -> Result<Option<Mutation>, Busy> {
        if self.disposed {
            return Ok(None);
        }
        let Some(video) = self.draft.to_new_video() else {
            debug!("Add skipped: draft incomplete");
            return Ok(None);
        };
        let local_id = self.next_id();
        self.in_flight.try_begin(&local_id, Operation::Create)?;
        debug!(id = %local_id, "Create started");
        Ok(Some(Mutation::Create { local_id, video }))
    }

    /// Start saving the draft over the video being edited.
    pub fn begin_update(&mut self) -> Result<Option<Mutation>, Busy> {
        if self.disposed {
            return Ok(None);
        }
        let Some(editing) = self.editing.as_ref() else {
            return Ok(None);
        };
        let Some(video) = self.draft.apply_to(editing) else {
            debug!(id = %editing.id, "Update skipped: draft incomplete");
            return Ok(None);
        };
        let id = video.id.clone();
        self.in_flight.try_begin(&id, Operation::Update)?;
        debug!(id = %id, "Update started");
        Ok(Some(Mutation::Update { id, video }))
    }

    pub fn begin_delete(&mut self, id: &str) -> Result<Option<Mutation>, Busy> {
        if self.disposed {
            return Ok(None);
        }
        self.in_flight.try_begin(id, Operation::Delete)?;
        debug!(id = %id, "Delete started");
        Ok(Some(Mutation::Delete { id: id.to_string() }))
    }

    // =========================================================================
    // Mutations: complete
    // =========================================================================

    /// Apply a server answer and release its id.
    pub fn apply_outcome(&mut self, outcome: MutationOutcome) {
        match outcome {
            MutationOutcome::Created { local_id, result } => self.complete_add(&local_id, result),
            MutationOutcome::Updated { id, result } => self.complete_update(&id, result),
            MutationOutcome::Deleted { id, result } => self.complete_delete(&id, result),
        }
    }

    fn complete_add(&mut self, local_id: &str, result: Result<Video, ApiError>) {
        self.in_flight.finish(local_id);
        if self.disposed {
            return;
        }
        match result {
            Ok(mut created) => {
                if created.id.is_empty() {
                    created.id = local_id.to_string();
                }
                info!(id = %created.id, "Video added");
                self.videos.push(created);
                self.persist();
                if self.editing.is_none() {
                    self.draft = VideoDraft::default();
                }
                self.sync_error_state();
            }
            Err(e) => self.record_failure(Operation::Create, local_id, &e),
        }
    }

    fn complete_update(&mut self, id: &str, result: Result<Video, ApiError>) {
        self.in_flight.finish(id);
        if self.disposed {
            return;
        }
        match result {
            Ok(mut updated) => {
                if updated.id.is_empty() {
                    updated.id = id.to_string();
                }
                match self.videos.iter_mut().find(|v| v.id == id) {
                    Some(slot) => *slot = updated,
                    None => debug!(id = %id, "Updated video no longer in list"),
                }
                info!(id = %id, "Video updated");
                self.persist();
                if self.editing.as_ref().is_some_and(|v| v.id == id) {
                    self.cancel_edit();
                }
            }
            Err(e) => self.record_failure(Operation::Update, id, &e),
        }
    }

    fn complete_delete(&mut self, id: &str, result: Result<(), ApiError>) {
        self.in_flight.finish(id);
        if self.disposed {
            return;
        }
        match result {
            Ok(()) => {
                self.videos.retain(|v| v.id != id);
                info!(id = %id, "Video deleted");
                self.persist();
                if self.editing.as_ref().is_some_and(|v| v.id == id) {
                    self.cancel_edit();
                }
                self.sync_error_state();
            }
            Err(e) => self.record_failure(Operation::Delete, id, &e),
        }
    }

    // =========================================================================
    // Form and banner state
    // =========================================================================

    /// Switch the form to edit mode for `video`, pre-filling the draft.
    pub fn start_edit(&mut self, video: &Video) {
        self.draft = VideoDraft::from_video(video);
        self.editing = Some(video.clone());
    }

    /// Back to create mode with an empty draft
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft = VideoDraft::default();
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Stop accepting results. Outcomes arriving afterwards are dropped.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.in_flight.clear();
    }

    // =========================================================================
    // Async helpers
    // =========================================================================

    /// Fetch, merge with the cache and store the result.
    pub async fn load<A: VideoService>(&mut self, api: &A) {
        self.begin_load();
        let result = api.fetch_videos().await;
        self.apply_fetch(result);
    }

    pub async fn add_video<A: VideoService>(&mut self, api: &A) -> Result<(), Busy> {
        let mutation = self.begin_add()?;
        self.run_mutation(api, mutation).await;
        Ok(())
    }

    pub async fn update_video<A: VideoService>(&mut self, api: &A) -> Result<(), Busy> {
        let mutation = self.begin_update()?;
        self.run_mutation(api, mutation).await;
        Ok(())
    }

    pub async fn delete_video<A: VideoService>(&mut self, api: &A, id: &str) -> Result<(), Busy> {
        let mutation = self.begin_delete(id)?;
        self.run_mutation(api, mutation).await;
        Ok(())
    }

    async fn run_mutation<A: VideoService>(&mut self, api: &A, mutation: Option<Mutation>) {
        if let Some(mutation) = mutation {
            let outcome = mutation.run(api).await;
            self.apply_outcome(outcome);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Rewrite the whole cache slot with the current list
    fn persist(&self) {
        if let Err(e) = self.cache.save_videos(&self.videos) {
            warn!(error = %e, "Failed to cache video list");
        }
    }

    fn record_failure(&mut self, operation: Operation, id: &str, e: &ApiError) {
        error!(id = %id, op = %operation, error = %e, "Mutation failed");
        self.error = Some(e.user_message(operation));
    }

    /// Keep the two error states consistent with whether there is a list to show
    fn sync_error_state(&mut self) {
        self.state = match self.state {
            ViewState::ErrorEmpty if !self.videos.is_empty() => ViewState::ErrorWithCachedData,
            ViewState::ErrorWithCachedData if self.videos.is_empty() => ViewState::ErrorEmpty,
            other => other,
        };
    }
}

// ============================================================================
// Tests
// ============================================================================
