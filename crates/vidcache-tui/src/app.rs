//! Application state management for vidcache.
//!
//! This module contains the `App` struct that owns the UI state and the
//! video collection, and coordinates the background tasks that talk to
//! the API. Requests run on spawned tasks; their results come back over an
//! MPSC channel and are applied on the UI loop in `check_background_tasks`.

use std::future::Future;
use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use vidcache_core::{
    ApiClient, ApiError, Config, FileStore, Mutation, MutationOutcome, Operation, Video,
    VideoCollection, ViewState,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for a form field.
const MAX_FIELD_LENGTH: usize = 80;

/// Number of cards per grid row.
pub const GRID_COLUMNS: usize = 3;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Which panel receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Grid,
    Form,
}

/// Form field with keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Price,
    InstructorName,
    InstructorPosition,
    Reviews,
    Submit,
}

impl FormField {
    pub const INPUTS: [FormField; 5] = [
        FormField::Title,
        FormField::Price,
        FormField::InstructorName,
        FormField::InstructorPosition,
        FormField::Reviews,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Price => "Price",
            FormField::InstructorName => "Instructor",
            FormField::InstructorPosition => "Position",
            FormField::Reviews => "Reviews",
            FormField::Submit => "Submit",
        }
    }

    /// Get the next field (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Price,
            FormField::Price => FormField::InstructorName,
            FormField::InstructorName => FormField::InstructorPosition,
            FormField::InstructorPosition => FormField::Reviews,
            FormField::Reviews => FormField::Submit,
            FormField::Submit => FormField::Title,
        }
    }

    /// Get the previous field (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::Submit,
            FormField::Price => FormField::Title,
            FormField::InstructorName => FormField::Price,
            FormField::InstructorPosition => FormField::InstructorName,
            FormField::Reviews => FormField::InstructorPosition,
            FormField::Submit => FormField::Reviews,
        }
    }
}

/// Arrow direction within the card grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned API tasks
enum TaskResult {
    Fetched(Result<Vec<Video>, ApiError>),
    Mutated(MutationOutcome),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    api: Option<ApiClient>,
    pub collection: VideoCollection<FileStore>,

    // UI State
    pub state: AppState,
    pub focus: Focus,
    pub form_field: FormField,
    pub grid_selection: usize,
    pub pending_delete: Option<String>,
    pub status_message: Option<String>,
    pub cache_age: Option<String>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    /// Create a new application instance from a loaded config
    pub fn new(config: Config) -> Result<Self> {
        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let api = match config.base_url() {
            Some(url) => match ApiClient::new(&url, config.request_timeout()) {
                Ok(api) => Some(api),
                Err(e) => {
                    error!(error = %e, "Failed to create API client");
                    None
                }
            },
            None => {
                warn!("No API base URL configured; running from cache only");
                None
            }
        };

        let collection = VideoCollection::new(FileStore::new(cache_dir)?);
        let cache_age = collection.cache().videos_age();
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            api,
            collection,

            state: AppState::Normal,
            focus: Focus::Grid,
            form_field: FormField::Title,
            grid_selection: 0,
            pending_delete: None,
            status_message: None,
            cache_age,

            task_rx: rx,
            task_tx: tx,
            tasks: Vec::new(),
        })
    }

    pub fn is_online(&self) -> bool {
        self.api.is_some()
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Run `work` on a spawned task and deliver its result to the UI loop
    fn spawn_task<F>(&mut self, work: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        let handle = tokio::spawn(async move {
            let result = work.await;
            if tx.send(result).await.is_err() {
                debug!("Task result dropped - channel closed");
            }
        });
        self.tasks.retain(|h| !h.is_finished());
        self.tasks.push(handle);
    }

    /// Fetch the remote list and merge it with the cache
    pub fn reload(&mut self) {
        info!("Loading video collection");
        self.collection.begin_load();

        match self.api.clone() {
            Some(api) => {
                self.spawn_task(async move { TaskResult::Fetched(api.fetch_videos().await) });
                self.status_message = Some("Loading videos...".to_string());
            }
            None => {
                self.collection.apply_fetch(Err(ApiError::NotConfigured));
                self.after_change();
            }
        }
    }

    fn dispatch(&mut self, mutation: Mutation) {
        match self.api.clone() {
            Some(api) => {
                let label = match mutation.operation() {
                    Operation::Create => "Adding video...",
                    Operation::Update => "Saving changes...",
                    Operation::Delete => "Deleting video...",
                    Operation::Fetch => "Loading videos...",
                };
                self.status_message = Some(label.to_string());
                self.spawn_task(async move { TaskResult::Mutated(mutation.run(&api).await) });
            }
            None => {
                let outcome = match mutation {
                    Mutation::Create { local_id, .. } => MutationOutcome::Created {
                        local_id,
                        result: Err(ApiError::NotConfigured),
                    },
                    Mutation::Update { id, .. } => MutationOutcome::Updated {
                        id,
                        result: Err(ApiError::NotConfigured),
                    },
                    Mutation::Delete { id } => MutationOutcome::Deleted {
                        id,
                        result: Err(ApiError::NotConfigured),
                    },
                };
                self.collection.apply_outcome(outcome);
                self.after_change();
            }
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        if results.is_empty() {
            return;
        }

        for result in results {
            match result {
                TaskResult::Fetched(result) => self.collection.apply_fetch(result),
                TaskResult::Mutated(outcome) => self.collection.apply_outcome(outcome),
            }
        }
        self.after_change();
    }

    /// Refresh derived UI state after the collection changed
    fn after_change(&mut self) {
        self.grid_selection = clamp_selection(self.grid_selection, self.collection.videos().len());
        if self.collection.in_flight().is_idle() && !self.is_loading() {
            self.status_message = None;
        }
        self.cache_age = self.collection.cache().videos_age();
    }

    pub fn is_loading(&self) -> bool {
        self.collection.state() == ViewState::Loading
    }

    /// Stop background work and drop any late results
    pub fn shutdown(&mut self) {
        self.collection.dispose();
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
        info!("Background tasks cancelled");
    }

    // =========================================================================
    // Grid
    // =========================================================================

    pub fn selected_video(&self) -> Option<&Video> {
        self.collection.videos().get(self.grid_selection)
    }

    pub fn move_selection(&mut self, direction: Direction) {
        self.grid_selection =
            move_in_grid(self.grid_selection, self.collection.videos().len(), direction);
    }

    /// Open the delete confirmation for the selected card
    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_video().map(|v| v.id.clone()) {
            self.pending_delete = Some(id);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        match self.collection.begin_delete(&id) {
            Ok(Some(mutation)) => self.dispatch(mutation),
            Ok(None) => {}
            Err(busy) => self.status_message = Some(busy.to_string()),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Form
    // =========================================================================

    /// Load the selected card into the form
    pub fn start_edit_selected(&mut self) {
        if let Some(video) = self.selected_video().cloned() {
            self.collection.start_edit(&video);
            self.focus = Focus::Form;
            self.form_field = FormField::Title;
        }
    }

    /// Empty form in create mode
    pub fn start_new(&mut self) {
        self.collection.cancel_edit();
        self.focus = Focus::Form;
        self.form_field = FormField::Title;
    }

    pub fn cancel_form(&mut self) {
        if self.collection.editing().is_some() {
            self.collection.cancel_edit();
        }
        self.focus = Focus::Grid;
    }

    /// Submit the form. Incomplete drafts are ignored.
    pub fn submit_form(&mut self) {
        match self.collection.begin_submit() {
            Ok(Some(mutation)) => {
                self.dispatch(mutation);
                self.form_field = FormField::Title;
            }
            Ok(None) => {}
            Err(busy) => self.status_message = Some(busy.to_string()),
        }
    }

    /// Text of a form input
    pub fn field_value(&self, field: FormField) -> &str {
        let draft = self.collection.draft();
        match field {
            FormField::Title => &draft.title,
            FormField::Price => &draft.price,
            FormField::InstructorName => &draft.instructor_name,
            FormField::InstructorPosition => &draft.instructor_position,
            FormField::Reviews => &draft.review_count,
            FormField::Submit => "",
        }
    }

    fn field_mut(&mut self, field: FormField) -> Option<&mut String> {
        let draft = self.collection.draft_mut();
        match field {
            FormField::Title => Some(&mut draft.title),
            FormField::Price => Some(&mut draft.price),
            FormField::InstructorName => Some(&mut draft.instructor_name),
            FormField::InstructorPosition => Some(&mut draft.instructor_position),
            FormField::Reviews => Some(&mut draft.review_count),
            FormField::Submit => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        let field = self.form_field;
        if let Some(value) = self.field_mut(field) {
            if can_add_field_char(field, value.chars().count(), c) {
                value.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        let field = self.form_field;
        if let Some(value) = self.field_mut(field) {
            value.pop();
        }
    }
}

// ============================================================================
// Helpers (exported for use in input.rs and rendering)
// ============================================================================

/// Keep a selection index inside a list of `len` items
pub fn clamp_selection(selection: usize, len: usize) -> usize {
    selection.min(len.saturating_sub(1))
}

/// Move a selection through a grid of `GRID_COLUMNS` columns
pub fn move_in_grid(selection: usize, len: usize, direction: Direction) -> usize {
    if len == 0 {
        return 0;
    }
    let selection = clamp_selection(selection, len);
    let next = match direction {
        Direction::Left => selection.saturating_sub(1),
        Direction::Right => selection + 1,
        Direction::Up => selection.checked_sub(GRID_COLUMNS).unwrap_or(selection),
        Direction::Down => selection + GRID_COLUMNS,
    };
    if next < len {
        next
    } else if direction == Direction::Down && selection / GRID_COLUMNS < (len - 1) / GRID_COLUMNS {
        // Partial last row: land on its last card
        len - 1
    } else {
        selection
    }
}

/// Check if a character can be typed into a form field
pub fn can_add_field_char(field: FormField, current_len: usize, c: char) -> bool {
    if c.is_control() || current_len >= MAX_FIELD_LENGTH {
        return false;
    }
    match field {
        FormField::Reviews => c.is_ascii_digit(),
        FormField::Submit => false,
        _ => true,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -------------------------------------------------------------------------
    // Construction Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_uses_supplied_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config {
            cache_dir: Some(dir.path().to_path_buf()),
            request_timeout_secs: Some(7),
            ..Default::default()
        };

        let app = App::new(config.clone()).expect("app");

        assert_eq!(app.config, config);
        assert_eq!(app.collection.cache().store().dir(), &dir.path().to_path_buf());
        assert_eq!(app.state, AppState::Normal);
        assert!(app.collection.videos().is_empty());
    }

    // -------------------------------------------------------------------------
    // FormField Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_form_field_next() {
        assert_eq!(FormField::Title.next(), FormField::Price);
        assert_eq!(FormField::Reviews.next(), FormField::Submit);
        assert_eq!(FormField::Submit.next(), FormField::Title); // Wraps around
    }

    #[test]
    fn test_form_field_prev() {
        assert_eq!(FormField::Title.prev(), FormField::Submit); // Wraps around
        assert_eq!(FormField::Submit.prev(), FormField::Reviews);
        assert_eq!(FormField::Price.prev(), FormField::Title);
    }

    #[test]
    fn test_form_field_cycle_visits_every_input() {
        let mut field = FormField::Title;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(field);
            field = field.next();
        }
        assert_eq!(seen, FormField::INPUTS.to_vec());
        assert_eq!(field, FormField::Submit);
    }

    // -------------------------------------------------------------------------
    // Grid Navigation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_move_in_grid_horizontal() {
        assert_eq!(move_in_grid(0, 5, Direction::Right), 1);
        assert_eq!(move_in_grid(4, 5, Direction::Right), 4); // End of list
        assert_eq!(move_in_grid(0, 5, Direction::Left), 0);
        assert_eq!(move_in_grid(3, 5, Direction::Left), 2);
    }

    #[test]
    fn test_move_in_grid_vertical() {
        assert_eq!(move_in_grid(1, 7, Direction::Down), 4);
        assert_eq!(move_in_grid(4, 7, Direction::Down), 6); // Partial last row
        assert_eq!(move_in_grid(6, 7, Direction::Down), 6);
        assert_eq!(move_in_grid(4, 7, Direction::Up), 1);
        assert_eq!(move_in_grid(2, 7, Direction::Up), 2);
    }

    #[test]
    fn test_move_in_grid_empty_and_stale_selection() {
        assert_eq!(move_in_grid(3, 0, Direction::Down), 0);
        assert_eq!(move_in_grid(9, 2, Direction::Left), 0);
        assert_eq!(clamp_selection(9, 2), 1);
        assert_eq!(clamp_selection(0, 0), 0);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_field_char() {
        assert!(can_add_field_char(FormField::Title, 0, 'a'));
        assert!(can_add_field_char(FormField::Price, 3, ' '));
        assert!(!can_add_field_char(FormField::Title, MAX_FIELD_LENGTH, 'a'));
        assert!(!can_add_field_char(FormField::Title, 0, '\n'));
        assert!(!can_add_field_char(FormField::Submit, 0, 'a'));
    }

    #[test]
    fn test_reviews_field_accepts_digits_only() {
        assert!(can_add_field_char(FormField::Reviews, 0, '7'));
        assert!(!can_add_field_char(FormField::Reviews, 0, '-'));
        assert!(!can_add_field_char(FormField::Reviews, 0, 'x'));
    }
}
