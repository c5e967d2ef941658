//! CLI-specific progress handling for onedrive-dl
//!
//! Provides the chunk-counting progress bar shown while a file streams to disk.

use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Creates a progress bar counting written chunks.
///
/// The bar starts hidden; it is shown once the first chunk arrives.
pub fn create_progress_bar(total_chunks: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total_chunks), ProgressDrawTarget::hidden());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} chunks ({percent}%) ETA: {eta}")
            .expect("Failed to create progress style")
            .progress_chars("#>-")
    );
    pb
}

/// Progress manager for a single download
pub struct ProgressManager {
    pub pb: ProgressBar,
    shown: AtomicBool,
}

impl ProgressManager {
    /// Create a new progress manager; nothing is drawn until the first update
    pub fn new(total_chunks: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_chunks);
        pb.set_message(message.to_string());

        Self {
            pb,
            shown: AtomicBool::new(false),
        }
    }

    /// Whether the bar has been attached to stderr
    pub fn is_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }

    /// Move the bar to `done` chunks, resizing it if the expected total changed
    pub fn update(&self, done: u64, total: u64) {
        if !self.shown.swap(true, Ordering::SeqCst) {
            self.pb.set_draw_target(ProgressDrawTarget::stderr());
        }
        if self.pb.length().unwrap_or(0) != total {
            self.pb.set_length(total);
        }
        self.pb.set_position(done);
    }

    /// Close the bar, leaving its final state on screen
    pub fn finish(&self) {
        self.pb.finish();
    }

    /// Close the bar and remove it from the terminal
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_progress_bar_template() {
        let pb = create_progress_bar(16);

        assert_eq!(pb.length().unwrap(), 16);
        assert!(pb.is_hidden());

        // A valid template lets the bar advance and finish without panicking
        pb.set_position(4);
        pb.finish();
    }

    #[test]
    fn test_progress_manager_hidden_until_first_update() {
        let manager = ProgressManager::new(0, "downloading file...");
        assert!(!manager.is_shown());
        assert!(manager.pb.is_hidden());

        manager.update(1, 2);
        assert!(manager.is_shown());
    }

    #[test]
    fn test_progress_manager_update_resizes() {
        let manager = ProgressManager::new(0, "downloading file...");
        assert_eq!(manager.pb.length().unwrap(), 0);

        manager.update(1, 2);
        assert_eq!(manager.pb.length().unwrap(), 2);
        assert_eq!(manager.pb.position(), 1);

        // More chunks than the declared size predicted
        manager.update(3, 2);
        assert_eq!(manager.pb.position(), 3);
        manager.finish();
        assert!(manager.pb.is_finished());
    }

    #[test]
    fn test_progress_manager_clear_without_updates() {
        let manager = ProgressManager::new(0, "downloading file...");
        manager.clear();
        assert!(manager.pb.is_finished());
        assert!(!manager.is_shown());
    }
}
