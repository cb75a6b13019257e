//! Append-only diagram version history with a movable cursor.
//!
//! Pure data structure, no I/O: appending never triggers rendering and
//! navigation never mutates the version sequence. Reverting to an older
//! version only moves the cursor; newer versions are never truncated.

use serde::{Deserialize, Serialize};
use slate_services::RenderedArtifact;

use crate::error::HistoryError;

/// Navigation direction through the version history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

/// One historical artifact plus its creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramVersion {
    pub artifact: RenderedArtifact,
    /// Creation time (unix millis)
    pub created_at: i64,
}

/// Ordered, ever-growing sequence of diagram versions.
///
/// Invariants: `cursor < versions.len()` whenever non-empty, and the cursor
/// points at the latest version immediately after every append until the
/// caller navigates explicitly.
#[derive(Debug, Default)]
pub struct VersionHistory {
    versions: Vec<DiagramVersion>,
    cursor: usize,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new version and move the cursor to it. Always succeeds.
    pub fn append(&mut self, artifact: RenderedArtifact) -> usize {
        self.versions.push(DiagramVersion {
            artifact,
            created_at: chrono::Utc::now().timestamp_millis(),
        });
        self.cursor = self.versions.len() - 1;
        self.cursor
    }

    /// Move the cursor by `delta`, clamped to the valid range. A no-op at
    /// either boundary and on an empty history; never errors.
    pub fn move_cursor(&mut self, delta: isize) -> usize {
        if self.versions.is_empty() {
            return 0;
        }
        let last = self.versions.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
        self.cursor
    }

    /// Move the cursor one step in `direction`, clamped at the boundaries.
    pub fn step(&mut self, direction: Direction) -> usize {
        match direction {
            Direction::Previous => self.move_cursor(-1),
            Direction::Next => self.move_cursor(1),
        }
    }

    /// Point the cursor at `index` without touching the version sequence.
    pub fn set_cursor(&mut self, index: usize) -> Result<(), HistoryError> {
        if index >= self.versions.len() {
            return Err(HistoryError::IndexOutOfRange);
        }
        self.cursor = index;
        Ok(())
    }

    /// The artifact currently displayed, or `None` if no versions exist.
    pub fn current(&self) -> Option<&RenderedArtifact> {
        self.versions.get(self.cursor).map(|v| &v.artifact)
    }

    /// Cursor position. Meaningful only when the history is non-empty.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of versions recorded
    pub fn count(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// A specific version, if it exists
    pub fn version(&self, index: usize) -> Option<&DiagramVersion> {
        self.versions.get(index)
    }

    /// All versions, oldest first
    pub fn versions(&self) -> &[DiagramVersion] {
        &self.versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(tag: &str) -> RenderedArtifact {
        RenderedArtifact::new(format!("<svg>{tag}</svg>"), tag)
    }

    #[test]
    fn test_empty_history() {
        let history = VersionHistory::new();
        assert!(history.current().is_none());
        assert_eq!(history.count(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn test_append_moves_cursor_to_latest() {
        let mut history = VersionHistory::new();
        history.append(artifact("v1"));
        history.append(artifact("v2"));
        history.append(artifact("v3"));

        assert_eq!(history.count(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current().unwrap().description, "v3");
    }

    #[test]
    fn test_move_cursor_clamps_at_boundaries() {
        let mut history = VersionHistory::new();
        history.append(artifact("v1"));
        history.append(artifact("v2"));

        assert_eq!(history.step(Direction::Next), 1);
        assert_eq!(history.step(Direction::Previous), 0);
        assert_eq!(history.step(Direction::Previous), 0);
        assert_eq!(history.move_cursor(10), 1);
        assert_eq!(history.move_cursor(-10), 0);
    }

    #[test]
    fn test_move_cursor_on_empty_history_is_noop() {
        let mut history = VersionHistory::new();
        assert_eq!(history.move_cursor(-1), 0);
        assert_eq!(history.step(Direction::Next), 0);
        assert!(history.current().is_none());
    }

    #[test]
    fn test_set_cursor_bounds_checked() {
        let mut history = VersionHistory::new();
        history.append(artifact("v1"));
        history.append(artifact("v2"));

        assert!(history.set_cursor(0).is_ok());
        assert_eq!(history.current().unwrap().description, "v1");
        assert_eq!(history.set_cursor(2), Err(HistoryError::IndexOutOfRange));
        // Failed set leaves the cursor where it was.
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_revert_then_append_never_truncates() {
        let mut history = VersionHistory::new();
        history.append(artifact("v1"));
        history.append(artifact("v2"));
        history.append(artifact("v3"));

        history.set_cursor(0).unwrap();
        history.append(artifact("v4"));

        assert_eq!(history.count(), 4);
        assert_eq!(history.cursor(), 3);
        assert_eq!(history.version(1).unwrap().artifact.description, "v2");
    }

    #[test]
    fn test_cursor_always_in_bounds() {
        let mut history = VersionHistory::new();
        for i in 0..5 {
            history.append(artifact(&format!("v{i}")));
            assert!(history.cursor() < history.count());
        }
        for delta in [-3, 7, -100, 2] {
            history.move_cursor(delta);
            assert!(history.cursor() < history.count());
        }
    }
}
