use super::domain::{Assignment, WorkSubmission};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Already-fetched API data for one staff member, as handed to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSnapshot {
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub submissions: Vec<WorkSubmission>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read work snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid work snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkSnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: WorkSnapshot = serde_json::from_reader(reader)?;
        tracing::debug!(
            assignments = snapshot.assignments.len(),
            submissions = snapshot.submissions.len(),
            "work snapshot loaded"
        );
        Ok(snapshot)
    }

    /// The flat submission list used as the resolver's fallback, `None` when empty.
    pub fn fallback_submissions(&self) -> Option<&[WorkSubmission]> {
        (!self.submissions.is_empty()).then_some(self.submissions.as_slice())
    }

    /// Every submission the snapshot knows about: the flat list plus records attached
    /// to assignments that the flat list does not already carry.
    pub fn all_submissions(&self) -> Vec<&WorkSubmission> {
        let mut all: Vec<&WorkSubmission> = self.submissions.iter().collect();
        for attached in self
            .assignments
            .iter()
            .flat_map(|assignment| assignment.work_submissions.iter())
        {
            if !self
                .submissions
                .iter()
                .any(|known| known.id.matches(&attached.id))
            {
                all.push(attached);
            }
        }
        all
    }
}
