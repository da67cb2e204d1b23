//! Scripted revision history for ingestion tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::project::domain::{ProjectId, ProjectRef};
use crate::tracker::ports::{RevisionSource, RevisionSourceError, RevisionSourceResult};
use crate::version::domain::{Revision, RevisionId};

/// Revision source backed by in-process histories.
///
/// Revisions are pushed oldest first and served newest first. Polls can be
/// made to fail or to hang until cancelled.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRevisionSource {
    state: Arc<RwLock<InMemoryRevisionState>>,
}

#[derive(Debug, Default)]
struct InMemoryRevisionState {
    histories: HashMap<ProjectId, Vec<Revision>>,
    changed_files: HashMap<(ProjectId, RevisionId), Vec<String>>,
    failing_changed_files: HashSet<(ProjectId, RevisionId)>,
    poll_failure: Option<RevisionSourceError>,
    stall_polls: bool,
    polls: usize,
    last_limit: Option<u32>,
}

impl InMemoryRevisionSource {
    /// Creates a source with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> RevisionSourceResult<RwLockReadGuard<'_, InMemoryRevisionState>> {
        self.state
            .read()
            .map_err(|err| RevisionSourceError::transport(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> RevisionSourceResult<RwLockWriteGuard<'_, InMemoryRevisionState>> {
        self.state
            .write()
            .map_err(|err| RevisionSourceError::transport(std::io::Error::other(err.to_string())))
    }

    /// Appends `revision` as the new branch head.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn push(&self, project: &ProjectId, revision: Revision) -> RevisionSourceResult<()> {
        self.write_state()?
            .histories
            .entry(project.clone())
            .or_default()
            .push(revision);
        Ok(())
    }

    /// Sets the files changed by a revision.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_changed_files<I, S>(
        &self,
        project: &ProjectId,
        revision: &RevisionId,
        files: I,
    ) -> RevisionSourceResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write_state()?.changed_files.insert(
            (project.clone(), revision.clone()),
            files.into_iter().map(Into::into).collect(),
        );
        Ok(())
    }

    /// Makes changed-file listing fail for a revision.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn fail_changed_files(
        &self,
        project: &ProjectId,
        revision: &RevisionId,
    ) -> RevisionSourceResult<()> {
        self.write_state()?
            .failing_changed_files
            .insert((project.clone(), revision.clone()));
        Ok(())
    }

    /// Makes every poll fail with `error`, or succeed again when `None`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_poll_failure(&self, error: Option<RevisionSourceError>) -> RevisionSourceResult<()> {
        self.write_state()?.poll_failure = error;
        Ok(())
    }

    /// Makes every poll wait forever.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn stall_polls(&self, stall: bool) -> RevisionSourceResult<()> {
        self.write_state()?.stall_polls = stall;
        Ok(())
    }

    /// Returns how many polls were made.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn poll_count(&self) -> RevisionSourceResult<usize> {
        Ok(self.read_state()?.polls)
    }

    /// Returns the limit passed to the latest cold-start poll.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn last_recent_limit(&self) -> RevisionSourceResult<Option<u32>> {
        Ok(self.read_state()?.last_limit)
    }

    /// Records a poll and returns the project's history newest first.
    fn begin_poll(
        &self,
        project: &ProjectId,
        limit: Option<u32>,
    ) -> RevisionSourceResult<(bool, Vec<Revision>)> {
        let mut state = self.write_state()?;
        state.polls = state.polls.saturating_add(1);
        if limit.is_some() {
            state.last_limit = limit;
        }
        if let Some(error) = &state.poll_failure {
            return Err(error.clone());
        }
        let newest_first = state
            .histories
            .get(project)
            .map(|history| history.iter().rev().cloned().collect())
            .unwrap_or_default();
        Ok((state.stall_polls, newest_first))
    }
}

fn to_len(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

#[async_trait]
impl RevisionSource for InMemoryRevisionSource {
    async fn recent_revisions(
        &self,
        project: &ProjectRef,
        limit: u32,
    ) -> RevisionSourceResult<Vec<Revision>> {
        let (stall, newest_first) = self.begin_poll(&project.identifier, Some(limit))?;
        if stall {
            std::future::pending::<()>().await;
        }
        Ok(newest_first.into_iter().take(to_len(limit)).collect())
    }

    async fn revisions_since(
        &self,
        project: &ProjectRef,
        since: &RevisionId,
        max_depth: u32,
    ) -> RevisionSourceResult<Vec<Revision>> {
        let (stall, newest_first) = self.begin_poll(&project.identifier, None)?;
        if stall {
            std::future::pending::<()>().await;
        }
        Ok(newest_first
            .into_iter()
            .take(to_len(max_depth))
            .take_while(|revision| revision.id() != since)
            .collect())
    }

    async fn changed_files(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
    ) -> RevisionSourceResult<Vec<String>> {
        let state = self.read_state()?;
        let key = (project.identifier.clone(), revision.clone());
        let known = state
            .histories
            .get(&project.identifier)
            .is_some_and(|history| history.iter().any(|candidate| candidate.id() == revision));
        if !known {
            return Err(RevisionSourceError::UnknownRevision(revision.clone()));
        }
        if state.failing_changed_files.contains(&key) {
            return Err(RevisionSourceError::transport(std::io::Error::other(
                "changed-file listing unavailable",
            )));
        }
        Ok(state.changed_files.get(&key).cloned().unwrap_or_default())
    }
}
