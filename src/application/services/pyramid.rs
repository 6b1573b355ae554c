//! Pyramid service
//!
//! Fetches recruiting trees, adapts them per screen and evaluates completed
//! levels. One fetch per call; evaluation only starts once the payload is
//! fully in memory.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::error::malformed;
use crate::application::{normalize, ApplicationError, ApplicationResult, IoResultExt, View};
use crate::domain::{
    evaluate_arena, CommissionLine, CommissionPlan, DomainError, LevelResult, MemberData,
    Money, PyramidResponse, RecruitArena, Session,
};
use crate::infrastructure::traits::{FileSystem, PyramidApi};

/// Everything a pyramid screen shows for one member.
#[derive(Debug)]
pub struct PyramidReport {
    pub view: View,
    pub user_id: Option<String>,
    pub arena: RecruitArena,
    pub result: LevelResult,
    pub max_level: u32,
    /// Present for [`View::Commissions`]
    pub commissions: Option<Vec<CommissionLine>>,
    pub earned: Option<Money>,
}

impl PyramidReport {
    /// Members in the pyramid, the member themselves excluded.
    pub fn members(&self) -> usize {
        self.arena.len()
    }
}

/// Service for fetching and evaluating pyramids.
pub struct PyramidService {
    api: Arc<dyn PyramidApi>,
    fs: Arc<dyn FileSystem>,
    max_level: u32,
}

impl PyramidService {
    pub fn new(api: Arc<dyn PyramidApi>, fs: Arc<dyn FileSystem>, max_level: u32) -> Self {
        Self { api, fs, max_level }
    }

    /// Check that `session` may open `view` for `user_id`.
    pub fn authorize(session: &Session, view: View, user_id: &str) -> ApplicationResult<()> {
        if view.requires_admin() && !session.is_admin() {
            return Err(DomainError::AdminRequired(view.to_string()).into());
        }
        session.authorize_member(user_id)?;
        Ok(())
    }

    /// Fetch the payload backing `view` for `user_id`.
    #[instrument(level = "debug", skip(self, session))]
    pub fn fetch(
        &self,
        view: View,
        user_id: &str,
        session: &Session,
    ) -> ApplicationResult<PyramidResponse> {
        Self::authorize(session, view, user_id)?;
        let response = self.api.fetch_pyramid(view.endpoint(), user_id, session)?;
        debug!(
            usuarios = response.usuarios.len(),
            hijos = response.hijos.len(),
            "pyramid fetched"
        );
        Ok(response)
    }

    /// Read a payload previously saved with [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot(&self, path: &Path) -> ApplicationResult<PyramidResponse> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("snapshot not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read snapshot", path)?;
        serde_json::from_str(&content).map_err(malformed("snapshot", path))
    }

    /// Payload as pretty JSON, the snapshot file format.
    pub fn to_json(response: &PyramidResponse) -> ApplicationResult<String> {
        serde_json::to_string_pretty(response).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize snapshot".into(),
            source: Box::new(e),
        })
    }

    pub fn save_snapshot(&self, path: &Path, response: &PyramidResponse) -> ApplicationResult<()> {
        let content = Self::to_json(response)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create snapshot directory", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write snapshot", path)?;
        info!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    /// Adapt `response` for `view` and evaluate it.
    ///
    /// Commission lines are only filled in when `plan` is given.
    #[instrument(level = "debug", skip(self, response, plan))]
    pub fn evaluate(
        &self,
        view: View,
        response: PyramidResponse,
        user_id: Option<&str>,
        plan: Option<&CommissionPlan>,
    ) -> PyramidReport {
        let children = normalize(view, response, user_id);
        let root = user_id.unwrap_or("(member)");
        let arena = RecruitArena::from_root_children(MemberData::new(root, root), &children);
        let result = evaluate_arena(&arena, self.max_level);

        info!(
            %view,
            members = arena.len(),
            completed = result.completed_levels,
            "pyramid evaluated"
        );

        PyramidReport {
            view,
            user_id: user_id.map(str::to_string),
            arena,
            commissions: plan.map(|p| p.breakdown(&result)),
            earned: plan.map(|p| p.earned(&result)),
            result,
            max_level: self.max_level,
        }
    }

    /// Fetch and evaluate, including the commission plan for [`View::Commissions`].
    #[instrument(level = "debug", skip(self, session))]
    pub fn report(
        &self,
        view: View,
        user_id: &str,
        session: &Session,
    ) -> ApplicationResult<PyramidReport> {
        let response = self.fetch(view, user_id, session)?;
        let plan = match view {
            View::Commissions => {
                let plan = CommissionPlan::new(self.api.fetch_commissions(session)?);
                if plan.is_empty() {
                    warn!("backend returned no commission plan, nothing can be earned");
                }
                Some(plan)
            }
            _ => None,
        };
        Ok(self.evaluate(view, response, Some(user_id), plan.as_ref()))
    }
}
