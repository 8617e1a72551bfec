//! Per-user state on top of a shared dataset.

use crate::dataset::Dataset;
use crate::errors::Result;
use crate::filter::Criteria;
use crate::output::Summary;
use crate::summary::{self, SummaryArgs};
use log::error;
use std::sync::Arc;

/// One user's criteria and the summary last computed for them.
///
/// The dataset is shared read-only; everything else belongs to the session.
pub struct Session {
    dataset: Arc<Dataset>,
    args: SummaryArgs,
    criteria: Criteria,
    summary: Option<Summary>,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>, args: SummaryArgs) -> Session {
        let criteria = Criteria::everything(&dataset);
        Session {
            dataset,
            args,
            criteria,
            summary: None,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn args(&self) -> &SummaryArgs {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut SummaryArgs {
        &mut self.args
    }

    /// The last summary that was computed successfully.
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Recompute for new criteria.
    ///
    /// On failure the previous criteria and summary stay in place.
    pub fn update(&mut self, criteria: Criteria) -> Result<&Summary> {
        match summary::calc(&self.args, &criteria, &self.dataset) {
            Ok(s) => {
                self.criteria = criteria;
                Ok(self.summary.insert(s))
            }
            Err(e) => {
                error!(target: "revsent", "{}: {e}", criteria.pretty());
                Err(e)
            }
        }
    }

    /// Recompute with the current criteria, e.g. after changing the arguments.
    pub fn refresh(&mut self) -> Result<&Summary> {
        self.update(self.criteria.clone())
    }
}
