use serde::Serialize;

/// What the caller receives. `courses` always holds at least one entry;
/// on any failure it carries a single placeholder message and both labels
/// are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationResult {
    pub courses: Vec<String>,
    pub study_method_label: Option<String>,
    pub engagement_label: Option<String>,
}

/// A row from the persistent label cache. Fields are `Option` so a NULL
/// or undecodable stored value surfaces as `None` instead of an error,
/// letting the engine demote the row to a cache miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedRecommendation {
    pub predicted_study_method: Option<i32>,
    pub engagement_level: Option<i32>,
}

impl CachedRecommendation {
    pub fn labels(&self) -> Option<(i32, i32)> {
        match (self.predicted_study_method, self.engagement_level) {
            (Some(study), Some(engagement)) => Some((study, engagement)),
            _ => None,
        }
    }
}
