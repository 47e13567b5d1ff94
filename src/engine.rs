use tracing::{debug, error, info, warn};

use crate::cache::RecommendationCache;
use crate::catalog;
use crate::config::Config;
use crate::features::FeatureTable;
use crate::model::{BoostedTreesModel, Classifier};
use crate::models::RecommendationResult;

pub const INVALID_STUDENT_ID_MESSAGE: &str = "Invalid student ID provided.";
pub const COULD_NOT_GENERATE_MESSAGE: &str =
    "Could not generate recommendations for this student.";
pub const NO_COMBINATION_MESSAGE: &str =
    "No specific recommendations found for this combination.";

/// Produces course recommendations with a cache-first strategy: cached label
/// pairs are reused verbatim; on a miss the engine predicts from the feature
/// table and writes the labels back.
///
/// Artifact loading degrades rather than fails: an engine missing its model
/// or feature table still serves cache hits, and every miss collapses to a
/// placeholder result. No error ever propagates out of
/// [`get_recommendations`](Self::get_recommendations).
pub struct RecommendationEngine<C> {
    cache: C,
    classifier: Option<Box<dyn Classifier>>,
    features: Option<FeatureTable>,
}

impl<C: RecommendationCache> RecommendationEngine<C> {
    pub fn new(cache: C, config: &Config) -> Self {
        let classifier = match BoostedTreesModel::from_path(&config.model_path) {
            Ok(model) => {
                info!(path = %config.model_path.display(), "loaded prediction model");
                Some(Box::new(model) as Box<dyn Classifier>)
            }
            Err(err) => {
                error!(
                    path = %config.model_path.display(),
                    error = %err,
                    "failed to load prediction model; prediction disabled"
                );
                None
            }
        };

        let features = match FeatureTable::from_csv(&config.feature_data_path) {
            Ok(table) => {
                if table.is_empty() {
                    warn!(
                        path = %config.feature_data_path.display(),
                        "feature data loaded but holds no students"
                    );
                }
                info!(
                    path = %config.feature_data_path.display(),
                    students = table.len(),
                    "loaded feature data"
                );
                Some(table)
            }
            Err(err) => {
                error!(
                    path = %config.feature_data_path.display(),
                    error = %err,
                    "failed to load feature data; prediction disabled"
                );
                None
            }
        };

        Self::from_parts(cache, classifier, features)
    }

    pub fn from_parts(
        cache: C,
        classifier: Option<Box<dyn Classifier>>,
        features: Option<FeatureTable>,
    ) -> Self {
        Self {
            cache,
            classifier,
            features,
        }
    }

    /// Every student id in the loaded feature table, ascending. Empty when
    /// the table failed to load.
    pub fn feature_student_ids(&self) -> Vec<i64> {
        self.features
            .as_ref()
            .map(FeatureTable::student_ids)
            .unwrap_or_default()
    }

    /// The entire public surface: cache lookup, on-miss prediction, and the
    /// label/catalog mapping. `student_id` is accepted as text because it
    /// arrives from user input; anything non-integer short-circuits before
    /// any cache or model access.
    pub async fn get_recommendations(&self, student_id: &str) -> RecommendationResult {
        let Ok(student_id) = student_id.trim().parse::<i64>() else {
            error!(raw = student_id, "invalid student id; must be an integer");
            return RecommendationResult {
                courses: vec![INVALID_STUDENT_ID_MESSAGE.to_string()],
                study_method_label: None,
                engagement_label: None,
            };
        };

        let mut labels = self.cached_labels(student_id).await;
        if labels.is_none() {
            labels = self.predict_and_cache(student_id).await;
        }

        let Some((study_method_id, engagement_level_id)) = labels else {
            return RecommendationResult {
                courses: vec![COULD_NOT_GENERATE_MESSAGE.to_string()],
                study_method_label: None,
                engagement_label: None,
            };
        };

        let courses: Vec<String> = catalog::courses_for(study_method_id, engagement_level_id)
            .map(|courses| courses.iter().map(|c| c.to_string()).collect())
            .unwrap_or_else(|| vec![NO_COMBINATION_MESSAGE.to_string()]);

        let result = RecommendationResult {
            courses,
            study_method_label: Some(catalog::study_method_label_or_unknown(study_method_id)),
            engagement_label: Some(catalog::engagement_label_or_unknown(engagement_level_id)),
        };
        info!(
            student_id,
            study_method = result.study_method_label.as_deref().unwrap_or_default(),
            engagement = result.engagement_label.as_deref().unwrap_or_default(),
            "recommendations ready"
        );
        result
    }

    /// Cache lookup. Fetch errors and corrupt rows both demote to a miss so
    /// the prediction path gets a chance to repair the entry.
    async fn cached_labels(&self, student_id: i64) -> Option<(i32, i32)> {
        let row = match self.cache.fetch(student_id).await {
            Ok(row) => row,
            Err(err) => {
                warn!(student_id, error = %err, "cache lookup failed; treating as miss");
                return None;
            }
        };

        match row {
            Some(row) => match row.labels() {
                Some(labels) => {
                    info!(student_id, "cache hit");
                    Some(labels)
                }
                None => {
                    warn!(student_id, "cached row is corrupt; treating as miss");
                    None
                }
            },
            None => {
                info!(student_id, "cache miss");
                None
            }
        }
    }

    /// The miss path: feature lookup, inference, write-back. The cache write
    /// is best-effort; a failure there only costs future calls their hit.
    async fn predict_and_cache(&self, student_id: i64) -> Option<(i32, i32)> {
        let (classifier, features) = match (&self.classifier, &self.features) {
            (Some(classifier), Some(features)) => (classifier, features),
            _ => {
                warn!(student_id, "model or feature data not loaded; cannot predict");
                return None;
            }
        };

        let Some(row) = features.get(student_id) else {
            warn!(student_id, "student not found in feature data");
            return None;
        };

        let engagement_level_id = match row.engagement_classification() {
            Ok(id) => id,
            Err(err) => {
                warn!(student_id, error = %err, "aborting prediction");
                return None;
            }
        };

        let input = match row.model_input() {
            Ok(input) => input,
            Err(err) => {
                warn!(student_id, error = %err, "aborting prediction");
                return None;
            }
        };

        if input.is_empty() {
            warn!(student_id, "feature row has no usable predictor values");
        }
        debug!(student_id, features = input.len(), "running model prediction");

        let study_method_id = match classifier.predict_label(&input) {
            Ok(label) => label,
            Err(err) => {
                error!(student_id, error = %err, "model prediction failed");
                return None;
            }
        };

        if let Err(err) = self
            .cache
            .store(student_id, study_method_id, engagement_level_id)
            .await
        {
            warn!(student_id, error = %err, "failed to cache prediction");
        }

        Some((study_method_id, engagement_level_id))
    }
}
