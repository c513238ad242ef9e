use crate::collector::InputCollector;
use crate::domain::analysis::Analysis;
use crate::domain::profile::ProfileField;
use crate::llm::error::LlmDiagnosticsError;
use crate::requester::AnalysisRequest;
use tracing::field::display;
use uuid::Uuid;

/// The only failure text users ever see.
pub const ANALYSIS_UNAVAILABLE: &str = "Failed to generate analysis. Please try again.";

/// Everything the display layer reads: the profile being edited, whether a
/// request is outstanding, and the outcome of the last one.
#[derive(Debug, Clone)]
pub struct Session {
    collector: InputCollector,
    market: String,
    request_id: Option<Uuid>,
    analysis: Option<Analysis>,
    error: Option<&'static str>,
}

impl Session {
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            collector: InputCollector::new(),
            market: market.into(),
            request_id: None,
            analysis: None,
            error: None,
        }
    }

    pub fn collector(&self) -> &InputCollector {
        &self.collector
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn update(&mut self, field: ProfileField, raw: &str) -> f64 {
        self.collector.update(field, raw)
    }

    pub fn can_submit(&self) -> bool {
        self.collector.can_submit()
    }

    pub fn is_busy(&self) -> bool {
        self.collector.is_busy()
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Id of the request in flight, or of the one whose outcome is shown.
    pub fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    /// Starts a request if one is allowed. The previous outcome is dropped so
    /// nothing stale is shown while the new request runs.
    pub fn begin(&mut self) -> Option<AnalysisRequest> {
        let profile = self.collector.begin_submit()?;
        self.analysis = None;
        self.error = None;
        let request = AnalysisRequest::new(profile, self.market.clone());
        self.request_id = Some(request.request_id);
        Some(request)
    }

    pub fn complete(&mut self, outcome: anyhow::Result<Analysis>) {
        self.collector.finish_submit();
        let request_id = self.request_id.map(display);
        match outcome {
            Ok(analysis) => {
                tracing::debug!(request_id, "analysis stored");
                self.analysis = Some(analysis);
                self.error = None;
            }
            Err(err) => {
                tracing::error!(request_id, error = %format!("{err:#}"), "analysis request failed");
                if let Some(diag) = err.downcast_ref::<LlmDiagnosticsError>() {
                    tracing::debug!(
                        request_id,
                        provider = %diag.provider,
                        stage = diag.stage,
                        raw_output = diag.raw_output.as_deref(),
                        "raw LLM output for failed analysis"
                    );
                }
                self.analysis = None;
                self.error = Some(ANALYSIS_UNAVAILABLE);
            }
        }
    }
}
