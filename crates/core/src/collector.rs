use crate::domain::profile::{coerce_amount, FinancialProfile, ProfileField};

/// Holds the profile being edited and the busy flag that keeps at most one
/// analysis request outstanding.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    profile: FinancialProfile,
    in_flight: bool,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> &FinancialProfile {
        &self.profile
    }

    /// Applies one raw edit and returns the value actually stored.
    pub fn update(&mut self, field: ProfileField, raw: &str) -> f64 {
        self.profile.set(field, coerce_amount(raw));
        self.profile.get(field)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn can_submit(&self) -> bool {
        self.profile.has_income() && !self.in_flight
    }

    /// Marks a request as outstanding and hands back the profile it should use.
    /// `None` means submission is unavailable right now.
    pub fn begin_submit(&mut self) -> Option<FinancialProfile> {
        if !self.can_submit() {
            return None;
        }
        self.in_flight = true;
        Some(self.profile)
    }

    pub fn finish_submit(&mut self) {
        self.in_flight = false;
    }
}
