/// Knobs shared by every ranking algorithm.
#[derive(Debug, Clone)]
pub struct RankerSettings {
    /// Rating-point spread of the logistic curve (Elo convention).
    pub scale: f64,
    /// Rating assigned to a model before any match evidence.
    pub default_score: f64,
    /// Resampling rounds for confidence intervals.
    pub bootstrap_samples: usize,
}

impl Default for RankerSettings {
    fn default() -> Self {
        Self {
            scale: 400.0,
            default_score: 1000.0,
            bootstrap_samples: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EloSettings {
    /// Base step size; damped adaptively per match.
    pub k_factor: f64,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self { k_factor: 40.0 }
    }
}

#[derive(Debug, Clone)]
pub struct MleSettings {
    /// Cap on logistic-regression solver iterations; the best iterate is
    /// kept if the fit has not converged by then.
    pub max_iterations: usize,
}

impl Default for MleSettings {
    fn default() -> Self {
        Self {
            max_iterations: 300,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub ranker: RankerSettings,
    pub elo: EloSettings,
    pub mle: MleSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

// Passed explicitly (dependency injection) rather than held in a global.
