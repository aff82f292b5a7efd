use serde::{Deserialize, Serialize};

/// Configuration for the symbol search service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum concurrent document extractions during an index build
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_concurrent() -> usize {
    num_cpus::get()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl SearchConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent == 0 {
            return Err("Max concurrent must be > 0".to_string());
        }

        Ok(())
    }
}
