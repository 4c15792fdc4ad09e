//! Question Bank: static categorized pools plus uniform sampling.
//!
//! Category keys are fixed when the bank is built. Unknown categories fall back
//! to `DEFAULT_CATEGORY` so a typo in a domain name still yields a quiz.

pub mod pools;

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::question::{BehavioralPrompt, Question};

pub const DEFAULT_CATEGORY: &str = "tech";

/// Keys of the fixed assessment stages; every other key is a domain.
const FIXED_KEYS: &[&str] = &["tech", "apt"];

#[derive(Debug, Clone)]
pub struct QuestionBank {
    pools: BTreeMap<String, Vec<Question>>,
    behavioral: Vec<BehavioralPrompt>,
}

impl QuestionBank {
    pub fn new(pools: BTreeMap<String, Vec<Question>>, behavioral: Vec<BehavioralPrompt>) -> Self {
        Self { pools, behavioral }
    }

    /// Builds the bank from the compiled-in pools, validating every question.
    pub fn builtin() -> Result<Self, AppError> {
        let mut by_key = BTreeMap::new();
        for (key, raw) in pools::CATEGORIES {
            let questions = raw
                .iter()
                .map(|(prompt, options, correct)| {
                    Question::new(
                        *prompt,
                        options.iter().map(|o| o.to_string()).collect(),
                        *correct,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            by_key.insert(key.to_string(), questions);
        }

        let behavioral = pools::HR
            .iter()
            .map(|(prompt, keywords)| {
                BehavioralPrompt::new(*prompt, keywords.iter().map(|k| k.to_string()).collect())
            })
            .collect();

        Ok(Self::new(by_key, behavioral))
    }

    /// Random subset of `min(count, pool size)` distinct questions in random order.
    pub fn sample(&self, category: &str, count: usize) -> Vec<Question> {
        self.sample_with(category, count, &mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        category: &str,
        count: usize,
        rng: &mut R,
    ) -> Vec<Question> {
        let pool = match self.pools.get(category) {
            Some(pool) => pool,
            None => {
                warn!("Unknown category '{category}', falling back to '{DEFAULT_CATEGORY}'");
                match self.pools.get(DEFAULT_CATEGORY) {
                    Some(pool) => pool,
                    None => return Vec::new(),
                }
            }
        };

        let mut shuffled = pool.clone();
        let (picked, _) = shuffled.partial_shuffle(rng, count.min(pool.len()));
        debug!("Sampled {} of {} from '{category}'", picked.len(), pool.len());
        picked.to_vec()
    }

    #[cfg(test)]
    pub fn pool_size(&self, category: &str) -> usize {
        self.pools.get(category).map_or(0, Vec::len)
    }

    /// Specializations offered for domain interviews.
    pub fn domains(&self) -> Vec<&str> {
        self.pools
            .keys()
            .map(String::as_str)
            .filter(|k| !FIXED_KEYS.contains(k))
            .collect()
    }

    /// HR prompts the common interview draws on, for preparation.
    pub fn behavioral(&self) -> &[BehavioralPrompt] {
        &self.behavioral
    }
}
