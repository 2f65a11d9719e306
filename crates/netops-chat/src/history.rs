//! History policies
//!
//! A policy decides which suffix of a session's turns is sent to the model.
//! The stored history is never modified; only the window changes.

use netops_core::{estimate_tokens, Turn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Send every turn
    #[default]
    Unbounded,
    /// Drop the oldest turns until the estimate fits `max_tokens`.
    ///
    /// The system framing counts against the budget and is always sent. When
    /// even the newest exchange does not fit, the newest non-observation turn
    /// and everything after it are sent anyway.
    TokenBudget { max_tokens: usize },
}

impl HistoryPolicy {
    pub fn from_ceiling(ceiling: Option<usize>) -> Self {
        match ceiling {
            Some(max_tokens) => HistoryPolicy::TokenBudget { max_tokens },
            None => HistoryPolicy::Unbounded,
        }
    }

    /// Index of the first turn to send
    pub fn window_start(&self, system: Option<&str>, turns: &[Turn]) -> usize {
        let max_tokens = match self {
            HistoryPolicy::Unbounded => return 0,
            HistoryPolicy::TokenBudget { max_tokens } => *max_tokens,
        };

        let mut used = system.map(estimate_tokens).unwrap_or(0);
        let mut start = turns.len();
        while start > 0 {
            let cost = turns[start - 1].estimated_tokens();
            if used + cost > max_tokens {
                break;
            }
            used += cost;
            start -= 1;
        }

        // An observation whose call was dropped must not lead the window
        while start < turns.len() && turns[start].is_observation() {
            start += 1;
        }

        if start == turns.len() {
            start = turns
                .iter()
                .rposition(|t| !t.is_observation())
                .unwrap_or(turns.len());
        }
        start
    }

    pub fn window<'a>(&self, system: Option<&str>, turns: &'a [Turn]) -> &'a [Turn] {
        &turns[self.window_start(system, turns)..]
    }
}
