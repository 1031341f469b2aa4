#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Throttled publication of the live agent list to rendering consumers.

use std::time::Duration;

use dreamplaza_core::{AgentView, Event};
use tracing::trace;

/// Configuration parameters required to construct the publisher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    interval: Duration,
}

impl Config {
    /// Creates a configuration that refreshes at most once per `interval` of
    /// simulated time unless an agent dies.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}

/// Keeps the last published agent view and decides when to refresh it.
#[derive(Debug)]
pub struct Publisher {
    interval: Duration,
    since_refresh: Duration,
    view: AgentView,
    revision: u64,
}

impl Publisher {
    /// Creates a publisher that has not published anything yet.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval: config.interval,
            since_refresh: Duration::ZERO,
            view: AgentView::default(),
            revision: 0,
        }
    }

    /// Refreshes the published view when due, returning whether it changed.
    ///
    /// `capture` is only invoked for a refresh, which happens on the first
    /// call, whenever the accumulated simulated time reaches the interval, and
    /// immediately when `events` report an agent death.
    pub fn handle<F>(&mut self, events: &[Event], capture: F) -> bool
    where
        F: FnOnce() -> AgentView,
    {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.since_refresh = self.since_refresh.saturating_add(*dt);
            }
        }

        let first = self.revision == 0;
        let death = events.iter().any(Event::is_agent_death);
        if !first && !death && self.since_refresh < self.interval {
            return false;
        }

        self.view = capture();
        self.since_refresh = Duration::ZERO;
        self.revision = self.revision.saturating_add(1);
        trace!(
            revision = self.revision,
            agents = self.view.len(),
            death,
            "published agent view"
        );
        true
    }

    /// Most recently published agent view.
    #[must_use]
    pub fn view(&self) -> &AgentView {
        &self.view
    }

    /// Number of refreshes performed; zero before the first publication.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
