//! Per-collection sync state machine.
//!
//! [`SyncMachine::apply`] is a pure transition function: it updates the
//! state and returns the effects the caller must carry out. Nothing here
//! touches records, storage or the network.

use serde::Serialize;

/// Where the records currently shown came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cache,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "source")]
pub enum SyncState {
    /// Nothing loaded yet.
    Empty,
    Loaded(Source),
    /// A remote fetch is outstanding.
    Refreshing,
    /// The last refresh failed; whatever was shown before is still shown.
    Degraded,
}

/// Inputs to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    CacheLoaded { count: usize },
    RefreshStarted { user_initiated: bool },
    RemoteSucceeded,
    RemoteFailed,
    BannerAcknowledged,
}

/// Work the caller performs after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Show the current in-memory collection.
    Render,
    /// Write the current in-memory collection to the local store.
    Persist,
    ShowBanner,
    HideBanner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMachine {
    state: SyncState,
    banner_visible: bool,
    acknowledged: bool,
}

impl Default for SyncMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SyncState::Empty,
            banner_visible: false,
            acknowledged: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    /// Whether the "connection problem" banner is up.
    #[must_use]
    pub const fn banner_visible(&self) -> bool {
        self.banner_visible
    }

    /// Whether the last refresh failed.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self.state, SyncState::Degraded)
    }

    /// Advance the machine by one event.
    pub fn apply(&mut self, event: SyncEvent) -> Vec<Effect> {
        match event {
            SyncEvent::CacheLoaded { count } => {
                if count > 0 && self.state == SyncState::Empty {
                    self.state = SyncState::Loaded(Source::Cache);
                    vec![Effect::Render]
                } else {
                    Vec::new()
                }
            }

            SyncEvent::RefreshStarted { user_initiated } => {
                self.state = SyncState::Refreshing;
                if user_initiated {
                    self.acknowledged = false;
                }
                Vec::new()
            }

            SyncEvent::RemoteSucceeded => {
                self.state = SyncState::Loaded(Source::Remote);
                self.acknowledged = false;
                let mut effects = vec![Effect::Render, Effect::Persist];
                if self.banner_visible {
                    self.banner_visible = false;
                    effects.push(Effect::HideBanner);
                }
                effects
            }

            SyncEvent::RemoteFailed => {
                self.state = SyncState::Degraded;
                if self.acknowledged || self.banner_visible {
                    Vec::new()
                } else {
                    self.banner_visible = true;
                    vec![Effect::ShowBanner]
                }
            }

            SyncEvent::BannerAcknowledged => {
                self.acknowledged = true;
                if self.banner_visible {
                    self.banner_visible = false;
                    vec![Effect::HideBanner]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_then_remote() {
        let mut m = SyncMachine::new();

        assert_eq!(m.apply(SyncEvent::CacheLoaded { count: 3 }), vec![Effect::Render]);
        assert_eq!(m.state(), SyncState::Loaded(Source::Cache));

        assert!(m.apply(SyncEvent::RefreshStarted { user_initiated: false }).is_empty());
        assert_eq!(m.state(), SyncState::Refreshing);

        assert_eq!(
            m.apply(SyncEvent::RemoteSucceeded),
            vec![Effect::Render, Effect::Persist]
        );
        assert_eq!(m.state(), SyncState::Loaded(Source::Remote));
    }

    #[test]
    fn test_empty_cache_renders_nothing() {
        let mut m = SyncMachine::new();
        assert!(m.apply(SyncEvent::CacheLoaded { count: 0 }).is_empty());
        assert_eq!(m.state(), SyncState::Empty);
    }

    #[test]
    fn test_failure_shows_banner_once() {
        let mut m = SyncMachine::new();
        m.apply(SyncEvent::RefreshStarted { user_initiated: false });

        assert_eq!(m.apply(SyncEvent::RemoteFailed), vec![Effect::ShowBanner]);
        assert!(m.is_degraded());
        assert!(m.banner_visible());

        m.apply(SyncEvent::RefreshStarted { user_initiated: false });
        assert!(m.apply(SyncEvent::RemoteFailed).is_empty());
    }

    #[test]
    fn test_acknowledged_banner_stays_hidden_until_user_refresh() {
        let mut m = SyncMachine::new();
        m.apply(SyncEvent::RemoteFailed);
        assert_eq!(m.apply(SyncEvent::BannerAcknowledged), vec![Effect::HideBanner]);

        // Activation-driven refresh keeps the acknowledgement.
        m.apply(SyncEvent::RefreshStarted { user_initiated: false });
        assert!(m.apply(SyncEvent::RemoteFailed).is_empty());
        assert!(!m.banner_visible());

        // A pull-to-refresh clears it.
        m.apply(SyncEvent::RefreshStarted { user_initiated: true });
        assert_eq!(m.apply(SyncEvent::RemoteFailed), vec![Effect::ShowBanner]);
    }

    #[test]
    fn test_success_hides_banner_and_resets_acknowledgement() {
        let mut m = SyncMachine::new();
        m.apply(SyncEvent::RemoteFailed);

        assert_eq!(
            m.apply(SyncEvent::RemoteSucceeded),
            vec![Effect::Render, Effect::Persist, Effect::HideBanner]
        );
        assert!(!m.banner_visible());

        m.apply(SyncEvent::BannerAcknowledged);
        m.apply(SyncEvent::RemoteSucceeded);
        assert_eq!(m.apply(SyncEvent::RemoteFailed), vec![Effect::ShowBanner]);
    }
}
