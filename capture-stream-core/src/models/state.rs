use serde::Serialize;

/// Outcome marker for one asynchronous operation (acquisition or enumeration).
///
/// State transitions:
/// ```text
/// idle / fulfilled / rejected → pending → fulfilled / rejected
/// ```
/// `reset` returns to idle from any settled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Fulfilled | Self::Rejected)
    }

    /// Enter `Pending`. Returns `false` (and leaves the state alone) if a
    /// request is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        *self = Self::Pending;
        true
    }

    /// Settle a pending request. Settling from anything other than `Pending`
    /// is ignored so the state never skips `Pending`.
    pub fn settle(&mut self, ok: bool) -> bool {
        if !self.is_pending() {
            log::warn!("ignoring settle({ok}) on non-pending request state {self:?}");
            return false;
        }
        *self = if ok { Self::Fulfilled } else { Self::Rejected };
        true
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}

/// Derived lifecycle of the controller.
///
/// ```text
/// idle → acquiring → active → idle (stop, or track ended)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Idle,
    Acquiring,
    Active,
}

impl LifecycleState {
    pub fn derive(acquisition: RequestState, has_handle: bool, streaming: bool) -> Self {
        if acquisition.is_pending() {
            Self::Acquiring
        } else if has_handle && streaming {
            Self::Active
        } else {
            Self::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MuteState {
    pub audio: bool,
    pub video: bool,
}
