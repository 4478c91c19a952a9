//! Simulated capture permission.
//!
//! Mirrors how hosts gate capture: a prompt resolves on the first stream
//! request, a denial fails every request, and device labels stay hidden
//! until some request has succeeded.

use capture_stream_core::models::error::StreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionPolicy {
    /// Granted on the first stream request.
    #[default]
    Prompt,
    /// Already granted; labels are visible before any request.
    Granted,
    /// Every stream request fails with `PermissionDenied`.
    Denied,
}

impl PermissionPolicy {
    /// Check a stream request, resolving a prompt to `Granted`.
    pub fn request(&mut self) -> Result<(), StreamError> {
        match self {
            Self::Denied => Err(StreamError::PermissionDenied),
            Self::Prompt => {
                log::debug!("sim permission prompt accepted");
                *self = Self::Granted;
                Ok(())
            }
            Self::Granted => Ok(()),
        }
    }

    pub fn labels_visible(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_resolves_to_granted() {
        let mut policy = PermissionPolicy::Prompt;
        assert!(!policy.labels_visible());
        assert!(policy.request().is_ok());
        assert_eq!(policy, PermissionPolicy::Granted);
        assert!(policy.labels_visible());
    }

    #[test]
    fn denied_stays_denied() {
        let mut policy = PermissionPolicy::Denied;
        assert_eq!(policy.request(), Err(StreamError::PermissionDenied));
        assert_eq!(policy.request(), Err(StreamError::PermissionDenied));
        assert!(!policy.labels_visible());
    }
}
