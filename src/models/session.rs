//! Tracking session records.
//!
//! A session is one contiguous start-to-stop interval. It is independent of the
//! cumulative step counter: deleting one never touches the counters.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub start: DateTime<Utc>,
    /// `None` while the session is still running.
    pub end: Option<DateTime<Utc>>,
}

impl Session {
    pub fn begin(start: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start,
            end: None,
        }
    }

    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }

    /// Closes the session. Returns `false` if it was already closed, in which
    /// case the recorded end is left untouched.
    pub fn close(&mut self, end: DateTime<Utc>) -> bool {
        if self.end.is_some() {
            return false;
        }
        self.end = Some(end);
        true
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.end.unwrap_or(now) - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_first_write_wins() {
        let start = Utc::now();
        let mut session = Session::begin(start);
        assert!(session.is_ongoing());

        let first_end = start + Duration::seconds(30);
        assert!(session.close(first_end));
        assert!(!session.close(first_end + Duration::seconds(10)));
        assert_eq!(session.end, Some(first_end));
        assert_eq!(session.elapsed(Utc::now()), Duration::seconds(30));
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let now = Utc::now();
        assert_ne!(Session::begin(now).id, Session::begin(now).id);
    }
}
