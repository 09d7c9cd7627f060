//! Transient user-facing notices that dismiss themselves after a fixed interval.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub kind: NoticeKind,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    next_id: u64,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    #[must_use]
    pub fn new(ttl_secs: u32) -> Self {
        Self {
            ttl: Duration::seconds(i64::from(ttl_secs)),
            next_id: 1,
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>, kind: NoticeKind, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            message: message.into(),
            kind,
            expires_at: now + self.ttl,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        self.push(message, NoticeKind::Success, now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        self.push(message, NoticeKind::Error, now)
    }

    /// Drop notices whose display interval has elapsed.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.notices.retain(|notice| notice.expires_at > now);
    }

    pub fn dismiss(&mut self, id: u64) {
        self.notices.retain(|notice| notice.id != id);
    }

    #[must_use]
    pub fn active(&self) -> &[Notice] {
        &self.notices
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::time::fixed_now;

    #[test]
    fn notices_expire_after_ttl() {
        let now = fixed_now();
        let mut board = NoticeBoard::new(3);
        board.error("Failed to submit test", now);
        board.success("Submitted", now + Duration::seconds(2));

        board.prune(now + Duration::seconds(2));
        assert_eq!(board.active().len(), 2);

        board.prune(now + Duration::seconds(3));
        assert_eq!(board.active().len(), 1);
        assert_eq!(board.latest().unwrap().kind, NoticeKind::Success);
    }

    #[test]
    fn dismiss_removes_by_id() {
        let mut board = NoticeBoard::new(3);
        let first = board.error("a", fixed_now());
        board.error("b", fixed_now());
        board.dismiss(first);
        assert_eq!(board.active().len(), 1);
        assert_eq!(board.active()[0].message, "b");
    }
}
