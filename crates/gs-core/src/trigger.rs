//! Trigger Detector
//!
//! Scans transcript snapshots for the trigger keyword. The order text is
//! whatever follows the keyword's last occurrence, trimmed.
//!
//! The detector counts keyword occurrences it has already handled, so an
//! unchanged snapshot polled twice fires once. A snapshot with no
//! occurrence at all means a fresh conversation and resets the count.
//!
//! The chat reply streams in while the kiosk polls. A new occurrence only
//! fires once the text after it is non-empty and identical on two
//! consecutive polls.

use tracing::debug;

/// One detected trigger occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Text following the keyword's last occurrence, trimmed
    pub order_text: String,
    /// Keyword occurrences in the snapshot that fired
    pub occurrence: usize,
}

/// Keyword-triggered detector with duplicate suppression
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    keyword: String,
    handled: usize,
    pending: Option<Trigger>,
}

impl TriggerDetector {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            handled: 0,
            pending: None,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Occurrences already handled in the current conversation
    pub fn handled(&self) -> usize {
        self.handled
    }

    /// Whether a new occurrence is waiting for its text to stop changing
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop a half-seen occurrence
    ///
    /// The handled count stays: it resets on its own once the chat page
    /// shows no keyword.
    pub fn discard_pending(&mut self) {
        if self.pending.take().is_some() {
            debug!("Pending trigger discarded");
        }
    }

    /// Inspect a snapshot; `Some` only for an occurrence not yet handled
    /// whose order text matches the previous poll
    pub fn detect(&mut self, snapshot: &str) -> Option<Trigger> {
        if self.keyword.is_empty() {
            return None;
        }

        let occurrences = snapshot.matches(self.keyword.as_str()).count();

        if occurrences == 0 {
            if self.handled > 0 || self.pending.is_some() {
                debug!("Keyword gone from transcript, resetting detector");
            }
            self.handled = 0;
            self.pending = None;
            return None;
        }

        if occurrences <= self.handled {
            self.pending = None;
            return None;
        }

        let last = snapshot.rfind(self.keyword.as_str())?;
        let order_text = snapshot[last + self.keyword.len()..].trim();

        if order_text.is_empty() {
            debug!("Keyword found but order text not yet present");
            self.pending = None;
            return None;
        }

        let seen = Trigger {
            order_text: order_text.to_string(),
            occurrence: occurrences,
        };

        if self.pending.as_ref() != Some(&seen) {
            debug!("Order text still changing ({} chars)", seen.order_text.len());
            self.pending = Some(seen);
            return None;
        }

        self.pending = None;
        self.handled = occurrences;
        Some(seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYWORD: &str = "Gems Station";

    /// Poll until the detector fires, at most `polls` times
    fn settle(detector: &mut TriggerDetector, snapshot: &str, polls: usize) -> Option<Trigger> {
        (0..polls).find_map(|_| detector.detect(snapshot))
    }

    #[test]
    fn test_no_keyword_no_trigger() {
        let mut detector = TriggerDetector::new(KEYWORD);
        assert!(detector.detect("hello, what would you like today?").is_none());
        assert!(detector.detect("").is_none());
        assert_eq!(detector.handled(), 0);
        assert!(!detector.is_pending());
    }

    #[test]
    fn test_single_occurrence_extracts_following_text() {
        let mut detector = TriggerDetector::new(KEYWORD);
        let snapshot = "...hello Gems Station customer wants 2 Americano for Jiho...";

        assert!(detector.detect(snapshot).is_none());
        let trigger = detector.detect(snapshot).unwrap();

        assert_eq!(trigger.order_text, "customer wants 2 Americano for Jiho...");
        assert_eq!(trigger.occurrence, 1);
    }

    #[test]
    fn test_fires_on_complete_reply_not_partial_stream() {
        let mut detector = TriggerDetector::new(KEYWORD);

        assert!(detector.detect("hello Gems Station customer wa").is_none());
        assert!(detector.is_pending());
        assert!(
            detector
                .detect("hello Gems Station customer wants 2 Americano")
                .is_none()
        );

        let full = "hello Gems Station customer wants 2 Americano for Jiho";
        assert!(detector.detect(full).is_none());
        let trigger = detector.detect(full).unwrap();

        assert_eq!(trigger.order_text, "customer wants 2 Americano for Jiho");
        assert_eq!(detector.handled(), 1);
        assert!(!detector.is_pending());
    }

    #[test]
    fn test_unchanged_snapshot_does_not_refire() {
        let mut detector = TriggerDetector::new(KEYWORD);
        let snapshot = "hi Gems Station customer wants 2 Americano for Jiho";

        assert!(settle(&mut detector, snapshot, 2).is_some());
        assert!(settle(&mut detector, snapshot, 5).is_none());
    }

    #[test]
    fn test_growing_snapshot_without_new_keyword_does_not_refire() {
        let mut detector = TriggerDetector::new(KEYWORD);

        assert!(settle(&mut detector, "Gems Station order: latte", 2).is_some());
        assert!(
            settle(
                &mut detector,
                "Gems Station order: latte\nthanks, see you soon",
                5
            )
            .is_none()
        );
    }

    #[test]
    fn test_uses_last_occurrence() {
        let mut detector = TriggerDetector::new(KEYWORD);
        let trigger = settle(
            &mut detector,
            "Welcome to Gems Station! ... Gems Station  Negroni for 지수  ",
            2,
        )
        .unwrap();

        assert_eq!(trigger.order_text, "Negroni for 지수");
        assert_eq!(trigger.occurrence, 2);
    }

    #[test]
    fn test_second_occurrence_fires_again() {
        let mut detector = TriggerDetector::new(KEYWORD);

        assert!(settle(&mut detector, "Gems Station latte for Mina", 2).is_some());
        let second = settle(
            &mut detector,
            "Gems Station latte for Mina\nGems Station mocha for Joon",
            2,
        )
        .unwrap();
        assert_eq!(second.order_text, "mocha for Joon");
    }

    #[test]
    fn test_waits_while_order_text_is_empty() {
        let mut detector = TriggerDetector::new(KEYWORD);

        assert!(detector.detect("preparing at Gems Station").is_none());
        assert!(detector.detect("preparing at Gems Station").is_none());
        assert_eq!(detector.handled(), 0);
        assert!(!detector.is_pending());

        let trigger = settle(
            &mut detector,
            "preparing at Gems Station: Fuzzy Navel for Seoyeon",
            2,
        )
        .unwrap();
        assert_eq!(trigger.order_text, ": Fuzzy Navel for Seoyeon");
    }

    #[test]
    fn test_discard_pending_keeps_handled_count() {
        let mut detector = TriggerDetector::new(KEYWORD);

        assert!(settle(&mut detector, "Gems Station latte for Mina", 2).is_some());
        assert!(
            detector
                .detect("Gems Station latte for Mina\nGems Station mo")
                .is_none()
        );
        assert!(detector.is_pending());

        detector.discard_pending();
        assert!(!detector.is_pending());
        assert_eq!(detector.handled(), 1);
    }

    #[test]
    fn test_cleared_transcript_resets() {
        let mut detector = TriggerDetector::new(KEYWORD);

        assert!(settle(&mut detector, "Gems Station latte for Mina", 2).is_some());
        assert!(detector.detect("new chat").is_none());
        assert_eq!(detector.handled(), 0);
        assert!(settle(&mut detector, "Gems Station tea for Hajun", 2).is_some());
    }

    #[test]
    fn test_empty_keyword_never_fires() {
        let mut detector = TriggerDetector::new("");
        assert!(settle(&mut detector, "anything", 3).is_none());
    }
}
