//! Thread deduplication within one fetch batch.

use std::collections::HashMap;

use log::debug;

use super::message::EligibleMessage;

/// Keeps only the most recent message per sender.
///
/// Older messages from the same sender in one batch are superseded status
/// updates on the same application thread. On equal timestamps the first
/// message seen wins. Output order follows the first appearance of each
/// sender, but callers must not rely on it.
pub fn dedupe_latest_per_sender(messages: Vec<EligibleMessage>) -> Vec<EligibleMessage> {
    let total = messages.len();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<EligibleMessage> = Vec::new();

    for msg in messages {
        match slots.get(&msg.sender_key()) {
            Some(&idx) => {
                if msg.received_at > kept[idx].received_at {
                    kept[idx] = msg;
                }
            }
            None => {
                slots.insert(msg.sender_key(), kept.len());
                kept.push(msg);
            }
        }
    }

    debug!("Deduplicated {} messages down to {}", total, kept.len());
    kept
}
