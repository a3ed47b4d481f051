//! Name-to-phone pairing by offset proximity
//!
//! A listing's name and its contact block are rendered close together, so
//! distance within the serialized page is a workable proxy for logical
//! association. The pairing is greedy and name-first: each name takes the
//! nearest still-available phone, without backtracking, so a later name can
//! lose its true match to an earlier one. Offsets are byte positions in the
//! snapshot.

use crate::records::BusinessRecord;
use tracing::debug;

/// Fills `number` on each record from the pool of extracted phones.
///
/// Each name is located case-insensitively in `raw_content`; the available
/// phone minimizing the offset distance is consumed if that distance stays
/// under `proximity_threshold`. Ties favor the earlier phone. Phones left
/// over afterwards go to the remaining phone-less records in input order.
pub fn assign_phones_by_proximity(
    records: &mut [BusinessRecord],
    phones: &[String],
    raw_content: &str,
    proximity_threshold: usize,
) {
    let lowered = raw_content.to_lowercase();
    let mut available: Vec<&str> = phones.iter().map(|p| p.as_str()).collect();

    for record in records.iter_mut() {
        let Some(name_offset) = lowered.find(&record.name.to_lowercase()) else {
            continue;
        };

        let mut best: Option<(usize, usize)> = None;
        for (i, phone) in available.iter().enumerate() {
            let Some(phone_offset) = raw_content.find(phone) else {
                continue;
            };
            let distance = name_offset.abs_diff(phone_offset);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }

        if let Some((i, distance)) = best {
            if distance < proximity_threshold {
                record.number = available.remove(i).to_string();
                debug!(
                    "paired '{}' with {} at distance {}",
                    record.name, record.number, distance
                );
            }
        }
    }

    // Unconsumed phones are handed out positionally, a best-effort fallback
    // for names the snapshot renders far from their contact block
    let mut leftover = available.into_iter();
    for record in records.iter_mut().filter(|r| r.number.is_empty()) {
        let Some(phone) = leftover.next() else {
            break;
        };
        record.number = phone.to_string();
        debug!("fallback phone {} for '{}'", record.number, record.name);
    }
}
