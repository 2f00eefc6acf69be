use std::collections::{HashMap, HashSet};

use crate::model::AttendanceRecord;

/// Replaces the attendance records for `target_date` and the affected
/// students with the incoming batch, leaving every other record untouched
/// and in its original relative order.
///
/// Matching is strictly by `(date, studentId)`, never by array position.
/// Re-submitting the same roster for the same day therefore replaces the
/// day's records instead of piling up duplicates. The batch itself is
/// treated as a mapping from key to record: if the same key appears twice,
/// the last occurrence wins.
///
/// A student in `affected_student_ids` with no entry in the batch loses
/// their record for `target_date`; their records for other dates stay.
pub fn reconcile(
    existing: &[AttendanceRecord],
    batch: &[AttendanceRecord],
    affected_student_ids: &HashSet<String>,
    target_date: &str,
) -> Vec<AttendanceRecord> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut incoming: Vec<AttendanceRecord> = Vec::new();
    for rec in batch {
        let key = (rec.date.clone(), rec.student_id.clone());
        match index.get(&key) {
            Some(&i) => incoming[i] = rec.clone(),
            None => {
                index.insert(key, incoming.len());
                incoming.push(rec.clone());
            }
        }
    }

    let mut next: Vec<AttendanceRecord> = existing
        .iter()
        .filter(|r| !(r.date == target_date && affected_student_ids.contains(&r.student_id)))
        .cloned()
        .collect();
    next.extend(incoming);
    next
}
