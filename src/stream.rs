use std::collections::HashSet;

use tracing::debug;

use crate::annotation::Annotation;

/// Stable sort by time; annotations at the same time keep their input order
pub fn sort_by_time(annotations: &mut [Annotation]) {
    annotations.sort_by(Annotation::compare_by_time);
}

pub fn is_time_ordered(annotations: &[Annotation]) -> bool {
    annotations
        .windows(2)
        .all(|pair| pair[0].time() <= pair[1].time())
}

/// Removes annotations equal (same time, type and annotator) to an earlier one
///
/// The first occurrence wins, so its subtype, channel and auxiliary text
/// are the ones kept. Order of the survivors is unchanged. Returns the
/// number of annotations removed.
///
/// ```rust
/// use wfdbannot::{stream, Annotation, AnnotationCode, Time};
///
/// let mut anns = vec![
///     Annotation::new(Time::new(10), AnnotationCode::NORMAL).with_chan(0),
///     Annotation::new(Time::new(10), AnnotationCode::PVC),
///     Annotation::new(Time::new(10), AnnotationCode::NORMAL).with_chan(1),
/// ];
/// assert_eq!(stream::dedup_events(&mut anns), 1);
/// assert_eq!(anns.len(), 2);
/// assert_eq!(anns[0].chan(), 0);
/// ```
pub fn dedup_events(annotations: &mut Vec<Annotation>) -> usize {
    let before = annotations.len();
    let keep: Vec<bool> = {
        let mut seen: HashSet<&Annotation> = HashSet::with_capacity(before);
        annotations.iter().map(|a| seen.insert(a)).collect()
    };
    // retain 按顺序对每个元素只调用一次
    let mut keep = keep.into_iter();
    annotations.retain(|_| keep.next().unwrap_or(true));

    let removed = before - annotations.len();
    if removed > 0 {
        debug!(removed, remaining = annotations.len(), "dropped duplicate annotations");
    }
    removed
}
