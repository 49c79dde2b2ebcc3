/// Byte used to fill every echo payload of a session.
pub(crate) const FILLER_BYTE: u8 = b'a';

pub(crate) fn filler(size: usize) -> Vec<u8> {
    vec![FILLER_BYTE; size]
}

/// Counts the payload bytes of `sent` that did not come back intact.
///
/// Missing trailing bytes of a truncated reply and mismatching bytes in the overlapping
/// prefix are added up. Extra trailing bytes of a longer reply are ignored.
pub(crate) fn count_lost_bytes(sent: &[u8], received: &[u8]) -> usize {
    let missing = sent.len().saturating_sub(received.len());
    let mismatched = sent.iter().zip(received).filter(|(s, r)| s != r).count();
    missing + mismatched
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn loss_percent(lost_bytes: usize, sent_len: usize) -> f64 {
    if sent_len == 0 {
        return 0.0;
    }
    lost_bytes as f64 / sent_len as f64 * 100.0
}
