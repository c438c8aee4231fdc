use crate::types::Frame;

/// Retains, per frame, only the receptions carrying a fine timestamp, then
/// drops every frame whose surviving reception count is below
/// `min_per_frame`. Frame and reception order is preserved.
pub fn filter_on_fine_timestamp(buffer: &[Frame], min_per_frame: usize) -> Vec<Frame> {
    let mut out = Vec::new();

    for frame in buffer {
        let filtered: Frame = frame
            .iter()
            .filter(|rx| rx.fine_timestamp_nanos.is_some())
            .cloned()
            .collect();

        if filtered.len() >= min_per_frame {
            out.push(filtered);
        }
    }

    out
}
