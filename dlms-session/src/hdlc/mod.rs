//! HDLC session layer module

pub mod address;
pub mod fcs;
pub mod frame;
pub mod limits;
pub mod sequence;

pub use address::{count_server_address, decode_address, encode_address, reserved};
pub use fcs::{check_fcs16, fcs16, FcsCalc};
pub use frame::{control, FrameType, HdlcFrame, FLAG, LLC_REQUEST, LLC_RESPONSE};
pub use limits::HdlcLimits;
pub use sequence::FrameSequence;

use dlms_core::DlmsResult;

/// Split an APDU into encoded I-frames
///
/// The LLC request header is prepended once, then the payload is cut into
/// chunks of at most `max_info_tx` bytes. Every frame but the last carries
/// the segmentation bit.
pub fn split_to_hdlc_frames(
    server_address: u32,
    client_address: u32,
    max_info_tx: u16,
    sequence: &mut FrameSequence,
    apdu: &[u8],
) -> DlmsResult<Vec<Vec<u8>>> {
    let mut payload = Vec::with_capacity(apdu.len() + LLC_REQUEST.len());
    payload.extend_from_slice(&LLC_REQUEST);
    payload.extend_from_slice(apdu);

    let chunk_size = usize::from(max_info_tx.max(1));
    let chunk_count = payload.len().div_ceil(chunk_size);
    let mut frames = Vec::with_capacity(chunk_count);
    for (i, chunk) in payload.chunks(chunk_size).enumerate() {
        let control = sequence.next_information_control();
        let frame = HdlcFrame::new(server_address, client_address, control, chunk.to_vec())
            .with_segmented(i + 1 < chunk_count);
        frames.push(frame.encode()?);
    }
    Ok(frames)
}

/// Strip the LLC response header if present
pub fn strip_llc(info: &[u8]) -> &[u8] {
    info.strip_prefix(LLC_RESPONSE.as_slice())
        .or_else(|| info.strip_prefix(LLC_REQUEST.as_slice()))
        .unwrap_or(info)
}
