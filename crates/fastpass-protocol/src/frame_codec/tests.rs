//! Integration tests for frame encoding and decoding.

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use fastpass_core::error::{DecodingErrorKind, ErrorKind};

    use super::super::{checksum, FrameDecoder, FrameEncoder};
    use crate::payload::Payload;
    use crate::pktdesc::PacketDesc;

    #[test]
    fn encode_plain_request_frame() {
        let mut pd = PacketDesc::new();
        pd.seqno = 0xAABB_CCDD;
        pd.push_areq(0x0102, 3);
        pd.push_areq(0x0304, 1);

        let frame = FrameEncoder::encode(&pd).unwrap();
        assert_eq!(frame.len(), pd.encoded_len());
        // header: low 16 bits of the seqno, zero checksum
        assert_eq!(&frame[0..4], &[0xCC, 0xDD, 0x00, 0x00]);
        // A-REQ header: type nibble 1, count 2
        assert_eq!(&frame[4..6], &[0x10, 0x02]);
        assert_eq!(&frame[6..10], &[0x01, 0x02, 0x00, 0x03]);
        assert_eq!(&frame[10..14], &[0x03, 0x04, 0x00, 0x01]);
    }

    #[test]
    fn encode_frame_with_reset() {
        let mut pd = PacketDesc::new();
        pd.seqno = 7;
        pd.send_reset = true;
        pd.reset_timestamp = 0x00AB_CDEF_0123_4567;

        let frame = FrameEncoder::encode(&pd).unwrap();
        // RESET: type nibble 0, then the low 56 bits of the epoch
        assert_eq!(&frame[4..8], &[0x00, 0xAB, 0xCD, 0xEF]);
        assert_eq!(&frame[8..12], &[0x01, 0x23, 0x45, 0x67]);
        // empty A-REQ follows
        assert_eq!(&frame[12..14], &[0x10, 0x00]);
    }

    #[test]
    fn decode_reset_payload() {
        let mut data = vec![0x00, 0x05, 0x00, 0x00];
        data.extend_from_slice(&[0x00, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67]);

        let frame = FrameDecoder::decode(&data).unwrap();
        assert_eq!(frame.seq_low16, 5);
        assert_eq!(frame.truncation, None);
        assert_eq!(frame.payloads, vec![Payload::Reset {
            partial_epoch: 0x00AB_CDEF_0123_4567,
        }]);
    }

    #[test]
    fn decode_ack_payload_keeps_type_nibble_in_runlen() {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        data.extend_from_slice(&[0x33, 0x00, 0x00, 0x00, 0x00, 0x83]);

        let frame = FrameDecoder::decode(&data).unwrap();
        assert_eq!(frame.payloads, vec![Payload::Ack { runlen: 0x3300_0000, seq: 0x83 }]);
    }

    #[test]
    fn decode_alloc_payload() {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        // type 2, n_dst = 2, 1 slot half-word (2 slot bytes)
        data.extend_from_slice(&[0x22, 0x01]);
        data.extend_from_slice(&[0x00, 0x10]); // base tslot, shifted left 4 on decode
        data.extend_from_slice(&[0x00, 0x07, 0x00, 0x09]); // destinations
        data.extend_from_slice(&[0xA5, 0x5A]); // slot codes

        let frame = FrameDecoder::decode(&data).unwrap();
        assert_eq!(frame.payloads, vec![Payload::Alloc {
            base_tslot: 0x100,
            dsts: vec![7, 9],
            slots: vec![0xA5, 0x5A],
        }]);
    }

    #[test]
    fn decode_concatenated_payloads() {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]);
        data.extend_from_slice(&[0x30, 0x00, 0x00, 0x00, 0x00, 0x09]);

        let frame = FrameDecoder::decode(&data).unwrap();
        assert_eq!(frame.payloads.len(), 2);
        assert!(matches!(frame.payloads[0], Payload::Reset { partial_epoch: 0x1_0000_0002 }));
        assert!(matches!(frame.payloads[1], Payload::Ack { runlen: 0x3000_0000, seq: 9 }));
        assert_eq!(frame.truncation, None);
    }

    #[test]
    fn truncated_tail_keeps_earlier_payloads() {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]);
        data.extend_from_slice(&[0x30, 0x00, 0x00]); // ACK needs 6 bytes

        let frame = FrameDecoder::decode(&data).unwrap();
        assert_eq!(frame.payloads.len(), 1);
        assert_eq!(frame.truncation, Some(DecodingErrorKind::IncompleteAck));
    }

    #[test]
    fn alloc_shorter_than_its_length_fields_is_truncated() {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        // claims 3 destinations and 4 slot bytes but carries none of them
        data.extend_from_slice(&[0x23, 0x02, 0x00, 0x10]);

        let frame = FrameDecoder::decode(&data).unwrap();
        assert!(frame.payloads.is_empty());
        assert_eq!(frame.truncation, Some(DecodingErrorKind::IncompleteAlloc));
    }

    #[test]
    fn unknown_type_discards_the_remainder() {
        let mut data = vec![0x00, 0x01, 0x00, 0x00];
        data.extend_from_slice(&[0x30, 0x00, 0x00, 0x00, 0x00, 0x09]);
        data.extend_from_slice(&[0xF0, 0x00]);

        let frame = FrameDecoder::decode(&data).unwrap();
        assert_eq!(frame.payloads.len(), 1);
        assert_eq!(frame.truncation, Some(DecodingErrorKind::UnknownPayloadType(0xF)));
    }

    #[test]
    fn datagram_below_minimal_size_is_rejected() {
        let err = FrameDecoder::decode(&[0x00, 0x01, 0x00, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::DecodingError(DecodingErrorKind::PacketTooShort)
        ));
    }

    #[test]
    fn sealed_outbound_frame_verifies() {
        let src = Ipv4Addr::new(192, 168, 1, 10);
        let dst = Ipv4Addr::new(192, 168, 1, 1);

        let mut pd = PacketDesc::new();
        pd.seqno = 0x0001_0000_0000_4242;
        pd.push_areq(11, 2);

        let mut frame = FrameEncoder::encode(&pd).unwrap();
        checksum::seal(&mut frame, src, dst, pd.seqno);
        assert!(checksum::verify(&frame, src, dst, pd.seqno));

        let decoded = FrameDecoder::decode(&frame).unwrap();
        assert_eq!(decoded.seq_low16, 0x4242);
        assert_ne!(decoded.checksum, 0);
        // requests only travel endpoint -> arbiter; the inbound demux does
        // not know the A-REQ type
        assert_eq!(decoded.truncation, Some(DecodingErrorKind::UnknownPayloadType(0x1)));
    }
}
