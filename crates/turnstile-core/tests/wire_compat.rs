//! Wire-compatibility tests for the reader protocol.
//!
//! The fielded reader firmware matches replies byte-for-byte against
//! `ALLOW`, `DENY`, and the `UPDATE_LIST:` prefix, and sends badge IDs
//! as bare UTF-8 with no framing.  These tests pin the exact bytes the
//! codec produces and accepts, so a refactor cannot silently break a
//! device that nobody can reflash remotely.

use turnstile_core::{
    decode_reply, decode_request, encode_reply, encode_request, AuthorityReply, BadgeId,
    ProtocolError,
};

fn badge(s: &str) -> BadgeId {
    BadgeId::new(s).unwrap()
}

#[test]
fn request_bytes_are_exactly_the_badge_id() {
    let bytes = encode_request(&badge("F39A370E"));
    assert_eq!(bytes, b"F39A370E".to_vec());
}

#[test]
fn allow_reply_is_the_five_byte_word() {
    assert_eq!(encode_reply(&AuthorityReply::Allow), b"ALLOW".to_vec());
}

#[test]
fn deny_reply_is_the_four_byte_word() {
    assert_eq!(encode_reply(&AuthorityReply::Deny), b"DENY".to_vec());
}

#[test]
fn roster_push_layout_matches_fielded_firmware() {
    // The firmware does `payload[12:].split(",")`, so the prefix must be
    // exactly 12 bytes and IDs must be joined by bare commas.
    let reply = AuthorityReply::UpdateList(vec![
        badge("F39A370E"),
        badge("20047935"),
        badge("00220394"),
        badge("72349395"),
    ]);
    let bytes = encode_reply(&reply);

    assert_eq!(&bytes[..12], b"UPDATE_LIST:");
    assert_eq!(
        bytes,
        b"UPDATE_LIST:F39A370E,20047935,00220394,72349395".to_vec()
    );
}

#[test]
fn decoder_round_trips_what_the_authority_sends() {
    let roster = AuthorityReply::UpdateList(vec![badge("A1"), badge("B2")]);
    for reply in [AuthorityReply::Allow, AuthorityReply::Deny, roster] {
        let decoded = decode_reply(&encode_reply(&reply)).expect("own bytes must decode");
        assert_eq!(decoded, reply);
    }
}

#[test]
fn authority_accepts_requests_sent_over_a_serial_bridge() {
    // Readers attached through a USB-serial console append CRLF.
    let decoded = decode_request(b"F39A370E\r\n").unwrap();
    assert_eq!(decoded, badge("F39A370E"));
}

#[test]
fn anything_that_is_not_a_reply_shape_is_an_error() {
    for garbage in [&b"OK"[..], b"UPDATE_LIST", b"Allow", b"DENY:X"] {
        assert!(
            matches!(
                decode_reply(garbage),
                Err(ProtocolError::UnknownReply(_))
            ),
            "{:?} must not decode",
            String::from_utf8_lossy(garbage)
        );
    }
}
