use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
}

#[test]
fn luma_of_gray_is_identity() {
    for v in 0..=255u8 {
        assert_eq!(luma601(v, v, v), v);
    }
    assert_eq!(luma601(255, 0, 0), 76);
    assert_eq!(luma601(0, 255, 0), 150);
}

#[test]
fn hash_is_stable_and_seed_sensitive() {
    assert_eq!(hash_u32(7, 3, 4), hash_u32(7, 3, 4));
    assert_ne!(hash_u32(7, 3, 4), hash_u32(8, 3, 4));
    assert_ne!(hash_u32(7, 3, 4), hash_u32(7, 4, 3));
}

#[test]
fn digest_distinguishes_buffers() {
    assert_eq!(pixel_digest(&[1, 2, 3]), pixel_digest(&[1, 2, 3]));
    assert_ne!(pixel_digest(&[1, 2, 3]), pixel_digest(&[1, 2, 4]));
}
