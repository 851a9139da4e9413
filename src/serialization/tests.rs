extern crate rand;

use super::*;
use self::rand::Rng;

#[test]
fn zig_zag_encode_0() {
    assert_eq!(0, zig_zag_encode(0));
}

#[test]
fn zig_zag_encode_neg_1() {
    assert_eq!(1, zig_zag_encode(-1));
}

#[test]
fn zig_zag_encode_1() {
    assert_eq!(2, zig_zag_encode(1));
}

#[test]
fn zig_zag_encode_i64_max() {
    assert_eq!(u64::max_value() - 1, zig_zag_encode(i64::max_value()));
}

#[test]
fn zig_zag_encode_i64_min() {
    assert_eq!(u64::max_value(), zig_zag_encode(i64::min_value()));
}

#[test]
fn zig_zag_decode_i64_min() {
    assert_eq!(i64::min_value(), zig_zag_decode(u64::max_value()))
}

#[test]
fn zig_zag_decode_i64_max() {
    assert_eq!(i64::max_value(), zig_zag_decode(u64::max_value() - 1))
}

#[test]
fn zig_zag_roundtrip_random() {
    let mut rng = rand::weak_rng();

    for _ in 0..1_000_000{
        let r = rng.gen::<i64>();
        let encoded = zig_zag_encode(r);
        let decoded = zig_zag_decode(encoded);

        assert_eq!(r, decoded);
    }
}

#[test]
fn roundtrip_preserves_counts_after_a_nonzero_normalizing_offset() {
    let mut h: Histogram<u64> = Histogram::new_with_bounds(1, 3600_000_000, 3).unwrap();
    h.record(10).unwrap();
    h.record_n(11, 7).unwrap();
    h.record(1_000_000).unwrap();
    // gives the histogram a nonzero normalizing_index_offset before it's ever serialized
    h.shift_values_left(2).unwrap();

    let mut serialized = Vec::new();
    V2Serializer::new().serialize(&h, &mut serialized).unwrap();

    let deser_h: Histogram<u64> = Deserializer::new().deserialize(&mut &serialized[..]).unwrap();

    assert_eq!(h, deser_h);
    assert_eq!(h.count_at(40), deser_h.count_at(40));
    assert_eq!(h.count_at(44), deser_h.count_at(44));
}
