use flatmem::padding::is_aligned;
use flatmem::{Flat, FlatLayout, Tuple, Vector};
use super::fixtures::Pair;

fn assert_padding_law<T: Flat>() {
    let layout = FlatLayout::of::<T>();
    assert!(layout.final_alignment.is_power_of_two());
    assert!(layout.fixed_size > 0);
    assert!(
        is_aligned(layout.fixed_size, layout.final_alignment),
        "{layout:?}"
    );
    for (a, b) in layout.field_offsets.iter().zip(layout.field_offsets.iter().skip(1)) {
        assert!(a < b, "{layout:?}");
    }
}

#[test]
fn alignment_is_max_of_scalar_fields() {
    assert_eq!(FlatLayout::of::<Tuple<(u8, u8)>>().final_alignment, 1);
    assert_eq!(FlatLayout::of::<Tuple<(u8, u16)>>().final_alignment, 2);
    assert_eq!(FlatLayout::of::<Tuple<(u16, i32, u8)>>().final_alignment, 4);
    assert_eq!(FlatLayout::of::<Tuple<(u8, u64)>>().final_alignment, 8);
    assert_eq!(FlatLayout::of::<Tuple<(Pair, u8)>>().final_alignment, 4);
}

#[test]
fn padding_law_holds() {
    assert_padding_law::<Tuple<()>>();
    assert_padding_law::<Tuple<(u8,)>>();
    assert_padding_law::<Tuple<(u8, u16, u8)>>();
    assert_padding_law::<Tuple<(i16, i32, u16)>>();
    assert_padding_law::<Tuple<(u8, u64, u8, u32, u16, u8, i64, u8)>>();
    assert_padding_law::<Tuple<(Pair, u8, Tuple<(u8, u64)>)>>();
    assert_padding_law::<Tuple<(u8, Vector<u8>)>>();
    assert_padding_law::<Tuple<(Vector<u64>, Vector<u16>)>>();
    assert_padding_law::<Vector<u8>>();
    assert_padding_law::<Vector<Tuple<(u8, u64)>>>();
}

#[test]
fn triviality_is_monotone() {
    assert!(FlatLayout::of::<u8>().is_trivial);
    assert!(FlatLayout::of::<Pair>().is_trivial);
    assert!(FlatLayout::of::<Tuple<()>>().is_trivial);
    assert!(FlatLayout::of::<Tuple<(u8, Tuple<(u16, Pair)>)>>().is_trivial);

    assert!(!FlatLayout::of::<Vector<u8>>().is_trivial);
    assert!(!FlatLayout::of::<Tuple<(u8, Vector<u8>)>>().is_trivial);
    assert!(!FlatLayout::of::<Tuple<(u8, Tuple<(u16, Vector<u8>)>)>>().is_trivial);
    assert!(!FlatLayout::of::<Tuple<(Tuple<(Tuple<(Vector<u8>,)>,)>,)>>().is_trivial);
}

#[test]
fn alignment_covers_out_of_line_data() {
    // The record header holds only a u8 and a reference slot,
    // but the start must also suit the u64 elements written out of line.
    type Rec = Tuple<(u8, Vector<u64>)>;
    assert_eq!(FlatLayout::of::<Rec>().final_alignment, 8);

    // The same holds when the deepest type is the most aligned.
    type Deep = Vector<Vector<Tuple<(u8, u64)>>>;
    assert_eq!(FlatLayout::of::<Deep>().final_alignment, 8);
    assert_eq!(FlatLayout::of::<Vector<Vector<u8>>>().final_alignment, 8);
}

#[test]
fn empty_record_is_one_byte() {
    let layout = FlatLayout::of::<Tuple<()>>();
    assert_eq!(layout.fixed_size, 1);
    assert_eq!(layout.final_alignment, 1);

    // As a field it still takes its own byte.
    assert_eq!(FlatLayout::of::<Tuple<(u8, Tuple<()>, u8)>>().field_offsets, &[0, 1, 2]);
    assert_eq!(FlatLayout::of::<Tuple<(u8, Tuple<()>, u8)>>().fixed_size, 3);
}
