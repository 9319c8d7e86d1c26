use anyhow::Result;
use flatmem::{Builder, FlatLayout, Tuple, Vector};
use itertools::Itertools;
use rand::Rng;
use super::fixtures::{finished, Pair, Vec4};

#[test]
fn record_with_one_sequence() -> Result<()> {
    type Rec = Tuple<(Vector<u64>,)>;
    assert_eq!(FlatLayout::of::<Rec>().final_alignment, 8);
    assert!(!FlatLayout::of::<Rec>().is_trivial);

    let mut builder = Builder::<Rec>::new();
    builder.field_mut::<0>().resize(3);
    builder.finish()?;

    // 8-byte reference, then count + pad + three u64s
    assert_eq!(builder.size(), 40);
    let seq = builder.view().field::<0>();
    assert_eq!(seq.len(), 3);
    assert_eq!(seq.as_slice(), &[0, 0, 0]);
    Ok(())
}

#[test]
fn record_with_two_sequences() -> Result<()> {
    type Rec = Tuple<(Vector<u64>, Vector<u16>)>;
    assert_eq!(FlatLayout::of::<Rec>().final_alignment, 8);

    let builder = finished::<Rec, _>(|rec| {
        rec.field_mut::<0>().resize(3);
        rec.field_mut::<1>().resize(4);
    })?;

    // header 16, first sequence 16..48, second 48..60, padded to 64
    assert_eq!(builder.size(), 64);
    let view = builder.view();
    assert_eq!(view.field::<0>().len(), 3);
    assert_eq!(view.field::<1>().len(), 4);

    let base = builder.data().as_ptr() as usize;
    assert_eq!(view.field::<0>().as_ptr() as usize - base, 16);
    assert_eq!(view.field::<1>().as_ptr() as usize - base, 48);
    Ok(())
}

#[test]
fn sequence_of_sequences() -> Result<()> {
    type Rec = Tuple<(Vector<Vector<u8>>,)>;
    assert_eq!(FlatLayout::of::<Rec>().final_alignment, 8);

    let mut builder = Builder::<Rec>::new();
    let outer = builder.field_mut::<0>();
    outer.resize(3);
    outer[0].resize(2);
    outer[1].resize(3);
    outer[2].resize(4);
    builder.finish()?;

    let outer = builder.view().field::<0>();
    assert_eq!(outer.len(), 3);
    assert_eq!(outer.get(0).map(|inner| inner.len()), Some(2));
    assert_eq!(outer.get(1).map(|inner| inner.len()), Some(3));
    assert_eq!(outer.get(2).map(|inner| inner.len()), Some(4));
    assert!(outer.get(3).is_none());
    Ok(())
}

#[test]
fn element_values_survive() -> Result<()> {
    let mut rng = rand::thread_rng();

    for _ in 0..16 {
        let len = rng.gen_range(0..64);
        let vals = (0..len).map(|_| rng.gen::<i32>()).collect_vec();

        let mut builder = Builder::<Vector<i32>>::new();
        builder.extend(vals.iter().copied());
        builder.finish()?;

        let view = builder.view();
        assert_eq!(view.len(), vals.len());
        for (exp, act) in vals.iter().zip_eq(view.iter()) {
            assert_eq!(exp, act);
        }
        assert_eq!(view.as_slice(), &vals[..]);
    }
    Ok(())
}

#[test]
fn last_write_wins() -> Result<()> {
    let builder = finished::<Vector<u16>, _>(|seq| {
        seq.resize(2);
        seq[1] = 3;
        seq[1] = 4;
        seq.push(9);
        seq[2] += 1;
    })?;
    assert_eq!(builder.view().as_slice(), &[0, 4, 10]);
    Ok(())
}

#[test]
fn shrinking_drops_trailing_elements() -> Result<()> {
    let builder = finished::<Vector<u64>, _>(|seq| {
        seq.extend([1, 2, 3, 4, 5]);
        seq.resize(2);
    })?;
    assert_eq!(builder.view().as_slice(), &[1, 2]);
    assert_eq!(builder.size(), 8 + 2 * 8);
    Ok(())
}

#[test]
fn empty_sequence_in_record() -> Result<()> {
    let builder = finished::<Tuple<(u8, Vector<u32>)>, _>(|rec| {
        *rec.field_mut::<0>() = 1;
    })?;
    let seq = builder.view().field::<1>();
    assert!(seq.is_empty());
    assert_eq!(seq.iter().count(), 0);
    assert!(seq.as_slice().is_empty());
    // header 16, then the empty sequence header
    assert_eq!(builder.size(), 24);
    Ok(())
}

#[test]
fn sequence_of_struct_scalars() -> Result<()> {
    let pairs = [Pair { x: 1, y: 2 }, Pair { x: 3, y: 4 }];
    let points = [Vec4 {
        x: 0.5,
        y: 1.5,
        z: 2.5,
        w: 3.5,
    }];

    let builder = finished::<Tuple<(Vector<Pair>, Vector<Vec4>)>, _>(|rec| {
        rec.field_mut::<0>().extend(pairs);
        rec.field_mut::<1>().extend(points);
    })?;

    let view = builder.view();
    assert_eq!(view.field::<0>().as_slice(), &pairs);
    assert_eq!(view.field::<1>().as_slice(), &points);
    let p = view.field::<1>().as_slice()[0];
    assert_eq!(p.x + p.y + p.z + p.w, 8.0);
    Ok(())
}

#[test]
fn sequence_of_trivial_records_is_inline() -> Result<()> {
    type Elem = Tuple<(u8, u16)>;
    assert_eq!(Vector::<Elem>::SLOT_SIZE, 4);

    let builder = finished::<Vector<Elem>, _>(|seq| {
        for i in 0..5u8 {
            let elem = seq.push_default();
            *elem.field_mut::<0>() = i;
            *elem.field_mut::<1>() = u16::from(i) * 100;
        }
    })?;

    // count, then five 4-byte records, nothing out of line
    assert_eq!(builder.size(), 4 + 5 * 4);
    let view = builder.view();
    for (i, elem) in view.iter().enumerate() {
        assert_eq!(usize::from(*elem.field::<0>()), i);
        assert_eq!(usize::from(*elem.field::<1>()), i * 100);
    }
    Ok(())
}
