use vocals::RingBuffer;

#[test]
fn test_capacity_bound_over_many_pushes() {
    let mut buf = RingBuffer::new(8).unwrap();

    for round in 0..20 {
        buf.push(&[round as f32; 5]);
        assert!(buf.len() <= buf.capacity(), "len {} exceeded capacity", buf.len());
        buf.pop(3);
        assert!(buf.len() <= buf.capacity());
    }
}

#[test]
fn test_fifo_order_across_interleaved_pushes_and_pops() {
    let mut buf = RingBuffer::new(16).unwrap();
    let mut expected = Vec::new();
    let mut popped = Vec::new();
    let mut next = 0.0f32;

    // Alternate pushes and pops, never overflowing, and check the output is
    // the concatenation of the inputs in push order.
    for _ in 0..10 {
        let chunk: Vec<f32> = (0..4).map(|i| next + i as f32).collect();
        next += 4.0;
        assert_eq!(buf.push(&chunk), 4);
        expected.extend(chunk);

        popped.extend(buf.pop(3));
    }
    popped.extend(buf.pop(buf.capacity()));

    assert_eq!(popped, expected);
}

#[test]
fn test_conservation_on_push() {
    let mut buf = RingBuffer::new(6).unwrap();
    buf.push(&[1.0, 2.0, 3.0, 4.0]);

    let before = buf.len();
    let written = buf.push(&[5.0, 6.0, 7.0, 8.0]);

    assert_eq!(buf.len(), (before + 4).min(buf.capacity()));
    assert_eq!(written, buf.len() - before);
}

#[test]
fn test_conservation_on_pop() {
    let mut buf = RingBuffer::new(6).unwrap();
    buf.push(&[1.0, 2.0, 3.0]);

    let before = buf.len();
    let out = buf.pop(5);

    assert_eq!(out.len(), before.min(5));
    assert_eq!(buf.len(), before - out.len());
}

#[test]
fn test_wraparound_never_yields_stale_slots() {
    // Capacity 4: push 3, pop 2, push 3. Six samples total cross the seam.
    let mut buf = RingBuffer::new(4).unwrap();

    assert_eq!(buf.push(&[1.0, 2.0, 3.0]), 3);
    assert_eq!(buf.pop(2), vec![1.0, 2.0]);
    assert_eq!(buf.push(&[4.0, 5.0, 6.0]), 3);

    assert_eq!(buf.pop(4), vec![3.0, 4.0, 5.0, 6.0]);
    assert!(buf.is_empty());
}

#[test]
fn test_round_trip_without_overflow() {
    let mut buf = RingBuffer::new(64).unwrap();
    let values: Vec<f32> = (0..48).map(|i| (i as f32) * 0.25 - 3.0).collect();

    assert_eq!(buf.push(&values), values.len());
    assert_eq!(buf.pop(values.len()), values);
}

#[test]
fn test_drop_on_overflow_keeps_first_samples() {
    let mut buf = RingBuffer::new(4).unwrap();

    let written = buf.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    assert_eq!(written, 4);
    assert_eq!(buf.pop(4), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_empty_pop_returns_empty() {
    let mut buf = RingBuffer::new(4).unwrap();
    assert!(buf.pop(4).is_empty());
    assert!(buf.pop(0).is_empty());
}

#[test]
fn test_zero_length_push_leaves_state_unchanged() {
    let mut buf = RingBuffer::new(4).unwrap();
    buf.push(&[1.0, 2.0]);

    assert_eq!(buf.push(&[]), 0);
    assert_eq!(buf.len(), 2);
    assert_eq!(buf.pop(2), vec![1.0, 2.0]);
}

#[test]
fn test_sustained_streaming_through_wraparound() {
    // Stream ten full capacities worth of data through a small buffer in
    // mismatched chunk sizes and verify nothing is lost or reordered.
    let mut buf = RingBuffer::new(7).unwrap();
    let total: Vec<f32> = (0..70).map(|i| i as f32).collect();
    let mut offset = 0;
    let mut out = Vec::new();

    while out.len() < total.len() {
        if offset < total.len() {
            let end = (offset + 3).min(total.len());
            offset += buf.push(&total[offset..end]);
        }
        out.extend(buf.pop(2));
    }

    assert_eq!(out, total);
}
