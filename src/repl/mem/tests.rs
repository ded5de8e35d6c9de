use crate::repl::{MemSpan, MemView, ReplError};

#[test]
fn read_within_span_returns_live_bytes() {
	let value: u32 = 0x1122_3344;
	let span = MemSpan::of(&value);
	let view = MemView::new(vec![span]);

	let raw = view.read(span.base, 4).expect("in-bounds read succeeds");
	assert_eq!(raw, value.to_ne_bytes());
	assert_eq!(view.read_u32(span.base).expect("word read succeeds"), value);
}

#[test]
fn read_usize_round_trips_a_pointer() {
	let target: u64 = 99;
	let pointer: *const u64 = &target;
	let holder = pointer as usize;
	let view = MemView::new(vec![MemSpan::of(&holder)]);

	let addr = std::ptr::from_ref(&holder) as usize;
	assert_eq!(view.read_usize(addr).expect("pointer word reads"), pointer as usize);
}

#[test]
fn out_of_span_access_is_stale() {
	let bytes = [0_u8; 16];
	let span = MemSpan::of_bytes(&bytes);
	let view = MemView::new(vec![span]);

	let err = view.read(span.base + 12, 8).expect_err("read past the end is rejected");
	assert!(matches!(err, ReplError::StaleAddress { .. }));

	let err = view.read(span.base.wrapping_sub(1), 1).expect_err("read before the base is rejected");
	assert!(matches!(err, ReplError::StaleAddress { .. }));
}

#[test]
fn empty_view_rejects_everything() {
	let view = MemView::default();
	assert!(view.read(0x1000, 1).is_err());
}

#[test]
fn nested_storage_span_does_not_shadow_the_module_span() {
	let module = [0x5a_u8; 64];
	let base = MemSpan::of_bytes(&module).base;
	// Backing storage allocated inside the module image: a short span whose
	// base sits between the module base and the read address.
	let view = MemView::new(vec![MemSpan::of_bytes(&module), MemSpan { base: base + 16, len: 4 }]);

	let raw = view.read(base + 18, 8).expect("module-covered read succeeds despite the nested span");
	assert_eq!(raw, [0x5a_u8; 8]);
	assert_eq!(view.read(base + 16, 4).expect("the nested span itself stays readable").len(), 4);

	let err = view.read(base + 60, 8).expect_err("past the module end is still rejected");
	assert!(matches!(err, ReplError::StaleAddress { .. }));
}

#[test]
fn access_must_stay_inside_one_span() {
	let first = [0_u8; 8];
	let second = [0_u8; 8];
	let view = MemView::new(vec![MemSpan::of_bytes(&first), MemSpan::of_bytes(&second)]);

	// Even if the two buffers happen to be adjacent, a read must be fully
	// contained by one span; it never stitches ranges together.
	let err = view.read(MemSpan::of_bytes(&first).base + 4, 8).expect_err("straddling read is rejected");
	assert!(matches!(err, ReplError::StaleAddress { .. }));
}
