use dexpatch_isa::*;

pub fn assert_roundtrip(program: &[Instruction]) {
    let (units, offsets) = encode(program).unwrap();
    let decoded = decode(&units).unwrap();
    assert_eq!(decoded.len(), program.len(), "length mismatch");
    for (i, (a, (b, offset))) in program.iter().zip(&decoded).enumerate() {
        assert_eq!(a, b, "mismatch at {i}: {a} vs {b}");
        assert_eq!(offsets[i], *offset, "offset mismatch at {i}");
    }
}
