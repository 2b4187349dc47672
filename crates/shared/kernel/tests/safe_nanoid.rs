use farm_kernel::SAFE_ALPHABET;
use farm_kernel::safe_nanoid;

#[test]
fn record_ids_use_the_unambiguous_alphabet() {
    for _ in 0..32 {
        let id = safe_nanoid!();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|ch| SAFE_ALPHABET.contains(&ch)), "unexpected character in {id}");
    }
}

#[test]
fn custom_length() {
    assert_eq!(safe_nanoid!(20).len(), 20);
}
