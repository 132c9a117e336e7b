use arithcode::{ArithmeticCoder, FrequencyTable};

fn main() {
    let input = (0..20).map(|i| (i % 3) as u8).collect::<Vec<_>>();
    let table: FrequencyTable<u8> = [(0u8, 128), (1, 64), (2, 64)].into_iter().collect();
    let mut coder = ArithmeticCoder::new(&table).unwrap();

    for _ in 0..10_000 {
        let (encoded, code) = coder.encode_to_binary(&input).unwrap();
        let decoded = coder.decode(encoded.value, input.len()).unwrap();
        assert_eq!(decoded, input);
        let decoded = coder.decode_binary(&code, input.len()).unwrap();
        assert_eq!(decoded, input);
    }
}
