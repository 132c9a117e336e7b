#![no_main]
use arithcode::{ArithmeticCoder, FrequencyTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u8, u8)| {
    let (input_bytes, f0, f1) = data;

    // Two symbols, both at least 1/10 likely; 20 symbols stay well above
    // the 28-digit resolution.
    let f0 = (f0 % 9) as u64 + 1;
    let f1 = 10 - f0;
    let table: FrequencyTable<u8> = [(0u8, f0), (1, f1)].into_iter().collect();
    let mut coder = ArithmeticCoder::new(&table).unwrap();

    let input: Vec<u8> = input_bytes.iter().take(20).map(|b| b % 2).collect();

    let (encoded, code) = coder.encode_to_binary(&input).unwrap();
    assert_eq!(coder.decode(encoded.value, input.len()).unwrap(), input);
    assert_eq!(coder.decode_binary(&code, input.len()).unwrap(), input);
});
