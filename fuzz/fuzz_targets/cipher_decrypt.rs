#![no_main]

use libfuzzer_sys::fuzz_target;
use passwand::buffer::SecureBytes;
use passwand::cipher;

fuzz_target!(|data: &[u8]| {
    if data.len() < 40 {
        return;
    }
    let key = SecureBytes::from_vec(data[..32].to_vec());
    let mut iv = [0u8; 8];
    iv.copy_from_slice(&data[32..40]);
    let _ = cipher::decrypt_with(&key, &iv, &data[40..]);
});
