#![allow(dead_code)]

pub mod command;
pub mod file;

// Helper function to create hexdump representation
pub fn to_hexdump(data: &[u8]) -> String {
    let mut result = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        result.push_str(&format!("{:08x}: ", i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                result.push(' ');
            }
            result.push_str(&format!("{:02x} ", byte));
        }

        result.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() {
                result.push(*byte as char);
            } else {
                result.push('.');
            }
        }

        result.push_str("|\n");
    }
    result
}

// Macro to compare two index files with a hexdump diff on failure
#[macro_export]
macro_rules! assert_index_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            pretty_assertions::assert_eq!(
                common::to_hexdump($left),
                common::to_hexdump($right),
                "\n=== INDEX CONTENTS DIFFER ===\nleft ({} bytes) vs right ({} bytes)",
                $left.len(),
                $right.len()
            );
        }
    };
}
