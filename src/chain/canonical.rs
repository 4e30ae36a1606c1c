//! The exact text the ledger hashes for a block, before the nonce is appended.
//!
//! Keys are sorted, items are separated by `", "`, keys from values by `": "`,
//! and anything outside printable ASCII is written as a lowercase `\uXXXX`
//! escape. Integers keep all their digits; floats use the shortest text that
//! round-trips, with an exponent only outside 1e-4..1e16.

use serde::Serialize;
use serde_json::Number;
use serde_json::ser::{Formatter, Serializer};
use std::io::{self, Write};

use super::block::{Block, Transaction};

// Field order is the sorted key order; serde writes fields in declaration order.
#[derive(Serialize)]
struct CanonicalBlock<'a> {
    hash_anterior: &'a str,
    index: u64,
    minero: &'a str,
    timestamp: &'a Number,
    transacciones: Vec<CanonicalTransaction<'a>>,
}

#[derive(Serialize)]
struct CanonicalTransaction<'a> {
    cantidad: &'a Number,
    emisor: &'a str,
    receptor: &'a str,
}

impl<'a> From<&'a Transaction> for CanonicalTransaction<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            cantidad: &tx.amount,
            emisor: &tx.sender,
            receptor: &tx.receiver,
        }
    }
}

struct LedgerFormatter;

impl Formatter for LedgerFormatter {
    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }

    fn write_f64<W: ?Sized + Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(float_repr(value).as_bytes())
    }

    // Numbers parsed from the ledger arrive here with their original text.
    fn write_number_str<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        value: &str,
    ) -> io::Result<()> {
        let integer = value
            .strip_prefix('-')
            .unwrap_or(value)
            .bytes()
            .all(|b| b.is_ascii_digit());
        match value.parse::<f64>() {
            Ok(float) if !integer && float.is_finite() => {
                writer.write_all(float_repr(float).as_bytes())
            }
            _ => writer.write_all(value.as_bytes()),
        }
    }
}

/// Shortest round-trip text for `value`, laid out the way the ledger's JSON
/// encoder prints floats: positional for exponents -4..16, otherwise
/// `d.ddde+XX` with a signed exponent of at least two digits.
fn float_repr(value: f64) -> String {
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if !(-4..16).contains(&exponent) {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{lead}{fraction}e{exp_sign}{:02}", exponent.abs());
    }

    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("{sign}0.{zeros}{digits}");
    }

    let point = exponent as usize + 1;
    if digits.len() <= point {
        let zeros = "0".repeat(point - digits.len());
        format!("{sign}{digits}{zeros}.0")
    } else {
        format!("{sign}{}.{}", &digits[..point], &digits[point..])
    }
}

/// The block's `block_string`: what a mining job hands out and what
/// `Block::compute_hash` digests together with the nonce.
pub fn block_payload(block: &Block) -> String {
    let canonical = CanonicalBlock {
        hash_anterior: &block.previous_hash,
        index: block.index,
        minero: &block.miner,
        timestamp: &block.timestamp,
        transacciones: block
            .transactions
            .iter()
            .map(CanonicalTransaction::from)
            .collect(),
    };

    let mut out = Vec::with_capacity(128 + 64 * block.transactions.len());
    let mut ser = Serializer::with_formatter(&mut out, LedgerFormatter);
    canonical
        .serialize(&mut ser)
        .expect("canonical block serializes");
    // every byte written above is ASCII
    String::from_utf8(out).expect("canonical block is ascii")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block {
            index: 3,
            timestamp: Number::from_f64(1_700_000_000.25).expect("finite"),
            transactions: vec![
                Transaction::new("alice", "bob", 5u64),
                Transaction::new("SISTEMA", "miner-é", 1u64),
            ],
            hash: String::new(),
            previous_hash: "prevhash".into(),
            nonce: 42,
            miner: "miner-é".into(),
        }
    }

    #[test]
    fn payload_matches_ledger_text() {
        let expected = concat!(
            r#"{"hash_anterior": "prevhash", "index": 3, "minero": "miner-\u00e9", "#,
            r#""timestamp": 1700000000.25, "transacciones": ["#,
            r#"{"cantidad": 5, "emisor": "alice", "receptor": "bob"}, "#,
            r#"{"cantidad": 1, "emisor": "SISTEMA", "receptor": "miner-\u00e9"}]}"#
        );
        assert_eq!(block_payload(&sample_block()), expected);
    }

    #[test]
    fn empty_genesis_payload() {
        let genesis = Block {
            index: 0,
            timestamp: Number::from_f64(1_700_000_000.0).expect("finite"),
            transactions: vec![],
            hash: String::new(),
            previous_hash: "0".into(),
            nonce: 0,
            miner: "SISTEMA".into(),
        };
        assert_eq!(
            block_payload(&genesis),
            r#"{"hash_anterior": "0", "index": 0, "minero": "SISTEMA", "timestamp": 1700000000.0, "transacciones": []}"#
        );
    }

    #[test]
    fn floats_are_laid_out_like_the_ledger() {
        let cases = [
            (1e-5, "1e-05"),
            (1.5e-7, "1.5e-07"),
            (-2.5e-5, "-2.5e-05"),
            (1e-4, "0.0001"),
            (123.456, "123.456"),
            (1e15, "1000000000000000.0"),
            (1e16, "1e+16"),
            (1.5e16, "1.5e+16"),
            (1e300, "1e+300"),
            (5e-324, "5e-324"),
            (0.0, "0.0"),
            (-0.0, "-0.0"),
        ];
        for (value, expected) in cases {
            assert_eq!(float_repr(value), expected, "{value:?}");
        }
    }

    #[test]
    fn tiny_amount_built_locally_matches_ledger_text() {
        let mut block = sample_block();
        block.transactions = vec![Transaction::new(
            "a",
            "b",
            Number::from_f64(0.00001).expect("finite"),
        )];
        let payload = block_payload(&block);
        assert!(
            payload.contains(r#"[{"cantidad": 1e-05, "emisor": "a", "receptor": "b"}]"#),
            "{payload}"
        );
    }

    #[test]
    fn extreme_amounts_from_the_ledger_keep_their_hash() {
        // block as the ledger serves it, with its hash over nonce 7
        let raw = r#"{"index": 1, "timestamp": 1700000000.5, "transacciones": [
            {"emisor": "a", "receptor": "b", "cantidad": 1e-05},
            {"emisor": "c", "receptor": "d", "cantidad": 1e+16},
            {"emisor": "e", "receptor": "f", "cantidad": 100000000000000000000},
            {"emisor": "g", "receptor": "h", "cantidad": 1.2345678901234568e+17},
            {"emisor": "i", "receptor": "j", "cantidad": 0.0001}],
            "hash_anterior": "0", "minero": "m",
            "hash": "f788d5d20b524476cc2fe4993a42b3994be31cbfec84ca21e52f0bb579a7e495",
            "nonce": 7}"#;
        let block: Block = serde_json::from_str(raw).expect("decode");

        let expected = concat!(
            r#"{"hash_anterior": "0", "index": 1, "minero": "m", "timestamp": 1700000000.5, "#,
            r#""transacciones": [{"cantidad": 1e-05, "emisor": "a", "receptor": "b"}, "#,
            r#"{"cantidad": 1e+16, "emisor": "c", "receptor": "d"}, "#,
            r#"{"cantidad": 100000000000000000000, "emisor": "e", "receptor": "f"}, "#,
            r#"{"cantidad": 1.2345678901234568e+17, "emisor": "g", "receptor": "h"}, "#,
            r#"{"cantidad": 0.0001, "emisor": "i", "receptor": "j"}]}"#
        );
        assert_eq!(block_payload(&block), expected);
        assert!(block.has_valid_hash());
    }

    #[test]
    fn control_and_astral_chars_are_escaped() {
        let mut block = sample_block();
        block.miner = "a\"b\n🦀\u{7f}".into();
        let payload = block_payload(&block);
        assert!(payload.contains(r#""minero": "a\"b\n\ud83e\udd80\u007f""#), "{payload}");
    }
}
