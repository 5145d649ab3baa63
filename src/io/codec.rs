//! Wire format handling
//!
//! Transactions arrive as one JSON document per UDP datagram. Decoding is
//! strict: a `change` must be a bare integer or a well-formed account
//! reference (see [`crate::types::Change`]).

use crate::types::{LedgerError, Transaction};

/// Largest datagram the listener reads; longer payloads are truncated and
/// fail to decode
pub const MAX_DATAGRAM_SIZE: usize = 1000;

/// Whether a read of `len` bytes filled the receive buffer, so the sender's
/// payload may have been cut short
pub fn may_be_truncated(len: usize) -> bool {
    len >= MAX_DATAGRAM_SIZE
}

/// Decode one datagram payload into a transaction
pub fn decode_transaction(payload: &[u8]) -> Result<Transaction, LedgerError> {
    serde_json::from_slice(payload).map_err(LedgerError::from)
}

/// Encode a transaction the way clients send it
pub fn encode_transaction(tx: &Transaction) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(tx).map_err(|e| LedgerError::Decode {
        message: format!("failed to encode transaction: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Change, Fee, Instruction, Sign};
    use rstest::rstest;

    #[test]
    fn test_decode_valid_payload() {
        let payload = br#"{"fee":{"payer":"alice","amount":1},"instructions":[{"account":"alice","change":-10},{"account":"bob","change":{"account":"alice","sign":"minus"}}]}"#;

        let tx = decode_transaction(payload).unwrap();

        assert_eq!(tx.fee, Fee::new("alice", 1));
        assert_eq!(tx.instructions[0].change, Change::Direct(-10));
        assert_eq!(tx.instructions[1].change, Change::reference("alice", Sign::Minus));
    }

    #[rstest]
    #[case::not_json(b"hello".as_slice())]
    #[case::empty(b"".as_slice())]
    #[case::missing_fee(br#"{"instructions":[]}"#.as_slice())]
    #[case::bad_sign(br#"{"fee":{"payer":"a","amount":1},"instructions":[{"account":"b","change":{"account":"c","sign":"up"}}]}"#.as_slice())]
    #[case::string_change(br#"{"fee":{"payer":"a","amount":1},"instructions":[{"account":"b","change":"5"}]}"#.as_slice())]
    #[case::truncated(br#"{"fee":{"payer":"a","amount":1},"instr"#.as_slice())]
    fn test_decode_rejects(#[case] payload: &[u8]) {
        assert!(matches!(
            decode_transaction(payload),
            Err(LedgerError::Decode { .. })
        ));
    }

    #[rstest]
    #[case::empty(0, false)]
    #[case::below_limit(MAX_DATAGRAM_SIZE - 1, false)]
    #[case::buffer_full(MAX_DATAGRAM_SIZE, true)]
    fn test_may_be_truncated(#[case] len: usize, #[case] expected: bool) {
        assert_eq!(may_be_truncated(len), expected);
    }

    #[test]
    fn test_encoded_transaction_decodes_back() {
        let tx = Transaction::new(
            Fee::new("alice", 2),
            vec![
                Instruction::direct("alice", -3),
                Instruction::reference("bob", "carol", Sign::Plus),
            ],
        );

        let payload = encode_transaction(&tx).unwrap();

        assert!(payload.len() <= MAX_DATAGRAM_SIZE);
        assert_eq!(decode_transaction(&payload).unwrap(), tx);
    }
}
