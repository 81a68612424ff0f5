//! End-to-end transaction building through the wallet.
//!
//! Covers:
//! - Change allocation, signing and encoding with the standard collaborators
//! - Dust folding and exact fee accounting
//! - Failures before the commit point leave the wallet unchanged
//! - Failures after the commit point leave the change cursor advanced

use std::sync::Arc;

use cairn_core::codec::StandardCodec;
use cairn_core::derivation::Ed25519Provider;
use cairn_core::error::CodecError;
use cairn_tests::helpers::*;
use cairn_wallet::{ChainPurpose, Collaborators, FeeRate, TransactionBuilder, WalletError};

#[tokio::test]
async fn spends_from_both_chains() {
    init_tracing();
    let mut w = wallet(10);
    let recv = w.receive_address().to_string();
    let change = w.change_address().to_string();
    let a = fund(&mut w, &recv, 1, 70_000);
    let b = fund(&mut w, &change, 2, 30_000);

    let mut builder = TransactionBuilder::new(10_000);
    builder
        .add_input(a)
        .add_input(b)
        .add_recipient(foreign_address(1), 25_000)
        .add_recipient(foreign_address(2), 15_000);
    let result = w.build_transaction(&builder).await.unwrap();

    let tx = &result.transaction;
    // 2 inputs, 3 outputs: 10 + 296 + 102 bytes at 10/byte
    assert_eq!(result.fee, 4_080);
    assert_eq!(tx.inputs().len(), 2);
    assert_eq!(tx.outputs().len(), 3);
    assert_eq!(tx.outputs()[0].address, foreign_address(1));
    assert_eq!(tx.outputs()[1].address, foreign_address(2));

    let total_out: u64 = tx.outputs().iter().map(|o| o.value).sum();
    assert_eq!(100_000, total_out + result.fee);

    let codec = StandardCodec::new();
    assert!(codec.verify_input(tx, 0).is_ok());
    assert!(codec.verify_input(tx, 1).is_ok());
    assert_eq!(tx.id().len(), 64);
    assert!(!tx.serialize().is_empty());
}

#[tokio::test]
async fn dust_change_becomes_fee() {
    let mut w = wallet(11);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 50_000 + 2_260 + 300);

    let mut builder = TransactionBuilder::new(5_000);
    builder.add_input(input).add_recipient(foreign_address(3), 50_000);
    let result = w.build_transaction(&builder).await.unwrap();

    assert!(result.change.is_none());
    assert_eq!(result.fee, 2_560);
    assert_eq!(result.transaction.outputs().len(), 1);
    assert_eq!(w.change_chain().k(), 0);
}

#[tokio::test]
async fn insufficient_funds_changes_nothing() {
    let mut w = wallet(12);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 10_000);
    let before = w.export();

    let mut builder = TransactionBuilder::new(5_000);
    builder.add_input(input).add_recipient(foreign_address(4), 9_000);
    let err = w.build_transaction(&builder).await.unwrap_err();

    assert_eq!(err, WalletError::InsufficientFunds { have: 10_000, need: 10_920 });
    assert_eq!(w.export(), before);
}

#[tokio::test]
async fn fee_ceiling_changes_nothing() {
    let mut w = wallet(13);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 100_000);
    let before = w.export();

    let mut builder = TransactionBuilder::new(1_000);
    builder.add_input(input).add_recipient(foreign_address(5), 10_000);
    assert!(matches!(
        w.build_transaction(&builder).await,
        Err(WalletError::FeeTooHigh { fee: 2_260, max: 1_000 })
    ));
    assert_eq!(w.export(), before);
}

#[tokio::test]
async fn unknown_input_changes_nothing() {
    let mut w = wallet(14);
    let before = w.export();
    let stray = utxo(&foreign_address(6), 9, 1_000).outpoint();

    let mut builder = TransactionBuilder::new(1_000);
    builder.add_input(stray.clone()).add_recipient(foreign_address(7), 500);
    assert_eq!(
        w.build_transaction(&builder).await.unwrap_err(),
        WalletError::UnknownInput(stray)
    );
    assert_eq!(w.export(), before);
}

#[tokio::test]
async fn repeated_build_uses_fresh_change() {
    let mut w = wallet(15);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 100_000);

    let mut builder = TransactionBuilder::new(5_000);
    builder.add_input(input).add_recipient(foreign_address(8), 20_000);
    let first = w.build_transaction(&builder).await.unwrap();
    let second = w.build_transaction(&builder).await.unwrap();

    let first_change = first.change.unwrap().address;
    let second_change = second.change.unwrap().address;
    assert_ne!(first_change, second_change);
    assert_eq!(first_change, address_at(&w, ChainPurpose::Change, 1));
    assert_eq!(second_change, address_at(&w, ChainPurpose::Change, 2));
    assert_ne!(first.transaction.id(), second.transaction.id());
}

#[tokio::test]
async fn recipient_on_reserved_change_slot_is_allowed() {
    init_tracing();
    let mut w = wallet(16);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 100_000);
    let reserved = address_at(&w, ChainPurpose::Change, 1);

    let mut builder = TransactionBuilder::new(5_000);
    builder.add_input(input).add_recipient(reserved.clone(), 20_000);
    let result = w.build_transaction(&builder).await.unwrap();

    assert_eq!(result.change.unwrap().address, reserved);
}

#[tokio::test]
async fn custom_fee_rate() {
    let mut w = wallet(17);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 100_000);

    let mut builder = TransactionBuilder::new(1_000);
    builder
        .add_input(input)
        .add_recipient(foreign_address(9), 20_000)
        .set_fee_rate(FeeRate::per_byte(2))
        .set_lock_time(800_000);
    let result = w.build_transaction(&builder).await.unwrap();

    assert_eq!(result.fee, 452);
    assert_eq!(result.transaction.lock_time(), 800_000);
}

#[tokio::test]
async fn encoder_failure_after_change_allocation() {
    let collaborators = Collaborators {
        provider: Arc::new(Ed25519Provider::new(NETWORK)),
        codec: Arc::new(FailingEncoder),
    };
    let mut w = wallet_with(18, collaborators);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 100_000);

    let mut builder = TransactionBuilder::new(5_000);
    builder.add_input(input).add_recipient(foreign_address(10), 20_000);
    let err = w.build_transaction(&builder).await.unwrap_err();

    assert_eq!(err, WalletError::Codec(CodecError::Serialization("encoder offline".into())));
    assert_eq!(w.change_chain().k(), 1);
}

#[tokio::test]
async fn signer_failure_after_change_allocation() {
    let collaborators = Collaborators {
        provider: Arc::new(FailingSigner::new(Arc::new(Ed25519Provider::new(NETWORK)))),
        codec: Arc::new(StandardCodec::new()),
    };
    let mut w = wallet_with(19, collaborators);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 100_000);

    let mut builder = TransactionBuilder::new(5_000);
    builder.add_input(input).add_recipient(foreign_address(11), 20_000);
    assert!(matches!(
        w.build_transaction(&builder).await,
        Err(WalletError::Codec(CodecError::Signing { .. }))
    ));
    assert_eq!(w.change_chain().k(), 1);
}

#[tokio::test]
async fn signer_failure_without_change_leaves_cursor() {
    let collaborators = Collaborators {
        provider: Arc::new(FailingSigner::new(Arc::new(Ed25519Provider::new(NETWORK)))),
        codec: Arc::new(StandardCodec::new()),
    };
    let mut w = wallet_with(20, collaborators);
    let recv = w.receive_address().to_string();
    let input = fund(&mut w, &recv, 1, 20_000 + 1_920);

    let mut builder = TransactionBuilder::new(5_000);
    builder.add_input(input).add_recipient(foreign_address(12), 20_000);
    assert!(w.build_transaction(&builder).await.is_err());
    assert_eq!(w.change_chain().k(), 0);
}
