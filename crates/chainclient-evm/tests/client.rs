//! `EvmClient` against a scripted Ethereum node.

use std::sync::Arc;

use alloy_primitives::{Bytes, B256, U256};
use serde_json::{json, Value};

use chainclient_core::testing::{Reply, ScriptedTransport};
use chainclient_core::{
    networks, AccountClient, Address, CallData, CallStage, ChainFamily, ClientError,
    ConfirmationStatus, Context, EvmTx, FeeEstimate, SolanaTx, Tx, TxId,
};
use chainclient_evm::EvmClient;

const HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
const ACCOUNT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

fn tx_id() -> TxId {
    TxId::from_hex(HASH).unwrap()
}

fn tx_json(chain_id: Option<&str>, v: &str, block: Option<&str>) -> Value {
    json!({
        "hash": HASH,
        "nonce": "0x15",
        "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
        "to": "0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb",
        "value": "0xf3dbb76162000",
        "input": "0x68656c6c6f21",
        "blockNumber": block,
        "chainId": chain_id,
        "v": v,
    })
}

fn polygon(t: &Arc<ScriptedTransport>) -> EvmClient {
    EvmClient::new(t.clone(), networks::POLYGON)
}

// ─── Connect ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_verifies_chain_id() {
    let t = Arc::new(ScriptedTransport::new().on("eth_chainId", Reply::result(json!("0x89"))));
    let client = EvmClient::connect(&Context::background(), t.clone(), networks::POLYGON)
        .await
        .unwrap();
    assert_eq!(client.family(), ChainFamily::Evm);

    let err = EvmClient::connect(&Context::background(), t, networks::ETHEREUM)
        .await
        .unwrap_err();
    match err {
        ClientError::ChainMismatch { expected, got } => {
            assert_eq!(expected, "1");
            assert_eq!(got, "137");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn latest_block_parses_hex_quantity() {
    let t = Arc::new(ScriptedTransport::new().on("eth_blockNumber", Reply::result(json!("0x1b4"))));
    assert_eq!(polygon(&t).latest_block(&Context::background()).await.unwrap(), 436);
}

// ─── Tx lookup ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn confirmed_tx_depth() {
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_getTransactionByHash", Reply::result(tx_json(Some("0x89"), "0x1", Some("0x64"))))
            .on(
                "eth_getTransactionReceipt",
                Reply::result(json!({ "blockNumber": "0x64", "status": "0x1" })),
            )
            .on("eth_blockNumber", Reply::result(json!("0x70"))),
    );
    let (tx, depth) = polygon(&t).tx(&Context::background(), &tx_id()).await.unwrap();
    assert_eq!(depth, 12);
    let Tx::Evm(evm) = tx else { panic!("expected an evm tx") };
    assert_eq!(evm.hash, HASH.parse::<B256>().unwrap());
    assert_eq!(evm.nonce, 0x15);
    assert_eq!(evm.chain_id, Some(137));
    assert_eq!(evm.input, Bytes::from(b"hello!".to_vec()));
    assert_eq!(t.requests()[0].params, vec![json!(HASH)]);
}

#[tokio::test]
async fn tx_in_head_block_has_zero_depth() {
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_getTransactionByHash", Reply::result(tx_json(Some("0x89"), "0x0", Some("0x70"))))
            .on(
                "eth_getTransactionReceipt",
                Reply::result(json!({ "blockNumber": "0x70", "status": "0x1" })),
            )
            .on("eth_blockNumber", Reply::result(json!("0x70"))),
    );
    let (_, depth) = polygon(&t).tx(&Context::background(), &tx_id()).await.unwrap();
    assert_eq!(depth, 0);
}

#[tokio::test]
async fn chain_mismatch_is_checked_before_pending() {
    // Pending and bound to Ethereum mainnet: the mismatch wins.
    let t = Arc::new(
        ScriptedTransport::new().on("eth_getTransactionByHash", Reply::result(tx_json(Some("0x1"), "0x1", None))),
    );
    let err = polygon(&t).tx(&Context::background(), &tx_id()).await.unwrap_err();
    assert!(matches!(err, ClientError::ChainMismatch { .. }));
    assert_eq!(t.calls(), vec!["eth_getTransactionByHash"]);
}

#[tokio::test]
async fn legacy_chain_id_comes_from_v() {
    // v = 1 * 2 + 35: signed for Ethereum mainnet.
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_getTransactionByHash", Reply::result(tx_json(None, "0x25", Some("0x64")))),
    );
    let err = polygon(&t).tx(&Context::background(), &tx_id()).await.unwrap_err();
    assert!(matches!(err, ClientError::ChainMismatch { got, .. } if got == "1"));
}

#[tokio::test]
async fn unprotected_legacy_tx_skips_the_check() {
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_getTransactionByHash", Reply::result(tx_json(None, "0x1b", Some("0x64"))))
            .on(
                "eth_getTransactionReceipt",
                Reply::result(json!({ "blockNumber": "0x64", "status": "0x1" })),
            )
            .on("eth_blockNumber", Reply::result(json!("0x65"))),
    );
    let (tx, depth) = polygon(&t).tx(&Context::background(), &tx_id()).await.unwrap();
    assert_eq!(depth, 1);
    assert!(matches!(tx, Tx::Evm(EvmTx { chain_id: None, .. })));
}

#[tokio::test]
async fn mempool_tx_is_pending() {
    let t = Arc::new(
        ScriptedTransport::new().on("eth_getTransactionByHash", Reply::result(tx_json(Some("0x89"), "0x1", None))),
    );
    let c = polygon(&t);
    assert!(c.tx(&Context::background(), &tx_id()).await.unwrap_err().is_pending());
    assert_eq!(
        c.confirmation_status(&Context::background(), &tx_id()).await.unwrap(),
        ConfirmationStatus::Pending
    );
    assert!(!t.calls().contains(&"eth_getTransactionReceipt".to_string()));
}

#[tokio::test]
async fn missing_receipt_is_pending() {
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_getTransactionByHash", Reply::result(tx_json(Some("0x89"), "0x1", Some("0x64"))))
            .on("eth_getTransactionReceipt", Reply::Null),
    );
    let err = polygon(&t).tx(&Context::background(), &tx_id()).await.unwrap_err();
    assert!(err.is_pending());
}

#[tokio::test]
async fn failed_receipt_is_reverted() {
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_getTransactionByHash", Reply::result(tx_json(Some("0x89"), "0x1", Some("0x64"))))
            .on(
                "eth_getTransactionReceipt",
                Reply::result(json!({ "blockNumber": "0x64", "status": "0x0" })),
            ),
    );
    let c = polygon(&t);
    let err = c.tx(&Context::background(), &tx_id()).await.unwrap_err();
    assert!(err.is_reverted());
    assert!(err.to_string().contains(HASH));
    assert_eq!(
        c.confirmation_status(&Context::background(), &tx_id()).await.unwrap(),
        ConfirmationStatus::Reverted
    );
}

#[tokio::test]
async fn unknown_tx_is_an_empty_result() {
    let t = Arc::new(ScriptedTransport::new().on("eth_getTransactionByHash", Reply::Null));
    let err = polygon(&t).tx(&Context::background(), &tx_id()).await.unwrap_err();
    assert!(matches!(err, ClientError::EmptyResult { method } if method == "eth_getTransactionByHash"));
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// Type-2 envelope whose field list holds only chain id 137.
const POLYGON_ENVELOPE: [u8; 4] = [0x02, 0xc2, 0x81, 0x89];

/// Legacy nine-field list signed with v = 37, binding chain id 1.
const MAINNET_LEGACY: [u8; 10] = [0xc9, 0x01, 0x01, 0x01, 0x80, 0x80, 0x80, 0x25, 0x01, 0x01];

#[tokio::test]
async fn submit_sends_the_signed_envelope() {
    let raw = Bytes::from(POLYGON_ENVELOPE.to_vec());
    let tx = EvmTx::from_signed(raw).unwrap();
    assert_eq!(tx.chain_id, Some(137));
    let t = Arc::new(
        ScriptedTransport::new().on("eth_sendRawTransaction", Reply::result(json!(tx.hash.to_string()))),
    );
    polygon(&t).submit_tx(&Context::background(), &Tx::Evm(tx)).await.unwrap();
    assert_eq!(t.requests()[0].params, vec![json!("0x02c28189")]);
}

#[tokio::test]
async fn submit_node_rejection_is_a_broadcast_error() {
    let tx = EvmTx::from_signed(POLYGON_ENVELOPE.to_vec()).unwrap();
    let hash = tx.hash.to_string();
    let t = Arc::new(ScriptedTransport::new().on("eth_sendRawTransaction", Reply::error(-32000, "nonce too low")));
    let err = polygon(&t).submit_tx(&Context::background(), &Tx::Evm(tx)).await.unwrap_err();
    match err {
        ClientError::Broadcast { tx_id, source } => {
            assert_eq!(tx_id, hash);
            assert!(matches!(*source, ClientError::Rpc { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn submit_without_payload_is_invalid() {
    let t = Arc::new(ScriptedTransport::new());
    let err = polygon(&t)
        .submit_tx(&Context::background(), &Tx::Evm(EvmTx::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidTx { .. }));
    assert!(t.calls().is_empty());
}

#[tokio::test]
async fn submit_rejects_foreign_chain_and_family() {
    let t = Arc::new(ScriptedTransport::new());
    let c = polygon(&t);
    let foreign = EvmTx::from_signed(MAINNET_LEGACY.to_vec()).unwrap();
    assert_eq!(foreign.chain_id, Some(1));
    assert!(matches!(
        c.submit_tx(&Context::background(), &Tx::Evm(foreign)).await.unwrap_err(),
        ClientError::ChainMismatch { .. }
    ));

    let solana = Tx::Solana(SolanaTx {
        signature: TxId::new(vec![1; 64]),
        slot: None,
        raw: vec![],
    });
    assert!(matches!(
        c.submit_tx(&Context::background(), &solana).await.unwrap_err(),
        ClientError::TypeMismatch { expected: ChainFamily::Evm, got: ChainFamily::Solana }
    ));
    assert!(t.calls().is_empty());
}

// ─── Account state ────────────────────────────────────────────────────────────

#[tokio::test]
async fn nonce_and_balance() {
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_getTransactionCount", Reply::result(json!("0x2a")))
            .on("eth_getBalance", Reply::result(json!("0xde0b6b3a7640000"))),
    );
    let c = polygon(&t);
    let ctx = Context::background();
    let addr = Address::from(ACCOUNT);
    assert_eq!(c.account_nonce(&ctx, &addr).await.unwrap(), U256::from(42));
    assert_eq!(
        c.account_balance(&ctx, &addr).await.unwrap(),
        U256::from(1_000_000_000_000_000_000u64)
    );
    let requests = t.requests();
    assert_eq!(
        requests[0].params,
        vec![json!(ACCOUNT.to_lowercase()), json!("latest")]
    );
}

#[tokio::test]
async fn invalid_address_never_reaches_the_node() {
    let t = Arc::new(ScriptedTransport::new());
    let c = polygon(&t);
    let err = c
        .account_balance(&Context::background(), &Address::from("0x1234"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidAddress { .. }));
    assert!(t.calls().is_empty());
}

// ─── Fees ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fee_quote_with_priority_tip() {
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_gasPrice", Reply::result(json!("0x6fc23ac00")))
            .on("eth_maxPriorityFeePerGas", Reply::result(json!("0x77359400"))),
    );
    let fee = polygon(&t).estimate_fee(&Context::background()).await.unwrap();
    assert_eq!(fee.price, U256::from(30_000_000_000u64));
    assert_eq!(fee.priority, Some(U256::from(2_000_000_000u64)));
    assert_eq!(t.calls(), vec!["eth_gasPrice", "eth_maxPriorityFeePerGas"]);
}

#[tokio::test]
async fn fee_quote_without_tip_method() {
    // Unscripted methods answer -32601.
    let t = Arc::new(ScriptedTransport::new().on("eth_gasPrice", Reply::result(json!("0x3b9aca00"))));
    let fee = polygon(&t).estimate_fee(&Context::background()).await.unwrap();
    assert_eq!(fee, FeeEstimate::new(U256::from(1_000_000_000u64)));
}

#[tokio::test]
async fn fee_quote_transport_failure_propagates() {
    let t = Arc::new(
        ScriptedTransport::new()
            .on("eth_gasPrice", Reply::result(json!("0x3b9aca00")))
            .on("eth_maxPriorityFeePerGas", Reply::fail("connection reset")),
    );
    let err = polygon(&t).estimate_fee(&Context::background()).await.unwrap_err();
    assert!(err.is_transport());
}

// ─── Contract calls ───────────────────────────────────────────────────────────

#[tokio::test]
async fn direct_call_returns_raw_bytes() {
    let t = Arc::new(ScriptedTransport::new().on(
        "eth_call",
        Reply::result(json!("0x0000000000000000000000000000000000000000000000000000000000000012")),
    ));
    let out = polygon(&t)
        .call_contract(
            &Context::background(),
            &Address::from(ACCOUNT),
            &CallData::new(vec![0x31, 0x3c, 0xe5, 0x67]),
        )
        .await
        .unwrap();
    assert_eq!(out.len(), 32);
    assert_eq!(out[31], 0x12);
    assert_eq!(
        t.requests()[0].params,
        vec![
            json!({ "to": ACCOUNT.to_lowercase(), "data": "0x313ce567" }),
            json!("latest"),
        ]
    );
}

#[tokio::test]
async fn direct_call_stages() {
    let t = Arc::new(ScriptedTransport::new().on("eth_call", Reply::error(3, "execution reverted")));
    let c = polygon(&t);
    let ctx = Context::background();

    let err = c
        .call_contract(&ctx, &Address::from("not-an-address"), &CallData::default())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(CallStage::DecodeAddress));
    assert!(t.calls().is_empty());

    let err = c
        .call_contract(&ctx, &Address::from(ACCOUNT), &CallData::default())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(CallStage::Execute));
}
