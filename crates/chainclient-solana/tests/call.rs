//! The decode-derive-fetch-decode pipeline, one failing stage at a time.

use std::sync::Arc;

use alloy_primitives::U256;
use serde_json::json;

use chainclient_core::testing::{Reply, ScriptedTransport};
use chainclient_core::{networks, AccountClient, Address, CallData, CallStage, ClientError, Context};
use chainclient_solana::address::PUBKEY_LEN;
use chainclient_solana::{
    find_program_address, AccountStateCall, Base58Codec, DeriveError, NonceInput,
    ProgramAddressDeriver, SolanaClient,
};

const PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

fn calldata(nonce: u64) -> CallData {
    NonceInput::new(U256::from(nonce)).to_calldata().unwrap()
}

fn client(t: &Arc<ScriptedTransport>) -> SolanaClient {
    SolanaClient::new(t.clone(), networks::SOLANA_LOCALNET)
}

fn account_info(data: serde_json::Value) -> Reply {
    Reply::result(json!({
        "context": { "slot": 1 },
        "value": {
            "data": data,
            "executable": false,
            "lamports": 1_000_000,
            "owner": PROGRAM,
            "rentEpoch": 0,
        }
    }))
}

async fn stage_of(t: &Arc<ScriptedTransport>, target: &str, data: CallData) -> Option<CallStage> {
    client(t)
        .call_contract(&Context::background(), &Address::from(target), &data)
        .await
        .unwrap_err()
        .stage()
}

#[tokio::test]
async fn passes_all_stages() {
    let state = vec![0xca, 0xfe, 0x00, 0x01];
    let t = Arc::new(ScriptedTransport::new().on(
        "getAccountInfo",
        account_info(json!([bs58::encode(&state).into_string(), "base58"])),
    ));
    let out = client(&t)
        .call_contract(&Context::background(), &Address::from(PROGRAM), &calldata(42))
        .await
        .unwrap();
    assert_eq!(out, state);

    let program = Base58Codec.decode_key(&PROGRAM.into()).unwrap();
    let seed = U256::from(42u64).to_be_bytes::<32>();
    let (expected, _) = find_program_address(&[&seed], &program).unwrap();
    let params = &t.requests()[0].params;
    assert_eq!(params[0], json!(Base58Codec.encode_key(&expected).as_str()));
    assert_eq!(params[1]["encoding"], json!("base58"));
}

#[tokio::test]
async fn legacy_bare_string_data_is_accepted() {
    let t = Arc::new(ScriptedTransport::new().on("getAccountInfo", account_info(json!("2g"))));
    let out = client(&t)
        .call_contract(&Context::background(), &Address::from(PROGRAM), &calldata(1))
        .await
        .unwrap();
    assert_eq!(out, vec![0x61]);
}

#[tokio::test]
async fn malformed_calldata_fails_first() {
    let t = Arc::new(ScriptedTransport::new());
    let stage = stage_of(&t, PROGRAM, CallData::new(vec![1, 2, 3])).await;
    assert_eq!(stage, Some(CallStage::DeserializeCalldata));
    // Trailing bytes are rejected too.
    let mut long = calldata(1).as_bytes().to_vec();
    long.push(0);
    assert_eq!(stage_of(&t, PROGRAM, CallData::new(long)).await, Some(CallStage::DeserializeCalldata));
    assert!(t.calls().is_empty());
}

#[tokio::test]
async fn invalid_program_address() {
    let t = Arc::new(ScriptedTransport::new());
    assert_eq!(stage_of(&t, "0xdeadbeef", calldata(1)).await, Some(CallStage::DecodeAddress));
    assert_eq!(stage_of(&t, "1111", calldata(1)).await, Some(CallStage::DecodeAddress));
    assert!(t.calls().is_empty());
}

struct NoAccount;

impl ProgramAddressDeriver for NoAccount {
    fn derive(
        &self,
        _seeds: &[&[u8]],
        _program: &[u8; PUBKEY_LEN],
    ) -> Result<([u8; PUBKEY_LEN], u8), DeriveError> {
        Err(DeriveError::NoViableBump)
    }
}

#[tokio::test]
async fn derivation_failure() {
    let t = Arc::new(ScriptedTransport::new());
    let caller = AccountStateCall::new("confirmed").with_deriver(Arc::new(NoAccount));
    let err = client(&t)
        .with_caller(Arc::new(caller))
        .call_contract(&Context::background(), &Address::from(PROGRAM), &calldata(1))
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(CallStage::DeriveAccount));
    assert!(t.calls().is_empty());
}

#[tokio::test]
async fn unreachable_endpoint() {
    let t = Arc::new(ScriptedTransport::new().on("getAccountInfo", Reply::fail("connection refused")));
    let err = client(&t)
        .call_contract(&Context::background(), &Address::from(PROGRAM), &calldata(1))
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(CallStage::FetchState));
    match err {
        ClientError::Call { source, .. } => assert!(source.is_transport()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn node_error_is_a_fetch_failure() {
    let t = Arc::new(ScriptedTransport::new().on("getAccountInfo", Reply::error(-32602, "Invalid param")));
    assert_eq!(stage_of(&t, PROGRAM, calldata(1)).await, Some(CallStage::FetchState));
}

#[tokio::test]
async fn malformed_state_payloads() {
    let cases = [
        account_info(json!("0OIl")),
        account_info(json!(["YWJj", "base64"])),
        account_info(json!(42)),
        Reply::result(json!({ "context": { "slot": 1 }, "value": null })),
        Reply::result(json!("unexpected")),
    ];
    for reply in cases {
        let t = Arc::new(ScriptedTransport::new().on("getAccountInfo", reply));
        assert_eq!(stage_of(&t, PROGRAM, calldata(1)).await, Some(CallStage::DecodeResponse));
    }
}

#[tokio::test]
async fn cancellation_is_not_stage_tagged() {
    let t = Arc::new(ScriptedTransport::new().on("getAccountInfo", Reply::Hang));
    let ctx = Context::with_timeout(std::time::Duration::from_millis(20));
    let err = client(&t)
        .call_contract(&ctx, &Address::from(PROGRAM), &calldata(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::DeadlineExceeded));
    assert_eq!(err.stage(), None);
}
