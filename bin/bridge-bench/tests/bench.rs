//! Benchmark plans run against an in-memory chain.

use std::path::Path;

use alloy_primitives::{address, keccak256, Address, B256, U256};
use bridge_bench::{
    bench::{run_plan, BenchPlan},
    common::BenchError,
    deploy, status, view,
};
use evm_bridge::{
    constants::TGAS,
    test_utils::{failure_outcome, function_calls, success_outcome, MockChain},
    AccountId, BridgeConfig, BridgeError, CallContractArgs, EvmBridge, InMemoryKeySource,
    MergeKeySource, Network, SigningKey,
};

const ZOMBIES: Address = address!("9ecae05be9e959360223bc631f99f14e07758df5");

const ZOMBIE_ABI: &str = r#"[
    {
        "type": "function",
        "name": "createRandomZombie",
        "inputs": [{ "name": "_name", "type": "string" }],
        "outputs": [],
        "stateMutability": "nonpayable"
    }
]"#;

fn alice() -> AccountId {
    "alice".parse().unwrap()
}

fn bridge(chain: MockChain) -> EvmBridge<MockChain> {
    let keys = MergeKeySource::default()
        .with_source(InMemoryKeySource::new().with_key(alice(), SigningKey::from_seed("alice")));
    let mut config = BridgeConfig::for_network(Network::Local).unwrap().with_signer(alice());
    config.key_dir = None;
    EvmBridge::new(chain, keys, config)
}

fn write_plan(dir: &Path, plan: &str) -> std::path::PathBuf {
    std::fs::write(dir.join("zombieAttack.bin"), "0x6080604052\n").unwrap();
    std::fs::write(dir.join("zombieAttack.abi"), ZOMBIE_ABI).unwrap();
    let path = dir.join("plan.json");
    std::fs::write(&path, plan).unwrap();
    path
}

const ZOMBIE_PLAN: &str = r#"{
    "bytecode": "zombieAttack.bin",
    "abi": "zombieAttack.abi",
    "calls": [
        { "name": "Create Random Zombie", "method": "createRandomZombie", "args": ["blah"] }
    ]
}"#;

#[test]
fn test_plan_paths_are_relative_to_plan_file() {
    let dir = tempfile::tempdir().unwrap();
    let plan = BenchPlan::load(write_plan(dir.path(), ZOMBIE_PLAN)).unwrap();

    assert_eq!(plan.bytecode, dir.path().join("zombieAttack.bin"));
    assert_eq!(plan.abi, Some(dir.path().join("zombieAttack.abi")));
    assert_eq!(plan.calls[0].args, ["blah"]);
    assert_eq!(plan.calls[0].value, U256::ZERO);
    assert_eq!(plan.calls[0].from, None);
}

#[test]
fn test_plan_rejects_unknown_fields() {
    let err = BenchPlan::from_json(r#"{ "bytecode": "a.bin", "gas": 1 }"#).unwrap_err();
    assert!(matches!(err, BenchError::InvalidPlan(_)));
}

#[test]
fn test_plan_call_options() {
    let plan = BenchPlan::from_json(
        r#"{
            "bytecode": "a.bin",
            "calls": [{ "name": "Pay", "method": "pay", "value": "1000", "from": "bob" }]
        }"#,
    )
    .unwrap();
    assert_eq!(plan.calls[0].value, U256::from(1000));
    assert_eq!(plan.calls[0].from.as_ref().map(AccountId::as_str), Some("bob"));
    assert!(plan.calls[0].args.is_empty());
}

#[tokio::test]
async fn test_zombie_benchmark() {
    let dir = tempfile::tempdir().unwrap();
    let plan = BenchPlan::load(write_plan(dir.path(), ZOMBIE_PLAN)).unwrap();
    let chain = MockChain::new()
        .outcome(success_outcome(ZOMBIES.as_slice(), 2_400_000_000_000, 300_000_000_000))
        .outcome(success_outcome(&[], 2 * TGAS, TGAS));
    let bridge = bridge(chain);

    let report = run_plan(&bridge, &plan).await.unwrap();
    assert_eq!(report.contract, ZOMBIES);
    let lines: Vec<String> = report.results.iter().map(ToString::to_string).collect();
    assert_eq!(lines, ["Deploy Contract: 2.7 Tgas", "Create Random Zombie: 3 Tgas"]);

    let submitted = bridge.chain().submitted();
    assert_eq!(submitted.len(), 2);
    let calls = function_calls(&submitted[1]);
    assert_eq!(calls[0].0, "call_contract");
    let args: CallContractArgs = serde_json::from_slice(calls[0].1).unwrap();
    assert_eq!(args.contract_address, ZOMBIES);
    assert_eq!(args.encoded_input[..4], keccak256("createRandomZombie(string)")[..4]);
}

#[tokio::test]
async fn test_benchmark_halts_on_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let plan = r#"{
        "bytecode": "zombieAttack.bin",
        "abi": "zombieAttack.abi",
        "calls": [
            { "name": "First", "method": "createRandomZombie", "args": ["a"] },
            { "name": "Second", "method": "createRandomZombie", "args": ["b"] }
        ]
    }"#;
    let plan = BenchPlan::load(write_plan(dir.path(), plan)).unwrap();
    let chain = MockChain::new()
        .outcome(success_outcome(ZOMBIES.as_slice(), TGAS, TGAS))
        .outcome(failure_outcome("revert: zombie exists", TGAS, TGAS));
    let bridge = bridge(chain);

    let err = run_plan(&bridge, &plan).await.unwrap_err();
    assert!(matches!(
        err,
        BenchError::Bridge(BridgeError::ExecutionReverted(reason)) if reason == "revert: zombie exists"
    ));
    assert_eq!(bridge.chain().submitted().len(), 2);
}

#[tokio::test]
async fn test_calls_without_abi_are_rejected_before_deploying() {
    let plan = BenchPlan::from_json(
        r#"{ "bytecode": "a.bin", "calls": [{ "name": "Call", "method": "f" }] }"#,
    )
    .unwrap();
    let bridge = bridge(MockChain::new());

    let err = run_plan(&bridge, &plan).await.unwrap_err();
    assert!(matches!(err, BenchError::InvalidInput(_)));
    assert!(bridge.chain().submitted().is_empty());
}

#[tokio::test]
async fn test_deploy_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zombieAttack.bin");
    std::fs::write(&path, "6080604052").unwrap();
    let bridge = bridge(MockChain::new().outcome(success_outcome(ZOMBIES.as_slice(), TGAS, TGAS)));

    let deployment = deploy::Cmd { bytecode: path }.run(&bridge).await.unwrap();
    assert_eq!(deployment.address, ZOMBIES);
    assert_eq!(deployment.gas.to_string(), "2");
}

#[tokio::test]
async fn test_deploy_command_rejects_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.bin");
    std::fs::write(&path, "\n").unwrap();
    let bridge = bridge(MockChain::new());

    let err = deploy::Cmd { bytecode: path }.run(&bridge).await.unwrap_err();
    assert!(matches!(err, BenchError::InvalidInput(_)));
}

#[tokio::test]
async fn test_view_balance_command() {
    let chain = MockChain::new();
    let mut balance = [0u8; 32];
    balance[31] = 100;
    chain.set_view_result("get_balance", balance);
    let bridge = bridge(chain);

    let cmd = view::Cmd { query: view::Query::Balance { address: ZOMBIES } };
    assert_eq!(cmd.run(&bridge).await.unwrap(), "100");
}

#[tokio::test]
async fn test_view_storage_command() {
    let chain = MockChain::new();
    chain.set_view_result("get_storage_at", B256::with_last_byte(0x2a).as_slice());
    let bridge = bridge(chain);

    let cmd =
        view::Cmd { query: view::Query::Storage { address: ZOMBIES, key: B256::with_last_byte(1) } };
    assert_eq!(
        cmd.run(&bridge).await.unwrap(),
        "0x000000000000000000000000000000000000000000000000000000000000002a"
    );
}

#[tokio::test]
async fn test_status_command() {
    let bridge = bridge(MockChain::new().outcome(success_outcome(b"ok", TGAS, TGAS)));
    let output = bridge.call_contract(ZOMBIES, Default::default(), U256::ZERO, &alice()).await.unwrap();

    let pending = status::Cmd { tx_hash: output.tx_hash, sender: None }.run(&bridge).await.unwrap();
    assert!(pending.is_none());

    bridge.chain().set_status(output.tx_hash, success_outcome(b"ok", TGAS, TGAS));
    let outcome =
        status::Cmd { tx_hash: output.tx_hash, sender: None }.run(&bridge).await.unwrap().unwrap();
    let rendered = status::render(&outcome);
    assert!(rendered.starts_with("status: success"));
    assert!(rendered.contains("gas: 2 Tgas"));
}
