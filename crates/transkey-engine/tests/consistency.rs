//! Property test: host registrations always mirror the enabled bindings,
//! whatever sequence of operations and host failures occurs.

use proptest::prelude::*;
use settings_store::{Action, MemoryStorage};
use tokio::runtime::Builder;
use transkey_engine::test_support::{FakeHost, TestHub, test_hub};

#[derive(Debug, Clone)]
enum Op {
    Enable(Action, Option<&'static str>),
    Disable(Action, Option<&'static str>),
    Rebind(Action, &'static str),
    FailRegister(bool),
    FailUnregister(bool),
    FailQuery(bool),
}

/// `ALT+R` is always refused by the host; `BAD+` never parses.
const COMBOS: &[&str] = &["ALT+X", "ALT+C", "ctrl+alt+k", "ALT+R", "BAD+"];

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![Just(Action::Select), Just(Action::Clip)]
}

fn combo() -> impl Strategy<Value = &'static str> {
    prop::sample::select(COMBOS)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (action(), prop::option::of(combo())).prop_map(|(a, c)| Op::Enable(a, c)),
        3 => (action(), prop::option::of(combo())).prop_map(|(a, c)| Op::Disable(a, c)),
        3 => (action(), combo()).prop_map(|(a, c)| Op::Rebind(a, c)),
        1 => any::<bool>().prop_map(Op::FailRegister),
        1 => any::<bool>().prop_map(Op::FailUnregister),
        1 => any::<bool>().prop_map(Op::FailQuery),
    ]
}

async fn apply(t: &TestHub, op: &Op) {
    match *op {
        Op::Enable(a, c) => {
            t.hub.enable_hotkey(a, c).await;
        }
        Op::Disable(a, c) => {
            t.hub.disable_hotkey(a, c).await;
        }
        Op::Rebind(a, c) => {
            t.hub.rebind_hotkey(a, c).await;
        }
        Op::FailRegister(f) => t.host.set_fail_register(f),
        Op::FailUnregister(f) => t.host.set_fail_unregister(f),
        Op::FailQuery(f) => t.host.set_fail_query(f),
    }
}

fn check(t: &TestHub) -> Result<(), TestCaseError> {
    let doc = t.hub.settings();
    let mut enabled: Vec<String> = doc
        .hotkeys
        .iter()
        .filter(|b| b.enabled)
        .map(|b| b.combo.clone())
        .collect();
    let mut registered = t.host.registered_combos();
    enabled.sort();
    registered.sort();
    prop_assert_eq!(registered, enabled);
    prop_assert_eq!(t.storage.stored().unwrap_or_else(|| doc.clone()), doc);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn registrations_match_enabled_bindings(ops in prop::collection::vec(op(), 1..24)) {
        let rt = Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let host = FakeHost::new();
            host.reject("ALT+R");
            let t = test_hub(host, MemoryStorage::new()).await;
            for op in &ops {
                apply(&t, op).await;
                check(&t)?;
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
