//! Fuzz target for BoardDriver under storage failures
//!
//! Drives arbitrary command sequences through a driver whose storage fails
//! at random.
//!
//! # Invariants
//!
//! - The driver NEVER panics on storage errors
//! - Every command gets exactly one response naming it
//! - The board only contains threads whose post was acknowledged

#![no_main]

use arbitrary::Arbitrary;
use argon2::Params;
use libfuzzer_sys::fuzz_target;
use limbo_harness::SimEnv;
use limbo_proto::{
    Command, GetCommand, ListCommand, LoginCommand, PostCommand, RegisterCommand, ReplyCommand,
    Response,
};
use limbo_server::{
    Argon2Hasher, BoardConfig, BoardDriver, ChaoticStorage, MemoryStorage, Session,
};

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Register { user: u8 },
    Login { user: u8 },
    Logout,
    Post { title: String },
    Reply { thread: u8, body: String },
    Get { thread: u8, token: Option<String> },
    List { query: Option<String>, token: Option<String> },
}

#[derive(Debug, Arbitrary)]
struct Scenario {
    chaos_seed: u64,
    /// Failure rate 0-9 maps to 0%-90%
    failure_rate: u8,
    ops: Vec<Op>,
}

fuzz_target!(|scenario: Scenario| {
    let rate = f64::from(scenario.failure_rate % 10) / 10.0;
    let storage = ChaoticStorage::with_seed(MemoryStorage::new(), rate, scenario.chaos_seed);
    let hasher = Argon2Hasher::with_params(Params::new(8, 1, 1, None).unwrap());
    let env = SimEnv::with_seed(scenario.chaos_seed);
    let driver = BoardDriver::new(env, storage, hasher, BoardConfig::default());

    let mut session = Session::Anonymous;
    let mut threads: Vec<String> = Vec::new();

    for op in scenario.ops.into_iter().take(64) {
        let pick = |n: u8| threads.get(usize::from(n) % threads.len().max(1)).cloned();
        let command = match op {
            Op::Register { user } => Command::Register(RegisterCommand {
                username: format!("user{}", user % 4),
                password: "secret".to_string(),
            }),
            Op::Login { user } => Command::Login(LoginCommand {
                username: format!("user{}", user % 4),
                password: "secret".to_string(),
                version: None,
            }),
            Op::Logout => Command::Logout,
            Op::Post { title } => Command::Post(PostCommand {
                title,
                body: String::new(),
                format: None,
                tags: Vec::new(),
            }),
            Op::Reply { thread, body } => Command::Reply(ReplyCommand {
                to: pick(thread).unwrap_or_default(),
                body,
                format: None,
            }),
            Op::Get { thread, token } => Command::Get(GetCommand {
                id: pick(thread).unwrap_or_default(),
                range: None,
                token,
                format: None,
            }),
            Op::List { query, token } => {
                Command::List(ListCommand { kind: "thread".to_string(), query, token })
            },
        };

        let name = command.name();
        let response = driver.handle(&mut session, command);
        match response {
            Response::Ok(ok) => {
                assert_eq!(ok.wrt, name);
                if let Some(id) = ok.result {
                    threads.push(id);
                }
            },
            Response::Error(err) => assert_eq!(err.wrt, name),
            Response::Hello(_) | Response::Msg(_) | Response::List(_) => {},
        }
    }

    assert_eq!(driver.storage().inner().thread_count().unwrap(), threads.len());
});
