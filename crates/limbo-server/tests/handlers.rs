//! End-to-end command handler scenarios on simulated time.

use argon2::Params;
use chrono::TimeDelta;
use limbo_core::{Environment, Thread, ThreadId, User};
use limbo_harness::SimEnv;
use limbo_proto::{
    Command, GetCommand, ListCommand, LoginCommand, PostCommand, Range, RegisterCommand,
    ReplyCommand, Response,
};
use limbo_server::{
    Argon2Hasher, BoardConfig, BoardDriver, CommandError, MemoryStorage, PasswordHasher, Session,
    Storage,
};

type Driver = BoardDriver<SimEnv, MemoryStorage, Argon2Hasher>;

fn hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(Params::new(8, 1, 1, None).unwrap())
}

fn setup() -> (Driver, SimEnv) {
    let env = SimEnv::with_seed(1);
    let driver =
        BoardDriver::new(env.clone(), MemoryStorage::new(), hasher(), BoardConfig::default());
    (driver, env)
}

fn register(driver: &Driver, name: &str, password: &str) -> Result<(), CommandError> {
    driver.register(&RegisterCommand { username: name.to_string(), password: password.to_string() })
}

fn logged_in(driver: &Driver, name: &str) -> Session {
    register(driver, name, "password").unwrap();
    let mut session = Session::Anonymous;
    let cmd = LoginCommand {
        username: name.to_string(),
        password: "password".to_string(),
        version: None,
    };
    driver.log_in(&mut session, &cmd).unwrap();
    session
}

fn post(driver: &Driver, session: &Session, title: &str, tags: &[&str]) -> ThreadId {
    let cmd = PostCommand {
        title: title.to_string(),
        body: format!("{title} body"),
        format: None,
        tags: tags.iter().map(ToString::to_string).collect(),
    };
    driver.post(session, &cmd).unwrap()
}

fn reply(driver: &Driver, session: &Session, to: ThreadId, body: &str) -> Result<(), CommandError> {
    let cmd = ReplyCommand { to: to.to_string(), body: body.to_string(), format: None };
    driver.reply(session, &cmd)
}

fn get(
    driver: &Driver,
    id: &str,
    token: Option<&str>,
) -> Result<limbo_proto::ThreadMessage, CommandError> {
    driver.get(&GetCommand {
        id: id.to_string(),
        range: None,
        token: token.map(String::from),
        format: None,
    })
}

fn list(driver: &Driver, query: Option<&str>, token: Option<&str>) -> limbo_proto::ListMessage {
    let cmd = ListCommand {
        kind: "thread".to_string(),
        query: query.map(String::from),
        token: token.map(String::from),
    };
    driver.list(&cmd).unwrap()
}

#[test]
fn username_taken_case_insensitively() {
    let (driver, _) = setup();
    assert_eq!(register(&driver, "Alice", "secret"), Ok(()));
    assert_eq!(register(&driver, "alice", "other"), Err(CommandError::UsernameTaken));
    assert_eq!(register(&driver, "ALICE", "other"), Err(CommandError::UsernameTaken));
}

#[test]
fn login_failures_leave_session_unchanged() {
    let (driver, _) = setup();
    register(&driver, "alice", "secret").unwrap();

    let mut session = Session::Anonymous;
    for (name, password) in [("alice", "wrong"), ("nobody", "secret")] {
        let cmd = LoginCommand {
            username: name.to_string(),
            password: password.to_string(),
            version: None,
        };
        assert_eq!(driver.log_in(&mut session, &cmd), Err(CommandError::LoginFailed));
        assert_eq!(session, Session::Anonymous);
    }

    let bob = logged_in(&driver, "bob");
    let mut session = bob.clone();
    let cmd = LoginCommand {
        username: "alice".to_string(),
        password: "wrong".to_string(),
        version: None,
    };
    assert!(driver.log_in(&mut session, &cmd).is_err());
    assert_eq!(session, bob);
}

#[test]
fn login_is_case_insensitive_and_keeps_display_name() {
    let (driver, _) = setup();
    register(&driver, "MixedCase", "secret").unwrap();

    let mut session = Session::Anonymous;
    let cmd = LoginCommand {
        username: "mixedcase".to_string(),
        password: "secret".to_string(),
        version: Some(0),
    };
    driver.log_in(&mut session, &cmd).unwrap();
    assert_eq!(session.user().unwrap().name, "MixedCase");
}

#[test]
fn logout_returns_to_anonymous() {
    let (driver, _) = setup();
    let mut session = logged_in(&driver, "alice");
    assert_eq!(driver.handle(&mut session, Command::Logout), Response::ok("logout"));
    assert_eq!(session, Session::Anonymous);
}

#[test]
fn posting_needs_login_and_title() {
    let (driver, _) = setup();
    let cmd = PostCommand {
        title: "hi".to_string(),
        body: String::new(),
        format: None,
        tags: Vec::new(),
    };
    assert_eq!(driver.post(&Session::Anonymous, &cmd), Err(CommandError::AuthRequired));

    let session = logged_in(&driver, "alice");
    let blank = PostCommand { title: "  ".to_string(), ..cmd };
    assert_eq!(driver.post(&session, &blank), Err(CommandError::TitleRequired));
    assert_eq!(driver.storage().thread_count().unwrap(), 0);
}

#[test]
fn post_returns_id_and_thread_is_readable() {
    let (driver, _) = setup();
    let mut session = logged_in(&driver, "alice");

    let response = driver.handle(
        &mut session,
        Command::Post(PostCommand {
            title: "Hello".to_string(),
            body: "first".to_string(),
            format: None,
            tags: vec!["music".to_string(), "art".to_string()],
        }),
    );
    let Response::Ok(ok) = response else { panic!("expected ok, got {response:?}") };
    assert_eq!(ok.wrt, "post");
    let id = ok.result.unwrap();
    assert_eq!(id.len(), 24);

    let view = get(&driver, &id, None).unwrap();
    assert_eq!(view.title, "Hello");
    assert_eq!(view.tags, vec!["music", "art"]);
    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages[0].user, "alice");
    assert_eq!(view.messages[0].id, format!("{id}:1"));
    assert_eq!(view.messages[0].date, "2014-05-13T16:53:20Z");
    assert!(!view.more);
}

#[test]
fn get_rejects_bad_and_missing_ids() {
    let (driver, _) = setup();
    assert_eq!(get(&driver, "xyz", None), Err(CommandError::InvalidThreadId));

    let missing = "000000000000000000000000";
    assert_eq!(get(&driver, missing, None), Err(CommandError::ThreadNotFound(missing.to_string())));
}

#[test]
fn reply_appends_and_bumps_listing() {
    let (driver, env) = setup();
    let alice = logged_in(&driver, "alice");
    let bob = logged_in(&driver, "bob");

    let first = post(&driver, &alice, "first", &[]);
    env.advance(TimeDelta::seconds(10));
    let second = post(&driver, &alice, "second", &[]);
    env.advance(TimeDelta::seconds(10));

    reply(&driver, &bob, first, "bump").unwrap();

    let page = list(&driver, None, None);
    let ids: Vec<&str> = page.threads.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![first.to_string(), second.to_string()]);
    assert_eq!(page.threads[0].posts, 2);

    let view = get(&driver, &first.to_string(), None).unwrap();
    assert_eq!(view.messages[1].user, "bob");
    assert_eq!(view.messages[1].body, "bump");
}

#[test]
fn reply_errors() {
    let (driver, _) = setup();
    let alice = logged_in(&driver, "alice");
    let id = post(&driver, &alice, "t", &[]);

    assert_eq!(reply(&driver, &Session::Anonymous, id, "x"), Err(CommandError::AuthRequired));
    let cmd = ReplyCommand { to: "bad".to_string(), body: String::new(), format: None };
    assert_eq!(driver.reply(&alice, &cmd), Err(CommandError::InvalidThreadId));
    assert!(matches!(
        reply(&driver, &alice, ThreadId::MIN, "x"),
        Err(CommandError::ThreadNotFound(_))
    ));
}

#[test]
fn closed_thread_accepts_only_admin_replies() {
    let (driver, env) = setup();
    let storage = driver.storage();

    let mut thread = Thread::new(
        ThreadId::from_bytes([9; 12]),
        "Announcements".to_string(),
        "mod".to_string(),
        "read only".to_string(),
        Vec::new(),
        env.now(),
    );
    thread.closed = true;
    storage.insert_thread(&thread).unwrap();

    let mut admin = User::new("mod", hasher().hash("password").unwrap(), env.now());
    admin.admin = true;
    storage.insert_user(&admin).unwrap();

    let user = logged_in(&driver, "alice");
    assert_eq!(reply(&driver, &user, thread.id, "no"), Err(CommandError::ThreadClosed));

    env.advance(TimeDelta::minutes(5));
    let mut session = Session::Anonymous;
    let cmd = LoginCommand {
        username: "mod".to_string(),
        password: "password".to_string(),
        version: None,
    };
    driver.log_in(&mut session, &cmd).unwrap();
    reply(&driver, &session, thread.id, "yes").unwrap();

    let stored = storage.find_thread(thread.id).unwrap().unwrap();
    assert_eq!(stored.post_count(), 2);
    assert_eq!(stored.last_activity, thread.created + TimeDelta::minutes(5));
}

#[test]
fn list_filters_by_tags_and_echoes_query() {
    let (driver, env) = setup();
    let alice = logged_in(&driver, "alice");
    post(&driver, &alice, "jazz", &["music"]);
    env.advance(TimeDelta::seconds(1));
    post(&driver, &alice, "ads", &["music", "spam"]);
    env.advance(TimeDelta::seconds(1));
    post(&driver, &alice, "paint", &["art"]);

    let page = list(&driver, Some("music+art-spam"), None);
    let titles: Vec<&str> = page.threads.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["paint", "jazz"]);
    assert_eq!(page.kind, "thread");
    assert_eq!(page.query.as_deref(), Some("music+art-spam"));
    assert!(page.next.is_none());
}

#[test]
fn long_thread_pages_through_tokens() {
    let (driver, env) = setup();
    let alice = logged_in(&driver, "alice");
    let id = post(&driver, &alice, "long", &[]);
    for n in 2..=120 {
        env.advance(TimeDelta::seconds(1));
        reply(&driver, &alice, id, &n.to_string()).unwrap();
    }

    let first = get(&driver, &id.to_string(), None).unwrap();
    assert_eq!(first.range, Some(Range::new(1, 50)));
    assert!(first.more);

    let second = get(&driver, &id.to_string(), first.next.as_deref()).unwrap();
    assert_eq!(second.range, Some(Range::new(51, 100)));
    assert_eq!(second.messages[0].body, "51");

    let third = get(&driver, &id.to_string(), second.next.as_deref()).unwrap();
    assert_eq!(third.range, Some(Range::new(101, 120)));
    assert!(!third.more);
    assert!(third.next.is_none());
}
