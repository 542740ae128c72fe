//! End-to-end test over a real socket.
//!
//! A client speaks line-delimited JSON to a running server and checks the
//! responses, including how the server answers a line it can't decode.

use argon2::Params;
use limbo_harness::SimEnv;
use limbo_proto::{Command, GetCommand, ListCommand, LoginCommand, PostCommand, Response};
use limbo_server::{Argon2Hasher, BoardConfig, BoardDriver, MemoryStorage, Server};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self { reader: BufReader::new(reader), writer }
    }

    async fn send_line(&mut self, line: &str) -> Response {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();

        let mut reply = String::new();
        self.reader.read_line(&mut reply).await.unwrap();
        assert!(reply.ends_with('\n'), "response must be one full line: {reply:?}");
        Response::decode(&reply).unwrap()
    }

    async fn send(&mut self, command: Command) -> Response {
        let line = command.encode().unwrap();
        self.send_line(&line).await
    }
}

async fn start() -> std::net::SocketAddr {
    let hasher = Argon2Hasher::with_params(Params::new(8, 1, 1, None).unwrap());
    let driver =
        BoardDriver::new(SimEnv::new(), MemoryStorage::new(), hasher, BoardConfig::default());
    let server = Server::with_driver(driver, "127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

fn login(username: &str, password: &str) -> Command {
    Command::Login(LoginCommand {
        username: username.to_string(),
        password: password.to_string(),
        version: None,
    })
}

#[tokio::test]
async fn full_session_round_trip() {
    let addr = start().await;
    let mut client = Client::connect(addr).await;

    let Response::Hello(hello) = client.send(Command::Hello).await else {
        panic!("expected hello");
    };
    assert_eq!(hello.name, "Limbo");
    assert!(hello.access.guest.contains(&"list".to_string()));

    let register = r#"{"cmd":"register","username":"alice","password":"secret"}"#;
    assert_eq!(client.send_line(register).await, Response::ok("register"));
    assert_eq!(client.send(login("ALICE", "secret")).await, Response::ok("login"));

    let post = Command::Post(PostCommand {
        title: "First".to_string(),
        body: "hello\nworld".to_string(),
        format: None,
        tags: vec!["music".to_string()],
    });
    let Response::Ok(ok) = client.send(post).await else {
        panic!("expected ok");
    };
    assert_eq!(ok.wrt, "post");
    let id = ok.result.unwrap();

    let get = Command::Get(GetCommand { id: id.clone(), range: None, token: None, format: None });
    let Response::Msg(msg) = client.send(get).await else {
        panic!("expected msg");
    };
    assert_eq!(msg.id, id);
    assert_eq!(msg.messages.len(), 1);
    assert_eq!(msg.messages[0].user, "alice");
    assert_eq!(msg.messages[0].body, "hello\nworld");

    let list = Command::List(ListCommand {
        kind: "thread".to_string(),
        query: Some("music".to_string()),
        token: None,
    });
    let Response::List(page) = client.send(list).await else {
        panic!("expected list");
    };
    assert_eq!(page.threads.len(), 1);
    assert_eq!(page.threads[0].id, id);
    assert_eq!(page.query.as_deref(), Some("music"));
}

#[tokio::test]
async fn malformed_line_keeps_connection_open() {
    let addr = start().await;
    let mut client = Client::connect(addr).await;

    let Response::Error(err) = client.send_line("this is not json").await else {
        panic!("expected error");
    };
    assert_eq!(err.wrt, "unknown");

    let Response::Error(err) = client.send_line(r#"{"cmd":"frobnicate"}"#).await else {
        panic!("expected error");
    };
    assert_eq!(err.wrt, "unknown");

    assert!(matches!(client.send(Command::Hello).await, Response::Hello(_)));
}

#[tokio::test]
async fn sessions_are_per_connection() {
    let addr = start().await;
    let mut alice = Client::connect(addr).await;
    let mut guest = Client::connect(addr).await;

    let register = r#"{"cmd":"register","username":"alice","password":"secret"}"#;
    assert_eq!(alice.send_line(register).await, Response::ok("register"));
    assert_eq!(alice.send(login("alice", "secret")).await, Response::ok("login"));

    let post = r#"{"cmd":"post","title":"Hi","body":"there"}"#;
    assert!(matches!(alice.send_line(post).await, Response::Ok(_)));
    assert_eq!(
        guest.send_line(post).await,
        Response::error("post", "You need to log in first.")
    );
}
