//! Board driver.
//!
//! Ties together sessions, storage, password hashing and the core's listing
//! and rendering logic. One [`BoardDriver`] is shared by every connection;
//! each connection owns its [`Session`] and passes it in with every command.
//!
//! The driver does no I/O of its own beyond the storage and hasher calls, so
//! a test can drive it command by command on simulated time.

use limbo_core::{Environment, Post, Thread, ThreadId, User, render_thread};
use limbo_proto::{
    AccessInfo, Command, GetCommand, HelloMessage, ListCommand, ListMessage, LoginCommand,
    OkMessage, PROTOCOL_VERSION, PostCommand, RegisterCommand, ReplyCommand, Response,
    ThreadMessage,
};

use crate::{
    command_error::CommandError,
    config::BoardConfig,
    listing::list_threads,
    password::{HashError, PasswordHasher},
    session::Session,
    storage::{Storage, StorageError},
};

/// Commands usable without logging in.
const GUEST_COMMANDS: [&str; 6] = ["hello", "login", "logout", "register", "get", "list"];

/// Commands that additionally need a logged-in session.
const USER_COMMANDS: [&str; 2] = ["post", "reply"];

/// Command handlers over injected storage, hasher and environment.
pub struct BoardDriver<E, S, H>
where
    E: Environment,
    S: Storage,
    H: PasswordHasher,
{
    env: E,
    storage: S,
    hasher: H,
    config: BoardConfig,
}

impl<E, S, H> BoardDriver<E, S, H>
where
    E: Environment,
    S: Storage,
    H: PasswordHasher,
{
    /// Create a driver.
    pub fn new(env: E, storage: S, hasher: H, config: BoardConfig) -> Self {
        Self { env, storage, hasher, config }
    }

    /// Storage handle (for inspection in tests and tooling).
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Handle one command, always producing exactly one response.
    pub fn handle(&self, session: &mut Session, command: Command) -> Response {
        let wrt = command.name();
        tracing::debug!(command = wrt, authenticated = session.is_authenticated(), "handling");

        let result = match command {
            Command::Hello => Ok(Response::Hello(self.hello())),
            Command::Register(cmd) => self.register(&cmd).map(|()| Response::ok(wrt)),
            Command::Login(cmd) => self.log_in(session, &cmd).map(|()| Response::ok(wrt)),
            Command::Logout => {
                self.log_out(session);
                Ok(Response::ok(wrt))
            },
            Command::Get(cmd) => self.get(&cmd).map(Response::Msg),
            Command::List(cmd) => self.list(&cmd).map(Response::List),
            Command::Post(cmd) => self.post(session, &cmd).map(|id| {
                Response::Ok(OkMessage { wrt: wrt.to_string(), result: Some(id.to_string()) })
            }),
            Command::Reply(cmd) => self.reply(session, &cmd).map(|()| Response::ok(wrt)),
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(command = wrt, class = ?err.class(), %err, "rejected");
            Response::error(wrt, err.to_string())
        })
    }

    /// Server information.
    pub fn hello(&self) -> HelloMessage {
        HelloMessage {
            name: self.config.name.clone(),
            version: PROTOCOL_VERSION,
            desc: self.config.desc.clone(),
            server: format!("limbo {}", env!("CARGO_PKG_VERSION")),
            options: ["filter", "range", "tags"].map(String::from).to_vec(),
            access: AccessInfo {
                guest: GUEST_COMMANDS.map(String::from).to_vec(),
                user: USER_COMMANDS.map(String::from).to_vec(),
            },
            formats: vec![limbo_core::view::FORMAT.to_string()],
            lists: vec!["thread".to_string()],
            icon: self.config.icon.clone(),
            default_range: self.config.default_range,
        }
    }

    /// Create an account.
    pub fn register(&self, cmd: &RegisterCommand) -> Result<(), CommandError> {
        let length = cmd.username.chars().count();
        if length == 0 || length > self.config.username_limit {
            return Err(CommandError::InvalidUsername);
        }

        let key = User::key_for(&cmd.username);
        if self.storage.count_users(&key).map_err(unavailable("count_users"))? > 0 {
            return Err(CommandError::UsernameTaken);
        }

        let password = self.hasher.hash(&cmd.password).map_err(|e| match e {
            HashError::TooShort { .. } => CommandError::PasswordTooShort,
            HashError::Failed(cause) => {
                tracing::error!(%cause, "password hashing failed");
                CommandError::Unavailable
            },
        })?;

        let user = User::new(&cmd.username, password, self.env.now());
        match self.storage.insert_user(&user) {
            Ok(()) => {
                tracing::info!(user = %user.name, "registered");
                Ok(())
            },
            Err(StorageError::Conflict(_)) => Err(CommandError::UsernameTaken),
            Err(e) => Err(unavailable("insert_user")(e)),
        }
    }

    /// Authenticate the session.
    ///
    /// On failure the session is left exactly as it was.
    pub fn log_in(&self, session: &mut Session, cmd: &LoginCommand) -> Result<(), CommandError> {
        let key = User::key_for(&cmd.username);
        let user = self
            .storage
            .find_user(&key)
            .map_err(unavailable("find_user"))?
            .ok_or(CommandError::LoginFailed)?;

        if !self.hasher.verify(&user.password, &cmd.password) {
            return Err(CommandError::LoginFailed);
        }

        tracing::debug!(user = %user.name, "logged in");
        session.log_in(user);
        Ok(())
    }

    /// Drop authentication.
    pub fn log_out(&self, session: &mut Session) {
        session.log_out();
    }

    /// One window of a thread.
    pub fn get(&self, cmd: &GetCommand) -> Result<ThreadMessage, CommandError> {
        let id = parse_thread_id(&cmd.id)?;
        let thread = self
            .storage
            .find_thread(id)
            .map_err(unavailable("find_thread"))?
            .ok_or_else(|| CommandError::ThreadNotFound(cmd.id.clone()))?;

        Ok(render_thread(&thread, cmd.range, cmd.token.as_deref(), self.config.default_range))
    }

    /// One page of thread summaries.
    pub fn list(&self, cmd: &ListCommand) -> Result<ListMessage, CommandError> {
        match cmd.kind.as_str() {
            "thread" => {},
            "board" => return Err(CommandError::NoBoards),
            other => return Err(CommandError::UnsupportedList(other.to_string())),
        }

        let page = list_threads(
            &self.storage,
            cmd.query.as_deref(),
            cmd.token.as_deref(),
            self.config.page_size,
            self.config.listing_skew,
            self.env.now(),
        )
        .map_err(unavailable("query_threads"))?;

        Ok(ListMessage {
            kind: cmd.kind.clone(),
            query: cmd.query.clone(),
            threads: page.threads,
            next: page.next,
        })
    }

    /// Start a thread as the session user. Returns the new thread's id.
    pub fn post(&self, session: &Session, cmd: &PostCommand) -> Result<ThreadId, CommandError> {
        let user = session.user().ok_or(CommandError::AuthRequired)?;
        if cmd.title.trim().is_empty() {
            return Err(CommandError::TitleRequired);
        }

        let thread = Thread::new(
            ThreadId::generate(&self.env),
            cmd.title.clone(),
            user.name.clone(),
            cmd.body.clone(),
            cmd.tags.clone(),
            self.env.now(),
        );

        self.storage.insert_thread(&thread).map_err(|e| {
            tracing::error!(error = %e, user = %user.name, "couldn't store new thread");
            CommandError::PostFailed
        })?;

        tracing::debug!(thread = %thread.id, user = %user.name, "posted");
        Ok(thread.id)
    }

    /// Reply to a thread as the session user.
    ///
    /// Closed threads accept replies only from admins.
    pub fn reply(&self, session: &Session, cmd: &ReplyCommand) -> Result<(), CommandError> {
        let user = session.user().ok_or(CommandError::AuthRequired)?;
        let id = parse_thread_id(&cmd.to)?;

        let thread = self
            .storage
            .find_thread(id)
            .map_err(|e| {
                tracing::error!(error = %e, thread = %id, "couldn't load thread for reply");
                CommandError::ReplyFailed
            })?
            .ok_or_else(|| CommandError::ThreadNotFound(cmd.to.clone()))?;

        if thread.closed && !user.admin {
            return Err(CommandError::ThreadClosed);
        }

        let now = self.env.now();
        let post = Post { author: user.name.clone(), date: now, body: cmd.body.clone() };

        match self.storage.append_post(id, &post, now) {
            Ok(true) => {
                tracing::debug!(thread = %id, user = %user.name, "replied");
                Ok(())
            },
            Ok(false) => Err(CommandError::ThreadNotFound(cmd.to.clone())),
            Err(e) => {
                tracing::error!(error = %e, thread = %id, "couldn't append reply");
                Err(CommandError::ReplyFailed)
            },
        }
    }
}

fn parse_thread_id(text: &str) -> Result<ThreadId, CommandError> {
    ThreadId::parse(text).map_err(|_| CommandError::InvalidThreadId)
}

/// Log a storage failure and hide it behind a generic error.
fn unavailable(op: &'static str) -> impl Fn(StorageError) -> CommandError {
    move |e| {
        tracing::error!(error = %e, op, "storage failure");
        CommandError::Unavailable
    }
}
