use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, NewUser, Role, Session, StoreDraft, UserFilter, validation};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "storerate_admin")]
#[command(about = "Admin utilities for storerate (bootstrap administrators/stores)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./storerate.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Store(Store),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Normal,
    Owner,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Normal => Role::NormalUser,
            RoleArg::Owner => Role::StoreOwner,
            RoleArg::Admin => Role::Administrator,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    address: String,
    #[arg(long, value_enum, default_value_t = RoleArg::Admin)]
    role: RoleArg,
}

#[derive(Args, Debug)]
struct Store {
    #[command(subcommand)]
    command: StoreCommand,
}

#[derive(Subcommand, Debug)]
enum StoreCommand {
    Create(StoreCreateArgs),
}

#[derive(Args, Debug)]
struct StoreCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: String,
    /// Email of an existing store owner.
    #[arg(long)]
    owner_email: Option<String>,
}

/// Terminal operations act with full rights; no account backs this session.
fn console_session() -> Session {
    Session::new(0, Role::Administrator)
}

/// Keeps the terminal in raw mode for as long as it lives.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// What a single key press does to the hidden input.
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Pushed,
    Erased,
    Ignored,
    Submit,
    Cancel,
}

fn apply_key(input: &mut String, key: KeyEvent) -> KeyOutcome {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => KeyOutcome::Submit,
        KeyCode::Esc => KeyOutcome::Cancel,
        KeyCode::Char('c' | 'd') if control => KeyOutcome::Cancel,
        KeyCode::Backspace if input.pop().is_some() => KeyOutcome::Erased,
        KeyCode::Char(ch) if !control => {
            input.push(ch);
            KeyOutcome::Pushed
        }
        _ => KeyOutcome::Ignored,
    }
}

/// Read a password without echoing it; each character shows as `*`.
fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawMode::enable()?;
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;

    let mut input = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut input, key) {
            KeyOutcome::Pushed => execute!(out, Print("*"))?,
            KeyOutcome::Erased => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?
            }
            KeyOutcome::Ignored => {}
            KeyOutcome::Submit => {
                execute!(out, Print("\r\n"))?;
                return Ok(input);
            }
            KeyOutcome::Cancel => {
                execute!(out, Print("\r\n"))?;
                return Err("cancelled".into());
            }
        }
        out.flush()?;
    }
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if let Err(err) = validation::validate_password(&p1) {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!("{err}\r\n"))
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn owner_id(
    engine: &Engine,
    email: &str,
) -> Result<Option<i32>, Box<dyn Error + Send + Sync>> {
    let email = validation::normalize_email(email);
    let owners = engine
        .users(&UserFilter {
            search: Some(email.clone()),
            role: Some(Role::StoreOwner),
        })
        .await?;
    Ok(owners
        .into_iter()
        .find(|user| user.email == email)
        .map(|user| user.id))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            let user = engine
                .create_user(
                    &console_session(),
                    NewUser {
                        name: args.name,
                        email: args.email,
                        address: args.address,
                        password,
                        role: args.role.into(),
                    },
                )
                .await?;

            println!("created user: {} ({}, id {})", user.email, user.role, user.id);
        }
        Command::Store(Store {
            command: StoreCommand::Create(args),
        }) => {
            let owner_id = match args.owner_email.as_deref() {
                Some(email) => match owner_id(&engine, email).await? {
                    Some(id) => Some(id),
                    None => {
                        eprintln!("store owner not found: {email}");
                        std::process::exit(1);
                    }
                },
                None => None,
            };

            let store = engine
                .add_store(
                    &console_session(),
                    StoreDraft {
                        name: args.name,
                        address: args.address,
                        owner_id,
                    },
                )
                .await?;
            println!("created store: {} ({})", store.name, store.id);
        }
    }

    Ok(())
}
