//!
//! report-central console
//! ----------------------
//! Small interactive front end over the authentication boundary: sign in with
//! an employee number and PIN, inspect the current session, and dry-run route
//! guard decisions. The session survives restarts via the durable slot under
//! the data root.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use report_central::identity::{
    route_decision, LocalDirectory, Role, RouteDecision, SessionManager, SessionState,
    DEFAULT_LANDING, LOGIN_PATH,
};
use report_central::security;
use report_central::storage::StateStore;

fn print_usage() {
    eprintln!(
        "Commands:\n  login <employee_number> <pin>   sign in\n  logout                          sign out and clear the saved session\n  whoami                          show the current identity\n  users                           list registered identities\n  goto <path> [role ...]          evaluate the route guard for a path with an optional role allow-list\n  help                            show this help\n  quit | exit                     leave the console"
    );
}

fn describe_state(state: &SessionState) -> String {
    match state {
        SessionState::Unrestored => "restoring...".to_string(),
        SessionState::Anonymous => "not signed in".to_string(),
        SessionState::Authenticated(u) => format!(
            "{} ({}, {}, {})",
            u.name.as_deref().unwrap_or(&u.employee_number),
            u.employee_number,
            u.role,
            u.department
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let data_root = std::env::var("REPORT_CENTRAL_DATA").unwrap_or_else(|_| "data".to_string());
    info!(
        target: "report_central",
        "Report Central console starting: data_root='{}'", data_root
    );

    security::ensure_default_users(&data_root)?;
    let slot = StateStore::open(Path::new(&data_root).join("session"));
    let sessions = SessionManager::new(Arc::new(LocalDirectory::new(&data_root)), slot);

    println!("Report Central console (demo accounts 1001/1002/1003, PIN 1234)");
    let restored = sessions.restore();
    println!("session: {}", describe_state(&restored));
    print_usage();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => print_usage(),
            ["login", number, pin] => match sessions.login(number, pin).await {
                Ok(user) => println!(
                    "signed in as {} -> {}",
                    describe_state(&SessionState::Authenticated(user)),
                    DEFAULT_LANDING
                ),
                // Collapsed message only; the console stays on the "login view"
                Err(e) => println!("{}", e.user_message()),
            },
            ["login", ..] => println!("usage: login <employee_number> <pin>"),
            ["logout"] => {
                sessions.logout();
                println!("signed out");
            }
            ["whoami"] => println!("{}", describe_state(&sessions.state())),
            ["users"] => match security::list_users(&data_root) {
                Ok(users) => {
                    for u in users {
                        println!(
                            "{}  {:8}  {:20}  {}",
                            u.employee_number, u.role, u.department,
                            u.name.as_deref().unwrap_or("-")
                        );
                    }
                }
                Err(e) => println!("failed to list users: {}", e),
            },
            ["goto", path, roles @ ..] => {
                let mut allow: Vec<Role> = Vec::new();
                let mut bad = false;
                for r in roles {
                    match Role::parse(r) {
                        Some(role) => allow.push(role),
                        None => {
                            println!("unknown role '{}' (expected employee|manager|admin)", r);
                            bad = true;
                        }
                    }
                }
                if bad { continue; }
                match route_decision(&sessions.state(), &allow, path) {
                    RouteDecision::Pending => println!("pending (session still restoring)"),
                    RouteDecision::RedirectToLogin { from } => {
                        println!("redirect -> {} (will return to {})", LOGIN_PATH, from)
                    }
                    RouteDecision::RedirectToLanding => println!("redirect -> {}", DEFAULT_LANDING),
                    RouteDecision::Render => println!("render {}", path),
                }
            }
            _ => {
                println!("unrecognized command");
                print_usage();
            }
        }
    }
    Ok(())
}
