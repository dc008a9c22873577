//! CLI entry point for authgate.

pub mod commands;

use clap::{Parser, Subcommand};

use crate::transport::Method;

/// Make authenticated calls against the shoe store API.
#[derive(Parser, Debug)]
#[command(name = "authgate", version, about = "Authenticated calls against the shoe store API")]
pub struct Cli {
    /// Backend origin, e.g. http://localhost:8000
    #[arg(long, env = "AUTHGATE_ORIGIN", global = true)]
    pub origin: Option<String>,

    /// Talk to the admin console API (/api/admin) instead of the storefront API
    #[arg(long, global = true)]
    pub admin: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, then ask the server whether the session is valid
    CheckAuth(LoginArgs),
    /// Send one request through the gateway
    Call(CallArgs),
}

/// Login credentials.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    #[arg(short, long, env = "AUTHGATE_USERNAME")]
    pub username: String,

    #[arg(short, long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for `authgate call`.
#[derive(Parser, Debug)]
pub struct CallArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Path under the API root, e.g. /cart/
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Log in first with this username
    #[arg(short, long, env = "AUTHGATE_USERNAME", requires = "password")]
    pub username: Option<String>,

    #[arg(short, long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_call_with_body() {
        let cli = Cli::try_parse_from([
            "authgate",
            "--admin",
            "call",
            "put",
            "/cart/c1/change-quantity",
            "--body",
            r#"{"quantity":1}"#,
        ])
        .unwrap();
        assert!(cli.admin);
        match cli.command {
            Commands::Call(args) => {
                assert_eq!(args.method, Method::Put);
                assert_eq!(args.path, "/cart/c1/change-quantity");
                assert_eq!(args.body.as_deref(), Some(r#"{"quantity":1}"#));
            }
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn parse_check_auth() {
        let cli = Cli::try_parse_from([
            "authgate", "check-auth", "-u", "jane", "-p", "pw", "--origin", "http://shop.test",
        ])
        .unwrap();
        assert_eq!(cli.origin.as_deref(), Some("http://shop.test"));
        match cli.command {
            Commands::CheckAuth(args) => {
                assert_eq!(args.username, "jane");
                assert_eq!(args.password, "pw");
            }
            other => panic!("expected CheckAuth, got {other:?}"),
        }
    }

    #[test]
    fn parse_unknown_method_is_error() {
        assert!(Cli::try_parse_from(["authgate", "call", "TRACE", "/x"]).is_err());
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["authgate"]).is_err());
    }
}
