use clap::Subcommand;
use serde_json::json;

use crate::auth::{hash_password, PasswordPolicy, TokenError, TokenIssuer};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Print an argon2 PHC hash for a password")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
    },

    #[command(about = "Issue a token for a user id")]
    Token {
        #[arg(long, help = "User id embedded in the token")]
        user_id: String,
        #[arg(long, help = "Lifetime in seconds (defaults to the configured expiration)")]
        expires: Option<u64>,
    },

    #[command(about = "Verify a token and print its user id")]
    Verify {
        #[arg(help = "Token to verify")]
        token: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();

    match cmd {
        AuthCommands::HashPassword { password } => {
            let policy = PasswordPolicy::from_config(&config.security);
            let hash = hash_password(&policy, &password)?;
            match output_format {
                OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "hash": hash }))),
                OutputFormat::Text => {
                    println!("{}", hash);
                    Ok(())
                }
            }
        }
        AuthCommands::Token { user_id, expires } => {
            let issuer = TokenIssuer::from_config(&config.security)?;
            let token = issuer.issue(&user_id, expires)?;
            let expires_in = expires.unwrap_or_else(|| issuer.default_expiration());
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "token": token, "expires_in": expires_in })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        AuthCommands::Verify { token } => {
            let issuer = TokenIssuer::from_config(&config.security)?;
            match issuer.verify(&token) {
                Ok(user_id) => output_success(
                    &output_format,
                    &format!("Token valid for user {}", user_id),
                    Some(json!({ "user_id": user_id })),
                ),
                Err(e) => {
                    let code = match e {
                        TokenError::Expired => "TOKEN_EXPIRED",
                        _ => "TOKEN_INVALID",
                    };
                    output_error(&output_format, &e.to_string(), Some(code))?;
                    Err(e.into())
                }
            }
        }
    }
}
