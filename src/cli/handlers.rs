// src/cli/handlers.rs
use console::style;
use inquire::{Password, PasswordDisplayMode, Text};
use serde_json::json;
use std::error::Error;
use uuid::Uuid;

use crate::cli::commands::{CliCommand, GenerationArgs};
use crate::core::keyring::Keyring;
use crate::models::{GeneratedPassword, SavedPassword, Session, StrengthReport, StrengthTier};
use crate::utils::clipboard::copy_to_system_clipboard;
use crate::utils::{format_time_ago, mask_password};

// Handlers for CLI commands

pub fn handle_generate(
    keyring: &Keyring,
    options: &GenerationArgs,
    count: u16,
) -> Result<Vec<(GeneratedPassword, StrengthReport)>, Box<dyn Error>> {
    let request = options.to_request(keyring.default_request().length);
    let mut passwords = Vec::with_capacity(usize::from(count));

    for _ in 0..count {
        passwords.push(keyring.generate(&request)?);
    }

    Ok(passwords)
}

pub fn handle_strength(keyring: &Keyring, options: &GenerationArgs) -> StrengthReport {
    let request = options.to_request(keyring.default_request().length);
    keyring.strength(&request)
}

pub async fn handle_sign_up(keyring: &Keyring, email: &str, password: &str) -> Result<Session, Box<dyn Error>> {
    Ok(keyring.sign_up(email, password).await?)
}

pub async fn handle_sign_in(keyring: &Keyring, email: &str, password: &str) -> Result<Session, Box<dyn Error>> {
    Ok(keyring.sign_in(email, password).await?)
}

pub fn handle_sign_out(keyring: &Keyring, token: &str) -> Result<(), Box<dyn Error>> {
    Ok(keyring.sign_out(token)?)
}

/// Saves `password`, or a freshly generated one when it is `None`.
pub async fn handle_save(
    keyring: &Keyring,
    token: &str,
    password: Option<&str>,
    label: Option<&str>,
    options: &GenerationArgs,
) -> Result<SavedPassword, Box<dyn Error>> {
    // Reject a dead session before generating anything
    keyring.identify(token)?;

    let record = match password {
        Some(text) => keyring.save_password(token, text, label).await?,
        None => {
            let request = options.to_request(keyring.default_request().length);
            let (generated, _) = keyring.generate(&request)?;
            keyring.save_password(token, generated.as_str(), label).await?
        }
    };

    Ok(record)
}

pub async fn handle_list(keyring: &Keyring, token: &str) -> Result<Vec<SavedPassword>, Box<dyn Error>> {
    Ok(keyring.list_saved(token).await?)
}

pub async fn handle_delete(keyring: &Keyring, token: &str, id: &str) -> Result<Uuid, Box<dyn Error>> {
    let id = Uuid::parse_str(id).map_err(|_| format!("Invalid password id: {}", id))?;
    keyring.delete_saved(token, id).await?;
    Ok(id)
}

pub fn styled_tier(tier: StrengthTier) -> console::StyledObject<&'static str> {
    match tier {
        StrengthTier::Weak => style(tier.label()).red().bold(),
        StrengthTier::Medium => style(tier.label()).yellow().bold(),
        StrengthTier::Strong => style(tier.label()).green(),
        StrengthTier::VeryStrong => style(tier.label()).green().bold(),
    }
}

pub fn print_saved(records: &[SavedPassword], reveal: bool) {
    if records.is_empty() {
        println!("📭 No saved passwords yet.");
        return;
    }

    for record in records {
        let text = if reveal {
            record.password_text.clone()
        } else {
            mask_password(&record.password_text)
        };
        println!(
            "{}  {:<24}  {}  {}",
            style(record.id).dim(),
            record.label.as_deref().unwrap_or("(no label)"),
            text,
            style(format_time_ago(record.created_at)).dim(),
        );
    }
}

fn prompt_email(email: Option<String>) -> Result<String, Box<dyn Error>> {
    match email {
        Some(email) => Ok(email),
        None => Ok(Text::new("📧 Email:").prompt()?),
    }
}

pub fn prompt_account_password(confirm: bool) -> Result<String, Box<dyn Error>> {
    let prompt = Password::new("🔐 Account password:").with_display_mode(PasswordDisplayMode::Masked);
    let prompt = if confirm {
        prompt.with_custom_confirmation_message("🔁 Confirm password:")
    } else {
        prompt.without_confirmation()
    };
    Ok(prompt.prompt()?)
}

/// Runs one subcommand and prints its result.
pub async fn run_command(keyring: &Keyring, command: CliCommand, json_output: bool) -> Result<(), Box<dyn Error>> {
    match command {
        CliCommand::Generate { options, count, copy } => {
            let passwords = handle_generate(keyring, &options, count)?;
            if json_output {
                let items: Vec<_> = passwords
                    .iter()
                    .map(|(password, strength)| json!({ "password": password, "strength": strength }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for (password, strength) in &passwords {
                    println!("{}  [{}]", password.as_str(), styled_tier(strength.tier));
                }
            }
            if copy {
                if let Some((password, _)) = passwords.last() {
                    copy_to_system_clipboard(password)?;
                    eprintln!("📋 Copied to clipboard");
                }
            }
        }
        CliCommand::Strength { options } => {
            let report = handle_strength(keyring, &options);
            if json_output {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("💪 Strength: {} (score {})", styled_tier(report.tier), report.score);
            }
        }
        CliCommand::Signup { email } => {
            let email = prompt_email(email)?;
            let password = prompt_account_password(true)?;
            let session = handle_sign_up(keyring, &email, &password).await?;
            print_session(&session, json_output, "✅ Account created")?;
        }
        CliCommand::Signin { email } => {
            let email = prompt_email(email)?;
            let password = prompt_account_password(false)?;
            let session = handle_sign_in(keyring, &email, &password).await?;
            print_session(&session, json_output, "✅ Signed in")?;
        }
        CliCommand::Signout { token } => {
            handle_sign_out(keyring, &token)?;
            if json_output {
                println!("{}", json!({ "success": true }));
            } else {
                println!("👋 Signed out");
            }
        }
        CliCommand::Save { token, label, password, options } => {
            let record = handle_save(keyring, &token, password.as_deref(), label.as_deref(), &options).await?;
            if json_output {
                println!("{}", json!({ "success": true, "id": record.id }));
            } else {
                println!("💾 Saved password {}", style(record.id).cyan());
                if password.is_none() {
                    println!("🔑 {}", record.password_text);
                }
            }
        }
        CliCommand::List { token, reveal } => {
            let records = handle_list(keyring, &token).await?;
            if json_output {
                let items: Vec<_> = records
                    .iter()
                    .map(|r| {
                        json!({
                            "id": r.id,
                            "password": r.password_text,
                            "label": r.label,
                            "created_at": r.created_at,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print_saved(&records, reveal);
            }
        }
        CliCommand::Delete { token, id } => {
            let id = handle_delete(keyring, &token, &id).await?;
            if json_output {
                println!("{}", json!({ "success": true, "id": id }));
            } else {
                println!("🗑️  Deleted {}", id);
            }
        }
        CliCommand::Serve => {
            return Err("serve is handled by the API server entry point".into());
        }
    }

    Ok(())
}

fn print_session(session: &Session, json_output: bool, headline: &str) -> Result<(), Box<dyn Error>> {
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "success": true,
                "email": session.email,
                "token": session.token,
            }))?
        );
    } else {
        println!("{} as {}", headline, style(&session.email).cyan());
        println!("🎟️  Token: {}", session.token);
        println!("Pass it with --token or set PASSGEN_TOKEN.");
    }
    Ok(())
}
