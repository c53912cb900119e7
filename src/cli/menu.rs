// src/cli/menu.rs
use console::style;
use inquire::{Confirm, CustomType, MultiSelect, Select, Text};
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cli::handlers::{print_saved, prompt_account_password, styled_tier};
use crate::core::keyring::Keyring;
use crate::core::state::{self, ClientState};
use crate::models::{GenerationRequest, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::utils::clipboard::copy_to_system_clipboard;
use crate::utils::truncate_string;

const GENERATE: &str = "🎲 Generate password";
const COPY: &str = "📋 Copy current password";
const OPTIONS: &str = "⚙️  Change generator options";
const SIGN_UP: &str = "👤 Create account";
const SIGN_IN: &str = "🔑 Sign in";
const SAVE: &str = "💾 Save current password";
const LIST: &str = "📜 List saved passwords";
const DELETE: &str = "🗑️  Delete saved password";
const SIGN_OUT: &str = "🚪 Sign out";
const EXIT: &str = "❌ Exit";

const CLASS_UPPERCASE: &str = "Uppercase (A-Z)";
const CLASS_LOWERCASE: &str = "Lowercase (a-z)";
const CLASS_NUMBERS: &str = "Numbers (0-9)";
const CLASS_SYMBOLS: &str = "Symbols (!@#...)";

pub async fn run_cli_menu(keyring: Arc<Keyring>, should_exit: Arc<AtomicBool>) -> Result<(), Box<dyn Error>> {
    println!("🦀🔐 Welcome to");
    println!("╔══════════════════════════════════════╗");
    println!("║       🦀 RUST PASSWORD GENERATOR      ║");
    println!("╚══════════════════════════════════════╝");

    let mut client = ClientState::new(keyring.default_request());

    while !should_exit.load(Ordering::SeqCst) {
        print_status(&client, &keyring);

        let choice = match Select::new("Choose an option:", menu_options(&client)).prompt() {
            Ok(choice) => choice,
            Err(inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        // Each step yields the next state; a failed step keeps the current one
        let next = match choice {
            GENERATE => generate(&client, &keyring),
            COPY => copy_current(&client),
            OPTIONS => change_options(&client),
            SIGN_UP => sign_up(&client, &keyring).await,
            SIGN_IN => sign_in(&client, &keyring).await,
            SAVE => save_current(&client, &keyring).await,
            LIST => list_saved(&client, &keyring).await,
            DELETE => delete_saved(&client, &keyring).await,
            SIGN_OUT => state::sign_out(&client, &keyring).map_err(Into::into),
            _ => break,
        };

        match next {
            Ok(next) => client = next,
            Err(e) => {
                log::warn!("Menu action failed: {}", e);
                println!("❌ {}", e);
            }
        }
    }

    if let Some(token) = client.token() {
        if let Err(e) = keyring.sign_out(token) {
            log::debug!("Sign-out on exit failed: {}", e);
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}

fn menu_options(client: &ClientState) -> Vec<&'static str> {
    let mut options = vec![GENERATE];
    if client.current.is_some() {
        options.push(COPY);
    }
    options.push(OPTIONS);
    if client.is_signed_in() {
        if client.current.is_some() {
            options.push(SAVE);
        }
        options.extend([LIST, DELETE, SIGN_OUT]);
    } else {
        options.extend([SIGN_UP, SIGN_IN]);
    }
    options.push(EXIT);
    options
}

fn print_status(client: &ClientState, keyring: &Keyring) {
    let request = &client.request;
    let strength = client.strength(keyring);
    println!();
    println!(
        "Length {} | {}{}{}{} | {}",
        style(request.length).cyan(),
        flag("A-Z", request.include_uppercase),
        flag("a-z", request.include_lowercase),
        flag("0-9", request.include_numbers),
        flag("!@#", request.include_symbols),
        styled_tier(strength.tier),
    );
    if let Some(session) = &client.session {
        println!("Signed in as {}", style(&session.email).cyan());
    }
    if let Some(current) = &client.current {
        println!("🔑 {}", style(current.password.as_str()).bold());
    }
}

fn flag(name: &str, on: bool) -> String {
    if on {
        format!("{} ", style(name).green())
    } else {
        format!("{} ", style(name).dim())
    }
}

fn generate(client: &ClientState, keyring: &Keyring) -> Result<ClientState, Box<dyn Error>> {
    let next = state::generate(client, keyring)?;
    if let Some(current) = &next.current {
        println!(
            "✅ Generated {} characters [{}]",
            current.password.len(),
            styled_tier(current.strength.tier)
        );
    }
    Ok(next)
}

fn copy_current(client: &ClientState) -> Result<ClientState, Box<dyn Error>> {
    let current = client.current.as_ref().ok_or("Generate a password first")?;
    copy_to_system_clipboard(&current.password)?;
    println!("📋 Copied to clipboard");
    Ok(client.clone())
}

fn change_options(client: &ClientState) -> Result<ClientState, Box<dyn Error>> {
    let current = client.request;

    let length = CustomType::<usize>::new("Password length:")
        .with_default(current.length)
        .with_error_message("Please enter a whole number")
        .with_help_message(&format!("{} to {} characters", MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH))
        .prompt()?;

    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        println!(
            "⚠️  Length must be between {} and {}. Keeping {}.",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, current.length
        );
        return Ok(client.clone());
    }

    let classes = [CLASS_UPPERCASE, CLASS_LOWERCASE, CLASS_NUMBERS, CLASS_SYMBOLS];
    let enabled = [
        current.include_uppercase,
        current.include_lowercase,
        current.include_numbers,
        current.include_symbols,
    ];
    let defaults: Vec<usize> = enabled
        .iter()
        .enumerate()
        .filter_map(|(i, on)| on.then_some(i))
        .collect();

    let selected = MultiSelect::new("Character classes:", classes.to_vec())
        .with_default(&defaults)
        .prompt()?;

    let request = GenerationRequest {
        length,
        include_uppercase: selected.contains(&CLASS_UPPERCASE),
        include_lowercase: selected.contains(&CLASS_LOWERCASE),
        include_numbers: selected.contains(&CLASS_NUMBERS),
        include_symbols: selected.contains(&CLASS_SYMBOLS),
    };

    if !request.has_any_class() {
        println!("⚠️  No character class selected; generation will fail until one is enabled.");
    }

    Ok(state::set_request(client, request))
}

async fn sign_up(client: &ClientState, keyring: &Keyring) -> Result<ClientState, Box<dyn Error>> {
    let email = Text::new("📧 Email:").prompt()?;
    let password = prompt_account_password(true)?;
    let next = state::sign_up(client, keyring, &email, &password).await?;
    println!("✅ Account created, you are signed in");
    Ok(next)
}

async fn sign_in(client: &ClientState, keyring: &Keyring) -> Result<ClientState, Box<dyn Error>> {
    let email = Text::new("📧 Email:").prompt()?;
    let password = prompt_account_password(false)?;
    let next = state::sign_in(client, keyring, &email, &password).await?;
    println!("✅ Signed in, {} saved password(s)", next.saved.len());
    Ok(next)
}

async fn save_current(client: &ClientState, keyring: &Keyring) -> Result<ClientState, Box<dyn Error>> {
    let label = Text::new("🏷️  Label (optional):").prompt()?;
    let next = state::save_current(client, keyring, Some(label.as_str())).await?;
    println!("💾 Password saved");
    Ok(next)
}

async fn list_saved(client: &ClientState, keyring: &Keyring) -> Result<ClientState, Box<dyn Error>> {
    let next = state::refresh_saved(client, keyring).await?;
    print_saved(&next.saved, false);

    if !next.saved.is_empty() && Confirm::new("Reveal passwords?").with_default(false).prompt()? {
        print_saved(&next.saved, true);
    }
    Ok(next)
}

async fn delete_saved(client: &ClientState, keyring: &Keyring) -> Result<ClientState, Box<dyn Error>> {
    if client.saved.is_empty() {
        println!("📭 Nothing to delete.");
        return Ok(client.clone());
    }

    let display: Vec<String> = client
        .saved
        .iter()
        .map(|r| {
            format!(
                "{} | {}",
                truncate_string(r.label.as_deref().unwrap_or("(no label)"), 24),
                r.id
            )
        })
        .collect();

    let selection = Select::new("Select a password to delete:", display.clone()).prompt()?;
    let index = display.iter().position(|d| d == &selection).ok_or("Selection not found")?;
    let id = client.saved[index].id;

    if !Confirm::new("Delete this password?").with_default(false).prompt()? {
        return Ok(client.clone());
    }

    let next = state::delete_saved(client, keyring, id).await?;
    println!("🗑️  Deleted");
    Ok(next)
}
