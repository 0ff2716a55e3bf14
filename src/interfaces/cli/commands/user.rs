//! 账号管理 CLI 命令

use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;

use crate::api::signed_cookie::AccessRole;
use crate::interfaces::cli::CliError;
use crate::services::AuthService;

/// 从不同来源获取密码
fn get_password(password: Option<String>, stdin: bool) -> Result<String, CliError> {
    if stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| CliError::CommandError(format!("Failed to read from stdin: {}", e)))?;
        Ok(line.trim().to_string())
    } else if let Some(pwd) = password {
        Ok(pwd)
    } else {
        prompt_password_with_confirm()
    }
}

/// 交互式输入密码（带确认）
fn prompt_password_with_confirm() -> Result<String, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::ParseError(
            "No password provided. Use --password or --stdin flag, or run interactively."
                .to_string(),
        ));
    }

    let read = |prompt: &str| -> Result<String, CliError> {
        print!("{}", prompt);
        io::stdout()
            .flush()
            .map_err(|e| CliError::CommandError(e.to_string()))?;
        rpassword::read_password()
            .map_err(|e| CliError::CommandError(format!("Failed to read password: {}", e)))
    };

    let password = read("Enter password: ")?;
    let confirm = read("Confirm password: ")?;
    if password != confirm {
        return Err(CliError::ParseError("Passwords do not match".to_string()));
    }
    Ok(password)
}

/// `lmsite user create`
pub async fn create_user(
    auth: &AuthService,
    email: &str,
    role: AccessRole,
    display_name: Option<String>,
    password: Option<String>,
    stdin: bool,
) -> Result<(), CliError> {
    let password = get_password(password, stdin)?;
    let user = auth.create_user(email, &password, role, display_name).await?;
    println!(
        "{} Created {} account {} (id {})",
        "✓".green().bold(),
        user.role.cyan(),
        user.email.blue(),
        user.id
    );
    Ok(())
}

/// `lmsite user list`
pub async fn list_users(auth: &AuthService, role: Option<AccessRole>) -> Result<(), CliError> {
    let users = auth.list_users(role).await?;
    if users.is_empty() {
        println!("{}", "No accounts found".dimmed());
        return Ok(());
    }

    for user in &users {
        println!(
            "  {:>4}  {:<8} {}{}",
            user.id,
            user.role.cyan(),
            user.email,
            user.display_name
                .as_deref()
                .map(|n| format!(" ({})", n))
                .unwrap_or_default()
                .dimmed()
        );
    }
    println!("{} {} account(s)", "Total:".bold(), users.len());
    Ok(())
}
