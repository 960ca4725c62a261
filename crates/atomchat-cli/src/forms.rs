//! Auth forms: client-side validation, then the credential exchange.
//!
//! Validation failures never reach the API client; credential rejections
//! from the backend are surfaced inline with the backend's detail text.

use atomchat_client::{ApiClient, ApiError};

pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
pub const SIGNUP_FALLBACK: &str = "Signup failed. Please try again.";

const MIN_PASSWORD_LEN: usize = 6;

#[derive(clap::Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(clap::Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    /// Repeat the password
    #[arg(long)]
    pub confirm: String,
}

pub async fn login(client: &ApiClient, args: &LoginArgs) -> anyhow::Result<()> {
    if let Err(message) = validate_login(&args.email, &args.password) {
        println!("{message}");
        return Ok(());
    }
    match client.login(&args.email, &args.password).await {
        Ok(_) => println!("Logged in as {}.", args.email.trim()),
        Err(error) => println!("{}", inline_error(&error, LOGIN_FALLBACK)),
    }
    Ok(())
}

pub async fn signup(client: &ApiClient, args: &SignupArgs) -> anyhow::Result<()> {
    if let Err(message) = validate_signup(&args.email, &args.password, &args.confirm) {
        println!("{message}");
        return Ok(());
    }
    match client.signup(&args.email, &args.password).await {
        Ok(_) => println!("Account created. You are logged in as {}.", args.email.trim()),
        Err(error) => println!("{}", inline_error(&error, SIGNUP_FALLBACK)),
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("Email must not be empty");
    }
    if password.is_empty() {
        return Err("Password must not be empty");
    }
    Ok(())
}

pub fn validate_signup(email: &str, password: &str, confirm: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("Email must not be empty");
    }
    if password != confirm {
        return Err("Passwords do not match");
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

fn inline_error(error: &ApiError, fallback: &str) -> String {
    error
        .detail()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_rejects_blank_fields() {
        assert_eq!(validate_login("  ", "secret"), Err("Email must not be empty"));
        assert_eq!(
            validate_login("bohr@example.com", ""),
            Err("Password must not be empty")
        );
        assert_eq!(validate_login("bohr@example.com", "quantum"), Ok(()));
    }

    #[test]
    fn signup_checks_confirmation_before_length() {
        assert_eq!(
            validate_signup("curie@example.com", "radium", "radiun"),
            Err("Passwords do not match")
        );
        assert_eq!(
            validate_signup("curie@example.com", "ra", "ra"),
            Err("Password must be at least 6 characters")
        );
        assert_eq!(validate_signup("curie@example.com", "radium", "radium"), Ok(()));
    }

    #[test]
    fn inline_errors_prefer_backend_detail() {
        let rejected = ApiError::Http {
            status: reqwest::StatusCode::UNAUTHORIZED,
            detail: "Invalid email or password".to_string(),
        };
        assert_eq!(inline_error(&rejected, LOGIN_FALLBACK), "Invalid email or password");

        let transport = ApiError::Request {
            message: "connection refused".to_string(),
        };
        assert_eq!(inline_error(&transport, LOGIN_FALLBACK), LOGIN_FALLBACK);
    }
}
