use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use modesync::Action;
use modesync::config::{ClientConfig, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};
use modesync::types::Mode;

const DEFAULT_PHONE_USER: &str = "Sau";
const DEFAULT_DESKTOP_USER: &str = "Swarit";
const DATA_DIR_NAME: &str = "modesync";

pub(crate) enum RunOutcome {
    Start(ClientConfig, Action),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    match resolve(cli) {
        Ok((config, action)) => RunOutcome::Start(config, action),
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "modesync",
    version,
    about = "Share a handful of mode toggles between two devices"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(long, global = true, env = "MODESYNC_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    #[arg(long, global = true, env = "MODESYNC_USER")]
    user: Option<String>,
    #[arg(long, global = true, env = "MODESYNC_USER_AGENT")]
    user_agent: Option<String>,
    #[arg(long, global = true, env = "MODESYNC_PHONE_USER", default_value = DEFAULT_PHONE_USER)]
    phone_user: String,
    #[arg(long, global = true, env = "MODESYNC_DESKTOP_USER", default_value = DEFAULT_DESKTOP_USER)]
    desktop_user: String,
    #[arg(long, global = true, env = "MODESYNC_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true, env = "MODESYNC_POLL_INTERVAL", default_value = "2s")]
    poll_interval: String,
    #[arg(long, global = true, env = "MODESYNC_REQUEST_TIMEOUT", default_value = DEFAULT_REQUEST_TIMEOUT)]
    request_timeout: String,
    #[arg(long, global = true, env = "MODESYNC_VAPID_PUBLIC_KEY")]
    vapid_public_key: Option<String>,
    #[arg(long, global = true, env = "MODESYNC_PUSH_ENDPOINT")]
    push_endpoint: Option<String>,
    #[arg(long, global = true)]
    no_notifications: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (default)
    Run,
    /// Poll and show notifications until interrupted
    Watch,
    Status,
    Toggle(ModeArgs),
    Notify(ModeArgs),
    EnableNotifications,
    /// Render a push payload as the background worker would
    PushEvent(PushEventArgs),
}

#[derive(Args, Debug)]
struct ModeArgs {
    mode: String,
}

#[derive(Args, Debug)]
struct PushEventArgs {
    /// JSON payload; read from stdin when omitted
    #[arg(long)]
    payload: Option<String>,
}

fn resolve(cli: Cli) -> Result<(ClientConfig, Action), String> {
    let action = match cli.command.as_ref() {
        None | Some(Command::Run) => Action::Session,
        Some(Command::Watch) => Action::Watch,
        Some(Command::Status) => Action::Status,
        Some(Command::Toggle(args)) => Action::Toggle(parse_mode(&args.mode)?),
        Some(Command::Notify(args)) => Action::Notify(parse_mode(&args.mode)?),
        Some(Command::EnableNotifications) => Action::EnableNotifications,
        Some(Command::PushEvent(args)) => Action::PushEvent {
            payload: args.payload.clone(),
        },
    };

    let api_url = cli.api_url.trim();
    if api_url.is_empty() {
        return Err("api url cannot be empty".to_string());
    }

    let user = resolve_user(&cli)?;
    let poll_interval = parse_interval(&cli.poll_interval)?;
    let request_timeout = parse_interval(&cli.request_timeout)?;
    let vapid_public_key = non_empty_option(cli.vapid_public_key.as_deref(), "vapid public key")?;
    let push_endpoint = non_empty_option(cli.push_endpoint.as_deref(), "push endpoint")?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    let config = ClientConfig {
        api_url: api_url.to_string(),
        user,
        data_dir,
        poll_interval,
        request_timeout,
        vapid_public_key,
        push_endpoint,
        notifications_supported: !cli.no_notifications,
    };
    Ok((config, action))
}

fn parse_mode(raw: &str) -> Result<Mode, String> {
    Mode::from_id(raw.trim()).ok_or_else(|| {
        let known: Vec<&str> = Mode::ALL.iter().map(|mode| mode.id()).collect();
        format!("unknown mode '{raw}'; expected one of {}", known.join(", "))
    })
}

fn non_empty_option(value: Option<&str>, label: &str) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        Some("") => Err(format!("{label} cannot be empty")),
        Some(value) => Ok(Some(value.to_string())),
        None => Ok(None),
    }
}

fn resolve_user(cli: &Cli) -> Result<String, String> {
    if let Some(user) = cli.user.as_deref() {
        let user = user.trim();
        if user.is_empty() {
            return Err("user cannot be empty".to_string());
        }
        return Ok(user.to_string());
    }
    let user_agent = cli.user_agent.clone().unwrap_or_else(default_user_agent);
    Ok(detect_user(&user_agent, &cli.phone_user, &cli.desktop_user))
}

fn default_user_agent() -> String {
    format!(
        "modesync/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Phones belong to one person and everything else to the other.
fn detect_user(user_agent: &str, phone_user: &str, desktop_user: &str) -> String {
    let agent = user_agent.to_ascii_lowercase();
    if agent.contains("iphone") || agent.contains("(ios;") {
        phone_user.to_string()
    } else {
        desktop_user.to_string()
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{DATA_DIR_NAME}")))
}

fn parse_interval(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("interval cannot be empty".to_string());
    }
    let invalid = || format!("invalid interval '{value}'; expected <number>[ms|s|m|h]");

    let (amount, unit) = if let Some(amount) = value.strip_suffix("ms") {
        (amount, "ms")
    } else {
        match value.chars().last() {
            Some(ch) if ch.is_ascii_alphabetic() => (&value[..value.len() - 1], &value[value.len() - 1..]),
            _ => (value, "s"),
        }
    };

    let amount: i64 = amount.trim().parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err("interval must be greater than 0".to_string());
    }

    let duration = match unit.to_ascii_lowercase().as_str() {
        "ms" => time::Duration::milliseconds(amount),
        "s" => time::Duration::seconds(amount),
        "m" => time::Duration::seconds(amount.checked_mul(60).ok_or_else(invalid)?),
        "h" => time::Duration::seconds(amount.checked_mul(3600).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };
    duration.try_into().map_err(|_| invalid())
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            command: None,
            api_url: DEFAULT_API_URL.to_string(),
            user: None,
            user_agent: None,
            phone_user: DEFAULT_PHONE_USER.to_string(),
            desktop_user: DEFAULT_DESKTOP_USER.to_string(),
            data_dir: Some(PathBuf::from("/tmp/modesync")),
            poll_interval: "2s".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT.to_string(),
            vapid_public_key: None,
            push_endpoint: None,
            no_notifications: false,
        }
    }

    #[test]
    fn parse_interval__should_parse_seconds_when_unit_missing() {
        // When
        let duration = parse_interval("30").expect("parse interval");

        // Then
        assert_eq!(duration, Duration::from_secs(30));
    }

    #[test]
    fn parse_interval__should_parse_units() {
        assert_eq!(parse_interval("2s"), Ok(Duration::from_secs(2)));
        assert_eq!(parse_interval("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_interval("15m"), Ok(Duration::from_secs(15 * 60)));
        assert_eq!(parse_interval("1H"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn parse_interval__should_reject_invalid_values() {
        assert!(parse_interval("").is_err());
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("-2s").is_err());
        assert!(parse_interval("abc").is_err());
        assert!(parse_interval("5d").is_err());
    }

    #[test]
    fn parse_interval__should_reject_overflowing_values() {
        assert!(parse_interval("9999999999999999h").is_err());
        assert!(parse_interval("999999999999999999m").is_err());
        assert!(parse_interval("99999999999999999999s").is_err());
    }

    #[test]
    fn resolve__should_bound_requests_by_default() {
        // When
        let (config, _) = resolve(base_cli()).expect("resolve");

        // Then
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn detect_user__should_map_phones_to_phone_user() {
        assert_eq!(
            detect_user("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)", "Sau", "Swarit"),
            "Sau"
        );
        assert_eq!(detect_user("modesync/0.1.0 (ios; aarch64)", "Sau", "Swarit"), "Sau");
        assert_eq!(
            detect_user("modesync/0.1.0 (linux; x86_64)", "Sau", "Swarit"),
            "Swarit"
        );
    }

    #[test]
    fn resolve__should_prefer_explicit_user() {
        // Given
        let mut cli = base_cli();
        cli.user = Some("  Alex ".to_string());
        cli.user_agent = Some("iPhone".to_string());

        // When
        let (config, action) = resolve(cli).expect("resolve");

        // Then
        assert_eq!(config.user, "Alex");
        assert_eq!(action, Action::Session);
    }

    #[test]
    fn resolve__should_reject_empty_user() {
        // Given
        let mut cli = base_cli();
        cli.user = Some("   ".to_string());

        // Then
        assert!(resolve(cli).is_err());
    }

    #[test]
    fn resolve__should_reject_unknown_mode() {
        // Given
        let mut cli = base_cli();
        cli.command = Some(Command::Toggle(ModeArgs {
            mode: "dragons".to_string(),
        }));

        // When
        let result = resolve(cli);

        // Then
        let err = result.expect_err("unknown mode");
        assert!(err.contains("best-friends"));
    }

    #[test]
    fn resolve__should_build_config_with_push_settings() {
        // Given
        let mut cli = base_cli();
        cli.command = Some(Command::Notify(ModeArgs {
            mode: "lovers".to_string(),
        }));
        cli.vapid_public_key = Some(" key ".to_string());
        cli.request_timeout = "30s".to_string();
        cli.no_notifications = true;

        // When
        let (config, action) = resolve(cli).expect("resolve");

        // Then
        assert_eq!(action, Action::Notify(Mode::Lovers));
        assert_eq!(config.vapid_public_key.as_deref(), Some("key"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert!(!config.notifications_supported);
        assert_eq!(config.modes_path(), PathBuf::from("/tmp/modesync/modes.json"));
    }

    #[test]
    fn resolve__should_reject_empty_vapid_key() {
        // Given
        let mut cli = base_cli();
        cli.vapid_public_key = Some(String::new());

        // Then
        assert!(resolve(cli).is_err());
    }
}
