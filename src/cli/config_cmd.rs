use anyhow::Result;

use crate::cli::output::OutputOptions;
use crate::core::config::AppConfig;

pub fn init(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    match AppConfig::default().save() {
        Ok(path) => {
            println!("Generated config at {}", path.display());
            println!("  Set credentials with `limitmon config set <key> <value>`.");
        }
        Err(e) => {
            eprintln!("Failed to generate config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn redact(secret: &str) -> &str {
    if secret.trim().is_empty() {
        "(unset)"
    } else {
        "(set)"
    }
}

pub fn show(_opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    println!("Config at {}", AppConfig::config_path().display());
    println!("  openai_key             {}", redact(&config.openai_key));
    println!("  gemini_key             {}", redact(&config.gemini_key));
    println!("  anthropic_key          {}", redact(&config.anthropic_key));
    println!("  anthropic_mode         {}", config.anthropic_mode);
    println!(
        "  anthropic_web_cookie   {}",
        redact(&config.anthropic_web_cookie)
    );
    println!("  anthropic_org_id       {}", redact(&config.anthropic_org_id));
    println!("  poll_interval_minutes  {}", config.poll_interval_minutes);
    println!("  debug                  {}", config.debug);
    println!("  demo_data              {}", config.demo_data);
    Ok(())
}

pub fn check(_opts: &OutputOptions) -> Result<()> {
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    let issues = config.validate();
    if issues.is_empty() {
        println!("Config OK.");
    } else {
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
    Ok(())
}

pub fn set(key: &str, value: &str, _opts: &OutputOptions) -> Result<()> {
    let mut config = AppConfig::load().unwrap_or_default();

    match key {
        "openai_key" => config.openai_key = value.to_string(),
        "gemini_key" => config.gemini_key = value.to_string(),
        "anthropic_key" => config.anthropic_key = value.to_string(),
        "anthropic_mode" => config.anthropic_mode = value.to_string(),
        "anthropic_web_cookie" => config.anthropic_web_cookie = value.to_string(),
        "anthropic_org_id" => config.anthropic_org_id = value.to_string(),
        "poll_interval_minutes" => match value.parse::<u64>() {
            Ok(minutes) if minutes >= 1 => config.poll_interval_minutes = minutes,
            _ => {
                eprintln!("poll_interval_minutes must be an integer >= 1");
                std::process::exit(1);
            }
        },
        "debug" | "demo_data" => match value.parse::<bool>() {
            Ok(flag) if key == "debug" => config.debug = flag,
            Ok(flag) => config.demo_data = flag,
            Err(_) => {
                eprintln!("{} must be true or false", key);
                std::process::exit(1);
            }
        },
        _ => {
            eprintln!("Unknown config key: '{}'", key);
            eprintln!("Run `limitmon config show` for the list of keys.");
            std::process::exit(1);
        }
    }

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }

    match config.save() {
        Ok(path) => println!("Updated {} in {}", key, path.display()),
        Err(e) => {
            eprintln!("Failed to save config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Persist a session pair captured through the external login flow and
/// flip Anthropic into web mode in one write.
pub fn set_web_session(cookie: &str, org_id: &str) -> Result<()> {
    if cookie.trim().is_empty() || org_id.trim().is_empty() {
        eprintln!("Both the cookie and the organization id are required.");
        std::process::exit(1);
    }

    let mut config = AppConfig::load().unwrap_or_default();
    match config.store_web_session(cookie, org_id) {
        Ok(path) => println!("Stored Anthropic web session in {}", path.display()),
        Err(e) => {
            eprintln!("Failed to save config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
