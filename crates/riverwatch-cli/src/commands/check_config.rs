use std::path::Path;

use anyhow::Result;

use riverwatch_core::AppConfig;

fn presence(value: &Option<String>) -> &'static str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => "set",
        _ => "missing",
    }
}

pub fn run(config: &AppConfig, path: Option<&Path>) -> Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(AppConfig::config_path);
    let found = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Config file: {}{}", path.display(), found);
    println!("Log file:    {}", config.log_dir().join(&config.general.log_file).display());
    println!();
    println!("[feed]     base_url = {}", config.feed.base_url);
    println!("           username = {}", presence(&config.feed.username));
    println!("           password = {}", presence(&config.feed.password));
    println!("[ai]       provider = {}, model = {}", config.ai.provider, config.ai.model);
    println!("           api_key  = {}", presence(&config.ai.api_key));
    println!("[chat]     api_base = {}", config.chat.api_base);
    println!("           bot_token = {}", presence(&config.chat.bot_token));
    println!("           chat_id   = {}", presence(&config.chat.chat_id));
    println!(
        "[http]     timeout = {}s, max_retries = {}, backoff_base = {}ms",
        config.http.request_timeout_secs, config.http.max_retries, config.http.backoff_base_ms
    );
    println!("[schedule] every {}s", config.schedule.period().as_secs());

    let warnings = config.validate();
    println!();
    if warnings.is_empty() {
        println!("No problems found.");
    } else {
        for warning in warnings {
            println!("warning: {}", warning);
        }
    }
    Ok(())
}
