// Startup module - displays banner and component status
//
// Printed to stdout before the server starts accepting connections.

use crate::config::{Config, CounterBackend, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// One line of the component list
pub struct ComponentStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub detail: String,
}

/// Print the startup banner and component status
pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}chatgate{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Chat API gateway{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    for component in &component_status(config) {
        print_component_status(component);
    }
    println!();

    if config.upstream.api_key.is_none() {
        println!("  {YELLOW}▸{RESET} {YELLOW}ANTHROPIC_API_KEY is not set{RESET}");
    }
    println!(
        "  {MAGENTA}▸{RESET} Listening on {BOLD}{}{RESET}",
        config.bind_addr
    );
    println!();
}

fn component_status(config: &Config) -> Vec<ComponentStatus> {
    let quota_detail = match config.quota.backend {
        CounterBackend::None => "disabled".to_string(),
        CounterBackend::Memory => format!("{}/day, in-memory", config.quota.daily_limit),
        CounterBackend::Redis => format!(
            "{}/day, redis at {}",
            config.quota.daily_limit, config.quota.redis_url
        ),
    };

    vec![
        ComponentStatus {
            name: "upstream",
            enabled: true,
            detail: config.upstream.url.clone(),
        },
        ComponentStatus {
            name: "quota",
            enabled: config.quota.is_enabled(),
            detail: quota_detail,
        },
        ComponentStatus {
            name: "assets",
            enabled: config.assets.dir.is_dir(),
            detail: config.assets.dir.display().to_string(),
        },
    ]
}

fn print_component_status(component: &ComponentStatus) {
    use colors::*;

    let (icon, style) = if component.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    println!(
        "    {icon} {style}{:<10}{RESET} {DIM}{}{RESET}",
        component.name, component.detail
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_quota_is_reported_off() {
        let mut config = Config::default();
        config.quota.backend = CounterBackend::None;

        let status = component_status(&config);
        let quota = status.iter().find(|c| c.name == "quota").unwrap();
        assert!(!quota.enabled);
        assert_eq!(quota.detail, "disabled");
    }

    #[test]
    fn test_memory_quota_shows_limit() {
        let config = Config::default();

        let status = component_status(&config);
        let quota = status.iter().find(|c| c.name == "quota").unwrap();
        assert!(quota.enabled);
        assert_eq!(quota.detail, "20/day, in-memory");
    }
}
