//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Quote a string as a TOML basic string
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

impl Config {
    /// Serialize the config as a commented TOML document.
    ///
    /// The credential is never written out; it is shown redacted when set.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# chatgate configuration\n");
        output.push_str("# Environment variables override values in this file.\n\n");
        output.push_str(&format!(
            "bind_addr = {}\n",
            quoted(&self.bind_addr.to_string())
        ));

        output.push_str("\n[upstream]\n");
        output.push_str(&format!("url = {}\n", quoted(&self.upstream.url)));
        output.push_str(&format!(
            "api_version = {}\n",
            quoted(&self.upstream.api_version)
        ));
        output.push_str(&format!("timeout_secs = {}\n", self.upstream.timeout_secs));
        output.push_str(&format!(
            "max_body_bytes = {}\n",
            self.upstream.max_body_bytes
        ));
        if self.upstream.api_key.is_some() {
            output.push_str("# api_key = \"********\"  (set)\n");
        } else {
            output.push_str("# api_key: prefer the ANTHROPIC_API_KEY environment variable\n");
        }

        output.push_str("\n[quota]\n");
        output.push_str("# backend: none (disabled), memory, redis\n");
        output.push_str(&format!(
            "backend = {}\n",
            quoted(self.quota.backend.as_str())
        ));
        output.push_str(&format!("daily_limit = {}\n", self.quota.daily_limit));
        output.push_str(&format!("ttl_secs = {}\n", self.quota.ttl_secs));
        output.push_str(&format!(
            "client_ip_header = {}\n",
            quoted(&self.quota.client_ip_header)
        ));
        output.push_str(&format!("redis_url = {}\n", quoted(&self.quota.redis_url)));

        output.push_str("\n[assets]\n");
        output.push_str(&format!(
            "dir = {}\n",
            quoted(&self.assets.dir.to_string_lossy())
        ));

        output.push_str("\n[logging]\n");
        output.push_str(&format!("level = {}\n", quoted(&self.logging.level)));
        output.push_str(&format!("file_enabled = {}\n", self.logging.file_enabled));
        output.push_str(&format!(
            "file_dir = {}\n",
            quoted(&self.logging.file_dir.to_string_lossy())
        ));
        output.push_str(&format!(
            "file_rotation = {}\n",
            quoted(self.logging.file_rotation.as_str())
        ));
        output.push_str(&format!(
            "file_prefix = {}\n",
            quoted(&self.logging.file_prefix)
        ));

        output
    }
}
