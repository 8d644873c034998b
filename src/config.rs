use serde::Deserialize;

fn default_data_dir() -> String {
    "wr_data".to_string()
}

fn default_approval_role() -> String {
    "Abyssal Warden".to_string()
}

/// Read from the environment (and `.env`), field names map to upper-case variables.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub discord_bot_token: String,
    /// Directory holding `config.json`, `submissions.json` and `pins.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Guild role allowed to approve and reject submissions, besides administrators.
    #[serde(default = "default_approval_role")]
    pub approval_role: String,
    pub register_commands_globally: Option<bool>,
    pub register_commands_in_guilds: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn only_the_token_is_required() {
        let config: AppConfig =
            envy::from_iter(vars(&[("DISCORD_BOT_TOKEN", "secret")])).unwrap();

        assert_eq!(config.discord_bot_token, "secret");
        assert_eq!(config.data_dir, "wr_data");
        assert_eq!(config.approval_role, "Abyssal Warden");
        assert_eq!(config.register_commands_globally, None);
        assert_eq!(config.register_commands_in_guilds, None);
    }

    #[test]
    fn reads_guild_list_and_overrides() {
        let config: AppConfig = envy::from_iter(vars(&[
            ("DISCORD_BOT_TOKEN", "secret"),
            ("DATA_DIR", "/var/lib/wr"),
            ("APPROVAL_ROLE", "Referee"),
            ("REGISTER_COMMANDS_GLOBALLY", "false"),
            ("REGISTER_COMMANDS_IN_GUILDS", "1,2,3"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, "/var/lib/wr");
        assert_eq!(config.approval_role, "Referee");
        assert_eq!(config.register_commands_globally, Some(false));
        assert_eq!(config.register_commands_in_guilds, Some(vec![1, 2, 3]));
    }

    #[test]
    fn missing_token_is_an_error() {
        assert!(envy::from_iter::<_, AppConfig>(vars(&[("DATA_DIR", "x")])).is_err());
    }
}
