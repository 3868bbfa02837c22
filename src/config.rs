use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Bot identity, logged at startup; `app_password` is the bearer secret.
    pub app_id: String,
    pub app_password: String,
    pub luis_app_id: String,
    pub luis_api_key: String,
    /// LUIS endpoint host name, e.g. "westus.api.cognitive.microsoft.com"
    pub luis_api_host_name: String,
    pub telemetry_sink: String,
    pub conversation_ttl_minutes: i64,
    pub booking_dialog_id: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "flightbook.db".to_string()),
            app_id: env::var("MicrosoftAppId").unwrap_or_default(),
            app_password: env::var("MicrosoftAppPassword").unwrap_or_default(),
            luis_app_id: env::var("LuisAppId").unwrap_or_default(),
            luis_api_key: env::var("LuisAPIKey").unwrap_or_default(),
            luis_api_host_name: env::var("LuisAPIHostName").unwrap_or_default(),
            telemetry_sink: env::var("TELEMETRY_SINK").unwrap_or_else(|_| "log".to_string()),
            conversation_ttl_minutes: env::var("CONVERSATION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            booking_dialog_id: env::var("BOOKING_DIALOG_ID")
                .unwrap_or_else(|_| "BookingDialog".to_string()),
        }
    }

    pub fn auth_enabled(&self) -> bool {
        !self.app_password.is_empty()
    }

    pub fn luis_configured(&self) -> bool {
        !self.luis_app_id.is_empty()
            && !self.luis_api_key.is_empty()
            && !self.luis_api_host_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AppConfig {
        AppConfig {
            port: 8000,
            database_url: ":memory:".to_string(),
            app_id: String::new(),
            app_password: String::new(),
            luis_app_id: "app".to_string(),
            luis_api_key: "key".to_string(),
            luis_api_host_name: "westus.api.cognitive.microsoft.com".to_string(),
            telemetry_sink: "none".to_string(),
            conversation_ttl_minutes: 30,
            booking_dialog_id: "BookingDialog".to_string(),
        }
    }

    #[test]
    fn test_luis_configured_requires_all_three() {
        assert!(base().luis_configured());

        let mut missing_key = base();
        missing_key.luis_api_key.clear();
        assert!(!missing_key.luis_configured());

        let mut missing_host = base();
        missing_host.luis_api_host_name.clear();
        assert!(!missing_host.luis_configured());
    }

    #[test]
    fn test_from_env_reads_bot_credentials() {
        env::set_var("MicrosoftAppId", "bot-app-id");
        env::set_var("MicrosoftAppPassword", "s3cret");

        let config = AppConfig::from_env();
        assert_eq!(config.app_id, "bot-app-id");
        assert_eq!(config.app_password, "s3cret");
        assert!(config.auth_enabled());

        env::remove_var("MicrosoftAppId");
        env::remove_var("MicrosoftAppPassword");
        assert!(!AppConfig::from_env().auth_enabled());
    }
}
