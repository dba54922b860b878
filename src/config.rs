use crate::components::airtable::filter::{DEFAULT_CUTOFF_DAYS, DEFAULT_MIN_EVENTS};
use crate::components::poster::batch::{DEFAULT_BATCH_SIZE, MAX_ALBUM_IMAGES};
use crate::error::{config_error, env_error, RoundupResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default directory rendered images are written to
pub const DEFAULT_IMAGE_BASE_PATH: &str = "img/instagram";
/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "config/roundup.toml";

/// Branding drawn on cards and written into captions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandSettings {
    /// Name shown at the top of every card
    pub name: String,
    /// Instagram handle, without the @
    pub handle: String,
    /// First line of every caption
    pub headline: String,
    /// Where the full calendar lives
    pub calendar_link: String,
    /// Closing line of every caption
    pub call_to_action: String,
    /// Bullet points on the intro card
    pub intro_lines: Vec<String>,
}

impl Default for BrandSettings {
    fn default() -> Self {
        Self {
            name: "Rally4Israel Rally Roundup".to_string(),
            handle: "rally4israel".to_string(),
            headline: "Upcoming rallies for Israel, the Jewish community, and the hostages' release"
                .to_string(),
            calendar_link: "rally4israel.com/calendar".to_string(),
            call_to_action: "Know about an event not listed here? Send us the info!".to_string(),
            intro_lines: vec![
                "Listing rallies for Israel, the Jewish community, and the hostages' release"
                    .to_string(),
                "Full calendar at rally4israel.com/calendar (link in bio)".to_string(),
                "Send us your rally info to get featured!".to_string(),
            ],
        }
    }
}

/// Tunables read from the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Days ahead the roundup covers
    pub cutoff_days: u32,
    /// Fewer events than this in the window switches to the fallback
    pub min_events: usize,
    /// Events per album, one slot is kept for the intro image
    pub batch_size: usize,
    /// Directory containing the card fonts
    pub font_dir: PathBuf,
    pub brand: BrandSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cutoff_days: DEFAULT_CUTOFF_DAYS,
            min_events: DEFAULT_MIN_EVENTS,
            batch_size: DEFAULT_BATCH_SIZE,
            font_dir: PathBuf::from("fonts"),
            brand: BrandSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> RoundupResult<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file, or defaults when it does not exist
    pub fn load(path: &Path) -> RoundupResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                info!("Loading settings from {}", path.display());
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check values that would make an album impossible to post
    pub fn validate(&self) -> RoundupResult<()> {
        if self.batch_size == 0 || self.batch_size >= MAX_ALBUM_IMAGES {
            return Err(config_error(&format!(
                "batch_size must be between 1 and {}, got {}",
                MAX_ALBUM_IMAGES - 1,
                self.batch_size
            )));
        }
        Ok(())
    }
}

/// Instagram Graph API credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    pub access_token: String,
    pub user_id: String,
    /// Public URL the image base directory is served from
    pub public_base_url: String,
    /// Usernames invited as collaborators on every post
    pub collaborators: Vec<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub airtable_api_key: String,
    pub airtable_base_id: String,
    pub airtable_events_table_id: String,
    pub airtable_calendar_view_name: String,
    /// Missing credentials are only an error when actually publishing
    pub instagram: Option<InstagramConfig>,
    /// Directory rendered images are written to
    pub image_base_path: PathBuf,
    /// Timezone for the post date on intro cards
    pub timezone: String,
    /// Log albums instead of publishing them
    pub dry_run: bool,
    /// Open every rendered image in the system viewer
    pub open_images: bool,
    pub settings: Settings,
}

impl Config {
    /// Load configuration from environment and settings file
    pub fn load() -> RoundupResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let airtable_api_key = required_var("AIRTABLE_API_KEY")?;
        let airtable_base_id = required_var("AIRTABLE_BASE_ID")?;
        let airtable_events_table_id = required_var("AIRTABLE_EVENTS_TABLE_ID")?;
        let airtable_calendar_view_name = required_var("AIRTABLE_CALENDAR_VIEW_NAME")?;

        let instagram = match (
            optional_var("INSTAGRAM_ACCESS_TOKEN"),
            optional_var("INSTAGRAM_USER_ID"),
            optional_var("IMAGE_PUBLIC_BASE_URL"),
        ) {
            (Some(access_token), Some(user_id), Some(public_base_url)) => Some(InstagramConfig {
                access_token,
                user_id,
                public_base_url,
                collaborators: parse_list(&optional_var("INSTAGRAM_COLLABORATORS").unwrap_or_default()),
            }),
            _ => None,
        };

        let image_base_path = PathBuf::from(
            optional_var("IMAGE_BASE_PATH").unwrap_or_else(|| DEFAULT_IMAGE_BASE_PATH.to_string()),
        );
        let timezone = optional_var("TIMEZONE").unwrap_or_else(|| String::from("UTC"));
        let dry_run = optional_var("DRY_RUN").map(|v| parse_flag(&v)).unwrap_or(false);
        let open_images = optional_var("OPEN_IMAGES").map(|v| parse_flag(&v)).unwrap_or(false);

        let settings_path = optional_var("ROUNDUP_SETTINGS").unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
        let mut settings = Settings::load(Path::new(&settings_path))?;

        // Environment overrides the settings file
        if let Some(days) = optional_var("CUTOFF_DAYS") {
            settings.cutoff_days = days
                .parse::<u32>()
                .map_err(|_| config_error(&format!("CUTOFF_DAYS must be a whole number, got {}", days)))?;
        }
        if let Some(min) = optional_var("MIN_EVENTS") {
            settings.min_events = min
                .parse::<usize>()
                .map_err(|_| config_error(&format!("MIN_EVENTS must be a whole number, got {}", min)))?;
        }

        Ok(Config {
            airtable_api_key,
            airtable_base_id,
            airtable_events_table_id,
            airtable_calendar_view_name,
            instagram,
            image_base_path,
            timezone,
            dry_run,
            open_images,
            settings,
        })
    }

    /// Instagram credentials, required when not in dry-run mode
    pub fn instagram(&self) -> RoundupResult<&InstagramConfig> {
        self.instagram.as_ref().ok_or_else(|| {
            env_error("INSTAGRAM_ACCESS_TOKEN, INSTAGRAM_USER_ID and IMAGE_PUBLIC_BASE_URL (or set DRY_RUN=true)")
        })
    }
}

fn required_var(name: &str) -> RoundupResult<String> {
    optional_var(name).ok_or_else(|| env_error(name))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Interpret a boolean-ish environment value
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Split a comma-separated list, dropping blanks
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_file_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cutoff_days, 10);
        assert_eq!(settings.min_events, 10);
        assert_eq!(settings.batch_size, 19);
    }

    #[test]
    fn test_partial_settings_file() {
        let settings = Settings::from_toml_str(
            r#"
            cutoff_days = 14

            [brand]
            name = "Weekend Roundup"
            "#,
        )
        .unwrap();

        assert_eq!(settings.cutoff_days, 14);
        assert_eq!(settings.min_events, 10);
        assert_eq!(settings.brand.name, "Weekend Roundup");
        assert_eq!(settings.brand.handle, BrandSettings::default().handle);
    }

    #[test]
    fn test_rejects_batch_size_that_leaves_no_room_for_intro() {
        assert!(Settings::from_toml_str("batch_size = 20").is_err());
        assert!(Settings::from_toml_str("batch_size = 0").is_err());
        assert!(Settings::from_toml_str("batch_size = 5").is_ok());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Settings::from_toml_str("cutoff_days = \"ten\"").is_err());
    }

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let settings = Settings::load(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("alice, bob,,"), vec!["alice", "bob"]);
        assert!(parse_list("").is_empty());
    }
}
