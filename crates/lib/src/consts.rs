//! Application-wide constants.

/// Application name, used for config and data directory names.
pub const APP_NAME: &str = "gistget";

/// File name of the manifest inside the user's gist.
pub const MANIFEST_FILENAME: &str = "GistGet.yaml";

/// Description given to a gist created on first save.
pub const GIST_DESCRIPTION: &str = "GistGet package manifest";

/// GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub web host serving the OAuth device flow endpoints.
pub const DEFAULT_GITHUB_URL: &str = "https://github.com";

/// OAuth app client ID used for the device flow.
pub const DEFAULT_CLIENT_ID: &str = "Ov23lijFVTTnJhdDBJeN";

/// OAuth scope requested by the device flow.
pub const OAUTH_SCOPE: &str = "gist";

/// Default winget executable name.
pub const DEFAULT_WINGET: &str = "winget";

/// File name of the stored credential within the config directory.
pub const CREDENTIALS_FILENAME: &str = "credentials.json";
