// Grafana HTTP API path constants

pub mod api_path {
    // Health
    pub const HEALTH: &str = "/api/health";

    // Search
    pub const SEARCH: &str = "/api/search";

    // Folders
    pub const FOLDERS: &str = "/api/folders";

    // Dashboards
    pub const DASHBOARD_IMPORT: &str = "/api/dashboards/import";
    pub const DASHBOARD_BY_SLUG: &str = "/api/dashboards/db";

    // Datasources
    pub const DATASOURCES: &str = "/api/datasources";

    // User / org preferences
    pub const USER_STAR_DASHBOARD: &str = "/api/user/stars/dashboard";
    pub const ORG_PREFERENCES: &str = "/api/org/preferences";
}

/// Environment variable holding an optional bearer token
pub const ENV_BEARER_TOKEN: &str = "GRAFANA_BEARER_TOKEN";
/// Environment variable holding an optional basic-auth user
pub const ENV_USER: &str = "GRAFANA_USER";
/// Environment variable holding an optional basic-auth password
pub const ENV_PASSWORD: &str = "GRAFANA_PASSWORD";
