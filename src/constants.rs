/// User agent string for HTTP requests
pub const USER_AGENT: &str = "mcp-crop-advisor/0.1.0";

/// Default base URL of the recommendation backend
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Nominatim reverse-geocoding base URL
pub const NOMINATIM_API_BASE: &str = "https://nominatim.openstreetmap.org";

pub const RECOMMEND_PATH: &str = "/recommend";
pub const PRICES_PATH: &str = "/getPrices";
pub const WEATHER_PATH: &str = "/weather";

/// Mount point of the weather chart
pub const WEATHER_CHART_MOUNT: &str = "weatherChart";

/// Suffix carried by every backend weather timestamp
pub const IST_SUFFIX: &str = " IST";

/// Backend weather timestamp layout, without the zone suffix
pub const WEATHER_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Indian Standard Time offset from UTC, in seconds
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub const UNKNOWN_REGION: &str = "Unknown Region";
pub const PLACE_NAME_FAILED: &str = "Failed to get place name";
pub const NO_RECOMMENDATIONS: &str = "No recommendations found.";
pub const PLACEHOLDER: &str = "-";
pub const RUPEE: char = '\u{20b9}';
