//! # Cloud Service Provider Logos
//!
//! Maps an XDI endpoint to the logo of the provider hosting it. Matching is
//! by substring, first entry wins.

/// Logo shown when no known provider matches.
pub const DEFAULT_CSP_LOGO: &str = "selfhosted-logo.png";

/// `(endpoint substring, logo file)` in match order.
pub const CSP_LOGOS: [(&str, &str); 5] = [
    ("danubeclouds.com", "danube_clouds-logo.png"),
    ("emmettglobal", "emmett_global-logo.png"),
    ("ownyourinfo", "bosonweb-logo.png"),
    ("onexus", "onexus-logo.png"),
    ("paoga", "paoga-logo.png"),
];

/// Logo file name for the provider hosting `endpoint`.
pub fn csp_logo_for_endpoint(endpoint: &str) -> &'static str {
    CSP_LOGOS
        .iter()
        .find(|(needle, _)| endpoint.contains(*needle))
        .map_or(DEFAULT_CSP_LOGO, |(_, logo)| *logo)
}
