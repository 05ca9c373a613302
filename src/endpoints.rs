//! Endpoint metadata: which verb, body encoding and base URL an API path uses.
//!
//! Paths are given in template form, `statuses/show/:id`, with placeholders
//! named after the parameter that fills them.

use http::Method;

/// Static description of an API surface.
///
/// Implement this to point the client at another API. Every lookup receives
/// the templated path.
pub trait EndpointTable {
    /// HTTP verb for `template`, `None` for an unknown path. `has_params` is set
    /// when the call carries body or query parameters.
    fn method(&self, template: &str, has_params: bool) -> Option<Method>;

    /// Whether the body is sent as `multipart/form-data`.
    fn is_multipart(&self, template: &str) -> bool;

    /// Whether the path lives under the legacy base URL.
    fn is_legacy(&self, template: &str) -> bool {
        let _ = template;
        false
    }

    /// Parameters that may name a file whose content should be uploaded.
    fn file_parameters(&self, template: &str) -> &[&'static str] {
        let _ = template;
        &[]
    }

    /// Field synthesized from the `Location` header for paths that answer
    /// with a redirect.
    fn redirect_field(&self, template: &str) -> Option<&'static str> {
        let _ = template;
        None
    }

    /// Whether successful replies of this path may be cached.
    fn is_cached(&self, template: &str) -> bool {
        let _ = template;
        false
    }

    /// Parameter names containing an underscore that may appear as path
    /// placeholders.
    fn underscored_parameters(&self) -> &[&'static str] {
        &[]
    }
}

/// The Twitter REST API v1.1 surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwitterEndpoints;

const GET_METHODS: &[&str] = &[
    // Timelines
    "statuses/mentions_timeline",
    "statuses/user_timeline",
    "statuses/home_timeline",
    "statuses/retweets_of_me",
    "statuses/public_timeline",
    // Tweets
    "statuses/retweets/:id",
    "statuses/show/:id",
    "statuses/oembed",
    // Search
    "search/tweets",
    // Direct Messages
    "direct_messages",
    "direct_messages/sent",
    "direct_messages/show",
    // Friends & Followers
    "friends/ids",
    "followers/ids",
    "friendships/lookup",
    "friendships/incoming",
    "friendships/outgoing",
    "friendships/show",
    "friends/list",
    "followers/list",
    // Users
    "account/settings",
    "account/verify_credentials",
    "blocks/list",
    "blocks/ids",
    "users/lookup",
    "users/show",
    "users/search",
    "users/contributees",
    "users/contributors",
    "users/profile_banner",
    "users/profile_image/:screen_name",
    // Suggested Users
    "users/suggestions/:slug",
    "users/suggestions",
    "users/suggestions/:slug/members",
    // Favorites
    "favorites/list",
    // Lists
    "lists/list",
    "lists/statuses",
    "lists/memberships",
    "lists/subscribers",
    "lists/subscribers/show",
    "lists/members/show",
    "lists/members",
    "lists/show",
    "lists/subscriptions",
    // Saved searches
    "saved_searches/list",
    "saved_searches/show/:id",
    // Places & Geo
    "geo/id/:place_id",
    "geo/reverse_geocode",
    "geo/search",
    "geo/similar_places",
    // Trends
    "trends/place",
    "trends/available",
    "trends/closest",
    // OAuth
    "oauth/authenticate",
    "oauth/authorize",
    // Help
    "help/configuration",
    "help/languages",
    "help/privacy",
    "help/tos",
    "application/rate_limit_status",
    // Old
    "users/recommendations",
];

const POST_METHODS: &[&str] = &[
    // Tweets
    "statuses/destroy/:id",
    "statuses/update",
    "statuses/retweet/:id",
    "statuses/update_with_media",
    // Direct Messages
    "direct_messages/destroy",
    "direct_messages/new",
    // Friends & Followers
    "friendships/create",
    "friendships/destroy",
    "friendships/update",
    // Users
    "account/update_delivery_device",
    "account/update_profile",
    "account/update_profile_background_image",
    "account/update_profile_colors",
    "account/update_profile_image",
    "blocks/create",
    "blocks/destroy",
    "account/update_profile_banner",
    "account/remove_profile_banner",
    // Favorites
    "favorites/destroy",
    "favorites/create",
    // Lists
    "lists/members/destroy",
    "lists/subscribers/create",
    "lists/subscribers/destroy",
    "lists/members/create_all",
    "lists/members/create",
    "lists/destroy",
    "lists/update",
    "lists/create",
    "lists/members/destroy_all",
    // Saved Searches
    "saved_searches/create",
    "saved_searches/destroy/:id",
    // Places & Geo
    "geo/place",
    // Spam Reporting
    "users/report_spam",
    // OAuth
    "oauth/access_token",
    "oauth/request_token",
];

// read with GET, written with POST
const READ_WRITE_METHODS: &[&str] = &["account/settings"];

const MULTIPART_METHODS: &[(&str, &[&str])] = &[
    ("statuses/update_with_media", &["media[]"]),
    ("account/update_profile_background_image", &["image"]),
    ("account/update_profile_image", &["image"]),
    ("account/update_profile_banner", &["banner"]),
];

const LEGACY_METHODS: &[&str] = &[
    "users/recommendations",
    "statuses/public_timeline",
    "users/profile_image/:screen_name",
];

const REDIRECT_METHODS: &[(&str, &str)] = &[(
    "users/profile_image/:screen_name",
    "profile_image_url_https",
)];

const CACHED_METHODS: &[&str] = &["statuses/public_timeline"];

const UNDERSCORED_PARAMETERS: &[&str] = &["screen_name", "place_id"];

impl EndpointTable for TwitterEndpoints {
    fn method(&self, template: &str, has_params: bool) -> Option<Method> {
        if READ_WRITE_METHODS.contains(&template) {
            return Some(if has_params { Method::POST } else { Method::GET });
        }
        if GET_METHODS.contains(&template) {
            Some(Method::GET)
        } else if POST_METHODS.contains(&template) {
            Some(Method::POST)
        } else {
            None
        }
    }

    fn is_multipart(&self, template: &str) -> bool {
        MULTIPART_METHODS.iter().any(|(path, _)| *path == template)
    }

    fn is_legacy(&self, template: &str) -> bool {
        LEGACY_METHODS.contains(&template)
    }

    fn file_parameters(&self, template: &str) -> &[&'static str] {
        MULTIPART_METHODS
            .iter()
            .find(|(path, _)| *path == template)
            .map(|(_, files)| *files)
            .unwrap_or(&[])
    }

    fn redirect_field(&self, template: &str) -> Option<&'static str> {
        REDIRECT_METHODS
            .iter()
            .find(|(path, _)| *path == template)
            .map(|(_, field)| *field)
    }

    fn is_cached(&self, template: &str) -> bool {
        CACHED_METHODS.contains(&template)
    }

    fn underscored_parameters(&self) -> &[&'static str] {
        UNDERSCORED_PARAMETERS
    }
}
