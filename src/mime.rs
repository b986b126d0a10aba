//! Content negotiation for Hub resources.
//!
//! Many Hub schemas are served under a vendor media type. Types declare it
//! through [`ContentType`] and the transport sends it as `Accept` when the
//! caller gives no explicit hint.

/// Generic JSON.
pub const APPLICATION_JSON: &str = "application/json";

pub const ADMIN_V4: &str = "application/vnd.blackducksoftware.admin-4+json";
pub const ADMIN_V5: &str = "application/vnd.blackducksoftware.admin-5+json";
pub const BILL_OF_MATERIALS_V6: &str = "application/vnd.blackducksoftware.bill-of-materials-6+json";
pub const COMPONENT_DETAIL_V4: &str = "application/vnd.blackducksoftware.component-detail-4+json";
pub const COMPONENT_DETAIL_V5: &str = "application/vnd.blackducksoftware.component-detail-5+json";
pub const POLICY_V5: &str = "application/vnd.blackducksoftware.policy-5+json";
pub const PROJECT_DETAIL_V4: &str = "application/vnd.blackducksoftware.project-detail-4+json";
pub const PROJECT_DETAIL_V5: &str = "application/vnd.blackducksoftware.project-detail-5+json";
pub const SCAN_V4: &str = "application/vnd.blackducksoftware.scan-4+json";
pub const STATUS_V4: &str = "application/vnd.blackducksoftware.status-4+json";
pub const USER_V4: &str = "application/vnd.blackducksoftware.user-4+json";
pub const VULNERABILITY_V4: &str = "application/vnd.blackducksoftware.vulnerability-4+json";

/// Request body of a rapid scan (BDIO header and chunks).
pub const RAPID_SCAN_REQUEST: &str = "application/vnd.blackducksoftware.developer-scan-1-ld-2+json";
/// Rapid scan full results.
pub const RAPID_SCAN_RESULTS: &str = "application/vnd.blackducksoftware.scan-5+json";

/// The media type a schema is served under.
pub trait ContentType {
    /// The `Accept` value to request this type with, if it has one.
    fn content_type() -> Option<&'static str> {
        None
    }
}

/// Declare the content type of one or more schema types.
///
/// ```ignore
/// declare_content_type!(Project => PROJECT_DETAIL_V4);
/// ```
macro_rules! declare_content_type {
    ($($ty:ty => $mime:expr),+ $(,)?) => {
        $(
            impl $crate::mime::ContentType for $ty {
                fn content_type() -> Option<&'static str> {
                    Some($mime)
                }
            }
        )+
    };
}

pub(crate) use declare_content_type;

impl ContentType for serde_json::Value {}
impl ContentType for String {}

impl<T: ContentType> ContentType for Vec<T> {
    fn content_type() -> Option<&'static str> {
        T::content_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl ContentType for Plain {}

    struct Policy;
    declare_content_type!(Policy => POLICY_V5);

    #[test]
    fn test_declared_and_default_types() {
        assert_eq!(Policy::content_type(), Some(POLICY_V5));
        assert_eq!(Plain::content_type(), None);
        assert_eq!(<Vec<Policy>>::content_type(), Some(POLICY_V5));
        assert_eq!(serde_json::Value::content_type(), None);
    }
}
