//! Macro for implementing Display and FromStr for status enums
//!
//! Readiness, sync and quote statuses are persisted as lowercase text and
//! arrive from the REST facade as free-form strings, so every status enum
//! needs the same pair of conversions.
//!
//! # Example
//!
//! ```rust
//! use fflbro_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum FeedState {
//!     Idle,
//!     Fetching,
//! }
//!
//! impl_domain_status_conversions!(FeedState {
//!     Idle => "idle",
//!     Fetching => "fetching",
//! });
//!
//! assert_eq!(FeedState::Fetching.to_string(), "fetching");
//! assert_eq!("IDLE".parse::<FeedState>().unwrap(), FeedState::Idle);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// - Display writes the lowercase wire name
/// - FromStr parses case-insensitively, trimming surrounding whitespace
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Lowercase wire name of the status.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
