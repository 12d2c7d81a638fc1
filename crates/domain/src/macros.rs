//! Macro for implementing string conversions on status-like enums
//!
//! Enums persisted as TEXT columns (job kinds, saga states) share one
//! canonical lowercase spelling for storage, logs and parsing.
//!
//! # Example
//!
//! ```rust
//! use jobsync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum TriggerSource {
//!     Webhook,
//!     Timer,
//! }
//!
//! impl_domain_status_conversions!(TriggerSource {
//!     Webhook => "webhook",
//!     Timer => "timer",
//! });
//!
//! assert_eq!(TriggerSource::Timer.as_str(), "timer");
//! assert_eq!("WEBHOOK".parse::<TriggerSource>(), Ok(TriggerSource::Webhook));
//! ```

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum
///
/// Parsing is case-insensitive; rendering always uses the mapped string.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form used in storage and logs.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
