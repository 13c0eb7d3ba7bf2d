//! Persistent entities: row types read back from the store.

use thiserror::Error;

/// A stored or submitted value outside a closed choice set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("\"{value}\" is not a valid choice for {kind}")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

/// Closed string-valued choice set stored as TEXT.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const CHOICES: &'static [&'static str] = &[$($text),+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::model::UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::model::UnknownChoice {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::model::UnknownChoice;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod airline;
pub mod blog;
pub mod review;
pub mod user;

pub use airline::Airline;
pub use blog::BlogPost;
pub use review::{AirlineReview, EmploymentStatus, Position};
pub use user::{AuthToken, Role, User, UserSettings};
