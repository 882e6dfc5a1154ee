//! Closed token tables for enumerated gateway fields.
//!
//! Gateways exchange enumerations as fixed string tokens (`"TO_BE_STORED"`,
//! `"1"`, `"MERCHANT"`). Every such field is modelled as a Rust enum whose
//! variants map one-to-one onto tokens through a [`WireCode`] table. Encoding
//! is total. Decoding a token outside the table fails with
//! [`UnrecognizedToken`] and never falls back to a default variant.
//!
//! Tables are declared with [`wire_codes!`](crate::wire_codes), which also
//! derives `Display`, `FromStr`, `Serialize` and `Deserialize` from the same
//! table so the two directions cannot drift apart.

use std::fmt::Debug;

/// A token received from a gateway that is not part of a closed table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {table} token from gateway: {token:?}")]
pub struct UnrecognizedToken {
    /// Name of the table the token was decoded against.
    pub table: &'static str,
    /// The offending token, verbatim.
    pub token: String,
}

impl UnrecognizedToken {
    /// Creates an error for `token` in `table`.
    #[must_use]
    pub fn new(table: &'static str, token: impl Into<String>) -> Self {
        Self {
            table,
            token: token.into(),
        }
    }
}

/// A closed, bidirectional mapping between enum variants and wire tokens.
pub trait WireCode: Debug + Copy + Eq + 'static {
    /// Table name used in error messages.
    const NAME: &'static str;

    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// Returns the wire token for this variant.
    fn encode(self) -> &'static str;

    /// Parses a wire token.
    ///
    /// # Errors
    ///
    /// Returns [`UnrecognizedToken`] if `token` is not in the table.
    fn decode(token: &str) -> Result<Self, UnrecognizedToken>;
}

#[doc(hidden)]
pub mod __private {
    pub use serde;
}

/// Declares an enum backed by a closed [`WireCode`] token table.
///
/// ```rust
/// use tender::codes::WireCode;
///
/// tender::wire_codes! {
///     /// Whether the card is kept for later use.
///     pub enum Storage {
///         /// Not kept.
///         Never => "NEVER",
///         /// Kept on file.
///         Kept => "KEPT",
///     }
/// }
///
/// assert_eq!(Storage::Kept.encode(), "KEPT");
/// assert_eq!(Storage::decode("NEVER"), Ok(Storage::Never));
/// assert!(Storage::decode("never").is_err());
/// ```
#[macro_export]
macro_rules! wire_codes {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $token:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::codes::WireCode for $name {
            const NAME: &'static str = stringify!($name);
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn encode(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }

            fn decode(token: &str) -> ::std::result::Result<Self, $crate::codes::UnrecognizedToken> {
                match token {
                    $($token => Ok(Self::$variant),)+
                    other => Err($crate::codes::UnrecognizedToken::new(stringify!($name), other)),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::codes::WireCode::encode(*self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::codes::UnrecognizedToken;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                <Self as $crate::codes::WireCode>::decode(s)
            }
        }

        impl $crate::codes::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::codes::__private::serde::Serializer,
            {
                serializer.serialize_str($crate::codes::WireCode::encode(*self))
            }
        }

        impl<'de> $crate::codes::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::codes::__private::serde::Deserializer<'de>,
            {
                let token = <::std::string::String as $crate::codes::__private::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::codes::WireCode>::decode(&token)
                    .map_err(<D::Error as $crate::codes::__private::serde::de::Error>::custom)
            }
        }
    };
}
