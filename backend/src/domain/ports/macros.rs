//! Helper macro for driven-port error enums.
//!
//! Every variant carries a single adapter-supplied `message`. The macro derives
//! `thiserror::Error`, emits one snake_case constructor per variant accepting
//! anything `Into<String>`, and a `message()` accessor returning the detail
//! without the variant prefix.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { message: String },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build a [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )*

            /// Adapter-supplied detail.
            pub fn message(&self) -> &str {
                match self {
                    $( Self::$variant { message } => message, )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;
