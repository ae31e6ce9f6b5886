//! Macro for declaring port failure enums.
//!
//! `define_port_error!` derives `thiserror::Error` for the enum, gives every
//! variant a snake_case constructor whose fields accept `impl Into<T>`, and
//! adds `kind()` for log fields.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build a [`Self::", stringify!($variant), "`] failure.")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            #[doc = concat!("Build a [`Self::", stringify!($variant), "`] failure.")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (@pattern $variant:ident) => { Self::$variant };
    (@pattern $variant:ident { $($field:ident : $ty:ty),* }) => { Self::$variant { .. } };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field: $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Variant name, for structured log fields.
            pub const fn kind(&self) -> &'static str {
                match self {
                    $(
                        define_port_error!(@pattern $variant $( { $($field : $ty),* } )?) =>
                            stringify!($variant),
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum ProbeError {
            Offline => "backend offline",
            Refused { status: u16 } => "refused with {status}",
            Failed { status: u16, message: String } => "failed {status}: {message}",
        }
    }

    #[test]
    fn unit_variants_get_snake_case_constructors() {
        assert_eq!(ProbeError::offline(), ProbeError::Offline);
        assert_eq!(ProbeError::offline().to_string(), "backend offline");
    }

    #[test]
    fn field_constructors_convert_their_arguments() {
        let refused = ProbeError::refused(401_u16);
        assert_eq!(refused, ProbeError::Refused { status: 401 });

        let failed = ProbeError::failed(502_u16, "bad gateway");
        assert_eq!(failed.to_string(), "failed 502: bad gateway");
    }

    #[rstest]
    #[case(ProbeError::offline(), "Offline")]
    #[case(ProbeError::refused(403_u16), "Refused")]
    #[case(ProbeError::failed(500_u16, "boom"), "Failed")]
    fn kind_names_the_variant(#[case] error: ProbeError, #[case] expected: &str) {
        assert_eq!(error.kind(), expected);
    }
}
