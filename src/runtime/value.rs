//! Conversions between Rust values and dynamic ABI values
//!
//! Generated bindings hand typed arguments to the runtime through
//! [`IntoSolValue`] and read typed results back through [`FromSolValue`].

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, FixedBytes, B256, I256, U256};

use super::BindingError;

/// Convert a Rust value into an ABI value
pub trait IntoSolValue {
    fn into_sol_value(self) -> DynSolValue;
}

/// Convert an ABI value into a Rust value
pub trait FromSolValue: Sized {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError>;
}

fn mismatch(expected: &str, got: &DynSolValue) -> BindingError {
    BindingError::Decode(format!("expected {expected}, got {}", kind_of(got)))
}

fn kind_of(value: &DynSolValue) -> &'static str {
    match value {
        DynSolValue::Bool(_) => "bool",
        DynSolValue::Int(..) => "int",
        DynSolValue::Uint(..) => "uint",
        DynSolValue::FixedBytes(..) => "fixed bytes",
        DynSolValue::Address(_) => "address",
        DynSolValue::Function(_) => "function",
        DynSolValue::Bytes(_) => "bytes",
        DynSolValue::String(_) => "string",
        DynSolValue::Array(_) => "array",
        DynSolValue::FixedArray(_) => "fixed array",
        DynSolValue::Tuple(_) => "tuple",
    }
}

impl IntoSolValue for bool {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::Bool(self)
    }
}

impl FromSolValue for bool {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl IntoSolValue for Address {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::Address(self)
    }
}

impl FromSolValue for Address {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::Address(a) => Ok(a),
            other => Err(mismatch("address", &other)),
        }
    }
}

impl IntoSolValue for String {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::String(self)
    }
}

impl IntoSolValue for &str {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::String(self.to_string())
    }
}

impl FromSolValue for String {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl IntoSolValue for Bytes {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::Bytes(self.to_vec())
    }
}

impl FromSolValue for Bytes {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::Bytes(b) => Ok(Bytes::from(b)),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl<const N: usize> IntoSolValue for FixedBytes<N> {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::FixedBytes(B256::right_padding_from(self.as_slice()), N)
    }
}

impl<const N: usize> FromSolValue for FixedBytes<N> {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::FixedBytes(word, size) if size == N => {
                Ok(FixedBytes::<N>::from_slice(&word[..N]))
            }
            other => Err(mismatch(&format!("bytes{N}"), &other)),
        }
    }
}

impl IntoSolValue for U256 {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::Uint(self, 256)
    }
}

impl FromSolValue for U256 {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::Uint(v, _) => Ok(v),
            other => Err(mismatch("uint", &other)),
        }
    }
}

impl IntoSolValue for I256 {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::Int(self, 256)
    }
}

impl FromSolValue for I256 {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::Int(v, _) => Ok(v),
            other => Err(mismatch("int", &other)),
        }
    }
}

macro_rules! impl_uint {
    ($($ty:ty => $bits:literal),+ $(,)?) => {$(
        impl IntoSolValue for $ty {
            fn into_sol_value(self) -> DynSolValue {
                DynSolValue::Uint(U256::from(self), $bits)
            }
        }

        impl FromSolValue for $ty {
            fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
                match value {
                    DynSolValue::Uint(v, _) => <$ty>::try_from(v).map_err(|_| {
                        BindingError::Decode(format!("{v} does not fit in {}", stringify!($ty)))
                    }),
                    other => Err(mismatch("uint", &other)),
                }
            }
        }
    )+};
}

impl_uint!(u8 => 8, u16 => 16, u32 => 32, u64 => 64, u128 => 128);

macro_rules! impl_int {
    ($($ty:ty => $bits:literal),+ $(,)?) => {$(
        impl IntoSolValue for $ty {
            fn into_sol_value(self) -> DynSolValue {
                DynSolValue::Int(signed_word(self as i128), $bits)
            }
        }

        impl FromSolValue for $ty {
            fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
                match value {
                    DynSolValue::Int(v, _) => <$ty>::try_from(v).map_err(|_| {
                        BindingError::Decode(format!("{v} does not fit in {}", stringify!($ty)))
                    }),
                    other => Err(mismatch("int", &other)),
                }
            }
        }
    )+};
}

impl_int!(i8 => 8, i16 => 16, i32 => 32, i64 => 64, i128 => 128);

/// Two's complement 256-bit representation of `v`
fn signed_word(v: i128) -> I256 {
    let magnitude = U256::from(v.unsigned_abs());
    if v < 0 {
        I256::from_raw(magnitude.wrapping_neg())
    } else {
        I256::from_raw(magnitude)
    }
}

impl<T: IntoSolValue> IntoSolValue for Vec<T> {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::Array(self.into_iter().map(IntoSolValue::into_sol_value).collect())
    }
}

impl<T: FromSolValue> FromSolValue for Vec<T> {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::Array(values) => values.into_iter().map(T::from_sol_value).collect(),
            other => Err(mismatch("array", &other)),
        }
    }
}

impl<T: IntoSolValue, const N: usize> IntoSolValue for [T; N] {
    fn into_sol_value(self) -> DynSolValue {
        DynSolValue::FixedArray(self.into_iter().map(IntoSolValue::into_sol_value).collect())
    }
}

impl<T: FromSolValue, const N: usize> FromSolValue for [T; N] {
    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
        match value {
            DynSolValue::FixedArray(values) => {
                let len = values.len();
                let items = values
                    .into_iter()
                    .map(T::from_sol_value)
                    .collect::<Result<Vec<T>, _>>()?;
                <[T; N]>::try_from(items).map_err(|_| {
                    BindingError::Decode(format!("expected {N} elements, got {len}"))
                })
            }
            other => Err(mismatch("fixed array", &other)),
        }
    }
}

/// Unwrap a tuple value with exactly `len` components
pub fn expect_tuple(value: DynSolValue, len: usize) -> Result<Vec<DynSolValue>, BindingError> {
    match value {
        DynSolValue::Tuple(values) if values.len() == len => Ok(values),
        DynSolValue::Tuple(values) => Err(BindingError::Decode(format!(
            "expected tuple of {len}, got {}",
            values.len()
        ))),
        other => Err(mismatch("tuple", &other)),
    }
}

/// Take and convert the next value of a decoded sequence
pub fn next_value<T: FromSolValue>(
    values: &mut impl Iterator<Item = DynSolValue>,
) -> Result<T, BindingError> {
    let value = values
        .next()
        .ok_or_else(|| BindingError::Decode("missing value".to_string()))?;
    T::from_sol_value(value)
}

/// Decoder for functions without outputs
pub fn decode_unit(_values: Vec<DynSolValue>) -> Result<(), BindingError> {
    Ok(())
}

/// Decoder for functions with exactly one output
pub fn decode_single<T: FromSolValue>(values: Vec<DynSolValue>) -> Result<T, BindingError> {
    if values.len() != 1 {
        return Err(BindingError::Decode(format!(
            "expected 1 output, got {}",
            values.len()
        )));
    }
    next_value(&mut values.into_iter())
}

/// Decoder for functions with several outputs, read as a tuple
pub fn decode_tuple<T: FromSolValue>(values: Vec<DynSolValue>) -> Result<T, BindingError> {
    T::from_sol_value(DynSolValue::Tuple(values))
}

macro_rules! impl_tuple {
    ($($len:literal => ($($name:ident),+)),+ $(,)?) => {$(
        impl<$($name: IntoSolValue),+> IntoSolValue for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_sol_value(self) -> DynSolValue {
                let ($($name,)+) = self;
                DynSolValue::Tuple(vec![$($name.into_sol_value()),+])
            }
        }

        impl<$($name: FromSolValue),+> FromSolValue for ($($name,)+) {
            fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {
                let mut values = expect_tuple(value, $len)?.into_iter();
                Ok(($(next_value::<$name>(&mut values)?,)+))
            }
        }
    )+};
}

impl_tuple!(
    1 => (A),
    2 => (A, B),
    3 => (A, B, C),
    4 => (A, B, C, D),
    5 => (A, B, C, D, E),
    6 => (A, B, C, D, E, F),
    7 => (A, B, C, D, E, F, G),
    8 => (A, B, C, D, E, F, G, H),
    9 => (A, B, C, D, E, F, G, H, I),
    10 => (A, B, C, D, E, F, G, H, I, J),
    11 => (A, B, C, D, E, F, G, H, I, J, K),
    12 => (A, B, C, D, E, F, G, H, I, J, K, L),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_uint_round_trip_and_overflow() {
        let value = 200u8.into_sol_value();
        assert_eq!(value, DynSolValue::Uint(U256::from(200u8), 8));
        assert_eq!(u8::from_sol_value(value).unwrap(), 200);

        let too_big = DynSolValue::Uint(U256::from(300u16), 8);
        assert!(matches!(u8::from_sol_value(too_big), Err(BindingError::Decode(_))));
    }

    #[test]
    fn test_negative_int() {
        let value = (-5i32).into_sol_value();
        match &value {
            DynSolValue::Int(v, 32) => assert_eq!(v.to_string(), "-5"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(i32::from_sol_value(value).unwrap(), -5);
    }

    #[test]
    fn test_fixed_bytes() {
        let raw = FixedBytes::<4>::from([0xde, 0xad, 0xbe, 0xef]);
        let value = raw.into_sol_value();
        assert!(matches!(value, DynSolValue::FixedBytes(_, 4)));
        assert_eq!(FixedBytes::<4>::from_sol_value(value.clone()).unwrap(), raw);
        assert!(FixedBytes::<8>::from_sol_value(value).is_err());
    }

    #[test]
    fn test_fixed_array_length_checked() {
        let value = DynSolValue::FixedArray(vec![DynSolValue::Bool(true)]);
        assert!(<[bool; 2]>::from_sol_value(value).is_err());
    }

    #[test]
    fn test_tuple_decoding() {
        let values = vec![
            DynSolValue::Uint(U256::from(7u8), 256),
            DynSolValue::Address(Address::ZERO),
        ];
        let (n, addr): (U256, Address) = decode_tuple(values).unwrap();
        assert_eq!(n, U256::from(7u8));
        assert_eq!(addr, Address::ZERO);
    }

    #[test]
    fn test_decode_single_rejects_wrong_arity() {
        assert!(decode_single::<bool>(vec![]).is_err());
        assert!(decode_single::<bool>(vec![DynSolValue::Bool(true)]).unwrap());
    }
}
