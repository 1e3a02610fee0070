#[cfg(not(feature = "std"))]
use core as std;

use fstr::FStr;
use std::{fmt, str};

/// Digit characters used in the 20-character text representation.
///
/// The symbols are in ascending ASCII order, so the string form sorts the same way as the byte
/// form.
const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// O(1) map from ASCII code points to digit values; `0xff` marks non-digit bytes.
const DECODE_MAP: [u8; 256] = {
    let mut map = [0xff; 256];
    let mut i = 0;
    while i < DIGITS.len() {
        map[DIGITS[i] as usize] = i as u8;
        i += 1;
    }
    map
};

/// The maximum value of the 24-bit `counter` field.
pub(crate) const MAX_COUNTER: u32 = (1 << 24) - 1;

/// Represents a globally unique, time-sortable 12-byte identifier.
///
/// The derived `PartialEq`, `Ord`, and `Hash` implementations operate on the raw bytes, so two
/// IDs compare the same way as their canonical strings do.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Xid([u8; 12]);

impl Xid {
    /// The zero ID (`00000000000000000000`), also returned by [`Default::default()`].
    pub const ZERO: Self = Self([0x00; 12]);

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Creates an ID from field values.
    ///
    /// # Panics
    ///
    /// Panics if `counter` does not fit in 24 bits.
    pub const fn from_fields(timestamp: u32, machine: [u8; 3], pid: u16, counter: u32) -> Self {
        if counter > MAX_COUNTER {
            panic!("invalid field value");
        }

        Self([
            (timestamp >> 24) as u8,
            (timestamp >> 16) as u8,
            (timestamp >> 8) as u8,
            timestamp as u8,
            machine[0],
            machine[1],
            machine[2],
            (pid >> 8) as u8,
            pid as u8,
            (counter >> 16) as u8,
            (counter >> 8) as u8,
            counter as u8,
        ])
    }

    /// Creates an ID from a byte slice, failing unless it holds exactly 12 bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xid::Xid;
    ///
    /// let x = Xid::from_bytes(&[0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9])?;
    /// assert_eq!(x.to_string(), "9m4e2mr0ui3e8a215n4g");
    /// assert!(Xid::from_bytes(&[0u8; 11]).is_err());
    /// # Ok::<(), xid::ParseError>(())
    /// ```
    pub fn from_bytes(src: &[u8]) -> Result<Self, ParseError> {
        <[u8; 12]>::try_from(src)
            .map(Self)
            .map_err(|_| ParseError {})
    }

    /// Creates an ID from any value that has a well-defined ID interpretation: an existing ID,
    /// the 20-character string representation, or a sequence of exactly 12 integers in the range
    /// of `u8`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xid::Xid;
    ///
    /// let x = Xid::from_value("9m4e2mr0ui3e8a215n4g")?;
    /// assert_eq!(x, Xid::from_value(x)?);
    /// assert_eq!(x, Xid::from_value([77, 136, 225, 91, 96, 244, 134, 228, 40, 65, 45, 201])?);
    /// assert!(Xid::from_value([77, 136, 225, 91, 96, 244, 134, 228, 40, 65, 45, 1999]).is_err());
    /// # Ok::<(), xid::ParseError>(())
    /// ```
    pub fn from_value<T: TryIntoXid>(value: T) -> Result<Self, ParseError> {
        value.try_into_xid()
    }

    /// Returns the `timestamp` field value in seconds since the Unix epoch.
    pub const fn timestamp(&self) -> u32 {
        let [a, b, c, d, ..] = self.0;
        u32::from_be_bytes([a, b, c, d])
    }

    /// Returns the 3-byte machine discriminator.
    pub const fn machine(&self) -> [u8; 3] {
        [self.0[4], self.0[5], self.0[6]]
    }

    /// Returns the process discriminator.
    pub const fn pid(&self) -> u16 {
        u16::from_be_bytes([self.0[7], self.0[8]])
    }

    /// Returns the 24-bit `counter` field value.
    pub const fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Returns true if this is the zero ID.
    pub const fn is_zero(&self) -> bool {
        let mut i = 0;
        while i < self.0.len() {
            if self.0[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Returns the 20-character string representation stored in a stack-allocated string type.
    ///
    /// This method is primarily for `no_std` environments where heap-allocated string types are
    /// not readily available. Use the [`fmt::Display`] trait usually to get the canonical string
    /// representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xid::Xid;
    ///
    /// let x = "cirourjjtoj371ols490".parse::<Xid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "cirourjjtoj371ols490");
    /// assert_eq!(format!("{}", y), "cirourjjtoj371ols490");
    /// # Ok::<(), xid::ParseError>(())
    /// ```
    pub fn encode(&self) -> FStr<20> {
        // 96 bits of payload followed by four zero bits fill exactly twenty 5-bit digits
        let mut n = self.0.iter().fold(0u128, |acc, &e| acc << 8 | e as u128) << 4;

        let mut buffer = [0u8; 20];
        for e in buffer.iter_mut().rev() {
            *e = DIGITS[(n & 31) as usize];
            n >>= 5;
        }
        debug_assert!(buffer.is_ascii());

        // SAFETY: every byte is taken from `DIGITS`, which is ASCII
        unsafe { FStr::from_inner_unchecked(buffer) }
    }

    /// Returns the timestamp as [`SystemTime`](std::time::SystemTime).
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn time(&self) -> std::time::SystemTime {
        std::time::UNIX_EPOCH + std::time::Duration::from_secs(self.timestamp() as u64)
    }
}

impl fmt::Display for Xid {
    /// Returns the 20-character canonical string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Xid {
    type Err = ParseError;

    /// Creates an object from the 20-character string representation.
    ///
    /// The last digit carries four padding bits, which must be zero; any other value would decode
    /// to bytes that do not encode back to the same string.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};
        let src = src.as_bytes();
        if src.len() != 20 {
            return Err(ERR);
        }

        let mut n = 0u128;
        for &e in src {
            let digit = DECODE_MAP[e as usize];
            if digit == 0xff {
                return Err(ERR);
            }
            n = n << 5 | digit as u128;
        }
        if n & 0xf != 0 {
            return Err(ERR);
        }

        let mut dst = [0u8; 12];
        dst.copy_from_slice(&(n >> 4).to_be_bytes()[4..]);
        Ok(Self(dst))
    }
}

impl From<Xid> for [u8; 12] {
    fn from(src: Xid) -> Self {
        src.0
    }
}

impl From<[u8; 12]> for Xid {
    fn from(src: [u8; 12]) -> Self {
        Self(src)
    }
}

impl TryFrom<&[u8]> for Xid {
    type Error = ParseError;

    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(src)
    }
}

impl TryFrom<&str> for Xid {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        src.parse()
    }
}

impl AsRef<[u8]> for Xid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// A value that [`Xid::from_value()`] can interpret as an ID.
///
/// Integer sequences are validated element-wise: each element must convert into a `u8`, and the
/// sequence must hold exactly 12 elements.
pub trait TryIntoXid {
    /// Converts `self` into an ID.
    fn try_into_xid(self) -> Result<Xid, ParseError>;
}

impl TryIntoXid for Xid {
    fn try_into_xid(self) -> Result<Xid, ParseError> {
        Ok(self)
    }
}

impl TryIntoXid for &Xid {
    fn try_into_xid(self) -> Result<Xid, ParseError> {
        Ok(*self)
    }
}

impl TryIntoXid for &str {
    fn try_into_xid(self) -> Result<Xid, ParseError> {
        self.parse()
    }
}

impl<T: Copy + TryInto<u8>> TryIntoXid for &[T] {
    fn try_into_xid(self) -> Result<Xid, ParseError> {
        const ERR: ParseError = ParseError {};
        if self.len() != 12 {
            return Err(ERR);
        }

        let mut dst = [0u8; 12];
        for (d, &e) in dst.iter_mut().zip(self) {
            *d = e.try_into().map_err(|_| ERR)?;
        }
        Ok(Xid(dst))
    }
}

impl<T: Copy + TryInto<u8>, const N: usize> TryIntoXid for [T; N] {
    fn try_into_xid(self) -> Result<Xid, ParseError> {
        self.as_slice().try_into_xid()
    }
}

impl<T: Copy + TryInto<u8>, const N: usize> TryIntoXid for &[T; N] {
    fn try_into_xid(self) -> Result<Xid, ParseError> {
        self.as_slice().try_into_xid()
    }
}

/// Error parsing an invalid representation of ID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid xid representation")
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
mod std_ext {
    use super::{ParseError, TryIntoXid, Xid};

    impl From<Xid> for String {
        fn from(src: Xid) -> Self {
            src.to_string()
        }
    }

    impl TryFrom<String> for Xid {
        type Error = ParseError;

        fn try_from(src: String) -> Result<Self, Self::Error> {
            src.parse()
        }
    }

    impl TryIntoXid for String {
        fn try_into_xid(self) -> Result<Xid, ParseError> {
            self.parse()
        }
    }

    impl TryIntoXid for &String {
        fn try_into_xid(self) -> Result<Xid, ParseError> {
            self.parse()
        }
    }

    impl<T: Copy + TryInto<u8>> TryIntoXid for Vec<T> {
        fn try_into_xid(self) -> Result<Xid, ParseError> {
            self.as_slice().try_into_xid()
        }
    }

    impl std::error::Error for ParseError {}
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Xid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Xid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Xid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Xid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "an xid representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            Self::Value::from_bytes(value).map_err(de::Error::custom)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::Xid;
        use serde_test::{assert_de_tokens_error, assert_tokens, Configure, Token};

        /// Serializes and deserializes prepared cases correctly
        #[test]
        fn serializes_and_deserializes_prepared_cases_correctly() {
            let cases = [
                ("00000000000000000000", &[0u8; 12]),
                (
                    "9m4e2mr0ui3e8a215n4g",
                    &[77, 136, 225, 91, 96, 244, 134, 228, 40, 65, 45, 201],
                ),
                (
                    "cirourjjtoj371ols490",
                    &[100, 183, 143, 110, 115, 238, 38, 51, 135, 21, 225, 18],
                ),
                (
                    "vvvvvvvvvvvvvvvvvvvg",
                    &[255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255],
                ),
            ];

            for (text, bytes) in cases {
                let e = text.parse::<Xid>().unwrap();
                assert_tokens(&e.readable(), &[Token::String(text)]);
                assert_tokens(&e.compact(), &[Token::Bytes(bytes)]);
            }
        }

        /// Rejects malformed strings and byte strings
        #[test]
        fn rejects_malformed_strings_and_byte_strings() {
            assert_de_tokens_error::<serde_test::Readable<Xid>>(
                &[Token::Str("9m4e2mr0ui3e8a215n4h")],
                "invalid xid representation",
            );
            assert_de_tokens_error::<serde_test::Compact<Xid>>(
                &[Token::Bytes(&[0u8; 11])],
                "invalid xid representation",
            );
        }

        /// Embeds canonical string in JSON
        #[test]
        fn embeds_canonical_string_in_json() {
            let e: Xid = "9m4e2mr0ui3e8a215n4g".parse().unwrap();
            let json = serde_json::to_string(&[e]).unwrap();
            assert_eq!(json, r#"["9m4e2mr0ui3e8a215n4g"]"#);
            assert_eq!(serde_json::from_str::<[Xid; 1]>(&json).unwrap(), [e]);
            assert!(serde_json::from_str::<Xid>(r#""9m4e2mr0ui3e8a215n4""#).is_err());
        }
    }
}
