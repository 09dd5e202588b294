//! Two-variant result type used for every expected failure path.
//!
//! Convention: `Left` carries the failure (usually an [`ApiError`](crate::ApiError)) and
//! `Right` carries the success value. Exactly one branch is ever populated.
//!
//! ```rust
//! use riftline::Either;
//!
//! let ok: Either<String, u32> = Either::Right(7);
//! assert!(ok.is_right());
//! assert_eq!(ok.map(|n| n * 2).right(), Some(&14));
//! ```

use serde::{Deserialize, Serialize};

/// Left (failure) or Right (success).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Either<L, R> {
    /// Failure branch
    Left(L),
    /// Success branch
    Right(R),
}

impl<L, R> Either<L, R> {
    /// True when this is the `Left` branch.
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    /// True when this is the `Right` branch.
    pub fn is_right(&self) -> bool {
        matches!(self, Either::Right(_))
    }

    /// Borrow the `Left` value if present.
    pub fn left(&self) -> Option<&L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    /// Borrow the `Right` value if present.
    pub fn right(&self) -> Option<&R> {
        match self {
            Either::Right(r) => Some(r),
            Either::Left(_) => None,
        }
    }

    /// Take the `Left` value if present.
    pub fn into_left(self) -> Option<L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    /// Take the `Right` value if present.
    pub fn into_right(self) -> Option<R> {
        match self {
            Either::Right(r) => Some(r),
            Either::Left(_) => None,
        }
    }

    /// Borrow both branches.
    pub fn as_ref(&self) -> Either<&L, &R> {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Map over the `Right` value.
    pub fn map<T, F>(self, f: F) -> Either<L, T>
    where
        F: FnOnce(R) -> T,
    {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(f(r)),
        }
    }

    /// Map over the `Left` value.
    pub fn map_left<T, F>(self, f: F) -> Either<T, R>
    where
        F: FnOnce(L) -> T,
    {
        match self {
            Either::Left(l) => Either::Left(f(l)),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Chain a fallible step onto the `Right` value.
    pub fn and_then<T, F>(self, f: F) -> Either<L, T>
    where
        F: FnOnce(R) -> Either<L, T>,
    {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => f(r),
        }
    }

    /// Collapse both branches into one value.
    pub fn either<T, FL, FR>(self, on_left: FL, on_right: FR) -> T
    where
        FL: FnOnce(L) -> T,
        FR: FnOnce(R) -> T,
    {
        match self {
            Either::Left(l) => on_left(l),
            Either::Right(r) => on_right(r),
        }
    }

    /// Convert into a `Result` so `?` can be used at the call site.
    pub fn into_result(self) -> Result<R, L> {
        match self {
            Either::Left(l) => Err(l),
            Either::Right(r) => Ok(r),
        }
    }
}

impl<T> Either<T, T> {
    /// Payload of whichever branch is populated.
    pub fn into_value(self) -> T {
        match self {
            Either::Left(v) | Either::Right(v) => v,
        }
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(r) => Either::Right(r),
            Err(l) => Either::Left(l),
        }
    }
}

impl<L, R> From<Either<L, R>> for Result<R, L> {
    fn from(either: Either<L, R>) -> Self {
        either.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_branch_is_reported() {
        let left: Either<&str, u8> = Either::Left("boom");
        let right: Either<&str, u8> = Either::Right(1);

        assert!(left.is_left() && !left.is_right());
        assert!(right.is_right() && !right.is_left());
    }

    #[test]
    fn into_value_yields_payload_for_both_branches() {
        assert_eq!(Either::<u8, u8>::Left(3).into_value(), 3);
        assert_eq!(Either::<u8, u8>::Right(4).into_value(), 4);
    }

    #[test]
    fn map_only_touches_right() {
        let left: Either<&str, u8> = Either::Left("nope");
        assert_eq!(left.map(|n| n + 1), Either::Left("nope"));
        assert_eq!(Either::<&str, u8>::Right(1).map(|n| n + 1), Either::Right(2));
        assert_eq!(Either::<u8, &str>::Left(1).map_left(|n| n * 10), Either::Left(10));
    }

    #[test]
    fn and_then_short_circuits_on_left() {
        let step = |n: u8| if n > 1 { Either::Right(n) } else { Either::Left("small") };
        assert_eq!(Either::<&str, u8>::Right(5).and_then(step), Either::Right(5));
        assert_eq!(Either::<&str, u8>::Right(0).and_then(step), Either::Left("small"));
        assert_eq!(Either::<&str, u8>::Left("early").and_then(step), Either::Left("early"));
    }

    #[test]
    fn result_round_trip() {
        let from_ok: Either<String, u8> = Ok(9).into();
        assert_eq!(from_ok.right(), Some(&9));
        let from_err: Either<String, u8> = Err("bad".to_string()).into();
        assert_eq!(from_err.into_result(), Err("bad".to_string()));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let value: Either<String, u8> = Either::Right(2);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "Right", "value": 2}));
    }
}
