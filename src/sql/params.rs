//! Typed values that can be bound to a dynamically built PostgreSQL query.

use rust_decimal::Decimal;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// One bind parameter. `None` payloads bind as typed NULLs.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlParam {
    Bool(Option<bool>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Text(Option<String>),
    Decimal(Option<Decimal>),
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(Some(v))
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(Some(v))
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::BigInt(Some(v))
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(Some(v))
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(Some(v.to_string()))
    }
}

impl From<Option<String>> for SqlParam {
    fn from(v: Option<String>) -> Self {
        SqlParam::Text(v)
    }
}

impl From<Option<i32>> for SqlParam {
    fn from(v: Option<i32>) -> Self {
        SqlParam::Int(v)
    }
}

impl From<Decimal> for SqlParam {
    fn from(v: Decimal) -> Self {
        SqlParam::Decimal(Some(v))
    }
}

impl From<Option<Decimal>> for SqlParam {
    fn from(v: Option<Decimal>) -> Self {
        SqlParam::Decimal(v)
    }
}

impl<'q> Encode<'q, Postgres> for SqlParam {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            SqlParam::Bool(v) => <Option<bool> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlParam::Int(v) => <Option<i32> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlParam::BigInt(v) => <Option<i64> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlParam::Text(v) => <Option<String> as Encode<Postgres>>::encode_by_ref(v, buf),
            SqlParam::Decimal(v) => <Option<Decimal> as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            SqlParam::Bool(_) => <bool as Type<Postgres>>::type_info(),
            SqlParam::Int(_) => <i32 as Type<Postgres>>::type_info(),
            SqlParam::BigInt(_) => <i64 as Type<Postgres>>::type_info(),
            SqlParam::Text(_) => <String as Type<Postgres>>::type_info(),
            SqlParam::Decimal(_) => <Decimal as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for SqlParam {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_the_matching_variant() {
        assert_eq!(SqlParam::from(true), SqlParam::Bool(Some(true)));
        assert_eq!(SqlParam::from(7i32), SqlParam::Int(Some(7)));
        assert_eq!(SqlParam::from("GB"), SqlParam::Text(Some("GB".into())));
        assert_eq!(SqlParam::from(None::<Decimal>), SqlParam::Decimal(None));
        assert_eq!(SqlParam::from(Decimal::new(9_000_000, 2)), SqlParam::Decimal(Some(Decimal::new(9_000_000, 2))));
    }
}
