/// SQLite has no decimal column type, so decimal newtypes are stored as their exact TEXT representation.
///
/// The wrapped type must be a single-field tuple struct around `rust_decimal::Decimal`.
macro_rules! sqlite_decimal_text {
    ($for_struct:ident) => {
        impl sqlx::Type<sqlx::Sqlite> for $for_struct {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <str as sqlx::Type<sqlx::Sqlite>>::type_info()
            }

            fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for $for_struct {
            fn encode_by_ref(
                &self,
                args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> sqlx::encode::IsNull {
                args.push(sqlx::sqlite::SqliteArgumentValue::Text(std::borrow::Cow::Owned(self.0.to_string())));
                sqlx::encode::IsNull::No
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for $for_struct {
            fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
                let value = <rust_decimal::Decimal as std::str::FromStr>::from_str(text)?;
                Ok(Self(value))
            }
        }
    };
}
