/// SQL flavour of the session a query is sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Standard,
    /// Backslash is an escape character inside MySQL string literals.
    MySql,
}

impl Dialect {
    /// Quotes `text` as a single-quoted string literal for this dialect.
    pub fn string_literal(&self, text: &str) -> String {
        let escaped = match self {
            Dialect::Standard => text.replace('\'', "''"),
            Dialect::MySql => text.replace('\\', "\\\\").replace('\'', "''"),
        };
        format!("'{escaped}'")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_doubles_single_quotes() {
        assert_eq!(Dialect::Standard.string_literal("O'Brien"), "'O''Brien'");
        assert_eq!(Dialect::Standard.string_literal("10"), "'10'");
    }

    #[test]
    fn standard_literal_keeps_backslashes() {
        assert_eq!(Dialect::Standard.string_literal(r"a\"), r"'a\'");
    }

    #[test]
    fn mysql_literal_escapes_backslashes() {
        assert_eq!(Dialect::MySql.string_literal(r"a\"), r"'a\\'");
        assert_eq!(Dialect::MySql.string_literal(r"x\'y"), r"'x\\''y'");
    }
}
