//! Error codes for compiler diagnostics.
//!
//! Format: E#### where the first digit is the phase:
//! - E1xxx: errors forwarded from the external parser
//! - E2xxx: type errors
//! - E9xxx: internal errors

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Syntax error reported by the parser
    E1001,

    /// Type mismatch
    E2001,
    /// Operator cannot be applied to the operand types
    E2002,
    /// Undefined variable
    E2003,
    /// Lambda arity does not match its use site
    E2004,
    /// Range boundary is not an integer
    E2005,
    /// Variable defined twice in one scope
    E2006,
    /// Sequence expected
    E2007,
    /// Lambda used outside `map`/`reduce`
    E2008,

    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Short description, for `--explain` style listings.
    pub const fn description(self) -> &'static str {
        match self {
            ErrorCode::E1001 => "syntax error",
            ErrorCode::E2001 => "type mismatch",
            ErrorCode::E2002 => "operator cannot be applied to these operands",
            ErrorCode::E2003 => "undefined variable",
            ErrorCode::E2004 => "wrong number of lambda parameters",
            ErrorCode::E2005 => "range boundary must be an integer",
            ErrorCode::E2006 => "variable is already defined",
            ErrorCode::E2007 => "expected a sequence",
            ErrorCode::E2008 => "lambda outside of map/reduce",
            ErrorCode::E9001 => "internal compiler error",
        }
    }

    pub const fn is_type_error(self) -> bool {
        matches!(
            self,
            ErrorCode::E2001
                | ErrorCode::E2002
                | ErrorCode::E2003
                | ErrorCode::E2004
                | ErrorCode::E2005
                | ErrorCode::E2006
                | ErrorCode::E2007
                | ErrorCode::E2008
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
