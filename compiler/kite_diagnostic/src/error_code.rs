//! Error codes for semantic-core diagnostics.
//!
//! The first digit names the phase, following the wider compiler's scheme;
//! this core only emits type errors (`E2xxx`) and internal errors (`E9xxx`).

use std::fmt;

/// Stable diagnostic codes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    /// Value type not assignable to the expected type
    E2001,
    /// Unknown type name
    E2002,
    /// Unknown identifier
    E2003,
    /// Wrong number of call arguments
    E2004,
    /// Generic parameter could not be inferred
    E2005,
    /// Generic parameter bound to two different types
    E2006,
    /// Bound type does not satisfy a parameter constraint
    E2007,
    /// Wrong number or kind of explicit generic arguments
    E2008,
    /// Const generic argument outside its declared domain
    E2009,
    /// Const generic argument is not a compile-time constant
    E2010,
    /// Branch types share more than one interface
    E2011,
    /// Branch types have no common type
    E2012,
    /// `is` applied to a value that cannot hold the tested type
    E2013,
    /// `is` test that flow facts prove can never hold
    E2014,
    /// Unknown field or method
    E2015,
    /// Call target is not a function
    E2016,
    /// Assignment through an immutable binding
    E2017,
    /// Declaration name defined twice
    E2018,
    /// Untyped `none`/`nil` with no type to adopt
    E2019,
    /// Operator not defined for the operand types
    E2020,
    /// `break`/`continue` outside a loop
    E2021,

    /// Internal invariant violated
    E9001,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E2015,
        ErrorCode::E2016,
        ErrorCode::E2017,
        ErrorCode::E2018,
        ErrorCode::E2019,
        ErrorCode::E2020,
        ErrorCode::E2021,
        ErrorCode::E9001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E2020 => "E2020",
            ErrorCode::E2021 => "E2021",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Human-readable kebab-case name, stable across releases.
    pub fn slug(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "type-mismatch",
            ErrorCode::E2002 => "unknown-type",
            ErrorCode::E2003 => "unknown-identifier",
            ErrorCode::E2004 => "arg-count-mismatch",
            ErrorCode::E2005 => "unresolved-generic",
            ErrorCode::E2006 => "conflicting-binding",
            ErrorCode::E2007 => "constraint-violation",
            ErrorCode::E2008 => "generic-arg-mismatch",
            ErrorCode::E2009 => "const-generic-domain",
            ErrorCode::E2010 => "const-generic-not-constant",
            ErrorCode::E2011 => "ambiguous-lub",
            ErrorCode::E2012 => "incompatible-branches",
            ErrorCode::E2013 => "invalid-narrowing-target",
            ErrorCode::E2014 => "impossible-type-test",
            ErrorCode::E2015 => "unknown-member",
            ErrorCode::E2016 => "not-callable",
            ErrorCode::E2017 => "assign-to-immutable",
            ErrorCode::E2018 => "duplicate-definition",
            ErrorCode::E2019 => "untyped-literal",
            ErrorCode::E2020 => "invalid-operands",
            ErrorCode::E2021 => "control-outside-loop",
            ErrorCode::E9001 => "internal-error",
        }
    }

    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse `"E2001"` (case-insensitive) or a slug such as `"type-mismatch"`.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper || code.slug() == s)
            .copied()
            .ok_or(())
    }
}
