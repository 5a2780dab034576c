//! Engine capability facts.
//!
//! All version-gated behavior in the compiler goes through the named
//! predicates on [`Capabilities`]. The record is built once per connection
//! (from the engine's version tier) and read-only afterwards; compilers
//! never compare raw version numbers.

/// SQL Server version tier in which the OFFSET/FETCH clause appeared.
const OFFSET_FETCH_VERSION: u16 = 2012;
/// Version tier that added variadic CONCAT.
const VARIADIC_CONCAT_VERSION: u16 = 2012;
/// Version tier that added full window-frame syntax.
const WINDOW_FRAME_VERSION: u16 = 2012;
/// Version tier that added OVER-clause support for ranking functions.
const OVER_CLAUSE_VERSION: u16 = 2005;

/// A read-only record of target-engine feature and version facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    version: u16,

    /// Native `OFFSET n ROWS [FETCH ...]` pagination.
    pub supports_offset_fetch: bool,
    /// Variadic `CONCAT(a, b, c)`.
    pub supports_variadic_concat: bool,
    /// Window expressions (`... OVER (...)`).
    pub supports_over_clause: bool,
    /// Explicit window frames (`ROWS BETWEEN ...`).
    pub supports_window_frames: bool,
    /// Multiple concurrently active result sets on one connection.
    pub supports_mars: bool,

    /// Returning columns from an INSERT at all.
    pub can_return_columns_from_insert: bool,
    /// Returning one row per inserted row from a bulk INSERT.
    pub can_return_rows_from_bulk_insert: bool,
    /// Multi-row `VALUES (...), (...)` inserts.
    pub has_bulk_insert: bool,
    /// Largest row count accepted in one bulk INSERT statement.
    pub max_insert_batch_size: usize,

    /// Row-locking reads (`WITH (UPDLOCK)` hints).
    pub has_select_for_update: bool,
    /// NOWAIT locking option.
    pub has_select_for_update_nowait: bool,
    /// SKIP LOCKED locking option (READPAST).
    pub has_select_for_update_skip_locked: bool,
    /// Restricting locks to named tables (`OF ...`).
    pub has_select_for_update_of: bool,
    /// Combining row locking with a limited/offset query.
    pub supports_select_for_update_with_limit: bool,

    /// UNION / UNION ALL combinators.
    pub supports_union: bool,
    /// INTERSECT combinator.
    pub supports_intersect: bool,
    /// EXCEPT combinator.
    pub supports_except: bool,

    /// Statement prefix that makes the engine return its plan, when the
    /// engine offers one.
    pub explain_prefix: Option<&'static str>,
    /// Connection-wide default schema; tables in this schema are rendered
    /// unqualified.
    pub default_schema: Option<String>,
}

impl Capabilities {
    /// Builds the capability record for an engine version tier
    /// (2005, 2008, 2012, ...). This is the only place raw version
    /// comparisons happen.
    #[must_use]
    pub fn for_version(version: u16) -> Self {
        Self {
            version,
            supports_offset_fetch: version >= OFFSET_FETCH_VERSION,
            supports_variadic_concat: version >= VARIADIC_CONCAT_VERSION,
            supports_over_clause: version >= OVER_CLAUSE_VERSION,
            supports_window_frames: version >= WINDOW_FRAME_VERSION,
            supports_mars: true,
            can_return_columns_from_insert: true,
            can_return_rows_from_bulk_insert: true,
            has_bulk_insert: true,
            max_insert_batch_size: 1000,
            has_select_for_update: true,
            has_select_for_update_nowait: true,
            has_select_for_update_skip_locked: true,
            has_select_for_update_of: false,
            supports_select_for_update_with_limit: false,
            supports_union: true,
            supports_intersect: true,
            supports_except: true,
            explain_prefix: None,
            default_schema: None,
        }
    }

    /// Returns the engine version tier this record was built from.
    #[must_use]
    pub const fn version(&self) -> u16 {
        self.version
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::for_version(2019)
    }
}
