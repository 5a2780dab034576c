//! Function rewrite registry.
//!
//! Maps a generic function kind to its T-SQL rendering. Rules receive the
//! already-compiled operand fragments and splice them into the dialect
//! template in occurrence order, so operand duplication (padding, JSON
//! extraction) duplicates the bind values along with the text. Rules never
//! touch the query tree; [`rewrite_call`] returning `None` means "render
//! generically".

use crate::ast::expression::FuncKind;
use crate::capability::Capabilities;
use crate::fragment::Fragment;

/// Renders a plain `NAME([DISTINCT ]a, b, ...)` call.
pub(crate) fn render_call(name: &str, args: &[Fragment], distinct: bool) -> Fragment {
    let mut out = Fragment::raw(format!("{name}("));
    if distinct {
        out.push_sql("DISTINCT ");
    }
    out.append(Fragment::join(args.to_vec(), ", "));
    out.push_sql(")");
    out
}

/// Resolves the dialect rendering for `kind`, if it has one.
pub(crate) fn rewrite_call(
    kind: FuncKind,
    args: &[Fragment],
    distinct: bool,
    caps: &Capabilities,
) -> Option<Fragment> {
    match kind {
        // Plain AVG over integers truncates; force float division.
        FuncKind::Avg => {
            let mut out = Fragment::raw("AVG(");
            if distinct {
                out.push_sql("DISTINCT ");
            }
            out.push_sql("CONVERT(float, ");
            out.append(args[0].clone());
            out.push_sql("))");
            Some(out)
        }

        FuncKind::Chr => Some(render_call("NCHAR", args, distinct)),

        FuncKind::Concat => {
            if caps.supports_variadic_concat {
                None
            } else {
                // Pre-2012 engines have no CONCAT; chain + over
                // NULL-coalesced operands to keep NULL from absorbing the
                // whole result.
                let parts = args
                    .iter()
                    .map(|arg| {
                        let mut p = Fragment::raw("COALESCE(");
                        p.append(arg.clone());
                        p.push_sql(", '')");
                        p
                    })
                    .collect();
                Some(Fragment::join(parts, " + "))
            }
        }

        // COUNT returns int and overflows on large tables.
        FuncKind::Count => Some(render_call("COUNT_BIG", args, distinct)),

        FuncKind::Greatest => Some(values_extremum("MAX", "_greatest", args)),
        FuncKind::Least => Some(values_extremum("MIN", "_least", args)),

        FuncKind::Length => Some(render_call("LEN", args, distinct)),

        FuncKind::LPad => {
            let (source, length, fill) = (&args[0], &args[1], &args[2]);
            let mut out = Fragment::raw("LEFT(LEFT(REPLICATE(");
            out.append(fill.clone());
            out.push_sql(", ");
            out.append(length.clone());
            out.push_sql("), CASE WHEN ");
            out.append(length.clone());
            out.push_sql(" > LEN(");
            out.append(source.clone());
            out.push_sql(") THEN ");
            out.append(length.clone());
            out.push_sql(" - LEN(");
            out.append(source.clone());
            out.push_sql(") ELSE 0 END) + ");
            out.append(source.clone());
            out.push_sql(", ");
            out.append(length.clone());
            out.push_sql(")");
            Some(out)
        }

        FuncKind::RPad => {
            let (source, length, fill) = (&args[0], &args[1], &args[2]);
            let mut out = Fragment::raw("LEFT(");
            out.append(source.clone());
            out.push_sql(" + REPLICATE(");
            out.append(fill.clone());
            out.push_sql(", ");
            out.append(length.clone());
            out.push_sql("), ");
            out.append(length.clone());
            out.push_sql(")");
            Some(out)
        }

        FuncKind::Repeat => Some(render_call("REPLICATE", args, distinct)),

        // Population variants append P to the base name instead of using a
        // separate function family.
        FuncKind::StdDev => Some(render_call("STDEV", args, distinct)),
        FuncKind::StdDevPop => Some(render_call("STDEVP", args, distinct)),
        FuncKind::Variance => Some(render_call("VAR", args, distinct)),
        FuncKind::VarPop => Some(render_call("VARP", args, distinct)),

        // CHARINDEX takes (needle, haystack), the reverse of the generic
        // node's operand order. Swapping the compiled fragments carries the
        // parameters with them and leaves the tree untouched.
        FuncKind::StrIndex => {
            let swapped = vec![args[1].clone(), args[0].clone()];
            Some(render_call("CHARINDEX", &swapped, distinct))
        }

        FuncKind::Trim => {
            let mut out = Fragment::raw("LTRIM(RTRIM(");
            out.append(args[0].clone());
            out.push_sql("))");
            Some(out)
        }

        FuncKind::Lower
        | FuncKind::Max
        | FuncKind::Min
        | FuncKind::Random
        | FuncKind::Substr
        | FuncKind::Sum
        | FuncKind::Upper => None,
    }
}

/// Emulates GREATEST/LEAST with a table value constructor:
/// `(SELECT MAX(value) FROM (VALUES (e1), (e2), ...) AS _greatest(value))`.
fn values_extremum(func: &str, alias: &str, args: &[Fragment]) -> Fragment {
    let rows = args
        .iter()
        .map(|arg| {
            let mut row = Fragment::raw("(");
            row.append(arg.clone());
            row.push_sql(")");
            row
        })
        .collect();
    let mut out = Fragment::raw(format!("(SELECT {func}(value) FROM (VALUES "));
    out.append(Fragment::join(rows, ", "));
    out.push_sql(&format!(") AS {alias}(value))"));
    out
}
