//! SELECT statement compilation.
//!
//! Assembly is linear: combinator, DISTINCT, select list, FROM, WHERE,
//! GROUP BY, HAVING, ORDER BY, then the pagination strategy as the final
//! textual wrap, since the ROW_NUMBER() derived table must enclose
//! everything built before it.

use std::collections::HashMap;

use tracing::debug;

use crate::ast::expression::{Expr, FuncKind};
use crate::ast::ident;
use crate::ast::statement::{Combinator, FromSource, OrderBy, SelectQuery};
use crate::ast::value::SqlValue;
use crate::capability::Capabilities;
use crate::error::{CompileError, Result};
use crate::fragment::Fragment;

use super::expr::ExprCompiler;
use super::group_by;
use super::pagination::{self, RowWindow};

/// Compiles a [`SelectQuery`] into SQL text and bind values.
pub struct SelectCompiler<'q> {
    query: &'q SelectQuery,
    caps: &'q Capabilities,
    in_transaction: bool,
    subquery: bool,
    alias_refcount: HashMap<String, u32>,
}

impl<'q> SelectCompiler<'q> {
    /// Creates a compiler for `query` against `caps`.
    #[must_use]
    pub fn new(query: &'q SelectQuery, caps: &'q Capabilities) -> Self {
        let mut alias_refcount = HashMap::new();
        for (i, src) in query.from.iter().enumerate() {
            // The driving table is always retained.
            let initial = u32::from(i == 0);
            alias_refcount.insert(src.effective_alias().to_string(), initial);
        }
        Self {
            query,
            caps,
            in_transaction: false,
            subquery: query.subquery,
            alias_refcount,
        }
    }

    /// Declares whether an active transaction surrounds execution. Row
    /// locking is rejected without one.
    #[must_use]
    pub const fn in_transaction(mut self, active: bool) -> Self {
        self.in_transaction = active;
        self
    }

    /// Marks the statement as embedded in an outer query.
    #[must_use]
    pub(crate) const fn as_subquery(mut self) -> Self {
        self.subquery = true;
        self
    }

    /// Compiles the statement.
    ///
    /// Alias reference counts are adjusted while deciding which joins are
    /// still needed and restored before returning, on the error path too,
    /// so the same compiler (and the same tree) can be compiled again.
    pub fn compile(&mut self) -> Result<(String, Vec<SqlValue>)> {
        let saved = self.alias_refcount.clone();
        let out = self.compile_stmt();
        self.alias_refcount = saved;
        out
    }

    fn compile_stmt(&mut self) -> Result<(String, Vec<SqlValue>)> {
        if let Some(combinator) = self.query.combinator {
            return self.compile_combinator(combinator);
        }

        let exprs = ExprCompiler::new(self.caps);
        let window = pagination::plan(self.query.low_mark, self.query.high_mark, self.caps);
        let with_limit_offset = self.query.high_mark.is_some() || self.query.low_mark > 0;
        let emulated = window.is_emulated();

        let group_by = group_by::legalize(&self.query.group_by);
        let mut order_by: Vec<OrderBy> = self.query.order_by.clone();

        if !self.query.distinct_on.is_empty() {
            if group_by.is_empty() {
                return Err(CompileError::unsupported("DISTINCT ON fields"));
            }
            return Err(CompileError::InvalidQueryShape(String::from(
                "GROUP BY cannot be combined with per-field DISTINCT",
            )));
        }

        // Native OFFSET requires an ORDER BY; fall back to the driving
        // table's primary key.
        if matches!(window, RowWindow::OffsetFetch { .. }) && order_by.is_empty() {
            order_by.push(OrderBy::asc(self.pk_order_expr()?));
        }

        // Count alias references after grouping legalization (dropped
        // grouping expressions no longer keep a join alive) but before the
        // ordering migrates into the rank column, which still renders it.
        self.count_references(&group_by, &order_by);

        // Emulated offsets move the ordering into the ROW_NUMBER() rank.
        let rank_order = if emulated {
            Some(self.rank_ordering(&mut order_by, &exprs)?)
        } else {
            None
        };

        let locking = self.locking_hints(with_limit_offset)?;

        let mut stmt = Fragment::new();
        if self.query.explain {
            let prefix = self
                .caps
                .explain_prefix
                .ok_or_else(|| CompileError::unsupported("EXPLAIN"))?;
            stmt.push_sql(prefix);
            stmt.push_sql(" ");
        }
        stmt.push_sql("SELECT ");
        if self.query.distinct {
            stmt.push_sql("DISTINCT ");
        }
        // Row limiting is declared at the very start of the select list in
        // this dialect.
        if let RowWindow::Top(n) = window {
            stmt.push_sql(&format!("TOP {n} "));
        }

        // The rank-filtering wrapper references columns by name, so every
        // entry needs an alias once emulation (or extra-column hiding) is in
        // play.
        let force_aliases = emulated || (self.subquery && !self.query.extra_columns.is_empty());
        let mut out_cols: Vec<Fragment> = Vec::new();
        let mut out_names: Vec<Option<String>> = Vec::new();
        let mut col_idx = 1_usize;
        for col in self
            .query
            .columns
            .iter()
            .chain(self.query.extra_columns.iter())
        {
            let mut frag = exprs.compile(&col.expr)?;
            let alias = match (&col.alias, force_aliases) {
                (Some(alias), _) => Some(alias.clone()),
                (None, true) => {
                    let synthesized = format!("Col{col_idx}");
                    col_idx += 1;
                    Some(synthesized)
                }
                (None, false) => None,
            };
            if let Some(alias) = &alias {
                frag.push_sql(&format!(" AS {}", ident::quote(alias)));
            }
            out_names.push(alias);
            out_cols.push(frag);
        }
        if let Some(rank) = rank_order {
            let mut frag = Fragment::raw("ROW_NUMBER() OVER (ORDER BY ");
            frag.append(rank);
            frag.push_sql(") AS [rn]");
            out_cols.push(frag);
        }
        stmt.append(Fragment::join(out_cols, ", "));

        let from = self.from_clause(&exprs)?;
        if !from.is_empty() {
            stmt.push_sql(" FROM ");
            stmt.append(from);
        }
        if let Some(hints) = locking {
            stmt.push_sql(" ");
            stmt.push_sql(&hints);
        }

        match &self.query.where_clause {
            Some(predicate) if predicate.is_trivially_true() => {}
            Some(predicate) if predicate.is_trivially_false() => {
                stmt.push_sql(" WHERE 0 = 1");
            }
            Some(predicate) => {
                stmt.push_sql(" WHERE ");
                stmt.append(exprs.compile(predicate)?);
            }
            None => {}
        }

        let mut force_degenerate_order = false;
        if !group_by.is_empty() {
            let parts = group_by
                .iter()
                .map(|g| exprs.compile(g))
                .collect::<Result<Vec<_>>>()?;
            stmt.push_sql(" GROUP BY ");
            stmt.append(Fragment::join(parts, ", "));
            if order_by.is_empty() && !emulated {
                force_degenerate_order = true;
            }
        }

        if let Some(having) = &self.query.having {
            stmt.push_sql(" HAVING ");
            stmt.append(exprs.compile(having)?);
        }

        if force_degenerate_order {
            // Grouping without an ordering: force a deterministic no-op
            // ordering rather than erroring.
            stmt.push_sql(" ORDER BY (SELECT NULL)");
        } else if !order_by.is_empty() {
            let mut parts = Vec::new();
            for entry in &order_by {
                // RAND() is evaluated once per statement here; NEWID()
                // actually shuffles rows.
                if matches!(
                    &entry.expr,
                    Expr::Func {
                        kind: FuncKind::Random,
                        ..
                    }
                ) {
                    parts.push(Fragment::raw(format!(
                        "NEWID() {}",
                        entry.direction.as_str()
                    )));
                } else {
                    parts.push(exprs.compile_order(entry)?);
                }
            }
            stmt.push_sql(" ORDER BY ");
            stmt.append(Fragment::join(parts, ", "));
            // An ordered statement without TOP or OFFSET is illegal as a
            // subquery; OFFSET 0 is a no-op that keeps it legal everywhere.
            if !with_limit_offset && self.caps.supports_offset_fetch {
                stmt.push_sql(" OFFSET 0 ROWS");
            }
        }

        match window {
            RowWindow::OffsetFetch { skip, fetch } => {
                stmt.push_sql(&format!(" OFFSET {skip} ROWS"));
                if let Some(count) = fetch {
                    stmt.push_sql(&format!(" FETCH FIRST {count} ROWS ONLY"));
                }
            }
            RowWindow::Emulated { low, high } => {
                let mut outer = Fragment::raw("SELECT * FROM (");
                outer.append(stmt);
                outer.push_sql(") AS X WHERE X.rn ");
                match high {
                    Some(high) => outer.push_sql(&format!("BETWEEN {} AND {high}", low + 1)),
                    None => outer.push_sql(&format!(">= {}", low + 1)),
                }
                // Re-ordering by rank is unnecessary (and in some contexts
                // illegal) when the statement is embedded.
                if !self.subquery {
                    outer.push_sql(" ORDER BY X.rn");
                }
                stmt = outer;
            }
            RowWindow::All | RowWindow::Top(_) => {}
        }

        if self.subquery && !self.query.extra_columns.is_empty() {
            // The embedding context expects the declared columns only; hide
            // the ordering-only extras behind one more derived table.
            let list = out_names
                .iter()
                .take(self.query.columns.len())
                .filter_map(|name| {
                    name.as_ref()
                        .map(|n| format!("[subquery].{}", ident::quote(n)))
                })
                .collect::<Vec<_>>()
                .join(", ");
            let mut outer = Fragment::raw(format!("SELECT {list} FROM ("));
            outer.append(stmt);
            outer.push_sql(") subquery");
            stmt = outer;
        }

        debug!(
            placeholders = stmt.placeholder_count(),
            params = stmt.params().len(),
            "compiled SELECT"
        );
        Ok(stmt.into_parts())
    }

    fn compile_combinator(&self, combinator: Combinator) -> Result<(String, Vec<SqlValue>)> {
        let supported = match combinator {
            Combinator::Union { .. } => self.caps.supports_union,
            Combinator::Intersect => self.caps.supports_intersect,
            Combinator::Except => self.caps.supports_except,
        };
        if !supported {
            return Err(CompileError::unsupported(combinator.name()));
        }
        if self.query.combined.len() < 2 {
            return Err(CompileError::InvalidQueryShape(String::from(
                "a set operation needs at least two member queries",
            )));
        }
        let mut parts = Vec::new();
        for member in &self.query.combined {
            let (sql, params) = SelectCompiler::new(member, self.caps).compile()?;
            parts.push(Fragment::with_params(sql, params));
        }
        let separator = format!(" {} ", combinator.as_str());
        Ok(Fragment::join(parts, &separator).into_parts())
    }

    fn pk_order_expr(&self) -> Result<Expr> {
        let pk = self.query.pk_column.as_deref().ok_or_else(|| {
            CompileError::InvalidQueryShape(String::from(
                "an offset query needs an explicit ordering or a primary key on the driving table",
            ))
        })?;
        let table = self
            .query
            .from
            .first()
            .map(FromSource::effective_alias)
            .ok_or_else(|| {
                CompileError::InvalidQueryShape(String::from("query has no FROM source"))
            })?;
        Ok(Expr::qualified_column(table, pk))
    }

    /// Builds the ordering the rank column is numbered by, consuming the
    /// statement's ORDER BY (the ordering now lives inside OVER).
    fn rank_ordering(
        &self,
        order_by: &mut Vec<OrderBy>,
        exprs: &ExprCompiler<'_>,
    ) -> Result<Fragment> {
        if order_by.is_empty() {
            return exprs.compile_order(&OrderBy::asc(self.pk_order_expr()?));
        }
        let mut parts = Vec::new();
        for entry in order_by.iter() {
            // The OVER clause cannot see select-list aliases; order by the
            // underlying expression with an explicit direction instead.
            let frag = if let Expr::Ref { source, .. } = &entry.expr {
                let mut f = exprs.compile(source)?;
                f.push_sql(" ");
                f.push_sql(entry.direction.as_str());
                f
            } else {
                exprs.compile_order(entry)?
            };
            parts.push(frag);
        }
        order_by.clear();
        Ok(Fragment::join(parts, ", "))
    }

    fn count_references(&mut self, group_by: &[&Expr], order_by: &[OrderBy]) {
        let query = self.query;
        let mut found: Vec<&str> = Vec::new();
        for col in query.columns.iter().chain(query.extra_columns.iter()) {
            collect_aliases(&col.expr, &mut found);
        }
        if let Some(predicate) = &query.where_clause {
            collect_aliases(predicate, &mut found);
        }
        for expr in group_by {
            collect_aliases(expr, &mut found);
        }
        if let Some(having) = &query.having {
            collect_aliases(having, &mut found);
        }
        for entry in order_by {
            collect_aliases(&entry.expr, &mut found);
        }
        for name in found {
            if let Some(count) = self.alias_refcount.get_mut(name) {
                *count += 1;
            }
        }

        // A kept join's ON condition keeps the sources it references alive.
        // Conditions refer to earlier sources, so walk back to front.
        for src in query.from.iter().rev() {
            let Some(join) = &src.join else { continue };
            let alias = src.effective_alias();
            if self.alias_refcount.get(alias).copied().unwrap_or(0) == 0 {
                continue;
            }
            if let Some(on) = &join.on {
                let mut on_refs: Vec<&str> = Vec::new();
                collect_aliases(on, &mut on_refs);
                for name in on_refs {
                    if name == alias {
                        continue;
                    }
                    if let Some(count) = self.alias_refcount.get_mut(name) {
                        *count += 1;
                    }
                }
            }
        }
    }

    fn from_clause(&self, exprs: &ExprCompiler<'_>) -> Result<Fragment> {
        let mut parts = Vec::new();
        for src in &self.query.from {
            let alias = src.effective_alias();
            let refcount = self.alias_refcount.get(alias).copied().unwrap_or(0);
            if refcount == 0 && src.join.is_some() {
                debug!(alias, "pruning unreferenced join");
                continue;
            }
            let mut frag = match &src.join {
                None => {
                    let mut f = Fragment::raw(ident::quote(&src.table.name));
                    if let Some(alias) = &src.alias {
                        f.push_sql(&format!(" {}", ident::quote(alias)));
                    }
                    f
                }
                Some(join) => {
                    let mut f = Fragment::raw(format!(
                        "{} {}",
                        join.join_type.as_str(),
                        ident::quote(&src.table.name)
                    ));
                    if let Some(alias) = &src.alias {
                        f.push_sql(&format!(" {}", ident::quote(alias)));
                    }
                    if let Some(on) = &join.on {
                        f.push_sql(" ON (");
                        f.append(exprs.compile(on)?);
                        f.push_sql(")");
                    }
                    f
                }
            };
            if let Some(schema) = &src.table.schema {
                if self.caps.default_schema.as_deref() != Some(schema.as_str()) {
                    frag = qualify_schema(frag, schema);
                }
            }
            parts.push(frag);
        }
        Ok(Fragment::join(parts, " "))
    }

    fn locking_hints(&self, with_limit_offset: bool) -> Result<Option<String>> {
        let Some(lock) = &self.query.locking else {
            return Ok(None);
        };
        if !self.caps.has_select_for_update {
            return Ok(None);
        }
        if !self.in_transaction {
            return Err(CompileError::TransactionState(String::from(
                "select_for_update cannot be used outside of a transaction",
            )));
        }
        if with_limit_offset && !self.caps.supports_select_for_update_with_limit {
            return Err(CompileError::unsupported(
                "LIMIT/OFFSET with select_for_update",
            ));
        }
        if lock.nowait && !self.caps.has_select_for_update_nowait {
            return Err(CompileError::unsupported("NOWAIT"));
        }
        if lock.skip_locked && !self.caps.has_select_for_update_skip_locked {
            return Err(CompileError::unsupported("SKIP LOCKED"));
        }
        if !lock.of.is_empty() && !self.caps.has_select_for_update_of {
            return Err(CompileError::unsupported("FOR UPDATE OF"));
        }

        let mut hints = vec!["ROWLOCK", "UPDLOCK"];
        if lock.nowait {
            hints.push("NOWAIT");
        }
        if lock.skip_locked {
            hints.push("READPAST");
        }
        Ok(Some(format!("WITH ({})", hints.join(", "))))
    }
}

/// Inserts the bracketed schema qualifier immediately before the table
/// token. In a rendered join fragment the table follows the JOIN keyword;
/// the ON predicate segment is never touched.
fn qualify_schema(frag: Fragment, schema: &str) -> Fragment {
    let (sql, params) = frag.into_parts();
    let qualified = sql.find("JOIN ").map_or_else(
        || format!("{}.{sql}", ident::quote(schema)),
        |idx| {
            let at = idx + "JOIN ".len();
            format!("{}{}.{}", &sql[..at], ident::quote(schema), &sql[at..])
        },
    );
    Fragment::with_params(qualified, params)
}

fn collect_aliases<'e>(expr: &'e Expr, found: &mut Vec<&'e str>) {
    match expr {
        Expr::Column { table: Some(t), .. } | Expr::Wildcard { table: Some(t) } => {
            found.push(t);
        }
        _ => {}
    }
    for child in expr.children() {
        collect_aliases(child, found);
    }
}
