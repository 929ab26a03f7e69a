use crate::{
    ast::{
        decls::{CompilationUnit, Decl, DeclId, DeclTable},
        expressions::{Expr, ExprKind},
        statements::{Stmt, StmtKind, CATCH_BREAK, CATCH_CONTINUE},
        types::{BuiltinKind, TypeId, TypeTable},
        NodeId,
    },
    diag::{DiagCode, Diagnostics},
    SrcLoc,
};

use super::expr::{coerce_condition, coerce_to, validate_expr};
use super::resolver;
use super::scope::LocalStack;

/// State threaded through one validation pass.
pub struct Ctx<'a> {
    pub decls: &'a mut DeclTable,
    pub types: &'a mut TypeTable,
    pub diags: &'a mut Diagnostics,
    pub stack: LocalStack,
    pub current_ns: DeclId,
    pub current_fn: Option<DeclId>,
    /// Statements that currently catch `break`/`continue`, innermost
    /// last, each with its role mask.
    pub catchers: Vec<(NodeId, u8)>,
}

impl Ctx<'_> {
    /// Stand-in type for declarations whose real type could not be
    /// established. Suppresses follow-on errors without special cases.
    pub fn poison(&self) -> TypeId {
        self.types.builtin(BuiltinKind::Int32)
    }

    pub fn resolve_or_report(&mut self, id: TypeId) -> Option<TypeId> {
        match resolver::resolve_type(self.types, self.decls, self.current_ns, id) {
            Ok(resolved) => Some(resolved),
            Err(symbol) => {
                self.diags
                    .report(DiagCode::UnresolvedTypeName, Some(symbol.loc()))
                    .arg(symbol.path_string());
                None
            }
        }
    }
}

/// Validates the whole unit in source order. Errors never abort the
/// pass; a faulty node is marked invalid and stops contributing
/// further diagnostics.
pub fn validate_unit(unit: &mut CompilationUnit, diags: &mut Diagnostics) {
    let global = unit.global_namespace;
    let mut ctx = Ctx {
        decls: &mut unit.decls,
        types: &mut unit.types,
        diags,
        stack: LocalStack::new(),
        current_ns: global,
        current_fn: None,
        catchers: vec![],
    };
    validate_namespace(&mut ctx, global);
}

enum MemberKind {
    Namespace,
    GlobalVar,
    Function,
    Class,
    Alias,
    Other,
}

fn validate_namespace(ctx: &mut Ctx, ns: DeclId) {
    let saved = ctx.current_ns;
    ctx.current_ns = ns;

    let members = ctx.decls.namespace(ns).ordered.clone();
    for member in members {
        let kind = match ctx.decls.get(member) {
            Decl::Namespace(_) => MemberKind::Namespace,
            Decl::GlobalVar(_) => MemberKind::GlobalVar,
            Decl::Function(_) => MemberKind::Function,
            Decl::Class(_) => MemberKind::Class,
            Decl::TypeAlias(_) => MemberKind::Alias,
            _ => MemberKind::Other,
        };
        match kind {
            MemberKind::Namespace => validate_namespace(ctx, member),
            MemberKind::GlobalVar => validate_global_var(ctx, member),
            MemberKind::Function => validate_function(ctx, member),
            MemberKind::Class => validate_class(ctx, member),
            MemberKind::Alias => validate_alias(ctx, member),
            MemberKind::Other => {}
        }
    }

    ctx.current_ns = saved;
}

fn validate_alias(ctx: &mut Ctx, id: DeclId) {
    let target = match ctx.decls.get(id) {
        Decl::TypeAlias(alias) => alias.target,
        _ => return,
    };
    if let Some(resolved) = ctx.resolve_or_report(target) {
        if let Decl::TypeAlias(alias) = ctx.decls.get_mut(id) {
            alias.target = resolved;
        }
    }
}

fn validate_class(ctx: &mut Ctx, id: DeclId) {
    let fields = ctx.decls.class(id).fields.clone();
    for field in fields {
        let declared = ctx.decls.field(field).ty;
        let mut resolved = match ctx.resolve_or_report(declared) {
            Some(ty) => ty,
            None => ctx.poison(),
        };
        if ctx.types.is_void(resolved, ctx.decls) {
            let name = ctx.decls.field(field).name.clone();
            let loc = ctx.decls.loc_of(field).clone();
            ctx.diags
                .report(DiagCode::InvalidUseOfVoidType, Some(loc))
                .arg(name);
            resolved = ctx.poison();
        }
        ctx.decls.field_mut(field).ty = resolved;
    }
}

fn validate_global_var(ctx: &mut Ctx, id: DeclId) {
    let mut ty = match ctx.decls.var(id).ty {
        Some(declared) => Some(match ctx.resolve_or_report(declared) {
            Some(resolved) => resolved,
            None => ctx.poison(),
        }),
        None => None,
    };
    if let Some(declared) = ty {
        if ctx.types.is_void(declared, ctx.decls) {
            let name = ctx.decls.var(id).name.clone();
            let loc = ctx.decls.loc_of(id).clone();
            ctx.diags
                .report(DiagCode::InvalidUseOfVoidType, Some(loc))
                .arg(name);
            ty = Some(ctx.poison());
        }
    }

    if let Some(mut init) = ctx.decls.var_mut(id).init.take() {
        validate_expr(ctx, &mut init);
        if init.valid {
            match ty {
                Some(dest) => {
                    if !coerce_to(ctx, &mut init, dest) {
                        let src = init.ty.map(|t| ctx.types.display(t, ctx.decls));
                        ctx.diags
                            .report(DiagCode::NoViableConversion, Some(init.loc.clone()))
                            .arg(src.unwrap_or_default())
                            .arg(ctx.types.display(dest, ctx.decls));
                    }
                }
                None => ty = init.ty,
            }
        }
        ctx.decls.var_mut(id).init = Some(init);
    }

    ctx.decls.var_mut(id).ty = Some(ty.unwrap_or_else(|| ctx.poison()));
}

fn validate_function(ctx: &mut Ctx, id: DeclId) {
    // An unresolvable return type invalidates the whole function.
    let declared_ret = ctx.decls.function(id).return_type;
    let return_type = match ctx.resolve_or_report(declared_ret) {
        Some(resolved) => resolved,
        None => return,
    };
    ctx.decls.function_mut(id).return_type = return_type;

    ctx.stack = LocalStack::new();
    ctx.stack.add_scope();

    let params = ctx.decls.function(id).params.clone();
    for param in params {
        let declared = ctx.decls.var(param).ty.unwrap_or_else(|| ctx.poison());
        let mut resolved = match ctx.resolve_or_report(declared) {
            Some(ty) => ty,
            None => ctx.poison(),
        };
        let name = ctx.decls.var(param).name.clone();
        if ctx.types.is_void(resolved, ctx.decls) {
            let loc = ctx.decls.loc_of(param).clone();
            ctx.diags
                .report(DiagCode::InvalidUseOfVoidType, Some(loc))
                .arg(&name);
            resolved = ctx.poison();
        }
        ctx.decls.var_mut(param).ty = Some(resolved);

        if name.is_empty() {
            continue;
        }
        if let Err(previous) = ctx.stack.declare(&name, param) {
            let loc = ctx.decls.loc_of(param).clone();
            let prev_loc = ctx.decls.loc_of(previous).clone();
            ctx.diags
                .report(DiagCode::RedefinitionOfParameter, Some(loc))
                .arg(&name);
            ctx.diags
                .report(DiagCode::PreviousDefinitionIsHere, Some(prev_loc));
        }
    }

    if let Some(mut body) = ctx.decls.function_mut(id).body.take() {
        ctx.current_fn = Some(id);
        ctx.catchers.clear();
        validate_stmt(ctx, &mut body);

        if !ctx.types.is_void(return_type, ctx.decls) && !body.returns {
            let name = ctx.decls.function(id).name.clone();
            let loc = match &body.kind {
                StmtKind::Compound { end_loc, .. } => end_loc.clone(),
                _ => ctx.decls.loc_of(id).clone(),
            };
            ctx.diags
                .report(DiagCode::ControlReachesEndOfNonVoidFunction, Some(loc))
                .arg(name);
        }

        ctx.current_fn = None;
        ctx.decls.function_mut(id).body = Some(body);
    }

    ctx.stack.remove_scope();
}

pub fn validate_stmt(ctx: &mut Ctx, stmt: &mut Stmt) {
    let mut valid = true;
    let mut returns = false;

    match &mut stmt.kind {
        StmtKind::Compound { body, .. } => {
            ctx.stack.add_scope();
            for child in body.iter_mut() {
                validate_stmt(ctx, child);
                returns |= child.returns;
            }
            ctx.stack.remove_scope();
        }
        StmtKind::VarDecl { decls, init, .. } => {
            valid = validate_var_decl(ctx, decls, init);
        }
        StmtKind::Return { value, loc } => {
            returns = true;
            valid = validate_return(ctx, value, loc);
        }
        StmtKind::Break { loc, target } => {
            match ctx.catchers.iter().rev().find(|(_, mask)| mask & CATCH_BREAK != 0) {
                Some((id, _)) => *target = Some(*id),
                None => {
                    ctx.diags
                        .report(DiagCode::BreakNotInBreakableStatement, Some(loc.clone()));
                    valid = false;
                }
            }
        }
        StmtKind::Continue { loc, target } => {
            match ctx
                .catchers
                .iter()
                .rev()
                .find(|(_, mask)| mask & CATCH_CONTINUE != 0)
            {
                Some((id, _)) => *target = Some(*id),
                None => {
                    ctx.diags
                        .report(DiagCode::ContinueNotInContinuableStatement, Some(loc.clone()));
                    valid = false;
                }
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            if !coerce_condition(ctx, cond) {
                valid = false;
            }
            validate_stmt(ctx, then_branch);
            if let Some(else_branch) = else_branch {
                validate_stmt(ctx, else_branch);
                returns = then_branch.returns && else_branch.returns;
            }
        }
        StmtKind::Loop { cond, body, id, .. } => {
            if !coerce_condition(ctx, cond) {
                valid = false;
            }
            ctx.catchers.push((*id, CATCH_BREAK | CATCH_CONTINUE));
            validate_stmt(ctx, body);
            ctx.catchers.pop();
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
            id,
        } => {
            ctx.stack.add_scope();
            for stmt in init.iter_mut() {
                validate_stmt(ctx, stmt);
            }
            if let Some(cond) = cond {
                if !coerce_condition(ctx, cond) {
                    valid = false;
                }
            }
            for expr in step.iter_mut() {
                validate_expr(ctx, expr);
            }
            ctx.catchers.push((*id, CATCH_BREAK | CATCH_CONTINUE));
            validate_stmt(ctx, body);
            ctx.catchers.pop();
            ctx.stack.remove_scope();
        }
        StmtKind::Switch { subject, cases, id } => {
            validate_expr(ctx, subject);
            let subject_ty = if subject.valid { subject.ty } else { None };

            // A switch absorbs `break` but passes `continue` through to
            // an enclosing loop.
            ctx.catchers.push((*id, CATCH_BREAK));
            for case in cases.iter_mut() {
                if let Some(value) = &mut case.value {
                    validate_expr(ctx, value);
                    if value.valid {
                        if let Some(dest) = subject_ty {
                            if !coerce_to(ctx, value, dest) {
                                let src = value.ty.map(|t| ctx.types.display(t, ctx.decls));
                                ctx.diags
                                    .report(DiagCode::NoViableConversion, Some(value.loc.clone()))
                                    .arg(src.unwrap_or_default())
                                    .arg(ctx.types.display(dest, ctx.decls));
                                valid = false;
                            }
                        }
                    }
                }
                ctx.stack.add_scope();
                for stmt in case.body.iter_mut() {
                    validate_stmt(ctx, stmt);
                }
                ctx.stack.remove_scope();
            }
            ctx.catchers.pop();
        }
        StmtKind::Expr(expr) => {
            validate_expr(ctx, expr);
            valid = expr.valid;
        }
    }

    if !valid {
        stmt.resign_validation();
    }
    stmt.returns = returns;
}

/// Registration happens before the initializer is validated, so a
/// reference to the variable inside its own initializer resolves to
/// the fresh declaration and is diagnosed as such.
fn validate_var_decl(ctx: &mut Ctx, decl_ids: &[DeclId], init: &mut Option<Expr>) -> bool {
    let mut ok = true;

    for &decl in decl_ids {
        if let Some(declared) = ctx.decls.var(decl).ty {
            let mut resolved = match ctx.resolve_or_report(declared) {
                Some(ty) => ty,
                None => {
                    ok = false;
                    ctx.poison()
                }
            };
            if ctx.types.is_void(resolved, ctx.decls) {
                let name = ctx.decls.var(decl).name.clone();
                let loc = ctx.decls.loc_of(decl).clone();
                ctx.diags
                    .report(DiagCode::InvalidUseOfVoidType, Some(loc))
                    .arg(name);
                resolved = ctx.poison();
                ok = false;
            }
            ctx.decls.var_mut(decl).ty = Some(resolved);
        }

        let name = ctx.decls.var(decl).name.clone();
        if name.is_empty() {
            continue;
        }
        if let Err(previous) = ctx.stack.declare(&name, decl) {
            let new_ty = ctx.decls.var(decl).ty;
            let old_ty = ctx.decls.var(previous).ty;
            let same_type = match (new_ty, old_ty) {
                (Some(a), Some(b)) => ctx.types.are_equivalent(a, b, ctx.decls),
                _ => true,
            };
            let loc = ctx.decls.loc_of(decl).clone();
            let prev_loc = ctx.decls.loc_of(previous).clone();
            if same_type {
                ctx.diags
                    .report(DiagCode::RedefinitionOfLocalVariable, Some(loc))
                    .arg(&name);
            } else {
                let new_display = new_ty
                    .map(|t| ctx.types.display(t, ctx.decls))
                    .unwrap_or_default();
                let old_display = old_ty
                    .map(|t| ctx.types.display(t, ctx.decls))
                    .unwrap_or_default();
                ctx.diags
                    .report(DiagCode::RedefinitionOfLocalVarWithDifType, Some(loc))
                    .arg(&name)
                    .arg(new_display)
                    .arg(old_display);
            }
            ctx.diags
                .report(DiagCode::PreviousVariableDeclarationWasHere, Some(prev_loc));
            ok = false;
        }
    }

    if let Some(init_expr) = init {
        validate_expr(ctx, init_expr);
        if decl_ids.len() == 1 {
            let decl = decl_ids[0];
            if init_expr.valid {
                match ctx.decls.var(decl).ty {
                    Some(dest) => {
                        let is_null = matches!(init_expr.kind, ExprKind::NullPointer);
                        if is_null && ctx.types.is_pointer(dest, ctx.decls) {
                            init_expr.ty = Some(dest);
                        } else if !coerce_to(ctx, init_expr, dest) {
                            let src = init_expr.ty.map(|t| ctx.types.display(t, ctx.decls));
                            ctx.diags
                                .report(
                                    DiagCode::NoViableConversion,
                                    Some(init_expr.loc.clone()),
                                )
                                .arg(src.unwrap_or_default())
                                .arg(ctx.types.display(dest, ctx.decls));
                            ok = false;
                        }
                    }
                    None => {
                        let inferred = init_expr.ty.unwrap_or_else(|| ctx.poison());
                        ctx.decls.var_mut(decl).ty = Some(inferred);
                    }
                }
            } else {
                ok = false;
            }
        } else {
            // Multiple names with one initializer was already reported
            // by the parser.
            ok = false;
        }
    }

    // Leave no declaration untyped, whatever went wrong above.
    for &decl in decl_ids {
        if ctx.decls.var(decl).ty.is_none() {
            ctx.decls.var_mut(decl).ty = Some(ctx.poison());
        }
    }

    ok
}

fn validate_return(ctx: &mut Ctx, value: &mut Option<Expr>, loc: &SrcLoc) -> bool {
    let fn_id = match ctx.current_fn {
        Some(id) => id,
        None => return true,
    };
    let return_type = ctx.decls.function(fn_id).return_type;
    let returns_void = ctx.types.is_void(return_type, ctx.decls);
    let fn_name = ctx.decls.function(fn_id).name.clone();

    match value {
        Some(value) => {
            validate_expr(ctx, value);
            if returns_void {
                ctx.diags
                    .report(DiagCode::ReturnForVoidFunctionHasValue, Some(loc.clone()))
                    .arg(fn_name);
                return false;
            }
            if !value.valid {
                return false;
            }
            let is_null = matches!(value.kind, ExprKind::NullPointer);
            if is_null && ctx.types.is_pointer(return_type, ctx.decls) {
                value.ty = Some(return_type);
            } else if !coerce_to(ctx, value, return_type) {
                let src = value.ty.map(|t| ctx.types.display(t, ctx.decls));
                ctx.diags
                    .report(DiagCode::NoViableConversionInReturn, Some(value.loc.clone()))
                    .arg(src.unwrap_or_default())
                    .arg(ctx.types.display(return_type, ctx.decls));
                return false;
            }
            true
        }
        None => {
            if !returns_void {
                ctx.diags
                    .report(
                        DiagCode::ReturnForNonVoidFunctionNeedsValue,
                        Some(loc.clone()),
                    )
                    .arg(fn_name);
                return false;
            }
            true
        }
    }
}
