use std::mem;

use crate::{
    ast::{
        decls::DeclId,
        expressions::{classify_binary, BinaryClass, Expr, ExprKind, UnaryOp},
        symbol::Symbol,
        types::{BuiltinKind, TypeId, TypeKind},
    },
    diag::DiagCode,
    lexer::tokens::TokenKind,
    parser::lookups::detach_assignment,
    SrcLoc,
};

use super::resolver;
use super::validator::Ctx;

/// Replaces `expr` with an implicit cast of itself to `ty`.
fn wrap_implicit_cast(expr: &mut Expr, ty: TypeId) {
    let loc = expr.loc.clone();
    let inner = mem::replace(expr, Expr::new(ExprKind::IntLit(0), loc.clone()));
    *expr = Expr {
        kind: ExprKind::ImplicitCast {
            inner: Box::new(inner),
        },
        valid: true,
        ty: Some(ty),
        loc,
    };
}

/// Replaces `expr` with a truth-evaluation of itself.
fn wrap_eval(expr: &mut Expr, bool_ty: TypeId) {
    let loc = expr.loc.clone();
    let inner = mem::replace(expr, Expr::new(ExprKind::IntLit(0), loc.clone()));
    *expr = Expr {
        kind: ExprKind::Eval {
            inner: Box::new(inner),
        },
        valid: true,
        ty: Some(bool_ty),
        loc,
    };
}

/// Converts a validated, valid `expr` to `dest` in an assignment-like
/// position. Wraps a cast or truth-evaluation node when the types
/// differ; returns false when no conversion exists.
pub fn coerce_to(ctx: &mut Ctx, expr: &mut Expr, dest: TypeId) -> bool {
    let src = match expr.ty {
        Some(ty) => ty,
        None => return false,
    };
    if ctx.types.are_equivalent(src, dest, ctx.decls) {
        return true;
    }
    if matches!(expr.kind, ExprKind::NullPointer) && ctx.types.is_pointer(dest, ctx.decls) {
        // The null literal takes the destination's pointer type with no
        // cast node.
        expr.ty = Some(dest);
        return true;
    }
    if !ctx.types.can_assign_to(src, dest, ctx.decls) {
        return false;
    }
    if ctx.types.is_bool(dest, ctx.decls) {
        wrap_eval(expr, dest);
    } else {
        wrap_implicit_cast(expr, dest);
    }
    true
}

/// Validates `expr` as a condition and coerces it to bool. A non-bool
/// scalar gets a truth-evaluation wrapper.
pub fn coerce_condition(ctx: &mut Ctx, expr: &mut Expr) -> bool {
    validate_expr(ctx, expr);
    if !expr.valid {
        return false;
    }
    let ty = match expr.ty {
        Some(ty) => ty,
        None => return false,
    };
    if ctx.types.is_bool(ty, ctx.decls) {
        return true;
    }
    let scalar = ctx
        .types
        .as_builtin(ty, ctx.decls)
        .map(|b| b.is_numeric() || b == BuiltinKind::Char)
        .unwrap_or(false)
        || ctx.types.is_pointer(ty, ctx.decls);
    if scalar {
        let bool_ty = ctx.types.builtin(BuiltinKind::Bool);
        wrap_eval(expr, bool_ty);
        return true;
    }
    ctx.diags
        .report(DiagCode::ConditionNotConvertibleToBool, Some(expr.loc.clone()))
        .arg(ctx.types.display(ty, ctx.decls));
    expr.valid = false;
    false
}

/// Reports a failed symbol lookup. A nested name whose namespace prefix
/// does not resolve is blamed on the namespace rather than the name.
fn report_unresolved(ctx: &mut Ctx, symbol: &Symbol, loc: &SrcLoc) {
    if symbol.is_nested()
        && resolver::resolve_namespace_chain(ctx.decls, ctx.current_ns, symbol).is_none()
    {
        let prefix: Vec<&str> = symbol.segments[..symbol.segments.len() - 1]
            .iter()
            .map(|segment| segment.name.as_str())
            .collect();
        ctx.diags
            .report(DiagCode::UnresolvedNamespace, Some(loc.clone()))
            .arg(prefix.join("::"));
        return;
    }
    ctx.diags
        .report(DiagCode::UnresolvedSymbol, Some(loc.clone()))
        .arg(symbol.path_string());
}

pub fn validate_expr(ctx: &mut Ctx, expr: &mut Expr) {
    if !expr.valid {
        return;
    }
    match &mut expr.kind {
        ExprKind::IntLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::Int32)),
        ExprKind::UIntLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::UInt32)),
        ExprKind::LongLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::Int64)),
        ExprKind::ULongLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::UInt64)),
        ExprKind::FloatLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::Float32)),
        ExprKind::DoubleLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::Float64)),
        ExprKind::CharLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::Char)),
        ExprKind::StringLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::String)),
        ExprKind::BoolLit(_) => expr.ty = Some(ctx.types.builtin(BuiltinKind::Bool)),
        ExprKind::NullPointer => expr.ty = Some(ctx.types.null_pointer()),
        ExprKind::ImplicitCast { .. } | ExprKind::Eval { .. } => {}

        ExprKind::VarRef { symbol, decl } => {
            let found = if symbol.is_nested() {
                resolver::lookup_variable(ctx.decls, ctx.current_ns, symbol)
            } else {
                ctx.stack
                    .lookup(&symbol.last().name)
                    .or_else(|| resolver::lookup_variable(ctx.decls, ctx.current_ns, symbol))
            };
            match found {
                Some(id) => {
                    *decl = Some(id);
                    match ctx.decls.var(id).ty {
                        Some(ty) => expr.ty = Some(ty),
                        None => {
                            // The declaration exists but has no type
                            // yet, so we are inside its initializer.
                            let decl_loc = ctx.decls.loc_of(id).clone();
                            ctx.diags
                                .report(
                                    DiagCode::VariableUsedInOwnInitializer,
                                    Some(expr.loc.clone()),
                                )
                                .arg(&symbol.last().name);
                            ctx.diags.report(DiagCode::DeclaredHere, Some(decl_loc));
                            expr.valid = false;
                        }
                    }
                }
                None => {
                    report_unresolved(ctx, symbol, &expr.loc);
                    expr.valid = false;
                }
            }
        }

        ExprKind::Unary { op, operand } => {
            validate_expr(ctx, operand);
            if !operand.valid {
                expr.valid = false;
                return;
            }
            let ty = match operand.ty {
                Some(ty) => ty,
                None => {
                    expr.valid = false;
                    return;
                }
            };
            let builtin = ctx.types.as_builtin(ty, ctx.decls);
            match op {
                UnaryOp::Negate => {
                    if builtin.map(|b| b.is_numeric()).unwrap_or(false) {
                        expr.ty = Some(ty);
                    } else {
                        ctx.diags
                            .report(DiagCode::InvalidOperandToUnary, Some(expr.loc.clone()))
                            .arg(ctx.types.display(ty, ctx.decls));
                        expr.valid = false;
                    }
                }
                UnaryOp::LogicalNot => {
                    if coerce_condition(ctx, operand) {
                        expr.ty = Some(ctx.types.builtin(BuiltinKind::Bool));
                    } else {
                        expr.valid = false;
                    }
                }
                UnaryOp::BitwiseNot => {
                    if builtin.map(|b| b.is_integer()).unwrap_or(false) {
                        expr.ty = Some(ty);
                    } else {
                        ctx.diags
                            .report(DiagCode::InvalidOperandToUnary, Some(expr.loc.clone()))
                            .arg(ctx.types.display(ty, ctx.decls));
                        expr.valid = false;
                    }
                }
            }
        }

        ExprKind::Binary { .. } => validate_binary(ctx, expr),

        ExprKind::Call {
            symbol,
            args,
            resolved,
        } => {
            let mut args_ok = true;
            for arg in args.iter_mut() {
                validate_expr(ctx, arg);
                args_ok &= arg.valid;
            }
            if !args_ok {
                expr.valid = false;
                return;
            }

            let candidates = resolver::lookup_functions(ctx.decls, ctx.current_ns, symbol);
            if candidates.is_empty() {
                report_unresolved(ctx, symbol, &expr.loc);
                expr.valid = false;
                return;
            }

            match pick_overload(ctx, &candidates, args) {
                OverloadChoice::Unique(winner) => {
                    let params = ctx.decls.function(winner).params.clone();
                    for (arg, param) in args.iter_mut().zip(params) {
                        if let Some(param_ty) = ctx.decls.var(param).ty {
                            coerce_to(ctx, arg, param_ty);
                        }
                    }
                    *resolved = Some(winner);
                    expr.ty = Some(ctx.decls.function(winner).return_type);
                }
                OverloadChoice::None => {
                    ctx.diags
                        .report(DiagCode::FunctionOverloadDoesNotExist, Some(expr.loc.clone()))
                        .arg(symbol.path_string());
                    note_candidates(ctx, &candidates);
                    expr.valid = false;
                }
                OverloadChoice::Ambiguous(tied) => {
                    ctx.diags
                        .report(DiagCode::FunctionCallIsAmbiguous, Some(expr.loc.clone()))
                        .arg(symbol.path_string());
                    note_candidates(ctx, &tied);
                    expr.valid = false;
                }
            }
        }

        ExprKind::FieldAccess {
            entity,
            member,
            member_loc,
            field,
        } => {
            validate_expr(ctx, entity);
            if !entity.valid {
                expr.valid = false;
                return;
            }
            let entity_ty = match entity.ty {
                Some(ty) => ty,
                None => {
                    expr.valid = false;
                    return;
                }
            };
            let canon = ctx.types.canonical(entity_ty, ctx.decls);
            let entity_const = ctx.types.is_const(canon);
            let class = match ctx.types.kind(ctx.types.unqualified(canon)) {
                TypeKind::Class(decl) => Some(*decl),
                _ => None,
            };
            let found = class.and_then(|class| {
                ctx.decls
                    .class(class)
                    .fields
                    .iter()
                    .find(|f| ctx.decls.field(**f).name == *member)
                    .copied()
            });
            match found {
                Some(id) => {
                    *field = Some(id);
                    let mut ty = ctx.decls.field(id).ty;
                    if entity_const {
                        // Members of a const entity are const.
                        ty = ctx.types.qualified(ty, true, false);
                    }
                    expr.ty = Some(ty);
                }
                None => {
                    ctx.diags
                        .report(DiagCode::NoObjectMemberInType, Some(member_loc.clone()))
                        .arg(&*member)
                        .arg(ctx.types.display(entity_ty, ctx.decls));
                    expr.valid = false;
                }
            }
        }
    }
}

enum OverloadChoice {
    Unique(DeclId),
    Ambiguous(Vec<DeclId>),
    None,
}

/// Scores each candidate against the argument list: +2 for an exact
/// parameter match, +1 for an assignable one, disqualified otherwise.
/// The single best score wins; a shared best score is ambiguous.
fn pick_overload(ctx: &mut Ctx, candidates: &[DeclId], args: &[Expr]) -> OverloadChoice {
    let mut best_score = -1i32;
    let mut best: Vec<DeclId> = vec![];

    for &candidate in candidates {
        let params = ctx.decls.function(candidate).params.clone();
        if params.len() != args.len() {
            continue;
        }
        let mut score = 0i32;
        let mut viable = true;
        for (arg, param) in args.iter().zip(params) {
            let arg_ty = match arg.ty {
                Some(ty) => ty,
                None => {
                    viable = false;
                    break;
                }
            };
            let param_ty = match ctx.decls.var(param).ty {
                Some(ty) => ty,
                None => {
                    viable = false;
                    break;
                }
            };
            if ctx.types.are_equivalent(arg_ty, param_ty, ctx.decls) {
                score += 2;
            } else if ctx.types.can_assign_to(arg_ty, param_ty, ctx.decls) {
                score += 1;
            } else {
                viable = false;
                break;
            }
        }
        if !viable {
            continue;
        }
        if score > best_score {
            best_score = score;
            best = vec![candidate];
        } else if score == best_score {
            best.push(candidate);
        }
    }

    match best.len() {
        0 => OverloadChoice::None,
        1 => OverloadChoice::Unique(best[0]),
        _ => OverloadChoice::Ambiguous(best),
    }
}

fn note_candidates(ctx: &mut Ctx, candidates: &[DeclId]) {
    for &candidate in candidates {
        let loc = ctx.decls.loc_of(candidate).clone();
        ctx.diags.report(DiagCode::CandidateFunction, Some(loc));
    }
}

fn validate_binary(ctx: &mut Ctx, expr: &mut Expr) {
    let (op, lhs, rhs) = match &mut expr.kind {
        ExprKind::Binary { op, lhs, rhs, .. } => (*op, lhs.as_mut(), rhs.as_mut()),
        _ => return,
    };

    match classify_binary(op) {
        Some(BinaryClass::Assignment) => {
            let result = validate_assignment(ctx, op, lhs, rhs);
            match result {
                Some(ty) => expr.ty = Some(ty),
                None => expr.resign_validation(),
            }
        }
        Some(BinaryClass::Logical) => {
            let lhs_ok = coerce_condition(ctx, lhs);
            let rhs_ok = coerce_condition(ctx, rhs);
            if lhs_ok && rhs_ok {
                expr.ty = Some(ctx.types.builtin(BuiltinKind::Bool));
            } else {
                expr.valid = false;
            }
        }
        Some(class) => {
            validate_expr(ctx, lhs);
            validate_expr(ctx, rhs);
            if !lhs.valid || !rhs.valid {
                expr.valid = false;
                return;
            }
            let unified = unify_operands(ctx, lhs, rhs);
            let unified = match unified {
                Some(ty) => ty,
                None => {
                    report_incompatible(ctx, lhs, rhs, &expr.loc);
                    expr.valid = false;
                    return;
                }
            };
            let builtin = ctx.types.as_builtin(unified, ctx.decls);
            match class {
                BinaryClass::Arithmetic => {
                    let numeric = builtin.map(|b| b.is_numeric()).unwrap_or(false);
                    if numeric {
                        expr.ty = Some(unified);
                    } else {
                        report_incompatible(ctx, lhs, rhs, &expr.loc);
                        expr.valid = false;
                    }
                }
                BinaryClass::Comparison => {
                    let comparable = builtin.map(|b| b.is_numeric() || b == BuiltinKind::Char || b == BuiltinKind::Bool).unwrap_or(false)
                        || ctx.types.is_pointer(unified, ctx.decls);
                    if comparable {
                        expr.ty = Some(ctx.types.builtin(BuiltinKind::Bool));
                    } else {
                        report_incompatible(ctx, lhs, rhs, &expr.loc);
                        expr.valid = false;
                    }
                }
                BinaryClass::Bitwise => {
                    let integral = builtin.map(|b| b.is_integer()).unwrap_or(false);
                    if integral {
                        expr.ty = Some(unified);
                    } else {
                        report_incompatible(ctx, lhs, rhs, &expr.loc);
                        expr.valid = false;
                    }
                }
                _ => {}
            }
        }
        None => expr.resign_validation(),
    }
}

/// Brings both operands to a common type, inserting an implicit cast
/// on whichever side converts. Returns the common type.
fn unify_operands(ctx: &mut Ctx, lhs: &mut Expr, rhs: &mut Expr) -> Option<TypeId> {
    let lhs_ty = lhs.ty?;
    let rhs_ty = rhs.ty?;
    if ctx.types.are_equivalent(lhs_ty, rhs_ty, ctx.decls) {
        return Some(lhs_ty);
    }
    if matches!(rhs.kind, ExprKind::NullPointer) && ctx.types.is_pointer(lhs_ty, ctx.decls) {
        rhs.ty = Some(lhs_ty);
        return Some(lhs_ty);
    }
    if matches!(lhs.kind, ExprKind::NullPointer) && ctx.types.is_pointer(rhs_ty, ctx.decls) {
        lhs.ty = Some(rhs_ty);
        return Some(rhs_ty);
    }
    if ctx.types.can_cast_to(rhs_ty, lhs_ty, false, ctx.decls) {
        wrap_implicit_cast(rhs, lhs_ty);
        return Some(lhs_ty);
    }
    if ctx.types.can_cast_to(lhs_ty, rhs_ty, false, ctx.decls) {
        wrap_implicit_cast(lhs, rhs_ty);
        return Some(rhs_ty);
    }
    None
}

fn report_incompatible(ctx: &mut Ctx, lhs: &Expr, rhs: &Expr, loc: &crate::SrcLoc) {
    let lhs_display = lhs
        .ty
        .map(|t| ctx.types.display(t, ctx.decls))
        .unwrap_or_default();
    let rhs_display = rhs
        .ty
        .map(|t| ctx.types.display(t, ctx.decls))
        .unwrap_or_default();
    ctx.diags
        .report(DiagCode::IncompatibleTypesInBinary, Some(loc.clone()))
        .arg(lhs_display)
        .arg(rhs_display);
}

/// Assignment validation. Compound forms are desugared into
/// `lhs = lhs op rhs` before the right side is validated, so their
/// diagnostics match the expanded spelling exactly.
fn validate_assignment(
    ctx: &mut Ctx,
    op: TokenKind,
    lhs: &mut Expr,
    rhs: &mut Expr,
) -> Option<TypeId> {
    validate_expr(ctx, lhs);

    if let Some(arith) = detach_assignment(op) {
        let op_loc = rhs.loc.clone();
        let loc = lhs.loc.join(&rhs.loc);
        let old_rhs = mem::replace(rhs, Expr::new(ExprKind::IntLit(0), loc.clone()));
        *rhs = Expr::new(
            ExprKind::Binary {
                op: arith,
                op_loc,
                lhs: Box::new(lhs.clone()),
                rhs: Box::new(old_rhs),
            },
            loc,
        );
    }
    validate_expr(ctx, rhs);

    if !lhs.valid || !rhs.valid {
        return None;
    }
    if !lhs.is_assignable() {
        ctx.diags
            .report(DiagCode::ExpressionNotAssignable, Some(lhs.loc.clone()));
        return None;
    }
    let dest = lhs.ty?;
    let canon = ctx.types.canonical(dest, ctx.decls);
    if ctx.types.is_const(canon) {
        ctx.diags
            .report(DiagCode::AssignmentToConstant, Some(lhs.loc.clone()))
            .arg(ctx.types.display(dest, ctx.decls));
        return None;
    }

    if !coerce_to(ctx, rhs, dest) {
        let src = rhs.ty.map(|t| ctx.types.display(t, ctx.decls));
        ctx.diags
            .report(DiagCode::NoViableConversion, Some(rhs.loc.clone()))
            .arg(src.unwrap_or_default())
            .arg(ctx.types.display(dest, ctx.decls));
        return None;
    }
    Some(dest)
}
