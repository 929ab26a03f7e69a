use crate::ast::{
    decls::{Decl, DeclId, DeclTable},
    symbol::Symbol,
    types::{TypeId, TypeKind, TypeTable},
};

/// Finds the namespace a nested symbol's final segment lives in. The
/// first segment is looked for as a direct child of each enclosing
/// namespace, innermost outward; the rest descend from there.
pub fn resolve_namespace_chain(decls: &DeclTable, from: DeclId, symbol: &Symbol) -> Option<DeclId> {
    let first = &symbol.segments[0].name;

    let mut anchor = None;
    let mut cursor = Some(from);
    while let Some(ns) = cursor {
        let namespace = decls.namespace(ns);
        if let Some(child) = namespace.namespaces.get(first) {
            anchor = Some(*child);
            break;
        }
        cursor = namespace.parent;
    }

    let mut current = anchor?;
    for segment in &symbol.segments[1..symbol.segments.len() - 1] {
        current = *decls.namespace(current).namespaces.get(&segment.name)?;
    }
    Some(current)
}

/// Looks up a variable by symbol: nested symbols go through the
/// namespace chain, simple names walk enclosing namespaces upward.
pub fn lookup_variable(decls: &DeclTable, from: DeclId, symbol: &Symbol) -> Option<DeclId> {
    if symbol.is_nested() {
        let ns = resolve_namespace_chain(decls, from, symbol)?;
        return decls.namespace(ns).variables.get(&symbol.last().name).copied();
    }
    let name = &symbol.last().name;
    let mut cursor = Some(from);
    while let Some(ns) = cursor {
        let namespace = decls.namespace(ns);
        if let Some(decl) = namespace.variables.get(name) {
            return Some(*decl);
        }
        cursor = namespace.parent;
    }
    None
}

/// Collects the overload set for a call. For simple names the first
/// enclosing namespace that knows the name contributes its whole set;
/// outer namespaces are not merged in.
pub fn lookup_functions(decls: &DeclTable, from: DeclId, symbol: &Symbol) -> Vec<DeclId> {
    if symbol.is_nested() {
        return resolve_namespace_chain(decls, from, symbol)
            .and_then(|ns| decls.namespace(ns).functions.get(&symbol.last().name).cloned())
            .unwrap_or_default();
    }
    let name = &symbol.last().name;
    let mut cursor = Some(from);
    while let Some(ns) = cursor {
        let namespace = decls.namespace(ns);
        if let Some(overloads) = namespace.functions.get(name) {
            return overloads.clone();
        }
        cursor = namespace.parent;
    }
    vec![]
}

pub fn lookup_type_decl(decls: &DeclTable, from: DeclId, symbol: &Symbol) -> Option<DeclId> {
    if symbol.is_nested() {
        let ns = resolve_namespace_chain(decls, from, symbol)?;
        return decls.namespace(ns).types.get(&symbol.last().name).copied();
    }
    let name = &symbol.last().name;
    let mut cursor = Some(from);
    while let Some(ns) = cursor {
        let namespace = decls.namespace(ns);
        if let Some(decl) = namespace.types.get(name) {
            return Some(*decl);
        }
        cursor = namespace.parent;
    }
    None
}

const MAX_ALIAS_DEPTH: u8 = 32;

/// Replaces unresolved names inside `id` with the declared types they
/// refer to, rebuilding pointer and qualifier wrappers around the
/// resolved core. On failure the offending symbol comes back for the
/// caller to report.
pub fn resolve_type(
    types: &mut TypeTable,
    decls: &DeclTable,
    from: DeclId,
    id: TypeId,
) -> Result<TypeId, Symbol> {
    resolve_type_inner(types, decls, from, id, 0)
}

fn resolve_type_inner(
    types: &mut TypeTable,
    decls: &DeclTable,
    from: DeclId,
    id: TypeId,
    depth: u8,
) -> Result<TypeId, Symbol> {
    match types.kind(id).clone() {
        TypeKind::Unresolved(symbol) => {
            if depth >= MAX_ALIAS_DEPTH {
                return Err(symbol);
            }
            let decl = match lookup_type_decl(decls, from, &symbol) {
                Some(decl) => decl,
                None => return Err(symbol),
            };
            match decls.get(decl) {
                Decl::Class(class) => Ok(class.ty),
                Decl::TypeAlias(alias) => {
                    resolve_type_inner(types, decls, from, alias.target, depth + 1)
                }
                _ => Err(symbol),
            }
        }
        TypeKind::Pointer(Some(pointee)) => {
            let resolved = resolve_type_inner(types, decls, from, pointee, depth)?;
            Ok(types.pointer_to(resolved))
        }
        TypeKind::Qualified {
            inner,
            constant,
            volatile,
        } => {
            let resolved = resolve_type_inner(types, decls, from, inner, depth)?;
            Ok(types.qualified(resolved, constant, volatile))
        }
        _ => Ok(id),
    }
}
