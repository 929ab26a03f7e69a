use std::collections::HashMap;

use crate::ast::decls::DeclId;

#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<String, DeclId>,
}

/// Lexical scope stack for one function body. Redefinition is only an
/// error within the innermost scope; inner scopes may shadow outer
/// names freely.
#[derive(Debug, Default)]
pub struct LocalStack {
    scopes: Vec<Scope>,
}

impl LocalStack {
    pub fn new() -> LocalStack {
        LocalStack { scopes: vec![] }
    }

    pub fn add_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn remove_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declares `name` in the innermost scope. On a clash, returns the
    /// previously declared id and leaves the scope unchanged.
    pub fn declare(&mut self, name: &str, decl: DeclId) -> Result<(), DeclId> {
        let scope = match self.scopes.last_mut() {
            Some(scope) => scope,
            None => return Ok(()),
        };
        if let Some(previous) = scope.vars.get(name) {
            return Err(*previous);
        }
        scope.vars.insert(name.to_string(), decl);
        Ok(())
    }

    /// Innermost-first lookup.
    pub fn lookup(&self, name: &str) -> Option<DeclId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.vars.get(name).copied())
    }
}
