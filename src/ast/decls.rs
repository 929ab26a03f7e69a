use std::collections::HashMap;
use std::rc::Rc;

use crate::SrcLoc;

use super::expressions::Expr;
use super::statements::Stmt;
use super::types::{TypeId, TypeTable};

/// Index into the [`DeclTable`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub u32);

/// A namespace body. The global namespace is one of these with no
/// parent; reopening a namespace appends to the existing entry.
#[derive(Debug)]
pub struct NamespaceDecl {
    pub name: String,
    pub loc: SrcLoc,
    pub parent: Option<DeclId>,
    /// Members in declaration order, for deterministic validation.
    pub ordered: Vec<DeclId>,
    pub namespaces: HashMap<String, DeclId>,
    /// Functions keep every overload under the shared name.
    pub functions: HashMap<String, Vec<DeclId>>,
    pub variables: HashMap<String, DeclId>,
    pub types: HashMap<String, DeclId>,
}

impl NamespaceDecl {
    pub fn new(name: String, loc: SrcLoc, parent: Option<DeclId>) -> NamespaceDecl {
        NamespaceDecl {
            name,
            loc,
            parent,
            ordered: vec![],
            namespaces: HashMap::new(),
            functions: HashMap::new(),
            variables: HashMap::new(),
            types: HashMap::new(),
        }
    }
}

/// A named storage slot. Locals and parameters leave `init` empty; a
/// local declared without a type keeps `ty` as `None` until its
/// initializer has been validated.
#[derive(Debug)]
pub struct VarDecl {
    pub name: String,
    pub loc: SrcLoc,
    pub ty: Option<TypeId>,
    pub init: Option<Expr>,
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub loc: SrcLoc,
    pub params: Vec<DeclId>,
    pub return_type: TypeId,
    /// `None` for a prototype.
    pub body: Option<Stmt>,
    pub nostalgic: bool,
    pub containing: DeclId,
}

#[derive(Debug)]
pub struct ClassDecl {
    pub name: String,
    pub loc: SrcLoc,
    pub fields: Vec<DeclId>,
    pub ty: TypeId,
}

#[derive(Debug)]
pub struct FieldDecl {
    pub name: String,
    pub loc: SrcLoc,
    pub ty: TypeId,
    pub index: u32,
    pub owner: DeclId,
}

#[derive(Debug)]
pub struct AliasDecl {
    pub name: String,
    pub loc: SrcLoc,
    pub target: TypeId,
}

#[derive(Debug)]
pub struct ProtocolDecl {
    pub name: String,
    pub loc: SrcLoc,
}

#[derive(Debug)]
pub enum Decl {
    Namespace(NamespaceDecl),
    GlobalVar(VarDecl),
    LocalVar(VarDecl),
    Param(VarDecl),
    Function(FunctionDecl),
    Class(ClassDecl),
    Field(FieldDecl),
    TypeAlias(AliasDecl),
    Protocol(ProtocolDecl),
}

/// Arena holding every declaration of a compilation unit.
pub struct DeclTable {
    decls: Vec<Decl>,
}

impl DeclTable {
    pub fn new() -> DeclTable {
        DeclTable { decls: vec![] }
    }

    pub fn alloc(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.0 as usize]
    }

    pub fn name_of(&self, id: DeclId) -> &str {
        match self.get(id) {
            Decl::Namespace(d) => &d.name,
            Decl::GlobalVar(d) | Decl::LocalVar(d) | Decl::Param(d) => &d.name,
            Decl::Function(d) => &d.name,
            Decl::Class(d) => &d.name,
            Decl::Field(d) => &d.name,
            Decl::TypeAlias(d) => &d.name,
            Decl::Protocol(d) => &d.name,
        }
    }

    pub fn loc_of(&self, id: DeclId) -> &SrcLoc {
        match self.get(id) {
            Decl::Namespace(d) => &d.loc,
            Decl::GlobalVar(d) | Decl::LocalVar(d) | Decl::Param(d) => &d.loc,
            Decl::Function(d) => &d.loc,
            Decl::Class(d) => &d.loc,
            Decl::Field(d) => &d.loc,
            Decl::TypeAlias(d) => &d.loc,
            Decl::Protocol(d) => &d.loc,
        }
    }

    pub fn namespace(&self, id: DeclId) -> &NamespaceDecl {
        match self.get(id) {
            Decl::Namespace(d) => d,
            _ => panic!("declaration {:?} is not a namespace", id),
        }
    }

    pub fn namespace_mut(&mut self, id: DeclId) -> &mut NamespaceDecl {
        match self.get_mut(id) {
            Decl::Namespace(d) => d,
            _ => panic!("declaration {:?} is not a namespace", id),
        }
    }

    pub fn var(&self, id: DeclId) -> &VarDecl {
        match self.get(id) {
            Decl::GlobalVar(d) | Decl::LocalVar(d) | Decl::Param(d) => d,
            _ => panic!("declaration {:?} is not a variable", id),
        }
    }

    pub fn var_mut(&mut self, id: DeclId) -> &mut VarDecl {
        match self.get_mut(id) {
            Decl::GlobalVar(d) | Decl::LocalVar(d) | Decl::Param(d) => d,
            _ => panic!("declaration {:?} is not a variable", id),
        }
    }

    pub fn function(&self, id: DeclId) -> &FunctionDecl {
        match self.get(id) {
            Decl::Function(d) => d,
            _ => panic!("declaration {:?} is not a function", id),
        }
    }

    pub fn function_mut(&mut self, id: DeclId) -> &mut FunctionDecl {
        match self.get_mut(id) {
            Decl::Function(d) => d,
            _ => panic!("declaration {:?} is not a function", id),
        }
    }

    pub fn class(&self, id: DeclId) -> &ClassDecl {
        match self.get(id) {
            Decl::Class(d) => d,
            _ => panic!("declaration {:?} is not a class", id),
        }
    }

    pub fn field(&self, id: DeclId) -> &FieldDecl {
        match self.get(id) {
            Decl::Field(d) => d,
            _ => panic!("declaration {:?} is not a field", id),
        }
    }

    pub fn field_mut(&mut self, id: DeclId) -> &mut FieldDecl {
        match self.get_mut(id) {
            Decl::Field(d) => d,
            _ => panic!("declaration {:?} is not a field", id),
        }
    }
}

impl Default for DeclTable {
    fn default() -> Self {
        DeclTable::new()
    }
}

/// Everything the front end produces for one source file.
pub struct CompilationUnit {
    pub file: Rc<String>,
    pub decls: DeclTable,
    pub types: TypeTable,
    pub global_namespace: DeclId,
}

impl CompilationUnit {
    pub fn new(file: Rc<String>) -> CompilationUnit {
        let mut decls = DeclTable::new();
        let global = decls.alloc(Decl::Namespace(NamespaceDecl::new(
            String::new(),
            SrcLoc::null(),
            None,
        )));
        CompilationUnit {
            file,
            decls,
            types: TypeTable::new(),
            global_namespace: global,
        }
    }
}
